//! Medical leave certificates.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	http::{ApiRequest, ApiTransport},
	resources::{Cid, Colaborator},
};

/// Stored certificate with its collaborator populated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalCertificate {
	/// Document identifier.
	#[serde(rename = "_id")]
	pub id: String,
	/// Collaborator the certificate belongs to.
	#[serde(rename = "collaboratorId")]
	pub collaborator: Colaborator,
	/// Start of the leave.
	#[serde(with = "time::serde::rfc3339")]
	pub certificate_date_time: OffsetDateTime,
	/// Owning company identifier.
	pub company_id: String,
	/// Number of leave days.
	pub leave_days: u32,
	/// Diagnosis classification.
	pub cid: Cid,
	/// Free-form notes.
	#[serde(default)]
	pub notes: Option<String>,
	/// Creation timestamp.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Last update timestamp.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
	/// Soft-deletion timestamp.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub deleted_at: Option<OffsetDateTime>,
}

/// Payload for `POST /medical-certificates`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicalCertificate {
	/// Identifier of the collaborator on leave.
	pub collaborator_id: String,
	/// Start of the leave, sent as RFC 3339.
	#[serde(with = "time::serde::rfc3339")]
	pub certificate_date_time: OffsetDateTime,
	/// Number of leave days.
	pub leave_days: u32,
	/// Diagnosis classification.
	pub cid: Cid,
	/// Free-form notes.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MedicalCertificateList {
	medical_certificates: Vec<MedicalCertificate>,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists every certificate of the signed-in user's company.
	pub async fn list_medical_certificates(&self) -> Result<Vec<MedicalCertificate>> {
		let MedicalCertificateList { medical_certificates } =
			self.get("/medical-certificates/all").await?;

		Ok(medical_certificates)
	}

	/// Records a new certificate.
	pub async fn create_medical_certificate(
		&self,
		certificate: &NewMedicalCertificate,
	) -> Result<()> {
		self.send(ApiRequest::post("/medical-certificates").json(certificate)?).await.map(drop)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn new_certificate_serializes_camel_case_and_rfc3339() {
		let payload = NewMedicalCertificate {
			collaborator_id: "c1".into(),
			certificate_date_time: datetime!(2025-06-02 08:00 UTC),
			leave_days: 3,
			cid: Cid { code: "J11".into(), description: "Influenza".into() },
			notes: None,
		};
		let json = serde_json::to_value(&payload).expect("Payload should serialize.");

		assert_eq!(
			json,
			serde_json::json!({
				"collaboratorId": "c1",
				"certificateDateTime": "2025-06-02T08:00:00Z",
				"leaveDays": 3,
				"cid": { "code": "J11", "description": "Influenza" },
			})
		);
	}

	#[test]
	fn certificate_list_decodes_populated_collaborator() {
		let list: MedicalCertificateList = serde_json::from_value(serde_json::json!({
			"medicalCertificates": [{
				"_id": "m1",
				"collaboratorId": {
					"_id": "c1",
					"fullname": "Ana Souza",
					"companyId": "acme",
					"cpf": "52998224725",
					"birthdate": "1990-04-07",
					"role": "Analyst",
					"status": "active"
				},
				"certificateDateTime": "2025-06-02T08:00:00.000Z",
				"companyId": "acme",
				"leaveDays": 2,
				"cid": { "code": "A00", "description": "Cholera" },
				"notes": null,
				"createdAt": "2025-06-02T09:00:00.000Z",
				"updatedAt": "2025-06-02T09:00:00.000Z"
			}]
		}))
		.expect("Certificate list should decode.");
		let certificate = &list.medical_certificates[0];

		assert_eq!(certificate.collaborator.fullname, "Ana Souza");
		assert_eq!(certificate.leave_days, 2);
		assert_eq!(certificate.cid.code, "A00");
		assert_eq!(certificate.notes, None);
	}
}
