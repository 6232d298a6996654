//! Collaborator (employee) registry.

// crates.io
use time::Date;
// self
use crate::{
	_prelude::*,
	client::ApiClient,
	http::{ApiRequest, ApiTransport},
	resources::path_segment,
};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Collaborator lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColaboratorStatus {
	/// Collaborator may receive new certificates.
	Active,
	/// Collaborator is disabled.
	Inactive,
}
impl ColaboratorStatus {
	/// Status after a toggle-status call.
	pub const fn toggled(self) -> Self {
		match self {
			Self::Active => Self::Inactive,
			Self::Inactive => Self::Active,
		}
	}
}

/// Registered collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Colaborator {
	/// Document identifier.
	#[serde(rename = "_id")]
	pub id: String,
	/// Full name.
	pub fullname: String,
	/// Owning company identifier.
	pub company_id: String,
	/// CPF digits.
	pub cpf: String,
	/// Birth date as sent by the API.
	pub birthdate: String,
	/// Job role.
	pub role: String,
	/// Lifecycle status.
	pub status: ColaboratorStatus,
	/// Creation timestamp.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
	/// Last update timestamp.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub updated_at: Option<OffsetDateTime>,
	/// Soft-deletion timestamp.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub deleted_at: Option<OffsetDateTime>,
}

/// Payload for `POST /colaborators`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewColaborator {
	/// Full name.
	pub fullname: String,
	/// Job role.
	pub role: String,
	/// Birth date, sent as `YYYY-MM-DD`.
	#[serde(with = "iso_date")]
	pub birthdate: Date,
	/// CPF digits.
	pub cpf: String,
}
impl NewColaborator {
	/// Creates a payload; CPF punctuation (`123.456.789-09`) is stripped to bare digits.
	pub fn new(
		fullname: impl Into<String>,
		role: impl Into<String>,
		birthdate: Date,
		cpf: &str,
	) -> Self {
		Self {
			fullname: fullname.into(),
			role: role.into(),
			birthdate,
			cpf: cpf.chars().filter(char::is_ascii_digit).collect(),
		}
	}
}

#[derive(Deserialize)]
struct ColaboratorList {
	colaborators: Vec<Colaborator>,
}

#[derive(Deserialize)]
struct ColaboratorEnvelope {
	colaborator: Colaborator,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists every collaborator of the signed-in user's company.
	pub async fn list_colaborators(&self) -> Result<Vec<Colaborator>> {
		let ColaboratorList { colaborators } = self.get("/colaborators/all").await?;

		Ok(colaborators)
	}

	/// Registers a collaborator and returns the stored record.
	pub async fn create_colaborator(&self, payload: &NewColaborator) -> Result<Colaborator> {
		let ColaboratorEnvelope { colaborator } =
			self.send_json(ApiRequest::post("/colaborators").json(payload)?).await?;

		Ok(colaborator)
	}

	/// Flips a collaborator between active and inactive.
	pub async fn toggle_colaborator_status(&self, id: &str) -> Result<()> {
		let id = path_segment(id)?;

		self.put(&format!("/colaborators/toggle-status/{id}")).await
	}

	/// Deletes a collaborator.
	pub async fn delete_colaborator(&self, id: &str) -> Result<()> {
		let id = path_segment(id)?;

		self.delete(&format!("/colaborators/{id}")).await
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::date;
	// self
	use super::*;

	#[test]
	fn new_colaborator_strips_cpf_mask_and_formats_date() {
		let payload =
			NewColaborator::new("Ana Souza", "Analyst", date!(1990 - 04 - 07), "529.982.247-25");
		let json = serde_json::to_value(&payload).expect("Payload should serialize.");

		assert_eq!(
			json,
			serde_json::json!({
				"fullname": "Ana Souza",
				"role": "Analyst",
				"birthdate": "1990-04-07",
				"cpf": "52998224725",
			})
		);
	}

	#[test]
	fn colaborator_decodes_api_shape() {
		let colaborator: Colaborator = serde_json::from_value(serde_json::json!({
			"_id": "c1",
			"fullname": "Ana Souza",
			"companyId": "acme",
			"cpf": "52998224725",
			"birthdate": "1990-04-07",
			"role": "Analyst",
			"status": "inactive",
			"createdAt": "2025-01-02T03:04:05.000Z",
			"updatedAt": null
		}))
		.expect("Collaborator should decode.");

		assert_eq!(colaborator.status, ColaboratorStatus::Inactive);
		assert_eq!(colaborator.status.toggled(), ColaboratorStatus::Active);
		assert!(colaborator.created_at.is_some());
		assert!(colaborator.updated_at.is_none());
	}
}
