//! Sign-in payloads and the authenticated user model.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Email/password pair accepted by `POST /auth`.
#[derive(Clone, Serialize)]
pub struct Credentials {
	/// Account email.
	pub email: String,
	/// Account password.
	pub password: String,
}
impl Credentials {
	/// Creates a credential pair.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Successful `POST /auth` response.
#[derive(Clone, Debug, Deserialize)]
pub struct SignIn {
	/// Signed-in user profile.
	pub user: User,
	/// Bearer credential persisted by the client.
	pub access_token: TokenSecret,
}

/// Envelope returned by `GET /user`.
#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
	pub(crate) user: User,
}

/// Body of `POST /user/refresh-token`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
	pub(crate) old_token: &'a str,
}

/// Successful refresh response.
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
	pub(crate) token: TokenSecret,
}

/// Account role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
	/// Regular operator.
	User,
	/// Administrator.
	Admin,
}

/// Authenticated user profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	/// Document identifier.
	#[serde(rename = "_id")]
	pub id: String,
	/// Full name.
	pub fullname: String,
	/// Account email.
	pub email: String,
	/// CPF digits as stored by the API.
	pub cpf: String,
	/// Birth date as sent by the API.
	#[serde(default)]
	pub birthdate: Option<String>,
	/// Account role.
	#[serde(default)]
	pub role: Option<UserRole>,
	/// Whether the account is enabled.
	#[serde(default)]
	pub is_active: Option<bool>,
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
