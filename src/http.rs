//! Transport primitives for API calls.
//!
//! [`ApiRequest`] is a replayable description of a call: the client attaches the bearer
//! credential right before dispatch, and can clone the description to replay it once a refreshed
//! credential lands. [`ApiTransport`] is the client's only dependency on an HTTP stack; the
//! default [`ReqwestTransport`] is enabled by the `reqwest` feature, while tests plug in fakes
//! with scripted responses.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ApiError, ConfigError, DecodeError, TransportError},
};
#[cfg(feature = "reqwest")] use crate::config::ClientConfig;

/// Content type sent with (and expected from) every call.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Boxed future returned by [`ApiTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks able to execute resolved [`ApiRequest`]s.
///
/// Implementations must send `Content-Type: application/json`, the request's extra headers, and
/// `Authorization` from [`ApiRequest::authorization`] when present. Non-success statuses are not
/// transport errors: they come back as an [`ApiResponse`] and the client classifies them.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` against the absolute `url`.
	fn execute<'a>(&'a self, url: Url, request: ApiRequest) -> TransportFuture<'a>;
}

/// HTTP verbs used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
	/// `PUT`.
	Put,
	/// `PATCH`.
	Patch,
	/// `DELETE`.
	Delete,
}
impl Method {
	/// Returns the canonical upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Replayable description of an API call.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Path relative to the configured API root.
	pub path: String,
	/// Optional JSON body.
	pub body: Option<serde_json::Value>,
	/// Extra headers sent alongside the defaults.
	pub headers: Vec<(String, String)>,
	/// Bearer credential attached by the client right before dispatch.
	pub authorization: Option<TokenSecret>,
}
impl ApiRequest {
	/// Creates a body-less request.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), body: None, headers: Vec::new(), authorization: None }
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Shorthand for a `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Serializes `body` as the JSON payload.
	pub fn json<B>(mut self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		let value = serde_json::to_value(body)
			.map_err(|e| ConfigError::Serialize { source: Arc::new(e) })?;

		self.body = Some(value);

		Ok(self)
	}

	/// Appends an extra header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Returns a copy carrying `token` as its bearer credential.
	pub(crate) fn authorized(&self, token: Option<&TokenSecret>) -> Self {
		let mut request = self.clone();

		request.authorization = token.cloned();

		request
	}

	/// Returns the `Authorization` header value, if a credential is attached.
	pub fn bearer(&self) -> Option<String> {
		self.authorization.as_ref().map(TokenSecret::bearer)
	}
}

/// Response captured by a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers with lower-cased names.
	pub headers: Vec<(String, String)>,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response without headers.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: Vec::new(), body: body.into() }
	}

	/// Creates a response whose body is the serialized `value`.
	pub fn json_body(status: u16, value: &serde_json::Value) -> Self {
		Self::new(status, value.to_string())
			.with_header("content-type", JSON_CONTENT_TYPE)
	}

	/// Appends a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into().to_ascii_lowercase(), value.into()));

		self
	}

	/// Looks up a header by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
	}

	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Converts non-success responses into [`ApiError`].
	pub fn error_for_status(self) -> Result<Self, ApiError> {
		if self.is_success() { Ok(self) } else { Err(ApiError::from_body(self.status, &self.body)) }
	}

	/// Decodes the body as JSON, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T, DecodeError>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|e| DecodeError::from_path_error(e, Some(self.status)))
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client honoring the configured timeout and user agent.
	pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder();

		if let Some(timeout) = config.timeout {
			let timeout = std::time::Duration::try_from(timeout)
				.map_err(|_| ConfigError::InvalidTimeout(timeout))?;

			builder = builder.timeout(timeout);
		}
		if let Some(agent) = &config.user_agent {
			builder = builder.user_agent(agent);
		}

		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn execute<'a>(&'a self, url: Url, request: ApiRequest) -> TransportFuture<'a> {
		Box::pin(async move {
			let method = match request.method {
				Method::Get => reqwest::Method::GET,
				Method::Post => reqwest::Method::POST,
				Method::Put => reqwest::Method::PUT,
				Method::Patch => reqwest::Method::PATCH,
				Method::Delete => reqwest::Method::DELETE,
			};
			let mut builder = self
				.0
				.request(method, url)
				.header(reqwest::header::CONTENT_TYPE, JSON_CONTENT_TYPE)
				.header(reqwest::header::ACCEPT, JSON_CONTENT_TYPE);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(bearer) = request.bearer() {
				builder = builder.header(reqwest::header::AUTHORIZATION, bearer);
			}
			if let Some(body) = &request.body {
				builder = builder.body(body.to_string());
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|v| (name.as_str().to_owned(), v.to_owned()))
				})
				.collect();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, headers, body })
		})
	}
}
