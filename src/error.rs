//! Client-level error types shared across the transport, store, and session layers.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type SharedError = Arc<dyn StdError + Send + Sync>;

/// Body message the API returns alongside a 401 when the bearer credential has expired.
pub const TOKEN_EXPIRED_MESSAGE: &str = "jwt expired";

/// Canonical client error exposed by public APIs.
///
/// Errors are cheap to clone so a single refresh failure can be delivered to every request that
/// was queued behind it.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// The API answered with a non-success status.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// A success response did not match the expected shape.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// The refresh call failed and the session was revoked; `source` holds the underlying failure.
	#[error("Credential refresh failed.")]
	RefreshFailed {
		/// Failure raised by the refresh call or while storing its result.
		#[source]
		source: Box<Error>,
	},
	/// The task driving a credential refresh was dropped before the refresh settled.
	#[error("Credential refresh was aborted before it settled.")]
	RefreshAborted,
}
impl Error {
	/// Returns the API error payload when the server produced one.
	pub fn api(&self) -> Option<&ApiError> {
		match self {
			Self::Api(e) => Some(e),
			Self::RefreshFailed { source } => source.api(),
			_ => None,
		}
	}

	/// Returns the HTTP status attached to the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api(e) => Some(e.status),
			Self::Decode(e) => e.status,
			Self::RefreshFailed { source } => source.status(),
			_ => None,
		}
	}

	/// Whether callers should treat this failure as "not authenticated" instead of retrying.
	pub fn is_unauthenticated(&self) -> bool {
		match self {
			Self::Api(e) => e.is_unauthorized(),
			Self::RefreshFailed { .. } | Self::RefreshAborted => true,
			_ => false,
		}
	}
}

/// Error payload returned by the API for non-success responses.
#[derive(Clone, Debug, PartialEq, ThisError)]
#[error("API responded with status {status}{}.", message_suffix(.message))]
pub struct ApiError {
	/// HTTP status code.
	pub status: u16,
	/// `message` field of the JSON body, when present.
	pub message: Option<String>,
	/// Raw JSON body (`Null` when the body was empty or not JSON).
	pub body: serde_json::Value,
}
impl ApiError {
	/// Builds an error from a status code and raw response body.
	pub fn from_body(status: u16, bytes: &[u8]) -> Self {
		let body = serde_json::from_slice::<serde_json::Value>(bytes).unwrap_or_default();
		let message = body.get("message").and_then(|m| m.as_str()).map(ToOwned::to_owned);

		Self { status, message, body }
	}

	/// Whether the response was a 401.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	/// Whether the response signals an expired credential that may be refreshed.
	pub fn is_token_expired(&self) -> bool {
		self.is_unauthorized() && self.message.as_deref() == Some(TOKEN_EXPIRED_MESSAGE)
	}
}

fn message_suffix(message: &Option<String>) -> String {
	message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Configuration and validation failures raised by the client.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
	/// Base URL is not usable as an API root.
	#[error("Base URL `{url}` is invalid: {reason}.")]
	InvalidBaseUrl {
		/// Offending URL.
		url: String,
		/// Why the URL was rejected.
		reason: &'static str,
	},
	/// Base URL string could not be parsed.
	#[error("Base URL could not be parsed.")]
	UnparsableBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint path could not be joined onto the base URL.
	#[error("Endpoint path `{path}` could not be resolved.")]
	InvalidPath {
		/// Relative path supplied by the caller.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Timeout is zero or negative.
	#[error("Timeout must be positive, got {0}.")]
	InvalidTimeout(Duration),
	/// Identifier cannot be embedded as a single path segment.
	#[error("`{segment}` is not a valid path segment.")]
	InvalidPathSegment {
		/// Rejected identifier.
		segment: String,
	},
	/// Required environment variable is absent.
	#[error("Environment variable `{0}` is not set.")]
	MissingEnv(&'static str),
	/// Environment variable holds an unusable value.
	#[error("Environment variable `{name}` has an invalid value: {value}.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Value that failed to parse.
		value: String,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Serialize {
		/// Underlying serializer failure.
		#[source]
		source: Arc<serde_json::Error>,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Clone, Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
	/// The request did not complete within the configured timeout.
	#[error("Request timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: SharedError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[source] Arc<std::io::Error>),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Arc::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Timeout { source: Arc::new(src) }
	}
}
impl From<std::io::Error> for TransportError {
	fn from(e: std::io::Error) -> Self {
		Self::Io(Arc::new(e))
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Success body that could not be decoded into the expected type.
#[derive(Clone, Debug, ThisError)]
#[error("Response body could not be decoded at `{path}`.")]
pub struct DecodeError {
	/// JSON path at which decoding failed.
	pub path: String,
	/// HTTP status code, when available.
	pub status: Option<u16>,
	/// Structured parsing failure.
	#[source]
	pub source: Arc<serde_json::Error>,
}
impl DecodeError {
	/// Converts a path-aware serde failure into a [`DecodeError`].
	pub fn from_path_error(
		err: serde_path_to_error::Error<serde_json::Error>,
		status: Option<u16>,
	) -> Self {
		let path = err.path().to_string();

		Self { path, status, source: Arc::new(err.into_inner()) }
	}
}
