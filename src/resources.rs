//! Typed wrappers for the resource endpoints used by the application pages.
//!
//! Every call goes through [`ApiClient::send`](crate::client::ApiClient::send), so expired
//! credentials are refreshed transparently and unrecoverable 401s end the session exactly as
//! they do for raw requests.

pub mod cids;
pub mod colaborators;
pub mod medical_certificates;

pub use cids::*;
pub use colaborators::*;
pub use medical_certificates::*;

// self
use crate::error::ConfigError;

/// Validates an identifier that is interpolated into an endpoint path.
///
/// Identifiers are trimmed and must be non-empty ASCII alphanumerics plus `.`, `-`, and `_`, which
/// covers document ids and CID codes while keeping the resolved URL unambiguous.
pub(crate) fn path_segment(raw: &str) -> Result<&str, ConfigError> {
	let segment = raw.trim();
	let valid = segment.chars().any(|c| c != '.')
		&& segment.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));

	if valid {
		Ok(segment)
	} else {
		Err(ConfigError::InvalidPathSegment { segment: raw.to_owned() })
	}
}
