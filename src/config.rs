//! Client configuration: API root, credential storage key, and transport limits.

// self
use crate::{_prelude::*, error::ConfigError};

/// Storage key under which the bearer credential is persisted.
pub const DEFAULT_TOKEN_KEY: &str = "@demarco.token";
/// Environment variable carrying the API root URL.
pub const ENV_API_URL: &str = "ATESTADO_API_URL";
/// Optional environment variable carrying the per-request timeout in seconds.
pub const ENV_API_TIMEOUT_SECS: &str = "ATESTADO_API_TIMEOUT_SECS";

/// Resolved client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// API root; endpoint paths are resolved relative to it.
	pub base_url: Url,
	/// Storage key shared by the client and the sign-in flow.
	pub token_key: String,
	/// Per-request timeout; `None` leaves requests (including refreshes) uncapped.
	pub timeout: Option<Duration>,
	/// Optional `User-Agent` override.
	pub user_agent: Option<String>,
}
impl ClientConfig {
	/// Starts a builder rooted at `base_url`.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Loads the configuration from [`ENV_API_URL`] and [`ENV_API_TIMEOUT_SECS`].
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads the configuration through an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let raw = lookup(ENV_API_URL).ok_or(ConfigError::MissingEnv(ENV_API_URL))?;
		let base_url = Url::parse(raw.trim())
			.map_err(|source| ConfigError::UnparsableBaseUrl { source })?;
		let mut builder = Self::builder(base_url);

		if let Some(value) = lookup(ENV_API_TIMEOUT_SECS) {
			let secs = value
				.trim()
				.parse::<u32>()
				.ok()
				.filter(|secs| *secs > 0)
				.ok_or(ConfigError::InvalidEnv { name: ENV_API_TIMEOUT_SECS, value })?;

			builder = builder.timeout(Duration::seconds(secs.into()));
		}

		builder.build()
	}

	/// Resolves an endpoint path (e.g. `/colaborators/all`) against the API root.
	///
	/// Any path prefix of the base URL is preserved: `https://host/api` + `/auth` resolves to
	/// `https://host/api/auth`.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let relative = path.trim_start_matches('/');
		let mut base = self.base_url.clone();

		if !base.path().ends_with('/') {
			let with_slash = format!("{}/", base.path());

			base.set_path(&with_slash);
		}

		base.join(relative)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// API root being configured.
	pub base_url: Url,
	/// Credential storage key.
	pub token_key: String,
	/// Optional per-request timeout.
	pub timeout: Option<Duration>,
	/// Optional `User-Agent` override.
	pub user_agent: Option<String>,
}
impl ClientConfigBuilder {
	/// Creates a builder with the default storage key and no timeout.
	pub fn new(base_url: Url) -> Self {
		Self { base_url, token_key: DEFAULT_TOKEN_KEY.into(), timeout: None, user_agent: None }
	}

	/// Overrides the credential storage key.
	pub fn token_key(mut self, key: impl Into<String>) -> Self {
		self.token_key = key.into();

		self
	}

	/// Caps every request, including refresh calls, at `timeout`.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Sets the `User-Agent` header sent with every request.
	pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
		self.user_agent = Some(agent.into());

		self
	}

	/// Validates and returns the configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let invalid = |reason| ConfigError::InvalidBaseUrl { url: self.base_url.to_string(), reason };

		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(invalid("scheme must be http or https"));
		}
		if self.base_url.cannot_be_a_base() {
			return Err(invalid("URL cannot be used as a base"));
		}
		if self.token_key.trim().is_empty() {
			return Err(invalid("credential storage key must not be empty"));
		}
		if let Some(timeout) = self.timeout.filter(|t| !t.is_positive()) {
			return Err(ConfigError::InvalidTimeout(timeout));
		}

		Ok(ClientConfig {
			base_url: self.base_url,
			token_key: self.token_key,
			timeout: self.timeout,
			user_agent: self.user_agent,
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(raw: &str) -> Url {
		Url::parse(raw).expect("Fixture URL should parse.")
	}

	#[test]
	fn endpoint_keeps_base_path_prefix() {
		let config = ClientConfig::builder(url("https://api.example.com/v1"))
			.build()
			.expect("Config should build.");

		assert_eq!(
			config.endpoint("/colaborators/all").expect("Endpoint should resolve.").as_str(),
			"https://api.example.com/v1/colaborators/all"
		);
		assert_eq!(
			config.endpoint("auth").expect("Endpoint should resolve.").as_str(),
			"https://api.example.com/v1/auth"
		);
	}

	#[test]
	fn builder_rejects_non_http_schemes() {
		let err = ClientConfig::builder(url("ftp://files.example.com"))
			.build()
			.expect_err("FTP roots must be rejected.");

		assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
	}

	#[test]
	fn builder_rejects_empty_token_key_and_zero_timeout() {
		assert!(
			ClientConfig::builder(url("https://api.example.com")).token_key(" ").build().is_err()
		);
		assert!(
			ClientConfig::builder(url("https://api.example.com"))
				.timeout(Duration::ZERO)
				.build()
				.is_err()
		);
	}

	#[test]
	fn lookup_reads_url_and_timeout() {
		let config = ClientConfig::from_lookup(|name| match name {
			ENV_API_URL => Some("http://localhost:3333".into()),
			ENV_API_TIMEOUT_SECS => Some("15".into()),
			_ => None,
		})
		.expect("Lookup config should build.");

		assert_eq!(config.base_url.as_str(), "http://localhost:3333/");
		assert_eq!(config.token_key, DEFAULT_TOKEN_KEY);
		assert_eq!(config.timeout, Some(Duration::seconds(15)));
	}

	#[test]
	fn lookup_reports_missing_and_invalid_values() {
		let missing = ClientConfig::from_lookup(|_| None).expect_err("URL is required.");

		assert!(matches!(missing, ConfigError::MissingEnv(ENV_API_URL)));

		let invalid = ClientConfig::from_lookup(|name| match name {
			ENV_API_URL => Some("http://localhost:3333".into()),
			_ => Some("soon".into()),
		})
		.expect_err("Non-numeric timeout must be rejected.");

		assert!(matches!(invalid, ConfigError::InvalidEnv { name: ENV_API_TIMEOUT_SECS, .. }));
	}
}
