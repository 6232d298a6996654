//! Authenticated API client: bearer attachment, expiry interception, and session revocation.
//!
//! Every call made through [`ApiClient::send`] reads the stored credential and attaches it as a
//! bearer header. Failed responses are classified as follows:
//!
//! - 401 with body message `jwt expired` and a stored credential: the credential is refreshed
//!   (see [`refresh`]) and the request is replayed once with the new credential. If another cycle
//!   already replaced the credential the request was sent with, it is replayed without refreshing.
//!   A failed refresh revokes the session and surfaces as [`Error::RefreshFailed`].
//! - 401 with the expiry message but no stored credential: sign-out subscribers are notified and
//!   the error is returned.
//! - Any other 401: the stored credential is removed, subscribers are notified, and the error is
//!   returned.
//! - Every other status or transport failure is returned untouched.

pub mod refresh;
pub mod session;

pub use refresh::REFRESH_PATH;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{SignOutListeners, SignOutSubscription, TokenSecret},
	client::refresh::RefreshCoordinator,
	config::ClientConfig,
	error::ApiError,
	http::{ApiRequest, ApiResponse, ApiTransport},
	obs::{self, CallKind, CallOutcome, CallSpan, RefreshMetrics},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// HTTP client wrapper sitting between application code and the API.
///
/// Clones share the transport, credential store, sign-out subscribers, and refresh state, so at
/// most one refresh call is in flight across all of them.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Resolved configuration (API root, storage key, limits).
	pub config: Arc<ClientConfig>,
	/// Transport used for every outbound call.
	pub transport: Arc<T>,
	/// Storage holding the live credential.
	pub store: Arc<dyn CredentialStore>,
	listeners: SignOutListeners,
	refresh: Arc<RefreshCoordinator>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client around a caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn CredentialStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			config: Arc::new(config),
			transport: transport.into(),
			store,
			listeners: SignOutListeners::default(),
			refresh: Default::default(),
		}
	}

	/// Registers the application's sign-out callback.
	///
	/// Keep the returned handle alive for the lifetime of the owning session; detaching or
	/// dropping it stops notifications, which lets a recreated session swap its callback in.
	pub fn subscribe_sign_out<F>(&self, callback: F) -> SignOutSubscription
	where
		F: 'static + Fn() + Send + Sync,
	{
		self.listeners.subscribe(callback)
	}

	/// Registry of sign-out subscribers.
	pub fn sign_out_listeners(&self) -> &SignOutListeners {
		&self.listeners
	}

	/// Reads the stored credential.
	pub async fn token(&self) -> Result<Option<TokenSecret>> {
		Ok(self.store.get(&self.config.token_key).await?)
	}

	/// Whether a credential is currently stored.
	pub async fn is_authenticated(&self) -> Result<bool> {
		Ok(self.token().await?.is_some())
	}

	/// Whether a refresh call is currently in flight.
	pub fn is_refreshing(&self) -> bool {
		self.refresh.is_refreshing()
	}

	/// Number of requests waiting on the in-flight refresh.
	pub fn pending_requests(&self) -> usize {
		self.refresh.pending()
	}

	/// Counters describing refresh cycles observed by this client and its clones.
	pub fn refresh_metrics(&self) -> &RefreshMetrics {
		&self.refresh.metrics
	}

	/// Sends `request` with the stored credential attached, refreshing and replaying it
	/// transparently when the credential has expired.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "send");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.send_intercepted(request)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Sends `request` and decodes the success body as `R`.
	pub async fn send_json<R>(&self, request: ApiRequest) -> Result<R>
	where
		R: DeserializeOwned,
	{
		Ok(self.send(request).await?.json()?)
	}

	/// `GET path`, decoding the body as `R`.
	pub async fn get<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::get(path)).await
	}

	/// `POST path` with a JSON body, decoding the response as `R`.
	pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::post(path).json(body)?).await
	}

	/// `PUT path` without a body; the response body is ignored.
	pub async fn put(&self, path: &str) -> Result<()> {
		self.send(ApiRequest::put(path)).await.map(drop)
	}

	/// `DELETE path`; the response body is ignored.
	pub async fn delete(&self, path: &str) -> Result<()> {
		self.send(ApiRequest::delete(path)).await.map(drop)
	}

	async fn send_intercepted(&self, request: ApiRequest) -> Result<ApiResponse> {
		let sent_with = self.token().await?;
		let response = self.dispatch(request.authorized(sent_with.as_ref())).await?;
		let err = match response.error_for_status() {
			Ok(response) => return Ok(response),
			Err(err) => err,
		};

		if !err.is_token_expired() {
			return Err(self.reject(err).await);
		}

		let Some(stored) = self.token().await? else {
			obs::warn_event(CallKind::SignOut, "credential expired with nothing stored");
			self.listeners.notify();

			return Err(err.into());
		};
		// A cycle that settled while this request was in flight already stored a newer
		// credential; replay with it instead of refreshing again.
		if sent_with.as_ref() == Some(&stored) {
			self.refresh_and_replay(stored, request).await
		} else {
			self.replay(&request, &stored).await
		}
	}

	/// Resends `request` with `token`. A replay is never refreshed twice; a second expiry ends
	/// the session.
	async fn replay(&self, request: &ApiRequest, token: &TokenSecret) -> Result<ApiResponse> {
		let response = self.dispatch(request.authorized(Some(token))).await?;

		match response.error_for_status() {
			Ok(response) => Ok(response),
			Err(err) => Err(self.reject(err).await),
		}
	}

	/// Applies the side effects of a failed response that will not be refreshed.
	async fn reject(&self, err: ApiError) -> Error {
		if err.is_unauthorized() {
			self.revoke_session(CallKind::Request).await;
		}

		err.into()
	}

	/// Removes the stored credential and notifies sign-out subscribers.
	///
	/// A storage failure is logged and swallowed so the caller still receives the error that
	/// triggered the revocation.
	pub(crate) async fn revoke_session(&self, kind: CallKind) {
		obs::warn_event(kind, "session revoked");

		if self.store.remove(&self.config.token_key).await.is_err() {
			obs::warn_event(kind, "failed to remove stored credential");
		}

		self.listeners.notify();
	}

	/// Resolves the request URL and hands the request to the transport, with no interception.
	pub(crate) async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
		let url = self.config.endpoint(&request.path)?;

		Ok(self.transport.execute(url, request).await?)
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client that provisions its own reqwest transport from `config`.
	pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ConfigError> {
		let transport = ReqwestTransport::from_config(&config)?;

		Ok(Self::with_transport(config, store, transport))
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			transport: self.transport.clone(),
			store: self.store.clone(),
			listeners: self.listeners.clone(),
			refresh: self.refresh.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("token_key", &self.config.token_key)
			.field("refreshing", &self.is_refreshing())
			.field("sign_out_listeners", &self.listeners.len())
			.finish()
	}
}
