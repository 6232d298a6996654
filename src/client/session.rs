//! Sign-in, sign-out, and the current-user lookup.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, SignIn, TokenSecret, User, UserEnvelope},
	client::ApiClient,
	http::{ApiRequest, ApiTransport},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Email/password authentication endpoint.
pub const SIGN_IN_PATH: &str = "/auth";
/// Current-user endpoint.
pub const USER_PATH: &str = "/user";

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Authenticates with `credentials` and persists the issued credential.
	pub async fn sign_in(&self, credentials: &Credentials) -> Result<SignIn> {
		const KIND: CallKind = CallKind::SignIn;

		let span = CallSpan::new(KIND, "sign_in");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let sign_in: SignIn =
					self.send_json(ApiRequest::post(SIGN_IN_PATH).json(credentials)?).await?;

				self.store_token(sign_in.access_token.clone()).await?;

				Ok::<_, Error>(sign_in)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Fetches the profile of the signed-in user.
	pub async fn current_user(&self) -> Result<User> {
		let UserEnvelope { user } = self.get(USER_PATH).await?;

		Ok(user)
	}

	/// Persists `token` as the live credential, replacing any previous one.
	pub async fn store_token(&self, token: TokenSecret) -> Result<()> {
		Ok(self.store.set(&self.config.token_key, token).await?)
	}

	/// Removes the stored credential and notifies sign-out subscribers.
	///
	/// Subscribers are notified even when the store fails to remove the credential.
	pub async fn sign_out(&self) -> Result<()> {
		const KIND: CallKind = CallKind::SignOut;

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let removed = self.store.remove(&self.config.token_key).await;

		self.sign_out_listeners().notify();

		match removed {
			Ok(()) => {
				obs::record_call_outcome(KIND, CallOutcome::Success);

				Ok(())
			},
			Err(err) => {
				obs::record_call_outcome(KIND, CallOutcome::Failure);

				Err(err.into())
			},
		}
	}
}
