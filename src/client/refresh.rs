//! Single-flight credential refresh with request queuing.
//!
//! The first request that observes an expired credential becomes the leader: it flips the
//! `refreshing` flag and issues the one refresh call of the cycle. Requests that expire while the
//! flag is set hand their request to the pending queue and park on a one-shot waiter instead. When
//! the refresh settles the leader resets the flag and drains the queue. On success it replays its
//! own request followed by every queued request in enqueue order, dispatching all of them from its
//! own task, and hands each waiter its response. On failure every waiter receives the refresh
//! error. The flag check-and-set and the reset-and-drain each happen under one lock acquisition and
//! never span an `.await`.

// crates.io
use futures::{channel::oneshot, future};
// self
use crate::{
	_prelude::*,
	auth::{RefreshRequest, RefreshResponse, TokenSecret},
	client::ApiClient,
	http::{ApiRequest, ApiResponse, ApiTransport},
	obs::{self, CallKind, CallSpan, RefreshMetrics},
};

/// Endpoint exchanging an expired credential for a new one.
pub const REFRESH_PATH: &str = "/user/refresh-token";

/// Request parked behind the in-flight refresh.
#[derive(Debug)]
struct Waiter {
	request: ApiRequest,
	reply: oneshot::Sender<Result<ApiResponse>>,
}

/// Process-wide refresh bookkeeping owned by a client and shared by its clones.
#[derive(Debug, Default)]
pub(crate) struct RefreshCoordinator {
	state: Mutex<RefreshState>,
	pub(crate) metrics: RefreshMetrics,
}
impl RefreshCoordinator {
	pub(crate) fn is_refreshing(&self) -> bool {
		self.state.lock().refreshing
	}

	pub(crate) fn pending(&self) -> usize {
		self.state.lock().pending.len()
	}

	/// Joins the current cycle with `request`, or starts one when none is in flight.
	fn join(self: &Arc<Self>, request: &ApiRequest) -> Role {
		let mut state = self.state.lock();

		if state.refreshing {
			let (reply, rx) = oneshot::channel();

			state.pending.push_back(Waiter { request: request.clone(), reply });

			Role::Follower(rx)
		} else {
			state.refreshing = true;

			Role::Leader(RefreshLease { coordinator: self.clone(), settled: false })
		}
	}

	/// Resets the flag and takes the queue in enqueue order.
	fn drain(&self) -> Vec<Waiter> {
		let mut state = self.state.lock();

		state.refreshing = false;

		state.pending.drain(..).collect()
	}
}

#[derive(Debug, Default)]
struct RefreshState {
	refreshing: bool,
	pending: VecDeque<Waiter>,
}

enum Role {
	Leader(RefreshLease),
	Follower(oneshot::Receiver<Result<ApiResponse>>),
}

/// Held by the leader for the duration of a refresh cycle.
///
/// Dropping an unsettled lease (the leader's future was cancelled) rejects every queued request
/// with [`Error::RefreshAborted`] so nothing waits forever and the next expiry can start a fresh
/// cycle.
struct RefreshLease {
	coordinator: Arc<RefreshCoordinator>,
	settled: bool,
}
impl RefreshLease {
	fn settle(mut self) -> Vec<Waiter> {
		self.settled = true;

		self.coordinator.drain()
	}
}
impl Drop for RefreshLease {
	fn drop(&mut self) {
		if !self.settled {
			self.coordinator.metrics.record_failure();
			obs::warn_event(CallKind::Refresh, "refresh abandoned before settling");

			for waiter in self.coordinator.drain() {
				let _ = waiter.reply.send(Err(Error::RefreshAborted));
			}
		}
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Refreshes `old_token` and replays `request` with the new credential, either by driving the
	/// cycle or by waiting for the leader of the one already in flight to replay it.
	pub(crate) async fn refresh_and_replay(
		&self,
		old_token: TokenSecret,
		request: ApiRequest,
	) -> Result<ApiResponse> {
		let lease = match self.refresh.join(&request) {
			Role::Leader(lease) => lease,
			Role::Follower(waiter) => {
				self.refresh.metrics.record_queued();
				obs::debug_event(CallKind::Request, "request queued behind in-flight refresh");

				// A dropped sender means the leader was cancelled mid-replay.
				return waiter.await.unwrap_or(Err(Error::RefreshAborted));
			},
		};
		let outcome = self.run_refresh(&old_token).await;
		let waiters = lease.settle();
		let token = match outcome {
			Ok(token) => token,
			Err(err) => {
				for waiter in waiters {
					let _ = waiter.reply.send(Err(err.clone()));
				}

				return Err(err);
			},
		};

		if !waiters.is_empty() {
			obs::debug_event(CallKind::Refresh, "replaying queued requests");
		}

		let queued = waiters.iter().map(|waiter| self.replay(&waiter.request, &token));
		let (own, replays) = future::join(
			self.replay(&request, &token),
			future::join_all(queued),
		)
		.await;

		for (waiter, result) in waiters.into_iter().zip(replays) {
			// A closed receiver means the caller gave up on its request.
			let _ = waiter.reply.send(result);
		}

		own
	}

	/// Issues the refresh call and applies its side effects.
	///
	/// The call is dispatched straight to the transport, so a 401 on the refresh endpoint is a
	/// refresh failure rather than another expiry to queue behind. Every failure revokes the
	/// session and surfaces as [`Error::RefreshFailed`].
	async fn run_refresh(&self, old_token: &TokenSecret) -> Result<TokenSecret> {
		let span = CallSpan::new(CallKind::Refresh, "refresh_token");

		self.refresh.metrics.record_attempt();
		obs::debug_event(CallKind::Refresh, "refresh started");

		let result = span
			.instrument(async {
				let request = ApiRequest::post(REFRESH_PATH)
					.json(&RefreshRequest { old_token: old_token.expose() })?
					.authorized(Some(old_token));
				let response = self.dispatch(request).await?.error_for_status()?;
				let RefreshResponse { token } = response.json()?;

				self.store.set(&self.config.token_key, token.clone()).await?;

				Ok::<_, Error>(token)
			})
			.await;

		match result {
			Ok(token) => {
				self.refresh.metrics.record_success();
				obs::debug_event(CallKind::Refresh, "refresh succeeded");

				Ok(token)
			},
			Err(err) => {
				self.refresh.metrics.record_failure();
				self.revoke_session(CallKind::Refresh).await;

				Err(Error::RefreshFailed { source: Box::new(err) })
			},
		}
	}
}
