//! Revocable sign-out subscriptions.
//!
//! The client notifies every subscriber whenever the stored credential becomes unusable (an
//! unrecoverable 401, a failed refresh, or an explicit sign-out). Owners hold the returned
//! [`SignOutSubscription`] for as long as their session lives; dropping or detaching it removes the
//! callback so a torn-down session never receives notifications.

// std
use std::sync::Weak;
// self
use crate::_prelude::*;

type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct ListenerSet {
	next_id: u64,
	entries: Vec<(u64, Callback)>,
}

/// Registry of sign-out callbacks shared by every clone of a client.
#[derive(Clone, Default)]
pub struct SignOutListeners(Arc<Mutex<ListenerSet>>);
impl SignOutListeners {
	/// Registers `callback` and returns the handle that detaches it.
	pub fn subscribe<F>(&self, callback: F) -> SignOutSubscription
	where
		F: 'static + Fn() + Send + Sync,
	{
		let mut set = self.0.lock();
		let id = set.next_id;

		set.next_id += 1;
		set.entries.push((id, Arc::new(callback)));

		SignOutSubscription { id, listeners: Arc::downgrade(&self.0) }
	}

	/// Invokes every registered callback in registration order and returns how many ran.
	///
	/// Callbacks run outside the registry lock, so they may subscribe or detach freely.
	pub fn notify(&self) -> usize {
		let snapshot = self.0.lock().entries.iter().map(|(_, cb)| cb.clone()).collect::<Vec<_>>();

		for callback in &snapshot {
			callback();
		}

		snapshot.len()
	}

	/// Number of live subscriptions.
	pub fn len(&self) -> usize {
		self.0.lock().entries.len()
	}

	/// Whether no subscription is registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
impl Debug for SignOutListeners {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignOutListeners").field("len", &self.len()).finish()
	}
}

/// Detachment handle returned by [`SignOutListeners::subscribe`].
#[must_use = "dropping the subscription detaches the callback immediately"]
pub struct SignOutSubscription {
	id: u64,
	listeners: Weak<Mutex<ListenerSet>>,
}
impl SignOutSubscription {
	/// Removes the callback from the registry.
	pub fn detach(self) {
		drop(self);
	}

	fn remove(&self) {
		if let Some(set) = self.listeners.upgrade() {
			set.lock().entries.retain(|(id, _)| *id != self.id);
		}
	}
}
impl Drop for SignOutSubscription {
	fn drop(&mut self) {
		self.remove();
	}
}
impl Debug for SignOutSubscription {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignOutSubscription").field("id", &self.id).finish()
	}
}
