//! Cooperative, single-use cancellation for executor calls.
//!
//! A token moves one way, from pending to cancelled. The executor checks it before sending,
//! attaches the in-flight transport future to it while waiting, and checks it again once the call
//! completes so a late result is never delivered. The token only holds an [`AbortHandle`], which
//! never keeps the transport future alive.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// crates.io
use futures::future::{AbortHandle, AbortRegistration};
// self
use crate::_prelude::*;

/// Caller-owned cancellation flag shared with the executor.
///
/// Clones observe and control the same state.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<CancelState>);
impl CancellationToken {
	/// Creates a pending token.
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks the token cancelled and aborts the attached network operation, if any.
	pub fn cancel(&self) {
		self.0.cancelled.store(true, Ordering::SeqCst);

		if let Some(handle) = self.0.in_flight.lock().take() {
			handle.abort();
		}
	}

	/// Returns `true` once [`cancel`](Self::cancel) has been called.
	pub fn is_cancelled(&self) -> bool {
		self.0.cancelled.load(Ordering::SeqCst)
	}

	/// Registers a new in-flight operation; `None` when the token is already cancelled.
	pub(crate) fn attach(&self) -> Option<AbortRegistration> {
		let mut in_flight = self.0.in_flight.lock();

		if self.is_cancelled() {
			return None;
		}

		let (handle, registration) = AbortHandle::new_pair();

		*in_flight = Some(handle);

		Some(registration)
	}

	/// Forgets the in-flight operation once it completed.
	pub(crate) fn detach(&self) {
		self.0.in_flight.lock().take();
	}
}

#[derive(Debug, Default)]
struct CancelState {
	cancelled: AtomicBool,
	in_flight: Mutex<Option<AbortHandle>>,
}

/// Returns `true` when `token` is present and cancelled.
pub(crate) fn is_cancelled(token: Option<&CancellationToken>) -> bool {
	token.is_some_and(CancellationToken::is_cancelled)
}
