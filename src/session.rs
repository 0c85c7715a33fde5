//! Explicit session object shared by every request-issuing component.
//!
//! A [`Session`] owns the transport, the [`TokenAuthority`], the user/token service endpoint, and
//! the re-authentication guards. One session is built per client and handed around behind an
//! `Arc`; nothing about it is global.

mod executor;

pub(crate) use executor::AuthFailure;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	authority::{AlternativeTokenSource, TokenAuthority},
	endpoint::UserApi,
	http::HttpTransport,
	store::CredentialStore,
};

/// Transport, credentials, and re-authentication state for one client instance.
pub struct Session {
	pub(crate) transport: Arc<dyn HttpTransport>,
	pub(crate) authority: TokenAuthority,
	pub(crate) user_api: UserApi,
	pub(crate) alternative_source: Option<Arc<dyn AlternativeTokenSource>>,
	pub(crate) guards: AuthGuards,
}
impl Session {
	/// Creates a session over `store` and `transport`.
	pub fn new(
		store: Arc<dyn CredentialStore>,
		transport: Arc<dyn HttpTransport>,
		user_api: UserApi,
	) -> Self {
		Self {
			transport,
			authority: TokenAuthority::new(store),
			user_api,
			alternative_source: None,
			guards: AuthGuards::default(),
		}
	}

	/// Routes re-authentication through `source` instead of the password/provisioning bootstrap.
	pub fn with_alternative_token_source(mut self, source: Arc<dyn AlternativeTokenSource>) -> Self {
		self.alternative_source = Some(source);

		self
	}

	/// Credential resolver and persistence facade.
	pub fn authority(&self) -> &TokenAuthority {
		&self.authority
	}

	/// User/token service endpoint.
	pub fn user_api(&self) -> &UserApi {
		&self.user_api
	}

	/// Returns `true` when an alternative token source is configured.
	pub fn has_alternative_token_source(&self) -> bool {
		self.alternative_source.is_some()
	}

	/// Runs the re-authentication protocol now, as if a user-scoped request had been rejected
	/// for a missing token.
	pub async fn log_in(&self) -> Result<()> {
		let observed = self.guards.user_generation();

		self.recover_user(AuthFailure::unresolved_user(observed)).await
	}

	/// Removes every stored credential, client identity included.
	pub fn log_out(&self) -> Result<()> {
		self.authority.remove_all()?;

		Ok(())
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("user_api", &self.user_api)
			.field("alternative_source", &self.alternative_source.is_some())
			.field("user_generation", &self.guards.user_generation())
			.field("client_generation", &self.guards.client_generation())
			.finish()
	}
}

/// Per-tier re-authentication guards.
///
/// Each tier has one async mutex serializing its recoveries and a generation counter bumped
/// whenever a new token of that tier is stored. A recovery that finds the generation moved past
/// what its failed attempt observed knows a concurrent caller already refreshed, and skips
/// straight to the retry. The user lock may be held while taking the client lock, never the
/// reverse.
#[derive(Debug, Default)]
pub(crate) struct AuthGuards {
	pub(crate) user: AsyncMutex<()>,
	pub(crate) client: AsyncMutex<()>,
	user_generation: AtomicU64,
	client_generation: AtomicU64,
}
impl AuthGuards {
	pub(crate) fn user_generation(&self) -> u64 {
		self.user_generation.load(Ordering::SeqCst)
	}

	pub(crate) fn client_generation(&self) -> u64 {
		self.client_generation.load(Ordering::SeqCst)
	}

	pub(crate) fn bump_user(&self) {
		self.user_generation.fetch_add(1, Ordering::SeqCst);
	}

	pub(crate) fn bump_client(&self) {
		self.client_generation.fetch_add(1, Ordering::SeqCst);
	}
}
