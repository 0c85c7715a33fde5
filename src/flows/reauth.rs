//! Re-authentication protocol run after an auth failure on a bearer requirement.
//!
//! The user tier walks [`ReauthStep`] from whatever the store already holds: a stored user only
//! needs a password grant, a missing user needs provisioning first, and provisioning needs a
//! client token. With an alternative token source configured, the whole walk is replaced by one
//! call to that source.

// self
use crate::{
	_prelude::*,
	auth::UserCredentials,
	authority::{AlternativeTokenSource, TokenAuthority},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::{AuthFailure, Session},
};

/// Remaining work of the user-tier bootstrap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReauthStep {
	/// Obtain a client token through the client credentials grant.
	NeedClientToken,
	/// Provision an anonymous user with the client token.
	NeedUserProvisioned,
	/// Log the given user in through the password grant.
	NeedUserToken(UserCredentials),
	/// A fresh user token is stored.
	Ready,
}
impl ReauthStep {
	/// First step for the state currently held by `authority`.
	pub fn initial(authority: &TokenAuthority) -> Self {
		match authority.user_credentials() {
			Some(user) => Self::NeedUserToken(user),
			None if authority.has_client_token() => Self::NeedUserProvisioned,
			None => Self::NeedClientToken,
		}
	}
}

impl Session {
	/// Recovers the user tier after `failure`.
	///
	/// Recoveries are serialized; one that finds the user token generation moved past what
	/// `failure` observed returns immediately so the caller retries with the fresh token.
	pub(crate) async fn recover_user(&self, failure: AuthFailure) -> Result<()> {
		const KIND: FlowKind = FlowKind::Reauthentication;

		let span = FlowSpan::new(KIND, "recover_user");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _guard = self.guards.user.lock().await;

				if self.guards.user_generation() != failure.generation {
					return Ok(());
				}
				if failure.was_rejected() {
					self.authority.clear_user_identity()?;
				}

				self.authenticate_user().await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Recovers the client tier after `failure` by re-running the client credentials grant.
	pub(crate) async fn recover_client(&self, failure: AuthFailure) -> Result<()> {
		const KIND: FlowKind = FlowKind::Reauthentication;

		let span = FlowSpan::new(KIND, "recover_client");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _guard = self.guards.client.lock().await;

				if self.guards.client_generation() != failure.generation {
					return Ok(());
				}
				if failure.was_rejected() {
					self.authority.clear_client_token()?;
				}

				self.fetch_client_token().await?;

				Ok(())
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn authenticate_user(&self) -> Result<()> {
		if let Some(source) = &self.alternative_source {
			return self.fetch_alternative_token(source.as_ref()).await;
		}

		let mut step = ReauthStep::initial(&self.authority);

		loop {
			step = match step {
				ReauthStep::NeedClientToken => {
					self.fetch_client_token().await?;

					ReauthStep::NeedUserProvisioned
				},
				ReauthStep::NeedUserProvisioned =>
					ReauthStep::NeedUserToken(self.provision_anonymous_user().await?),
				ReauthStep::NeedUserToken(user) => {
					self.login_user(&user).await?;

					ReauthStep::Ready
				},
				ReauthStep::Ready => return Ok(()),
			};
		}
	}

	async fn fetch_alternative_token(&self, source: &dyn AlternativeTokenSource) -> Result<()> {
		const KIND: FlowKind = FlowKind::AlternativeSource;

		let span = FlowSpan::new(KIND, "fetch_alternative_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token = source.fetch_token().await?;

				self.authority.save_user_token(&token)?;
				self.guards.bump_user();

				Ok(())
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
