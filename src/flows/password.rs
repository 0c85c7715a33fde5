//! Resource-owner password grant for a known user identity.

// self
use crate::{
	_prelude::*,
	auth::{Token, UserCredentials},
	endpoint::GrantType,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::Session,
};

impl Session {
	/// Performs the `password` grant for `user` and stores the result as the user token.
	///
	/// The request authenticates with the client's Basic credential and posts `username` and
	/// `password` form-encoded. A successful login replaces any previous user token.
	pub async fn login_user(&self, user: &UserCredentials) -> Result<Token> {
		const KIND: FlowKind = FlowKind::Password;

		let span = FlowSpan::new(KIND, "login_user");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.user_api.token_request(
					GrantType::Password,
					[("username", user.email.as_str()), ("password", user.password.as_str())],
				);
				let token = self.execute(&request, None).await?;

				self.authority.save_user_token(&token)?;
				self.guards.bump_user();

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
