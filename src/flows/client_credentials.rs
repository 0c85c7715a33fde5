//! Client credentials grant: obtains the token that authorizes user provisioning.

// self
use crate::{
	_prelude::*,
	auth::Token,
	endpoint::GrantType,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::Session,
};

impl Session {
	/// Performs the `client_credentials` grant and stores the result as the client token.
	pub async fn fetch_client_token(&self) -> Result<Token> {
		const KIND: FlowKind = FlowKind::ClientCredentials;

		let span = FlowSpan::new(KIND, "fetch_client_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.user_api.token_request(GrantType::ClientCredentials, []);
				let token = self.execute(&request, None).await?;

				self.authority.save_client_token(&token)?;
				self.guards.bump_client();

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
