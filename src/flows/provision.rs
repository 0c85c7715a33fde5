//! Anonymous user provisioning under the client's domain.

// self
use crate::{
	_prelude::*,
	auth::UserCredentials,
	error::ConfigError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::Session,
};

impl Session {
	/// Creates a random user under the stored client domain and persists its credentials.
	///
	/// The call is authenticated with the client token; a missing or rejected client token is
	/// recovered once through the client credentials grant.
	pub async fn provision_anonymous_user(&self) -> Result<UserCredentials> {
		const KIND: FlowKind = FlowKind::Provisioning;

		let span = FlowSpan::new(KIND, "provision_anonymous_user");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let client =
					self.authority.client_credentials().ok_or(ConfigError::MissingClientCredentials)?;
				let user = UserCredentials::anonymous(&client.domain);
				let request = self.user_api.create_user_request(&user)?;

				self.execute(&request, None).await?;
				self.authority.save_user_credentials(&user)?;

				Ok(user)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// self
	use crate::{
		_preludet::*,
		auth::{ClientCredentials, Token},
		store::{CredentialStore, StoreKey, StoreNamespace},
	};

	#[tokio::test]
	async fn posts_generated_user_with_client_bearer() {
		let (session, transport, store) = scripted_session();

		session
			.authority()
			.save_client_credentials(&ClientCredentials::new("client", "secret", "example.com"))
			.expect("Client credentials should persist.");
		session
			.authority()
			.save_client_token(&Token::bearer("client-token", OffsetDateTime::now_utc()))
			.expect("Client token should persist.");
		transport.push(201, "");

		let user = session.provision_anonymous_user().await.expect("Provisioning should succeed.");
		let requests = transport.requests();
		let body: serde_json::Value = serde_json::from_slice(
			requests[0].body.as_deref().expect("Provisioning should send a body."),
		)
		.expect("Provisioning body should be JSON.");

		assert_eq!(requests[0].url.path(), "/api/users");
		assert_eq!(requests[0].header("Authorization"), Some("Bearer client-token"));
		assert_eq!(requests[0].header("Content-Type"), Some("application/json"));
		assert_eq!(body["email"], user.email.as_str());
		assert!(user.email.ends_with("@example.com"));
		assert_eq!(
			store.fetch(StoreNamespace::Auth, StoreKey::UserPassword).as_deref(),
			Some(user.password.as_str())
		);
	}

	#[tokio::test]
	async fn stale_client_token_is_refetched_once() {
		let (session, transport, store) = scripted_session();

		session
			.authority()
			.save_client_credentials(&ClientCredentials::new("client", "secret", "example.com"))
			.expect("Client credentials should persist.");
		session
			.authority()
			.save_client_token(&Token::bearer("stale-client", OffsetDateTime::now_utc()))
			.expect("Client token should persist.");
		transport.push(401, "");
		transport.push(200, r#"{"access_token":"new-client","token_type":"bearer","expires_in":3600}"#);
		transport.push(201, "");

		session.provision_anonymous_user().await.expect("Provisioning should recover.");

		let requests = transport.requests();

		assert_eq!(requests.len(), 3);
		assert_eq!(requests[2].header("Authorization"), Some("Bearer new-client"));
		assert_eq!(
			store.fetch(StoreNamespace::Auth, StoreKey::ClientAccessToken).as_deref(),
			Some("new-client")
		);
	}

	#[tokio::test]
	async fn missing_client_identity_is_fatal() {
		let (session, transport, _) = scripted_session();
		let error = session
			.provision_anonymous_user()
			.await
			.expect_err("Provisioning without a client must fail.");

		assert!(error.is_fatal());
		assert!(transport.requests().is_empty());
	}
}
