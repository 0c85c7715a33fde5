//! Demonstrates the anonymous-user bootstrap: the first user-scoped request provisions a user,
//! logs it in, and retries; the second request reuses the stored token.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use docapi_client::{
	auth::ClientCredentials,
	client::DocApiClient,
	endpoint::{ApiDomain, ServiceEndpoint, UserApi},
	http::HttpMethod,
	request::ResponseDecoder,
	store::{CredentialStore, MemoryStore, StoreKey, StoreNamespace},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let endpoint = ServiceEndpoint::parse(&server.base_url())?;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let users_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/users");
			then.status(201);
		})
		.await;
	let document_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/documents").header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":\"doc-1\"},{\"id\":\"doc-2\"}]");
		})
		.await;
	let store = Arc::new(MemoryStore::default());
	let client = DocApiClient::builder(ClientCredentials::new("demo-client", "super-secret", "demo.local"))
		.api_domain(ApiDomain::Custom(endpoint.clone()))
		.user_api(UserApi::new(endpoint))
		.store(store.clone())
		.build()?;
	let request =
		client.api_request(HttpMethod::Get, "/documents", ResponseDecoder::<serde_json::Value>::json());

	for round in 1..=2 {
		let documents = client.session().execute(&request, None).await?;

		println!("Round {round}: {documents}.");
	}

	println!(
		"Provisioned user: {}.",
		store.fetch(StoreNamespace::Auth, StoreKey::UserEmail).unwrap_or_default()
	);

	// One client token plus one password grant.
	token_mock.assert_calls_async(2).await;
	users_mock.assert_async().await;
	document_mock.assert_calls_async(2).await;

	Ok(())
}
