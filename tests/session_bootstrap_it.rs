mod common;

// std
use std::time::Duration as StdDuration;
// crates.io
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use common::*;
use docapi_client::{
	auth::{Token, UserCredentials},
	error::Error,
	store::{CredentialStore, StoreKey, StoreNamespace},
};

#[tokio::test]
async fn anonymous_bootstrap_runs_full_protocol_then_retries() {
	let server = MockServer::start_async().await;
	let (client, store) = build_client(&server);
	let client_token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.query_param("grant_type", "client_credentials")
				.header("authorization", CLIENT_BASIC);
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("client-token", 3600));
		})
		.await;
	let provision = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/users")
				.header("authorization", "Bearer client-token")
				.header("content-type", "application/json");
			then.status(201);
		})
		.await;
	let password = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.query_param("grant_type", "password")
				.header("authorization", CLIENT_BASIC)
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("user-token", 3600));
		})
		.await;
	let document = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(DOCUMENT_PATH)
				.header("authorization", "Bearer user-token")
				.header("accept", ACCEPT_V2);
			then.status(200).body("{\"id\":\"doc-1\"}");
		})
		.await;
	let body = client
		.session()
		.execute(&document_request(&client), None)
		.await
		.expect("Bootstrapped request should succeed.");

	assert_eq!(body, "{\"id\":\"doc-1\"}");

	client_token.assert_calls_async(1).await;
	provision.assert_calls_async(1).await;
	password.assert_calls_async(1).await;
	document.assert_calls_async(1).await;

	let email = store
		.fetch(StoreNamespace::Auth, StoreKey::UserEmail)
		.expect("Provisioned user email should be stored.");

	assert!(email.ends_with("@example.com"));
	assert!(store.fetch(StoreNamespace::Auth, StoreKey::UserPassword).is_some());
	assert_eq!(
		store.fetch(StoreNamespace::Auth, StoreKey::UserAccessToken).as_deref(),
		Some("user-token")
	);
	assert_eq!(
		store.fetch(StoreNamespace::Auth, StoreKey::ClientAccessToken).as_deref(),
		Some("client-token")
	);
}

#[tokio::test]
async fn invalid_stored_password_surfaces_unauthorized_without_retry() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);

	client
		.session()
		.authority()
		.save_user_credentials(&UserCredentials::new("known@example.com", "wrong-password"))
		.expect("User credentials should persist.");

	let password = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").query_param("grant_type", "password");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;
	let provision = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/users");
			then.status(201);
		})
		.await;
	let document = server
		.mock_async(|when, then| {
			when.method(GET).path(DOCUMENT_PATH);
			then.status(200).body("{}");
		})
		.await;
	let result = client.session().execute(&document_request(&client), None).await;

	assert!(matches!(result, Err(Error::Unauthorized)));

	password.assert_calls_async(1).await;
	provision.assert_calls_async(0).await;
	document.assert_calls_async(0).await;
}

#[tokio::test]
async fn valid_token_is_reused_until_expiry_then_refreshed_once() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let authority = client.session().authority();

	authority
		.save_user_credentials(&UserCredentials::new("known@example.com", "secret"))
		.expect("User credentials should persist.");
	authority
		.save_user_token(&Token::bearer("first-token", OffsetDateTime::now_utc() + Duration::seconds(2)))
		.expect("User token should persist.");

	let password = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").query_param("grant_type", "password");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("second-token", 3600));
		})
		.await;
	let first = server
		.mock_async(|when, then| {
			when.method(GET).path(DOCUMENT_PATH).header("authorization", "Bearer first-token");
			then.status(200).body("first");
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(GET).path(DOCUMENT_PATH).header("authorization", "Bearer second-token");
			then.status(200).body("second");
		})
		.await;
	let request = document_request(&client);

	for _ in 0..2 {
		let body = client.session().execute(&request, None).await.expect("Cached call should succeed.");

		assert_eq!(body, "first");
	}

	password.assert_calls_async(0).await;
	tokio::time::sleep(StdDuration::from_millis(2_100)).await;

	let body = client.session().execute(&request, None).await.expect("Refreshed call should succeed.");

	assert_eq!(body, "second");

	first.assert_calls_async(2).await;
	password.assert_calls_async(1).await;
	second.assert_calls_async(1).await;
}

#[tokio::test]
async fn rejected_token_provisions_a_new_user() {
	let server = MockServer::start_async().await;
	let (client, store) = build_client(&server);
	let authority = client.session().authority();

	authority
		.save_user_credentials(&UserCredentials::new("revoked@example.com", "secret"))
		.expect("User credentials should persist.");
	authority
		.save_user_token(&Token::bearer("revoked-token", OffsetDateTime::now_utc() + Duration::hours(1)))
		.expect("User token should persist.");

	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path(DOCUMENT_PATH).header("authorization", "Bearer revoked-token");
			then.status(401);
		})
		.await;
	let client_token = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").query_param("grant_type", "client_credentials");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("client-token", 3600));
		})
		.await;
	let provision = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/users");
			then.status(201);
		})
		.await;
	let password = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").query_param("grant_type", "password");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("fresh-token", 3600));
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path(DOCUMENT_PATH).header("authorization", "Bearer fresh-token");
			then.status(200).body("ok");
		})
		.await;
	let body = client
		.session()
		.execute(&document_request(&client), None)
		.await
		.expect("Call should succeed after re-provisioning.");

	assert_eq!(body, "ok");

	rejected.assert_calls_async(1).await;
	client_token.assert_calls_async(1).await;
	provision.assert_calls_async(1).await;
	password.assert_calls_async(1).await;
	accepted.assert_calls_async(1).await;

	assert_ne!(
		store.fetch(StoreNamespace::Auth, StoreKey::UserEmail).as_deref(),
		Some("revoked@example.com")
	);
}

#[tokio::test]
async fn concurrent_failures_share_one_reauthentication() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let client_token = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").query_param("grant_type", "client_credentials");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("client-token", 3600));
		})
		.await;
	let provision = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/users");
			then.status(201);
		})
		.await;
	let password = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").query_param("grant_type", "password");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("user-token", 3600))
				.delay(StdDuration::from_millis(100));
		})
		.await;
	let document = server
		.mock_async(|when, then| {
			when.method(GET).path(DOCUMENT_PATH).header("authorization", "Bearer user-token");
			then.status(200).body("ok");
		})
		.await;
	let request = document_request(&client);
	let session = client.session();
	let (first, second) =
		tokio::join!(session.execute(&request, None), session.execute(&request, None));

	assert_eq!(first.expect("First concurrent call should succeed."), "ok");
	assert_eq!(second.expect("Second concurrent call should succeed."), "ok");

	client_token.assert_calls_async(1).await;
	provision.assert_calls_async(1).await;
	password.assert_calls_async(1).await;
	document.assert_calls_async(2).await;
}
