//! Shared fixtures for integration tests running against an `httpmock` server.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
// self
use docapi_client::{
	auth::ClientCredentials,
	client::DocApiClient,
	endpoint::{ApiDomain, ServiceEndpoint, UserApi},
	http::HttpMethod,
	request::{RequestDescriptor, ResponseDecoder},
	store::{CredentialStore, MemoryStore},
};

pub const CLIENT_ID: &str = "integration-client";
pub const CLIENT_SECRET: &str = "integration-secret";
pub const CLIENT_DOMAIN: &str = "example.com";
/// `base64("integration-client:integration-secret")`.
pub const CLIENT_BASIC: &str = "Basic aW50ZWdyYXRpb24tY2xpZW50OmludGVncmF0aW9uLXNlY3JldA==";
pub const DOCUMENT_PATH: &str = "/documents/doc-1";
pub const ACCEPT_V2: &str = "application/vnd.docapi.v2+json";

pub fn endpoint(server: &MockServer) -> ServiceEndpoint {
	ServiceEndpoint::parse(&server.base_url()).expect("Mock server URL should parse as an endpoint.")
}

pub fn credentials() -> ClientCredentials {
	ClientCredentials::new(CLIENT_ID, CLIENT_SECRET, CLIENT_DOMAIN)
}

pub fn build_client_with_store(server: &MockServer, store: Arc<dyn CredentialStore>) -> DocApiClient {
	DocApiClient::builder(credentials())
		.api_domain(ApiDomain::Custom(endpoint(server)))
		.user_api(UserApi::new(endpoint(server)))
		.store(store)
		.build()
		.expect("Client should build against the mock server.")
}

pub fn build_client(server: &MockServer) -> (DocApiClient, Arc<MemoryStore>) {
	let store = Arc::new(MemoryStore::default());
	let client = build_client_with_store(server, store.clone());

	(client, store)
}

pub fn document_request(client: &DocApiClient) -> RequestDescriptor<String> {
	client.api_request(HttpMethod::Get, DOCUMENT_PATH, ResponseDecoder::raw_string())
}

pub fn token_body(access_token: &str, expires_in: u64) -> String {
	format!(
		"{{\"access_token\":\"{access_token}\",\"token_type\":\"bearer\",\"expires_in\":{expires_in},\"scope\":\"read write\"}}"
	)
}
