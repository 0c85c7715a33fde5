//! SDK entry point: builds one [`Session`] per client and exposes document-API request helpers.

// self
use crate::{
	_prelude::*,
	auth::{AuthRequirement, ClientCredentials},
	authority::AlternativeTokenSource,
	endpoint::{ApiDomain, UserApi},
	error::ConfigError,
	http::{HttpMethod, HttpTransport},
	request::{RequestDescriptor, ResponseDecoder},
	session::Session,
	store::{CredentialStore, MemoryStore},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Document API client owning one shared [`Session`].
#[derive(Clone, Debug)]
pub struct DocApiClient {
	session: Arc<Session>,
	api: ApiDomain,
}
impl DocApiClient {
	/// Starts a builder for `client`.
	pub fn builder(client: ClientCredentials) -> DocApiClientBuilder {
		DocApiClientBuilder::new(client)
	}

	/// Shared session; clone the `Arc` to hand it to other components.
	pub fn session(&self) -> &Arc<Session> {
		&self.session
	}

	/// Selected API domain.
	pub fn api(&self) -> &ApiDomain {
		&self.api
	}

	/// Starts a user-authenticated document API request carrying the domain's `Accept` header.
	pub fn api_request<T>(
		&self,
		method: HttpMethod,
		path: impl Into<String>,
		decoder: ResponseDecoder<T>,
	) -> RequestDescriptor<T> {
		RequestDescriptor::new(method, &self.api.endpoint(), path, decoder)
			.with_header("Accept", self.api.accept_header())
			.with_auth(AuthRequirement::UserBearer)
	}

	/// Removes the stored user identity and user token; the next user-scoped call provisions a
	/// new user.
	pub fn remove_stored_credentials(&self) -> Result<()> {
		self.session.authority().clear_user_identity()?;

		Ok(())
	}

	/// Removes every stored credential, client identity included.
	pub fn log_out(&self) -> Result<()> {
		self.session.log_out()
	}
}

/// Builder for [`DocApiClient`].
pub struct DocApiClientBuilder {
	client: ClientCredentials,
	api: ApiDomain,
	user_api: UserApi,
	store: Option<Arc<dyn CredentialStore>>,
	transport: Option<Arc<dyn HttpTransport>>,
	alternative_source: Option<Arc<dyn AlternativeTokenSource>>,
}
impl DocApiClientBuilder {
	fn new(client: ClientCredentials) -> Self {
		Self {
			client,
			api: ApiDomain::default(),
			user_api: UserApi::default(),
			store: None,
			transport: None,
			alternative_source: None,
		}
	}

	/// Selects the document API deployment.
	pub fn api_domain(mut self, api: ApiDomain) -> Self {
		self.api = api;

		self
	}

	/// Overrides the user/token service.
	pub fn user_api(mut self, user_api: UserApi) -> Self {
		self.user_api = user_api;

		self
	}

	/// Persists credentials in `store` instead of an in-memory store.
	pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
		self.store = Some(store);

		self
	}

	/// Uses `transport` instead of the default reqwest transport.
	pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
		self.transport = Some(transport);

		self
	}

	/// Replaces the password/provisioning bootstrap with an external token source.
	pub fn alternative_token_source(mut self, source: Arc<dyn AlternativeTokenSource>) -> Self {
		self.alternative_source = Some(source);

		self
	}

	/// Validates and persists the client credentials, then builds the client.
	///
	/// Switching to a different client id drops the previous client's tokens and user identity.
	pub fn build(self) -> Result<DocApiClient> {
		self.client.validate()?;

		let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::default()));
		let transport = match self.transport {
			Some(transport) => transport,
			None => default_transport()?,
		};
		let mut session = Session::new(store, transport, self.user_api);

		if let Some(source) = self.alternative_source {
			session = session.with_alternative_token_source(source);
		}

		session.authority().replace_client_credentials(&self.client)?;

		Ok(DocApiClient { session: Arc::new(session), api: self.api })
	}
}
impl Debug for DocApiClientBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DocApiClientBuilder")
			.field("client", &self.client)
			.field("api", &self.api)
			.field("user_api", &self.user_api)
			.field("store", &self.store.is_some())
			.field("transport", &self.transport.is_some())
			.field("alternative_source", &self.alternative_source.is_some())
			.finish()
	}
}

#[cfg(feature = "reqwest")]
fn default_transport() -> Result<Arc<dyn HttpTransport>, ConfigError> {
	let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

	Ok(Arc::new(ReqwestTransport::with_client(client)))
}

#[cfg(not(feature = "reqwest"))]
fn default_transport() -> Result<Arc<dyn HttpTransport>, ConfigError> {
	Err(ConfigError::MissingTransport)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::*,
		store::{StoreKey, StoreNamespace},
	};

	fn build_with(store: Arc<MemoryStore>, client: ClientCredentials) -> DocApiClient {
		DocApiClient::builder(client)
			.store(store)
			.transport(Arc::new(ScriptedTransport::default()))
			.user_api(user_api())
			.build()
			.expect("Client should build.")
	}

	#[test]
	fn build_persists_client_credentials() {
		let store = Arc::new(MemoryStore::default());

		build_with(store.clone(), ClientCredentials::new("client", "secret", "example.com"));

		assert_eq!(store.fetch(StoreNamespace::Auth, StoreKey::ClientId).as_deref(), Some("client"));
		assert_eq!(
			store.fetch(StoreNamespace::Auth, StoreKey::ClientDomain).as_deref(),
			Some("example.com")
		);
	}

	#[test]
	fn build_rejects_invalid_credentials() {
		let result = DocApiClient::builder(ClientCredentials::new("", "secret", "example.com"))
			.transport(Arc::new(ScriptedTransport::default()))
			.build();

		assert!(matches!(result, Err(Error::Config(ConfigError::InvalidClientCredentials { .. }))));
	}

	#[test]
	fn api_request_targets_domain_with_accept_header() {
		let store = Arc::new(MemoryStore::default());
		let client = DocApiClient::builder(ClientCredentials::new("client", "secret", "example.com"))
			.store(store)
			.transport(Arc::new(ScriptedTransport::default()))
			.api_domain(ApiDomain::Accounting)
			.build()
			.expect("Client should build.");
		let request = client.api_request(HttpMethod::Get, "/documents", ResponseDecoder::raw_bytes());

		assert_eq!(
			request.url().expect("Request URL should resolve.").as_str(),
			"https://accounting-api.docapi.net/documents"
		);
		assert_eq!(
			request.headers().get("Accept").map(String::as_str),
			Some("application/vnd.docapi.v1+json")
		);
		assert_eq!(request.auth(), AuthRequirement::UserBearer);
	}

	#[test]
	fn remove_stored_credentials_keeps_client_identity() {
		let store = Arc::new(MemoryStore::default());
		let client =
			build_with(store.clone(), ClientCredentials::new("client", "secret", "example.com"));

		store
			.save(StoreNamespace::Auth, StoreKey::UserEmail, "u@example.com")
			.expect("Memory store save should succeed.");
		store
			.save(StoreNamespace::Auth, StoreKey::UserAccessToken, "user-token")
			.expect("Memory store save should succeed.");
		client.remove_stored_credentials().expect("Removing user credentials should succeed.");

		assert!(store.fetch(StoreNamespace::Auth, StoreKey::UserEmail).is_none());
		assert!(store.fetch(StoreNamespace::Auth, StoreKey::UserAccessToken).is_none());
		assert_eq!(store.fetch(StoreNamespace::Auth, StoreKey::ClientId).as_deref(), Some("client"));

		client.log_out().expect("Logout should succeed.");

		assert!(store.is_empty());
	}
}
