//! Service endpoints, API domain selection, and the user/token service requests.

// self
use crate::{
	_prelude::*,
	auth::{AuthRequirement, Token, UserCredentials},
	error::ConfigError,
	http::HttpMethod,
	request::{RequestDescriptor, ResponseDecoder},
};

/// URL scheme accepted for service endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
	/// Plain HTTP, mostly for local mock servers.
	Http,
	/// HTTPS.
	#[default]
	Https,
}
impl Scheme {
	/// Returns the scheme label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Http => "http",
			Self::Https => "https",
		}
	}
}

/// Scheme plus host (optionally `host:port`) of a remote service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceEndpoint {
	/// URL scheme.
	pub scheme: Scheme,
	/// Host, with an explicit port when one is needed.
	pub host: String,
}
impl ServiceEndpoint {
	/// HTTPS endpoint for `host`.
	pub fn https(host: impl Into<String>) -> Self {
		Self { scheme: Scheme::Https, host: host.into() }
	}

	/// Parses a base URL such as `https://api.example.com` or `http://127.0.0.1:8080`.
	///
	/// Any path, query, or fragment is ignored.
	pub fn parse(raw: &str) -> Result<Self, ConfigError> {
		let url = Url::parse(raw)
			.map_err(|source| ConfigError::InvalidUrl { url: raw.to_owned(), source })?;
		let scheme = match url.scheme() {
			"http" => Scheme::Http,
			"https" => Scheme::Https,
			other => return Err(ConfigError::UnsupportedScheme { scheme: other.to_owned() }),
		};
		let host = url.host_str().ok_or_else(|| ConfigError::MissingHost { url: raw.to_owned() })?;
		let host = match url.port() {
			Some(port) => format!("{host}:{port}"),
			None => host.to_owned(),
		};

		Ok(Self { scheme, host })
	}

	/// Renders `scheme://host`.
	pub fn base_url(&self) -> String {
		format!("{}://{}", self.scheme.as_str(), self.host)
	}
}

/// Document API deployment the client talks to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ApiDomain {
	/// Main document API.
	#[default]
	Default,
	/// Accounting document API, served on the v1 media type.
	Accounting,
	/// Self-hosted or proxied deployment.
	Custom(ServiceEndpoint),
}
impl ApiDomain {
	/// Host of the main document API.
	pub const DEFAULT_HOST: &'static str = "api.docapi.net";
	/// Host of the accounting document API.
	pub const ACCOUNTING_HOST: &'static str = "accounting-api.docapi.net";

	/// Resolved endpoint.
	pub fn endpoint(&self) -> ServiceEndpoint {
		match self {
			Self::Default => ServiceEndpoint::https(Self::DEFAULT_HOST),
			Self::Accounting => ServiceEndpoint::https(Self::ACCOUNTING_HOST),
			Self::Custom(endpoint) => endpoint.clone(),
		}
	}

	/// API version negotiated through the `Accept` header.
	pub const fn api_version(&self) -> u8 {
		match self {
			Self::Accounting => 1,
			Self::Default | Self::Custom(_) => 2,
		}
	}

	/// Vendor media type for this domain, e.g. `application/vnd.docapi.v2+json`.
	pub fn accept_header(&self) -> String {
		format!("application/vnd.docapi.v{}+json", self.api_version())
	}
}

/// OAuth 2.0 grants issued against the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantType {
	/// Resource-owner password grant.
	Password,
	/// Client credentials grant.
	ClientCredentials,
}
impl GrantType {
	/// Returns the `grant_type` parameter value.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Password => "password",
			Self::ClientCredentials => "client_credentials",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// User and token service used by the re-authentication protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserApi {
	/// Service endpoint.
	pub endpoint: ServiceEndpoint,
}
impl UserApi {
	/// Production host of the user service.
	pub const DEFAULT_HOST: &'static str = "user.docapi.net";
	/// Token endpoint path.
	pub const TOKEN_PATH: &'static str = "/oauth/token";
	/// User provisioning path.
	pub const USERS_PATH: &'static str = "/api/users";

	/// Targets a custom user service.
	pub fn new(endpoint: ServiceEndpoint) -> Self {
		Self { endpoint }
	}

	/// `POST /oauth/token?grant_type=…` authenticated with the client's Basic credential.
	///
	/// Password grants pass the form pairs in `form`; client credentials grants pass none.
	pub fn token_request<'a>(
		&self,
		grant: GrantType,
		form: impl IntoIterator<Item = (&'a str, &'a str)>,
	) -> RequestDescriptor<Token> {
		RequestDescriptor::new(HttpMethod::Post, &self.endpoint, Self::TOKEN_PATH, ResponseDecoder::json())
			.with_query("grant_type", grant.as_str())
			.with_header("Accept", "application/json")
			.with_form_body(form)
			.with_auth(AuthRequirement::ClientBasic)
			.with_sensitive_response()
	}

	/// `POST /api/users` with a `{email, password}` body, authenticated with the client token.
	pub fn create_user_request(
		&self,
		user: &UserCredentials,
	) -> Result<RequestDescriptor<String>, ConfigError> {
		RequestDescriptor::new(
			HttpMethod::Post,
			&self.endpoint,
			Self::USERS_PATH,
			ResponseDecoder::raw_string(),
		)
		.with_header("Accept", "application/json")
		.with_json_body(user)
		.map(|descriptor| descriptor.with_auth(AuthRequirement::ClientBearer))
	}
}
impl Default for UserApi {
	fn default() -> Self {
		Self::new(ServiceEndpoint::https(Self::DEFAULT_HOST))
	}
}
