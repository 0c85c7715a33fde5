//! Immutable request descriptors consumed by the executor.

pub mod decoder;

pub use decoder::*;

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{AuthRequirement, Credential},
	endpoint::{Scheme, ServiceEndpoint},
	error::{ConfigError, ParseError},
	http::{HttpMethod, HttpRequest, Transfer},
};

/// Description of one API call: target, method, headers, body, credential class, and decoder.
///
/// Built once per call through the `with_*` methods and never mutated by the executor; the
/// resolved `Authorization` header only exists on the [`HttpRequest`] derived from it. Equality
/// compares resolved URLs only.
pub struct RequestDescriptor<T> {
	scheme: Scheme,
	host: String,
	path: String,
	query: Vec<(String, String)>,
	method: HttpMethod,
	headers: BTreeMap<String, String>,
	body: Option<Vec<u8>>,
	auth: AuthRequirement,
	sensitive_response: bool,
	decoder: ResponseDecoder<T>,
}
impl<T> RequestDescriptor<T> {
	/// Starts a descriptor targeting `path` on `endpoint`, with no auth requirement.
	pub fn new(
		method: HttpMethod,
		endpoint: &ServiceEndpoint,
		path: impl Into<String>,
		decoder: ResponseDecoder<T>,
	) -> Self {
		Self {
			scheme: endpoint.scheme,
			host: endpoint.host.clone(),
			path: path.into(),
			query: Vec::new(),
			method,
			headers: BTreeMap::new(),
			body: None,
			auth: AuthRequirement::None,
			sensitive_response: false,
			decoder,
		}
	}

	/// Appends a query parameter.
	pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((name.into(), value.into()));

		self
	}

	/// Appends a query parameter when `value` is present; absent values are skipped.
	pub fn with_optional_query(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
		match value {
			Some(value) => self.with_query(name, value),
			None => self,
		}
	}

	/// Sets or replaces a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Sets a raw body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Serializes `body` as JSON and sets `Content-Type: application/json`.
	pub fn with_json_body<B>(self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		let bytes = serde_json::to_vec(body).map_err(ConfigError::BodySerialization)?;

		Ok(self.with_header("Content-Type", "application/json").with_body(bytes))
	}

	/// Encodes `pairs` as `application/x-www-form-urlencoded`.
	pub fn with_form_body<'a>(self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
		let encoded = form_urlencoded::Serializer::new(String::new()).extend_pairs(pairs).finish();

		self.with_header("Content-Type", "application/x-www-form-urlencoded").with_body(encoded)
	}

	/// Declares the credential class this request needs.
	pub fn with_auth(mut self, auth: AuthRequirement) -> Self {
		self.auth = auth;

		self
	}

	/// Marks response bodies as secret-bearing so failure logs never preview them.
	pub fn with_sensitive_response(mut self) -> Self {
		self.sensitive_response = true;

		self
	}

	/// HTTP method.
	pub fn method(&self) -> HttpMethod {
		self.method
	}

	/// Path component.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Query parameters in insertion order.
	pub fn query(&self) -> &[(String, String)] {
		&self.query
	}

	/// Static headers, excluding `Authorization`.
	pub fn headers(&self) -> &BTreeMap<String, String> {
		&self.headers
	}

	/// Request body, if any.
	pub fn body(&self) -> Option<&[u8]> {
		self.body.as_deref()
	}

	/// Declared credential class.
	pub fn auth(&self) -> AuthRequirement {
		self.auth
	}

	/// Returns `true` when response bodies may carry secrets.
	pub fn has_sensitive_response(&self) -> bool {
		self.sensitive_response
	}

	/// Part of a response `body` that may appear in logs; empty for sensitive responses.
	pub fn loggable_body<'a>(&self, body: &'a [u8]) -> &'a [u8] {
		if self.sensitive_response { &[] } else { body }
	}

	/// Response decoder.
	pub fn decoder(&self) -> &ResponseDecoder<T> {
		&self.decoder
	}

	/// Resolves scheme, host, path, and query into an absolute URL.
	pub fn url(&self) -> Result<Url, ConfigError> {
		let raw = format!("{}://{}{}", self.scheme.as_str(), self.host, self.path);
		let mut url = Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { url: raw, source })?;

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(self.query.iter());
		}

		Ok(url)
	}

	/// Decodes a successful response body with the declared decoder.
	pub fn decode(&self, body: &[u8]) -> Result<T, ParseError> {
		self.decoder.decode(body)
	}

	/// Builds the transport request, attaching `credential` and replacing the body with
	/// `payload` when one is given.
	pub(crate) fn to_http_request(
		&self,
		credential: Option<&Credential>,
		payload: Option<&[u8]>,
		transfer: Transfer,
	) -> Result<HttpRequest, ConfigError> {
		let mut headers =
			self.headers.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Vec<_>>();

		if let Some(credential) = credential {
			headers.push(("Authorization".into(), credential.header_value()));
		}

		let body = payload.or(self.body.as_deref()).map(<[u8]>::to_vec);

		Ok(HttpRequest { method: self.method, url: self.url()?, headers, body, transfer })
	}
}
impl<T> Clone for RequestDescriptor<T> {
	fn clone(&self) -> Self {
		Self {
			scheme: self.scheme,
			host: self.host.clone(),
			path: self.path.clone(),
			query: self.query.clone(),
			method: self.method,
			headers: self.headers.clone(),
			body: self.body.clone(),
			auth: self.auth,
			sensitive_response: self.sensitive_response,
			decoder: self.decoder,
		}
	}
}
impl<T> PartialEq for RequestDescriptor<T> {
	fn eq(&self, other: &Self) -> bool {
		match (self.url(), other.url()) {
			(Ok(lhs), Ok(rhs)) => lhs == rhs,
			_ => false,
		}
	}
}
impl<T> Debug for RequestDescriptor<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestDescriptor")
			.field("method", &self.method)
			.field("scheme", &self.scheme)
			.field("host", &self.host)
			.field("path", &self.path)
			.field("query", &self.query)
			.field("headers", &self.headers)
			.field("body_len", &self.body.as_ref().map(Vec::len))
			.field("auth", &self.auth)
			.field("sensitive_response", &self.sensitive_response)
			.field("decoder", &self.decoder)
			.finish()
	}
}
