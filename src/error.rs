//! Client-level error types shared by the executor, authority, and stores.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error surfaced by every public request operation.
///
/// HTTP outcomes are classified exactly once, at the executor boundary. `Storage` and `Config`
/// are fatal: they indicate an inconsistent local setup and are never folded into
/// [`Error::Unauthorized`] by the re-authentication path.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The API rejected the request as malformed (HTTP 400).
	#[error("The API rejected the request as malformed.")]
	BadRequest,
	/// Authentication failed and could not be recovered.
	#[error("Authentication failed and could not be recovered.")]
	Unauthorized,
	/// The requested resource does not exist (HTTP 404).
	#[error("The requested resource does not exist.")]
	NotFound,
	/// The API cannot produce the requested representation (HTTP 406).
	#[error("The API cannot produce a response matching the Accept header.")]
	NotAcceptable,
	/// The API is rate limiting this client (HTTP 429).
	#[error("The API is rate limiting this client.")]
	TooManyRequests {
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// The transport failed before any HTTP response arrived.
	#[error("No response was received from the API.")]
	NoResponse(#[from] TransportError),
	/// A successful response body could not be decoded.
	#[error("Response body could not be decoded.")]
	Parse(#[from] ParseError),
	/// The caller cancelled the request.
	#[error("The request was cancelled.")]
	RequestCancelled,
	/// The API returned a status outside the known taxonomy.
	#[error("The API returned an unexpected response (status {status:?}).")]
	Unknown {
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Credential persistence failed.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Returns `true` for errors that leave the client in an unusable local state.
	pub fn is_fatal(&self) -> bool {
		matches!(self, Self::Storage(_) | Self::Config(_))
	}

	/// Returns a stable label suitable for log or metric fields.
	pub const fn label(&self) -> &'static str {
		match self {
			Self::BadRequest => "bad_request",
			Self::Unauthorized => "unauthorized",
			Self::NotFound => "not_found",
			Self::NotAcceptable => "not_acceptable",
			Self::TooManyRequests { .. } => "too_many_requests",
			Self::NoResponse(_) => "no_response",
			Self::Parse(_) => "parse_error",
			Self::RequestCancelled => "request_cancelled",
			Self::Unknown { .. } => "unknown",
			Self::Storage(_) => "storage_error",
			Self::Config(_) => "config_error",
		}
	}
}

/// Configuration and validation failures raised while building or using a session.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// No transport was supplied and no default transport is compiled in.
	#[error("No HTTP transport is configured.")]
	MissingTransport,
	/// The credential store holds no client credentials.
	#[error("No client credentials are stored; build the client before issuing requests.")]
	MissingClientCredentials,
	/// Client credentials failed validation.
	#[error("Client credentials are invalid: {reason}.")]
	InvalidClientCredentials {
		/// Which part of the credentials is invalid.
		reason: &'static str,
	},
	/// An endpoint or request URL cannot be parsed.
	#[error("The URL `{url}` is invalid.")]
	InvalidUrl {
		/// The URL that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint uses a scheme other than `http` or `https`.
	#[error("The `{scheme}` scheme is not supported.")]
	UnsupportedScheme {
		/// Rejected scheme.
		scheme: String,
	},
	/// Endpoint URL carries no host.
	#[error("The URL `{url}` has no host.")]
	MissingHost {
		/// The URL without a host.
		url: String,
	},
	/// A request body could not be serialized.
	#[error("Request body could not be serialized.")]
	BodySerialization(#[source] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Response decoding failures.
#[derive(Debug, ThisError)]
pub enum ParseError {
	/// Body is not valid JSON for the expected type.
	#[error("Response body does not match the expected JSON shape.")]
	Json {
		/// Structured parsing failure naming the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Body is not valid UTF-8.
	#[error("Response body is not valid UTF-8.")]
	Utf8 {
		/// Underlying conversion failure.
		#[source]
		source: std::string::FromUtf8Error,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
