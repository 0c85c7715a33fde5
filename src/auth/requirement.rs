//! Declared credential class of a request and the resolved header value.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Credential class a request needs before it can be sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AuthRequirement {
	/// Anonymous request; no `Authorization` header.
	#[default]
	None,
	/// HTTP Basic with the stored client id/secret.
	ClientBasic,
	/// Bearer with the stored client access token.
	ClientBearer,
	/// Bearer with the stored, non-expired user access token.
	UserBearer,
}
impl AuthRequirement {
	/// Returns `true` when a 401 on this requirement may be healed by re-authenticating.
	pub const fn is_recoverable(self) -> bool {
		matches!(self, Self::ClientBearer | Self::UserBearer)
	}

	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::ClientBasic => "client_basic",
			Self::ClientBearer => "client_bearer",
			Self::UserBearer => "user_bearer",
		}
	}
}
impl Display for AuthRequirement {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// `Authorization` header scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthScheme {
	/// `Basic <base64(id:secret)>`.
	Basic,
	/// `Bearer <token>`.
	Bearer,
}
impl AuthScheme {
	/// Returns the header prefix.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Basic => "Basic",
			Self::Bearer => "Bearer",
		}
	}
}

/// Resolved credential ready to be attached to a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
	/// Header scheme.
	pub scheme: AuthScheme,
	/// Encoded Basic pair or bearer token.
	pub value: TokenSecret,
}
impl Credential {
	/// Builds a Basic credential from an already encoded value.
	pub fn basic(encoded: impl Into<String>) -> Self {
		Self { scheme: AuthScheme::Basic, value: TokenSecret::new(encoded) }
	}

	/// Builds a Bearer credential.
	pub fn bearer(token: impl Into<String>) -> Self {
		Self { scheme: AuthScheme::Bearer, value: TokenSecret::new(token) }
	}

	/// Renders the full `Authorization` header value. Callers must avoid logging it.
	pub fn header_value(&self) -> String {
		format!("{} {}", self.scheme.as_str(), self.value.expose())
	}
}
