//! Access tokens issued by the token endpoint.

pub mod secret;

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Token type reported by the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum TokenType {
	/// HTTP Basic credential.
	Basic,
	/// OAuth 2.0 bearer token.
	Bearer,
}
impl TokenType {
	/// Returns the canonical lowercase label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Basic => "basic",
			Self::Bearer => "bearer",
		}
	}
}
impl TryFrom<String> for TokenType {
	type Error = UnknownTokenType;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		if value.eq_ignore_ascii_case("bearer") {
			Ok(Self::Bearer)
		} else if value.eq_ignore_ascii_case("basic") {
			Ok(Self::Basic)
		} else {
			Err(UnknownTokenType(value))
		}
	}
}
impl From<TokenType> for &'static str {
	fn from(value: TokenType) -> Self {
		value.as_str()
	}
}
impl Display for TokenType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Raised when the token endpoint reports a token type other than `basic` or `bearer`.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unsupported token type `{0}`.")]
pub struct UnknownTokenType(pub String);

/// Access token decoded from a token-endpoint response.
///
/// `expires_at` is computed once, at decode time, as `now + expires_in`.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(from = "TokenResponse")]
pub struct Token {
	/// Access token value.
	pub value: TokenSecret,
	/// Reported token type.
	pub token_type: TokenType,
	/// Granted scope; empty when the endpoint omits it.
	pub scope: String,
	/// Absolute expiry instant.
	pub expires_at: OffsetDateTime,
	/// Refresh token, if one was issued.
	pub refresh_token: Option<TokenSecret>,
}
impl Token {
	/// Builds a bearer token that expires at `expires_at`.
	pub fn bearer(value: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self {
			value: TokenSecret::new(value),
			token_type: TokenType::Bearer,
			scope: String::new(),
			expires_at,
			refresh_token: None,
		}
	}

	/// Returns `true` once `instant` has reached the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	fn from_response(response: TokenResponse, received_at: OffsetDateTime) -> Self {
		let lifetime = Duration::saturating_seconds_f64(response.expires_in.max(0.));

		Self {
			value: response.access_token,
			token_type: response.token_type,
			scope: response.scope,
			expires_at: received_at.saturating_add(lifetime),
			refresh_token: response.refresh_token,
		}
	}
}
impl From<TokenResponse> for Token {
	fn from(response: TokenResponse) -> Self {
		Self::from_response(response, OffsetDateTime::now_utc())
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("value", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("expires_at", &self.expires_at)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: TokenSecret,
	token_type: TokenType,
	expires_in: f64,
	#[serde(default)]
	scope: String,
	#[serde(default)]
	refresh_token: Option<TokenSecret>,
}
