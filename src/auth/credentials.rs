//! Client and user identities persisted by the session.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, error::ConfigError};

const ANONYMOUS_LOCAL_PART_LEN: usize = 24;
const ANONYMOUS_PASSWORD_LEN: usize = 32;

/// API client identity supplied by the integrating application.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
	/// Client identifier.
	pub id: String,
	/// Client secret; callers must avoid logging it.
	pub secret: String,
	/// Domain used for auto-provisioned user emails.
	pub domain: String,
}
impl ClientCredentials {
	/// Creates a new credential triple.
	pub fn new(id: impl Into<String>, secret: impl Into<String>, domain: impl Into<String>) -> Self {
		Self { id: id.into(), secret: secret.into(), domain: domain.into() }
	}

	/// Rejects credentials that could never authenticate.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.id.trim().is_empty() {
			return Err(ConfigError::InvalidClientCredentials { reason: "client id is empty" });
		}
		if self.id.contains(':') {
			return Err(ConfigError::InvalidClientCredentials {
				reason: "client id must not contain `:`",
			});
		}
		if self.secret.is_empty() {
			return Err(ConfigError::InvalidClientCredentials { reason: "client secret is empty" });
		}
		if self.domain.trim().is_empty() {
			return Err(ConfigError::InvalidClientCredentials { reason: "client domain is empty" });
		}

		Ok(())
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("id", &self.id)
			.field("secret", &"<redacted>")
			.field("domain", &self.domain)
			.finish()
	}
}

/// End-user identity, either supplied by the consumer or provisioned anonymously.
///
/// Serializes to the `{email, password}` body expected by the user provisioning endpoint.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct UserCredentials {
	/// User email, also used as the password-grant username.
	pub email: String,
	/// User password; callers must avoid logging it.
	pub password: String,
}
impl UserCredentials {
	/// Creates a user identity from explicit values.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}

	/// Generates a random anonymous identity under `domain`.
	pub fn anonymous(domain: &str) -> Self {
		let local = random_alphanumeric(ANONYMOUS_LOCAL_PART_LEN).to_ascii_lowercase();

		Self { email: format!("{local}@{domain}"), password: random_alphanumeric(ANONYMOUS_PASSWORD_LEN) }
	}
}
impl Debug for UserCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("UserCredentials")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

fn random_alphanumeric(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
