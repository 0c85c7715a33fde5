//! Credential resolution and persistence on top of a [`CredentialStore`].
//!
//! [`TokenAuthority`] never talks to the network. It turns an [`AuthRequirement`] into the
//! credential stored for it right now, and persists what the re-authentication flows obtain.
//! Every resolution re-reads the store.

pub mod alternative;

pub use alternative::*;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::{AuthRequirement, ClientCredentials, Credential, Token, UserCredentials},
	error::ConfigError,
	store::{CredentialStore, StoreError, StoreKey, StoreNamespace},
};

const NS: StoreNamespace = StoreNamespace::Auth;

/// Result of resolving an [`AuthRequirement`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
	/// The request needs no credential.
	NotRequired,
	/// A credential is available and should be attached.
	Resolved(Credential),
	/// Nothing usable is stored; the executor treats this like a 401 without sending.
	Unavailable(UnavailableReason),
}

/// Why a bearer requirement could not be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnavailableReason {
	/// No client access token is stored.
	MissingClientToken,
	/// No user access token is stored.
	MissingUserToken,
	/// The stored user token is past its expiry, or its expiry is unreadable.
	ExpiredUserToken,
}
impl UnavailableReason {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::MissingClientToken => "missing_client_token",
			Self::MissingUserToken => "missing_user_token",
			Self::ExpiredUserToken => "expired_user_token",
		}
	}
}

/// Resolves and persists credentials for a session.
#[derive(Clone)]
pub struct TokenAuthority {
	store: Arc<dyn CredentialStore>,
}
impl TokenAuthority {
	/// Wraps a credential store.
	pub fn new(store: Arc<dyn CredentialStore>) -> Self {
		Self { store }
	}

	/// Backing store.
	pub fn store(&self) -> &Arc<dyn CredentialStore> {
		&self.store
	}

	/// Resolves `requirement` against the current clock.
	pub fn resolve(&self, requirement: AuthRequirement) -> Result<Resolution> {
		self.resolve_at(requirement, OffsetDateTime::now_utc())
	}

	/// Resolves `requirement` as of `now`.
	///
	/// Only a missing client identity for [`AuthRequirement::ClientBasic`] is an error; it is a
	/// configuration problem and therefore fatal.
	pub fn resolve_at(&self, requirement: AuthRequirement, now: OffsetDateTime) -> Result<Resolution> {
		let resolution = match requirement {
			AuthRequirement::None => Resolution::NotRequired,
			AuthRequirement::ClientBasic => {
				let client =
					self.client_credentials().ok_or(ConfigError::MissingClientCredentials)?;

				Resolution::Resolved(Credential::basic(encode_basic(&client)))
			},
			AuthRequirement::ClientBearer => match self.fetch(StoreKey::ClientAccessToken) {
				Some(token) => Resolution::Resolved(Credential::bearer(token)),
				None => Resolution::Unavailable(UnavailableReason::MissingClientToken),
			},
			AuthRequirement::UserBearer => match self.fetch(StoreKey::UserAccessToken) {
				None => Resolution::Unavailable(UnavailableReason::MissingUserToken),
				Some(token) if self.user_token_valid_at(now) =>
					Resolution::Resolved(Credential::bearer(token)),
				Some(_) => Resolution::Unavailable(UnavailableReason::ExpiredUserToken),
			},
		};

		Ok(resolution)
	}

	/// Stored client identity, if complete.
	pub fn client_credentials(&self) -> Option<ClientCredentials> {
		let id = self.fetch(StoreKey::ClientId)?;
		let secret = self.fetch(StoreKey::ClientSecret)?;
		let domain = self.fetch(StoreKey::ClientDomain).unwrap_or_default();

		Some(ClientCredentials { id, secret, domain })
	}

	/// Stored user identity, if complete.
	pub fn user_credentials(&self) -> Option<UserCredentials> {
		let email = self.fetch(StoreKey::UserEmail)?;
		let password = self.fetch(StoreKey::UserPassword)?;

		Some(UserCredentials { email, password })
	}

	/// Returns `true` when a client access token is stored.
	pub fn has_client_token(&self) -> bool {
		self.fetch(StoreKey::ClientAccessToken).is_some()
	}

	/// Expiry of the stored user token; `None` when absent or unreadable.
	pub fn user_token_expiry(&self) -> Option<OffsetDateTime> {
		self.fetch(StoreKey::ExpirationDate)?
			.parse::<i64>()
			.ok()
			.and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
	}

	/// Persists the client identity.
	pub fn save_client_credentials(&self, client: &ClientCredentials) -> Result<(), StoreError> {
		self.save(StoreKey::ClientId, &client.id)?;
		self.save(StoreKey::ClientSecret, &client.secret)?;
		self.save(StoreKey::ClientDomain, &client.domain)
	}

	/// Persists the client identity, dropping tokens and user identity issued to a different
	/// client id first. Returns `true` when a rotation happened.
	pub fn replace_client_credentials(&self, client: &ClientCredentials) -> Result<bool, StoreError> {
		let rotated = self.fetch(StoreKey::ClientId).is_some_and(|stored| stored != client.id);

		if rotated {
			self.clear_client_token()?;
			self.clear_user_identity()?;
		}

		self.save_client_credentials(client)?;

		Ok(rotated)
	}

	/// Persists a user identity.
	pub fn save_user_credentials(&self, user: &UserCredentials) -> Result<(), StoreError> {
		self.save(StoreKey::UserEmail, &user.email)?;
		self.save(StoreKey::UserPassword, &user.password)
	}

	/// Persists the user token and its expiry, replacing any previous one.
	pub fn save_user_token(&self, token: &Token) -> Result<(), StoreError> {
		self.save(StoreKey::UserAccessToken, token.value.expose())?;
		self.save(StoreKey::ExpirationDate, &token.expires_at.unix_timestamp().to_string())
	}

	/// Persists the client token.
	pub fn save_client_token(&self, token: &Token) -> Result<(), StoreError> {
		self.save(StoreKey::ClientAccessToken, token.value.expose())
	}

	/// Removes the user identity together with its token.
	pub fn clear_user_identity(&self) -> Result<(), StoreError> {
		for key in [
			StoreKey::UserEmail,
			StoreKey::UserPassword,
			StoreKey::UserAccessToken,
			StoreKey::ExpirationDate,
		] {
			self.store.remove(NS, key)?;
		}

		Ok(())
	}

	/// Removes the client token.
	pub fn clear_client_token(&self) -> Result<(), StoreError> {
		self.store.remove(NS, StoreKey::ClientAccessToken)
	}

	/// Removes everything, client identity included.
	pub fn remove_all(&self) -> Result<(), StoreError> {
		self.store.remove_all()
	}

	fn user_token_valid_at(&self, now: OffsetDateTime) -> bool {
		self.user_token_expiry().is_some_and(|expires_at| now < expires_at)
	}

	fn fetch(&self, key: StoreKey) -> Option<String> {
		self.store.fetch(NS, key)
	}

	fn save(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
		self.store.save(NS, key, value)
	}
}
impl Debug for TokenAuthority {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenAuthority(..)")
	}
}

fn encode_basic(client: &ClientCredentials) -> String {
	STANDARD.encode(format!("{}:{}", client.id, client.secret))
}
