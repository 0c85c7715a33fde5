//! Credential storage contract and built-in store implementations.
//!
//! Every secret the session needs (client id/secret, the provisioned user's email/password,
//! both access tokens, and the user token's expiry) lives in a [`CredentialStore`] as a plain
//! string under a `(namespace, key)` pair. Resolution re-reads the store on every request, so no
//! in-memory token cache exists beyond what the store itself keeps.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::_prelude::*;

/// Persistent key-value contract for session secrets.
///
/// Implementations must be safe to share across threads; each `save`/`remove` is treated as
/// atomic on its own and no cross-call transaction is required. A failing `save` or `remove`
/// means the secure store is unavailable, which callers treat as a fatal configuration error.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the value stored under `namespace`/`key`, if any.
	fn fetch(&self, namespace: StoreNamespace, key: StoreKey) -> Option<String>;

	/// Persists or replaces the value stored under `namespace`/`key`.
	fn save(&self, namespace: StoreNamespace, key: StoreKey, value: &str) -> Result<(), StoreError>;

	/// Removes the value stored under `namespace`/`key`; removing a missing entry succeeds.
	fn remove(&self, namespace: StoreNamespace, key: StoreKey) -> Result<(), StoreError>;

	/// Removes every stored value.
	fn remove_all(&self) -> Result<(), StoreError>;
}

/// Service namespace that groups stored secrets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreNamespace {
	/// Authentication secrets.
	Auth,
}
impl StoreNamespace {
	/// Returns the persisted label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Auth => "auth",
		}
	}
}
impl Display for StoreNamespace {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Keys persisted by the session layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreKey {
	/// API client identifier.
	ClientId,
	/// API client secret.
	ClientSecret,
	/// Domain used when provisioning anonymous users.
	ClientDomain,
	/// Provisioned or supplied user email.
	UserEmail,
	/// Provisioned or supplied user password.
	UserPassword,
	/// Access token of the authenticated user.
	UserAccessToken,
	/// Access token of the API client itself.
	ClientAccessToken,
	/// Expiry of the user access token, as Unix seconds.
	ExpirationDate,
}
impl StoreKey {
	/// Every key the session layer may write.
	pub const ALL: [StoreKey; 8] = [
		Self::ClientId,
		Self::ClientSecret,
		Self::ClientDomain,
		Self::UserEmail,
		Self::UserPassword,
		Self::UserAccessToken,
		Self::ClientAccessToken,
		Self::ExpirationDate,
	];

	/// Returns the persisted label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ClientId => "clientId",
			Self::ClientSecret => "clientSecret",
			Self::ClientDomain => "clientDomain",
			Self::UserEmail => "userEmail",
			Self::UserPassword => "userPassword",
			Self::UserAccessToken => "userAccessToken",
			Self::ClientAccessToken => "clientAccessToken",
			Self::ExpirationDate => "expirationDate",
		}
	}
}
impl Display for StoreKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Composite key used by the built-in stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryKey {
	/// Namespace component.
	pub namespace: StoreNamespace,
	/// Key component.
	pub key: StoreKey,
}
impl EntryKey {
	/// Builds a composite key.
	pub const fn new(namespace: StoreNamespace, key: StoreKey) -> Self {
		Self { namespace, key }
	}
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure, e.g. the secure store is unavailable.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "keychain unavailable".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("keychain unavailable"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn key_labels_match_persisted_layout() {
		let labels = StoreKey::ALL.iter().map(|key| key.as_str()).collect::<Vec<_>>();

		assert_eq!(
			labels,
			[
				"clientId",
				"clientSecret",
				"clientDomain",
				"userEmail",
				"userPassword",
				"userAccessToken",
				"clientAccessToken",
				"expirationDate",
			]
		);
		assert_eq!(StoreNamespace::Auth.to_string(), "auth");
	}

	#[test]
	fn entry_key_serializes_with_persisted_labels() {
		let payload =
			serde_json::to_string(&EntryKey::new(StoreNamespace::Auth, StoreKey::UserEmail))
				.expect("EntryKey should serialize to JSON.");

		assert_eq!(payload, "{\"namespace\":\"auth\",\"key\":\"userEmail\"}");
	}
}
