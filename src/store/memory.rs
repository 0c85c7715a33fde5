//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{CredentialStore, EntryKey, StoreError, StoreKey, StoreNamespace},
};

type StoreMap = Arc<RwLock<HashMap<EntryKey, String>>>;

/// Thread-safe storage backend that keeps secrets in-process.
///
/// Contents do not survive a restart; use [`FileStore`](crate::store::FileStore) or a platform
/// keychain adapter when persistence matters.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Returns the number of stored entries.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl CredentialStore for MemoryStore {
	fn fetch(&self, namespace: StoreNamespace, key: StoreKey) -> Option<String> {
		self.0.read().get(&EntryKey::new(namespace, key)).cloned()
	}

	fn save(&self, namespace: StoreNamespace, key: StoreKey, value: &str) -> Result<(), StoreError> {
		self.0.write().insert(EntryKey::new(namespace, key), value.to_owned());

		Ok(())
	}

	fn remove(&self, namespace: StoreNamespace, key: StoreKey) -> Result<(), StoreError> {
		self.0.write().remove(&EntryKey::new(namespace, key));

		Ok(())
	}

	fn remove_all(&self) -> Result<(), StoreError> {
		self.0.write().clear();

		Ok(())
	}
}
