//! Simple file-backed [`CredentialStore`] for desktop tools and bots.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	store::{CredentialStore, EntryKey, StoreError, StoreKey, StoreNamespace},
};

/// Persists secrets to a JSON file after each mutation.
///
/// The snapshot is written to a sibling `.tmp` file and renamed over the target so a crash never
/// leaves a half-written store behind. The file holds secrets in clear text; restrict its
/// permissions accordingly.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<EntryKey, String>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<EntryKey, String>, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(HashMap::new());
		}

		let entries: Vec<(EntryKey, String)> =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(entries.into_iter().collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	/// Applies `mutate` to a copy of the entries and swaps it in only once the snapshot is on
	/// disk; `mutate` returns `false` when nothing changed.
	fn commit(
		&self,
		mutate: impl FnOnce(&mut HashMap<EntryKey, String>) -> bool,
	) -> Result<(), StoreError> {
		let mut guard = self.inner.write();
		let mut next = guard.clone();

		if !mutate(&mut next) {
			return Ok(());
		}

		self.persist_locked(&next)?;
		*guard = next;

		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<EntryKey, String>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let mut snapshot: Vec<_> = contents.iter().collect();

		snapshot.sort_by_key(|(key, _)| **key);

		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn fetch(&self, namespace: StoreNamespace, key: StoreKey) -> Option<String> {
		self.inner.read().get(&EntryKey::new(namespace, key)).cloned()
	}

	fn save(&self, namespace: StoreNamespace, key: StoreKey, value: &str) -> Result<(), StoreError> {
		self.commit(|entries| {
			entries.insert(EntryKey::new(namespace, key), value.to_owned());

			true
		})
	}

	fn remove(&self, namespace: StoreNamespace, key: StoreKey) -> Result<(), StoreError> {
		self.commit(|entries| entries.remove(&EntryKey::new(namespace, key)).is_some())
	}

	fn remove_all(&self) -> Result<(), StoreError> {
		self.commit(|entries| {
			entries.clear();

			true
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;

	fn temp_path(label: &str) -> PathBuf {
		let unique = format!(
			"docapi_client_file_store_{label}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path("reload");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");

		store
			.save(StoreNamespace::Auth, StoreKey::UserAccessToken, "user-token")
			.expect("Failed to save user token to file store.");
		store
			.save(StoreNamespace::Auth, StoreKey::ExpirationDate, "1735689600")
			.expect("Failed to save expiration to file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");

		assert_eq!(
			reopened.fetch(StoreNamespace::Auth, StoreKey::UserAccessToken).as_deref(),
			Some("user-token")
		);
		assert_eq!(
			reopened.fetch(StoreNamespace::Auth, StoreKey::ExpirationDate).as_deref(),
			Some("1735689600")
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn removals_survive_reopen() {
		let path = temp_path("remove");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");

		store
			.save(StoreNamespace::Auth, StoreKey::UserEmail, "anon@example.com")
			.expect("Failed to save email to file store.");
		store
			.save(StoreNamespace::Auth, StoreKey::ClientId, "client")
			.expect("Failed to save client id to file store.");
		store
			.remove(StoreNamespace::Auth, StoreKey::UserEmail)
			.expect("Failed to remove email from file store.");

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");

		assert!(reopened.fetch(StoreNamespace::Auth, StoreKey::UserEmail).is_none());
		assert_eq!(
			reopened.fetch(StoreNamespace::Auth, StoreKey::ClientId).as_deref(),
			Some("client")
		);

		reopened.remove_all().expect("Failed to clear file store.");

		let cleared = FileStore::open(&path).expect("Failed to reopen cleared file store.");

		assert!(cleared.fetch(StoreNamespace::Auth, StoreKey::ClientId).is_none());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn failed_write_leaves_entries_untouched() {
		let dir = temp_path("failed_write");
		let path = dir.join("credentials.json");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");

		store
			.save(StoreNamespace::Auth, StoreKey::ClientId, "client")
			.expect("Failed to save client id to file store.");
		fs::remove_dir_all(&dir).expect("Failed to remove store directory.");
		fs::write(&dir, b"blocker").expect("Failed to block store directory.");

		assert!(store.save(StoreNamespace::Auth, StoreKey::UserEmail, "anon@example.com").is_err());
		assert!(store.remove(StoreNamespace::Auth, StoreKey::ClientId).is_err());
		assert!(store.remove_all().is_err());
		assert!(store.fetch(StoreNamespace::Auth, StoreKey::UserEmail).is_none());
		assert_eq!(store.fetch(StoreNamespace::Auth, StoreKey::ClientId).as_deref(), Some("client"));

		fs::remove_file(&dir).unwrap_or_else(|e| {
			panic!("Failed to remove temporary blocker {}: {e}", dir.display())
		});
	}
}
