//! File-backed [`CredentialStore`] shared by every process pointing at the same path.

// std
use std::{
	env,
	fs::{self, File},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
	process,
	sync::atomic::{AtomicU64, Ordering},
};
// self
use crate::{
	_prelude::*,
	auth::Credential,
	store::{CredentialStore, StoreError, StoreFuture},
};

const NANOS_PER_SECOND: f64 = 1_000_000_000.;

static WRITE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// On-disk layout: the token plus its expiry in fractional seconds since the Unix epoch.
#[derive(Serialize, Deserialize)]
struct CredentialFile {
	access_token: String,
	expires_at: f64,
}

/// Persists the credential as a small JSON document.
///
/// Every [`load`](CredentialStore::load) reads the file again, so a token written by another
/// process is picked up without a restart. Writes go through a temporary sibling file followed
/// by a rename, which keeps concurrent readers from observing half-written JSON.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
}
impl FileStore {
	/// Opens a store at `path`, creating its parent directory when missing.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		Ok(Self { path })
	}

	/// Cache location used when none is configured.
	pub fn default_path() -> PathBuf {
		env::temp_dir().join("trade-master-api").join("access_token.json")
	}

	/// Location of the cache file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create cache directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn corrupted(&self, message: impl Into<String>) -> StoreError {
		StoreError::Corrupted { path: self.path.display().to_string(), message: message.into() }
	}

	fn read_now(&self) -> Result<Option<Credential>, StoreError> {
		let bytes = match fs::read(&self.path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) =>
				return Err(StoreError::Backend {
					message: format!("Failed to read {}: {e}", self.path.display()),
				}),
		};
		let file: CredentialFile =
			serde_json::from_slice(&bytes).map_err(|e| self.corrupted(e.to_string()))?;

		if !file.expires_at.is_finite() {
			return Err(self.corrupted("expires_at is not a finite number"));
		}

		let nanos = (file.expires_at * NANOS_PER_SECOND).round() as i128;
		let expires_at = OffsetDateTime::from_unix_timestamp_nanos(nanos)
			.map_err(|e| self.corrupted(format!("expires_at is out of range: {e}")))?;

		Ok(Some(Credential::new(file.access_token, expires_at)))
	}

	fn write_now(&self, credential: &Credential) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let file = CredentialFile {
			access_token: credential.access_token.expose().to_owned(),
			expires_at: credential.expires_at.unix_timestamp_nanos() as f64 / NANOS_PER_SECOND,
		};
		let serialized = serde_json::to_vec(&file).map_err(|e| StoreError::Serialization {
			message: format!("Failed to serialize credential cache: {e}"),
		})?;
		let tmp_path = self.unique_tmp_path();
		let result = Self::write_tmp(&tmp_path, &serialized).and_then(|()| {
			fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
				message: format!("Failed to replace {}: {e}", self.path.display()),
			})
		});

		if result.is_err() {
			let _ = fs::remove_file(&tmp_path);
		}

		result
	}

	/// Sibling path private to this write: concurrent writers never share a temp file.
	fn unique_tmp_path(&self) -> PathBuf {
		let name =
			self.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
		let tmp_name = format!(
			".{name}.{}.{}.{}.tmp",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
			WRITE_SEQUENCE.fetch_add(1, Ordering::Relaxed),
		);

		self.path.with_file_name(tmp_name)
	}

	fn write_tmp(tmp_path: &Path, serialized: &[u8]) -> Result<(), StoreError> {
		let mut file = File::create(tmp_path).map_err(|e| StoreError::Backend {
			message: format!("Failed to create {}: {e}", tmp_path.display()),
		})?;

		file.write_all(serialized).map_err(|e| StoreError::Backend {
			message: format!("Failed to write {}: {e}", tmp_path.display()),
		})?;
		file.sync_all().map_err(|e| StoreError::Backend {
			message: format!("Failed to sync {}: {e}", tmp_path.display()),
		})
	}

	fn remove_now(&self) -> Result<(), StoreError> {
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StoreError::Backend {
				message: format!("Failed to remove {}: {e}", self.path.display()),
			}),
		}
	}
}
impl CredentialStore for FileStore {
	fn load(&self) -> StoreFuture<'_, Option<Credential>> {
		Box::pin(async move { self.read_now() })
	}

	fn save(&self, credential: Credential) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.write_now(&credential) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.remove_now() })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::thread;
	// crates.io
	use time::macros;
	use tokio::runtime::Runtime;
	// self
	use super::*;

	fn temp_path(tag: &str) -> PathBuf {
		let unique = format!(
			"trade_master_file_store_{tag}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_through_a_second_handle() {
		let path = temp_path("reload");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let writer = FileStore::open(&path).expect("Failed to open file store.");
		let credential = Credential::new("xyz", macros::datetime!(2030-01-01 00:00:00.25 UTC));

		rt.block_on(writer.save(credential.clone()))
			.expect("Failed to save fixture credential to file store.");

		let reader = FileStore::open(&path).expect("Failed to reopen file store.");
		let loaded = rt
			.block_on(reader.load())
			.expect("Failed to load fixture credential from file store.")
			.expect("File store lost the credential after reopen.");

		assert_eq!(loaded.access_token.expose(), "xyz");
		assert!((loaded.expires_at - credential.expires_at).abs() < Duration::milliseconds(1));

		let raw: Value = serde_json::from_slice(
			&fs::read(&path).expect("Cache file should exist after save."),
		)
		.expect("Cache file should contain JSON.");

		assert_eq!(raw["access_token"], "xyz");
		assert!(raw["expires_at"].is_f64());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary credential cache {}: {e}", path.display())
		});
	}

	#[test]
	fn concurrent_handles_never_observe_partial_writes() {
		const WRITERS: usize = 4;
		const ROUNDS: usize = 500;

		let path = temp_path("concurrent");
		let handles = (0..WRITERS)
			.map(|writer| {
				let store = FileStore::open(&path).expect("Failed to open file store.");

				thread::spawn(move || {
					for round in 0..ROUNDS {
						let token = format!("token-{writer}-{round}");
						let credential = Credential::new(
							token.as_str(),
							OffsetDateTime::now_utc() + Duration::hours(1),
						);

						store.write_now(&credential).expect("Concurrent save should succeed.");

						let loaded = store
							.read_now()
							.expect("Concurrent load should parse.")
							.expect("Cache should exist after any save.");

						assert!(loaded.access_token.expose().starts_with("token-"));
					}
				})
			})
			.collect::<Vec<_>>();

		for handle in handles {
			handle.join().expect("Writer thread should not panic.");
		}

		let leftovers = fs::read_dir(path.parent().expect("Temp path should have a parent."))
			.expect("Temp dir should be readable.")
			.filter_map(|entry| entry.ok())
			.filter(|entry| {
				let name = entry.file_name().to_string_lossy().into_owned();
				let stem = path.file_name().map(|n| n.to_string_lossy().into_owned());

				stem.is_some_and(|stem| name.starts_with(&format!(".{stem}.")))
			})
			.count();

		assert_eq!(leftovers, 0);

		fs::remove_file(&path).expect("Failed to remove concurrent cache fixture.");
	}

	#[test]
	fn missing_file_loads_as_empty_and_clear_is_idempotent() {
		let path = temp_path("missing");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let store = FileStore::open(&path).expect("Failed to open file store.");

		assert_eq!(rt.block_on(store.load()).expect("Missing cache should load."), None);

		rt.block_on(store.clear()).expect("Clearing a missing cache should succeed.");
	}

	#[test]
	fn unparseable_cache_is_reported_as_corrupted() {
		let path = temp_path("corrupt");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let store = FileStore::open(&path).expect("Failed to open file store.");

		for contents in ["", "{not json", r#"{"access_token":"abc"}"#] {
			fs::write(&path, contents).expect("Failed to write corrupt fixture.");

			let err = rt.block_on(store.load()).expect_err("Corrupt cache must not load.");

			assert!(matches!(err, StoreError::Corrupted { .. }), "unexpected error {err:?}");
		}

		rt.block_on(store.clear()).expect("Clearing a corrupt cache should succeed.");

		assert!(!path.exists());
	}
}
