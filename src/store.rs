//! Storage contract and built-in stores for the single cached bearer credential.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::Credential};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend holding at most one credential.
///
/// Stores never filter by validity; the token manager decides whether a loaded credential is
/// still usable.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the stored credential, or `None` when nothing is cached.
	fn load(&self) -> StoreFuture<'_, Option<Credential>>;

	/// Replaces the stored credential.
	fn save(&self, credential: Credential) -> StoreFuture<'_, ()>;

	/// Removes the stored credential. Clearing an empty store succeeds.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Persisted data exists but cannot be interpreted as a credential.
	#[error("Credential cache {path} is corrupted: {message}.")]
	Corrupted {
		/// Location of the offending cache.
		path: String,
		/// Human-readable error payload.
		message: String,
	},
	/// Serialization failures surfaced while writing the cache.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
