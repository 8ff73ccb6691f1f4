//! Persistent key/blob storage.
//!
//! The core keeps two logical regions in whatever storage the host provides:
//!
//! * [`Region::Durable`] survives across sessions and holds the encrypted key record
//!   and the login attempt window.
//! * [`Region::Volatile`] holds metadata about the current session and is cleared
//!   when the session ends.
//!
//! Both are plain `key → bytes` maps. No schema is imposed beyond the JSON documents
//! written by the vault and session guard.

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::Result;

pub mod errors;
pub mod file;
pub mod memory;

pub use errors::StoreError;
pub use file::FileStore;
pub use memory::InMemoryStore;

/// Logical storage region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    /// Survives across sessions.
    Durable,
    /// Cleared at session end.
    Volatile,
}

/// Key/blob store with two regions.
///
/// Implementations must be safe to share between tasks; every method is atomic with
/// respect to a single key.
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    /// Read a value, `None` if absent.
    async fn get(&self, region: Region, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, region: Region, key: &str, value: Vec<u8>) -> Result<()>;

    /// Remove a value. Removing an absent key is not an error.
    async fn delete(&self, region: Region, key: &str) -> Result<()>;

    /// Remove every value in a region.
    async fn clear(&self, region: Region) -> Result<()>;
}

/// Read and decode a JSON document.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn Store,
    region: Region,
    key: &str,
) -> Result<Option<T>> {
    match store.get(region, key).await? {
        Some(bytes) => {
            let value = serde_json::from_slice(&bytes)
                .map_err(|source| StoreError::DeserializationFailed { source })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Encode and write a JSON document.
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn Store,
    region: Region,
    key: &str,
    value: &T,
) -> Result<()> {
    let bytes =
        serde_json::to_vec(value).map_err(|source| StoreError::SerializationFailed { source })?;
    store.set(region, key, bytes).await
}
