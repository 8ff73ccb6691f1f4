//! In-memory store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Region, Store};
use crate::Result;

/// Store keeping both regions in memory.
///
/// Suitable for tests and for hosts that provide durability some other way.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<(Region, String), Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values held in `region`.
    pub async fn len(&self, region: Region) -> usize {
        self.entries
            .read()
            .await
            .keys()
            .filter(|(r, _)| *r == region)
            .count()
    }

    /// Whether `region` holds no values.
    pub async fn is_empty(&self, region: Region) -> bool {
        self.len(region).await == 0
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get(&self, region: Region, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .entries
            .read()
            .await
            .get(&(region, key.to_string()))
            .cloned())
    }

    async fn set(&self, region: Region, key: &str, value: Vec<u8>) -> Result<()> {
        self.entries
            .write()
            .await
            .insert((region, key.to_string()), value);
        Ok(())
    }

    async fn delete(&self, region: Region, key: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .remove(&(region, key.to_string()));
        Ok(())
    }

    async fn clear(&self, region: Region) -> Result<()> {
        self.entries.write().await.retain(|(r, _), _| *r != region);
        Ok(())
    }
}
