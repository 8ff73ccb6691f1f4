//! File-backed store.
//!
//! The durable region is kept in memory and rewritten to a JSON file after every
//! change. A change reaches memory only once the file write succeeded. The volatile
//! region never touches disk. Values are base64 encoded in the
//! file.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::{Region, Store, StoreError};
use crate::Result;

/// On-disk format version.
const FILE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct DurableFile {
    version: u32,
    entries: BTreeMap<String, String>,
}

/// Store persisting its durable region to a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    durable: Mutex<BTreeMap<String, Vec<u8>>>,
    volatile: RwLock<HashMap<String, Vec<u8>>>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let durable = match tokio::fs::read_to_string(&path).await {
            Ok(json) => decode_file(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::FileIo { source }.into()),
        };
        debug!(path = %path.display(), entries = durable.len(), "Opened file store");
        Ok(Self {
            path,
            durable: Mutex::new(durable),
            volatile: RwLock::new(HashMap::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the durable region. The file is replaced atomically via a rename.
    async fn persist(&self, entries: &BTreeMap<String, Vec<u8>>) -> Result<()> {
        let file = DurableFile {
            version: FILE_VERSION,
            entries: entries
                .iter()
                .map(|(k, v)| (k.clone(), Base64::encode_string(v)))
                .collect(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|source| StoreError::SerializationFailed { source })?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| StoreError::FileIo { source })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StoreError::FileIo { source })?;
        Ok(())
    }
}

fn decode_file(json: &str) -> Result<BTreeMap<String, Vec<u8>>> {
    let file: DurableFile =
        serde_json::from_str(json).map_err(|source| StoreError::DeserializationFailed { source })?;
    if file.version != FILE_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: file.version,
            expected: FILE_VERSION,
        }
        .into());
    }
    file.entries
        .into_iter()
        .map(|(key, value)| match Base64::decode_vec(&value) {
            Ok(bytes) => Ok((key, bytes)),
            Err(e) => Err(StoreError::CorruptValue {
                key,
                reason: e.to_string(),
            }
            .into()),
        })
        .collect()
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, region: Region, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(match region {
            Region::Durable => self.durable.lock().await.get(key).cloned(),
            Region::Volatile => self.volatile.read().await.get(key).cloned(),
        })
    }

    async fn set(&self, region: Region, key: &str, value: Vec<u8>) -> Result<()> {
        match region {
            Region::Durable => {
                let mut durable = self.durable.lock().await;
                let mut staged = durable.clone();
                staged.insert(key.to_string(), value);
                self.persist(&staged).await?;
                *durable = staged;
                Ok(())
            }
            Region::Volatile => {
                self.volatile.write().await.insert(key.to_string(), value);
                Ok(())
            }
        }
    }

    async fn delete(&self, region: Region, key: &str) -> Result<()> {
        match region {
            Region::Durable => {
                let mut durable = self.durable.lock().await;
                if durable.contains_key(key) {
                    let mut staged = durable.clone();
                    staged.remove(key);
                    self.persist(&staged).await?;
                    *durable = staged;
                }
                Ok(())
            }
            Region::Volatile => {
                self.volatile.write().await.remove(key);
                Ok(())
            }
        }
    }

    async fn clear(&self, region: Region) -> Result<()> {
        match region {
            Region::Durable => {
                let mut durable = self.durable.lock().await;
                self.persist(&BTreeMap::new()).await?;
                durable.clear();
                Ok(())
            }
            Region::Volatile => {
                self.volatile.write().await.clear();
                Ok(())
            }
        }
    }
}
