//! Local JSON-file vector store.
//!
//! Each collection is persisted as `<data_dir>/__db_<collection>.json` and
//! kept fully in memory while the process runs. Search is a brute-force
//! cosine scan, which is plenty for a single document's worth of chunks.
//!
//! # Example
//!
//! ```rust,ignore
//! let store = LocalVectorStore::open("./data").await?;
//! store.upsert("facts", &entries).await?;
//! let results = store.search("facts", &embedding, 3).await?;
//! ```

use crate::types::{AppError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::vectorstore::{Collection, CollectionInfo, IndexedEntry, SearchResult, VectorStore};

const FILE_PREFIX: &str = "__db_";
const FILE_SUFFIX: &str = ".json";

/// On-disk layout of one collection file.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCollection {
    name: String,
    entries: Vec<IndexedEntry>,
}

/// Vector store persisted as one JSON file per collection.
pub struct LocalVectorStore {
    data_dir: PathBuf,
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl LocalVectorStore {
    /// Open the store rooted at `data_dir`, loading every collection file
    /// found there. The directory is created on first write if missing.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Retrieval`] if an existing collection file cannot
    /// be read or parsed.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        let store = Self {
            data_dir,
            collections: Arc::new(RwLock::new(HashMap::new())),
        };
        store.load_collections().await?;
        Ok(store)
    }

    /// Directory holding the collection files.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file backing `collection`.
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}{}{}", FILE_PREFIX, collection, FILE_SUFFIX))
    }

    async fn load_collections(&self) -> Result<()> {
        if !self.data_dir.is_dir() {
            return Ok(());
        }

        let mut dir = tokio::fs::read_dir(&self.data_dir).await.map_err(|e| {
            AppError::Retrieval(format!(
                "Failed to read data directory {:?}: {}",
                self.data_dir, e
            ))
        })?;

        let mut loaded = HashMap::new();
        while let Some(item) = dir.next_entry().await.map_err(|e| {
            AppError::Retrieval(format!(
                "Failed to read data directory {:?}: {}",
                self.data_dir, e
            ))
        })? {
            let file_name = item.file_name();
            let Some(name) = file_name
                .to_str()
                .and_then(|n| n.strip_prefix(FILE_PREFIX))
                .and_then(|n| n.strip_suffix(FILE_SUFFIX))
            else {
                continue;
            };

            let path = item.path();
            let data = tokio::fs::read_to_string(&path).await.map_err(|e| {
                AppError::Retrieval(format!("Failed to read collection file {:?}: {}", path, e))
            })?;
            let stored: StoredCollection = serde_json::from_str(&data).map_err(|e| {
                AppError::Retrieval(format!("Failed to parse collection file {:?}: {}", path, e))
            })?;

            debug!(collection = name, entries = stored.entries.len(), "Loaded collection");
            loaded.insert(name.to_string(), Collection::from_entries(stored.entries));
        }

        *self.collections.write() = loaded;
        Ok(())
    }

    /// Persist `contents` as the file for `collection`.
    async fn save_collection(&self, collection: &str, contents: &Collection) -> Result<()> {
        let stored = StoredCollection {
            name: collection.to_string(),
            entries: contents.entries().to_vec(),
        };
        let data = serde_json::to_string(&stored)
            .map_err(|e| AppError::IndexWrite(format!("Failed to serialize collection: {}", e)))?;

        tokio::fs::create_dir_all(&self.data_dir).await.map_err(|e| {
            AppError::IndexWrite(format!(
                "Failed to create data directory {:?}: {}",
                self.data_dir, e
            ))
        })?;

        let path = self.collection_path(collection);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await.map_err(|e| {
            AppError::IndexWrite(format!("Failed to write collection file {:?}: {}", tmp, e))
        })?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| {
            AppError::IndexWrite(format!("Failed to replace collection file {:?}: {}", path, e))
        })?;

        Ok(())
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    fn provider_name(&self) -> &'static str {
        "local"
    }

    async fn upsert(&self, collection: &str, entries: &[IndexedEntry]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        // Mutate a copy; memory only changes once the file is written
        let mut updated = self
            .collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default();
        let written = updated.upsert(entries)?;

        self.save_collection(collection, &updated).await?;
        self.collections
            .write()
            .insert(collection.to_string(), updated);
        info!(collection, written, "Persisted collection");
        Ok(written)
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read();
        match collections.get(collection) {
            Some(col) => col.search(embedding, limit),
            None => Ok(Vec::new()),
        }
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read();
        Ok(collections.get(collection).map(Collection::len).unwrap_or(0))
    }

    async fn clear(&self, collection: &str) -> Result<usize> {
        let existing = self.collections.read().get(collection).map(Collection::len);
        let Some(removed) = existing else {
            return Ok(0);
        };

        let emptied = Collection::default();
        self.save_collection(collection, &emptied).await?;
        self.collections
            .write()
            .insert(collection.to_string(), emptied);
        Ok(removed)
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let collections = self.collections.read();
        let mut infos: Vec<CollectionInfo> = collections
            .iter()
            .map(|(name, col)| CollectionInfo {
                name: name.clone(),
                entry_count: col.len(),
                dimensions: col.dimensions(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }
}
