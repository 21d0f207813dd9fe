//! Vector Store Abstraction Layer
//!
//! This module provides a unified interface for the vector index the
//! pipelines write to and read from. Search is exact: every entry in a
//! collection is scored by cosine similarity against the query.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               VectorStore Trait               │
//! ├──────────────────────────────────────────────┤
//! │  upsert  │  search  │  count  │  clear  │ ... │
//! └──────────────────────────────────────────────┘
//!          ▲                        ▲
//!    ┌─────┴──────┐          ┌──────┴──────┐
//!    │   Local    │          │  InMemory   │
//!    │ (default)  │          │  (testing)  │
//!    └────────────┘          └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use pdfrag::db::{IndexedEntry, VectorStore, VectorStoreProvider};
//!
//! let store = VectorStoreProvider::Local { data_dir: ".".into() }
//!     .create_store()
//!     .await?;
//!
//! store.upsert("facts", &[IndexedEntry::new("Thor is the god of thunder.", embedding)]).await?;
//! let results = store.search("facts", &query_embedding, 3).await?;
//! ```

use crate::types::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

// ============================================================================
// Entries
// ============================================================================

/// Where an entry came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_at: Option<DateTime<Utc>>,
}

/// A chunk of text with its embedding, as stored in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedEntry {
    /// Hex SHA-256 of `text`
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: EntryMetadata,
}

impl IndexedEntry {
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        let text = text.into();
        Self {
            id: content_id(&text),
            text,
            embedding,
            metadata: EntryMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: EntryMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Stable identifier for a chunk of text.
pub fn content_id(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// One retrieval hit.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub entry: IndexedEntry,
    pub score: f32,
}

/// Information about a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub entry_count: usize,
    /// Vector dimensions, fixed by the first entry written
    pub dimensions: Option<usize>,
}

// ============================================================================
// Vector Store Provider Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum VectorStoreProvider {
    /// JSON-file backed store, one `__db_<collection>.json` per collection.
    Local {
        /// Directory holding the collection files.
        data_dir: PathBuf,
    },

    /// In-memory vector store for testing.
    ///
    /// Data is not persisted and will be lost when the process exits.
    InMemory,
}

impl VectorStoreProvider {
    /// Create a vector store instance from this provider configuration.
    pub async fn create_store(&self) -> Result<Arc<dyn VectorStore>> {
        match self {
            VectorStoreProvider::Local { data_dir } => {
                let store = super::local::LocalVectorStore::open(data_dir.clone()).await?;
                Ok(Arc::new(store))
            }
            VectorStoreProvider::InMemory => Ok(Arc::new(InMemoryVectorStore::new())),
        }
    }
}

// ============================================================================
// Vector Store Trait
// ============================================================================

/// Abstract trait for vector index operations.
///
/// # Implementors
///
/// - `LocalVectorStore` - JSON-file persistence (default)
/// - `InMemoryVectorStore` - Testing only
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Get the name of this vector store provider.
    fn provider_name(&self) -> &'static str;

    /// Insert entries into a collection, creating it on first write.
    ///
    /// Entries are identified by their `id`; an existing entry with the same
    /// id is replaced in place.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::IndexWrite`] if an embedding's dimensions differ
    /// from the collection's or the write cannot be persisted.
    async fn upsert(&self, collection: &str, entries: &[IndexedEntry]) -> Result<usize>;

    /// Return at most `limit` entries ordered by descending cosine similarity.
    ///
    /// A collection that does not exist yields no results.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Number of entries in a collection (0 if it does not exist).
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Remove every entry from a collection. Returns how many were removed.
    async fn clear(&self, collection: &str) -> Result<usize>;

    /// List all collections in the store.
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>>;
}

// ============================================================================
// Collection
// ============================================================================

/// Entries of one collection in insertion order, with an id index.
#[derive(Debug, Clone, Default)]
pub(crate) struct Collection {
    entries: Vec<IndexedEntry>,
    positions: HashMap<String, usize>,
}

impl Collection {
    pub(crate) fn from_entries(entries: Vec<IndexedEntry>) -> Self {
        let mut collection = Self::default();
        for entry in entries {
            collection.insert(entry);
        }
        collection
    }

    pub(crate) fn entries(&self) -> &[IndexedEntry] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn dimensions(&self) -> Option<usize> {
        self.entries.first().map(|e| e.embedding.len())
    }

    fn insert(&mut self, entry: IndexedEntry) {
        match self.positions.get(&entry.id) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.positions.insert(entry.id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Validates every entry before touching the collection, so a rejected
    /// batch leaves it unchanged.
    pub(crate) fn upsert(&mut self, entries: &[IndexedEntry]) -> Result<usize> {
        let expected = self
            .dimensions()
            .or_else(|| entries.first().map(|e| e.embedding.len()));

        for entry in entries {
            if entry.embedding.is_empty() {
                return Err(AppError::IndexWrite(format!(
                    "Entry '{}' has an empty embedding",
                    entry.id
                )));
            }
            if let Some(expected) = expected
                && entry.embedding.len() != expected
            {
                return Err(AppError::IndexWrite(format!(
                    "Dimension mismatch for entry '{}': expected {}, got {}",
                    entry.id,
                    expected,
                    entry.embedding.len()
                )));
            }
        }

        for entry in entries {
            self.insert(entry.clone());
        }
        Ok(entries.len())
    }

    pub(crate) fn search(&self, embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        if let Some(expected) = self.dimensions()
            && expected != embedding.len()
        {
            return Err(AppError::Retrieval(format!(
                "Query dimension mismatch: expected {}, got {}",
                expected,
                embedding.len()
            )));
        }

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                score: cosine_similarity(embedding, &entry.embedding),
                entry: entry.clone(),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores; NaN ranks last
        let rank = |score: f32| if score.is_nan() { f32::NEG_INFINITY } else { score };
        results.sort_by(|a, b| rank(b.score).total_cmp(&rank(a.score)));
        results.truncate(limit);

        Ok(results)
    }

    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.positions.clear();
        removed
    }
}

/// Calculate cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

// ============================================================================
// In-Memory Vector Store (for testing)
// ============================================================================

/// In-memory vector store for testing purposes.
///
/// Data is not persisted and will be lost when the process exits.
pub struct InMemoryVectorStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl InMemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn provider_name(&self) -> &'static str {
        "in-memory"
    }

    async fn upsert(&self, collection: &str, entries: &[IndexedEntry]) -> Result<usize> {
        let mut collections = self.collections.write();
        collections
            .entry(collection.to_string())
            .or_default()
            .upsert(entries)
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
        let mut collections = self.collections.write();
        Ok(collections
            .get_mut(collection)
            .map(Collection::clear)
            .unwrap_or(0))
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

// ============================================================================
// Tests
// ============================================================================
