use crate::db::{EntryMetadata, IndexedEntry, VectorStore};
use crate::rag::chunker::Chunker;
use crate::rag::embeddings::Embedder;
use crate::rag::loader::DocumentLoader;
use crate::types::{AppError, Chunk, Result};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of one indexing run.
#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub source: PathBuf,
    /// Characters of extracted text
    pub characters: usize,
    pub chunks: usize,
    pub entries_written: usize,
    /// Entries in the collection after the run
    pub collection_size: usize,
}

/// A document that has been chunked and embedded but not yet stored.
struct Prepared {
    source: PathBuf,
    characters: usize,
    entries: Vec<IndexedEntry>,
}

/// Loader → Chunker → Embedder → Vector Index for a single document.
pub struct IndexingPipeline {
    loader: Arc<dyn DocumentLoader>,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    collection: String,
    batch_size: usize,
}

impl IndexingPipeline {
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        chunker: Arc<dyn Chunker>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            loader,
            chunker,
            embedder,
            store,
            collection: collection.into(),
            batch_size: 100,
        }
    }

    /// Maximum chunks per embedding request. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Load and chunk a document without embedding or storing anything.
    pub async fn preview(&self, path: &Path) -> Result<Vec<Chunk>> {
        let document = self.loader.load(path).await?;
        Ok(self.chunker.chunk(&document.text))
    }

    /// Index a document into the collection.
    ///
    /// Entries are keyed by content hash, so indexing an unchanged document
    /// again leaves the collection size unchanged. Nothing is written unless
    /// every chunk was embedded.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn index(&self, path: &Path) -> Result<IndexReport> {
        let prepared = self.prepare(path).await?;
        self.write(prepared).await
    }

    /// Replace the collection's contents with the document.
    ///
    /// The collection is only cleared once the document has been loaded and
    /// fully embedded, so a failed rebuild leaves the previous index intact.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn rebuild(&self, path: &Path) -> Result<IndexReport> {
        let prepared = self.prepare(path).await?;
        let removed = self.store.clear(&self.collection).await?;
        info!(removed, "Cleared collection");
        self.write(prepared).await
    }

    /// Load, chunk and embed. Touches nothing in the store.
    async fn prepare(&self, path: &Path) -> Result<Prepared> {
        let document = self.loader.load(path).await?;
        let characters = document.char_len();
        let chunks = self.chunker.chunk(&document.text);
        info!(characters, chunks = chunks.len(), "Document chunked");

        if chunks.is_empty() {
            warn!(?path, "Document produced no text to index");
            return Ok(Prepared {
                source: document.source,
                characters,
                entries: Vec::new(),
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embed_all(&texts).await?;

        let source = document.source.to_string_lossy().into_owned();
        let indexed_at = Utc::now();
        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                IndexedEntry::new(chunk.text, embedding).with_metadata(EntryMetadata {
                    source: Some(source.clone()),
                    chunk_index: Some(chunk.index),
                    indexed_at: Some(indexed_at),
                })
            })
            .collect();

        Ok(Prepared {
            source: document.source,
            characters,
            entries,
        })
    }

    async fn write(&self, prepared: Prepared) -> Result<IndexReport> {
        let chunks = prepared.entries.len();
        let entries_written = if chunks == 0 {
            0
        } else {
            self.store.upsert(&self.collection, &prepared.entries).await?
        };
        let collection_size = self.store.count(&self.collection).await?;
        info!(entries_written, collection_size, "Indexing complete");

        Ok(IndexReport {
            source: prepared.source,
            characters: prepared.characters,
            chunks,
            entries_written,
            collection_size,
        })
    }

    async fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for (batch_no, batch) in texts.chunks(self.batch_size).enumerate() {
            let vectors = self.embedder.embed_documents(batch).await?;
            if vectors.len() != batch.len() {
                return Err(AppError::GenerationService(format!(
                    "Embedding service returned {} vectors for {} chunks",
                    vectors.len(),
                    batch.len()
                )));
            }
            debug!(batch = batch_no, size = batch.len(), "Embedded batch");
            embeddings.extend(vectors);
        }

        Ok(embeddings)
    }
}
