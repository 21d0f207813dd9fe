//! Indexing and query pipelines.
//!
//! [`RagContext`] wires the configured collaborators together once; the
//! pipelines borrow them through `Arc`s, so building either is cheap.

pub mod indexing;
pub mod query;

pub use indexing::{IndexReport, IndexingPipeline};
pub use query::QueryPipeline;

use crate::db::{VectorStore, VectorStoreProvider};
use crate::llm::{LLMClient, Provider};
use crate::rag::chunker::{Chunker, TextChunker};
use crate::rag::embeddings::Embedder;
use crate::rag::loader::{AutoLoader, DocumentLoader};
use crate::types::Result;
use crate::utils::toml_config::RagConfig;
use std::sync::Arc;
use tracing::info;

/// Everything both pipelines need, built from one [`RagConfig`].
#[derive(Clone)]
pub struct RagContext {
    pub config: RagConfig,
    pub loader: Arc<dyn DocumentLoader>,
    pub chunker: Arc<dyn Chunker>,
    pub embedder: Arc<dyn Embedder>,
    pub llm: Arc<dyn LLMClient>,
    pub store: Arc<dyn VectorStore>,
}

impl RagContext {
    /// Build the loader, chunker, provider clients and local store.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration, or if an existing collection file in
    /// the data directory cannot be read.
    pub async fn from_config(config: RagConfig) -> Result<Self> {
        config.validate()?;

        let provider = Provider::from_config(&config.provider)?;
        let clients = provider.create_clients()?;
        let chunker = TextChunker::new(config.chunking.clone())?;
        let store = VectorStoreProvider::Local {
            data_dir: config.index.data_dir.clone(),
        }
        .create_store()
        .await?;

        info!(
            provider = provider.name(),
            model = provider.model(),
            store = store.provider_name(),
            data_dir = ?config.index.data_dir,
            "RAG context ready"
        );

        Ok(Self {
            loader: Arc::new(AutoLoader),
            chunker: Arc::new(chunker),
            embedder: clients.embedder,
            llm: clients.llm,
            store,
            config,
        })
    }

    /// Assemble a context from explicit parts, keeping `config` for the
    /// collection name, `k` and batch size.
    pub fn from_parts(
        config: RagConfig,
        loader: Arc<dyn DocumentLoader>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LLMClient>,
        store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        let chunker = TextChunker::new(config.chunking.clone())?;
        Ok(Self {
            config,
            loader,
            chunker: Arc::new(chunker),
            embedder,
            llm,
            store,
        })
    }

    pub fn indexing(&self) -> IndexingPipeline {
        IndexingPipeline::new(
            self.loader.clone(),
            self.chunker.clone(),
            self.embedder.clone(),
            self.store.clone(),
            self.config.index.collection.clone(),
        )
        .with_batch_size(self.config.embedding.batch_size)
    }

    pub fn query(&self) -> QueryPipeline {
        QueryPipeline::new(
            self.embedder.clone(),
            self.llm.clone(),
            self.store.clone(),
            self.config.index.collection.clone(),
        )
        .with_k(self.config.retrieval.k)
    }
}
