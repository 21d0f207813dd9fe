//! End-to-end tests for the indexing and query pipelines
//!
//! Generation and embedding are mocked; documents, chunking and the local
//! vector store are real.

mod common;

use common::mocks::{FailingEmbedder, HashEmbedder, MockLLMClient, avengers_text};
use pdfrag::db::{LocalVectorStore, VectorStore};
use pdfrag::pipeline::RagContext;
use pdfrag::rag::embeddings::Embedder;
use pdfrag::rag::loader::AutoLoader;
use pdfrag::types::AppError;
use pdfrag::utils::toml_config::RagConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    llm: MockLLMClient,
    embedder: HashEmbedder,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            llm: MockLLMClient::new("The document is about the Avengers."),
            embedder: HashEmbedder::new(),
        }
    }

    fn config(&self) -> RagConfig {
        let mut config = RagConfig::default();
        config.index.data_dir = self.dir.path().join("index");
        config
    }

    fn write_document(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    async fn context(&self) -> RagContext {
        self.context_with(self.config(), Arc::new(self.embedder.clone()))
            .await
    }

    async fn context_with(&self, config: RagConfig, embedder: Arc<dyn Embedder>) -> RagContext {
        let store = LocalVectorStore::open(&config.index.data_dir).await.unwrap();
        RagContext::from_parts(
            config,
            Arc::new(AutoLoader),
            embedder,
            Arc::new(self.llm.clone()),
            Arc::new(store),
        )
        .unwrap()
    }
}

// ============= Indexing =============

#[tokio::test]
async fn test_index_document_produces_chunks_and_entries() {
    let fx = Fixture::new();
    let doc = fx.write_document("avengers.txt", &avengers_text());
    let ctx = fx.context().await;

    let report = ctx.indexing().index(&doc).await.unwrap();

    assert!(report.chunks >= 1);
    assert_eq!(report.entries_written, report.chunks);
    assert_eq!(report.collection_size, report.chunks);
    assert_eq!(report.characters, avengers_text().chars().count());
    assert_eq!(report.source, doc);
    assert!(fx.dir.path().join("index").join("__db_facts.json").exists());
}

#[tokio::test]
async fn test_reindexing_does_not_shrink_collection() {
    let fx = Fixture::new();
    let doc = fx.write_document("avengers.txt", &avengers_text());
    let ctx = fx.context().await;

    let first = ctx.indexing().index(&doc).await.unwrap();
    let second = ctx.indexing().index(&doc).await.unwrap();
    let third = ctx.indexing().index(&doc).await.unwrap();

    assert!(second.collection_size >= first.collection_size);
    // Content-addressed ids make re-indexing idempotent
    assert_eq!(third.collection_size, first.collection_size);
}

#[tokio::test]
async fn test_rebuild_replaces_previous_document() {
    let fx = Fixture::new();
    let avengers = fx.write_document("avengers.txt", &avengers_text());
    let short = fx.write_document("short.txt", "Groot is a tree. He only says three words.");
    let ctx = fx.context().await;

    ctx.indexing().index(&avengers).await.unwrap();
    let report = ctx.indexing().rebuild(&short).await.unwrap();

    assert_eq!(report.chunks, 1);
    assert_eq!(report.collection_size, 1);
}

#[tokio::test]
async fn test_failed_rebuild_keeps_previous_index() {
    let fx = Fixture::new();
    let avengers = fx.write_document("avengers.txt", &avengers_text());
    let indexed = {
        let ctx = fx.context().await;
        ctx.indexing().index(&avengers).await.unwrap().collection_size
    };

    let ctx = fx.context().await;
    let result = ctx.indexing().rebuild(Path::new("missing.pdf")).await;
    assert!(matches!(result, Err(AppError::DocumentRead(_))));
    assert_eq!(ctx.store.count("facts").await.unwrap(), indexed);

    let ctx = fx
        .context_with(fx.config(), Arc::new(FailingEmbedder::Unavailable))
        .await;
    let result = ctx.indexing().rebuild(&avengers).await;
    assert!(matches!(result, Err(AppError::GenerationService(_))));

    let reopened = fx.context().await;
    assert_eq!(reopened.store.count("facts").await.unwrap(), indexed);
}

#[tokio::test]
async fn test_embeddings_are_batched() {
    let fx = Fixture::new();
    let doc = fx.write_document("avengers.txt", &avengers_text());
    let mut config = fx.config();
    config.chunking.min_length = 100;
    config.chunking.max_length = 200;
    config.chunking.overlap = 20;
    config.embedding.batch_size = 4;
    let ctx = fx.context_with(config, Arc::new(fx.embedder.clone())).await;

    let report = ctx.indexing().index(&doc).await.unwrap();

    let batches = fx.embedder.batch_sizes();
    assert!(batches.len() > 1);
    assert!(batches.iter().all(|&size| size <= 4));
    assert_eq!(batches.iter().sum::<usize>(), report.chunks);
}

#[tokio::test]
async fn test_empty_document_is_noop() {
    let fx = Fixture::new();
    let doc = fx.write_document("empty.txt", "");
    let ctx = fx.context().await;

    let report = ctx.indexing().index(&doc).await.unwrap();

    assert_eq!(report.chunks, 0);
    assert_eq!(report.entries_written, 0);
    assert!(fx.embedder.batch_sizes().is_empty());
}

#[tokio::test]
async fn test_missing_document_is_document_read_error() {
    let fx = Fixture::new();
    let ctx = fx.context().await;

    let result = ctx.indexing().index(Path::new("nope/Avengers.pdf")).await;
    assert!(matches!(result, Err(AppError::DocumentRead(_))));
}

#[tokio::test]
async fn test_embedding_failure_writes_nothing() {
    let fx = Fixture::new();
    let doc = fx.write_document("avengers.txt", &avengers_text());

    for embedder in [FailingEmbedder::Unavailable, FailingEmbedder::DropsVectors] {
        let ctx = fx.context_with(fx.config(), Arc::new(embedder)).await;
        let result = ctx.indexing().index(&doc).await;

        assert!(matches!(result, Err(AppError::GenerationService(_))));
        assert_eq!(ctx.store.count("facts").await.unwrap(), 0);
    }
}

#[tokio::test]
async fn test_preview_does_not_embed() {
    let fx = Fixture::new();
    let doc = fx.write_document("avengers.txt", &avengers_text());
    let ctx = fx.context().await;

    let chunks = ctx.indexing().preview(&doc).await.unwrap();

    assert!(chunks.len() >= 2);
    assert!(fx.embedder.batch_sizes().is_empty());
    assert_eq!(ctx.store.count("facts").await.unwrap(), 0);
}

// ============= Query =============

#[tokio::test]
async fn test_ask_after_indexing_uses_retrieved_context() {
    let fx = Fixture::new();
    let doc = fx.write_document("avengers.txt", &avengers_text());
    let ctx = fx.context().await;
    ctx.indexing().index(&doc).await.unwrap();

    let answer = ctx
        .query()
        .answer("What is this document about?")
        .await
        .unwrap();

    assert!(!answer.text.is_empty());
    assert!(!answer.sources.is_empty());
    assert!(answer.sources.len() <= 3);
    assert!(
        answer
            .sources
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score)
    );

    let prompt = fx.llm.last_prompt().unwrap();
    assert!(prompt.starts_with("What is this document about?"));
    assert!(prompt.contains("Use the following information to complete your task:"));
    assert!(prompt.contains("- [0]: "));
    assert!(prompt.contains(&answer.sources[0].text));
}

#[tokio::test]
async fn test_ask_prefers_matching_chunk() {
    let fx = Fixture::new();
    let mut config = fx.config();
    config.chunking.min_length = 10;
    config.chunking.max_length = 80;
    config.chunking.overlap = 0;
    let doc = fx.write_document(
        "facts.txt",
        "Thor wields the hammer Mjolnir. Hulk smashes everything in sight. \
         Black Widow is a trained spy.",
    );
    let ctx = fx.context_with(config, Arc::new(fx.embedder.clone())).await;
    ctx.indexing().index(&doc).await.unwrap();

    let answer = ctx
        .query()
        .answer("Who wields the hammer Mjolnir?")
        .await
        .unwrap();

    assert!(answer.sources[0].text.contains("Mjolnir"));
}

#[tokio::test]
async fn test_ask_before_indexing_sends_bare_question() {
    let fx = Fixture::new();
    let ctx = fx.context().await;

    let answer = ctx.query().answer("Who is Thanos?").await.unwrap();

    assert!(!answer.text.is_empty());
    assert!(answer.sources.is_empty());
    assert_eq!(fx.llm.last_prompt().unwrap(), "Who is Thanos?");
}

#[tokio::test]
async fn test_empty_question_is_forwarded() {
    let fx = Fixture::new();
    let ctx = fx.context().await;

    ctx.query().answer("").await.unwrap();

    assert_eq!(fx.embedder.queries(), vec![String::new()]);
    assert_eq!(fx.llm.last_prompt().unwrap(), "");
}

#[tokio::test]
async fn test_generation_failure_surfaces() {
    let fx = Fixture {
        llm: MockLLMClient::failing(),
        ..Fixture::new()
    };
    let doc = fx.write_document("avengers.txt", &avengers_text());
    let ctx = fx.context().await;
    ctx.indexing().index(&doc).await.unwrap();

    let result = ctx.query().answer("Who is Thanos?").await;
    assert!(matches!(result, Err(AppError::GenerationService(_))));
}

#[tokio::test]
async fn test_query_embedding_failure_surfaces() {
    let fx = Fixture::new();
    let ctx = fx
        .context_with(fx.config(), Arc::new(FailingEmbedder::Unavailable))
        .await;

    let result = ctx.query().answer("Who is Thanos?").await;
    assert!(matches!(result, Err(AppError::GenerationService(_))));
    assert!(fx.llm.prompts().is_empty());
}

#[tokio::test]
async fn test_index_survives_restart() {
    let fx = Fixture::new();
    let doc = fx.write_document("avengers.txt", &avengers_text());
    let indexed = {
        let ctx = fx.context().await;
        ctx.indexing().index(&doc).await.unwrap().collection_size
    };

    let ctx = fx.context().await;
    assert_eq!(ctx.store.count("facts").await.unwrap(), indexed);

    let answer = ctx.query().answer("Who is Thanos?").await.unwrap();
    assert_eq!(answer.sources.len(), 3.min(indexed));
}
