//! # pdfrag - Retrieval Augmented Generation over a PDF
//!
//! Indexes a single document into a local vector collection and answers
//! questions about it with a hosted model.
//!
//! ## Overview
//!
//! Two pipelines share one set of collaborators:
//!
//! 1. **Indexing** - load → chunk → embed → store under the `facts` collection
//! 2. **Query** - embed the question → top-k search → prompt → generate
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use pdfrag::{RagConfig, RagContext};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = RagContext::from_config(RagConfig::load_or_default("pdfrag.toml")?).await?;
//!
//!     ctx.indexing().index(Path::new("Avengers.pdf")).await?;
//!     let answer = ctx.query().answer("Who is Thanos?").await?;
//!     println!("{}", answer.text);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Local Ollama server for generation and embeddings |
//!
//! ## Modules
//!
//! - [`rag`] - Loading, chunking, embedding boundary, prompt assembly
//! - [`db`] - Vector store trait and the local JSON-file store
//! - [`llm`] - Gemini (and optional Ollama) clients
//! - [`pipeline`] - Indexing and query pipelines
//! - [`flows`] - Named operations (`indexMenu`, `MainMenu`)
//! - [`types`] - Common types and error handling

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Command-line interface definitions and output helpers.
#[allow(missing_docs)]
pub mod cli;
/// Vector index storage.
pub mod db;
/// Named flows for host orchestration.
#[allow(missing_docs)]
pub mod flows;
/// LLM provider clients and abstractions.
#[allow(missing_docs)]
pub mod llm;
/// Indexing and query pipelines.
#[allow(missing_docs)]
pub mod pipeline;
/// Retrieval Augmented Generation (RAG) components.
#[allow(missing_docs)]
pub mod rag;
/// Core types and error handling.
#[allow(missing_docs)]
pub mod types;
/// Configuration utilities (TOML).
#[allow(missing_docs)]
pub mod utils;

// Re-export commonly used types
pub use db::{InMemoryVectorStore, LocalVectorStore, VectorStore};
pub use flows::FlowRegistry;
pub use llm::{LLMClient, Provider};
pub use pipeline::{IndexReport, IndexingPipeline, QueryPipeline, RagContext};
pub use rag::embeddings::Embedder;
pub use types::{AppError, Result};
pub use utils::toml_config::RagConfig;
