//! Retrieval Augmented Generation (RAG) building blocks
//!
//! Each stage is a narrow trait over an external collaborator so the
//! pipelines in [`crate::pipeline`] can be driven by deterministic fakes.
//!
//! # Module Structure
//!
//! - [`rag::loader`](crate::rag::loader) - Document text extraction (PDF, plain text)
//! - [`rag::chunker`](crate::rag::chunker) - Overlapping, size-bounded chunking
//! - [`rag::embeddings`](crate::rag::embeddings) - Text-to-vector boundary
//! - [`rag::prompt`](crate::rag::prompt) - Question + context prompt assembly
//!
//! # RAG Pipeline
//!
//! 1. **Ingestion** - The document is loaded and chunked
//! 2. **Storage** - Chunks are embedded and written to the local vector store
//! 3. **Retrieval** - The question is embedded, the top-k chunks retrieved
//! 4. **Generation** - The LLM answers with the chunks as context
//!
//! # Example
//!
//! ```ignore
//! use pdfrag::rag::chunker::{Chunker, ChunkingConfig, TextChunker};
//!
//! let chunker = TextChunker::new(ChunkingConfig::default())?;
//! let chunks = chunker.chunk(&document.text);
//! let embeddings = embedder.embed_documents(&texts).await?;
//! ```

pub mod chunker;
pub mod embeddings;
pub mod loader;
pub mod prompt;
