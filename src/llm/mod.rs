//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for the hosted model that both
//! embeds text and answers questions. Provider-specific code lives behind
//! [`LLMClient`] and [`Embedder`](crate::rag::embeddings::Embedder).
//!
//! # Supported Providers
//!
//! - `gemini` (default) - Google Gemini REST API
//! - `ollama` - Local Ollama server, behind the `ollama` Cargo feature
//!
//! # Example
//!
//! ```ignore
//! use pdfrag::llm::Provider;
//!
//! let clients = Provider::from_config(&config.provider)?.create_clients()?;
//! let answer = clients.llm.generate("Who is Thanos?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
pub mod gemini;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use client::{LLMClient, ModelProvider, Provider, ProviderClients};
pub use gemini::GeminiClient;
