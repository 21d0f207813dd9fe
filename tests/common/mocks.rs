//! Mock implementations for testing.
//!
//! Deterministic stand-ins for the embedding and generation services so the
//! pipelines can run without network access.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use pdfrag::llm::LLMClient;
use pdfrag::rag::embeddings::Embedder;
use pdfrag::types::{AppError, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub const EMBEDDING_DIMENSIONS: usize = 64;

/// Bag-of-words embedder: each lowercase word is hashed into one of
/// [`EMBEDDING_DIMENSIONS`] buckets, so texts sharing words score higher.
#[derive(Clone, Default)]
pub struct HashEmbedder {
    batches: Arc<Mutex<Vec<usize>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes of the `embed_documents` batches received, in order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }

    pub fn embed(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; EMBEDDING_DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() as usize) % EMBEDDING_DIMENSIONS] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batches.lock().push(texts.len());
        Ok(texts.iter().map(|t| Self::embed(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.queries.lock().push(text.to_string());
        Ok(Self::embed(text))
    }

    fn embedding_model(&self) -> &str {
        "hash-embedder"
    }
}

/// Embedder that simulates a broken embedding service.
#[derive(Clone)]
pub enum FailingEmbedder {
    /// Every call fails
    Unavailable,
    /// Document batches come back one vector short
    DropsVectors,
}

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self {
            FailingEmbedder::Unavailable => Err(AppError::GenerationService(
                "Mock embedding failure".to_string(),
            )),
            FailingEmbedder::DropsVectors => Ok(texts
                .iter()
                .skip(1)
                .map(|t| HashEmbedder::embed(t))
                .collect()),
        }
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        match self {
            FailingEmbedder::Unavailable => Err(AppError::GenerationService(
                "Mock embedding failure".to_string(),
            )),
            FailingEmbedder::DropsVectors => Ok(HashEmbedder::embed(text)),
        }
    }

    fn embedding_model(&self) -> &str {
        "failing-embedder"
    }
}

/// Mock LLM client that records every prompt it receives.
///
/// ```ignore
/// let client = MockLLMClient::new("Thanos is a Titan.");
/// let client = MockLLMClient::failing();
/// ```
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if self.should_fail {
            return Err(AppError::GenerationService(
                "Mock LLM failure".to_string(),
            ));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// A few thousand characters of prose, enough for several chunks.
pub fn avengers_text() -> String {
    let paragraphs = [
        "The Avengers are a team of superheroes who protect the Earth from threats \
         too great for any single hero. Tony Stark builds powered suits of armor in \
         his workshop. Steve Rogers carries a vibranium shield and leads the team in \
         battle. Thor wields the hammer Mjolnir and commands thunder and lightning.",
        "Bruce Banner is a brilliant scientist who transforms into the Hulk when he \
         is angry. Natasha Romanoff is a spy trained in the Red Room. Clint Barton is \
         an archer who never misses his target. Together they defended New York \
         during the Chitauri invasion led by Loki.",
        "Thanos is a Titan who seeks the six Infinity Stones. With all six stones in \
         the Infinity Gauntlet he can reshape the universe with a snap of his fingers. \
         The Avengers fought Thanos in Wakanda and later on Titan, but he collected \
         every stone and erased half of all life.",
        "Five years later the surviving Avengers travelled through time to recover the \
         stones before Thanos could find them. Tony Stark sacrificed himself to defeat \
         Thanos and his army. Steve Rogers returned the stones to their places in time \
         and chose to live a quiet life.",
    ];

    let mut text = String::new();
    for round in 0..3 {
        for paragraph in paragraphs {
            text.push_str(paragraph);
            text.push_str(&format!(" This is retelling number {}.\n\n", round + 1));
        }
    }
    text
}
