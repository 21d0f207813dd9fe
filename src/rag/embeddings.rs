use crate::types::Result;
use async_trait::async_trait;

/// Text-to-vector boundary.
///
/// Implemented by the hosted providers in [`crate::llm`]; tests substitute a
/// deterministic fake.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed document chunks for storage. Returns one vector per input, in order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single search query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding model name/identifier
    fn embedding_model(&self) -> &str;
}
