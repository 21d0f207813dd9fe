use crate::db::VectorStore;
use crate::llm::LLMClient;
use crate::rag::embeddings::Embedder;
use crate::rag::prompt::assemble_prompt;
use crate::types::{AppError, Answer, Result, Source};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Question → Embedder → Vector Index (top-k) → prompt → Generation Model.
pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LLMClient>,
    store: Arc<dyn VectorStore>,
    collection: String,
    k: usize,
}

impl QueryPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LLMClient>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            llm,
            store,
            collection: collection.into(),
            k: 3,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Answer a question with the top-k chunks of the collection as context.
    ///
    /// The question is forwarded as-is, empty or not. An empty collection
    /// degrades to asking the model the bare question.
    #[instrument(skip(self, question), fields(collection = %self.collection, k = self.k))]
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let query_embedding = self.embedder.embed_query(question).await?;

        let results = self
            .store
            .search(&self.collection, &query_embedding, self.k)
            .await
            .map_err(|e| match e {
                AppError::Retrieval(_) => e,
                other => AppError::Retrieval(other.to_string()),
            })?;

        if results.is_empty() {
            warn!("No indexed context found, asking without it");
        } else {
            debug!(
                hits = results.len(),
                top_score = results[0].score,
                "Retrieved context"
            );
        }

        let prompt = assemble_prompt(question, &results);
        let text = self.llm.generate(&prompt).await?;
        info!(
            model = self.llm.model_name(),
            answer_len = text.len(),
            "Answer generated"
        );

        Ok(Answer {
            text,
            sources: results
                .into_iter()
                .map(|r| Source {
                    id: r.entry.id,
                    text: r.entry.text,
                    relevance_score: r.score,
                })
                .collect(),
        })
    }
}
