use crate::llm::client::LLMClient;
use crate::rag::embeddings::Embedder;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, request::ChatMessageRequest},
    generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest},
};

pub struct OllamaClient {
    client: Ollama,
    model: String,
    embedding_model: String,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String, embedding_model: String) -> Self {
        let (host, port) = parse_base_url(&base_url);
        let client = Ollama::new(host, port);

        Self {
            client,
            model,
            embedding_model,
        }
    }
}

/// Split `scheme://host:port` into the host URL and port Ollama expects.
fn parse_base_url(base_url: &str) -> (String, u16) {
    let (scheme, rest) = match base_url.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => ("http", base_url),
    };
    let rest = rest.trim_end_matches('/');

    match rest.rsplit_once(':') {
        Some((host, port)) => (
            format!("{}://{}", scheme, host),
            port.parse().unwrap_or(11434),
        ),
        None if rest.is_empty() => ("http://localhost".to_string(), 11434),
        None => (format!("{}://{}", scheme, rest), 11434),
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let messages = vec![ChatMessage::user(prompt.to_string())];

        let request = ChatMessageRequest::new(self.model.clone(), messages);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AppError::GenerationService(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = GenerateEmbeddingsRequest::new(
            self.embedding_model.clone(),
            EmbeddingsInput::Multiple(texts.to_vec()),
        );

        let response = self
            .client
            .generate_embeddings(request)
            .await
            .map_err(|e| AppError::GenerationService(format!("Ollama embedding error: {}", e)))?;

        if response.embeddings.len() != texts.len() {
            return Err(AppError::GenerationService(format!(
                "Ollama returned {} embeddings for {} inputs",
                response.embeddings.len(),
                texts.len()
            )));
        }

        Ok(response.embeddings)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let request = GenerateEmbeddingsRequest::new(
            self.embedding_model.clone(),
            EmbeddingsInput::Single(text.to_string()),
        );

        let response = self
            .client
            .generate_embeddings(request)
            .await
            .map_err(|e| AppError::GenerationService(format!("Ollama embedding error: {}", e)))?;

        response.embeddings.into_iter().next().ok_or_else(|| {
            AppError::GenerationService("Ollama returned no embedding".to_string())
        })
    }

    fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}
