//! Google Gemini REST client.
//!
//! Covers the three endpoints the pipeline needs:
//! `generateContent`, `embedContent` and `batchEmbedContents`.

use crate::llm::client::LLMClient;
use crate::rag::embeddings::Embedder;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Environment variable named in the missing-key error unless overridden.
pub const DEFAULT_API_KEY_ENV: &str = "GOOGLE_GENAI_API_KEY";

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    api_key_env: String,
    api_base: String,
    model: String,
    embedding_model: String,
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl Content {
    fn user(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }

    fn text(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest {
    model: String,
    content: Content,
    task_type: &'static str,
}

#[derive(Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Embedding,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<Embedding>,
}

#[derive(Deserialize)]
struct Embedding {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

fn bare_model_name(model: String) -> String {
    match model.strip_prefix("models/") {
        Some(bare) => bare.to_string(),
        None => model,
    }
}

impl GeminiClient {
    /// Model names may be given with or without the `models/` prefix.
    pub fn new(
        api_key: Option<String>,
        api_base: String,
        model: String,
        embedding_model: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: bare_model_name(model),
            embedding_model: bare_model_name(embedding_model),
        })
    }

    /// Name the environment variable the key is expected in.
    pub fn with_api_key_env(mut self, name: impl Into<String>) -> Self {
        self.api_key_env = name.into();
        self
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::GenerationService(format!(
                "No Gemini API key configured; set {}",
                self.api_key_env
            ))
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.api_base, model, method)
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, url: &str, body: &B) -> Result<R> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::GenerationService(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            AppError::GenerationService(format!("Failed to read Gemini response: {}", e))
        })?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(err) => format!(
                    "{} ({}): {}",
                    err.error.code.unwrap_or(status.as_u16()),
                    err.error.status.unwrap_or_default(),
                    err.error.message
                ),
                Err(_) => format!("{}: {}", status, text),
            };
            return Err(AppError::GenerationService(format!(
                "Gemini API error {}",
                detail
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            AppError::GenerationService(format!("Unexpected Gemini response: {}", e))
        })
    }

    fn embed_request(&self, text: &str, task_type: &'static str) -> EmbedRequest {
        EmbedRequest {
            model: format!("models/{}", self.embedding_model),
            content: Content::text(text),
            task_type,
        }
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content::user(prompt)],
        };

        let response: GenerateResponse = self
            .post(&self.endpoint(&self.model, "generateContent"), &request)
            .await?;

        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(AppError::GenerationService(format!(
                "Gemini returned no answer: {}",
                reason
            )));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        let finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown");

        // SAFETY, RECITATION and friends come back as a candidate without text
        if text.is_empty() && finish_reason != "STOP" {
            return Err(AppError::GenerationService(format!(
                "Gemini returned no answer: finish reason {}",
                finish_reason
            )));
        }

        debug!(
            finish_reason,
            answer_len = text.len(),
            "Gemini generation complete"
        );

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for GeminiClient {
    #[instrument(skip(self, texts), fields(model = %self.embedding_model, count = texts.len()))]
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|t| self.embed_request(t, "RETRIEVAL_DOCUMENT"))
                .collect(),
        };

        let response: BatchEmbedResponse = self
            .post(
                &self.endpoint(&self.embedding_model, "batchEmbedContents"),
                &request,
            )
            .await?;

        if response.embeddings.len() != texts.len() {
            return Err(AppError::GenerationService(format!(
                "Gemini returned {} embeddings for {} inputs",
                response.embeddings.len(),
                texts.len()
            )));
        }

        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    #[instrument(skip(self, text), fields(model = %self.embedding_model))]
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let request = self.embed_request(text, "RETRIEVAL_QUERY");
        let response: EmbedResponse = self
            .post(&self.endpoint(&self.embedding_model, "embedContent"), &request)
            .await?;
        Ok(response.embedding.values)
    }

    fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}
