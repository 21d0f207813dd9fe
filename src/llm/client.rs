//! LLM Client abstractions and provider management
//!
//! Every provider implements both [`LLMClient`] (answer generation) and
//! [`Embedder`] (chunk and query embeddings), so one configured provider
//! serves the whole pipeline.

use crate::rag::embeddings::Embedder;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// A provider that can both generate and embed.
pub trait ModelProvider: LLMClient + Embedder {}

impl<T: LLMClient + Embedder> ModelProvider for T {}

/// Handles to one provider through each of its roles.
#[derive(Clone)]
pub struct ProviderClients {
    pub llm: Arc<dyn LLMClient>,
    pub embedder: Arc<dyn Embedder>,
}

impl ProviderClients {
    /// Share a single provider for generation and embedding.
    pub fn from_provider<P: ModelProvider + 'static>(provider: P) -> Self {
        let provider = Arc::new(provider);
        Self {
            llm: provider.clone(),
            embedder: provider,
        }
    }
}

/// Provider enum for runtime selection
///
/// | Provider | Generation | Embeddings | Notes |
/// |----------|------------|------------|-------|
/// | Gemini | ✅ | ✅ | Default, hosted |
/// | Ollama | ✅ | ✅ | Local, `ollama` feature |
#[derive(Debug, Clone)]
pub enum Provider {
    /// Google Gemini API
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Gemini {
    ///     api_key: std::env::var("GOOGLE_GENAI_API_KEY").ok(),
    ///     api_key_env: "GOOGLE_GENAI_API_KEY".to_string(),
    ///     api_base: "https://generativelanguage.googleapis.com".to_string(),
    ///     model: "gemini-1.5-flash".to_string(),
    ///     embedding_model: "text-embedding-004".to_string(),
    ///     timeout_secs: 120,
    /// };
    /// ```
    Gemini {
        /// `None` is accepted here and reported on the first request.
        api_key: Option<String>,
        /// Variable the key was read from, named in the missing-key error
        api_key_env: String,
        api_base: String,
        model: String,
        embedding_model: String,
        timeout_secs: u64,
    },

    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "llama3.2".to_string(),
    ///     embedding_model: "nomic-embed-text".to_string(),
    /// };
    /// ```
    #[cfg(feature = "ollama")]
    Ollama {
        base_url: String,
        model: String,
        embedding_model: String,
    },
}

impl Provider {
    /// Create the generation and embedding clients for this provider
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] if the HTTP client cannot be built.
    pub fn create_clients(&self) -> Result<ProviderClients> {
        match self {
            Provider::Gemini {
                api_key,
                api_key_env,
                api_base,
                model,
                embedding_model,
                timeout_secs,
            } => {
                let client = super::gemini::GeminiClient::new(
                    api_key.clone(),
                    api_base.clone(),
                    model.clone(),
                    embedding_model.clone(),
                    *timeout_secs,
                )?
                .with_api_key_env(api_key_env.clone());
                Ok(ProviderClients::from_provider(client))
            }

            #[cfg(feature = "ollama")]
            Provider::Ollama {
                base_url,
                model,
                embedding_model,
            } => {
                let client = super::ollama::OllamaClient::new(
                    base_url.clone(),
                    model.clone(),
                    embedding_model.clone(),
                );
                Ok(ProviderClients::from_provider(client))
            }
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini { .. } => "Gemini",
            #[cfg(feature = "ollama")]
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// Generation model identifier
    pub fn model(&self) -> &str {
        match self {
            Provider::Gemini { model, .. } => model,
            #[cfg(feature = "ollama")]
            Provider::Ollama { model, .. } => model,
        }
    }

    /// Build a provider from the `[provider]` section of the config.
    ///
    /// The Gemini API key is read from the environment variable the config
    /// names; an unset or empty variable is left for the client to report.
    pub fn from_config(config: &crate::utils::toml_config::ProviderConfig) -> Result<Self> {
        use crate::utils::toml_config::ProviderKind;

        match config.kind {
            ProviderKind::Gemini => Ok(Provider::Gemini {
                api_key: std::env::var(&config.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty()),
                api_key_env: config.api_key_env.clone(),
                api_base: config.api_base.clone(),
                model: config.model.clone(),
                embedding_model: config.embedding_model.clone(),
                timeout_secs: config.timeout_secs,
            }),

            #[cfg(feature = "ollama")]
            ProviderKind::Ollama => Ok(Provider::Ollama {
                base_url: config.api_base.clone(),
                model: config.model.clone(),
                embedding_model: config.embedding_model.clone(),
            }),

            #[cfg(not(feature = "ollama"))]
            ProviderKind::Ollama => Err(AppError::Configuration(
                "Provider 'ollama' requires building with the 'ollama' feature".to_string(),
            )),
        }
    }
}
