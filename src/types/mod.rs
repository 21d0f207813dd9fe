use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============= Document Types =============

/// A source document after text extraction.
///
/// Lives only for the duration of one indexing run; it is dropped once the
/// text has been chunked.
#[derive(Debug, Clone)]
pub struct Document {
    pub source: PathBuf,
    /// Size of the raw file in bytes
    pub byte_len: usize,
    pub text: String,
}

impl Document {
    /// Number of characters (not bytes) in the extracted text
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A contiguous, size-bounded slice of a document's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of the chunk within its document, starting at 0
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

// ============= Query Types =============

/// A single retrieval hit backing an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub text: String,
    pub relevance_score: f32,
}

/// Generated answer plus the context it was conditioned on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<Source>,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Document read error: {0}")]
    DocumentRead(String),

    #[error("Chunking error: {0}")]
    Chunking(String),

    #[error("Index write error: {0}")]
    IndexWrite(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Generation service error: {0}")]
    GenerationService(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
