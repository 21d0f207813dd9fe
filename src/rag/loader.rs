//! Document loading and text extraction.
//!
//! PDF parsing is delegated to the `pdf-extract` crate. Extraction is CPU-bound
//! and the crate may panic on malformed input, so it runs on the blocking pool
//! and a panic surfaces as [`AppError::DocumentRead`].

use crate::types::{AppError, Document, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Reads a source document and extracts its plain text.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Document>;
}

/// Extracts text from PDF files.
#[derive(Debug, Default, Clone)]
pub struct PdfLoader;

#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn load(&self, path: &Path) -> Result<Document> {
        let bytes = read_bytes(path).await?;
        let byte_len = bytes.len();

        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| {
                AppError::DocumentRead(format!("PDF extraction aborted for {:?}: {}", path, e))
            })?
            .map_err(|e| {
                AppError::DocumentRead(format!("Failed to extract PDF text from {:?}: {}", path, e))
            })?;

        debug!(?path, byte_len, chars = text.chars().count(), "Extracted PDF text");

        Ok(Document {
            source: path.to_path_buf(),
            byte_len,
            text,
        })
    }
}

/// Reads UTF-8 text files (`.txt`, `.md`) as-is.
#[derive(Debug, Default, Clone)]
pub struct PlainTextLoader;

#[async_trait]
impl DocumentLoader for PlainTextLoader {
    async fn load(&self, path: &Path) -> Result<Document> {
        let bytes = read_bytes(path).await?;
        let byte_len = bytes.len();
        let text = String::from_utf8(bytes).map_err(|e| {
            AppError::DocumentRead(format!("{:?} is not valid UTF-8: {}", path, e))
        })?;

        Ok(Document {
            source: path.to_path_buf(),
            byte_len,
            text,
        })
    }
}

/// Pick a loader from the file extension. Anything that is not plain text is
/// treated as PDF.
pub fn loader_for_path(path: &Path) -> Box<dyn DocumentLoader> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("txt") | Some("md") | Some("markdown") => Box::new(PlainTextLoader),
        _ => Box::new(PdfLoader),
    }
}

/// Dispatches to [`loader_for_path`] on every call.
#[derive(Debug, Default, Clone)]
pub struct AutoLoader;

#[async_trait]
impl DocumentLoader for AutoLoader {
    async fn load(&self, path: &Path) -> Result<Document> {
        loader_for_path(path).load(path).await
    }
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        AppError::DocumentRead(format!("Failed to read {:?}: {}", path, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_document_read_error() {
        let result = PdfLoader.load(Path::new("definitely/not/here.pdf")).await;
        assert!(matches!(result, Err(AppError::DocumentRead(_))));
    }

    #[tokio::test]
    async fn test_garbage_bytes_are_document_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"This is not a PDF").unwrap();

        let result = PdfLoader.load(&path).await;
        assert!(matches!(result, Err(AppError::DocumentRead(_))));
    }

    #[tokio::test]
    async fn test_plain_text_loader_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Thor wields Mjolnir.").unwrap();

        let doc = PlainTextLoader.load(&path).await.unwrap();
        assert_eq!(doc.text, "Thor wields Mjolnir.");
        assert_eq!(doc.byte_len, 20);
        assert_eq!(doc.source, path);
    }

    #[tokio::test]
    async fn test_auto_loader_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("NOTES.MD");
        std::fs::write(&path, "# Heading").unwrap();

        let doc = AutoLoader.load(&path).await.unwrap();
        assert_eq!(doc.text, "# Heading");
    }
}
