//! Overlapping, size-bounded text chunking.
//!
//! Text is first cut into segments (sentences or paragraphs) and the segments
//! are packed greedily into chunks. Lengths are measured in characters.

use crate::types::{AppError, Chunk, Result};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Boundary used to cut text into segments before packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Splitter {
    /// Unicode sentence boundaries (UAX #29)
    #[default]
    Sentence,
    /// Blocks separated by one or more blank lines
    Paragraph,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    #[serde(default = "default_max_length")]
    pub max_length: usize,

    #[serde(default = "default_overlap")]
    pub overlap: usize,

    #[serde(default)]
    pub splitter: Splitter,
}

fn default_min_length() -> usize {
    1000
}

fn default_max_length() -> usize {
    2000
}

fn default_overlap() -> usize {
    100
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_length: default_max_length(),
            overlap: default_overlap(),
            splitter: Splitter::default(),
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_length == 0 {
            return Err(AppError::Chunking(
                "max_length must be greater than zero".to_string(),
            ));
        }
        if self.min_length > self.max_length {
            return Err(AppError::Chunking(format!(
                "min_length ({}) exceeds max_length ({})",
                self.min_length, self.max_length
            )));
        }
        // Every non-final chunk holds at least min_length characters, so the
        // carried overlap must leave room for new text.
        if self.overlap > 0 && self.overlap >= self.min_length {
            return Err(AppError::Chunking(format!(
                "overlap ({}) must be smaller than min_length ({})",
                self.overlap, self.min_length
            )));
        }
        Ok(())
    }
}

/// Splits raw document text into chunks ready for embedding.
pub trait Chunker: Send + Sync {
    fn chunk(&self, text: &str) -> Vec<Chunk>;
}

pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    fn segments<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self.config.splitter {
            Splitter::Sentence => text.split_sentence_bounds().collect(),
            Splitter::Paragraph => split_paragraphs(text),
        }
    }
}

impl Chunker for TextChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        let ChunkingConfig {
            min_length,
            max_length,
            overlap,
            ..
        } = self.config;
        let mut packer = Packer::new(overlap);

        for segment in self.segments(text) {
            let mut rest = segment;
            while !rest.is_empty() {
                let rest_len = rest.chars().count();
                if packer.len + rest_len <= max_length {
                    packer.push(rest, rest_len);
                    break;
                }
                if packer.len >= min_length && packer.fresh > 0 {
                    packer.emit();
                    continue;
                }
                // The chunk is still short of min_length: cut the segment so
                // the chunk lands exactly on max_length.
                let take = max_length - packer.len;
                let (head, tail) = split_at_chars(rest, take);
                packer.push(head, take);
                packer.emit();
                rest = tail;
            }
        }

        packer.finish()
    }
}

struct Packer {
    chunks: Vec<Chunk>,
    current: String,
    /// Characters in `current`, including the carried overlap
    len: usize,
    /// Characters in `current` beyond the carried overlap
    fresh: usize,
    overlap: usize,
}

impl Packer {
    fn new(overlap: usize) -> Self {
        Self {
            chunks: Vec::new(),
            current: String::new(),
            len: 0,
            fresh: 0,
            overlap,
        }
    }

    fn push(&mut self, text: &str, char_len: usize) {
        self.current.push_str(text);
        self.len += char_len;
        self.fresh += char_len;
    }

    fn emit(&mut self) {
        let text = std::mem::take(&mut self.current);
        let carried = tail_chars(&text, self.overlap);
        self.len = carried.chars().count();
        self.current = carried.to_string();
        self.fresh = 0;
        self.chunks.push(Chunk {
            index: self.chunks.len(),
            text,
        });
    }

    fn finish(mut self) -> Vec<Chunk> {
        if self.fresh > 0 {
            self.chunks.push(Chunk {
                index: self.chunks.len(),
                text: self.current,
            });
        }
        self.chunks
    }
}

/// Split after every run of two or more newlines, keeping the separator with
/// the preceding paragraph.
fn split_paragraphs(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find("\n\n") {
        let mut end = start + pos + 2;
        while end < bytes.len() && matches!(bytes[end], b'\n' | b'\r') {
            end += 1;
        }
        segments.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        segments.push(&text[start..]);
    }
    segments
}

fn split_at_chars(s: &str, n: usize) -> (&str, &str) {
    let idx = s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len());
    s.split_at(idx)
}

fn tail_chars(s: &str, n: usize) -> &str {
    let skip = s.chars().count().saturating_sub(n);
    split_at_chars(s, skip).1
}
