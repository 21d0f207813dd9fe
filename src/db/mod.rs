//! Vector index storage.
//!
//! - `local` (default) - One JSON file per collection under a data directory
//! - `in-memory` - Non-persistent, for tests

#![allow(missing_docs)]

// Vector store abstraction layer
pub mod vectorstore;

// Provider implementations
pub mod local;

// Re-exports
pub use local::LocalVectorStore;
pub use vectorstore::{
    CollectionInfo, EntryMetadata, InMemoryVectorStore, IndexedEntry, SearchResult, VectorStore,
    VectorStoreProvider, content_id, cosine_similarity,
};
