//! Named operations exposed to a host orchestration layer.
//!
//! - `indexMenu` - indexes the configured document; its input is ignored
//! - `MainMenu` - answers the input question from the index
//!
//! ```ignore
//! let registry = FlowRegistry::with_default_flows(&ctx);
//! registry.run("indexMenu", "").await?;
//! let answer = registry.run("MainMenu", "Who is Thanos?").await?;
//! ```

use crate::pipeline::{IndexingPipeline, QueryPipeline, RagContext};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

pub const INDEX_FLOW: &str = "indexMenu";
pub const ASK_FLOW: &str = "MainMenu";

/// A string-in, string-out operation invocable by name.
#[async_trait]
pub trait Flow: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    async fn run(&self, input: &str) -> Result<String>;
}

/// Indexes a fixed document.
pub struct IndexFlow {
    pipeline: IndexingPipeline,
    document: PathBuf,
}

impl IndexFlow {
    pub fn new(pipeline: IndexingPipeline, document: impl Into<PathBuf>) -> Self {
        Self {
            pipeline,
            document: document.into(),
        }
    }
}

#[async_trait]
impl Flow for IndexFlow {
    fn name(&self) -> &str {
        INDEX_FLOW
    }

    fn description(&self) -> &str {
        "Index the configured document into the vector store"
    }

    async fn run(&self, _input: &str) -> Result<String> {
        let report = self.pipeline.index(&self.document).await?;
        Ok(format!(
            "Indexed {} chunks from {} into '{}' ({} entries)",
            report.chunks,
            report.source.display(),
            self.pipeline.collection(),
            report.collection_size
        ))
    }
}

/// Answers a question from the index.
pub struct AskFlow {
    pipeline: QueryPipeline,
}

impl AskFlow {
    pub fn new(pipeline: QueryPipeline) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl Flow for AskFlow {
    fn name(&self) -> &str {
        ASK_FLOW
    }

    fn description(&self) -> &str {
        "Answer a question using the indexed document as context"
    }

    async fn run(&self, input: &str) -> Result<String> {
        Ok(self.pipeline.answer(input).await?.text)
    }
}

pub struct FlowRegistry {
    flows: HashMap<String, Arc<dyn Flow>>,
}

impl Default for FlowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self {
            flows: HashMap::new(),
        }
    }

    /// Registry holding `indexMenu` and `MainMenu` over `ctx`.
    pub fn with_default_flows(ctx: &RagContext) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(IndexFlow::new(
            ctx.indexing(),
            ctx.config.document.path.clone(),
        )));
        registry.register(Arc::new(AskFlow::new(ctx.query())));
        registry
    }

    pub fn register(&mut self, flow: Arc<dyn Flow>) {
        self.flows.insert(flow.name().to_string(), flow);
    }

    pub async fn run(&self, name: &str, input: &str) -> Result<String> {
        match self.flows.get(name) {
            Some(flow) => flow.run(input).await,
            None => Err(AppError::NotFound(format!("Flow not found: {}", name))),
        }
    }

    /// Registered flow names, sorted
    pub fn flow_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.flows.keys().cloned().collect();
        names.sort();
        names
    }

    /// `(name, description)` pairs, sorted by name
    pub fn describe(&self) -> Vec<(String, String)> {
        let mut flows: Vec<(String, String)> = self
            .flows
            .values()
            .map(|f| (f.name().to_string(), f.description().to_string()))
            .collect();
        flows.sort();
        flows
    }

    pub fn has_flow(&self, name: &str) -> bool {
        self.flows.contains_key(name)
    }
}
