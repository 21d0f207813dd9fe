//! CLI module for pdfrag
//!
//! Provides command-line interface parsing for the pdfrag binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pdfrag - ask questions about a PDF
///
/// Indexes a document into a local vector store and answers questions with
/// the most relevant passages as context.
#[derive(Parser, Debug)]
#[command(
    name = "pdfrag",
    version,
    about = "Ask questions about a PDF with retrieval augmented generation",
    after_help = "EXAMPLES:\n    \
                  pdfrag index                      # Index the configured document (Avengers.pdf)\n    \
                  pdfrag index notes.pdf --rebuild  # Replace the index with another document\n    \
                  pdfrag ask \"Who is Thanos?\"        # Answer from the index\n    \
                  pdfrag flow MainMenu \"Who is Thor?\" # Invoke a flow by name"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "pdfrag.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract, chunk, embed and store a document
    Index {
        /// Document to index (defaults to `document.path` from the config)
        path: Option<PathBuf>,

        /// Clear the collection before indexing
        #[arg(long)]
        rebuild: bool,
    },

    /// Answer a question using the indexed document
    Ask {
        /// The question to answer
        question: String,

        /// Also print the retrieved passages
        #[arg(short, long)]
        show_sources: bool,
    },

    /// Show how a document would be chunked, without embedding it
    Chunks {
        /// Document to chunk (defaults to `document.path` from the config)
        path: Option<PathBuf>,

        /// Print at most this many chunks
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show the collections in the local vector store
    Stats,

    /// Invoke a named flow (`indexMenu` or `MainMenu`)
    Flow {
        /// Flow name
        name: String,

        /// Flow input
        #[arg(default_value = "")]
        input: String,
    },

    /// Show the effective configuration
    Config {
        /// Validate the configuration and exit
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
