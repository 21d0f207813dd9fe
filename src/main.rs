use anyhow::{Context, Result};
use pdfrag::cli::output::Output;
use pdfrag::cli::{Cli, Commands};
use pdfrag::flows::FlowRegistry;
use pdfrag::pipeline::RagContext;
use pdfrag::utils::toml_config::{LogFormat, ProviderKind, RagConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Err(err) = run(cli, &output).await {
        output.error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let config = RagConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    init_tracing(&config, cli.verbose);

    match cli.command {
        Commands::Index { path, rebuild } => {
            let path = document_path(path, &config);
            let ctx = RagContext::from_config(config).await?;
            let pipeline = ctx.indexing();

            output.info(&format!("Indexing {}", path.display()));
            let report = if rebuild {
                pipeline.rebuild(&path).await?
            } else {
                pipeline.index(&path).await?
            };

            if report.chunks == 0 {
                output.warning("Document contained no text; nothing was indexed");
            }
            output.success(&format!(
                "{} chunks from {} characters; '{}' now holds {} entries",
                report.chunks,
                report.characters,
                pipeline.collection(),
                report.collection_size
            ));
        }

        Commands::Ask {
            question,
            show_sources,
        } => {
            let ctx = RagContext::from_config(config).await?;
            let answer = ctx.query().answer(&question).await?;

            output.answer(&answer.text);
            if show_sources {
                if answer.sources.is_empty() {
                    output.info("No indexed context was found. Run `pdfrag index` first.");
                } else {
                    output.section("Sources");
                    for (rank, source) in answer.sources.iter().enumerate() {
                        output.source(rank, source.relevance_score, &source.text);
                    }
                }
            }
        }

        Commands::Chunks { path, limit } => {
            let path = document_path(path, &config);
            let ctx = RagContext::from_config(config).await?;
            let chunks = ctx.indexing().preview(&path).await?;

            output.section(&format!("{} chunks from {}", chunks.len(), path.display()));
            for chunk in chunks.iter().take(limit.unwrap_or(usize::MAX)) {
                output.chunk(chunk.index, chunk.char_len(), &chunk.text);
            }
        }

        Commands::Stats => {
            let ctx = RagContext::from_config(config).await?;
            let collections = ctx.store.list_collections().await?;

            if collections.is_empty() {
                output.info("No collections yet");
            } else {
                output.section("Collections");
                output.collections(&collections);
            }
            output.info(&format!(
                "Data directory: {}",
                ctx.config.index.data_dir.display()
            ));
        }

        Commands::Flow { name, input } => {
            let ctx = RagContext::from_config(config).await?;
            let registry = FlowRegistry::with_default_flows(&ctx);
            if !registry.has_flow(&name) {
                output.warning(&format!(
                    "Unknown flow '{}'. Available flows: {}",
                    name,
                    registry.flow_names().join(", ")
                ));
            }
            let result = registry.run(&name, &input).await?;
            output.answer(&result);
        }

        Commands::Config { validate } => {
            if validate {
                config.validate()?;
                output.success(&format!("{} is valid", cli.config.display()));
            } else {
                output.answer(&config.to_toml()?);
                if config.provider.kind == ProviderKind::Gemini && !config.has_api_key() {
                    output.warning(&format!(
                        "{} is not set; indexing and questions will fail",
                        config.provider.api_key_env
                    ));
                }
            }
        }
    }

    Ok(())
}

fn document_path(path: Option<PathBuf>, config: &RagConfig) -> PathBuf {
    path.unwrap_or_else(|| config.document.path.clone())
}

/// Logs go to stderr; `RUST_LOG` overrides the configured level.
fn init_tracing(config: &RagConfig, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.with_target(false).init(),
    }
}
