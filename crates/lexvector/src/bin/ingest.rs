//! Document vectorization binary
//!
//! Run with: cargo run -p lexvector --bin lexvector-ingest -- ley.txt -o ley.json

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lexvector::config::VectorizerConfig;
use lexvector::ingestion::{read_source, source_label_for};
use lexvector::pipeline::IngestPipeline;

/// Chunk a document, embed every chunk, and persist the vector store
#[derive(Parser)]
#[command(name = "lexvector-ingest", version, about)]
struct Args {
    /// Input text file (already extracted from the source document)
    input: PathBuf,

    /// Output path for the vector store artifact
    #[arg(short, long)]
    output: PathBuf,

    /// TOML configuration file (defaults + GEMINI_API_KEY when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Label identifying the source document (defaults to the input stem)
    #[arg(long)]
    source_label: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lexvector=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => VectorizerConfig::from_file(path)?,
        None => VectorizerConfig::from_env()?,
    };

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.embedding.model);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - Chunk overlap: {}", config.chunking.chunk_overlap);

    let label = args
        .source_label
        .clone()
        .unwrap_or_else(|| source_label_for(&args.input));

    tracing::info!("Extracting text from {}...", args.input.display());
    let text = read_source(&args.input)?;
    tracing::info!("Extracted {} characters", text.len());

    let pipeline = IngestPipeline::new(&config)?;
    let store = pipeline.run_to_file(&text, &label, &args.output).await?;

    println!("Store written to {}", args.output.display());
    println!("  chunks persisted: {}", store.metadata.total_chunks);
    if store.metadata.dropped_chunks > 0 {
        println!(
            "  chunks dropped:   {} (embedding failures)",
            store.metadata.dropped_chunks
        );
    }

    Ok(())
}
