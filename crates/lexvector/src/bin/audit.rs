//! Store auditing binary: format sniffing + contamination scan
//!
//! Run with: cargo run -p lexvector --bin lexvector-audit -- stores/*.json

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lexvector::validation::{sniff_file, StoreValidator, ValidationReport};

/// Inspect persisted vector stores for format and markup contamination
#[derive(Parser)]
#[command(name = "lexvector-audit", version, about)]
struct Args {
    /// Store artifacts to inspect
    #[arg(required = true)]
    stores: Vec<PathBuf>,

    /// Only report the sniffed format, skip content validation
    #[arg(long)]
    sniff_only: bool,
}

fn print_report(report: &ValidationReport) {
    println!("  chunks examined:          {}", report.total_chunks);
    println!(
        "  HTML-contaminated chunks: {}",
        report.html_contaminated_chunks
    );
    println!(
        "  CSS-contaminated chunks:  {}",
        report.css_contaminated_chunks
    );

    for findings in report.html.iter().chain(report.css.iter()) {
        println!(
            "    {:<20} {} chunks, {} matches",
            findings.pattern, findings.chunks_matched, findings.total_matches
        );
        if !findings.examples.is_empty() {
            println!("      examples: {:?}", findings.examples);
        }
    }

    if report.is_clean() {
        println!("  no contamination found");
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lexvector=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let validator = StoreValidator::new();
    let mut failures = 0usize;

    for path in &args.stores {
        println!("{}", path.display());

        let format = match sniff_file(path) {
            Ok(format) => format,
            Err(e) => {
                println!("  error: {}", e);
                failures += 1;
                continue;
            }
        };
        println!("  format: {}", format);

        if args.sniff_only {
            continue;
        }

        if !format.is_validatable() {
            println!("  skipping content validation (not a decodable store)");
            continue;
        }

        match validator.validate(path) {
            Ok(report) => print_report(&report),
            Err(e) => {
                println!("  error: {}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} store(s) could not be audited", failures);
    }
    Ok(())
}
