//! SwiftBrowse blocklist checker
//!
//! Loads the configured hostlists once and classifies URLs the same way the
//! browser's request hook does.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::runtime::Handle;

use swift_core::{Config, FilterService, LineFormat};

/// Check URLs against SwiftBrowse blocklists
#[derive(Parser, Debug)]
#[command(name = "swift-filter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON)
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Hostlist URL, replaces the configured sources (repeatable)
    #[arg(short = 's', long = "source", value_name = "URL")]
    sources: Vec<String>,

    /// Line format of the lists: plain or hosts
    #[arg(long, value_name = "FORMAT")]
    format: Option<LineFormat>,

    /// Print the load report as JSON
    #[arg(long)]
    report: bool,

    /// URLs to classify
    urls: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    swift_core::init_logging();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if !args.sources.is_empty() {
        config.sources = args.sources.clone();
    }
    if let Some(format) = args.format {
        config.line_format = format;
    }

    let sources = config.blocklist_source()?;
    let service = FilterService::new(config, Handle::current())?;
    let report = service.load_now(&sources).await;

    tracing::debug!(
        generation = report.generation,
        patterns = report.unique_patterns,
        "Blocklists ready"
    );

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    for url in &args.urls {
        match service.classify(url).matched {
            Some(pattern) => println!("BLOCK {} ({})", url, pattern),
            None => println!("ALLOW {}", url),
        }
    }

    Ok(())
}
