//! CLI Search Command
//!
//! Loads the catalog CSV, indexes it with the local hashing embedder, and
//! prints the nearest entries for one query.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use greenlens_config::RetrievalConfig;
use greenlens_logging::{EventLogger, PipelineEvent};
use greenlens_memory::Catalog;

#[derive(Args)]
pub struct SearchArgs {
    /// Free-text query
    #[arg(short, long)]
    pub query: String,
    /// Number of matches (capped at the catalog size)
    #[arg(short, long)]
    pub k: Option<usize>,
    /// Catalog CSV with a `text` column; overrides the config
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

pub async fn run(args: SearchArgs, config: &RetrievalConfig, request_id: &str) -> Result<()> {
    let path = args.catalog.unwrap_or_else(|| config.catalog_path_or_default());
    let catalog = Catalog::from_csv_path(&path)?;
    info!(request_id, path = %path.display(), entries = catalog.len(), "Loaded catalog");

    let search = config.search(catalog).await?;

    let response = search.search(&args.query, args.k).await?;

    EventLogger::log_event(
        request_id,
        PipelineEvent::Searched {
            query: response.query.clone(),
            k: search.effective_k(args.k),
            hits: response.matches.len(),
        },
    );
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
