//! Graph Loader
//!
//! Reads the bank-data CSV and rebuilds the User/Phone/Email graph from
//! scratch: the existing graph is wiped, then all rows go in as one batch.

use anyhow::Result;
use clap::Parser;
use fraud_detection_app::{
    config::{AppConfig, DEFAULT_CONFIG_PATH},
    graph::{load_csv, BoltStore, GraphCounts, GraphLoader, MemoryGraph},
    telemetry, AppError,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "load-graph", version, about = "Load identity rows into a graph database")]
struct Args {
    /// Configuration file (missing file means built-in defaults)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Source CSV with Name, Phone Number and Email columns
    #[arg(long)]
    data: Option<PathBuf>,

    /// Maximum number of rows to load
    #[arg(long)]
    limit: Option<usize>,

    /// Bolt URI of the graph database
    #[arg(long)]
    uri: Option<String>,

    /// Load into an in-memory graph and report counts without connecting
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match AppConfig::load_from_path(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(data) = args.data.clone() {
        config.graph.data_path = data;
    }
    if let Some(limit) = args.limit {
        config.graph.limit = limit;
    }
    if let Some(uri) = args.uri.clone() {
        config.graph.uri = uri;
    }

    if let Err(e) = telemetry::init_logging(&config.logging) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(&config, args.dry_run).await {
        Ok(counts) => {
            info!(
                nodes = counts.nodes(),
                relationships = counts.relationships(),
                "Process finished. The graph database is now populated."
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            if let Some(AppError::DataFileMissing(_)) = e.downcast_ref::<AppError>() {
                error!("Please ensure the synthetic data has been generated (gen-bank-data).");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &AppConfig, dry_run: bool) -> Result<GraphCounts> {
    let records = load_csv(&config.graph.data_path, config.graph.limit)?;
    let mode = config.graph.relationship_mode;

    if dry_run {
        info!("Dry run: loading into an in-memory graph");
        return GraphLoader::new(MemoryGraph::new(), mode)
            .replace_all(&records)
            .await;
    }

    let store = BoltStore::connect(&config.graph).await?;
    GraphLoader::new(store, mode).replace_all(&records).await
}
