//! Docket product server
//!
//! Serves `POST /api/products` backed by an in-memory database.
//!
//! Usage:
//!   docket-server --port 3000

use std::sync::Arc;
use anyhow::{Context, Result};
use clap::Parser;
use docket_pipeline::PipelineConfig;
use docket_query::{Database, MemoryDatabase};
use docket_server::{build_router, AppState};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "docket-server")]
#[command(about = "Docket product server")]
struct Args {
    /// HTTP port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Collection products are created in
    #[arg(long, default_value = "products")]
    collection: String,

    /// Collection the owner reference points into
    #[arg(long, default_value = "users")]
    owner_collection: String,

    /// Id of the owning document
    #[arg(long, default_value = "123")]
    owner_id: String,

    /// Reject every write with permission denied
    #[arg(long)]
    read_only: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let config = PipelineConfig {
        collection: args.collection,
        owner_collection: args.owner_collection,
        owner_id: args.owner_id,
    };
    info!(
        collection = %config.collection,
        owner = %config.owner(),
        read_only = args.read_only,
        "Docket server starting..."
    );

    let mut memory = MemoryDatabase::new();
    if args.read_only {
        memory = memory.read_only();
    }
    let db: Arc<dyn Database> = Arc::new(memory);
    let state = AppState::new(db, config).context("Failed to build product codecs")?;
    let app = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port))
        .await
        .with_context(|| format!("Failed to bind HTTP port {}", args.port))?;
    info!("HTTP endpoint listening on port {}", args.port);
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
