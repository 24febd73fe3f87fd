use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use catalog_resizer::bulk::{BulkGenerator, UploadEvent};
use catalog_resizer::config::Config;
use catalog_resizer::materializer::Materializer;
use catalog_resizer::s3::S3BlobStore;
use catalog_resizer::server::{serve, AppState};
use catalog_resizer::store::{BlobStore, MemoryBlobStore};

/// Catalog resizer - on-demand and bulk image variant generation
#[derive(Parser, Debug)]
#[command(name = "catalog-resizer")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (environment variables are used when absent)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use an in-process store instead of S3
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP front
    Serve,
    /// Materialize a single key and print the redirect location
    Materialize {
        #[arg(long)]
        key: String,
        #[arg(long)]
        keep_alpha: bool,
    },
    /// Process an upload event read from a JSON file
    Upload {
        #[arg(long)]
        event: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::from_env().context("Failed to load configuration from environment")?,
    };
    config.validate().context("Invalid configuration")?;

    catalog_resizer::logging::init_subscriber(config.debug)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging subsystem: {}", e))?;

    tracing::info!(
        bucket = %config.bucket,
        base_url = %config.base_url,
        bulk_sizes = config.bulk.sizes.len(),
        bulk_format = %config.bulk.format,
        memory_store = args.memory,
        "Configuration loaded successfully"
    );

    let config = Arc::new(config);
    let store: Arc<dyn BlobStore> = if args.memory {
        Arc::new(MemoryBlobStore::new())
    } else {
        Arc::new(S3BlobStore::from_config(&config).await)
    };

    match args.command {
        Command::Serve => {
            let listen_addr = config.server.listen_addr();
            let listener = tokio::net::TcpListener::bind(&listen_addr)
                .await
                .with_context(|| format!("Failed to bind {}", listen_addr))?;
            tracing::info!(address = %listen_addr, "Starting catalog resizer");
            serve(listener, Arc::new(AppState::new(store, config))).await?;
        }
        Command::Materialize { key, keep_alpha } => {
            let redirect = Materializer::new(store, config)
                .materialize(&key, keep_alpha)
                .await?;
            println!("{} {}", redirect.status, redirect.location);
        }
        Command::Upload { event } => {
            let json = std::fs::read(&event)
                .with_context(|| format!("Failed to read event {}", event.display()))?;
            let event = UploadEvent::from_slice(&json)?;
            let report = BulkGenerator::new(store, config).on_upload(&event).await?;
            println!("{} records, {} variants", report.records, report.variants);
        }
    }

    Ok(())
}
