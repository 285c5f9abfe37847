//! abim-client — CSV ingest driver entry point.
//!
//! Reads a CSV of audited bodies (9 comma-separated fields per line, no
//! header row), then submits one row per request to the import service
//! with a fixed stagger, logging each response as it arrives.

use std::path::PathBuf;
use std::time::Duration;

use abim_client::{ingest, submit};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for abim-client
#[derive(Parser, Debug)]
#[command(name = "abim-client")]
#[command(about = "CSV ingest driver for the Audited Body Importer")]
#[command(version)]
struct Args {
    /// CSV file to import (no header row)
    file: PathBuf,

    /// Import service base URL
    #[arg(long, default_value = "http://127.0.0.1:5731", env = "ABIM_SERVER_URL")]
    server: String,

    /// Anti-forgery token the server expects; empty when the server has
    /// token checking disabled
    #[arg(long, default_value = "", env = "ABIM_IMPORT_TOKEN")]
    token: String,

    /// Delay between row submission starts, in milliseconds
    #[arg(long, default_value = "1000", env = "ABIM_ROW_DELAY_MS")]
    delay_ms: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "abim_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Fail closed before touching the file contents
    if let Err(e) = ingest::check_file(&args.file) {
        error!("{}", e);
        std::process::exit(2);
    }

    let (report, rows) = match ingest::read_and_parse(&args.file).await {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    println!("{}", report.name);
    println!(" - FileSize: {} bytes", report.size_bytes);
    println!(
        " - LastModified: {}",
        report
            .modified
            .map(|m| m.to_rfc3339())
            .unwrap_or_else(|| "n/a".to_string())
    );

    info!("Submitting {} rows to {}", rows.len(), args.server);

    let config = submit::SubmitConfig {
        server_url: args.server,
        token: args.token,
        delay: Duration::from_millis(args.delay_ms),
    };
    let summary = submit::submit_all(&config, rows).await;

    info!(
        "Import finished: {} of {} rows completed ({} failed)",
        summary.completed, summary.total, summary.failed
    );
}
