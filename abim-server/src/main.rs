//! abim-server — Audited Body Import service entry point.
//!
//! Receives one CSV row per request from the ingest client and upserts the
//! corresponding auditee, audit firm, engagement entry, and body type term
//! into the SQLite record store.

use std::path::PathBuf;

use abim_common::api::token::load_import_token;
use abim_common::config::{database_path, ensure_data_dir, resolve_data_dir};
use abim_common::db::init_database;
use abim_server::{build_router, AppState};
use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for abim-server
#[derive(Parser, Debug)]
#[command(name = "abim-server")]
#[command(about = "Audited Body Import service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5731", env = "ABIM_SERVER_PORT")]
    port: u16,

    /// Data folder holding the database (falls back to ABIM_DATA_DIR,
    /// then the config file, then the platform default)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "abim_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(
        "Starting abim-server (Audited Body Importer) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let data_dir = resolve_data_dir(args.data_dir.as_deref());
    ensure_data_dir(&data_dir)?;

    let db_path = database_path(&data_dir);
    info!("Database: {}", db_path.display());

    let pool = init_database(&db_path).await?;
    info!("Database connection established");

    let import_token = load_import_token(&pool).await?;
    if import_token.is_empty() {
        info!("Import token checking disabled (empty token in settings)");
    } else {
        info!("Import token loaded; clients must send it with every row");
    }

    let state = AppState::new(pool, import_token);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("abim-server listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
