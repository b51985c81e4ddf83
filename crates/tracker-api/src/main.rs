//! tracker-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, and either serves the JSON API or runs one of the admin commands
//! (`seed`, `ingest`) against the same store.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use tracker_api::ServerConfig;
use tracker_ingest::{Upload, UploadConfig, seed::seed_lookups};
use tracker_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Talent-tracker server and admin tools")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default when no command is given).
  Serve,

  /// Seed the lookup dimensions from a reference workbook.
  Seed {
    /// XLSX workbook with one sheet per dimension.
    workbook: PathBuf,
  },

  /// Bulk-load an intake cohort from the joined extracts.
  Ingest {
    /// Intake roster (CSV or XLSX).
    intake: PathBuf,
    /// Application outcomes (CSV or XLSX).
    applications: PathBuf,
    /// Scheme the cohort is joining, e.g. FLS.
    #[arg(long)]
    scheme: String,
    /// Scheme start date (YYYY-MM-DD).
    #[arg(long)]
    start_date: NaiveDate,
    /// Anonymise personal fields and randomise characteristics.
    #[arg(long)]
    redact: bool,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TRACKER"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open the SQLite store.
  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.store_path)
    })?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(store, &server_cfg).await,
    Command::Seed { workbook } => {
      let summary = seed_lookups(&store, &workbook)
        .await
        .with_context(|| format!("failed to seed from {workbook:?}"))?;
      println!(
        "Seeded {} values across {} sheets",
        summary.values, summary.sheets
      );
      Ok(())
    }
    Command::Ingest { intake, applications, scheme, start_date, redact } => {
      let upload = Upload::new(&store, UploadConfig {
        scheme,
        scheme_start_date: start_date,
        redact,
        columns: server_cfg.columns.clone(),
      });
      let summary = upload
        .complete_upload(&intake, &applications)
        .await
        .context("upload failed; the batch was rolled back")?;
      println!(
        "Ingested {} candidates ({} organisations created)",
        summary.candidates, summary.organisations_created
      );
      Ok(())
    }
  }
}

async fn serve(store: SqliteStore, config: &ServerConfig) -> anyhow::Result<()> {
  let app = tracker_api::api_router(Arc::new(store));
  let address = format!("{}:{}", config.host, config.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
