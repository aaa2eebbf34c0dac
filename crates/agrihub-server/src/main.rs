//! `agrihub`: the AgriHub region store and market-price ingestion service.
//!
//! # Usage
//!
//! ```text
//! agrihub --config config.toml serve
//! agrihub import
//! agrihub load regions.json
//! agrihub db status
//! ```

mod config;
mod db;
mod load;

use std::{path::PathBuf, sync::Arc};

use agrihub_api::AppState;
use agrihub_feed::{FeedClient, Ingestor, LogSink};
use agrihub_store_sqlite::SqliteStore;
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{config::AppConfig, db::DbCommand};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "agrihub", version, about = "Region reference data and market-price ingestion")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Serve the HTTP API.
  Serve,
  /// Run one market-price ingestion pass and print its report.
  Import,
  /// Bulk-load states, districts, subdistricts and cities from a JSON file.
  Load {
    #[arg(value_name = "FILE")]
    file: PathBuf,
  },
  /// Database management.
  Db {
    #[command(subcommand)]
    command: DbCommand,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

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
  let cfg = AppConfig::load(&cli.config)?;

  match cli.command {
    Command::Serve => serve(cfg).await,
    Command::Import => import(cfg).await,
    Command::Load { file } => {
      let regions = load::read_file(&file)?;
      let store = open_store(&cfg).await?;
      let report = load::load(&store, regions).await?;
      println!("{}", serde_json::to_string_pretty(&report)?);
      Ok(())
    }
    Command::Db { command } => db::run(command, &cfg.database_path).await,
  }
}

async fn open_store(cfg: &AppConfig) -> anyhow::Result<SqliteStore> {
  SqliteStore::open(&cfg.database_path)
    .await
    .with_context(|| format!("failed to open store at {}", cfg.database_path.display()))
}

fn ingestor(cfg: &AppConfig) -> anyhow::Result<Ingestor<FeedClient, LogSink>> {
  let client = FeedClient::new(cfg.feed()?).context("failed to build feed client")?;
  Ok(Ingestor::new(client, LogSink))
}

async fn serve(cfg: AppConfig) -> anyhow::Result<()> {
  let state = AppState {
    store:    Arc::new(open_store(&cfg).await?),
    ingestor: Arc::new(ingestor(&cfg)?),
  };
  let app = agrihub_api::api_router(state);

  let address = cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

async fn import(cfg: AppConfig) -> anyhow::Result<()> {
  let report = ingestor(&cfg)?
    .run()
    .await
    .context("market-price import failed")?;
  println!("{}", serde_json::to_string_pretty(&report)?);
  Ok(())
}
