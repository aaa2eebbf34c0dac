//! `agrihub db …`: schema management for the SQLite file.

use std::{
  io::{self, BufRead as _, Write as _},
  path::Path,
};

use agrihub_store_sqlite::SqliteStore;
use anyhow::{Context as _, bail};
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum DbCommand {
  /// Create every table (no-op for tables that exist).
  Create {
    /// Drop existing tables first.
    #[arg(long)]
    drop: bool,
  },
  /// Drop and recreate every table, deleting all data.
  Reset {
    /// Do not ask for confirmation.
    #[arg(short, long)]
    yes: bool,
  },
  /// Show file size, schema version and per-table row counts.
  Status,
  /// Execute a SQL script file in one transaction.
  Sql {
    #[arg(value_name = "SCRIPT")]
    script: std::path::PathBuf,
  },
}

pub async fn run(command: DbCommand, path: &Path) -> anyhow::Result<()> {
  match command {
    DbCommand::Create { drop } => {
      let store = open(path).await?;
      if drop {
        store.reset().await.context("failed to drop tables")?;
      }
      println!("tables created in {}", path.display());
    }
    DbCommand::Reset { yes } => {
      if !yes && !confirm("This deletes all region data. Continue? (y/N): ")? {
        println!("cancelled");
        return Ok(());
      }
      open(path).await?.reset().await.context("failed to reset database")?;
      println!("database reset");
    }
    DbCommand::Status => {
      if !path.exists() {
        bail!("database file does not exist: {}", path.display());
      }
      let status = open(path).await?.status().await.context("failed to read status")?;
      let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or_default();
      println!("database:       {}", path.display());
      println!("size:           {size} bytes");
      println!("schema version: {}", status.schema_version);
      for table in status.tables {
        println!("  {:<16} {:>8} rows", table.name, table.rows);
      }
    }
    DbCommand::Sql { script } => {
      if !script.exists() {
        bail!("script file not found: {}", script.display());
      }
      let sql = std::fs::read_to_string(&script)
        .with_context(|| format!("reading {}", script.display()))?;
      open(path)
        .await?
        .execute_script(sql)
        .await
        .with_context(|| format!("executing {}", script.display()))?;
      println!("executed {}", script.display());
    }
  }
  Ok(())
}

async fn open(path: &Path) -> anyhow::Result<SqliteStore> {
  SqliteStore::open(path)
    .await
    .with_context(|| format!("failed to open store at {}", path.display()))
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
  print!("{prompt}");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim().eq_ignore_ascii_case("y"))
}
