//! Application configuration.
//!
//! Read from an optional TOML file, then overridden by `AGRIHUB_*`
//! environment variables. Nested keys use a double underscore, so
//! `AGRIHUB_FEED__API_KEY` sets `feed.api_key`.

use std::path::{Path, PathBuf};

use agrihub_feed::FeedConfig;
use anyhow::Context as _;
use serde::Deserialize;

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8000 }

fn default_database_path() -> PathBuf { PathBuf::from("agridatahub.db") }

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  #[serde(default = "default_database_path")]
  pub database_path: PathBuf,
  /// Only `serve` and `import` need the feed.
  pub feed:          Option<FeedConfig>,
}

impl AppConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("AGRIHUB")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read configuration")?;

    settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")
  }

  pub fn feed(&self) -> anyhow::Result<FeedConfig> {
    self
      .feed
      .clone()
      .context("no [feed] configuration; set feed.endpoint and feed.api_key")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
