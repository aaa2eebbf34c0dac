//! Error types for `agrihub-feed`.

use agrihub_core::price::RowError;
use thiserror::Error;

/// The feed could not be fetched. Fatal for the ingestion run that hit it.
#[derive(Debug, Error)]
pub enum TransportError {
  #[error("feed request failed: {0}")]
  Request(#[source] reqwest::Error),

  #[error("feed responded with HTTP {0}")]
  Status(reqwest::StatusCode),

  #[error("failed to read feed body: {0}")]
  Body(#[source] reqwest::Error),
}

/// The CSV decoder rejected the header or a row.
#[derive(Debug, Error)]
#[error("csv error: {0}")]
pub struct ParseError(#[source] pub csv::Error);

impl From<csv::Error> for ParseError {
  fn from(e: csv::Error) -> Self { Self(e) }
}

/// A single row could not be turned into a stored price. Absorbed by the
/// pipeline; never aborts a run.
#[derive(Debug, Error)]
pub enum RowProcessingError {
  #[error(transparent)]
  Decode(#[from] ParseError),

  #[error(transparent)]
  Invalid(#[from] RowError),

  #[error("sink rejected row: {0}")]
  Rejected(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Run-level failure of an ingestion pass.
#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Transport(#[from] TransportError),

  #[error("feed header could not be parsed: {0}")]
  Parse(#[from] ParseError),

  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
