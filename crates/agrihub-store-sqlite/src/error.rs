//! Error type for `agrihub-store-sqlite`.

use agrihub_core::error::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain rejection (duplicate name, missing parent, …).
  #[error(transparent)]
  Region(#[from] agrihub_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown state type: {0:?}")]
  UnknownStateType(String),
}

impl DomainError for Error {
  fn domain(&self) -> Option<&agrihub_core::Error> {
    match self {
      Error::Region(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
