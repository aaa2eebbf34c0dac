//! Error types for `agrihub-core`.

use thiserror::Error;

use crate::region::RegionKind;

/// Domain-level rejections raised by a [`RegionStore`](crate::store::RegionStore).
#[derive(Debug, Error)]
pub enum Error {
  #[error("a state named {0:?} already exists")]
  DuplicateName(String),

  #[error("{kind} not found: {id}")]
  NotFound { kind: RegionKind, id: i64 },

  #[error("subdistrict {subdistrict} does not belong to district {district}")]
  SubdistrictOutsideDistrict { subdistrict: i64, district: i64 },

  #[error("city {city} does not belong to state {state}")]
  CapitalOutsideState { city: i64, state: i64 },

  #[error("invalid {axis}: {value}")]
  InvalidCoordinate { axis: &'static str, value: f64 },
}

impl Error {
  pub fn not_found(kind: RegionKind, id: impl Into<i64>) -> Self {
    Self::NotFound { kind, id: id.into() }
  }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound { .. }) }
}

/// Implemented by backend error types so callers generic over a store can
/// recover the domain-level [`Error`] without knowing the backend.
pub trait DomainError {
  fn domain(&self) -> Option<&Error>;
}

impl DomainError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
