//! JSON HTTP API for AgriHub.
//!
//! Exposes an axum [`Router`] backed by any [`RegionStore`] for region reads,
//! plus a trigger that runs one market-price ingestion pass.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", agrihub_api::api_router(state))
//! ```

pub mod error;
pub mod prices;
pub mod regions;

use std::sync::Arc;

use agrihub_core::store::RegionStore;
use agrihub_feed::{FeedSource, Ingestor, PriceSink};
use axum::{
  Router,
  routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared handles threaded into the handlers.
pub struct AppState<S, F, K> {
  pub store:    Arc<S>,
  pub ingestor: Arc<Ingestor<F, K>>,
}

impl<S, F, K> Clone for AppState<S, F, K> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), ingestor: self.ingestor.clone() }
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, F, K>(state: AppState<S, F, K>) -> Router<()>
where
  S: RegionStore + 'static,
  F: FeedSource + 'static,
  K: PriceSink + 'static,
{
  let regions = Router::new()
    .route("/states", get(regions::list::<S>))
    .route("/states/{id}", get(regions::hierarchy::<S>))
    .with_state(state.store);

  let prices = Router::new()
    .route("/prices/import", post(prices::import::<F, K>))
    .with_state(state.ingestor);

  regions.merge(prices).layer(TraceLayer::new_for_http())
}
