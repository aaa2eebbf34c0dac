//! Handlers for `/states` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/states` | Ordered by id |
//! | `GET`  | `/states/{id}` | Full subtree; 404 if not found, 400 if `id` is not an integer |

use std::sync::Arc;

use agrihub_core::{
  region::{StateId, StateTree},
  store::RegionStore,
};
use axum::{
  Json,
  extract::{Path, State, rejection::PathRejection},
};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /states`
pub async fn list<S: RegionStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<agrihub_core::region::State>>, ApiError> {
  let states = store.list_states().await.map_err(ApiError::store)?;
  Ok(Json(states))
}

// ─── Hierarchy ────────────────────────────────────────────────────────────────

/// `GET /states/{id}`
pub async fn hierarchy<S: RegionStore>(
  State(store): State<Arc<S>>,
  id: Result<Path<i64>, PathRejection>,
) -> Result<Json<StateTree>, ApiError> {
  let Path(id) = id?;
  let tree = store
    .get_hierarchy(StateId(id))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(tree))
}
