//! Handler for `POST /prices/import`.
//!
//! Runs one ingestion pass and answers with its [`ImportReport`]. A feed that
//! cannot be fetched or whose header cannot be read is a 502.

use std::sync::Arc;

use agrihub_feed::{FeedSource, ImportReport, Ingestor, PriceSink};
use axum::{Json, extract::State};

use crate::error::ApiError;

/// `POST /prices/import`
pub async fn import<F: FeedSource, K: PriceSink>(
  State(ingestor): State<Arc<Ingestor<F, K>>>,
) -> Result<Json<ImportReport>, ApiError> {
  let report = ingestor.run().await?;
  Ok(Json(report))
}
