//! The ingestion pass: fetch once, parse, process every row, report a count.
//!
//! A row that fails to decode, validate or persist is logged and skipped; it
//! never aborts the run. Only a failed fetch or an unreadable header does.
//! Runs share no state, so concurrent or repeated runs over the same feed are
//! independent and report the same count.

use std::{convert::Infallible, future::Future};

use agrihub_core::{price::MarketPrice, record::Record};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{FeedSource, ParseError, Result, RowProcessingError, parse::parse_records};

// ─── Sinks ───────────────────────────────────────────────────────────────────

/// Destination for validated price records.
pub trait PriceSink: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn accept(&self, price: MarketPrice) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Logs each record and keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl PriceSink for LogSink {
  type Error = Infallible;

  async fn accept(&self, price: MarketPrice) -> Result<(), Infallible> {
    tracing::debug!(
      state = %price.state,
      market = %price.market,
      commodity = %price.commodity,
      arrival = %price.arrival_date,
      modal = ?price.modal_price,
      "price record accepted"
    );
    Ok(())
  }
}

/// Keeps accepted records in memory.
#[derive(Debug, Default)]
pub struct CollectSink {
  prices: Mutex<Vec<MarketPrice>>,
}

impl CollectSink {
  pub fn new() -> Self { Self::default() }

  /// Remove and return everything collected so far.
  pub async fn take(&self) -> Vec<MarketPrice> { std::mem::take(&mut *self.prices.lock().await) }

  pub async fn len(&self) -> usize { self.prices.lock().await.len() }
}

impl PriceSink for CollectSink {
  type Error = Infallible;

  async fn accept(&self, price: MarketPrice) -> Result<(), Infallible> {
    self.prices.lock().await.push(price);
    Ok(())
  }
}

// ─── Ingestor ────────────────────────────────────────────────────────────────

/// Outcome of one ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
  /// Data rows present in the fetched feed.
  pub fetched:  usize,
  /// Rows that became a price record and were accepted by the sink.
  pub imported: usize,
  pub skipped:  usize,
}

pub struct Ingestor<F, K> {
  source: F,
  sink:   K,
}

impl<F: FeedSource, K: PriceSink> Ingestor<F, K> {
  pub fn new(source: F, sink: K) -> Self { Self { source, sink } }

  pub fn sink(&self) -> &K { &self.sink }

  /// Fetch, parse and process the feed once.
  ///
  /// Fails only when the fetch fails or the header cannot be read; in that
  /// case no count is produced.
  pub async fn run(&self) -> Result<ImportReport> {
    let raw = self.source.fetch().await?;
    let feed = parse_records(&raw)?;

    let mut report = ImportReport { fetched: feed.len(), ..Default::default() };
    for (idx, row) in feed.rows.into_iter().enumerate() {
      match self.process(row).await {
        Ok(()) => report.imported += 1,
        Err(error) => {
          report.skipped += 1;
          tracing::warn!(row = idx + 1, %error, "skipping feed row");
        }
      }
    }

    tracing::info!(
      fetched = report.fetched,
      imported = report.imported,
      skipped = report.skipped,
      "market-price import finished"
    );
    Ok(report)
  }

  async fn process(&self, row: Result<Record, ParseError>) -> Result<(), RowProcessingError> {
    let record = row?;
    let price = MarketPrice::from_record(&record)?;
    self
      .sink
      .accept(price)
      .await
      .map_err(|e| RowProcessingError::Rejected(Box::new(e)))
  }
}
