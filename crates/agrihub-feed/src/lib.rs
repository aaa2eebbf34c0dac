//! Market-price feed ingestion for AgriHub.
//!
//! Pipeline:
//!   [`FeedClient::fetch`]        → raw CSV text (one HTTP GET, no retry)
//!     └─ [`parse_records`]       → header-keyed [`Record`](agrihub_core::record::Record)s
//!          └─ [`Ingestor::run`]  → validated prices handed to a [`PriceSink`],
//!                                   per-row failures skipped and counted

pub mod client;
pub mod error;
pub mod parse;
pub mod pipeline;

pub use client::{FeedClient, FeedConfig, FeedSource};
pub use error::{Error, ParseError, Result, RowProcessingError, TransportError};
pub use parse::{ParsedFeed, parse_records};
pub use pipeline::{CollectSink, ImportReport, Ingestor, LogSink, PriceSink};
