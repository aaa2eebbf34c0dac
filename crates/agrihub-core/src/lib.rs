//! Core types and trait definitions for AgriHub.
//!
//! Holds the administrative-region model, the row/price types produced by feed
//! ingestion, and the [`store::RegionStore`] abstraction. No HTTP or database
//! dependencies live here.

// Native `async fn` in traits; the futures are spelled out with `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod price;
pub mod record;
pub mod region;
pub mod store;

pub use error::{Error, Result};
