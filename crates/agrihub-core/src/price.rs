//! Commodity price observations decoded from the market-price feed.
//!
//! Field names follow the feed's CSV header, where spaces are escaped as
//! `_x0020_` (e.g. `Min_x0020_Price`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::Record;

pub const STATE: &str = "State";
pub const DISTRICT: &str = "District";
pub const MARKET: &str = "Market";
pub const COMMODITY: &str = "Commodity";
pub const VARIETY: &str = "Variety";
pub const GRADE: &str = "Grade";
pub const ARRIVAL_DATE: &str = "Arrival_Date";
pub const MIN_PRICE: &str = "Min_x0020_Price";
pub const MAX_PRICE: &str = "Max_x0020_Price";
pub const MODAL_PRICE: &str = "Modal_x0020_Price";

/// Date layouts accepted for `Arrival_Date`, tried in order.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d"];

/// Why a single feed row could not become a [`MarketPrice`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
  #[error("missing required field {0}")]
  MissingField(&'static str),

  #[error("invalid date {value:?} in {field}")]
  InvalidDate { field: &'static str, value: String },

  #[error("invalid price {value:?} in {field}")]
  InvalidPrice { field: &'static str, value: String },

  #[error("negative price {value} in {field}")]
  NegativePrice { field: &'static str, value: f64 },
}

/// One validated price observation for a commodity at a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPrice {
  pub state:        String,
  pub district:     String,
  pub market:       String,
  pub commodity:    String,
  pub variety:      Option<String>,
  pub grade:        Option<String>,
  pub arrival_date: NaiveDate,
  pub min_price:    Option<f64>,
  pub max_price:    Option<f64>,
  pub modal_price:  Option<f64>,
}

impl MarketPrice {
  /// Validate and convert a parsed row.
  pub fn from_record(record: &Record) -> Result<Self, RowError> {
    Ok(Self {
      state:        required(record, STATE)?,
      district:     required(record, DISTRICT)?,
      market:       required(record, MARKET)?,
      commodity:    required(record, COMMODITY)?,
      variety:      optional(record, VARIETY),
      grade:        optional(record, GRADE),
      arrival_date: date(record, ARRIVAL_DATE)?,
      min_price:    price(record, MIN_PRICE)?,
      max_price:    price(record, MAX_PRICE)?,
      modal_price:  price(record, MODAL_PRICE)?,
    })
  }
}

impl TryFrom<&Record> for MarketPrice {
  type Error = RowError;

  fn try_from(record: &Record) -> Result<Self, Self::Error> { Self::from_record(record) }
}

// ─── Field helpers ───────────────────────────────────────────────────────────

fn present<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
  record.get(field).map(str::trim).filter(|v| !v.is_empty())
}

fn required(record: &Record, field: &'static str) -> Result<String, RowError> {
  present(record, field)
    .map(str::to_owned)
    .ok_or(RowError::MissingField(field))
}

fn optional(record: &Record, field: &str) -> Option<String> {
  present(record, field).map(str::to_owned)
}

fn date(record: &Record, field: &'static str) -> Result<NaiveDate, RowError> {
  let raw = present(record, field).ok_or(RowError::MissingField(field))?;
  DATE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    .ok_or_else(|| RowError::InvalidDate { field, value: raw.to_owned() })
}

fn price(record: &Record, field: &'static str) -> Result<Option<f64>, RowError> {
  let Some(raw) = present(record, field) else {
    return Ok(None);
  };
  let value: f64 = raw
    .parse()
    .ok()
    .filter(|v: &f64| v.is_finite())
    .ok_or_else(|| RowError::InvalidPrice { field, value: raw.to_owned() })?;
  if value < 0.0 {
    return Err(RowError::NegativePrice { field, value });
  }
  Ok(Some(value))
}
