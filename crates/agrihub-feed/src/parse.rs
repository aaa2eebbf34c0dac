//! CSV → [`Record`] decoding.
//!
//! Purely syntactic: the first line names the fields, every value is kept
//! verbatim. Parsing is a pure function of the input text, so the same text
//! always yields the same sequence.

use agrihub_core::record::Record;

use crate::ParseError;

/// The decoded feed: the header and one entry per data row, in file order.
#[derive(Debug)]
pub struct ParsedFeed {
  pub headers: Vec<String>,
  /// A row the decoder could not read is kept as `Err` in its position.
  pub rows:    Vec<Result<Record, ParseError>>,
}

impl ParsedFeed {
  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// Successfully decoded rows only.
  pub fn records(&self) -> impl Iterator<Item = &Record> {
    self.rows.iter().filter_map(|r| r.as_ref().ok())
  }
}

/// Decode `raw` into header-keyed records.
///
/// Rows whose cell count differs from the header are passed through: missing
/// trailing cells leave their fields absent, surplus cells land in
/// [`Record::overflow`]. Only a header the decoder cannot read fails the whole
/// call.
pub fn parse_records(raw: &str) -> Result<ParsedFeed, ParseError> {
  let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .from_reader(raw.as_bytes());

  let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();

  let rows = reader
    .records()
    .enumerate()
    .map(|(idx, row)| -> Result<Record, ParseError> {
      let row = row?;
      Ok(to_record(&headers, &row, idx + 1))
    })
    .collect();

  Ok(ParsedFeed { headers, rows })
}

fn to_record(headers: &[String], row: &csv::StringRecord, line: usize) -> Record {
  if row.len() != headers.len() {
    tracing::debug!(
      row = line,
      expected = headers.len(),
      found = row.len(),
      "feed row width differs from header"
    );
  }

  let mut record: Record = headers
    .iter()
    .zip(row.iter())
    .map(|(name, value)| (name.as_str(), value))
    .collect();
  for extra in row.iter().skip(headers.len()) {
    record.push_overflow(extra);
  }
  record
}
