//! [`Record`]: one decoded row of delimited input, keyed by header name.

use serde::{Deserialize, Serialize};

/// An ordered field-name → value association.
///
/// Values are kept verbatim; no type coercion happens at this level. A row
/// shorter than its header yields a partial record, and cells beyond the
/// header are kept in [`Record::overflow`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  fields:   Vec<(String, String)>,
  overflow: Vec<String>,
}

impl Record {
  pub fn new() -> Self { Self::default() }

  pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.fields.push((name.into(), value.into()));
  }

  pub fn push_overflow(&mut self, value: impl Into<String>) {
    self.overflow.push(value.into());
  }

  /// Value of the first field named `name`.
  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .fields
      .iter()
      .find(|(k, _)| k == name)
      .map(|(_, v)| v.as_str())
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.fields.iter().map(|(k, _)| k.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn overflow(&self) -> &[String] { &self.overflow }

  pub fn len(&self) -> usize { self.fields.len() }

  pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self {
      fields:   iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
      overflow: Vec::new(),
    }
  }
}
