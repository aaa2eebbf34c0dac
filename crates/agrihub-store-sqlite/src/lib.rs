//! SQLite backend for the AgriHub region hierarchy.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The single connection also serializes
//! writers: each store operation is one closure and one SQLite transaction.

mod cascade;
mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqliteStore, StoreStatus, TableStatus};

#[cfg(test)]
mod tests;
