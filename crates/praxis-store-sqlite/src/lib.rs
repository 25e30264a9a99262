//! SQLite backend for the Praxis learning store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. Progress writes are single-
//! statement conditional upserts, so the uniqueness constraints in the schema
//! do the concurrency arbitration.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
