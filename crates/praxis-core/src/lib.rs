//! Core types and trait definitions for the Praxis learning backend.
//!
//! This crate is deliberately free of HTTP and database dependencies:
//! it holds the domain types and the [`store`]/[`ledger`] seams that
//! every other crate plugs into.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod certificate;
pub mod enrollment;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod progress;
pub mod store;
pub mod video;

pub use error::{Error, Result};
