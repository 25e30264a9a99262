//! The ledger-anchoring seam.
//!
//! Submitting a completion hash to a tamper-evident append-only ledger is the
//! one external call with unbounded latency in this system, so it sits behind
//! a trait: the engine applies a timeout, production wires in a real client,
//! tests wire in a counting mock.

use std::future::Future;

/// Abstraction over an external append-only ledger.
pub trait LedgerAnchor: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Submit a hex-encoded hash; returns an opaque transaction reference.
  ///
  /// No retry policy is implied here — the caller decides whether a failure
  /// is retryable.
  fn submit<'a>(
    &'a self,
    hash_hex: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
