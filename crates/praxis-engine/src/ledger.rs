//! Ledger anchoring clients.
//!
//! [`SimulatedLedger`] stands in until a real ledger integration lands: the
//! transaction id is a sha256 over the submitted hash and the current
//! timestamp, so it is unique per submission but carries no chain proof.

use std::convert::Infallible;

use chrono::Utc;
use sha2::{Digest, Sha256};

use praxis_core::ledger::LedgerAnchor;

/// In-process stand-in for an external append-only ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedLedger;

impl LedgerAnchor for SimulatedLedger {
  type Error = Infallible;

  async fn submit(&self, hash_hex: &str) -> Result<String, Infallible> {
    let mut hasher = Sha256::new();
    hasher.update(hash_hex.as_bytes());
    hasher.update(Utc::now().timestamp_millis().to_string().as_bytes());
    let tx_id = hex::encode(hasher.finalize());

    tracing::debug!(%tx_id, "simulated ledger anchor");
    Ok(tx_id)
  }
}
