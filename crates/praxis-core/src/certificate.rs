//! Certificate — issued proof of course completion, optionally anchored to
//! an external ledger.
//!
//! At most one certificate exists per (learner, course); issuance is a no-op
//! when one already exists. Approval is a separate administrative step that
//! computes the completion hash and records the ledger transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An issued certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
  pub certificate_id:        Uuid,
  /// Human-readable unique reference, `CERT-<year>-<6 digits>`.
  pub certificate_reference: String,
  pub learner_id:            Uuid,
  pub course_id:             Uuid,
  pub enrollment_id:         Uuid,
  /// Denormalised at issue time so verification needs no joins.
  pub student_name:          String,
  pub course_name:           String,
  pub completion_date:       DateTime<Utc>,
  pub issued_at:             DateTime<Utc>,
  pub is_approved:           bool,
  /// SHA-256 hex digest of the canonical completion record; set together
  /// with `blockchain_tx_id` on approval, or neither.
  pub completion_hash:       Option<String>,
  pub blockchain_tx_id:      Option<String>,
}

/// Input to [`crate::store::LearningStore::insert_certificate`].
#[derive(Debug, Clone)]
pub struct NewCertificate {
  pub certificate_reference: String,
  pub learner_id:            Uuid,
  pub course_id:             Uuid,
  pub enrollment_id:         Uuid,
  pub student_name:          String,
  pub course_name:           String,
  pub completion_date:       DateTime<Utc>,
}

/// The canonical record the completion hash is computed over.
///
/// Deliberately excludes personally identifying data: the hash proves the
/// certificate content, not the learner's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRecord {
  pub certificate_reference: String,
  pub course_id:             Uuid,
  pub completion_date:       DateTime<Utc>,
}

/// Public verification view of a certificate, looked up by reference.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedCertificate {
  pub certificate_reference: String,
  pub student_name:          String,
  pub course_name:           String,
  pub completion_date:       DateTime<Utc>,
  pub is_approved:           bool,
  pub blockchain_tx_id:      Option<String>,
}

impl From<Certificate> for VerifiedCertificate {
  fn from(c: Certificate) -> Self {
    Self {
      certificate_reference: c.certificate_reference,
      student_name:          c.student_name,
      course_name:           c.course_name,
      completion_date:       c.completion_date,
      is_approved:           c.is_approved,
      blockchain_tx_id:      c.blockchain_tx_id,
    }
  }
}

/// Outcome of a certificate approval call.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApprovalOutcome {
  /// The hash was computed, anchored, and persisted by this call.
  Approved(Certificate),
  /// The certificate was already approved; prior state is returned and the
  /// ledger was not contacted again.
  AlreadyApproved(Certificate),
}

impl ApprovalOutcome {
  pub fn certificate(&self) -> &Certificate {
    match self {
      Self::Approved(c) | Self::AlreadyApproved(c) => c,
    }
  }
}
