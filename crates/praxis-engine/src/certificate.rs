//! Certificate issuance, approval, and verification.
//!
//! Issuance happens exactly once per (learner, course), as a side effect of
//! the aggregator reaching 100% — never from a direct client request. The
//! store's uniqueness constraints arbitrate concurrent triggers. Approval
//! hashes a canonical completion record, anchors it on the ledger, and
//! persists hash + transaction id atomically.

use std::time::Duration;

use chrono::{Datelike, Utc};
use praxis_core::{
  catalog::Course,
  certificate::{
    ApprovalOutcome, Certificate, CompletionRecord, NewCertificate,
    VerifiedCertificate,
  },
  identity::Identity,
  ledger::LedgerAnchor,
  store::{CertificateInsert, LearningStore},
};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{Error, Result};

/// Attempts at generating a non-colliding certificate reference before
/// giving up. Exhaustion indicates an entropy problem, not bad luck.
const REFERENCE_ATTEMPTS: u32 = 5;

/// How long to wait on the ledger before treating the submission as failed.
/// A timeout leaves the certificate unapproved and is safe to retry.
const LEDGER_SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

// ─── Reference generation ────────────────────────────────────────────────────

/// A fresh human-readable reference: `CERT-<year>-<6 digit random>`.
fn generate_reference() -> String {
  let year = Utc::now().year();
  let suffix = 100_000 + OsRng.next_u32() % 900_000;
  format!("CERT-{year}-{suffix}")
}

// ─── Completion hash ─────────────────────────────────────────────────────────

/// SHA-256 hex digest over the deterministically serialised completion
/// record. Struct field order is fixed, so the JSON byte stream — and
/// therefore the digest — is stable across runs.
pub fn completion_hash(record: &CompletionRecord) -> Result<String> {
  let canonical = serde_json::to_vec(record)?;
  let digest = Sha256::digest(&canonical);
  Ok(hex::encode(digest))
}

// ─── Issuance ────────────────────────────────────────────────────────────────

/// Issue a certificate for (learner, course) unless one already exists.
///
/// Idempotent under concurrency: a losing insert surfaces as
/// [`CertificateInsert::AlreadyIssued`] and falls back to the surviving row.
/// A reference collision regenerates and retries, bounded.
pub async fn issue_if_absent<S: LearningStore>(
  store: &S,
  caller: &Identity,
  course: &Course,
  enrollment_id: Uuid,
) -> Result<Certificate> {
  if let Some(existing) = store
    .get_certificate(caller.learner_id, course.course_id)
    .await
    .map_err(Error::store)?
  {
    return Ok(existing);
  }

  for _ in 0..REFERENCE_ATTEMPTS {
    let input = NewCertificate {
      certificate_reference: generate_reference(),
      learner_id:            caller.learner_id,
      course_id:             course.course_id,
      enrollment_id,
      student_name:          caller.display_name.clone(),
      course_name:           course.title.clone(),
      completion_date:       Utc::now(),
    };

    match store.insert_certificate(input).await.map_err(Error::store)? {
      CertificateInsert::Created(cert) => {
        tracing::info!(
          reference = %cert.certificate_reference,
          learner = %cert.learner_id,
          course = %cert.course_id,
          "certificate issued"
        );
        return Ok(cert);
      }
      CertificateInsert::AlreadyIssued(cert) => return Ok(cert),
      CertificateInsert::ReferenceCollision => {
        tracing::warn!("certificate reference collision, regenerating");
      }
    }
  }

  Err(Error::ReferenceExhausted(REFERENCE_ATTEMPTS))
}

// ─── Approval ────────────────────────────────────────────────────────────────

/// Approve a certificate: hash its completion record, anchor the hash on the
/// ledger, and persist hash + transaction id together with the approved
/// flag.
///
/// Idempotent: approving an already-approved certificate returns the prior
/// state without contacting the ledger. On a failed or timed-out submission
/// nothing is persisted and the error is retryable.
pub async fn approve<S, L>(
  store: &S,
  ledger: &L,
  certificate_id: Uuid,
) -> Result<ApprovalOutcome>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let cert = store
    .get_certificate_by_id(certificate_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::CertificateNotFound(certificate_id.to_string()))?;

  if cert.is_approved {
    return Ok(ApprovalOutcome::AlreadyApproved(cert));
  }

  let record = CompletionRecord {
    certificate_reference: cert.certificate_reference.clone(),
    course_id:             cert.course_id,
    completion_date:       cert.completion_date,
  };
  let hash = completion_hash(&record)?;

  let tx_id =
    match tokio::time::timeout(LEDGER_SUBMIT_TIMEOUT, ledger.submit(&hash))
      .await
    {
      Err(_elapsed) => {
        return Err(Error::LedgerTimeout(LEDGER_SUBMIT_TIMEOUT.as_secs()));
      }
      Ok(Err(e)) => return Err(Error::LedgerSubmission(e.to_string())),
      Ok(Ok(tx_id)) => tx_id,
    };

  let updated = store
    .record_approval(certificate_id, &hash, &tx_id)
    .await
    .map_err(Error::store)?;

  let final_cert = store
    .get_certificate_by_id(certificate_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::CertificateNotFound(certificate_id.to_string()))?;

  if updated {
    tracing::info!(
      reference = %final_cert.certificate_reference,
      tx_id = %tx_id,
      "certificate approved and anchored"
    );
    Ok(ApprovalOutcome::Approved(final_cert))
  } else {
    // Lost a race with another approval; the store kept the winner's state.
    Ok(ApprovalOutcome::AlreadyApproved(final_cert))
  }
}

// ─── Verification ────────────────────────────────────────────────────────────

/// Public, read-only lookup by certificate reference.
pub async fn verify<S: LearningStore>(
  store: &S,
  reference: &str,
) -> Result<VerifiedCertificate> {
  let cert = store
    .get_certificate_by_reference(reference)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::CertificateNotFound(reference.to_owned()))?;
  Ok(cert.into())
}

/// The calling learner's own certificate for a course.
pub async fn own_certificate<S: LearningStore>(
  store: &S,
  caller: &Identity,
  course_id: Uuid,
) -> Result<Certificate> {
  store
    .find_enrollment(caller.learner_id, course_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotEnrolled(course_id))?;

  store
    .get_certificate(caller.learner_id, course_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::CertificateNotFound(course_id.to_string()))
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn reference_format() {
    let reference = generate_reference();
    let year = Utc::now().year();
    let prefix = format!("CERT-{year}-");
    assert!(reference.starts_with(&prefix), "reference: {reference}");
    let suffix = &reference[prefix.len()..];
    assert_eq!(suffix.len(), 6);
    assert!(suffix.chars().all(|c| c.is_ascii_digit()));
  }

  #[test]
  fn completion_hash_is_deterministic() {
    let record = CompletionRecord {
      certificate_reference: "CERT-2026-123456".to_owned(),
      course_id:             Uuid::nil(),
      completion_date:       Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    };
    let a = completion_hash(&record).unwrap();
    let b = completion_hash(&record).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
  }

  #[test]
  fn completion_hash_changes_with_content() {
    let base = CompletionRecord {
      certificate_reference: "CERT-2026-123456".to_owned(),
      course_id:             Uuid::nil(),
      completion_date:       Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    };
    let mut altered = base.clone();
    altered.certificate_reference = "CERT-2026-654321".to_owned();
    assert_ne!(
      completion_hash(&base).unwrap(),
      completion_hash(&altered).unwrap()
    );
  }
}
