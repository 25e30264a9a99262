//! The engine's error taxonomy.
//!
//! Four caller-visible classes: not-found, forbidden, conflict exhaustion,
//! and external-dependency failure (the ledger). Store errors pass through
//! boxed; retryability is a property of the variant, not the message.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("lesson not found: {0}")]
  LessonNotFound(Uuid),

  #[error("course not found: {0}")]
  CourseNotFound(Uuid),

  #[error("enrollment not found: {0}")]
  EnrollmentNotFound(Uuid),

  #[error("no enrollment for course {0}")]
  NotEnrolled(Uuid),

  #[error("certificate not found: {0}")]
  CertificateNotFound(String),

  #[error("forbidden: {0}")]
  Forbidden(&'static str),

  #[error("quiz score out of range: {0}")]
  InvalidScore(u8),

  #[error("could not generate a unique certificate reference in {0} attempts")]
  ReferenceExhausted(u32),

  #[error("ledger submission failed: {0}")]
  LedgerSubmission(String),

  #[error("ledger submission timed out after {0}s")]
  LedgerTimeout(u64),

  #[error("completion record serialization: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Whether the caller may safely retry the operation as-is.
  ///
  /// A failed or timed-out ledger submission leaves the certificate
  /// unapproved, so approval is retryable; everything else either succeeded
  /// elsewhere or needs a different request.
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::LedgerSubmission(_) | Self::LedgerTimeout(_))
  }

  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
