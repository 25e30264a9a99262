//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// An external dependency (the anchoring ledger) failed or timed out.
  /// The request left no partial state behind and may be retried as-is.
  #[error("upstream failure: {0}")]
  Upstream(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<praxis_engine::Error> for ApiError {
  fn from(e: praxis_engine::Error) -> Self {
    use praxis_engine::Error as E;
    match e {
      E::LessonNotFound(_)
      | E::CourseNotFound(_)
      | E::EnrollmentNotFound(_)
      | E::NotEnrolled(_)
      | E::CertificateNotFound(_) => ApiError::NotFound(e.to_string()),
      E::Forbidden(_) => ApiError::Forbidden(e.to_string()),
      E::InvalidScore(_) => ApiError::BadRequest(e.to_string()),
      E::LedgerSubmission(_) | E::LedgerTimeout(_) => {
        ApiError::Upstream(e.to_string())
      }
      E::ReferenceExhausted(_) | E::Serialization(_) | E::Store(_) => {
        ApiError::Internal(e.to_string())
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, retryable, message) = match &self {
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, false, m),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, false, m),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, false, m),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, false, m),
      ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, true, m),
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, false, m),
    };
    (status, Json(json!({ "error": message, "retryable": retryable })))
      .into_response()
  }
}
