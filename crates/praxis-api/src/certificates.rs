//! Handlers for certificate endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/certificate/:course_id` | Caller's own certificate |
//! | `PATCH` | `/certificates/approve/:certificate_id` | Admin only; idempotent |
//! | `GET`   | `/certificates/verify/:reference` | Public, no identity required |

use axum::{
  Json,
  extract::{Path, State},
};
use praxis_core::{
  certificate::{ApprovalOutcome, Certificate, VerifiedCertificate},
  ledger::LedgerAnchor,
  store::LearningStore,
};
use praxis_engine::certificate;
use uuid::Uuid;

use crate::{AppState, Caller, error::ApiError};

/// `GET /certificate/:course_id`
pub async fn own_certificate<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Path(course_id): Path<Uuid>,
) -> Result<Json<Certificate>, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let cert =
    certificate::own_certificate(state.store.as_ref(), &caller, course_id)
      .await?;
  Ok(Json(cert))
}

/// `PATCH /certificates/approve/:certificate_id`
///
/// Repeat calls return the already-approved certificate without touching the
/// ledger again.
pub async fn approve<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Path(certificate_id): Path<Uuid>,
) -> Result<Json<ApprovalOutcome>, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  if !caller.is_admin() {
    return Err(ApiError::Forbidden(
      "only admins may approve certificates".into(),
    ));
  }
  let outcome = certificate::approve(
    state.store.as_ref(),
    state.ledger.as_ref(),
    certificate_id,
  )
  .await?;
  Ok(Json(outcome))
}

/// `GET /certificates/verify/:reference` — the public verification endpoint.
pub async fn verify<S, L>(
  State(state): State<AppState<S, L>>,
  Path(reference): Path<String>,
) -> Result<Json<VerifiedCertificate>, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let verified =
    certificate::verify(state.store.as_ref(), &reference).await?;
  Ok(Json(verified))
}
