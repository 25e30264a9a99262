//! Handlers for enrollment endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/enrollments/:course_id` | Idempotent; 201 + enrollment |
//! | `GET`  | `/dashboard` | Caller's enrollments with course titles |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use praxis_core::{ledger::LedgerAnchor, store::LearningStore};
use praxis_engine::enroll::{self, DashboardEntry};
use uuid::Uuid;

use crate::{AppState, Caller, error::ApiError};

/// `POST /enrollments/:course_id` — returns 201 + the enrollment. A repeat
/// call returns the existing row.
pub async fn enroll<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let enrollment =
    enroll::enroll(state.store.as_ref(), &caller, course_id).await?;
  Ok((StatusCode::CREATED, Json(enrollment)))
}

/// `GET /dashboard`
pub async fn dashboard<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
) -> Result<Json<Vec<DashboardEntry>>, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let entries = enroll::dashboard(state.store.as_ref(), &caller).await?;
  Ok(Json(entries))
}
