//! Handlers for video tracking endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/video/:lesson_id/playback` | Body: [`PlaybackRequest`]; one tick |
//! | `GET`  | `/video/:lesson_id/progress` | Resume position for one lesson |
//! | `GET`  | `/resume/:course_id` | Most recently watched lesson in the course |

use axum::{
  Json,
  extract::{Path, State},
};
use praxis_core::{
  ledger::LedgerAnchor, store::LearningStore, video::ResumePosition,
};
use praxis_engine::{
  enrollment_for_lesson,
  tracker::{self, PlaybackOutcome, PlaybackRequest},
};
use uuid::Uuid;

use crate::{AppState, Caller, error::ApiError};

/// `PUT /video/:lesson_id/playback`
pub async fn playback<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Path(lesson_id): Path<Uuid>,
  Json(body): Json<PlaybackRequest>,
) -> Result<Json<PlaybackOutcome>, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let store = state.store.as_ref();
  let enrollment = enrollment_for_lesson(store, &caller, lesson_id).await?;
  let outcome = tracker::record_playback(
    store,
    &caller,
    lesson_id,
    enrollment.enrollment_id,
    body,
  )
  .await?;
  Ok(Json(outcome))
}

/// `GET /video/:lesson_id/progress`
pub async fn lesson_resume<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Path(lesson_id): Path<Uuid>,
) -> Result<Json<ResumePosition>, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let position =
    tracker::lesson_resume(state.store.as_ref(), &caller, lesson_id).await?;
  Ok(Json(position))
}

/// `GET /resume/:course_id`
pub async fn course_resume<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Path(course_id): Path<Uuid>,
) -> Result<Json<ResumePosition>, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let position =
    tracker::course_resume(state.store.as_ref(), &caller, course_id).await?;
  Ok(Json(position))
}
