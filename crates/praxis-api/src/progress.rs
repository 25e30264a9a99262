//! Handlers for quiz, completion, and course-progress endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/quiz/:lesson_id/submit` | Body: `{"score": 0..=100}` |
//! | `POST` | `/progress/complete/:lesson_id` | Explicit completion |
//! | `PUT`  | `/progress/incomplete/:lesson_id` | No-op when no progress row |
//! | `GET`  | `/progress/course/:course_id` | Stored percentage and status |

use axum::{
  Json,
  extract::{Path, State},
};
use praxis_core::{
  enrollment::CourseProgress,
  ledger::LedgerAnchor,
  progress::{LessonProgress, MarkIncompleteOutcome},
  store::LearningStore,
};
use praxis_engine::{
  aggregate, completion, enrollment_for_lesson,
  quiz::{self, QuizSubmission},
};
use uuid::Uuid;

use crate::{AppState, Caller, error::ApiError};

/// `POST /quiz/:lesson_id/submit`
pub async fn submit_quiz<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Path(lesson_id): Path<Uuid>,
  Json(body): Json<QuizSubmission>,
) -> Result<Json<LessonProgress>, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let store = state.store.as_ref();
  let enrollment = enrollment_for_lesson(store, &caller, lesson_id).await?;
  let progress = quiz::submit_quiz(
    store,
    &caller,
    lesson_id,
    enrollment.enrollment_id,
    body,
  )
  .await?;
  Ok(Json(progress))
}

/// `POST /progress/complete/:lesson_id`
pub async fn mark_complete<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Path(lesson_id): Path<Uuid>,
) -> Result<Json<LessonProgress>, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let store = state.store.as_ref();
  let enrollment = enrollment_for_lesson(store, &caller, lesson_id).await?;
  let progress = completion::mark_complete(
    store,
    &caller,
    lesson_id,
    enrollment.enrollment_id,
  )
  .await?;
  Ok(Json(progress))
}

/// `PUT /progress/incomplete/:lesson_id`
pub async fn mark_incomplete<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Path(lesson_id): Path<Uuid>,
) -> Result<Json<MarkIncompleteOutcome>, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let store = state.store.as_ref();
  let enrollment = enrollment_for_lesson(store, &caller, lesson_id).await?;
  let outcome = completion::mark_incomplete(
    store,
    &caller,
    lesson_id,
    enrollment.enrollment_id,
  )
  .await?;
  Ok(Json(outcome))
}

/// `GET /progress/course/:course_id`
pub async fn course_progress<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Path(course_id): Path<Uuid>,
) -> Result<Json<CourseProgress>, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let progress =
    aggregate::course_progress(state.store.as_ref(), &caller, course_id)
      .await?;
  Ok(Json(progress))
}
