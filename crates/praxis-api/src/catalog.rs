//! Handlers for course and lesson catalog endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/courses` | Instructor/admin only; returns 201 + course |
//! | `POST`   | `/courses/:course_id/lessons` | Course owner only; 201 + lesson |
//! | `GET`    | `/courses/:course_id/lessons` | Unenrolled students see free lessons only |
//! | `GET`    | `/lessons/:lesson_id` | Paid lessons require enrollment |
//! | `DELETE` | `/lessons/:lesson_id` | Course owner only; cascades progress rows |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use praxis_core::{
  catalog::{Course, Lesson},
  ledger::LedgerAnchor,
  store::LearningStore,
};
use praxis_engine::catalog::{
  self, CreateCourseRequest, CreateLessonRequest, LessonListing,
};
use uuid::Uuid;

use crate::{AppState, Caller, error::ApiError};

/// `POST /courses` — returns 201 + the stored [`Course`].
pub async fn create_course<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Json(body): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let course =
    catalog::create_course(state.store.as_ref(), &caller, body).await?;
  Ok((StatusCode::CREATED, Json(course)))
}

/// `POST /courses/:course_id/lessons` — returns 201 + the stored [`Lesson`].
pub async fn create_lesson<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Path(course_id): Path<Uuid>,
  Json(body): Json<CreateLessonRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let lesson =
    catalog::create_lesson(state.store.as_ref(), &caller, course_id, body)
      .await?;
  Ok((StatusCode::CREATED, Json(lesson)))
}

/// `GET /lessons/:lesson_id`
pub async fn get_lesson<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Path(lesson_id): Path<Uuid>,
) -> Result<Json<Lesson>, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let lesson =
    catalog::get_lesson(state.store.as_ref(), &caller, lesson_id).await?;
  Ok(Json(lesson))
}

/// `GET /courses/:course_id/lessons`
pub async fn list_lessons<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Path(course_id): Path<Uuid>,
) -> Result<Json<LessonListing>, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  let listing =
    catalog::list_lessons(state.store.as_ref(), &caller, course_id).await?;
  Ok(Json(listing))
}

/// `DELETE /lessons/:lesson_id` — returns 204.
pub async fn delete_lesson<S, L>(
  State(state): State<AppState<S, L>>,
  Caller(caller): Caller,
  Path(lesson_id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: LearningStore,
  L: LedgerAnchor,
{
  catalog::delete_lesson(state.store.as_ref(), &caller, lesson_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
