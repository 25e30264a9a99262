//! Explicit lesson completion and incompletion.

use praxis_core::{
  identity::Identity,
  progress::{LessonProgress, MarkIncompleteOutcome, ProgressKey},
  store::LearningStore,
};
use uuid::Uuid;

use crate::{Error, Result, aggregate, owned_enrollment};

async fn progress_key<S: LearningStore>(
  store: &S,
  caller: &Identity,
  lesson_id: Uuid,
  enrollment_id: Uuid,
) -> Result<ProgressKey> {
  let lesson = store
    .get_lesson(lesson_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::LessonNotFound(lesson_id))?;

  let enrollment = owned_enrollment(store, caller, enrollment_id).await?;

  Ok(ProgressKey {
    learner_id:    caller.learner_id,
    course_id:     lesson.course_id,
    lesson_id,
    enrollment_id: enrollment.enrollment_id,
  })
}

/// Mark a lesson completed. Idempotent: creates the progress row if absent,
/// restamps `completed_at` if it already exists.
pub async fn mark_complete<S: LearningStore>(
  store: &S,
  caller: &Identity,
  lesson_id: Uuid,
  enrollment_id: Uuid,
) -> Result<LessonProgress> {
  let key = progress_key(store, caller, lesson_id, enrollment_id).await?;

  let progress = store
    .set_lesson_complete(key)
    .await
    .map_err(Error::store)?;

  aggregate::recompute(store, caller, key.course_id, key.enrollment_id).await?;

  Ok(progress)
}

/// Clear a lesson's completion. When no progress row exists this is a no-op
/// reported as [`MarkIncompleteOutcome::NoProgress`], not an error, and the
/// aggregator is not invoked (nothing changed).
pub async fn mark_incomplete<S: LearningStore>(
  store: &S,
  caller: &Identity,
  lesson_id: Uuid,
  enrollment_id: Uuid,
) -> Result<MarkIncompleteOutcome> {
  let key = progress_key(store, caller, lesson_id, enrollment_id).await?;

  match store.clear_lesson_complete(key).await.map_err(Error::store)? {
    None => Ok(MarkIncompleteOutcome::NoProgress),
    Some(progress) => {
      aggregate::recompute(store, caller, key.course_id, key.enrollment_id)
        .await?;
      Ok(MarkIncompleteOutcome::Cleared(progress))
    }
  }
}
