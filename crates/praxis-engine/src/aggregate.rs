//! Course progress aggregator.
//!
//! Invoked after any lesson-progress mutation, never directly by a client.
//! The percentage is always rederived from authoritative row counts, so
//! redundant or concurrent invocations converge on the same value without
//! locking; reaching 100% is the sole trigger for certificate issuance.

use praxis_core::{
  enrollment::{CourseProgress, EnrollmentStatus},
  identity::Identity,
  store::LearningStore,
};
use uuid::Uuid;

use crate::{Error, Result, certificate};

/// Recompute a learner's course progress and write it onto the enrollment.
///
/// `progress_percent = round(100 * completed / total)` (0 when the course
/// has no lessons); `status` is `Completed` iff the percentage is 100.
pub async fn recompute<S: LearningStore>(
  store: &S,
  caller: &Identity,
  course_id: Uuid,
  enrollment_id: Uuid,
) -> Result<CourseProgress> {
  let total = store.lesson_count(course_id).await.map_err(Error::store)?;
  let completed = store
    .completed_lesson_count(caller.learner_id, course_id)
    .await
    .map_err(Error::store)?;

  let progress_percent = if total == 0 {
    0
  } else {
    ((completed as f64 / total as f64) * 100.0).round() as u8
  };

  let status = if progress_percent == 100 {
    EnrollmentStatus::Completed
  } else {
    EnrollmentStatus::Active
  };

  store
    .update_enrollment_progress(caller.learner_id, course_id, progress_percent, status)
    .await
    .map_err(Error::store)?;

  tracing::debug!(
    learner = %caller.learner_id,
    course = %course_id,
    completed,
    total,
    progress_percent,
    "course progress recomputed"
  );

  if progress_percent == 100 {
    let course = store
      .get_course(course_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::CourseNotFound(course_id))?;
    certificate::issue_if_absent(store, caller, &course, enrollment_id).await?;
  }

  Ok(CourseProgress { progress_percent, status })
}

/// Read back the stored course progress for the calling learner.
pub async fn course_progress<S: LearningStore>(
  store: &S,
  caller: &Identity,
  course_id: Uuid,
) -> Result<CourseProgress> {
  let enrollment = store
    .find_enrollment(caller.learner_id, course_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotEnrolled(course_id))?;

  Ok(CourseProgress {
    progress_percent: enrollment.progress_percent,
    status:           enrollment.status,
  })
}
