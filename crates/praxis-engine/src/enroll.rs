//! Enrollment creation and the learner dashboard.

use praxis_core::{
  enrollment::{Enrollment, EnrollmentStatus},
  identity::Identity,
  store::LearningStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result};

/// Enroll the caller in a course. Idempotent: re-enrolling returns the
/// existing enrollment.
pub async fn enroll<S: LearningStore>(
  store: &S,
  caller: &Identity,
  course_id: Uuid,
) -> Result<Enrollment> {
  store
    .get_course(course_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::CourseNotFound(course_id))?;

  store
    .create_enrollment(caller.learner_id, course_id)
    .await
    .map_err(Error::store)
}

/// One row of the learner dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardEntry {
  pub course_id:        Uuid,
  pub course_title:     String,
  pub progress_percent: u8,
  pub status:           EnrollmentStatus,
}

/// All of the caller's enrollments with their course titles and progress.
pub async fn dashboard<S: LearningStore>(
  store: &S,
  caller: &Identity,
) -> Result<Vec<DashboardEntry>> {
  let enrollments = store
    .list_enrollments(caller.learner_id)
    .await
    .map_err(Error::store)?;

  let mut entries = Vec::with_capacity(enrollments.len());
  for enrollment in enrollments {
    let title = store
      .get_course(enrollment.course_id)
      .await
      .map_err(Error::store)?
      .map(|c| c.title)
      .unwrap_or_default();

    entries.push(DashboardEntry {
      course_id:        enrollment.course_id,
      course_title:     title,
      progress_percent: enrollment.progress_percent,
      status:           enrollment.status,
    });
  }

  Ok(entries)
}
