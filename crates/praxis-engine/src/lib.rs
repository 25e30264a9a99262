//! The Praxis progress-tracking and certificate-issuance engine.
//!
//! Request-scoped, stateless operations over a [`LearningStore`] backend:
//! playback tracking, quiz grading, explicit completion, course-progress
//! aggregation, and certificate issuance/approval/verification. The store
//! does the atomic writes; this crate does the orchestration and the
//! invariant checks.

pub mod aggregate;
pub mod catalog;
pub mod certificate;
pub mod completion;
pub mod enroll;
pub mod error;
pub mod ledger;
pub mod quiz;
pub mod tracker;


pub use error::{Error, Result};

use praxis_core::{
  enrollment::Enrollment, identity::Identity, store::LearningStore,
};
use uuid::Uuid;

/// Fetch an enrollment and check the caller owns it.
///
/// Every learner-facing mutation goes through this: `NotFound` when the
/// enrollment does not exist, `Forbidden` when it belongs to someone else.
pub(crate) async fn owned_enrollment<S: LearningStore>(
  store: &S,
  caller: &Identity,
  enrollment_id: Uuid,
) -> Result<Enrollment> {
  let enrollment = store
    .get_enrollment(enrollment_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::EnrollmentNotFound(enrollment_id))?;

  if enrollment.learner_id != caller.learner_id {
    return Err(Error::Forbidden("enrollment belongs to another learner"));
  }

  Ok(enrollment)
}

/// Resolve the caller's enrollment in the course a lesson belongs to.
///
/// Transport layers use this to go from a lesson id in the URL to the
/// enrollment the progress row hangs off.
pub async fn enrollment_for_lesson<S: LearningStore>(
  store: &S,
  caller: &Identity,
  lesson_id: Uuid,
) -> Result<Enrollment> {
  let lesson = store
    .get_lesson(lesson_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::LessonNotFound(lesson_id))?;

  store
    .find_enrollment(caller.learner_id, lesson.course_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotEnrolled(lesson.course_id))
}
