//! Quiz grader.
//!
//! Fixed pass mark, last-write-wins scoring, attempt counting. A failed
//! retake never revokes an earlier completion.

use praxis_core::{
  identity::Identity,
  progress::{LessonProgress, ProgressKey},
  store::LearningStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Error, Result, aggregate, owned_enrollment};

/// Scores at or above this pass the quiz.
pub const QUIZ_PASS_SCORE: u8 = 70;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QuizSubmission {
  pub score: u8,
}

/// Grade one quiz submission against the pass mark and apply it.
///
/// The aggregator runs unconditionally afterwards: even a failing submission
/// changed `quiz_attempts`, and the derived percentage is cheap to rebuild.
pub async fn submit_quiz<S: LearningStore>(
  store: &S,
  caller: &Identity,
  lesson_id: Uuid,
  enrollment_id: Uuid,
  submission: QuizSubmission,
) -> Result<LessonProgress> {
  if submission.score > 100 {
    return Err(Error::InvalidScore(submission.score));
  }

  let lesson = store
    .get_lesson(lesson_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::LessonNotFound(lesson_id))?;

  let enrollment = owned_enrollment(store, caller, enrollment_id).await?;

  let passed = submission.score >= QUIZ_PASS_SCORE;
  let key = ProgressKey {
    learner_id:    caller.learner_id,
    course_id:     lesson.course_id,
    lesson_id,
    enrollment_id: enrollment.enrollment_id,
  };

  let progress = store
    .apply_quiz_result(key, submission.score, passed)
    .await
    .map_err(Error::store)?;

  aggregate::recompute(store, caller, lesson.course_id, enrollment.enrollment_id)
    .await?;

  Ok(progress)
}
