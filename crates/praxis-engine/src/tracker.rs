//! Video watch tracker.
//!
//! One playback tick updates two records in the same call: the global
//! (learner, lesson) resume history and the per-enrollment
//! `LessonProgress.video_progress` audit copy. Crossing the watch threshold
//! completes the lesson and triggers the course aggregator.

use praxis_core::{
  identity::Identity,
  progress::{LessonProgress, ProgressKey, VideoTick},
  store::LearningStore,
  video::{ResumePosition, VideoHistory},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, aggregate, owned_enrollment};

/// Watching this much of a video completes the lesson. A hard threshold,
/// not configurable per call.
pub const WATCH_COMPLETE_PERCENT: u8 = 95;

const DEFAULT_QUALITY: &str = "720p";

/// One playback tick as submitted by the player.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackRequest {
  pub current_time:      f64,
  pub duration:          f64,
  pub quality:           Option<String>,
  pub subtitles_enabled: Option<bool>,
  pub watch_rate:        Option<f64>,
}

/// What one tick produced: the updated resume record, the updated progress
/// row, and whether this tick crossed the completion threshold.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackOutcome {
  pub video_history:   VideoHistory,
  pub progress:        LessonProgress,
  pub newly_completed: bool,
}

/// Record one playback tick.
///
/// Fails with `LessonNotFound` if the lesson does not exist and `Forbidden`
/// if the enrollment does not belong to `caller`. On failure the prior
/// progress state is untouched — the client just retries the tick.
pub async fn record_playback<S: LearningStore>(
  store: &S,
  caller: &Identity,
  lesson_id: Uuid,
  enrollment_id: Uuid,
  req: PlaybackRequest,
) -> Result<PlaybackOutcome> {
  let lesson = store
    .get_lesson(lesson_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::LessonNotFound(lesson_id))?;

  let enrollment = owned_enrollment(store, caller, enrollment_id).await?;

  let watched_percentage = watched_percent(req.current_time, req.duration);
  let completed = watched_percentage >= WATCH_COMPLETE_PERCENT;

  let tick = VideoTick {
    current_time: req.current_time.max(0.0),
    duration: req.duration.max(0.0),
    watched_percentage,
    completed,
    quality: Some(
      req.quality.unwrap_or_else(|| DEFAULT_QUALITY.to_owned()),
    ),
    subtitles_enabled: req.subtitles_enabled.unwrap_or(false),
    watch_rate: req.watch_rate.unwrap_or(1.0),
  };

  let was_completed = store
    .get_progress(caller.learner_id, lesson_id)
    .await
    .map_err(Error::store)?
    .is_some_and(|p| p.is_completed);

  let video_history = store
    .upsert_video_history(caller.learner_id, lesson_id, lesson.course_id, &tick)
    .await
    .map_err(Error::store)?;

  let key = ProgressKey {
    learner_id:    caller.learner_id,
    course_id:     lesson.course_id,
    lesson_id,
    enrollment_id: enrollment.enrollment_id,
  };
  let progress = store
    .apply_video_tick(key, tick)
    .await
    .map_err(Error::store)?;

  let newly_completed = completed && !was_completed;
  if completed {
    // At-least-once is fine: the aggregator rederives from row counts.
    aggregate::recompute(store, caller, lesson.course_id, enrollment.enrollment_id)
      .await?;
  }

  Ok(PlaybackOutcome { video_history, progress, newly_completed })
}

/// Resume record for one lesson; `FromStart` when the learner has never
/// watched it.
pub async fn lesson_resume<S: LearningStore>(
  store: &S,
  caller: &Identity,
  lesson_id: Uuid,
) -> Result<ResumePosition> {
  let history = store
    .get_video_history(caller.learner_id, lesson_id)
    .await
    .map_err(Error::store)?;
  Ok(history.into())
}

/// Course-wide resume position: the most recently watched lesson.
pub async fn course_resume<S: LearningStore>(
  store: &S,
  caller: &Identity,
  course_id: Uuid,
) -> Result<ResumePosition> {
  let history = store
    .latest_video_history(caller.learner_id, course_id)
    .await
    .map_err(Error::store)?;
  Ok(history.into())
}

fn watched_percent(current_time: f64, duration: f64) -> u8 {
  if duration <= 0.0 {
    return 0;
  }
  let pct = (current_time / duration * 100.0).round();
  pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn halfway_is_fifty_percent() {
    assert_eq!(watched_percent(60.0, 120.0), 50);
  }

  #[test]
  fn zero_duration_is_zero_percent() {
    assert_eq!(watched_percent(30.0, 0.0), 0);
  }

  #[test]
  fn overshoot_clamps_to_hundred() {
    // Players occasionally report currentTime past the end.
    assert_eq!(watched_percent(125.0, 120.0), 100);
  }

  #[test]
  fn threshold_boundary() {
    assert_eq!(watched_percent(114.0, 120.0), 95);
    assert!(watched_percent(114.0, 120.0) >= WATCH_COMPLETE_PERCENT);
    assert!(watched_percent(113.0, 120.0) < WATCH_COMPLETE_PERCENT);
  }
}
