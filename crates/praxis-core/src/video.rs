//! Video history — the global per-(learner, lesson) resume record.
//!
//! Distinct from [`crate::progress::VideoProgress`]: history is keyed on
//! (learner, lesson) alone so a position survives re-enrollment, whereas
//! `VideoProgress` is scoped to one enrollment for audit. The same playback
//! tick updates both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Most recent playback state for one learner on one lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoHistory {
  pub learner_id:        Uuid,
  pub lesson_id:         Uuid,
  pub course_id:         Uuid,
  pub current_time:      f64,
  pub video_duration:    f64,
  pub last_watched_at:   DateTime<Utc>,
  /// Derived: watched ≥ 95% of the duration at some tick.
  pub is_completed:      bool,
  /// Playback quality label, e.g. "720p".
  pub quality:           String,
  pub subtitles_enabled: bool,
  /// Playback speed multiplier, e.g. 1.0, 1.5.
  pub watch_rate:        f64,
}

/// Where to resume a course: the most recently watched lesson, or the start
/// if the learner has no history yet.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResumePosition {
  FromStart,
  Lesson {
    lesson_id:       Uuid,
    current_time:    f64,
    video_duration:  f64,
    last_watched_at: DateTime<Utc>,
  },
}

impl From<Option<VideoHistory>> for ResumePosition {
  fn from(history: Option<VideoHistory>) -> Self {
    match history {
      None => Self::FromStart,
      Some(h) => Self::Lesson {
        lesson_id:       h.lesson_id,
        current_time:    h.current_time,
        video_duration:  h.video_duration,
        last_watched_at: h.last_watched_at,
      },
    }
  }
}
