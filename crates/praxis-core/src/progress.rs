//! Lesson progress — the per-(learner, lesson, enrollment) completion record.
//!
//! Rows are created lazily on first interaction and mutated only through the
//! conditional upserts on [`crate::store::LearningStore`], so concurrent
//! writers (a video tick racing a quiz submit) cannot lose updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identifying triple (plus the owning course) for a progress row.
///
/// Uniqueness is enforced on (learner, lesson) at the store level; a learner
/// has at most one progress row per lesson regardless of re-enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressKey {
  pub learner_id:    Uuid,
  pub course_id:     Uuid,
  pub lesson_id:     Uuid,
  pub enrollment_id: Uuid,
}

/// Playback position within this enrollment — the per-enrollment audit
/// counterpart of the global [`crate::video::VideoHistory`] resume record.
/// Both are written by the same tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoProgress {
  pub current_time:       f64,
  pub duration:           f64,
  /// 0–100, rounded.
  pub watched_percentage: u8,
  pub last_updated:       Option<DateTime<Utc>>,
}

/// One learner's progress through one lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonProgress {
  pub learner_id:         Uuid,
  pub course_id:          Uuid,
  pub lesson_id:          Uuid,
  pub enrollment_id:      Uuid,
  pub is_completed:       bool,
  pub completed_at:       Option<DateTime<Utc>>,
  pub video_progress:     VideoProgress,
  /// Latest submitted score; last write wins, no best-score policy.
  pub quiz_score:         Option<u8>,
  pub quiz_passed:        bool,
  pub quiz_attempts:      u32,
  pub time_spent_seconds: u64,
  pub last_accessed_at:   Option<DateTime<Utc>>,
}

/// One playback tick, already validated and percentage-computed by the
/// engine. Input to the store's atomic video upserts.
#[derive(Debug, Clone)]
pub struct VideoTick {
  pub current_time:       f64,
  pub duration:           f64,
  pub watched_percentage: u8,
  /// Whether this tick crosses the completion threshold. Completion is
  /// sticky: the store never clears a previously completed row on a later
  /// lower-percentage tick.
  pub completed:          bool,
  pub quality:            Option<String>,
  pub subtitles_enabled:  bool,
  pub watch_rate:         f64,
}

/// Result of an explicit mark-incomplete call.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MarkIncompleteOutcome {
  /// The row existed and its completion flags were cleared.
  Cleared(LessonProgress),
  /// No progress row exists for this lesson; nothing to do.
  NoProgress,
}
