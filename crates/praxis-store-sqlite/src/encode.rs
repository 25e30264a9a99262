//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Enums are stored as their snake-case
//! labels; bools and small integers map onto INTEGER columns directly.

use std::str::FromStr as _;

use chrono::{DateTime, Utc};
use praxis_core::{
  catalog::{Course, Lesson},
  certificate::Certificate,
  enrollment::{Enrollment, EnrollmentStatus},
  progress::{LessonProgress, VideoProgress},
  video::VideoHistory,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_dt_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `courses` row.
pub struct RawCourse {
  pub course_id:     String,
  pub title:         String,
  pub instructor_id: String,
  pub created_at:    String,
}

impl RawCourse {
  pub const COLUMNS: &str = "course_id, title, instructor_id, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      course_id:     row.get(0)?,
      title:         row.get(1)?,
      instructor_id: row.get(2)?,
      created_at:    row.get(3)?,
    })
  }

  pub fn into_course(self) -> Result<Course> {
    Ok(Course {
      course_id:     decode_uuid(&self.course_id)?,
      title:         self.title,
      instructor_id: decode_uuid(&self.instructor_id)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `lessons` row.
pub struct RawLesson {
  pub lesson_id:  String,
  pub course_id:  String,
  pub title:      String,
  pub is_free:    bool,
  pub sequence:   i64,
  pub created_at: String,
}

impl RawLesson {
  pub const COLUMNS: &str =
    "lesson_id, course_id, title, is_free, sequence, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      lesson_id:  row.get(0)?,
      course_id:  row.get(1)?,
      title:      row.get(2)?,
      is_free:    row.get(3)?,
      sequence:   row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_lesson(self) -> Result<Lesson> {
    Ok(Lesson {
      lesson_id:  decode_uuid(&self.lesson_id)?,
      course_id:  decode_uuid(&self.course_id)?,
      title:      self.title,
      is_free:    self.is_free,
      sequence:   self.sequence as u32,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `enrollments` row.
pub struct RawEnrollment {
  pub enrollment_id:    String,
  pub learner_id:       String,
  pub course_id:        String,
  pub progress_percent: i64,
  pub status:           String,
  pub enrolled_at:      String,
}

impl RawEnrollment {
  pub const COLUMNS: &str = "enrollment_id, learner_id, course_id, \
                             progress_percent, status, enrolled_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      enrollment_id:    row.get(0)?,
      learner_id:       row.get(1)?,
      course_id:        row.get(2)?,
      progress_percent: row.get(3)?,
      status:           row.get(4)?,
      enrolled_at:      row.get(5)?,
    })
  }

  pub fn into_enrollment(self) -> Result<Enrollment> {
    Ok(Enrollment {
      enrollment_id:    decode_uuid(&self.enrollment_id)?,
      learner_id:       decode_uuid(&self.learner_id)?,
      course_id:        decode_uuid(&self.course_id)?,
      progress_percent: self.progress_percent as u8,
      status:           EnrollmentStatus::from_str(&self.status)?,
      enrolled_at:      decode_dt(&self.enrolled_at)?,
    })
  }
}

/// Raw values read directly from a `lesson_progress` row.
pub struct RawLessonProgress {
  pub learner_id:         String,
  pub course_id:          String,
  pub lesson_id:          String,
  pub enrollment_id:      String,
  pub is_completed:       bool,
  pub completed_at:       Option<String>,
  pub video_position:     f64,
  pub video_duration:     f64,
  pub watched_percentage: i64,
  pub video_updated_at:   Option<String>,
  pub quiz_score:         Option<i64>,
  pub quiz_passed:        bool,
  pub quiz_attempts:      i64,
  pub time_spent_seconds: i64,
  pub last_accessed_at:   Option<String>,
}

impl RawLessonProgress {
  pub const COLUMNS: &str =
    "learner_id, course_id, lesson_id, enrollment_id, is_completed, \
     completed_at, video_position, video_duration, watched_percentage, \
     video_updated_at, quiz_score, quiz_passed, quiz_attempts, \
     time_spent_seconds, last_accessed_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      learner_id:         row.get(0)?,
      course_id:          row.get(1)?,
      lesson_id:          row.get(2)?,
      enrollment_id:      row.get(3)?,
      is_completed:       row.get(4)?,
      completed_at:       row.get(5)?,
      video_position:     row.get(6)?,
      video_duration:     row.get(7)?,
      watched_percentage: row.get(8)?,
      video_updated_at:   row.get(9)?,
      quiz_score:         row.get(10)?,
      quiz_passed:        row.get(11)?,
      quiz_attempts:      row.get(12)?,
      time_spent_seconds: row.get(13)?,
      last_accessed_at:   row.get(14)?,
    })
  }

  pub fn into_progress(self) -> Result<LessonProgress> {
    Ok(LessonProgress {
      learner_id:         decode_uuid(&self.learner_id)?,
      course_id:          decode_uuid(&self.course_id)?,
      lesson_id:          decode_uuid(&self.lesson_id)?,
      enrollment_id:      decode_uuid(&self.enrollment_id)?,
      is_completed:       self.is_completed,
      completed_at:       decode_dt_opt(self.completed_at.as_deref())?,
      video_progress:     VideoProgress {
        current_time:       self.video_position,
        duration:           self.video_duration,
        watched_percentage: self.watched_percentage as u8,
        last_updated:       decode_dt_opt(self.video_updated_at.as_deref())?,
      },
      quiz_score:         self.quiz_score.map(|s| s as u8),
      quiz_passed:        self.quiz_passed,
      quiz_attempts:      self.quiz_attempts as u32,
      time_spent_seconds: self.time_spent_seconds as u64,
      last_accessed_at:   decode_dt_opt(self.last_accessed_at.as_deref())?,
    })
  }
}

/// Raw values read directly from a `video_history` row.
pub struct RawVideoHistory {
  pub learner_id:        String,
  pub lesson_id:         String,
  pub course_id:         String,
  pub position_seconds:  f64,
  pub duration_seconds:  f64,
  pub last_watched_at:   String,
  pub is_completed:      bool,
  pub quality:           String,
  pub subtitles_enabled: bool,
  pub watch_rate:        f64,
}

impl RawVideoHistory {
  pub const COLUMNS: &str =
    "learner_id, lesson_id, course_id, position_seconds, duration_seconds, \
     last_watched_at, is_completed, quality, subtitles_enabled, watch_rate";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      learner_id:        row.get(0)?,
      lesson_id:         row.get(1)?,
      course_id:         row.get(2)?,
      position_seconds:  row.get(3)?,
      duration_seconds:  row.get(4)?,
      last_watched_at:   row.get(5)?,
      is_completed:      row.get(6)?,
      quality:           row.get(7)?,
      subtitles_enabled: row.get(8)?,
      watch_rate:        row.get(9)?,
    })
  }

  pub fn into_history(self) -> Result<VideoHistory> {
    Ok(VideoHistory {
      learner_id:        decode_uuid(&self.learner_id)?,
      lesson_id:         decode_uuid(&self.lesson_id)?,
      course_id:         decode_uuid(&self.course_id)?,
      current_time:      self.position_seconds,
      video_duration:    self.duration_seconds,
      last_watched_at:   decode_dt(&self.last_watched_at)?,
      is_completed:      self.is_completed,
      quality:           self.quality,
      subtitles_enabled: self.subtitles_enabled,
      watch_rate:        self.watch_rate,
    })
  }
}

/// Raw values read directly from a `certificates` row.
pub struct RawCertificate {
  pub certificate_id:        String,
  pub certificate_reference: String,
  pub learner_id:            String,
  pub course_id:             String,
  pub enrollment_id:         String,
  pub student_name:          String,
  pub course_name:           String,
  pub completion_date:       String,
  pub issued_at:             String,
  pub is_approved:           bool,
  pub completion_hash:       Option<String>,
  pub blockchain_tx_id:      Option<String>,
}

impl RawCertificate {
  pub const COLUMNS: &str =
    "certificate_id, certificate_reference, learner_id, course_id, \
     enrollment_id, student_name, course_name, completion_date, issued_at, \
     is_approved, completion_hash, blockchain_tx_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      certificate_id:        row.get(0)?,
      certificate_reference: row.get(1)?,
      learner_id:            row.get(2)?,
      course_id:             row.get(3)?,
      enrollment_id:         row.get(4)?,
      student_name:          row.get(5)?,
      course_name:           row.get(6)?,
      completion_date:       row.get(7)?,
      issued_at:             row.get(8)?,
      is_approved:           row.get(9)?,
      completion_hash:       row.get(10)?,
      blockchain_tx_id:      row.get(11)?,
    })
  }

  pub fn into_certificate(self) -> Result<Certificate> {
    Ok(Certificate {
      certificate_id:        decode_uuid(&self.certificate_id)?,
      certificate_reference: self.certificate_reference,
      learner_id:            decode_uuid(&self.learner_id)?,
      course_id:             decode_uuid(&self.course_id)?,
      enrollment_id:         decode_uuid(&self.enrollment_id)?,
      student_name:          self.student_name,
      course_name:           self.course_name,
      completion_date:       decode_dt(&self.completion_date)?,
      issued_at:             decode_dt(&self.issued_at)?,
      is_approved:           self.is_approved,
      completion_hash:       self.completion_hash,
      blockchain_tx_id:      self.blockchain_tx_id,
    })
  }
}
