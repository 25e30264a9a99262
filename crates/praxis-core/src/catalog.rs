//! Minimal course/lesson catalog — the collaborator surface the progress
//! engine reads (lesson existence, lesson counts, course ownership).
//!
//! Full catalog CRUD (descriptions, modules, resources, media) lives in a
//! separate subsystem; only the fields the progress and certificate paths
//! depend on are modelled here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A course as the progress engine sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
  pub course_id:     Uuid,
  pub title:         String,
  pub instructor_id: Uuid,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::LearningStore::add_course`].
#[derive(Debug, Clone)]
pub struct NewCourse {
  pub title:         String,
  pub instructor_id: Uuid,
}

/// A lesson within a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
  pub lesson_id:  Uuid,
  pub course_id:  Uuid,
  pub title:      String,
  /// Free lessons are visible to unenrolled students.
  pub is_free:    bool,
  /// Ordering within the course.
  pub sequence:   u32,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::LearningStore::add_lesson`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewLesson {
  pub course_id: Uuid,
  pub title:     String,
  #[serde(default)]
  pub is_free:   bool,
  #[serde(default)]
  pub sequence:  u32,
}
