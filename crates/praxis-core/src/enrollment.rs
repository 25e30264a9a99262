//! Enrollment — the relationship binding a learner to a course.
//!
//! `progress_percent` and `status` are derived values. They are written only
//! by the course progress aggregator, which always recomputes them from the
//! authoritative lesson-progress rows; nothing increments them in place.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// Lifecycle state of an enrollment.
///
/// Invariant: `Completed` iff `progress_percent == 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
  Active,
  Completed,
  Cancelled,
}

impl EnrollmentStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Completed => "completed",
      Self::Cancelled => "cancelled",
    }
  }
}

impl FromStr for EnrollmentStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "active" => Ok(Self::Active),
      "completed" => Ok(Self::Completed),
      "cancelled" => Ok(Self::Cancelled),
      other => Err(Error::UnknownEnrollmentStatus(other.to_owned())),
    }
  }
}

/// One learner enrolled in one course. At most one per (learner, course).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
  pub enrollment_id:    Uuid,
  pub learner_id:       Uuid,
  pub course_id:        Uuid,
  /// 0–100; always a full recomputation, never an increment.
  pub progress_percent: u8,
  pub status:           EnrollmentStatus,
  pub enrolled_at:      DateTime<Utc>,
}

/// The aggregator's output: the freshly derived course-level progress.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CourseProgress {
  pub progress_percent: u8,
  pub status:           EnrollmentStatus,
}
