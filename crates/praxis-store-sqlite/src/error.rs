//! Error type for `praxis-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] praxis_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The aggregator wrote progress for a (learner, course) pair with no
  /// enrollment row.
  #[error("no enrollment for learner {learner} in course {course}")]
  MissingEnrollment {
    learner: uuid::Uuid,
    course:  uuid::Uuid,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
