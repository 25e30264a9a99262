//! [`SqliteStore`] — the SQLite implementation of [`LearningStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use praxis_core::{
  catalog::{Course, Lesson, NewCourse, NewLesson},
  certificate::{Certificate, NewCertificate},
  enrollment::{Enrollment, EnrollmentStatus},
  progress::{LessonProgress, ProgressKey, VideoTick},
  store::{CertificateInsert, LearningStore},
  video::VideoHistory,
};

use crate::{
  Error, Result,
  encode::{
    RawCertificate, RawCourse, RawEnrollment, RawLesson, RawLessonProgress,
    RawVideoHistory, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

/// Transparent retries on SQLITE_BUSY for the progress upserts. Upserts are
/// idempotent per tick, so replaying a contended one is safe.
const BUSY_RETRIES: usize = 3;

fn is_busy(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if matches!(
        e.code,
        rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
      )
  )
}

fn is_constraint_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if e.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

async fn retry_busy<T, F, Fut>(mut op: F) -> Result<T>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T>>,
{
  let mut attempt = 0;
  loop {
    match op().await {
      Err(Error::Database(e)) if is_busy(&e) && attempt + 1 < BUSY_RETRIES => {
        attempt += 1;
      }
      other => return other,
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Praxis learning store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read back the (learner, lesson) progress row just written by an upsert.
  async fn fetch_progress(
    &self,
    learner_id: Uuid,
    lesson_id: Uuid,
  ) -> Result<Option<LessonProgress>> {
    let learner_str = encode_uuid(learner_id);
    let lesson_str  = encode_uuid(lesson_id);

    let raw: Option<RawLessonProgress> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM lesson_progress
                 WHERE learner_id = ?1 AND lesson_id = ?2",
                RawLessonProgress::COLUMNS
              ),
              rusqlite::params![learner_str, lesson_str],
              RawLessonProgress::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLessonProgress::into_progress).transpose()
  }

  async fn try_apply_video_tick(
    &self,
    key: ProgressKey,
    tick: VideoTick,
  ) -> Result<LessonProgress> {
    let learner_str    = encode_uuid(key.learner_id);
    let course_str     = encode_uuid(key.course_id);
    let lesson_str     = encode_uuid(key.lesson_id);
    let enrollment_str = encode_uuid(key.enrollment_id);
    let now            = Utc::now();
    let now_str        = encode_dt(now);
    let completed_at   = tick.completed.then(|| now_str.clone());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lesson_progress (
             learner_id, course_id, lesson_id, enrollment_id,
             is_completed, completed_at,
             video_position, video_duration, watched_percentage,
             video_updated_at, last_accessed_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
           ON CONFLICT (learner_id, lesson_id) DO UPDATE SET
             enrollment_id      = excluded.enrollment_id,
             video_position     = excluded.video_position,
             video_duration     = excluded.video_duration,
             watched_percentage = excluded.watched_percentage,
             video_updated_at   = excluded.video_updated_at,
             last_accessed_at   = excluded.last_accessed_at,
             is_completed       = CASE WHEN lesson_progress.is_completed = 1
                                       THEN 1
                                       ELSE excluded.is_completed END,
             completed_at       = CASE WHEN lesson_progress.is_completed = 1
                                       THEN lesson_progress.completed_at
                                       ELSE excluded.completed_at END",
          rusqlite::params![
            learner_str,
            course_str,
            lesson_str,
            enrollment_str,
            tick.completed,
            completed_at,
            tick.current_time,
            tick.duration,
            tick.watched_percentage as i64,
            now_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self
      .fetch_progress(key.learner_id, key.lesson_id)
      .await?
      .ok_or(Error::MissingEnrollment {
        learner: key.learner_id,
        course:  key.course_id,
      })
  }

  async fn try_apply_quiz_result(
    &self,
    key: ProgressKey,
    score: u8,
    passed: bool,
  ) -> Result<LessonProgress> {
    let learner_str    = encode_uuid(key.learner_id);
    let course_str     = encode_uuid(key.course_id);
    let lesson_str     = encode_uuid(key.lesson_id);
    let enrollment_str = encode_uuid(key.enrollment_id);
    let now_str        = encode_dt(Utc::now());
    let completed_at   = passed.then(|| now_str.clone());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lesson_progress (
             learner_id, course_id, lesson_id, enrollment_id,
             quiz_score, quiz_passed, quiz_attempts,
             is_completed, completed_at, last_accessed_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?6, ?7, ?8)
           ON CONFLICT (learner_id, lesson_id) DO UPDATE SET
             enrollment_id    = excluded.enrollment_id,
             quiz_score       = excluded.quiz_score,
             quiz_passed      = excluded.quiz_passed,
             quiz_attempts    = lesson_progress.quiz_attempts + 1,
             is_completed     = CASE WHEN excluded.quiz_passed = 1
                                     THEN 1
                                     ELSE lesson_progress.is_completed END,
             completed_at     = CASE WHEN excluded.quiz_passed = 1
                                     THEN excluded.completed_at
                                     ELSE lesson_progress.completed_at END,
             last_accessed_at = excluded.last_accessed_at",
          rusqlite::params![
            learner_str,
            course_str,
            lesson_str,
            enrollment_str,
            score as i64,
            passed,
            completed_at,
            now_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self
      .fetch_progress(key.learner_id, key.lesson_id)
      .await?
      .ok_or(Error::MissingEnrollment {
        learner: key.learner_id,
        course:  key.course_id,
      })
  }
}

// ─── LearningStore impl ──────────────────────────────────────────────────────

impl LearningStore for SqliteStore {
  type Error = Error;

  // ── Catalog ───────────────────────────────────────────────────────────────

  async fn add_course(&self, input: NewCourse) -> Result<Course> {
    let course = Course {
      course_id:     Uuid::new_v4(),
      title:         input.title,
      instructor_id: input.instructor_id,
      created_at:    Utc::now(),
    };

    let id_str         = encode_uuid(course.course_id);
    let title          = course.title.clone();
    let instructor_str = encode_uuid(course.instructor_id);
    let at_str         = encode_dt(course.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO courses (course_id, title, instructor_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, title, instructor_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(course)
  }

  async fn get_course(&self, course_id: Uuid) -> Result<Option<Course>> {
    let id_str = encode_uuid(course_id);

    let raw: Option<RawCourse> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM courses WHERE course_id = ?1",
                RawCourse::COLUMNS
              ),
              rusqlite::params![id_str],
              RawCourse::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCourse::into_course).transpose()
  }

  async fn add_lesson(&self, input: NewLesson) -> Result<Lesson> {
    let lesson = Lesson {
      lesson_id:  Uuid::new_v4(),
      course_id:  input.course_id,
      title:      input.title,
      is_free:    input.is_free,
      sequence:   input.sequence,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(lesson.lesson_id);
    let course_str = encode_uuid(lesson.course_id);
    let title      = lesson.title.clone();
    let at_str     = encode_dt(lesson.created_at);
    let is_free    = lesson.is_free;
    let sequence   = lesson.sequence as i64;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lessons
             (lesson_id, course_id, title, is_free, sequence, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, course_str, title, is_free, sequence, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(lesson)
  }

  async fn get_lesson(&self, lesson_id: Uuid) -> Result<Option<Lesson>> {
    let id_str = encode_uuid(lesson_id);

    let raw: Option<RawLesson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM lessons WHERE lesson_id = ?1",
                RawLesson::COLUMNS
              ),
              rusqlite::params![id_str],
              RawLesson::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLesson::into_lesson).transpose()
  }

  async fn list_lessons(
    &self,
    course_id: Uuid,
    free_only: bool,
  ) -> Result<Vec<Lesson>> {
    let course_str = encode_uuid(course_id);

    let raws: Vec<RawLesson> = self
      .conn
      .call(move |conn| {
        let sql = if free_only {
          format!(
            "SELECT {} FROM lessons
             WHERE course_id = ?1 AND is_free = 1
             ORDER BY sequence",
            RawLesson::COLUMNS
          )
        } else {
          format!(
            "SELECT {} FROM lessons WHERE course_id = ?1 ORDER BY sequence",
            RawLesson::COLUMNS
          )
        };

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![course_str], RawLesson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLesson::into_lesson).collect()
  }

  async fn lesson_count(&self, course_id: Uuid) -> Result<u64> {
    let course_str = encode_uuid(course_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM lessons WHERE course_id = ?1",
          rusqlite::params![course_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }

  async fn delete_lesson(&self, lesson_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(lesson_id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        // Children first, the lesson row last.
        conn.execute(
          "DELETE FROM lesson_progress WHERE lesson_id = ?1",
          rusqlite::params![id_str],
        )?;
        conn.execute(
          "DELETE FROM video_history WHERE lesson_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(conn.execute(
          "DELETE FROM lessons WHERE lesson_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Enrollments ───────────────────────────────────────────────────────────

  async fn create_enrollment(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> Result<Enrollment> {
    let learner_str = encode_uuid(learner_id);
    let course_str  = encode_uuid(course_id);
    let id_str      = encode_uuid(Uuid::new_v4());
    let at_str      = encode_dt(Utc::now());

    let raw: RawEnrollment = self
      .conn
      .call(move |conn| {
        // DO NOTHING keeps the first enrollment; re-enrolling is a no-op.
        conn.execute(
          "INSERT INTO enrollments
             (enrollment_id, learner_id, course_id, enrolled_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (learner_id, course_id) DO NOTHING",
          rusqlite::params![id_str, learner_str, course_str, at_str],
        )?;

        Ok(conn.query_row(
          &format!(
            "SELECT {} FROM enrollments
             WHERE learner_id = ?1 AND course_id = ?2",
            RawEnrollment::COLUMNS
          ),
          rusqlite::params![learner_str, course_str],
          RawEnrollment::from_row,
        )?)
      })
      .await?;

    raw.into_enrollment()
  }

  async fn get_enrollment(
    &self,
    enrollment_id: Uuid,
  ) -> Result<Option<Enrollment>> {
    let id_str = encode_uuid(enrollment_id);

    let raw: Option<RawEnrollment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM enrollments WHERE enrollment_id = ?1",
                RawEnrollment::COLUMNS
              ),
              rusqlite::params![id_str],
              RawEnrollment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEnrollment::into_enrollment).transpose()
  }

  async fn find_enrollment(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> Result<Option<Enrollment>> {
    let learner_str = encode_uuid(learner_id);
    let course_str  = encode_uuid(course_id);

    let raw: Option<RawEnrollment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM enrollments
                 WHERE learner_id = ?1 AND course_id = ?2",
                RawEnrollment::COLUMNS
              ),
              rusqlite::params![learner_str, course_str],
              RawEnrollment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEnrollment::into_enrollment).transpose()
  }

  async fn list_enrollments(&self, learner_id: Uuid) -> Result<Vec<Enrollment>> {
    let learner_str = encode_uuid(learner_id);

    let raws: Vec<RawEnrollment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM enrollments
           WHERE learner_id = ?1
           ORDER BY enrolled_at DESC",
          RawEnrollment::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![learner_str], RawEnrollment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEnrollment::into_enrollment).collect()
  }

  async fn update_enrollment_progress(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
    progress_percent: u8,
    status: EnrollmentStatus,
  ) -> Result<()> {
    let learner_str = encode_uuid(learner_id);
    let course_str  = encode_uuid(course_id);
    let status_str  = status.as_str();

    let updated: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE enrollments SET progress_percent = ?3, status = ?4
           WHERE learner_id = ?1 AND course_id = ?2",
          rusqlite::params![
            learner_str,
            course_str,
            progress_percent as i64,
            status_str
          ],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::MissingEnrollment {
        learner: learner_id,
        course:  course_id,
      });
    }
    Ok(())
  }

  // ── Lesson progress — conditional upserts ─────────────────────────────────

  async fn apply_video_tick(
    &self,
    key: ProgressKey,
    tick: VideoTick,
  ) -> Result<LessonProgress> {
    retry_busy(|| self.try_apply_video_tick(key, tick.clone())).await
  }

  async fn apply_quiz_result(
    &self,
    key: ProgressKey,
    score: u8,
    passed: bool,
  ) -> Result<LessonProgress> {
    retry_busy(|| self.try_apply_quiz_result(key, score, passed)).await
  }

  async fn set_lesson_complete(&self, key: ProgressKey) -> Result<LessonProgress> {
    let learner_str    = encode_uuid(key.learner_id);
    let course_str     = encode_uuid(key.course_id);
    let lesson_str     = encode_uuid(key.lesson_id);
    let enrollment_str = encode_uuid(key.enrollment_id);
    let now_str        = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lesson_progress (
             learner_id, course_id, lesson_id, enrollment_id,
             is_completed, completed_at, last_accessed_at
           ) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
           ON CONFLICT (learner_id, lesson_id) DO UPDATE SET
             enrollment_id    = excluded.enrollment_id,
             is_completed     = 1,
             completed_at     = excluded.completed_at,
             last_accessed_at = excluded.last_accessed_at",
          rusqlite::params![
            learner_str,
            course_str,
            lesson_str,
            enrollment_str,
            now_str
          ],
        )?;
        Ok(())
      })
      .await?;

    self
      .fetch_progress(key.learner_id, key.lesson_id)
      .await?
      .ok_or(Error::MissingEnrollment {
        learner: key.learner_id,
        course:  key.course_id,
      })
  }

  async fn clear_lesson_complete(
    &self,
    key: ProgressKey,
  ) -> Result<Option<LessonProgress>> {
    let learner_str = encode_uuid(key.learner_id);
    let lesson_str  = encode_uuid(key.lesson_id);
    let now_str     = encode_dt(Utc::now());

    let updated: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE lesson_progress
           SET is_completed = 0, completed_at = NULL, last_accessed_at = ?3
           WHERE learner_id = ?1 AND lesson_id = ?2",
          rusqlite::params![learner_str, lesson_str, now_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Ok(None);
    }
    self.fetch_progress(key.learner_id, key.lesson_id).await
  }

  async fn get_progress(
    &self,
    learner_id: Uuid,
    lesson_id: Uuid,
  ) -> Result<Option<LessonProgress>> {
    self.fetch_progress(learner_id, lesson_id).await
  }

  async fn completed_lesson_count(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> Result<u64> {
    let learner_str = encode_uuid(learner_id);
    let course_str  = encode_uuid(course_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM lesson_progress
           WHERE learner_id = ?1 AND course_id = ?2 AND is_completed = 1",
          rusqlite::params![learner_str, course_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }

  // ── Video history ─────────────────────────────────────────────────────────

  async fn upsert_video_history(
    &self,
    learner_id: Uuid,
    lesson_id: Uuid,
    course_id: Uuid,
    tick: &VideoTick,
  ) -> Result<VideoHistory> {
    let tick = tick.clone();
    retry_busy(move || {
      let tick = tick.clone();
      async move {
        let learner_str = encode_uuid(learner_id);
        let lesson_str  = encode_uuid(lesson_id);
        let course_str  = encode_uuid(course_id);
        let now_str     = encode_dt(Utc::now());

        let raw: RawVideoHistory = self
          .conn
          .call(move |conn| {
            // Quality, subtitles, and rate are set at creation; each tick
            // refreshes position, duration, watch time, and completion.
            conn.execute(
              "INSERT INTO video_history (
                 learner_id, lesson_id, course_id,
                 position_seconds, duration_seconds, last_watched_at,
                 is_completed, quality, subtitles_enabled, watch_rate
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
               ON CONFLICT (learner_id, lesson_id) DO UPDATE SET
                 position_seconds = excluded.position_seconds,
                 duration_seconds = excluded.duration_seconds,
                 last_watched_at  = excluded.last_watched_at,
                 is_completed     = excluded.is_completed",
              rusqlite::params![
                learner_str,
                lesson_str,
                course_str,
                tick.current_time,
                tick.duration,
                now_str,
                tick.completed,
                tick.quality.as_deref().unwrap_or("720p"),
                tick.subtitles_enabled,
                tick.watch_rate,
              ],
            )?;

            Ok(conn.query_row(
              &format!(
                "SELECT {} FROM video_history
                 WHERE learner_id = ?1 AND lesson_id = ?2",
                RawVideoHistory::COLUMNS
              ),
              rusqlite::params![learner_str, lesson_str],
              RawVideoHistory::from_row,
            )?)
          })
          .await?;

        raw.into_history()
      }
    })
    .await
  }

  async fn get_video_history(
    &self,
    learner_id: Uuid,
    lesson_id: Uuid,
  ) -> Result<Option<VideoHistory>> {
    let learner_str = encode_uuid(learner_id);
    let lesson_str  = encode_uuid(lesson_id);

    let raw: Option<RawVideoHistory> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM video_history
                 WHERE learner_id = ?1 AND lesson_id = ?2",
                RawVideoHistory::COLUMNS
              ),
              rusqlite::params![learner_str, lesson_str],
              RawVideoHistory::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVideoHistory::into_history).transpose()
  }

  async fn latest_video_history(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> Result<Option<VideoHistory>> {
    let learner_str = encode_uuid(learner_id);
    let course_str  = encode_uuid(course_id);

    let raw: Option<RawVideoHistory> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM video_history
                 WHERE learner_id = ?1 AND course_id = ?2
                 ORDER BY last_watched_at DESC
                 LIMIT 1",
                RawVideoHistory::COLUMNS
              ),
              rusqlite::params![learner_str, course_str],
              RawVideoHistory::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVideoHistory::into_history).transpose()
  }

  // ── Certificates ──────────────────────────────────────────────────────────

  async fn insert_certificate(
    &self,
    input: NewCertificate,
  ) -> Result<CertificateInsert> {
    let cert = Certificate {
      certificate_id:        Uuid::new_v4(),
      certificate_reference: input.certificate_reference,
      learner_id:            input.learner_id,
      course_id:             input.course_id,
      enrollment_id:         input.enrollment_id,
      student_name:          input.student_name,
      course_name:           input.course_name,
      completion_date:       input.completion_date,
      issued_at:             Utc::now(),
      is_approved:           false,
      completion_hash:       None,
      blockchain_tx_id:      None,
    };

    let id_str         = encode_uuid(cert.certificate_id);
    let reference      = cert.certificate_reference.clone();
    let learner_str    = encode_uuid(cert.learner_id);
    let course_str     = encode_uuid(cert.course_id);
    let enrollment_str = encode_uuid(cert.enrollment_id);
    let student        = cert.student_name.clone();
    let course_name    = cert.course_name.clone();
    let completed_str  = encode_dt(cert.completion_date);
    let issued_str     = encode_dt(cert.issued_at);

    let insert = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO certificates (
             certificate_id, certificate_reference, learner_id, course_id,
             enrollment_id, student_name, course_name, completion_date,
             issued_at, is_approved
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0)",
          rusqlite::params![
            id_str,
            reference,
            learner_str,
            course_str,
            enrollment_str,
            student,
            course_name,
            completed_str,
            issued_str,
          ],
        )?;
        Ok(())
      })
      .await;

    match insert {
      Ok(()) => Ok(CertificateInsert::Created(cert)),
      Err(e) if is_constraint_violation(&e) => {
        // Which constraint lost? An existing (learner, course) certificate
        // means issuance already happened; otherwise the random reference
        // collided and the caller should regenerate.
        match self.get_certificate(cert.learner_id, cert.course_id).await? {
          Some(existing) => Ok(CertificateInsert::AlreadyIssued(existing)),
          None => Ok(CertificateInsert::ReferenceCollision),
        }
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn get_certificate(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> Result<Option<Certificate>> {
    let learner_str = encode_uuid(learner_id);
    let course_str  = encode_uuid(course_id);

    let raw: Option<RawCertificate> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM certificates
                 WHERE learner_id = ?1 AND course_id = ?2",
                RawCertificate::COLUMNS
              ),
              rusqlite::params![learner_str, course_str],
              RawCertificate::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCertificate::into_certificate).transpose()
  }

  async fn get_certificate_by_id(
    &self,
    certificate_id: Uuid,
  ) -> Result<Option<Certificate>> {
    let id_str = encode_uuid(certificate_id);

    let raw: Option<RawCertificate> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM certificates WHERE certificate_id = ?1",
                RawCertificate::COLUMNS
              ),
              rusqlite::params![id_str],
              RawCertificate::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCertificate::into_certificate).transpose()
  }

  async fn get_certificate_by_reference(
    &self,
    reference: &str,
  ) -> Result<Option<Certificate>> {
    let reference = reference.to_owned();

    let raw: Option<RawCertificate> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM certificates WHERE certificate_reference = ?1",
                RawCertificate::COLUMNS
              ),
              rusqlite::params![reference],
              RawCertificate::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCertificate::into_certificate).transpose()
  }

  async fn record_approval(
    &self,
    certificate_id: Uuid,
    completion_hash: &str,
    blockchain_tx_id: &str,
  ) -> Result<bool> {
    let id_str = encode_uuid(certificate_id);
    let hash   = completion_hash.to_owned();
    let tx_id  = blockchain_tx_id.to_owned();

    let updated: usize = self
      .conn
      .call(move |conn| {
        // The is_approved guard makes the update first-writer-wins: a second
        // approval matches no row and leaves the original hash intact.
        Ok(conn.execute(
          "UPDATE certificates
           SET is_approved = 1, completion_hash = ?2, blockchain_tx_id = ?3
           WHERE certificate_id = ?1 AND is_approved = 0",
          rusqlite::params![id_str, hash, tx_id],
        )?)
      })
      .await?;

    Ok(updated > 0)
  }
}
