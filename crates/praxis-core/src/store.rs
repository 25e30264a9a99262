//! The `LearningStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `praxis-store-sqlite`). Higher layers (`praxis-engine`, `praxis-api`)
//! depend on this abstraction, not on any concrete backend.
//!
//! Write methods on progress rows are conditional upserts: the store applies
//! the whole mutation atomically rather than exposing read-modify-write to
//! the caller, so concurrent ticks and submits cannot lose updates.

use std::future::Future;

use uuid::Uuid;

use crate::{
  catalog::{Course, Lesson, NewCourse, NewLesson},
  certificate::{Certificate, NewCertificate},
  enrollment::{Enrollment, EnrollmentStatus},
  progress::{LessonProgress, ProgressKey, VideoTick},
  video::VideoHistory,
};

// ─── Insert outcome ──────────────────────────────────────────────────────────

/// Outcome of [`LearningStore::insert_certificate`].
///
/// Both conflict cases are constraint violations, but they demand different
/// recovery: an existing (learner, course) certificate means issuance is
/// done, while a reference collision means the caller should regenerate the
/// reference and retry.
#[derive(Debug, Clone)]
pub enum CertificateInsert {
  Created(Certificate),
  /// A certificate for this (learner, course) already exists; the surviving
  /// row is returned.
  AlreadyIssued(Certificate),
  /// Another certificate holds this `certificate_reference`.
  ReferenceCollision,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Praxis learning-store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait LearningStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Catalog ───────────────────────────────────────────────────────────

  /// Create and persist a course.
  fn add_course(
    &self,
    input: NewCourse,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + '_;

  /// Retrieve a course by id. Returns `None` if not found.
  fn get_course(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;

  /// Create and persist a lesson.
  fn add_lesson(
    &self,
    input: NewLesson,
  ) -> impl Future<Output = Result<Lesson, Self::Error>> + Send + '_;

  /// Retrieve a lesson by id. Returns `None` if not found.
  fn get_lesson(
    &self,
    lesson_id: Uuid,
  ) -> impl Future<Output = Result<Option<Lesson>, Self::Error>> + Send + '_;

  /// List a course's lessons ordered by sequence, optionally only the free
  /// ones (the view unenrolled students get).
  fn list_lessons(
    &self,
    course_id: Uuid,
    free_only: bool,
  ) -> impl Future<Output = Result<Vec<Lesson>, Self::Error>> + Send + '_;

  /// Count of lessons belonging to a course — the aggregator's denominator.
  fn lesson_count(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Delete a lesson, cascading its progress and video-history rows.
  /// Returns `false` if the lesson did not exist.
  fn delete_lesson(
    &self,
    lesson_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Enrollments ───────────────────────────────────────────────────────

  /// Enroll a learner in a course. At most one enrollment per
  /// (learner, course) — a second call returns the existing row.
  fn create_enrollment(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Enrollment, Self::Error>> + Send + '_;

  /// Retrieve an enrollment by id. Returns `None` if not found.
  fn get_enrollment(
    &self,
    enrollment_id: Uuid,
  ) -> impl Future<Output = Result<Option<Enrollment>, Self::Error>> + Send + '_;

  /// Find the enrollment binding a learner to a course.
  fn find_enrollment(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Option<Enrollment>, Self::Error>> + Send + '_;

  /// All of a learner's enrollments, newest first.
  fn list_enrollments(
    &self,
    learner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Enrollment>, Self::Error>> + Send + '_;

  /// Write a freshly recomputed progress percentage and status onto the
  /// (learner, course) enrollment. Called only by the aggregator.
  fn update_enrollment_progress(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
    progress_percent: u8,
    status: EnrollmentStatus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Lesson progress — conditional upserts ─────────────────────────────

  /// Apply one playback tick to the (learner, lesson) progress row,
  /// creating it if absent. Completion is sticky: a tick below the
  /// threshold never clears a previously completed row.
  fn apply_video_tick(
    &self,
    key: ProgressKey,
    tick: VideoTick,
  ) -> impl Future<Output = Result<LessonProgress, Self::Error>> + Send + '_;

  /// Apply one quiz submission: overwrite the score, increment the attempt
  /// counter, and complete the lesson if `passed`. A failed retake never
  /// revokes a prior completion.
  fn apply_quiz_result(
    &self,
    key: ProgressKey,
    score: u8,
    passed: bool,
  ) -> impl Future<Output = Result<LessonProgress, Self::Error>> + Send + '_;

  /// Mark the lesson completed (idempotent create-or-update).
  fn set_lesson_complete(
    &self,
    key: ProgressKey,
  ) -> impl Future<Output = Result<LessonProgress, Self::Error>> + Send + '_;

  /// Clear the completion flags. Returns `None` when no progress row
  /// exists — a no-op, not an error.
  fn clear_lesson_complete(
    &self,
    key: ProgressKey,
  ) -> impl Future<Output = Result<Option<LessonProgress>, Self::Error>> + Send + '_;

  /// Retrieve the (learner, lesson) progress row.
  fn get_progress(
    &self,
    learner_id: Uuid,
    lesson_id: Uuid,
  ) -> impl Future<Output = Result<Option<LessonProgress>, Self::Error>> + Send + '_;

  /// Count of completed lessons for (learner, course) — the aggregator's
  /// numerator, always read fresh.
  fn completed_lesson_count(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Video history ─────────────────────────────────────────────────────

  /// Apply one playback tick to the global (learner, lesson) resume record,
  /// creating it if absent.
  fn upsert_video_history<'a>(
    &'a self,
    learner_id: Uuid,
    lesson_id: Uuid,
    course_id: Uuid,
    tick: &'a VideoTick,
  ) -> impl Future<Output = Result<VideoHistory, Self::Error>> + Send + 'a;

  /// Retrieve the resume record for one lesson.
  fn get_video_history(
    &self,
    learner_id: Uuid,
    lesson_id: Uuid,
  ) -> impl Future<Output = Result<Option<VideoHistory>, Self::Error>> + Send + '_;

  /// The learner's most recently watched lesson in a course, by
  /// `last_watched_at` descending.
  fn latest_video_history(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Option<VideoHistory>, Self::Error>> + Send + '_;

  // ── Certificates ──────────────────────────────────────────────────────

  /// Insert a certificate, relying on the store's uniqueness constraints to
  /// arbitrate races. See [`CertificateInsert`] for the conflict split.
  fn insert_certificate(
    &self,
    input: NewCertificate,
  ) -> impl Future<Output = Result<CertificateInsert, Self::Error>> + Send + '_;

  /// The (learner, course) certificate, if issued.
  fn get_certificate(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Option<Certificate>, Self::Error>> + Send + '_;

  /// Retrieve a certificate by id.
  fn get_certificate_by_id(
    &self,
    certificate_id: Uuid,
  ) -> impl Future<Output = Result<Option<Certificate>, Self::Error>> + Send + '_;

  /// Retrieve a certificate by its human-readable reference.
  fn get_certificate_by_reference<'a>(
    &'a self,
    reference: &'a str,
  ) -> impl Future<Output = Result<Option<Certificate>, Self::Error>> + Send + 'a;

  /// Persist `completion_hash`, `blockchain_tx_id`, and `is_approved = true`
  /// in one guarded update. Returns `false` when the certificate was already
  /// approved (the update matched no row), leaving the prior state intact.
  fn record_approval<'a>(
    &'a self,
    certificate_id: Uuid,
    completion_hash: &'a str,
    blockchain_tx_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
