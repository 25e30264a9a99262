//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use praxis_core::{
  catalog::{NewCourse, NewLesson},
  certificate::NewCertificate,
  enrollment::EnrollmentStatus,
  progress::{ProgressKey, VideoTick},
  store::{CertificateInsert, LearningStore},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

struct Fixture {
  store:   SqliteStore,
  learner: Uuid,
  key:     ProgressKey,
}

/// One course with one lesson and an enrolled learner.
async fn fixture() -> Fixture {
  let s = store().await;
  let learner = Uuid::new_v4();

  let course = s
    .add_course(NewCourse {
      title:         "Rust for Practitioners".into(),
      instructor_id: Uuid::new_v4(),
    })
    .await
    .unwrap();

  let lesson = s
    .add_lesson(NewLesson {
      course_id: course.course_id,
      title:     "Ownership".into(),
      is_free:   false,
      sequence:  1,
    })
    .await
    .unwrap();

  let enrollment = s
    .create_enrollment(learner, course.course_id)
    .await
    .unwrap();

  Fixture {
    store: s,
    learner,
    key: ProgressKey {
      learner_id:    learner,
      course_id:     course.course_id,
      lesson_id:     lesson.lesson_id,
      enrollment_id: enrollment.enrollment_id,
    },
  }
}

fn tick(current_time: f64, duration: f64) -> VideoTick {
  let pct = if duration > 0.0 {
    ((current_time / duration) * 100.0).round().clamp(0.0, 100.0) as u8
  } else {
    0
  };
  VideoTick {
    current_time,
    duration,
    watched_percentage: pct,
    completed: pct >= 95,
    quality: None,
    subtitles_enabled: false,
    watch_rate: 1.0,
  }
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_course_and_lesson() {
  let f = fixture().await;

  let course = f.store.get_course(f.key.course_id).await.unwrap().unwrap();
  assert_eq!(course.title, "Rust for Practitioners");

  let lesson = f.store.get_lesson(f.key.lesson_id).await.unwrap().unwrap();
  assert_eq!(lesson.course_id, f.key.course_id);
  assert!(!lesson.is_free);
}

#[tokio::test]
async fn get_lesson_missing_returns_none() {
  let s = store().await;
  assert!(s.get_lesson(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_lessons_free_only_filters() {
  let f = fixture().await;
  f.store
    .add_lesson(NewLesson {
      course_id: f.key.course_id,
      title:     "Intro".into(),
      is_free:   true,
      sequence:  0,
    })
    .await
    .unwrap();

  let all = f.store.list_lessons(f.key.course_id, false).await.unwrap();
  assert_eq!(all.len(), 2);
  // Free lessons sort first here because of their sequence.
  assert_eq!(all[0].title, "Intro");

  let free = f.store.list_lessons(f.key.course_id, true).await.unwrap();
  assert_eq!(free.len(), 1);
  assert!(free[0].is_free);
}

#[tokio::test]
async fn delete_lesson_cascades_progress_and_history() {
  let f = fixture().await;
  f.store
    .apply_video_tick(f.key, tick(120.0, 120.0))
    .await
    .unwrap();
  f.store
    .upsert_video_history(
      f.learner,
      f.key.lesson_id,
      f.key.course_id,
      &tick(120.0, 120.0),
    )
    .await
    .unwrap();

  assert!(f.store.delete_lesson(f.key.lesson_id).await.unwrap());

  assert!(
    f.store
      .get_progress(f.learner, f.key.lesson_id)
      .await
      .unwrap()
      .is_none()
  );
  assert!(
    f.store
      .get_video_history(f.learner, f.key.lesson_id)
      .await
      .unwrap()
      .is_none()
  );
}

// ─── Enrollments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_enrollment_is_idempotent() {
  let f = fixture().await;

  let again = f
    .store
    .create_enrollment(f.learner, f.key.course_id)
    .await
    .unwrap();
  assert_eq!(again.enrollment_id, f.key.enrollment_id);

  let listed = f.store.list_enrollments(f.learner).await.unwrap();
  assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn update_enrollment_progress_roundtrip() {
  let f = fixture().await;

  f.store
    .update_enrollment_progress(
      f.learner,
      f.key.course_id,
      75,
      EnrollmentStatus::Active,
    )
    .await
    .unwrap();

  let enrollment = f
    .store
    .find_enrollment(f.learner, f.key.course_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(enrollment.progress_percent, 75);
  assert_eq!(enrollment.status, EnrollmentStatus::Active);
}

#[tokio::test]
async fn update_enrollment_progress_without_enrollment_fails() {
  let f = fixture().await;
  let err = f
    .store
    .update_enrollment_progress(
      Uuid::new_v4(),
      f.key.course_id,
      10,
      EnrollmentStatus::Active,
    )
    .await;
  assert!(err.is_err());
}

// ─── Video ticks ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn video_tick_creates_progress_lazily() {
  let f = fixture().await;

  assert!(
    f.store
      .get_progress(f.learner, f.key.lesson_id)
      .await
      .unwrap()
      .is_none()
  );

  let progress = f
    .store
    .apply_video_tick(f.key, tick(60.0, 120.0))
    .await
    .unwrap();
  assert_eq!(progress.video_progress.watched_percentage, 50);
  assert!(!progress.is_completed);
  assert!(progress.completed_at.is_none());
}

#[tokio::test]
async fn video_tick_at_threshold_completes() {
  let f = fixture().await;

  let progress = f
    .store
    .apply_video_tick(f.key, tick(120.0, 120.0))
    .await
    .unwrap();
  assert_eq!(progress.video_progress.watched_percentage, 100);
  assert!(progress.is_completed);
  assert!(progress.completed_at.is_some());
}

#[tokio::test]
async fn completion_is_sticky_across_lower_ticks() {
  let f = fixture().await;

  let completed = f
    .store
    .apply_video_tick(f.key, tick(120.0, 120.0))
    .await
    .unwrap();
  let completed_at = completed.completed_at;

  // Seeking back to the start must not revert completion.
  let after_seek = f
    .store
    .apply_video_tick(f.key, tick(5.0, 120.0))
    .await
    .unwrap();
  assert!(after_seek.is_completed);
  assert_eq!(after_seek.completed_at, completed_at);
  assert_eq!(after_seek.video_progress.watched_percentage, 4);
}

// ─── Quiz results ────────────────────────────────────────────────────────────

#[tokio::test]
async fn quiz_overwrites_score_and_counts_attempts() {
  let f = fixture().await;

  let first = f.store.apply_quiz_result(f.key, 65, false).await.unwrap();
  assert_eq!(first.quiz_score, Some(65));
  assert!(!first.quiz_passed);
  assert!(!first.is_completed);
  assert_eq!(first.quiz_attempts, 1);

  let second = f.store.apply_quiz_result(f.key, 85, true).await.unwrap();
  assert_eq!(second.quiz_score, Some(85));
  assert!(second.quiz_passed);
  assert!(second.is_completed);
  assert_eq!(second.quiz_attempts, 2);
}

#[tokio::test]
async fn failed_retake_does_not_revoke_completion() {
  let f = fixture().await;

  f.store.apply_quiz_result(f.key, 90, true).await.unwrap();
  let retake = f.store.apply_quiz_result(f.key, 40, false).await.unwrap();

  assert_eq!(retake.quiz_score, Some(40));
  assert!(!retake.quiz_passed);
  assert!(retake.is_completed, "completion must survive a failed retake");
  assert_eq!(retake.quiz_attempts, 2);
}

// ─── Explicit completion ─────────────────────────────────────────────────────

#[tokio::test]
async fn set_and_clear_lesson_complete() {
  let f = fixture().await;

  let set = f.store.set_lesson_complete(f.key).await.unwrap();
  assert!(set.is_completed);
  assert!(set.completed_at.is_some());

  let cleared = f.store.clear_lesson_complete(f.key).await.unwrap().unwrap();
  assert!(!cleared.is_completed);
  assert!(cleared.completed_at.is_none());
}

#[tokio::test]
async fn clear_without_progress_is_none() {
  let f = fixture().await;
  assert!(f.store.clear_lesson_complete(f.key).await.unwrap().is_none());
}

#[tokio::test]
async fn completed_lesson_count_counts_only_completed() {
  let f = fixture().await;
  let second_lesson = f
    .store
    .add_lesson(NewLesson {
      course_id: f.key.course_id,
      title:     "Borrowing".into(),
      is_free:   false,
      sequence:  2,
    })
    .await
    .unwrap();

  f.store.set_lesson_complete(f.key).await.unwrap();
  f.store
    .apply_video_tick(
      ProgressKey {
        lesson_id: second_lesson.lesson_id,
        ..f.key
      },
      tick(10.0, 120.0),
    )
    .await
    .unwrap();

  let count = f
    .store
    .completed_lesson_count(f.learner, f.key.course_id)
    .await
    .unwrap();
  assert_eq!(count, 1);
}

// ─── Video history ───────────────────────────────────────────────────────────

#[tokio::test]
async fn history_upsert_and_resume_ordering() {
  let f = fixture().await;
  let second_lesson = f
    .store
    .add_lesson(NewLesson {
      course_id: f.key.course_id,
      title:     "Borrowing".into(),
      is_free:   false,
      sequence:  2,
    })
    .await
    .unwrap();

  f.store
    .upsert_video_history(
      f.learner,
      f.key.lesson_id,
      f.key.course_id,
      &tick(30.0, 120.0),
    )
    .await
    .unwrap();
  // Ensure a strictly later last_watched_at for the second lesson.
  tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  f.store
    .upsert_video_history(
      f.learner,
      second_lesson.lesson_id,
      f.key.course_id,
      &tick(10.0, 300.0),
    )
    .await
    .unwrap();

  let latest = f
    .store
    .latest_video_history(f.learner, f.key.course_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(latest.lesson_id, second_lesson.lesson_id);
  assert_eq!(latest.current_time, 10.0);
}

#[tokio::test]
async fn history_keeps_creation_settings_on_update() {
  let f = fixture().await;

  let mut first = tick(30.0, 120.0);
  first.quality = Some("1080p".into());
  first.subtitles_enabled = true;
  f.store
    .upsert_video_history(f.learner, f.key.lesson_id, f.key.course_id, &first)
    .await
    .unwrap();

  let updated = f
    .store
    .upsert_video_history(
      f.learner,
      f.key.lesson_id,
      f.key.course_id,
      &tick(60.0, 120.0),
    )
    .await
    .unwrap();

  assert_eq!(updated.current_time, 60.0);
  assert_eq!(updated.quality, "1080p");
  assert!(updated.subtitles_enabled);
}

// ─── Certificates ────────────────────────────────────────────────────────────

fn new_certificate(f: &Fixture, reference: &str) -> NewCertificate {
  NewCertificate {
    certificate_reference: reference.to_owned(),
    learner_id:            f.learner,
    course_id:             f.key.course_id,
    enrollment_id:         f.key.enrollment_id,
    student_name:          "Alice Liddell".into(),
    course_name:           "Rust for Practitioners".into(),
    completion_date:       Utc::now(),
  }
}

#[tokio::test]
async fn certificate_insert_and_duplicate_pair_detected() {
  let f = fixture().await;

  let first = f
    .store
    .insert_certificate(new_certificate(&f, "CERT-2026-111111"))
    .await
    .unwrap();
  let created = match first {
    CertificateInsert::Created(c) => c,
    other => panic!("expected Created, got {other:?}"),
  };

  let second = f
    .store
    .insert_certificate(new_certificate(&f, "CERT-2026-222222"))
    .await
    .unwrap();
  match second {
    CertificateInsert::AlreadyIssued(c) => {
      assert_eq!(c.certificate_id, created.certificate_id);
      assert_eq!(c.certificate_reference, "CERT-2026-111111");
    }
    other => panic!("expected AlreadyIssued, got {other:?}"),
  }
}

#[tokio::test]
async fn certificate_reference_collision_detected() {
  let f = fixture().await;
  let other_learner = Uuid::new_v4();
  f.store
    .create_enrollment(other_learner, f.key.course_id)
    .await
    .unwrap();

  f.store
    .insert_certificate(new_certificate(&f, "CERT-2026-333333"))
    .await
    .unwrap();

  let mut colliding = new_certificate(&f, "CERT-2026-333333");
  colliding.learner_id = other_learner;
  colliding.enrollment_id = f
    .store
    .find_enrollment(other_learner, f.key.course_id)
    .await
    .unwrap()
    .unwrap()
    .enrollment_id;

  match f.store.insert_certificate(colliding).await.unwrap() {
    CertificateInsert::ReferenceCollision => {}
    other => panic!("expected ReferenceCollision, got {other:?}"),
  }
}

#[tokio::test]
async fn record_approval_is_first_writer_wins() {
  let f = fixture().await;

  let cert = match f
    .store
    .insert_certificate(new_certificate(&f, "CERT-2026-444444"))
    .await
    .unwrap()
  {
    CertificateInsert::Created(c) => c,
    other => panic!("expected Created, got {other:?}"),
  };

  let first = f
    .store
    .record_approval(cert.certificate_id, "hash-a", "tx-a")
    .await
    .unwrap();
  assert!(first);

  let second = f
    .store
    .record_approval(cert.certificate_id, "hash-b", "tx-b")
    .await
    .unwrap();
  assert!(!second, "second approval must not overwrite the first");

  let stored = f
    .store
    .get_certificate_by_id(cert.certificate_id)
    .await
    .unwrap()
    .unwrap();
  assert!(stored.is_approved);
  assert_eq!(stored.completion_hash.as_deref(), Some("hash-a"));
  assert_eq!(stored.blockchain_tx_id.as_deref(), Some("tx-a"));
}

#[tokio::test]
async fn get_certificate_by_reference_roundtrip() {
  let f = fixture().await;
  f.store
    .insert_certificate(new_certificate(&f, "CERT-2026-555555"))
    .await
    .unwrap();

  let found = f
    .store
    .get_certificate_by_reference("CERT-2026-555555")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.student_name, "Alice Liddell");
  assert!(!found.is_approved);

  assert!(
    f.store
      .get_certificate_by_reference("CERT-2026-000000")
      .await
      .unwrap()
      .is_none()
  );
}
