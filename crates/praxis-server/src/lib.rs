//! HTTP server assembly for Praxis.
//!
//! Wires the JSON API from `praxis-api` to the SQLite store and the
//! anchoring ledger, and adds request tracing. The binary in `main.rs`
//! handles configuration and startup.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use praxis_core::{ledger::LedgerAnchor, store::LearningStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// `PRAXIS_*` environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn app<S, L>(store: Arc<S>, ledger: Arc<L>) -> Router
where
  S: LearningStore + 'static,
  L: LedgerAnchor + 'static,
{
  Router::new()
    .merge(praxis_api::api_router(store, ledger))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
  };
  use praxis_engine::ledger::SimulatedLedger;
  use praxis_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::app;

  async fn make_app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    app(Arc::new(store), Arc::new(SimulatedLedger))
  }

  struct User {
    id:   Uuid,
    name: &'static str,
    role: &'static str,
  }

  fn student() -> User {
    User { id: Uuid::new_v4(), name: "Alice Liddell", role: "student" }
  }

  fn instructor() -> User {
    User { id: Uuid::new_v4(), name: "Charles Dodgson", role: "instructor" }
  }

  fn admin() -> User {
    User { id: Uuid::new_v4(), name: "The Queen", role: "admin" }
  }

  /// Send one request as `user` and return (status, parsed JSON body).
  async fn call(
    app: &Router,
    user: Option<&User>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(u) = user {
      builder = builder
        .header("x-learner-id", u.id.to_string())
        .header("x-learner-name", u.name)
        .header("x-role", u.role);
    }
    let req = match body {
      Some(v) => builder
        .header("content-type", "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  /// Create a course with `lesson_count` paid lessons; returns
  /// (course_id, lesson_ids).
  async fn seed_course(
    app: &Router,
    teacher: &User,
    lesson_count: usize,
  ) -> (String, Vec<String>) {
    let (status, course) = call(
      app,
      Some(teacher),
      "POST",
      "/courses",
      Some(json!({ "title": "Systems Programming" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let course_id = course["course_id"].as_str().unwrap().to_owned();

    let mut lesson_ids = Vec::new();
    for i in 0..lesson_count {
      let (status, lesson) = call(
        app,
        Some(teacher),
        "POST",
        &format!("/courses/{course_id}/lessons"),
        Some(json!({ "title": format!("Lesson {i}"), "sequence": i })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
      lesson_ids.push(lesson["lesson_id"].as_str().unwrap().to_owned());
    }
    (course_id, lesson_ids)
  }

  async fn enroll(app: &Router, user: &User, course_id: &str) {
    let (status, _) = call(
      app,
      Some(user),
      "POST",
      &format!("/enrollments/{course_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  // ── Identity ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_identity_headers_is_401() {
    let app = make_app().await;
    let (status, body) = call(&app, None, "GET", "/dashboard", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("x-learner-id"));
  }

  #[tokio::test]
  async fn verify_endpoint_needs_no_identity() {
    let app = make_app().await;
    let (status, _) =
      call(&app, None, "GET", "/certificates/verify/CERT-2026-000000", None)
        .await;
    // 404 — unknown reference — rather than 401.
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Catalog ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn students_cannot_create_courses() {
    let app = make_app().await;
    let (status, _) = call(
      &app,
      Some(&student()),
      "POST",
      "/courses",
      Some(json!({ "title": "Nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn unenrolled_students_see_free_lessons_only() {
    let app = make_app().await;
    let teacher = instructor();
    let (course_id, _) = seed_course(&app, &teacher, 2).await;
    let (status, free_lesson) = call(
      &app,
      Some(&teacher),
      "POST",
      &format!("/courses/{course_id}/lessons"),
      Some(json!({ "title": "Teaser", "is_free": true, "sequence": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let browser = student();
    let (status, listing) = call(
      &app,
      Some(&browser),
      "GET",
      &format!("/courses/{course_id}/lessons"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["is_enrolled"], json!(false));
    assert_eq!(listing["lessons"].as_array().unwrap().len(), 1);

    // A paid lesson is off-limits until enrollment.
    let paid_id = {
      let (_, full) = call(
        &app,
        Some(&teacher),
        "GET",
        &format!("/courses/{course_id}/lessons"),
        None,
      )
      .await;
      full["lessons"][0]["lesson_id"].as_str().unwrap().to_owned()
    };
    let (status, _) = call(
      &app,
      Some(&browser),
      "GET",
      &format!("/lessons/{paid_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Free lessons are open to anyone.
    let free_id = free_lesson["lesson_id"].as_str().unwrap();
    let (status, _) = call(
      &app,
      Some(&browser),
      "GET",
      &format!("/lessons/{free_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    enroll(&app, &browser, &course_id).await;
    let (_, listing) = call(
      &app,
      Some(&browser),
      "GET",
      &format!("/courses/{course_id}/lessons"),
      None,
    )
    .await;
    assert_eq!(listing["is_enrolled"], json!(true));
    assert_eq!(listing["lessons"].as_array().unwrap().len(), 3);
  }

  // ── Completion and aggregation ──────────────────────────────────────────

  #[tokio::test]
  async fn four_lesson_course_progress_and_certificate() {
    let app = make_app().await;
    let (course_id, lessons) = seed_course(&app, &instructor(), 4).await;
    let learner = student();
    enroll(&app, &learner, &course_id).await;

    for lesson_id in &lessons[..3] {
      let (status, _) = call(
        &app,
        Some(&learner),
        "POST",
        &format!("/progress/complete/{lesson_id}"),
        None,
      )
      .await;
      assert_eq!(status, StatusCode::OK);
    }

    let (status, progress) = call(
      &app,
      Some(&learner),
      "GET",
      &format!("/progress/course/{course_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["progress_percent"], json!(75));
    assert_eq!(progress["status"], json!("active"));

    // No certificate below 100%.
    let (status, _) = call(
      &app,
      Some(&learner),
      "GET",
      &format!("/certificate/{course_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
      &app,
      Some(&learner),
      "POST",
      &format!("/progress/complete/{}", lessons[3]),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, progress) = call(
      &app,
      Some(&learner),
      "GET",
      &format!("/progress/course/{course_id}"),
      None,
    )
    .await;
    assert_eq!(progress["progress_percent"], json!(100));
    assert_eq!(progress["status"], json!("completed"));

    let (status, cert) = call(
      &app,
      Some(&learner),
      "GET",
      &format!("/certificate/{course_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reference = cert["certificate_reference"].as_str().unwrap();
    assert!(reference.starts_with("CERT-"), "reference: {reference}");
    assert_eq!(cert["student_name"], json!("Alice Liddell"));
    assert_eq!(cert["is_approved"], json!(false));

    // Public verification by reference.
    let (status, verified) = call(
      &app,
      None,
      "GET",
      &format!("/certificates/verify/{reference}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["course_name"], json!("Systems Programming"));
    assert_eq!(verified["is_approved"], json!(false));
  }

  #[tokio::test]
  async fn mark_incomplete_rolls_progress_back() {
    let app = make_app().await;
    let (course_id, lessons) = seed_course(&app, &instructor(), 2).await;
    let learner = student();
    enroll(&app, &learner, &course_id).await;

    for lesson_id in &lessons {
      call(
        &app,
        Some(&learner),
        "POST",
        &format!("/progress/complete/{lesson_id}"),
        None,
      )
      .await;
    }

    let (status, outcome) = call(
      &app,
      Some(&learner),
      "PUT",
      &format!("/progress/incomplete/{}", lessons[0]),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], json!("cleared"));
    assert_eq!(outcome["is_completed"], json!(false));

    let (_, progress) = call(
      &app,
      Some(&learner),
      "GET",
      &format!("/progress/course/{course_id}"),
      None,
    )
    .await;
    assert_eq!(progress["progress_percent"], json!(50));
    assert_eq!(progress["status"], json!("active"));
  }

  // ── Video tracking ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn playback_crosses_threshold_and_completes_course() {
    let app = make_app().await;
    let (course_id, lessons) = seed_course(&app, &instructor(), 1).await;
    let learner = student();
    enroll(&app, &learner, &course_id).await;
    let lesson_id = &lessons[0];

    let (status, outcome) = call(
      &app,
      Some(&learner),
      "PUT",
      &format!("/video/{lesson_id}/playback"),
      Some(json!({ "current_time": 60.0, "duration": 120.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
      outcome["progress"]["video_progress"]["watched_percentage"],
      json!(50)
    );
    assert_eq!(outcome["newly_completed"], json!(false));

    let (_, outcome) = call(
      &app,
      Some(&learner),
      "PUT",
      &format!("/video/{lesson_id}/playback"),
      Some(json!({ "current_time": 120.0, "duration": 120.0 })),
    )
    .await;
    assert_eq!(outcome["newly_completed"], json!(true));

    let (_, progress) = call(
      &app,
      Some(&learner),
      "GET",
      &format!("/progress/course/{course_id}"),
      None,
    )
    .await;
    assert_eq!(progress["progress_percent"], json!(100));

    // Resume endpoints reflect the last tick.
    let (_, resume) = call(
      &app,
      Some(&learner),
      "GET",
      &format!("/video/{lesson_id}/progress"),
      None,
    )
    .await;
    assert_eq!(resume["kind"], json!("lesson"));
    assert_eq!(resume["current_time"], json!(120.0));

    let (_, resume) = call(
      &app,
      Some(&learner),
      "GET",
      &format!("/resume/{course_id}"),
      None,
    )
    .await;
    assert_eq!(resume["lesson_id"].as_str().unwrap(), lesson_id);
  }

  #[tokio::test]
  async fn resume_is_from_start_without_history() {
    let app = make_app().await;
    let (course_id, _) = seed_course(&app, &instructor(), 1).await;
    let learner = student();
    enroll(&app, &learner, &course_id).await;

    let (status, resume) = call(
      &app,
      Some(&learner),
      "GET",
      &format!("/resume/{course_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resume["kind"], json!("from_start"));
  }

  // ── Quiz ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn quiz_pass_after_fail_counts_attempts() {
    let app = make_app().await;
    let (course_id, lessons) = seed_course(&app, &instructor(), 1).await;
    let learner = student();
    enroll(&app, &learner, &course_id).await;
    let lesson_id = &lessons[0];

    let (status, progress) = call(
      &app,
      Some(&learner),
      "POST",
      &format!("/quiz/{lesson_id}/submit"),
      Some(json!({ "score": 65 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["quiz_score"], json!(65));
    assert_eq!(progress["quiz_passed"], json!(false));
    assert_eq!(progress["quiz_attempts"], json!(1));
    assert_eq!(progress["is_completed"], json!(false));

    let (_, progress) = call(
      &app,
      Some(&learner),
      "POST",
      &format!("/quiz/{lesson_id}/submit"),
      Some(json!({ "score": 85 })),
    )
    .await;
    assert_eq!(progress["quiz_score"], json!(85));
    assert_eq!(progress["quiz_passed"], json!(true));
    assert_eq!(progress["quiz_attempts"], json!(2));
    assert_eq!(progress["is_completed"], json!(true));
  }

  #[tokio::test]
  async fn out_of_range_score_is_400() {
    let app = make_app().await;
    let (course_id, lessons) = seed_course(&app, &instructor(), 1).await;
    let learner = student();
    enroll(&app, &learner, &course_id).await;

    let (status, _) = call(
      &app,
      Some(&learner),
      "POST",
      &format!("/quiz/{}/submit", lessons[0]),
      Some(json!({ "score": 150 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Approval ────────────────────────────────────────────────────────────

  /// Complete a one-lesson course and return the issued certificate id.
  async fn earn_certificate(app: &Router, learner: &User) -> (String, String) {
    let (course_id, lessons) = seed_course(app, &instructor(), 1).await;
    enroll(app, learner, &course_id).await;
    call(
      app,
      Some(learner),
      "POST",
      &format!("/progress/complete/{}", lessons[0]),
      None,
    )
    .await;

    let (status, cert) = call(
      app,
      Some(learner),
      "GET",
      &format!("/certificate/{course_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
      cert["certificate_id"].as_str().unwrap().to_owned(),
      cert["certificate_reference"].as_str().unwrap().to_owned(),
    )
  }

  #[tokio::test]
  async fn only_admins_approve() {
    let app = make_app().await;
    let learner = student();
    let (cert_id, _) = earn_certificate(&app, &learner).await;

    let (status, _) = call(
      &app,
      Some(&learner),
      "PATCH",
      &format!("/certificates/approve/{cert_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn approval_is_idempotent_and_anchors_once() {
    let app = make_app().await;
    let learner = student();
    let (cert_id, reference) = earn_certificate(&app, &learner).await;
    let boss = admin();

    let (status, outcome) = call(
      &app,
      Some(&boss),
      "PATCH",
      &format!("/certificates/approve/{cert_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], json!("approved"));
    assert_eq!(outcome["is_approved"], json!(true));
    let hash = outcome["completion_hash"].as_str().unwrap().to_owned();
    let tx_id = outcome["blockchain_tx_id"].as_str().unwrap().to_owned();
    assert_eq!(hash.len(), 64);

    let (status, again) = call(
      &app,
      Some(&boss),
      "PATCH",
      &format!("/certificates/approve/{cert_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["outcome"], json!("already_approved"));
    assert_eq!(again["completion_hash"], json!(hash));
    assert_eq!(again["blockchain_tx_id"], json!(tx_id));

    // Verification now reports the anchoring.
    let (_, verified) = call(
      &app,
      None,
      "GET",
      &format!("/certificates/verify/{reference}"),
      None,
    )
    .await;
    assert_eq!(verified["is_approved"], json!(true));
    assert_eq!(verified["blockchain_tx_id"], json!(tx_id));
  }

  #[tokio::test]
  async fn approving_unknown_certificate_is_404() {
    let app = make_app().await;
    let (status, _) = call(
      &app,
      Some(&admin()),
      "PATCH",
      &format!("/certificates/approve/{}", Uuid::new_v4()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
