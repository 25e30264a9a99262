//! JSON REST API for Praxis.
//!
//! Exposes an axum [`Router`] backed by any [`praxis_core::store::LearningStore`]
//! and [`praxis_core::ledger::LedgerAnchor`]. Authentication is the caller's
//! responsibility: a gateway asserts the verified identity via `x-learner-*`
//! headers (see [`identity`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", praxis_api::api_router(store.clone(), ledger.clone()))
//! ```

pub mod catalog;
pub mod certificates;
pub mod enrollments;
pub mod error;
pub mod identity;
pub mod progress;
pub mod video;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post, put},
};
use praxis_core::{ledger::LedgerAnchor, store::LearningStore};

pub use error::ApiError;
pub use identity::Caller;

/// Shared handler state: the storage backend and the anchoring ledger.
pub struct AppState<S, L> {
  pub store:  Arc<S>,
  pub ledger: Arc<L>,
}

impl<S, L> Clone for AppState<S, L> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      ledger: Arc::clone(&self.ledger),
    }
  }
}

/// Build a fully-materialised API router for `store` and `ledger`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, L>(store: Arc<S>, ledger: Arc<L>) -> Router<()>
where
  S: LearningStore + 'static,
  L: LedgerAnchor + 'static,
{
  Router::new()
    // Catalog
    .route("/courses", post(catalog::create_course::<S, L>))
    .route(
      "/courses/{course_id}/lessons",
      get(catalog::list_lessons::<S, L>).post(catalog::create_lesson::<S, L>),
    )
    .route(
      "/lessons/{lesson_id}",
      get(catalog::get_lesson::<S, L>).delete(catalog::delete_lesson::<S, L>),
    )
    // Enrollments
    .route("/enrollments/{course_id}", post(enrollments::enroll::<S, L>))
    .route("/dashboard", get(enrollments::dashboard::<S, L>))
    // Video tracking
    .route("/video/{lesson_id}/playback", put(video::playback::<S, L>))
    .route("/video/{lesson_id}/progress", get(video::lesson_resume::<S, L>))
    .route("/resume/{course_id}", get(video::course_resume::<S, L>))
    // Quiz and completion
    .route("/quiz/{lesson_id}/submit", post(progress::submit_quiz::<S, L>))
    .route(
      "/progress/complete/{lesson_id}",
      post(progress::mark_complete::<S, L>),
    )
    .route(
      "/progress/incomplete/{lesson_id}",
      put(progress::mark_incomplete::<S, L>),
    )
    .route(
      "/progress/course/{course_id}",
      get(progress::course_progress::<S, L>),
    )
    // Certificates
    .route(
      "/certificate/{course_id}",
      get(certificates::own_certificate::<S, L>),
    )
    .route(
      "/certificates/approve/{certificate_id}",
      patch(certificates::approve::<S, L>),
    )
    .route(
      "/certificates/verify/{reference}",
      get(certificates::verify::<S, L>),
    )
    .with_state(AppState { store, ledger })
}
