//! JSON API for RelationSync.
//!
//! Exposes an axum [`Router`] backed by any [`RelationStore`] and
//! [`Analyzer`]. The partner-link and analysis functions live under
//! `/functions` with permissive CORS; accounts, situations and analytics sit
//! beside them.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", relsync_api::api_router(state.clone()))
//! ```

pub mod analytics;
pub mod analyze;
pub mod auth;
pub mod cors;
pub mod error;
pub mod partners;
pub mod situations;


use std::sync::Arc;

use axum::{
  Router, middleware,
  routing::{get, post},
};
use chrono::Duration;
use relsync_core::{analysis::Analyzer, store::RelationStore};

pub use auth::Session;
pub use error::ApiError;

// ─── Sessions ────────────────────────────────────────────────────────────────

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 168;

/// How issued sessions behave.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
  pub ttl:           Duration,
  /// Mark the session cookie `Secure`. Enable when served over HTTPS.
  pub secure_cookie: bool,
}

impl Default for SessionPolicy {
  fn default() -> Self {
    Self {
      ttl:           Duration::hours(DEFAULT_SESSION_TTL_HOURS),
      secure_cookie: false,
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through the API and page handlers.
pub struct AppState<S, A> {
  pub store:    Arc<S>,
  pub analyzer: Arc<A>,
  pub sessions: SessionPolicy,
}

impl<S, A> AppState<S, A> {
  pub fn new(store: Arc<S>, analyzer: Arc<A>, sessions: SessionPolicy) -> Self {
    Self { store, analyzer, sessions }
  }
}

// Derived `Clone` would demand `S: Clone` and `A: Clone`.
impl<S, A> Clone for AppState<S, A> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      analyzer: Arc::clone(&self.analyzer),
      sessions: self.sessions,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, A>(state: AppState<S, A>) -> Router<()>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  let functions = Router::new()
    .route(
      "/link-partner",
      post(partners::link::<S, A>).options(cors::preflight),
    )
    .route(
      "/analyze-situation",
      post(analyze::handler::<S, A>).options(cors::preflight),
    )
    .layer(middleware::map_response(cors::with_cors_headers));

  Router::new()
    .nest("/functions", functions)
    // Accounts
    .route("/auth/signup", post(auth::signup::<S, A>))
    .route("/auth/signin", post(auth::signin::<S, A>))
    .route("/auth/signout", post(auth::signout::<S, A>))
    .route("/auth/me", get(auth::me))
    // Situations
    .route(
      "/situations",
      get(situations::list::<S, A>).post(situations::create::<S, A>),
    )
    .route("/situations/{id}", get(situations::get_one::<S, A>))
    // Analytics
    .route("/analytics", get(analytics::summary::<S, A>))
    .with_state(state)
}
