//! Server-rendered HTML pages.
//!
//! Every page that needs a signed-in caller takes a [`PageSession`], which
//! redirects anonymous visitors to `/auth` instead of answering 401.

pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod landing;
pub mod situation;
pub mod submit;

use askama::Template;
use axum::{
  Router,
  extract::FromRequestParts,
  http::{StatusCode, request::Parts},
  response::{Html, IntoResponse, Redirect, Response},
  routing::{get, post},
};
use relsync_api::{ApiError, AppState, Session, auth::resolve_session};
use relsync_core::{analysis::Analyzer, store::RelationStore};
use thiserror::Error;

pub fn routes<S, A>() -> Router<AppState<S, A>>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  Router::new()
    .route("/", get(landing::index))
    .route("/auth", get(auth::form).post(auth::submit::<S, A>))
    .route("/signout", post(auth::signout::<S, A>))
    .route("/dashboard", get(dashboard::show::<S, A>))
    .route("/dashboard/link-partner", post(dashboard::link_partner::<S, A>))
    .route("/submit", get(submit::form).post(submit::submit::<S, A>))
    .route("/situation/{id}", get(situation::show::<S, A>))
    .route("/analytics", get(analytics::show::<S, A>))
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A failure no page can recover from. Validation problems never get here;
/// they are rendered back to the user as a toast.
#[derive(Debug, Error)]
pub enum PageError {
  #[error("template error: {0}")]
  Render(#[from] askama::Error),

  #[error(transparent)]
  Api(#[from] ApiError),
}

impl IntoResponse for PageError {
  fn into_response(self) -> Response {
    tracing::error!(error = %self, "page failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
  }
}

pub fn render(template: &impl Template) -> Result<Html<String>, PageError> {
  Ok(Html(template.render()?))
}

// ─── Toasts ──────────────────────────────────────────────────────────────────

/// One-shot notice shown at the top of a rendered page.
#[derive(Debug, Clone)]
pub struct Toast {
  pub title:       String,
  pub description: String,
  pub destructive: bool,
}

impl Toast {
  pub fn info(title: &str, description: impl Into<String>) -> Self {
    Self {
      title:       title.to_owned(),
      description: description.into(),
      destructive: false,
    }
  }

  pub fn error(title: &str, description: impl Into<String>) -> Self {
    Self {
      title:       title.to_owned(),
      description: description.into(),
      destructive: true,
    }
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Signed-in caller for page handlers.
pub struct PageSession(pub Session);

impl<S, A> FromRequestParts<AppState<S, A>> for PageSession
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  type Rejection = Response;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, A>,
  ) -> Result<Self, Self::Rejection> {
    match resolve_session(state.store.as_ref(), &parts.headers).await {
      Ok(Some(session)) => Ok(PageSession(session)),
      Ok(None) => Err(Redirect::to("/auth").into_response()),
      Err(e) => Err(PageError::from(e).into_response()),
    }
  }
}

/// `YYYY-MM-DD`, as shown in lists and headings.
pub fn short_date(at: chrono::DateTime<chrono::Utc>) -> String {
  at.format("%Y-%m-%d").to_string()
}
