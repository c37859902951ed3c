//! `GET /dashboard` and the partner-link form it hosts.

use askama::Template;
use axum::{Form, extract::State, response::Html};
use relsync_api::{
  ApiError, AppState,
  partners,
  situations::{RECENT_SITUATIONS, recent},
};
use relsync_core::{
  analysis::Analyzer,
  profile::Profile,
  situation::Situation,
  store::RelationStore,
};
use serde::Deserialize;

use super::{PageError, PageSession, Toast, render, short_date};

pub struct SituationRow {
  pub id:    String,
  pub title: String,
  pub date:  String,
}

impl From<Situation> for SituationRow {
  fn from(s: Situation) -> Self {
    Self {
      id:    s.id.to_string(),
      title: s.title,
      date:  short_date(s.created_at),
    }
  }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
  pub email:      String,
  pub linked:     bool,
  pub situations: Vec<SituationRow>,
  pub toast:      Option<Toast>,
}

async fn page<S>(
  store: &S,
  profile: Profile,
  toast: Option<Toast>,
) -> Result<Html<String>, PageError>
where
  S: RelationStore,
{
  let situations = recent(store, &profile, RECENT_SITUATIONS)
    .await?
    .into_iter()
    .map(SituationRow::from)
    .collect();

  render(&DashboardPage {
    linked: profile.is_linked(),
    email: profile.email,
    situations,
    toast,
  })
}

/// `GET /dashboard`
pub async fn show<S, A>(
  State(state): State<AppState<S, A>>,
  PageSession(session): PageSession,
) -> Result<Html<String>, PageError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  page(state.store.as_ref(), session.profile, None).await
}

#[derive(Debug, Deserialize)]
pub struct LinkForm {
  #[serde(default)]
  pub partner_email: String,
}

/// `POST /dashboard/link-partner`
pub async fn link_partner<S, A>(
  State(state): State<AppState<S, A>>,
  PageSession(session): PageSession,
  Form(form): Form<LinkForm>,
) -> Result<Html<String>, PageError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  let store = state.store.as_ref();
  let email = form.partner_email.trim();

  if email.is_empty() {
    let toast = Toast::error(
      "Email required",
      "Please enter your partner's email address.",
    );
    return page(store, session.profile, Some(toast)).await;
  }

  let toast = match partners::link_partner(store, &session.profile, email).await {
    Ok(_) => Toast::info("Partner linked!", format!("Successfully linked with {email}")),
    Err(ApiError::NotFound(_)) => Toast::info(
      "Partner not found",
      "No account with that email. Ask them to sign up or continue solo.",
    ),
    Err(ApiError::BadRequest(message)) => Toast::error("Error", message),
    Err(e) => {
      tracing::warn!(error = %e, "partner link failed");
      Toast::error(
        "Partner Linking Temporarily Unavailable",
        "Partner linking is currently being set up. You can continue using the \
         app solo for now.",
      )
    }
  };

  // Re-read so the link card reflects the new state.
  let profile = store
    .get_profile(session.profile.id)
    .await
    .map_err(|e| ApiError::internal("Failed to load profile", e))?
    .unwrap_or(session.profile);
  page(store, profile, Some(toast)).await
}
