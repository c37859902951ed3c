//! `GET /situation/{id}`

use askama::Template;
use axum::{
  extract::{Path, State},
  response::{IntoResponse, Redirect, Response},
};
use relsync_api::{AppState, situations::find_for};
use relsync_core::{analysis::Analyzer, store::RelationStore};
use uuid::Uuid;

use super::{PageError, PageSession, Toast, render, short_date};

#[derive(Template)]
#[template(path = "situation.html")]
pub struct SituationPage {
  pub title:       String,
  pub date:        String,
  pub person1_pov: String,
  pub person2_pov: String,
  pub analysis:    String,
  pub verdict:     Option<String>,
  pub solution:    Option<String>,
  pub toast:       Option<Toast>,
}

fn present(text: Option<String>) -> Option<String> {
  text.filter(|t| !t.trim().is_empty())
}

/// Unknown, malformed or foreign ids all go back to the dashboard.
pub async fn show<S, A>(
  State(state): State<AppState<S, A>>,
  PageSession(session): PageSession,
  Path(id): Path<String>,
) -> Result<Response, PageError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  let Ok(id) = id.parse::<Uuid>() else {
    return Ok(Redirect::to("/dashboard").into_response());
  };
  let Some(situation) = find_for(state.store.as_ref(), &session.profile, id).await?
  else {
    return Ok(Redirect::to("/dashboard").into_response());
  };

  let page = SituationPage {
    date:        short_date(situation.created_at),
    title:       situation.title,
    person1_pov: situation.person1_pov,
    person2_pov: situation.person2_pov,
    analysis:    situation.ai_analysis.unwrap_or_default(),
    verdict:     present(situation.ai_verdict),
    solution:    present(situation.ai_solution),
    toast:       None,
  };
  Ok(render(&page)?.into_response())
}
