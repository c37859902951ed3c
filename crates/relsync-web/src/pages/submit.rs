//! `GET /submit`, `POST /submit`

use askama::Template;
use axum::{
  Form,
  extract::State,
  response::{IntoResponse, Redirect, Response},
};
use relsync_api::{ApiError, AppState, situations};
use relsync_core::{analysis::Analyzer, situation::SituationInput, store::RelationStore};
use serde::Deserialize;

use super::{PageError, PageSession, Toast, render};

#[derive(Template)]
#[template(path = "submit.html")]
pub struct SubmitPage {
  pub title:       String,
  pub person1_pov: String,
  pub person2_pov: String,
  pub toast:       Option<Toast>,
}

pub async fn form(_session: PageSession) -> Result<Response, PageError> {
  let page = SubmitPage {
    title:       String::new(),
    person1_pov: String::new(),
    person2_pov: String::new(),
    toast:       None,
  };
  Ok(render(&page)?.into_response())
}

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
  #[serde(default)]
  pub title:       String,
  #[serde(default)]
  pub person1_pov: String,
  #[serde(default)]
  pub person2_pov: String,
}

/// Runs the shared submission flow, then shows the stored result.
pub async fn submit<S, A>(
  State(state): State<AppState<S, A>>,
  PageSession(session): PageSession,
  Form(form): Form<SubmitForm>,
) -> Result<Response, PageError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  let input = SituationInput {
    title:       form.title,
    person1_pov: form.person1_pov,
    person2_pov: form.person2_pov,
  };

  let result = situations::submit(
    state.store.as_ref(),
    state.analyzer.as_ref(),
    &session.profile,
    input.clone(),
  )
  .await;

  match result {
    Ok(situation) => {
      Ok(Redirect::to(&format!("/situation/{}", situation.id)).into_response())
    }
    Err(ApiError::BadRequest(message)) => {
      let page = SubmitPage {
        title:       input.title,
        person1_pov: input.person1_pov,
        person2_pov: input.person2_pov,
        toast:       Some(Toast::error("Error", message)),
      };
      Ok(render(&page)?.into_response())
    }
    Err(e) => Err(e.into()),
  }
}
