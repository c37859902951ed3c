//! Sign-in / sign-up form and sign-out.

use askama::Template;
use axum::{
  Form,
  extract::{Query, State},
  http::{HeaderMap, header},
  response::{IntoResponse, Redirect, Response},
};
use relsync_api::{
  ApiError, AppState,
  auth::{register, removal_cookie, resolve_session, session_cookie, sign_in, sign_out},
};
use relsync_core::{analysis::Analyzer, store::RelationStore};
use serde::Deserialize;

use super::{PageError, Toast, render};

#[derive(Template)]
#[template(path = "auth.html")]
pub struct AuthPage {
  pub signup: bool,
  pub email:  String,
  pub toast:  Option<Toast>,
}

#[derive(Debug, Deserialize)]
pub struct ModeParams {
  pub mode: Option<String>,
}

fn is_signup(mode: Option<&str>) -> bool { mode == Some("signup") }

/// `GET /auth[?mode=signup]`
pub async fn form(Query(params): Query<ModeParams>) -> Result<Response, PageError> {
  let page = AuthPage {
    signup: is_signup(params.mode.as_deref()),
    email:  String::new(),
    toast:  None,
  };
  Ok(render(&page)?.into_response())
}

#[derive(Debug, Deserialize)]
pub struct AuthForm {
  #[serde(default)]
  pub email:    String,
  #[serde(default)]
  pub password: String,
  pub mode:     Option<String>,
}

/// `POST /auth`. Sign-up re-renders the sign-in form on success; sign-in sets
/// the session cookie and redirects to the dashboard.
pub async fn submit<S, A>(
  State(state): State<AppState<S, A>>,
  Form(form): Form<AuthForm>,
) -> Result<Response, PageError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  let signup = is_signup(form.mode.as_deref());
  let retry = |toast: Toast| AuthPage {
    signup,
    email: form.email.clone(),
    toast: Some(toast),
  };

  if form.email.trim().is_empty() || form.password.is_empty() {
    let toast = Toast::error("Error", "Please enter both email and password");
    return Ok(render(&retry(toast))?.into_response());
  }

  if signup {
    return match register(state.store.as_ref(), &form.email, &form.password).await {
      Ok(profile) => {
        let page = AuthPage {
          signup: false,
          email:  profile.email,
          toast:  Some(Toast::info(
            "Account created!",
            "Welcome to RelationSync. You can now sign in.",
          )),
        };
        Ok(render(&page)?.into_response())
      }
      Err(e @ (ApiError::BadRequest(_) | ApiError::Conflict(_))) => {
        Ok(render(&retry(Toast::error("Error", e.to_string())))?.into_response())
      }
      Err(e) => Err(e.into()),
    };
  }

  match sign_in(state.store.as_ref(), &state.sessions, &form.email, &form.password)
    .await
  {
    Ok((token, _)) => {
      let cookie = session_cookie(token, &state.sessions);
      Ok(
        (
          [(header::SET_COOKIE, cookie.to_string())],
          Redirect::to("/dashboard"),
        )
          .into_response(),
      )
    }
    Err(e @ ApiError::InvalidCredentials) => {
      Ok(render(&retry(Toast::error("Error", e.to_string())))?.into_response())
    }
    Err(e) => Err(e.into()),
  }
}

/// `POST /signout`. Always clears the cookie, even when the session had
/// already expired.
pub async fn signout<S, A>(
  State(state): State<AppState<S, A>>,
  headers: HeaderMap,
) -> Result<Response, PageError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  if let Some(session) = resolve_session(state.store.as_ref(), &headers).await? {
    sign_out(state.store.as_ref(), &session).await?;
  }
  Ok(
    (
      [(header::SET_COOKIE, removal_cookie().to_string())],
      Redirect::to("/"),
    )
      .into_response(),
  )
}
