//! `POST /functions/link-partner`: mutually link the caller with the profile
//! owning a given email.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use relsync_core::{
  analysis::Analyzer,
  profile::Profile,
  store::RelationStore,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{AppState, Session, error::ApiError};

pub const EMAIL_REQUIRED: &str = "partnerEmail is required";
pub const PARTNER_NOT_FOUND: &str = "Partner not found";
pub const SELF_LINK: &str = "You cannot link to yourself";

/// Link `caller` with the owner of `partner_email`. Nothing is written unless
/// every check passes; the link itself is a single store transaction that
/// also detaches any former partner of either side.
pub async fn link_partner<S>(
  store: &S,
  caller: &Profile,
  partner_email: &str,
) -> Result<Uuid, ApiError>
where
  S: RelationStore,
{
  if partner_email.trim().is_empty() {
    return Err(ApiError::BadRequest(EMAIL_REQUIRED.into()));
  }

  let partner = store
    .find_profile_by_email(partner_email)
    .await
    .map_err(|e| ApiError::internal("Failed to lookup partner", e))?
    .ok_or_else(|| ApiError::NotFound(PARTNER_NOT_FOUND.into()))?;

  if partner.id == caller.id {
    return Err(ApiError::BadRequest(SELF_LINK.into()));
  }

  store
    .link_partners(caller.id, partner.id)
    .await
    .map_err(|e| ApiError::internal("Failed to link partner profiles", e))?;

  tracing::info!(profile_id = %caller.id, partner_id = %partner.id, "partners linked");
  Ok(partner.id)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
  pub linked_partner_id: Uuid,
}

/// `POST /functions/link-partner` with body `{"partnerEmail": "..."}`.
///
/// The body is taken as loose JSON so that a missing or non-string
/// `partnerEmail` gets the same 400 as a blank one.
pub async fn link<S, A>(
  State(state): State<AppState<S, A>>,
  session: Session,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LinkResponse>, ApiError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  let Json(body) = body?;
  let email = body
    .get("partnerEmail")
    .and_then(Value::as_str)
    .ok_or_else(|| ApiError::BadRequest(EMAIL_REQUIRED.into()))?;

  let linked_partner_id =
    link_partner(state.store.as_ref(), &session.profile, email).await?;
  Ok(Json(LinkResponse { linked_partner_id }))
}
