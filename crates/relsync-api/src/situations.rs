//! Handlers for `/situations` endpoints, plus the submission flow shared with
//! the submit page.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/situations` | Optional `?limit=n` (default 5), newest first |
//! | `POST` | `/situations` | Body: `{"title","person1_pov","person2_pov"}` |
//! | `GET`  | `/situations/{id}` | 404 unless the caller took part |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use relsync_core::{
  analysis::{Analysis, Analyzer},
  profile::Profile,
  situation::{NewSituation, Situation, SituationInput},
  store::RelationStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, Session, error::ApiError};

/// How many situations the dashboard and the default list show.
pub const RECENT_SITUATIONS: usize = 5;
const MAX_LIMIT: usize = 100;

// ─── Submission flow ─────────────────────────────────────────────────────────

/// Validate, analyze and persist a situation for `caller`.
///
/// The counterpart is the caller's partner when linked, otherwise the caller
/// themself. Analyzer failures never fail the submission: the fixed
/// [`Analysis::fallback`] is stored instead, so every accepted submission has
/// a non-empty analysis.
pub async fn submit<S, A>(
  store: &S,
  analyzer: &A,
  caller: &Profile,
  input: SituationInput,
) -> Result<Situation, ApiError>
where
  S: RelationStore,
  A: Analyzer,
{
  let input = input.validate()?;

  let analysis = match analyzer.analyze(&input).await {
    Ok(analysis) => analysis,
    Err(e) => {
      tracing::warn!(error = %e, "analyzer failed, storing fallback analysis");
      Analysis::fallback(&input)
    }
  };

  let situation = store
    .insert_situation(NewSituation {
      submitter_id: caller.id,
      partner_id: caller.counterpart_id(),
      input,
      analysis,
    })
    .await
    .map_err(|e| ApiError::internal("Failed to save situation", e))?;

  tracing::info!(situation_id = %situation.id, "situation analyzed");
  Ok(situation)
}

/// Fetch a situation the caller took part in. Foreign ids look exactly like
/// missing ones.
pub async fn find_for<S>(
  store: &S,
  caller: &Profile,
  id: Uuid,
) -> Result<Option<Situation>, ApiError>
where
  S: RelationStore,
{
  let situation = store
    .get_situation(id)
    .await
    .map_err(|e| ApiError::internal("Failed to load situation", e))?;
  Ok(situation.filter(|s| s.involves(caller.id)))
}

pub async fn recent<S>(
  store: &S,
  caller: &Profile,
  limit: usize,
) -> Result<Vec<Situation>, ApiError>
where
  S: RelationStore,
{
  store
    .list_situations(caller.id, limit)
    .await
    .map_err(|e| ApiError::internal("Failed to list situations", e))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit: Option<usize>,
}

/// `GET /situations[?limit=n]`
pub async fn list<S, A>(
  State(state): State<AppState<S, A>>,
  session: Session,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Situation>>, ApiError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  let Query(params) = params?;
  let limit = params.limit.unwrap_or(RECENT_SITUATIONS).min(MAX_LIMIT);
  let situations = recent(state.store.as_ref(), &session.profile, limit).await?;
  Ok(Json(situations))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /situations`
pub async fn create<S, A>(
  State(state): State<AppState<S, A>>,
  session: Session,
  body: Result<Json<SituationInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  let Json(input) = body?;
  let situation = submit(
    state.store.as_ref(),
    state.analyzer.as_ref(),
    &session.profile,
    input,
  )
  .await?;
  Ok((StatusCode::CREATED, Json(situation)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /situations/{id}`
pub async fn get_one<S, A>(
  State(state): State<AppState<S, A>>,
  session: Session,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Situation>, ApiError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  let Path(id) = id?;
  let situation = find_for(state.store.as_ref(), &session.profile, id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("situation {id} not found")))?;
  Ok(Json(situation))
}
