//! `GET /analytics`: situation count and the most recent analytics reports
//! covering the caller.

use axum::{Json, extract::State};
use relsync_core::{
  analysis::Analyzer,
  analytics::AnalyticsSummary,
  profile::Profile,
  store::RelationStore,
};

use crate::{AppState, Session, error::ApiError};

pub const RECENT_REPORTS: usize = 10;

pub async fn summary_for<S>(
  store: &S,
  caller: &Profile,
) -> Result<AnalyticsSummary, ApiError>
where
  S: RelationStore,
{
  let total_situations = store
    .count_situations(caller.id)
    .await
    .map_err(|e| ApiError::internal("Failed to count situations", e))?;
  let reports = store
    .list_analytics(caller.id, RECENT_REPORTS)
    .await
    .map_err(|e| ApiError::internal("Failed to load analytics", e))?;
  Ok(AnalyticsSummary { total_situations, reports })
}

pub async fn summary<S, A>(
  State(state): State<AppState<S, A>>,
  session: Session,
) -> Result<Json<AnalyticsSummary>, ApiError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  Ok(Json(summary_for(state.store.as_ref(), &session.profile).await?))
}
