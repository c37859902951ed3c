//! `POST /functions/analyze-situation`: proxy two perspectives to the
//! analyzer and return its five-part reply. Unauthenticated.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use relsync_core::{
  analysis::{Analysis, Analyzer},
  situation::SituationInput,
  store::RelationStore,
};

use crate::{AppState, error::ApiError};

pub async fn handler<S, A>(
  State(state): State<AppState<S, A>>,
  body: Result<Json<SituationInput>, JsonRejection>,
) -> Result<Json<Analysis>, ApiError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  let Json(input) = body?;
  let input = input.validate()?;

  let analysis = state.analyzer.analyze(&input).await.map_err(|e| {
    tracing::error!(error = %e, "analyze-situation failed");
    ApiError::Internal(e.to_string())
  })?;
  Ok(Json(analysis))
}
