//! `GET /analytics`

use askama::Template;
use axum::{extract::State, response::Html};
use relsync_api::{AppState, analytics::summary_for};
use relsync_core::{analysis::Analyzer, analytics::CoupleAnalytics, store::RelationStore};

use super::{PageError, PageSession, Toast, render};

pub struct ReportRow {
  pub period:           String,
  pub start:            String,
  pub end:              String,
  pub total_situations: String,
  pub themes:           String,
}

impl From<CoupleAnalytics> for ReportRow {
  fn from(r: CoupleAnalytics) -> Self {
    Self {
      period:           r.period_type.to_string(),
      start:            r.period_start.to_string(),
      end:              r.period_end.to_string(),
      total_situations: r
        .total_situations
        .map_or_else(|| "-".to_owned(), |n| n.to_string()),
      themes:           r.common_themes.join(", "),
    }
  }
}

#[derive(Template)]
#[template(path = "analytics.html")]
pub struct AnalyticsPage {
  pub total_situations: u64,
  pub report_count:     usize,
  pub reports:          Vec<ReportRow>,
  pub toast:            Option<Toast>,
}

pub async fn show<S, A>(
  State(state): State<AppState<S, A>>,
  PageSession(session): PageSession,
) -> Result<Html<String>, PageError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  let summary = summary_for(state.store.as_ref(), &session.profile).await?;
  render(&AnalyticsPage {
    total_situations: summary.total_situations,
    report_count:     summary.reports.len(),
    reports:          summary.reports.into_iter().map(ReportRow::from).collect(),
    toast:            None,
  })
}
