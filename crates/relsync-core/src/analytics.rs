//! Periodic couple-level aggregates.
//!
//! Nothing in the application writes these rows yet; they are read by the
//! analytics page so a future reporting job has a place to put its output.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The span an analytics report covers.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PeriodType {
  Weekly,
  Monthly,
}

/// One aggregate report for a couple over a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoupleAnalytics {
  pub id:                  Uuid,
  pub profile_a_id:        Uuid,
  pub profile_b_id:        Uuid,
  pub period_type:         PeriodType,
  pub period_start:        NaiveDate,
  pub period_end:          NaiveDate,
  pub total_situations:    Option<u32>,
  pub person1_right_count: Option<u32>,
  pub person2_right_count: Option<u32>,
  pub common_themes:       Vec<String>,
  pub behavior_insights:   Option<String>,
  pub created_at:          DateTime<Utc>,
}

/// What the analytics page shows for one profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
  /// Situations the profile participates in.
  pub total_situations: u64,
  /// Most recent reports first.
  pub reports:          Vec<CoupleAnalytics>,
}
