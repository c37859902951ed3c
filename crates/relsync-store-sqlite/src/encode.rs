//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that string
//! comparison in SQL orders them correctly. Calendar dates are `YYYY-MM-DD`.
//! UUIDs are hyphenated lowercase strings. Lists are compact JSON.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use relsync_core::{
  analytics::{CoupleAnalytics, PeriodType},
  profile::Profile,
  situation::Situation,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Current time at the precision [`encode_dt`] keeps, so values handed back
/// to callers compare equal to what a later read returns.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── PeriodType ──────────────────────────────────────────────────────────────

pub fn decode_period_type(s: &str) -> Result<PeriodType> {
  s.parse::<PeriodType>()
    .map_err(|_| Error::Core(relsync_core::Error::UnknownPeriodType(s.to_owned())))
}

// ─── Counts ──────────────────────────────────────────────────────────────────

fn decode_count(n: Option<i64>) -> Option<u32> {
  n.and_then(|v| u32::try_from(v).ok())
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawProfile`] field order.
pub const PROFILE_COLUMNS: &str = "id, email, partner_id, created_at, updated_at";

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub id:         String,
  pub email:      String,
  pub partner_id: Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

impl RawProfile {
  /// Read the first five columns in [`PROFILE_COLUMNS`] order.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      email:      row.get(1)?,
      partner_id: row.get(2)?,
      created_at: row.get(3)?,
      updated_at: row.get(4)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      id:         decode_uuid(&self.id)?,
      email:      self.email,
      partner_id: self.partner_id.as_deref().map(decode_uuid).transpose()?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawSituation`] field order.
pub const SITUATION_COLUMNS: &str = "id, submitter_id, partner_id, title, \
  person1_pov, person2_pov, ai_analysis, ai_verdict, ai_solution, created_at";

/// Raw strings read directly from a `situations` row.
pub struct RawSituation {
  pub id:           String,
  pub submitter_id: String,
  pub partner_id:   String,
  pub title:        String,
  pub person1_pov:  String,
  pub person2_pov:  String,
  pub ai_analysis:  Option<String>,
  pub ai_verdict:   Option<String>,
  pub ai_solution:  Option<String>,
  pub created_at:   String,
}

impl RawSituation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      submitter_id: row.get(1)?,
      partner_id:   row.get(2)?,
      title:        row.get(3)?,
      person1_pov:  row.get(4)?,
      person2_pov:  row.get(5)?,
      ai_analysis:  row.get(6)?,
      ai_verdict:   row.get(7)?,
      ai_solution:  row.get(8)?,
      created_at:   row.get(9)?,
    })
  }

  pub fn into_situation(self) -> Result<Situation> {
    Ok(Situation {
      id:           decode_uuid(&self.id)?,
      submitter_id: decode_uuid(&self.submitter_id)?,
      partner_id:   decode_uuid(&self.partner_id)?,
      title:        self.title,
      person1_pov:  self.person1_pov,
      person2_pov:  self.person2_pov,
      ai_analysis:  self.ai_analysis,
      ai_verdict:   self.ai_verdict,
      ai_solution:  self.ai_solution,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawAnalytics`] field order.
pub const ANALYTICS_COLUMNS: &str = "id, profile_a_id, profile_b_id, \
  period_type, period_start, period_end, total_situations, \
  person1_right_count, person2_right_count, common_themes, \
  behavior_insights, created_at";

/// Raw values read directly from a `couple_analytics` row.
pub struct RawAnalytics {
  pub id:                  String,
  pub profile_a_id:        String,
  pub profile_b_id:        String,
  pub period_type:         String,
  pub period_start:        String,
  pub period_end:          String,
  pub total_situations:    Option<i64>,
  pub person1_right_count: Option<i64>,
  pub person2_right_count: Option<i64>,
  pub common_themes:       String,
  pub behavior_insights:   Option<String>,
  pub created_at:          String,
}

impl RawAnalytics {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                  row.get(0)?,
      profile_a_id:        row.get(1)?,
      profile_b_id:        row.get(2)?,
      period_type:         row.get(3)?,
      period_start:        row.get(4)?,
      period_end:          row.get(5)?,
      total_situations:    row.get(6)?,
      person1_right_count: row.get(7)?,
      person2_right_count: row.get(8)?,
      common_themes:       row.get(9)?,
      behavior_insights:   row.get(10)?,
      created_at:          row.get(11)?,
    })
  }

  pub fn into_analytics(self) -> Result<CoupleAnalytics> {
    Ok(CoupleAnalytics {
      id:                  decode_uuid(&self.id)?,
      profile_a_id:        decode_uuid(&self.profile_a_id)?,
      profile_b_id:        decode_uuid(&self.profile_b_id)?,
      period_type:         decode_period_type(&self.period_type)?,
      period_start:        decode_date(&self.period_start)?,
      period_end:          decode_date(&self.period_end)?,
      total_situations:    decode_count(self.total_situations),
      person1_right_count: decode_count(self.person1_right_count),
      person2_right_count: decode_count(self.person2_right_count),
      common_themes:       serde_json::from_str(&self.common_themes)?,
      behavior_insights:   self.behavior_insights,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_lexicographically() {
    let whole = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 5).unwrap();
    let later = whole + chrono::Duration::milliseconds(500);
    assert!(encode_dt(whole) < encode_dt(later));
    assert_eq!(encode_dt(whole), "2024-05-01T12:00:05.000000Z");
  }

  #[test]
  fn dt_roundtrip_keeps_microseconds() {
    let dt = Utc.timestamp_opt(1_700_000_000, 123_456_000).unwrap();
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), dt);
  }

  #[test]
  fn unknown_period_type_is_an_error() {
    assert!(matches!(
      decode_period_type("fortnightly"),
      Err(Error::Core(relsync_core::Error::UnknownPeriodType(_)))
    ));
  }
}
