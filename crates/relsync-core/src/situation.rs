//! Situations: one submitted disagreement and the analysis it received.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, analysis::Analysis};

/// A persisted situation. Written once at submission, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Situation {
  pub id:           Uuid,
  /// The profile that submitted the situation.
  pub submitter_id: Uuid,
  /// The submitter's partner at submission time, or the submitter again when
  /// they were not linked.
  pub partner_id:   Uuid,
  pub title:        String,
  pub person1_pov:  String,
  pub person2_pov:  String,
  pub ai_analysis:  Option<String>,
  pub ai_verdict:   Option<String>,
  pub ai_solution:  Option<String>,
  pub created_at:   DateTime<Utc>,
}

impl Situation {
  /// Whether `profile_id` is one of the two participants.
  pub fn involves(&self, profile_id: Uuid) -> bool {
    self.submitter_id == profile_id || self.partner_id == profile_id
  }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// The three free-text fields a couple submits. Also the request body of the
/// analysis endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SituationInput {
  pub title:       String,
  pub person1_pov: String,
  pub person2_pov: String,
}

impl SituationInput {
  /// Reject blank fields. Text is kept exactly as submitted.
  pub fn validate(self) -> Result<Self> {
    if self.title.trim().is_empty() {
      return Err(Error::MissingField("title"));
    }
    if self.person1_pov.trim().is_empty() {
      return Err(Error::MissingField("person1_pov"));
    }
    if self.person2_pov.trim().is_empty() {
      return Err(Error::MissingField("person2_pov"));
    }
    Ok(self)
  }
}

// ─── NewSituation ────────────────────────────────────────────────────────────

/// Input to [`crate::store::RelationStore::insert_situation`].
/// `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewSituation {
  pub submitter_id: Uuid,
  pub partner_id:   Uuid,
  pub input:        SituationInput,
  pub analysis:     Analysis,
}
