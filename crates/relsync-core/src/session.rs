//! Login sessions.
//!
//! Only a digest of the bearer token is ever handed to the store; the token
//! itself lives with the client.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Input to [`crate::store::RelationStore::create_session`].
#[derive(Debug, Clone)]
pub struct NewSession {
  /// Hex digest of the bearer token.
  pub token_hash: String,
  pub profile_id: Uuid,
  pub expires_at: DateTime<Utc>,
}
