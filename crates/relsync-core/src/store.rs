//! The `RelationStore` trait.
//!
//! Implemented by storage backends (e.g. `relsync-store-sqlite`). The HTTP
//! layers depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  analytics::CoupleAnalytics,
  profile::Profile,
  session::NewSession,
  situation::{NewSituation, Situation},
};

/// Credentials of one account, as needed to verify a sign-in.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub profile:       Profile,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Abstraction over a RelationSync store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RelationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Create a profile and its credentials together. Returns `None`, writing
  /// nothing, when the email is already registered.
  fn create_profile<'a>(
    &'a self,
    email: &'a str,
    password_hash: String,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// Retrieve a profile by id. Returns `None` if not found.
  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Look up a profile by email. The argument is normalised before matching.
  fn find_profile_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// Fetch the profile and password hash for an email (normalised first).
  fn find_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;

  /// Make `a` and `b` each other's partner in one atomic step.
  ///
  /// Any former partner of either side is unlinked in the same transaction,
  /// so the mutual-link invariant holds before and after. Returns an error
  /// without mutating anything if `a == b` or either profile is missing.
  fn link_partners(
    &self,
    a: Uuid,
    b: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn create_session(
    &self,
    session: NewSession,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Resolve a token digest to its profile. Sessions whose `expires_at` is not
  /// after `now` do not resolve.
  fn resolve_session<'a>(
    &'a self,
    token_hash: &'a str,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// Delete a session. Deleting an unknown session is not an error.
  fn delete_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Situations (written once, never updated) ─────────────────────────

  /// Persist a new situation and return it. `id` and `created_at` are set by
  /// the store.
  fn insert_situation(
    &self,
    input: NewSituation,
  ) -> impl Future<Output = Result<Situation, Self::Error>> + Send + '_;

  /// Retrieve a situation by id. Returns `None` if not found.
  fn get_situation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Situation>, Self::Error>> + Send + '_;

  /// Situations `participant` submitted or was named partner on, newest
  /// first.
  fn list_situations(
    &self,
    participant: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Situation>, Self::Error>> + Send + '_;

  /// Number of situations `participant` takes part in.
  fn count_situations(
    &self,
    participant: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Analytics ─────────────────────────────────────────────────────────

  /// Reports naming `participant` on either side, most recent period first.
  fn list_analytics(
    &self,
    participant: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<CoupleAnalytics>, Self::Error>> + Send + '_;
}
