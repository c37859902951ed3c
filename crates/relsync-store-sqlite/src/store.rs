//! [`SqliteStore`]: the SQLite implementation of [`RelationStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use relsync_core::{
  analytics::CoupleAnalytics,
  profile::{Profile, normalize_email},
  session::NewSession,
  situation::{NewSituation, Situation},
  store::{Credentials, RelationStore},
};

use crate::{
  Error, Result,
  encode::{
    ANALYTICS_COLUMNS, PROFILE_COLUMNS, RawAnalytics, RawProfile, RawSituation,
    SITUATION_COLUMNS, encode_dt, encode_uuid, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A RelationSync store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

fn sql_limit(limit: usize) -> i64 { i64::try_from(limit).unwrap_or(i64::MAX) }

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Select at most one profile matching `column = param`.
  async fn query_profile(
    &self,
    column: &'static str,
    param: String,
  ) -> Result<Option<Profile>> {
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE {column} = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![param], RawProfile::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }
}

// ─── RelationStore impl ──────────────────────────────────────────────────────

impl RelationStore for SqliteStore {
  type Error = Error;

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn create_profile(
    &self,
    email: &str,
    password_hash: String,
  ) -> Result<Option<Profile>> {
    let at = now();
    let profile = Profile {
      id:         Uuid::new_v4(),
      email:      normalize_email(email),
      partner_id: None,
      created_at: at,
      updated_at: at,
    };

    let id_str    = encode_uuid(profile.id);
    let email_str = profile.email.clone();
    let at_str    = encode_dt(at);

    // The UNIQUE index on email is the arbiter; a prior lookup can race.
    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let inserted = tx.execute(
          "INSERT INTO profiles (id, email, partner_id, created_at, updated_at)
           VALUES (?1, ?2, NULL, ?3, ?3)",
          rusqlite::params![id_str, email_str, at_str],
        );
        match inserted {
          Err(e) if is_unique_violation(&e) => return Ok(false),
          other => other?,
        };
        tx.execute(
          "INSERT INTO credentials (profile_id, password_hash) VALUES (?1, ?2)",
          rusqlite::params![id_str, password_hash],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(created.then_some(profile))
  }

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    self.query_profile("id", encode_uuid(id)).await
  }

  async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>> {
    self.query_profile("email", normalize_email(email)).await
  }

  async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>> {
    let email = normalize_email(email);

    let raw: Option<(RawProfile, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT p.id, p.email, p.partner_id, p.created_at, p.updated_at,
                      c.password_hash
               FROM profiles p
               JOIN credentials c ON c.profile_id = p.id
               WHERE p.email = ?1",
              rusqlite::params![email],
              |row| Ok((RawProfile::from_row(row)?, row.get(5)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(profile, password_hash)| {
        Ok(Credentials { profile: profile.into_profile()?, password_hash })
      })
      .transpose()
  }

  async fn link_partners(&self, a: Uuid, b: Uuid) -> Result<()> {
    if a == b {
      return Err(Error::SelfLink);
    }

    let a_str  = encode_uuid(a);
    let b_str  = encode_uuid(b);
    let at_str = encode_dt(now());

    // `None` means every statement ran and the transaction committed;
    // `Some(id)` names a missing profile and the transaction was rolled back.
    let missing: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        for id in [&a_str, &b_str] {
          let exists = tx
            .query_row(
              "SELECT 1 FROM profiles WHERE id = ?1",
              rusqlite::params![id],
              |_| Ok(()),
            )
            .optional()?
            .is_some();
          if !exists {
            return Ok(Some(id.clone()));
          }
        }

        // Former partners of either side would otherwise keep pointing at a
        // profile that no longer points back.
        tx.execute(
          "UPDATE profiles SET partner_id = NULL, updated_at = ?3
           WHERE partner_id IN (?1, ?2) AND id NOT IN (?1, ?2)",
          rusqlite::params![a_str, b_str, at_str],
        )?;
        tx.execute(
          "UPDATE profiles SET partner_id = ?2, updated_at = ?3 WHERE id = ?1",
          rusqlite::params![a_str, b_str, at_str],
        )?;
        tx.execute(
          "UPDATE profiles SET partner_id = ?1, updated_at = ?3 WHERE id = ?2",
          rusqlite::params![a_str, b_str, at_str],
        )?;

        tx.commit()?;
        Ok(None)
      })
      .await?;

    match missing {
      None => Ok(()),
      Some(id) => Err(Error::ProfileNotFound(Uuid::parse_str(&id)?)),
    }
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, session: NewSession) -> Result<()> {
    let profile_str = encode_uuid(session.profile_id);
    let created_str = encode_dt(now());
    let expires_str = encode_dt(session.expires_at);
    let token_hash  = session.token_hash;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, profile_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![token_hash, profile_str, created_str, expires_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn resolve_session(
    &self,
    token_hash: &str,
    now: DateTime<Utc>,
  ) -> Result<Option<Profile>> {
    let token_hash = token_hash.to_owned();
    let now_str    = encode_dt(now);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT p.id, p.email, p.partner_id, p.created_at, p.updated_at
               FROM sessions s
               JOIN profiles p ON p.id = s.profile_id
               WHERE s.token_hash = ?1 AND s.expires_at > ?2",
              rusqlite::params![token_hash, now_str],
              RawProfile::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn delete_session(&self, token_hash: &str) -> Result<()> {
    let token_hash = token_hash.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM sessions WHERE token_hash = ?1",
          rusqlite::params![token_hash],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Situations ────────────────────────────────────────────────────────────

  async fn insert_situation(&self, input: NewSituation) -> Result<Situation> {
    let situation = Situation {
      id:           Uuid::new_v4(),
      submitter_id: input.submitter_id,
      partner_id:   input.partner_id,
      title:        input.input.title,
      person1_pov:  input.input.person1_pov,
      person2_pov:  input.input.person2_pov,
      ai_analysis:  Some(input.analysis.analysis),
      ai_verdict:   Some(input.analysis.verdict),
      ai_solution:  Some(input.analysis.solution),
      created_at:   now(),
    };

    let id_str        = encode_uuid(situation.id);
    let submitter_str = encode_uuid(situation.submitter_id);
    let partner_str   = encode_uuid(situation.partner_id);
    let at_str        = encode_dt(situation.created_at);
    let title         = situation.title.clone();
    let person1_pov   = situation.person1_pov.clone();
    let person2_pov   = situation.person2_pov.clone();
    let ai_analysis   = situation.ai_analysis.clone();
    let ai_verdict    = situation.ai_verdict.clone();
    let ai_solution   = situation.ai_solution.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO situations (
             id, submitter_id, partner_id, title, person1_pov, person2_pov,
             ai_analysis, ai_verdict, ai_solution, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            submitter_str,
            partner_str,
            title,
            person1_pov,
            person2_pov,
            ai_analysis,
            ai_verdict,
            ai_solution,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(situation)
  }

  async fn get_situation(&self, id: Uuid) -> Result<Option<Situation>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSituation> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {SITUATION_COLUMNS} FROM situations WHERE id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawSituation::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSituation::into_situation).transpose()
  }

  async fn list_situations(
    &self,
    participant: Uuid,
    limit: usize,
  ) -> Result<Vec<Situation>> {
    let id_str    = encode_uuid(participant);
    let limit_val = sql_limit(limit);

    let raws: Vec<RawSituation> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {SITUATION_COLUMNS} FROM situations
           WHERE submitter_id = ?1 OR partner_id = ?1
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, limit_val], RawSituation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSituation::into_situation).collect()
  }

  async fn count_situations(&self, participant: Uuid) -> Result<u64> {
    let id_str = encode_uuid(participant);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM situations WHERE submitter_id = ?1 OR partner_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(u64::try_from(count).unwrap_or(0))
  }

  // ── Analytics ─────────────────────────────────────────────────────────────

  async fn list_analytics(
    &self,
    participant: Uuid,
    limit: usize,
  ) -> Result<Vec<CoupleAnalytics>> {
    let id_str    = encode_uuid(participant);
    let limit_val = sql_limit(limit);

    let raws: Vec<RawAnalytics> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {ANALYTICS_COLUMNS} FROM couple_analytics
           WHERE profile_a_id = ?1 OR profile_b_id = ?1
           ORDER BY period_start DESC, created_at DESC
           LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, limit_val], RawAnalytics::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnalytics::into_analytics).collect()
  }
}
