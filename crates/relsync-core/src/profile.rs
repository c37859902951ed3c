//! Profiles: one identity record per account, with an optional partner link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Minimum accepted password length at signup.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A user identity record.
///
/// `partner_id` is mutual: if A points at B then B points at A. The store
/// maintains this by writing both sides in one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub id:         Uuid,
  /// Always stored in normalised form, see [`normalize_email`].
  pub email:      String,
  pub partner_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Profile {
  pub fn is_linked(&self) -> bool { self.partner_id.is_some() }

  /// The id recorded as the other participant of a new situation: the linked
  /// partner, or the profile itself when submitting solo.
  pub fn counterpart_id(&self) -> Uuid { self.partner_id.unwrap_or(self.id) }
}

/// Canonical form used for storage and lookup: trimmed and lower-cased.
pub fn normalize_email(raw: &str) -> String { raw.trim().to_lowercase() }

// ─── Signup input ────────────────────────────────────────────────────────────

/// Validated signup input. The password is still plaintext here; hashing is
/// the caller's job.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub email:    String,
  pub password: String,
}

impl NewAccount {
  /// Normalise the email and check both fields.
  pub fn parse(email: &str, password: &str) -> Result<Self> {
    let email = normalize_email(email);
    if email.is_empty() {
      return Err(Error::MissingField("email"));
    }
    match email.split_once('@') {
      Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
      _ => return Err(Error::InvalidEmail(email)),
    }
    if password.is_empty() {
      return Err(Error::MissingField("password"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::PasswordTooShort { min: MIN_PASSWORD_LEN });
    }
    Ok(Self { email, password: password.to_owned() })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_trims_and_lowercases() {
    assert_eq!(normalize_email(" Foo@Bar.com "), "foo@bar.com");
    assert_eq!(normalize_email("\tALICE@example.COM\n"), "alice@example.com");
  }

  #[test]
  fn counterpart_falls_back_to_self() {
    let now = Utc::now();
    let mut p = Profile {
      id:         Uuid::new_v4(),
      email:      "a@example.com".into(),
      partner_id: None,
      created_at: now,
      updated_at: now,
    };
    assert_eq!(p.counterpart_id(), p.id);

    let partner = Uuid::new_v4();
    p.partner_id = Some(partner);
    assert_eq!(p.counterpart_id(), partner);
  }

  #[test]
  fn new_account_normalizes_email() {
    let acct = NewAccount::parse("  Bob@Example.org", "hunter22").unwrap();
    assert_eq!(acct.email, "bob@example.org");
  }

  #[test]
  fn new_account_rejects_short_password() {
    let err = NewAccount::parse("bob@example.org", "12345").unwrap_err();
    assert!(matches!(err, Error::PasswordTooShort { min: 6 }));
  }

  #[test]
  fn new_account_rejects_blank_and_malformed_email() {
    assert!(matches!(
      NewAccount::parse("   ", "hunter22"),
      Err(Error::MissingField("email"))
    ));
    assert!(matches!(
      NewAccount::parse("not-an-email", "hunter22"),
      Err(Error::InvalidEmail(_))
    ));
  }
}
