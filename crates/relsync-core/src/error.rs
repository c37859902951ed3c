//! Error types for `relsync-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("password must be at least {min} characters")]
  PasswordTooShort { min: usize },

  #[error("email address is not valid: {0:?}")]
  InvalidEmail(String),

  #[error("unknown analytics period type: {0:?}")]
  UnknownPeriodType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
