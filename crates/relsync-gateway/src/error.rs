//! Error type for `relsync-gateway`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("AI gateway API key not configured")]
  MissingCredential,

  #[error("AI gateway request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("AI API error: {status}")]
  Upstream { status: u16 },

  #[error("AI API returned no choices")]
  EmptyReply,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
