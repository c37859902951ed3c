//! RelationSync web server.
//!
//! Serves the server-rendered pages at the root and nests the JSON API from
//! `relsync-api` under `/api`, all backed by one [`AppState`].

pub mod pages;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use axum::Router;
use chrono::TimeDelta;
use config::{
  Config, ConfigError, Environment, File, builder::ConfigBuilder,
  builder::DefaultState,
};
use relsync_api::{AppState, DEFAULT_SESSION_TTL_HOURS, SessionPolicy};
use relsync_core::{analysis::Analyzer, store::RelationStore};
use relsync_gateway::GatewayConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` overlaid by
/// `RELSYNC_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  pub session_ttl_hours: i64,
  pub secure_cookies:    bool,
  pub gateway:           GatewayConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "127.0.0.1".to_owned(),
      port:              8080,
      store_path:        PathBuf::from("relsync.db"),
      session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
      secure_cookies:    false,
      gateway:           GatewayConfig::default(),
    }
  }
}

impl ServerConfig {
  /// Read `path` if it exists, then apply `RELSYNC_*` overrides. Nested keys
  /// use `__`, e.g. `RELSYNC_GATEWAY__API_KEY`.
  pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
    Self::from_builder(Config::builder().add_source(File::from(path).required(false)))
  }

  fn from_builder(
    builder: ConfigBuilder<DefaultState>,
  ) -> Result<Self, ConfigError> {
    let cfg: Self = builder
      .add_source(
        Environment::with_prefix("RELSYNC")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?
      .try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if session_ttl(self.session_ttl_hours).is_none() {
      return Err(ConfigError::Message(format!(
        "session_ttl_hours must be between 1 and {MAX_SESSION_TTL_HOURS}, got {}",
        self.session_ttl_hours
      )));
    }
    Ok(())
  }

  /// `store_path` with a leading `~` expanded to the home directory.
  pub fn resolved_store_path(&self) -> PathBuf {
    let s = self.store_path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/")
      && let Ok(home) = std::env::var("HOME")
    {
      return PathBuf::from(home).join(rest);
    }
    self.store_path.clone()
  }

  /// Falls back to the default TTL for values `load` would have rejected.
  pub fn session_policy(&self) -> SessionPolicy {
    let ttl = session_ttl(self.session_ttl_hours)
      .unwrap_or_else(|| SessionPolicy::default().ttl);
    SessionPolicy {
      ttl,
      secure_cookie: self.secure_cookies,
    }
  }
}

/// Ten years; expiry timestamps stay well inside chrono's range.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

fn session_ttl(hours: i64) -> Option<TimeDelta> {
  if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
    TimeDelta::try_hours(hours)
  } else {
    None
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application: pages plus `/api`, with request tracing.
pub fn router<S, A>(state: AppState<S, A>) -> Router
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  let pages: Router = pages::routes::<S, A>().with_state(state.clone());

  pages
    .nest("/api", relsync_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}
