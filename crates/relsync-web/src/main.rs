//! RelationSync server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), overlays
//! `RELSYNC_*` environment variables, opens the SQLite store and serves the
//! pages plus the JSON API over HTTP.
//!
//! ```text
//! RELSYNC_PORT=3000 RELSYNC_GATEWAY__API_KEY=... relsync --config relsync.toml
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use relsync_api::AppState;
use relsync_gateway::GatewayClient;
use relsync_store_sqlite::SqliteStore;
use relsync_web::ServerConfig;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "RelationSync web server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(cli.config)
    .context("failed to load configuration")?;

  let store_path = server_cfg.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if server_cfg.gateway.api_key.is_none() {
    tracing::warn!(
      "no AI gateway API key configured; submissions will use the fallback analysis"
    );
  }
  let analyzer = GatewayClient::new(server_cfg.gateway.clone())
    .context("failed to build AI gateway client")?;

  let state = AppState::new(
    Arc::new(store),
    Arc::new(analyzer),
    server_cfg.session_policy(),
  );

  let app = relsync_web::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
