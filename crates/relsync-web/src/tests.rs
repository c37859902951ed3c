//! End-to-end tests of the page router over an in-memory store.

use std::{convert::Infallible, sync::Arc};

use axum::{
  Router,
  body::Body,
  http::{HeaderMap, Method, Request, StatusCode, header},
};
use config::{Config, File, FileFormat};
use relsync_api::{AppState, SessionPolicy};
use relsync_core::{
  analysis::{Analysis, Analyzer},
  situation::SituationInput,
};
use relsync_store_sqlite::SqliteStore;
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{ServerConfig, router};

struct Echo;

impl Analyzer for Echo {
  type Error = Infallible;

  async fn analyze(&self, input: &SituationInput) -> Result<Analysis, Infallible> {
    Ok(Analysis {
      analysis:         format!("About {}", input.title),
      verdict:          "Nobody is wrong.".into(),
      solution:         "Talk on Sunday.".into(),
      person1_insights: "-".into(),
      person2_insights: "-".into(),
    })
  }
}

struct Offline;

#[derive(Debug, thiserror::Error)]
#[error("AI gateway API key not configured")]
struct NoKey;

impl Analyzer for Offline {
  type Error = NoKey;

  async fn analyze(&self, _: &SituationInput) -> Result<Analysis, NoKey> {
    Err(NoKey)
  }
}

// ─── Harness ─────────────────────────────────────────────────────────────────

async fn make_app<A: Analyzer + 'static>(analyzer: A) -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  router(AppState::new(
    Arc::new(store),
    Arc::new(analyzer),
    SessionPolicy::default(),
  ))
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, String) {
  let res = app.clone().oneshot(req).await.unwrap();
  let status = res.status();
  let headers = res.headers().clone();
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
  (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
  let mut builder = Request::builder().uri(uri);
  if let Some(cookie) = cookie {
    builder = builder.header(header::COOKIE, cookie);
  }
  builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
  let mut builder = Request::builder()
    .method(Method::POST)
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
  if let Some(cookie) = cookie {
    builder = builder.header(header::COOKIE, cookie);
  }
  builder.body(Body::from(body.to_owned())).unwrap()
}

fn location(headers: &HeaderMap) -> &str {
  headers[header::LOCATION].to_str().unwrap()
}

/// Sign up and sign in through the form; returns the `Cookie` header value.
async fn signed_in(app: &Router, user: &str) -> String {
  let creds = format!("email={user}%40example.com&password=secret1");

  let (status, _, body) =
    call(app, post_form("/auth", None, &format!("mode=signup&{creds}"))).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("Account created!"));

  let (status, headers, _) =
    call(app, post_form("/auth", None, &format!("mode=signin&{creds}"))).await;
  assert_eq!(status, StatusCode::SEE_OTHER);
  assert_eq!(location(&headers), "/dashboard");

  let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
  assert!(set_cookie.contains("HttpOnly"));
  set_cookie.split(';').next().unwrap().to_owned()
}

// ─── Public pages ────────────────────────────────────────────────────────────

#[tokio::test]
async fn landing_page_renders_features() {
  let app = make_app(Echo).await;
  let (status, _, body) = call(&app, get("/", None)).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("Understand Each Other"));
  assert!(body.contains("Both Perspectives Matter"));
  assert!(body.contains("Track Growth Together"));
}

#[tokio::test]
async fn auth_page_switches_mode() {
  let app = make_app(Echo).await;
  let (_, _, body) = call(&app, get("/auth", None)).await;
  assert!(body.contains("Welcome Back"));
  let (_, _, body) = call(&app, get("/auth?mode=signup", None)).await;
  assert!(body.contains("Create Account"));
}

#[tokio::test]
async fn protected_pages_redirect_anonymous_visitors() {
  let app = make_app(Echo).await;
  for uri in ["/dashboard", "/submit", "/analytics", "/situation/whatever"] {
    let (status, headers, _) = call(&app, get(uri, None)).await;
    assert_eq!(status, StatusCode::SEE_OTHER, "{uri}");
    assert_eq!(location(&headers), "/auth", "{uri}");
  }
}

#[tokio::test]
async fn api_is_nested_under_prefix() {
  let app = make_app(Echo).await;
  let (status, _, body) = call(&app, get("/api/auth/me", None)).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body.contains("Unauthorized"));
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn short_password_shows_toast() {
  let app = make_app(Echo).await;
  let (status, _, body) = call(
    &app,
    post_form("/auth", None, "mode=signup&email=a%40example.com&password=123"),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("password must be at least 6 characters"));
}

#[tokio::test]
async fn wrong_password_shows_toast() {
  let app = make_app(Echo).await;
  signed_in(&app, "a").await;
  let (status, _, body) = call(
    &app,
    post_form("/auth", None, "mode=signin&email=a%40example.com&password=nope-nope"),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("Invalid email or password"));
}

#[tokio::test]
async fn signout_ends_the_session() {
  let app = make_app(Echo).await;
  let cookie = signed_in(&app, "a").await;

  let (status, _, body) = call(&app, get("/dashboard", Some(&cookie))).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("a@example.com"));

  let (status, headers, _) = call(&app, post_form("/signout", Some(&cookie), "")).await;
  assert_eq!(status, StatusCode::SEE_OTHER);
  assert_eq!(location(&headers), "/");
  assert!(headers[header::SET_COOKIE].to_str().unwrap().contains("Max-Age=0"));

  let (status, _, _) = call(&app, get("/dashboard", Some(&cookie))).await;
  assert_eq!(status, StatusCode::SEE_OTHER);
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_partner_linking_toasts() {
  let app = make_app(Echo).await;
  let cookie = signed_in(&app, "a").await;
  signed_in(&app, "b").await;

  let (_, _, body) = call(&app, get("/dashboard", Some(&cookie))).await;
  assert!(body.contains("Link Your Partner"));
  assert!(body.contains("No situations yet"));

  let link = |email: &str| {
    post_form("/dashboard/link-partner", Some(&cookie), &format!("partner_email={email}"))
  };

  let (_, _, body) = call(&app, link("")).await;
  assert!(body.contains("Email required"));

  let (_, _, body) = call(&app, link("ghost%40example.com")).await;
  assert!(body.contains("Partner not found"));
  assert!(body.contains("Link Your Partner"));

  let (_, _, body) = call(&app, link("a%40example.com")).await;
  assert!(body.contains("You cannot link to yourself"));

  let (status, _, body) = call(&app, link("b%40example.com")).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("Partner linked!"));
  assert!(!body.contains("Link Your Partner"));
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_redirects_to_stored_analysis() {
  let app = make_app(Echo).await;
  let cookie = signed_in(&app, "a").await;

  let (status, headers, _) = call(
    &app,
    post_form(
      "/submit",
      Some(&cookie),
      "title=Chores&person1_pov=I+vacuum.&person2_pov=I+cook.",
    ),
  )
  .await;
  assert_eq!(status, StatusCode::SEE_OTHER);
  let target = location(&headers).to_owned();
  assert!(target.starts_with("/situation/"));

  let (status, _, body) = call(&app, get(&target, Some(&cookie))).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("About Chores"));
  assert!(body.contains("Balanced Assessment"));
  assert!(body.contains("Talk on Sunday."));

  let (_, _, body) = call(&app, get("/dashboard", Some(&cookie))).await;
  assert!(body.contains("Chores"));
  assert!(body.contains(&target));
}

#[tokio::test]
async fn submit_uses_fallback_when_analyzer_is_offline() {
  let app = make_app(Offline).await;
  let cookie = signed_in(&app, "a").await;

  let (status, headers, _) = call(
    &app,
    post_form(
      "/submit",
      Some(&cookie),
      "title=Money&person1_pov=Save+more&person2_pov=Enjoy+now",
    ),
  )
  .await;
  assert_eq!(status, StatusCode::SEE_OTHER);

  let (_, _, body) = call(&app, get(location(&headers), Some(&cookie))).await;
  assert!(body.contains("This situation involves different perspectives"));
  assert!(body.contains("Recommended Solution"));
}

#[tokio::test]
async fn blank_submission_rerenders_form() {
  let app = make_app(Echo).await;
  let cookie = signed_in(&app, "a").await;

  let (status, _, body) = call(
    &app,
    post_form("/submit", Some(&cookie), "title=Kept&person1_pov=&person2_pov=x"),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("person1_pov is required"));
  assert!(body.contains("value=\"Kept\""));
}

#[tokio::test]
async fn unknown_or_foreign_situation_redirects_to_dashboard() {
  let app = make_app(Echo).await;
  let owner = signed_in(&app, "a").await;
  let outsider = signed_in(&app, "c").await;

  let (_, headers, _) = call(
    &app,
    post_form("/submit", Some(&owner), "title=T&person1_pov=x&person2_pov=y"),
  )
  .await;
  let target = location(&headers).to_owned();

  for uri in [
    target.as_str(),
    &format!("/situation/{}", Uuid::new_v4()),
    "/situation/not-a-uuid",
  ] {
    let (status, headers, _) = call(&app, get(uri, Some(&outsider))).await;
    assert_eq!(status, StatusCode::SEE_OTHER, "{uri}");
    assert_eq!(location(&headers), "/dashboard", "{uri}");
  }
}

// ─── Analytics ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn analytics_page_shows_counts() {
  let app = make_app(Echo).await;
  let cookie = signed_in(&app, "a").await;
  call(
    &app,
    post_form("/submit", Some(&cookie), "title=T&person1_pov=x&person2_pov=y"),
  )
  .await;

  let (status, _, body) = call(&app, get("/analytics", Some(&cookie))).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("Total Situations"));
  assert!(body.contains("<h3>1</h3>"));
  assert!(body.contains("Coming Soon"));
}

// ─── Configuration ───────────────────────────────────────────────────────────

#[test]
fn config_file_overrides_defaults() {
  let toml = r#"
    port = 9000
    session_ttl_hours = 24

    [gateway]
    model = "test/model"
  "#;
  let cfg = ServerConfig::from_builder(
    Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
  )
  .unwrap();

  assert_eq!(cfg.port, 9000);
  assert_eq!(cfg.host, "127.0.0.1");
  assert_eq!(cfg.session_policy().ttl, chrono::Duration::hours(24));
  assert_eq!(cfg.gateway.model, "test/model");
  assert_eq!(cfg.gateway.temperature, 0.7);
  assert!(cfg.gateway.api_key.is_none());
}

fn config_from(toml: &str) -> Result<ServerConfig, config::ConfigError> {
  ServerConfig::from_builder(
    Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
  )
}

#[test]
fn session_ttl_must_be_positive() {
  assert!(config_from("session_ttl_hours = 0").is_err());
  assert!(config_from("session_ttl_hours = -6").is_err());
}

#[test]
fn session_ttl_out_of_range_is_rejected() {
  let err = config_from("session_ttl_hours = 9223372036854775807").unwrap_err();
  assert!(err.to_string().contains("session_ttl_hours"));
  assert!(config_from("session_ttl_hours = 87601").is_err());
  assert!(config_from("session_ttl_hours = 87600").is_ok());
}

#[test]
fn unchecked_ttl_falls_back_to_default_policy() {
  let cfg = ServerConfig { session_ttl_hours: i64::MAX, ..ServerConfig::default() };
  assert_eq!(cfg.session_policy().ttl, SessionPolicy::default().ttl);
}

#[test]
fn tilde_store_path_expands() {
  let cfg = ServerConfig {
    store_path: "~/relsync/data.db".into(),
    ..ServerConfig::default()
  };
  let resolved = cfg.resolved_store_path();
  if std::env::var("HOME").is_ok() {
    assert!(resolved.ends_with("relsync/data.db"));
    assert!(!resolved.starts_with("~"));
  }

  let plain = ServerConfig::default();
  assert_eq!(plain.resolved_store_path(), plain.store_path);
}
