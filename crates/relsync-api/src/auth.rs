//! Accounts and sessions.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/signup`  | Body: `{"email","password"}`; 201 profile, 409 on duplicate |
//! | `POST` | `/auth/signin`  | 200 `{"token","profile"}`, 401 on bad credentials |
//! | `POST` | `/auth/signout` | 204; the session stops resolving |
//! | `GET`  | `/auth/me`      | The caller's profile |
//!
//! Session tokens are opaque: 32 random bytes, URL-safe base64. Only the
//! SHA-256 hex digest is stored, so a leaked database cannot be replayed.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, State, rejection::JsonRejection},
  http::{HeaderMap, StatusCode, header, request::Parts},
  response::IntoResponse,
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use chrono::Utc;
use cookie::{Cookie, SameSite};
use rand_core::{OsRng, RngCore};
use relsync_core::{
  analysis::Analyzer,
  profile::{NewAccount, Profile},
  session::NewSession,
  store::RelationStore,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AppState, SessionPolicy, error::ApiError};

pub const SESSION_COOKIE: &str = "relsync_session";

// ─── Primitives ──────────────────────────────────────────────────────────────

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::internal("Failed to hash password", e))
}

pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .and_then(|parsed| {
      Argon2::default().verify_password(password.as_bytes(), &parsed)
    })
    .is_ok()
}

/// A fresh bearer token for the client.
pub fn issue_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  B64.encode(bytes)
}

/// The form in which a token is stored and looked up.
pub fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

pub fn cookie_token(headers: &HeaderMap) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(Cookie::split_parse)
    .filter_map(Result::ok)
    .find(|c| c.name() == SESSION_COOKIE)
    .map(|c| c.value().to_owned())
    .filter(|t| !t.is_empty())
}

/// `Set-Cookie` carrying a freshly issued token.
pub fn session_cookie(token: String, policy: &SessionPolicy) -> Cookie<'static> {
  Cookie::build((SESSION_COOKIE, token))
    .http_only(true)
    .same_site(SameSite::Lax)
    .secure(policy.secure_cookie)
    .path("/")
    .max_age(cookie::time::Duration::seconds(policy.ttl.num_seconds()))
    .build()
}

/// `Set-Cookie` that clears the session cookie.
pub fn removal_cookie() -> Cookie<'static> {
  let mut c = Cookie::build((SESSION_COOKIE, "")).path("/").build();
  c.make_removal();
  c
}

// ─── Session extractor ───────────────────────────────────────────────────────

/// The authenticated caller, resolved from `Authorization: Bearer <token>` or
/// the session cookie. Present in a handler means the request is signed in.
#[derive(Debug, Clone)]
pub struct Session {
  pub profile:    Profile,
  pub token_hash: String,
}

/// Resolve the caller from request headers. `Ok(None)` means anonymous or an
/// unknown/expired token.
pub async fn resolve_session<S>(
  store: &S,
  headers: &HeaderMap,
) -> Result<Option<Session>, ApiError>
where
  S: RelationStore,
{
  let Some(token) = bearer_token(headers)
    .map(str::to_owned)
    .or_else(|| cookie_token(headers))
  else {
    return Ok(None);
  };

  let token_hash = hash_token(&token);
  let profile = store
    .resolve_session(&token_hash, Utc::now())
    .await
    .map_err(|e| ApiError::internal("Failed to resolve session", e))?;
  Ok(profile.map(|profile| Session { profile, token_hash }))
}

impl<S, A> FromRequestParts<AppState<S, A>> for Session
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, A>,
  ) -> Result<Self, Self::Rejection> {
    resolve_session(state.store.as_ref(), &parts.headers)
      .await?
      .ok_or(ApiError::Unauthorized)
  }
}

// ─── Services ────────────────────────────────────────────────────────────────

/// Create an account. Shared by the JSON endpoint and the sign-up form.
pub async fn register<S>(
  store: &S,
  email: &str,
  password: &str,
) -> Result<Profile, ApiError>
where
  S: RelationStore,
{
  let account = NewAccount::parse(email, password)?;
  let taken =
    || ApiError::Conflict("An account with that email already exists".into());

  // Skips hashing for the common case; the insert below settles races.
  let existing = store
    .find_profile_by_email(&account.email)
    .await
    .map_err(|e| ApiError::internal("Failed to create account", e))?;
  if existing.is_some() {
    return Err(taken());
  }

  let password_hash = hash_password(&account.password)?;
  let profile = store
    .create_profile(&account.email, password_hash)
    .await
    .map_err(|e| ApiError::internal("Failed to create account", e))?
    .ok_or_else(taken)?;

  tracing::info!(profile_id = %profile.id, "account created");
  Ok(profile)
}

/// Verify credentials and open a session. Returns the plaintext token, which
/// is never stored.
pub async fn sign_in<S>(
  store: &S,
  policy: &SessionPolicy,
  email: &str,
  password: &str,
) -> Result<(String, Profile), ApiError>
where
  S: RelationStore,
{
  let creds = store
    .find_credentials(email)
    .await
    .map_err(|e| ApiError::internal("Failed to sign in", e))?
    .ok_or(ApiError::InvalidCredentials)?;

  if !verify_password(password, &creds.password_hash) {
    return Err(ApiError::InvalidCredentials);
  }

  let token = issue_token();
  store
    .create_session(NewSession {
      token_hash: hash_token(&token),
      profile_id: creds.profile.id,
      expires_at: Utc::now() + policy.ttl,
    })
    .await
    .map_err(|e| ApiError::internal("Failed to sign in", e))?;

  tracing::info!(profile_id = %creds.profile.id, "signed in");
  Ok((token, creds.profile))
}

pub async fn sign_out<S>(store: &S, session: &Session) -> Result<(), ApiError>
where
  S: RelationStore,
{
  store
    .delete_session(&session.token_hash)
    .await
    .map_err(|e| ApiError::internal("Failed to sign out", e))
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
  pub token:   String,
  pub profile: Profile,
}

/// `POST /auth/signup`
pub async fn signup<S, A>(
  State(state): State<AppState<S, A>>,
  body: Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  let Json(body) = body?;
  let profile = register(state.store.as_ref(), &body.email, &body.password).await?;
  Ok((StatusCode::CREATED, Json(profile)))
}

/// `POST /auth/signin`
pub async fn signin<S, A>(
  State(state): State<AppState<S, A>>,
  body: Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<Json<SignInResponse>, ApiError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  let Json(body) = body?;
  let (token, profile) =
    sign_in(state.store.as_ref(), &state.sessions, &body.email, &body.password)
      .await?;
  Ok(Json(SignInResponse { token, profile }))
}

/// `POST /auth/signout`
pub async fn signout<S, A>(
  State(state): State<AppState<S, A>>,
  session: Session,
) -> Result<impl IntoResponse, ApiError>
where
  S: RelationStore + 'static,
  A: Analyzer + 'static,
{
  sign_out(state.store.as_ref(), &session).await?;
  Ok((
    StatusCode::NO_CONTENT,
    [(header::SET_COOKIE, removal_cookie().to_string())],
  ))
}

/// `GET /auth/me`
pub async fn me(session: Session) -> Json<Profile> { Json(session.profile) }

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  #[test]
  fn password_round_trip() {
    let phc = hash_password("hunter22").unwrap();
    assert!(phc.starts_with("$argon2"));
    assert!(verify_password("hunter22", &phc));
    assert!(!verify_password("hunter23", &phc));
  }

  #[test]
  fn garbage_hash_never_verifies() {
    assert!(!verify_password("anything", "not-a-phc-string"));
  }

  #[test]
  fn tokens_are_unique_and_url_safe() {
    let a = issue_token();
    let b = issue_token();
    assert_ne!(a, b);
    assert_eq!(a.len(), 43);
    assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
  }

  #[test]
  fn token_hash_is_sha256_hex() {
    let h = hash_token("abc");
    assert_eq!(
      h,
      "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
  }

  #[test]
  fn bearer_and_cookie_extraction() {
    let mut headers = HeaderMap::new();
    assert_eq!(bearer_token(&headers), None);
    assert_eq!(cookie_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
    headers.insert(
      header::COOKIE,
      HeaderValue::from_static("theme=dark; relsync_session=abc123"),
    );
    assert_eq!(bearer_token(&headers), Some("tok"));
    assert_eq!(cookie_token(&headers).as_deref(), Some("abc123"));
  }

  #[test]
  fn basic_auth_is_not_a_bearer_token() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
    assert_eq!(bearer_token(&headers), None);
  }

  #[test]
  fn session_cookie_attributes() {
    let c = session_cookie("tok".into(), &SessionPolicy::default()).to_string();
    assert!(c.starts_with("relsync_session=tok"));
    assert!(c.contains("HttpOnly"));
    assert!(c.contains("SameSite=Lax"));
    assert!(c.contains("Path=/"));
    assert!(!c.contains("Secure"));
    assert!(c.contains("Max-Age=604800"));
  }

  #[test]
  fn removal_cookie_expires_immediately() {
    let c = removal_cookie().to_string();
    assert!(c.starts_with("relsync_session=;"));
    assert!(c.contains("Max-Age=0"));
  }
}
