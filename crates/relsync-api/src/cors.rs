//! CORS for the `/functions` endpoints, which are called cross-origin by
//! browser clients.

use axum::{
  http::{HeaderName, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str =
  "authorization, x-client-info, apikey, content-type";

fn cors_headers() -> [(HeaderName, HeaderValue); 2] {
  [
    (
      header::ACCESS_CONTROL_ALLOW_ORIGIN,
      HeaderValue::from_static(ALLOW_ORIGIN),
    ),
    (
      header::ACCESS_CONTROL_ALLOW_HEADERS,
      HeaderValue::from_static(ALLOW_HEADERS),
    ),
  ]
}

/// OPTIONS handler. No auth, empty body.
pub async fn preflight() -> Response {
  (StatusCode::OK, cors_headers()).into_response()
}

/// Response mapper that stamps the CORS headers on every response, errors
/// included.
pub async fn with_cors_headers(mut res: Response) -> Response {
  let headers = res.headers_mut();
  for (name, value) in cors_headers() {
    headers.insert(name, value);
  }
  res
}
