//! HTTP client for an OpenAI-compatible chat-completion endpoint.

use std::time::Duration;

use relsync_core::{
  analysis::{Analysis, Analyzer},
  situation::SituationInput,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{
  Error, Result,
  prompt::{SYSTEM_PROMPT, user_prompt},
  reply::parse_reply,
};

pub const DEFAULT_ENDPOINT: &str =
  "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Gateway settings, deserialised from the `[gateway]` config table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
  pub endpoint:     String,
  /// Bearer credential. When absent every analysis fails with
  /// [`Error::MissingCredential`] and callers fall back.
  pub api_key:      Option<String>,
  pub model:        String,
  pub temperature:  f64,
  pub timeout_secs: Option<u64>,
}

impl Default for GatewayConfig {
  fn default() -> Self {
    Self {
      endpoint:     DEFAULT_ENDPOINT.to_owned(),
      api_key:      None,
      model:        DEFAULT_MODEL.to_owned(),
      temperature:  DEFAULT_TEMPERATURE,
      timeout_secs: None,
    }
  }
}

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GatewayClient {
  client: Client,
  config: GatewayConfig,
}

impl GatewayClient {
  pub fn new(config: GatewayConfig) -> Result<Self> {
    let mut builder = Client::builder();
    if let Some(secs) = config.timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(Self { client: builder.build()?, config })
  }

  pub fn config(&self) -> &GatewayConfig { &self.config }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
  content: Option<String>,
}

// ─── Analyzer ────────────────────────────────────────────────────────────────

impl Analyzer for GatewayClient {
  type Error = Error;

  async fn analyze(&self, input: &SituationInput) -> Result<Analysis> {
    let api_key = self
      .config
      .api_key
      .as_deref()
      .filter(|k| !k.is_empty())
      .ok_or(Error::MissingCredential)?;

    let body = json!({
      "model": self.config.model,
      "messages": [
        { "role": "system", "content": SYSTEM_PROMPT },
        { "role": "user",   "content": user_prompt(input) },
      ],
      "temperature": self.config.temperature,
    });

    let resp = self
      .client
      .post(&self.config.endpoint)
      .bearer_auth(api_key)
      .json(&body)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let detail = resp.text().await.unwrap_or_default();
      tracing::error!(status = status.as_u16(), body = %detail, "AI gateway error");
      return Err(Error::Upstream { status: status.as_u16() });
    }

    let reply: ChatResponse = resp.json().await?;
    let content = reply
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .ok_or(Error::EmptyReply)?;

    tracing::info!(chars = content.len(), "AI gateway replied");
    Ok(parse_reply(&content))
  }
}

#[cfg(test)]
mod tests {
  use relsync_core::analysis::UNSTRUCTURED_VERDICT;
  use serde_json::Value;
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
  };

  use super::*;

  fn input() -> SituationInput {
    SituationInput {
      title:       "Dishes".into(),
      person1_pov: "I always do them.".into(),
      person2_pov: "I cook every night.".into(),
    }
  }

  fn client_for(server: &MockServer, api_key: Option<&str>) -> GatewayClient {
    GatewayClient::new(GatewayConfig {
      endpoint: format!("{}/v1/chat/completions", server.uri()),
      api_key: api_key.map(str::to_owned),
      ..GatewayConfig::default()
    })
    .unwrap()
  }

  fn completion(content: &str) -> Value {
    json!({
      "choices": [ { "message": { "role": "assistant", "content": content } } ]
    })
  }

  const STRUCTURED: &str = r#"{"analysis":"A","verdict":"V","solution":"S","person1_insights":"P1","person2_insights":"P2"}"#;

  #[tokio::test]
  async fn structured_reply_is_returned_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/v1/chat/completions"))
      .and(header("authorization", "Bearer test-key"))
      .respond_with(ResponseTemplate::new(200).set_body_json(completion(STRUCTURED)))
      .expect(1)
      .mount(&server)
      .await;

    let a = client_for(&server, Some("test-key")).analyze(&input()).await.unwrap();
    assert_eq!(a.analysis, "A");
    assert_eq!(a.verdict, "V");
    assert_eq!(a.solution, "S");
    assert_eq!(a.person1_insights, "P1");
    assert_eq!(a.person2_insights, "P2");
  }

  #[tokio::test]
  async fn fenced_reply_is_unwrapped() {
    let server = MockServer::start().await;
    let fenced = format!("```json\n{STRUCTURED}\n```");
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(completion(&fenced)))
      .mount(&server)
      .await;

    let a = client_for(&server, Some("k")).analyze(&input()).await.unwrap();
    assert_eq!(a.verdict, "V");
  }

  #[tokio::test]
  async fn prose_reply_degrades() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(completion("Talk it out.")))
      .mount(&server)
      .await;

    let a = client_for(&server, Some("k")).analyze(&input()).await.unwrap();
    assert_eq!(a.analysis, "Talk it out.");
    assert_eq!(a.verdict, UNSTRUCTURED_VERDICT);
  }

  #[tokio::test]
  async fn request_carries_model_prompts_and_temperature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(body_partial_json(json!({
        "model": DEFAULT_MODEL,
        "messages": [
          { "role": "system", "content": SYSTEM_PROMPT },
          { "role": "user", "content": user_prompt(&input()) },
        ],
      })))
      .respond_with(ResponseTemplate::new(200).set_body_json(completion(STRUCTURED)))
      .expect(1)
      .mount(&server)
      .await;

    client_for(&server, Some("k")).analyze(&input()).await.unwrap();
  }

  #[tokio::test]
  async fn upstream_failure_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
      .mount(&server)
      .await;

    let err = client_for(&server, Some("k")).analyze(&input()).await.unwrap_err();
    assert!(matches!(err, Error::Upstream { status: 500 }));
    assert_eq!(err.to_string(), "AI API error: 500");
  }

  #[tokio::test]
  async fn empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
      .mount(&server)
      .await;

    let err = client_for(&server, Some("k")).analyze(&input()).await.unwrap_err();
    assert!(matches!(err, Error::EmptyReply));
  }

  #[tokio::test]
  async fn missing_key_never_calls_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200))
      .expect(0)
      .mount(&server)
      .await;

    let err = client_for(&server, None).analyze(&input()).await.unwrap_err();
    assert!(matches!(err, Error::MissingCredential));
  }
}
