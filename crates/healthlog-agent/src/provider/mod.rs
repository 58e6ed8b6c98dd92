//! Chat-completion providers.
//!
//! Each backend implements [`ChatProvider`]: system prompt, history and tool
//! specs in; one assistant reply out. [`Provider`] is the closed set of
//! backends that can be selected from configuration at startup.

mod ollama;
mod openai;

use std::{future::Future, time::Duration};

use serde::Deserialize;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::{
  error::ProviderError,
  message::{AssistantReply, Message},
  tools::ToolSpec,
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A backend able to produce the next assistant message, optionally carrying
/// tool-call requests.
pub trait ChatProvider: Send + Sync {
  /// Short backend name used in logs and errors.
  fn name(&self) -> &'static str;

  fn complete(
    &self,
    system: &str,
    messages: &[Message],
    tools: &[ToolSpec],
  ) -> impl Future<Output = Result<AssistantReply, ProviderError>> + Send;
}

// ─── Settings ────────────────────────────────────────────────────────────────

/// Provider section of the service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
  /// `"ollama"` or `"openai"`.
  pub kind:         String,
  pub model:        String,
  /// Overrides the backend's default endpoint.
  #[serde(default)]
  pub base_url:     Option<String>,
  /// Required by `openai`.
  #[serde(default)]
  pub api_key:      Option<String>,
  #[serde(default)]
  pub temperature:  f32,
  /// Per-request timeout. Unset means wait indefinitely.
  #[serde(default)]
  pub timeout_secs: Option<u64>,
}

impl ProviderSettings {
  #[cfg(test)]
  pub(crate) fn ollama(model: impl Into<String>) -> Self {
    Self {
      kind:         "ollama".into(),
      model:        model.into(),
      base_url:     None,
      api_key:      None,
      temperature:  0.0,
      timeout_secs: None,
    }
  }

  fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = self.timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// The configured backend.
pub enum Provider {
  Ollama(OllamaProvider),
  OpenAi(OpenAiProvider),
}

impl Provider {
  /// Select and construct a backend. Fails eagerly on an unknown `kind` or a
  /// missing credential.
  pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
    match settings.kind.trim().to_ascii_lowercase().as_str() {
      "ollama" => Ok(Provider::Ollama(OllamaProvider::new(settings)?)),
      "openai" => Ok(Provider::OpenAi(OpenAiProvider::new(settings)?)),
      other => Err(ProviderError::Unsupported(other.to_owned())),
    }
  }

  pub fn model(&self) -> &str {
    match self {
      Provider::Ollama(p) => p.model(),
      Provider::OpenAi(p) => p.model(),
    }
  }
}

impl ChatProvider for Provider {
  fn name(&self) -> &'static str {
    match self {
      Provider::Ollama(p) => p.name(),
      Provider::OpenAi(p) => p.name(),
    }
  }

  async fn complete(
    &self,
    system: &str,
    messages: &[Message],
    tools: &[ToolSpec],
  ) -> Result<AssistantReply, ProviderError> {
    match self {
      Provider::Ollama(p) => p.complete(system, messages, tools).await,
      Provider::OpenAi(p) => p.complete(system, messages, tools).await,
    }
  }
}

/// Send `body` as JSON and decode a 2xx JSON response.
async fn post_json<T>(
  provider: &'static str,
  request: reqwest::RequestBuilder,
  body: &serde_json::Value,
) -> Result<T, ProviderError>
where
  T: serde::de::DeserializeOwned,
{
  let http = |source: reqwest::Error| ProviderError::Http { provider, source };

  let resp = request.json(body).send().await.map_err(http)?;
  let status = resp.status();
  if !status.is_success() {
    let body = resp.text().await.unwrap_or_default();
    return Err(ProviderError::Status {
      provider,
      status: status.as_u16(),
      body,
    });
  }

  let text = resp.text().await.map_err(http)?;
  serde_json::from_str(&text).map_err(|e| ProviderError::Malformed {
    provider,
    reason: e.to_string(),
  })
}
