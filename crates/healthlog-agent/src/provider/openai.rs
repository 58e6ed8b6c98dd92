//! OpenAI-compatible `/chat/completions` endpoint.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{ChatProvider, ProviderSettings, post_json};
use crate::{
  error::ProviderError,
  message::{AssistantReply, Message, ToolCall},
  tools::ToolSpec,
};

const NAME: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
  client:      reqwest::Client,
  base_url:    String,
  api_key:     String,
  model:       String,
  temperature: f32,
}

impl OpenAiProvider {
  pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
    let api_key = settings
      .api_key
      .as_deref()
      .map(str::trim)
      .filter(|k| !k.is_empty())
      .ok_or(ProviderError::MissingCredential("provider.api_key"))?
      .to_owned();
    let client = settings
      .http_client()
      .map_err(|source| ProviderError::Http { provider: NAME, source })?;
    Ok(Self {
      client,
      base_url: settings
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
      api_key,
      model: settings.model.clone(),
      temperature: settings.temperature,
    })
  }

  pub fn model(&self) -> &str { &self.model }

  fn request_body(
    &self,
    system: &str,
    messages: &[Message],
    tools: &[ToolSpec],
  ) -> Value {
    let mut body = Map::new();
    body.insert("model".into(), self.model.as_str().into());
    body.insert("messages".into(), Value::Array(wire_messages(system, messages)));
    body.insert("temperature".into(), json!(self.temperature));
    if !tools.is_empty() {
      body.insert(
        "tools".into(),
        tools.iter().map(ToolSpec::to_function_json).collect(),
      );
    }
    Value::Object(body)
  }
}

impl ChatProvider for OpenAiProvider {
  fn name(&self) -> &'static str { NAME }

  async fn complete(
    &self,
    system: &str,
    messages: &[Message],
    tools: &[ToolSpec],
  ) -> Result<AssistantReply, ProviderError> {
    let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
    let body = self.request_body(system, messages, tools);
    let request = self.client.post(url).bearer_auth(&self.api_key);
    let resp: CompletionResponse = post_json(NAME, request, &body).await?;

    resp
      .choices
      .into_iter()
      .next()
      .map(|choice| choice.message.into_reply())
      .ok_or_else(|| ProviderError::Malformed {
        provider: NAME,
        reason:   "response contained no choices".into(),
      })
  }
}

// ─── Wire format ─────────────────────────────────────────────────────────────

fn wire_messages(system: &str, messages: &[Message]) -> Vec<Value> {
  let mut out = Vec::with_capacity(messages.len() + 1);
  out.push(json!({ "role": "system", "content": system }));
  for message in messages {
    out.push(match message {
      Message::User { content } => json!({ "role": "user", "content": content }),
      Message::Assistant { content, tool_calls } if tool_calls.is_empty() => {
        json!({ "role": "assistant", "content": content })
      }
      Message::Assistant { content, tool_calls } => {
        let calls: Vec<Value> = tool_calls
          .iter()
          .map(|c| {
            json!({
              "id": c.id,
              "type": "function",
              "function": { "name": c.name, "arguments": c.arguments.to_string() },
            })
          })
          .collect();
        let content = match content.as_str() {
          "" => Value::Null,
          text => text.into(),
        };
        json!({ "role": "assistant", "content": content, "tool_calls": calls })
      }
      Message::Tool { call_id, outcome, .. } => json!({
        "role": "tool",
        "tool_call_id": call_id,
        "content": outcome.to_json().to_string(),
      }),
    });
  }
  out
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
  #[serde(default)]
  content:    Option<String>,
  #[serde(default)]
  tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
  id:       String,
  function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
  name:      String,
  /// JSON-encoded object, as a string.
  arguments: String,
}

impl ResponseMessage {
  fn into_reply(self) -> AssistantReply {
    AssistantReply {
      content:    self.content.unwrap_or_default(),
      tool_calls: self
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|c| ToolCall {
          id:        c.id,
          name:      c.function.name,
          // Unparseable arguments are passed through as a string; the tool
          // rejects them and the model sees the failure.
          arguments: serde_json::from_str(&c.function.arguments)
            .unwrap_or(Value::String(c.function.arguments)),
        })
        .collect(),
    }
  }
}
