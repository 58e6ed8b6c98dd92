//! Ollama's native `/api/chat` endpoint.

use serde::Deserialize;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::{ChatProvider, ProviderSettings, post_json};
use crate::{
  error::ProviderError,
  message::{AssistantReply, Message, ToolCall},
  tools::ToolSpec,
};

const NAME: &str = "ollama";
const DEFAULT_BASE_URL: &str = "http://localhost:11434";

pub struct OllamaProvider {
  client:      reqwest::Client,
  base_url:    String,
  model:       String,
  temperature: f32,
}

impl OllamaProvider {
  pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
    let client = settings
      .http_client()
      .map_err(|source| ProviderError::Http { provider: NAME, source })?;
    Ok(Self {
      client,
      base_url: settings
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
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
    json!({
      "model": self.model,
      "messages": wire_messages(system, messages),
      "tools": tools.iter().map(ToolSpec::to_function_json).collect::<Vec<_>>(),
      "stream": false,
      "options": { "temperature": self.temperature },
    })
  }
}

impl ChatProvider for OllamaProvider {
  fn name(&self) -> &'static str { NAME }

  async fn complete(
    &self,
    system: &str,
    messages: &[Message],
    tools: &[ToolSpec],
  ) -> Result<AssistantReply, ProviderError> {
    let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
    let body = self.request_body(system, messages, tools);
    let resp: ChatResponse = post_json(NAME, self.client.post(url), &body).await?;
    Ok(resp.message.into_reply())
  }
}

// ─── Wire format ─────────────────────────────────────────────────────────────

fn wire_messages(system: &str, messages: &[Message]) -> Vec<Value> {
  let mut out = Vec::with_capacity(messages.len() + 1);
  out.push(json!({ "role": "system", "content": system }));
  for message in messages {
    out.push(match message {
      Message::User { content } => json!({ "role": "user", "content": content }),
      Message::Assistant { content, tool_calls } => {
        let mut m = Map::new();
        m.insert("role".into(), "assistant".into());
        m.insert("content".into(), content.as_str().into());
        if !tool_calls.is_empty() {
          let calls: Vec<Value> = tool_calls
            .iter()
            .map(|c| json!({ "function": { "name": c.name, "arguments": c.arguments } }))
            .collect();
          m.insert("tool_calls".into(), Value::Array(calls));
        }
        Value::Object(m)
      }
      Message::Tool { name, outcome, .. } => json!({
        "role": "tool",
        "tool_name": name,
        "content": outcome.to_json().to_string(),
      }),
    });
  }
  out
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
  #[serde(default)]
  content:    String,
  #[serde(default)]
  tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
  function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
  name:      String,
  #[serde(default)]
  arguments: Value,
}

impl ResponseMessage {
  /// Ollama does not assign tool-call ids, so one is minted per call.
  fn into_reply(self) -> AssistantReply {
    AssistantReply {
      content:    self.content,
      tool_calls: self
        .tool_calls
        .into_iter()
        .map(|c| ToolCall {
          id:        format!("call_{}", Uuid::new_v4().simple()),
          name:      c.function.name,
          arguments: c.function.arguments,
        })
        .collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use healthlog_core::outcome::ToolOutcome;

  use super::*;
  use crate::tools::Tool;

  fn provider() -> OllamaProvider {
    OllamaProvider::new(&ProviderSettings::ollama("qwen2.5:7b")).unwrap()
  }

  #[test]
  fn request_leads_with_system_prompt_and_disables_streaming() {
    let body = provider().request_body(
      "be helpful",
      &[Message::user("20 min sauna")],
      &[Tool::LogSauna.spec()],
    );

    assert_eq!(body["model"], "qwen2.5:7b");
    assert_eq!(body["stream"], false);
    assert_eq!(body["messages"][0], json!({ "role": "system", "content": "be helpful" }));
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["tools"][0]["function"]["name"], "log_sauna_data");
  }

  #[test]
  fn tool_turns_are_encoded_with_names() {
    let call = ToolCall {
      id:        "call_1".into(),
      name:      "log_sauna_data".into(),
      arguments: json!({ "duration_min": 20 }),
    };
    let messages = vec![
      Message::user("sauna"),
      Message::Assistant { content: String::new(), tool_calls: vec![call.clone()] },
      Message::tool_result(&call, ToolOutcome::failed("locked")),
    ];

    let wire = wire_messages("sys", &messages);
    assert_eq!(wire[2]["tool_calls"][0]["function"]["arguments"]["duration_min"], 20);
    assert_eq!(wire[3]["role"], "tool");
    assert_eq!(wire[3]["tool_name"], "log_sauna_data");
    let content: Value =
      serde_json::from_str(wire[3]["content"].as_str().unwrap()).unwrap();
    assert_eq!(content["success"], false);
  }

  #[test]
  fn response_tool_calls_get_fresh_ids() {
    let resp: ChatResponse = serde_json::from_value(json!({
      "model": "qwen2.5:7b",
      "message": {
        "role": "assistant",
        "content": "",
        "tool_calls": [
          { "function": { "name": "log_sauna_data", "arguments": { "duration_min": 20 } } },
          { "function": { "name": "log_heart_data", "arguments": { "rate_bpm": 70 } } }
        ]
      },
      "done": true
    }))
    .unwrap();

    let reply = resp.message.into_reply();
    assert_eq!(reply.tool_calls.len(), 2);
    assert_eq!(reply.tool_calls[0].name, "log_sauna_data");
    assert_ne!(reply.tool_calls[0].id, reply.tool_calls[1].id);
  }

  #[test]
  fn plain_answer_has_no_tool_calls() {
    let resp: ChatResponse = serde_json::from_value(json!({
      "message": { "role": "assistant", "content": "Logged it." },
      "done": true
    }))
    .unwrap();
    assert_eq!(resp.message.into_reply(), AssistantReply::text("Logged it."));
  }
}
