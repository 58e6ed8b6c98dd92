//! Conversation messages and the append-only conversation buffer.

use healthlog_core::outcome::ToolOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A model-emitted request to run a tool. Nothing has executed yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
  /// Correlates the request with its result message.
  pub id:        String,
  pub name:      String,
  pub arguments: Value,
}

/// What a provider returns for one reasoning step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistantReply {
  pub content:    String,
  pub tool_calls: Vec<ToolCall>,
}

impl AssistantReply {
  pub fn text(content: impl Into<String>) -> Self {
    Self { content: content.into(), tool_calls: Vec::new() }
  }
}

/// One turn of the conversation. The system prompt is not part of the
/// history; it is rebuilt for every reasoning step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
  User {
    content: String,
  },
  Assistant {
    content:    String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ToolCall>,
  },
  Tool {
    call_id: String,
    name:    String,
    outcome: ToolOutcome,
  },
}

impl Message {
  pub fn user(content: impl Into<String>) -> Self {
    Self::User { content: content.into() }
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self::Assistant { content: content.into(), tool_calls: Vec::new() }
  }

  /// The result message answering `call`.
  pub fn tool_result(call: &ToolCall, outcome: ToolOutcome) -> Self {
    Self::Tool {
      call_id: call.id.clone(),
      name: call.name.clone(),
      outcome,
    }
  }
}

/// The ordered message history of one request. Writes only ever append.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
  messages: Vec<Message>,
}

impl Conversation {
  pub fn new(history: Vec<Message>) -> Self { Self { messages: history } }

  pub fn push(&mut self, message: Message) { self.messages.push(message); }

  pub fn messages(&self) -> &[Message] { &self.messages }

  /// Content of the trailing assistant message, if the conversation ends
  /// with one.
  pub fn final_reply(&self) -> Option<&str> {
    match self.messages.last() {
      Some(Message::Assistant { content, .. }) => Some(content.as_str()),
      _ => None,
    }
  }

  /// Every tool result in order, as `(tool name, outcome)`.
  pub fn tool_results(&self) -> impl Iterator<Item = (&str, &ToolOutcome)> {
    self.messages.iter().filter_map(|m| match m {
      Message::Tool { name, outcome, .. } => Some((name.as_str(), outcome)),
      _ => None,
    })
  }

  /// Tool results that wrote a row.
  pub fn logged(&self) -> impl Iterator<Item = (&str, &ToolOutcome)> {
    self.tool_results().filter(|(_, outcome)| outcome.is_success())
  }
}

#[cfg(test)]
mod tests {
  use healthlog_core::entry::LogKind;
  use serde_json::json;

  use super::*;

  fn call(id: &str) -> ToolCall {
    ToolCall {
      id:        id.into(),
      name:      "log_sauna_data".into(),
      arguments: json!({ "duration_min": 20 }),
    }
  }

  #[test]
  fn final_reply_requires_trailing_assistant() {
    let mut convo = Conversation::new(vec![Message::user("hi")]);
    assert_eq!(convo.final_reply(), None);

    convo.push(Message::assistant("hello"));
    assert_eq!(convo.final_reply(), Some("hello"));
  }

  #[test]
  fn logged_skips_failed_results() {
    let mut convo = Conversation::new(vec![Message::user("sauna twice")]);
    convo.push(Message::Assistant {
      content:    String::new(),
      tool_calls: vec![call("a"), call("b")],
    });
    convo.push(Message::tool_result(&call("a"), ToolOutcome::Logged {
      id:   1,
      kind: LogKind::Sauna,
      echo: Default::default(),
    }));
    convo.push(Message::tool_result(&call("b"), ToolOutcome::failed("locked")));

    assert_eq!(convo.tool_results().count(), 2);
    let logged: Vec<_> = convo.logged().map(|(name, _)| name).collect();
    assert_eq!(logged, vec!["log_sauna_data"]);
  }

  #[test]
  fn messages_serialise_with_role_tag() {
    let msg = Message::tool_result(&call("a"), ToolOutcome::failed("boom"));
    assert_eq!(
      serde_json::to_value(&msg).unwrap(),
      json!({
        "role": "tool",
        "call_id": "a",
        "name": "log_sauna_data",
        "outcome": { "success": false, "error": "boom" }
      })
    );
  }
}
