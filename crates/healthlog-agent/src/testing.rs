//! Test doubles shared by the unit tests in this crate.

use std::{
  collections::VecDeque,
  sync::Mutex,
};

use healthlog_core::{
  entry::{LogEntry, LogKind, StoredEntry},
  store::LogStore,
};

use crate::{
  error::ProviderError,
  message::{AssistantReply, Message, ToolCall},
  provider::ChatProvider,
  tools::ToolSpec,
};

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("connection refused")]
pub struct Unreachable;

/// A store whose backend is never reachable.
pub struct FailingStore;

impl LogStore for FailingStore {
  type Error = Unreachable;

  async fn record(&self, _entry: LogEntry) -> Result<StoredEntry, Unreachable> {
    Err(Unreachable)
  }

  async fn list(
    &self,
    _kind: LogKind,
    _limit: Option<usize>,
  ) -> Result<Vec<StoredEntry>, Unreachable> {
    Err(Unreachable)
  }

  async fn count(&self, _kind: LogKind) -> Result<u64, Unreachable> {
    Err(Unreachable)
  }
}

// ─── Provider ────────────────────────────────────────────────────────────────

/// Replays a fixed list of replies and records what it was asked.
#[derive(Default)]
pub struct ScriptedProvider {
  replies: Mutex<VecDeque<AssistantReply>>,
  /// `(system prompt, history length)` per call.
  pub seen: Mutex<Vec<(String, usize)>>,
}

impl ScriptedProvider {
  pub fn new(replies: impl IntoIterator<Item = AssistantReply>) -> Self {
    Self {
      replies: Mutex::new(replies.into_iter().collect()),
      seen:    Mutex::new(Vec::new()),
    }
  }

  pub fn calls(&self) -> usize { self.seen.lock().unwrap().len() }
}

impl ChatProvider for ScriptedProvider {
  fn name(&self) -> &'static str { "scripted" }

  async fn complete(
    &self,
    system: &str,
    messages: &[Message],
    _tools: &[ToolSpec],
  ) -> Result<AssistantReply, ProviderError> {
    self
      .seen
      .lock()
      .unwrap()
      .push((system.to_owned(), messages.len()));
    self.replies.lock().unwrap().pop_front().ok_or_else(|| {
      ProviderError::Malformed {
        provider: "scripted",
        reason:   "script exhausted".into(),
      }
    })
  }
}

/// A reply that requests the given tool calls.
pub fn calls(calls: Vec<ToolCall>) -> AssistantReply {
  AssistantReply { content: String::new(), tool_calls: calls }
}

pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
  ToolCall { id: id.into(), name: name.into(), arguments }
}
