//! Error types for `healthlog-agent`.

use thiserror::Error;

/// Failure to configure or talk to a chat-completion backend.
#[derive(Debug, Error)]
pub enum ProviderError {
  #[error("unsupported model provider: {0:?}")]
  Unsupported(String),

  #[error("missing credential: {0} must be set")]
  MissingCredential(&'static str),

  #[error("request to {provider} failed: {source}")]
  Http {
    provider: &'static str,
    #[source]
    source:   reqwest::Error,
  },

  #[error("{provider} returned {status}: {body}")]
  Status {
    provider: &'static str,
    status:   u16,
    body:     String,
  },

  #[error("unexpected response from {provider}: {reason}")]
  Malformed {
    provider: &'static str,
    reason:   String,
  },
}

/// Why a single tool invocation wrote nothing. Always reported to the model
/// as a failed tool result, never raised out of the loop.
#[derive(Debug, Error)]
pub enum ToolError {
  #[error("unknown tool: {0}")]
  UnknownTool(String),

  #[error("invalid arguments for {tool}: {source}")]
  InvalidArguments {
    tool:   &'static str,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid datetime_value: {0}")]
  Timestamp(String),

  #[error(transparent)]
  Core(#[from] healthlog_core::Error),

  #[error("{0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A failure that aborts the whole dispatch loop.
#[derive(Debug, Error)]
pub enum AgentError {
  #[error("model invocation failed: {0}")]
  Provider(#[from] ProviderError),

  #[error("no final answer after {0} reasoning steps")]
  StepBudgetExhausted(usize),
}
