//! `POST /chat`: run the agent over a client-held conversation.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use healthlog_agent::{ChatProvider, Conversation, Message};
use healthlog_core::store::LogStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role:    Role,
  pub content: String,
}

impl From<ChatMessage> for Message {
  fn from(m: ChatMessage) -> Self {
    match m.role {
      Role::User => Message::user(m.content),
      Role::Assistant => Message::assistant(m.content),
    }
  }
}

/// The full history so far; the server keeps no session state.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
  pub messages: Vec<ChatMessage>,
}

/// One row written while answering the request.
#[derive(Debug, Serialize)]
pub struct LoggedItem {
  pub tool:   String,
  pub result: Value,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
  pub message:      ChatMessage,
  pub logged_items: Vec<LoggedItem>,
}

impl From<&Conversation> for ChatResponse {
  fn from(convo: &Conversation) -> Self {
    Self {
      message:      ChatMessage {
        role:    Role::Assistant,
        content: convo.final_reply().unwrap_or_default().to_owned(),
      },
      logged_items: convo
        .logged()
        .map(|(tool, outcome)| LoggedItem {
          tool:   tool.to_owned(),
          result: outcome.to_json(),
        })
        .collect(),
    }
  }
}

/// `POST /chat`
pub async fn handler<P, S>(
  State(state): State<AppState<P, S>>,
  payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError>
where
  P: ChatProvider + 'static,
  S: LogStore + 'static,
{
  let Json(req) = payload?;
  if req.messages.is_empty() {
    return Err(ApiError::BadRequest("messages must not be empty".into()));
  }

  let history: Vec<Message> = req.messages.into_iter().map(Message::from).collect();
  let turns = history.len();
  let convo = state.agent.run(history).await?;

  let response = ChatResponse::from(&convo);
  tracing::info!(
    turns,
    logged = response.logged_items.len(),
    "chat request answered"
  );
  Ok(Json(response))
}
