//! HTTP surface for the health logging agent.
//!
//! Exposes an axum [`Router`] backed by any [`ChatProvider`] and
//! [`LogStore`]. TLS and auth are the caller's responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/health` | Fixed liveness payload |
//! | `POST` | `/chat` | Body: [`chat::ChatRequest`]; runs the agent loop |
//! | `GET`  | `/logs/{kind}` | Stored rows of one table, newest first; `?limit` |

pub mod chat;
pub mod error;
pub mod logs;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use healthlog_agent::{Agent, ChatProvider};
use healthlog_core::store::LogStore;
use serde_json::{Value, json};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<P, S> {
  pub agent: Arc<Agent<P, S>>,
  pub store: Arc<S>,
}

impl<P, S> AppState<P, S>
where
  P: ChatProvider,
  S: LogStore,
{
  /// The agent and the read endpoints share one store.
  pub fn new(provider: P, store: Arc<S>, tz: chrono_tz::Tz, max_steps: usize) -> Self {
    let agent = Agent::new(provider, store.clone(), tz).with_max_steps(max_steps);
    Self { agent: Arc::new(agent), store }
  }
}

impl<P, S> Clone for AppState<P, S> {
  fn clone(&self) -> Self {
    Self { agent: self.agent.clone(), store: self.store.clone() }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the service router for `state`.
pub fn router<P, S>(state: AppState<P, S>) -> Router
where
  P: ChatProvider + 'static,
  S: LogStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .route("/chat", post(chat::handler::<P, S>))
    .route("/logs/{kind}", get(logs::list::<P, S>))
    .with_state(state)
}

/// `GET /health`
async fn health() -> Json<Value> {
  Json(json!({ "status": "healthy", "service": "ai-data-logger" }))
}
