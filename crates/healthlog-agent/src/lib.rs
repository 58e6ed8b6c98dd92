//! Conversational logging agent.
//!
//! A two-state loop: *reason* asks a chat-completion provider for the next
//! assistant message, *act* executes any tool calls that message requests and
//! appends their results. The loop ends when the model stops asking for tools.
//!
//! ```rust,ignore
//! let agent = Agent::new(provider, store, chrono_tz::America::Chicago);
//! let conversation = agent.run(vec![Message::user("20 min sauna just now")]).await?;
//! ```

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
#![allow(async_fn_in_trait)]

pub mod dispatch;
pub mod error;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod tools;

pub use dispatch::{Agent, DEFAULT_MAX_STEPS};
pub use error::{AgentError, ProviderError, ToolError};
pub use message::{AssistantReply, Conversation, Message, ToolCall};
pub use provider::{ChatProvider, Provider, ProviderSettings};
pub use tools::{Tool, ToolSpec, Toolbox};

#[cfg(test)]
mod testing;
