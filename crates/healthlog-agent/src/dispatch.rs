//! The reason/act loop.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use healthlog_core::store::LogStore;
use tracing::{debug, info, warn};

use crate::{
  error::AgentError,
  message::{Conversation, Message, ToolCall},
  prompt::system_prompt,
  provider::ChatProvider,
  tools::Toolbox,
};

/// Reasoning steps allowed per request before the loop gives up.
pub const DEFAULT_MAX_STEPS: usize = 8;

enum Step {
  Reason,
  Act(Vec<ToolCall>),
  Done,
}

/// Drives one conversation between a provider and the logging tools.
pub struct Agent<P, S> {
  provider:  P,
  toolbox:   Toolbox<S>,
  tz:        Tz,
  max_steps: usize,
}

impl<P, S> Agent<P, S>
where
  P: ChatProvider,
  S: LogStore,
{
  pub fn new(provider: P, store: Arc<S>, tz: Tz) -> Self {
    Self {
      provider,
      toolbox: Toolbox::new(store, tz),
      tz,
      max_steps: DEFAULT_MAX_STEPS,
    }
  }

  /// Cap on provider calls per request. Zero is treated as one.
  pub fn with_max_steps(mut self, max_steps: usize) -> Self {
    self.max_steps = max_steps.max(1);
    self
  }

  pub fn timezone(&self) -> Tz { self.tz }

  pub fn provider(&self) -> &P { &self.provider }

  /// Run the loop until the model answers without requesting tools.
  ///
  /// Tool failures are reported back to the model and never end the loop.
  /// A provider failure or an exhausted step budget does, and whatever rows
  /// earlier tool calls wrote stay written.
  pub async fn run(&self, history: Vec<Message>) -> Result<Conversation, AgentError> {
    self.run_at(history, Utc::now()).await
  }

  /// [`Agent::run`] with an explicit clock.
  pub async fn run_at(
    &self,
    history: Vec<Message>,
    now: DateTime<Utc>,
  ) -> Result<Conversation, AgentError> {
    let system = system_prompt(now.with_timezone(&self.tz));
    let specs = self.toolbox.specs();
    let mut conversation = Conversation::new(history);
    let mut steps = 0;
    let mut step = Step::Reason;

    loop {
      step = match step {
        Step::Reason => {
          if steps == self.max_steps {
            warn!(steps, "step budget exhausted without a final answer");
            return Err(AgentError::StepBudgetExhausted(steps));
          }
          steps += 1;

          let reply = self
            .provider
            .complete(&system, conversation.messages(), &specs)
            .await
            .inspect_err(|e| warn!(provider = self.provider.name(), "{e}"))?;
          info!(
            step = steps,
            provider = self.provider.name(),
            tool_calls = reply.tool_calls.len(),
            "model replied"
          );

          let calls = reply.tool_calls.clone();
          conversation.push(Message::Assistant {
            content:    reply.content,
            tool_calls: reply.tool_calls,
          });
          if calls.is_empty() { Step::Done } else { Step::Act(calls) }
        }

        // Calls run in the order the model emitted them.
        Step::Act(calls) => {
          for call in &calls {
            debug!(id = %call.id, tool = %call.name, arguments = %call.arguments, "dispatching");
            let outcome = self.toolbox.dispatch(call).await;
            if outcome.is_success() {
              info!(id = %call.id, tool = %call.name, "tool call logged");
            } else {
              warn!(id = %call.id, tool = %call.name, outcome = %outcome.to_json(), "tool call failed");
            }
            conversation.push(Message::tool_result(call, outcome));
          }
          Step::Reason
        }

        Step::Done => return Ok(conversation),
      };
    }
  }
}
