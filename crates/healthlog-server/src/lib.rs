//! Process wiring for the health logging service.
//!
//! Configuration loading, provider selection and the plain-text rendering
//! used by one-shot prompt mode. The binary in `main.rs` glues these to the
//! SQLite store and the HTTP router.

pub mod error;

pub use error::Error;

use std::{
  fmt::Write as _,
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use healthlog_agent::{Conversation, Message, Provider, ProviderSettings};
use healthlog_api::AppState;
use healthlog_core::store::LogStore;
use serde::Deserialize;

/// Prompts exercised by `--demo`.
pub const DEMO_PROMPTS: [&str; 4] = [
  "I spent 20 minutes in a 174F sauna at 10:12 am on 2025-07-28",
  "Yesterday at 3pm my blood pressure was 120/80 and heart rate was 65",
  "This morning I weighed 185 lbs with 22% body fat, 85 lbs muscle mass, and \
   0.38 water ratio",
  "I did a sauna session for 30 minutes this morning and my BP was 118/75 \
   with pulse 70 afterwards",
];

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration, read once at startup from `healthlog.toml` and
/// `HEALTHLOG_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub database_path: PathBuf,
  /// IANA zone name used to interpret naive and relative times.
  pub timezone:      String,
  pub max_steps:     usize,
  pub provider:      ProviderSettings,
}

impl ServerConfig {
  /// Layer defaults, the optional file at `path`, then the environment.
  pub fn load(path: &Path) -> Result<Self, Error> {
    Self::load_with_env(path, None)
  }

  /// [`ServerConfig::load`] reading variables from `env` instead of the
  /// process environment when given.
  pub fn load_with_env(
    path: &Path,
    env: Option<config::Map<String, String>>,
  ) -> Result<Self, Error> {
    let settings = Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 8000_i64)?
      .set_default("database_path", "healthlog.db")?
      .set_default("timezone", "America/Chicago")?
      .set_default("max_steps", healthlog_agent::DEFAULT_MAX_STEPS as i64)?
      .set_default("provider.kind", "ollama")?
      .set_default("provider.model", "qwen2.5:7b")?
      .set_default("provider.temperature", 0.0_f64)?
      .add_source(File::from(path).required(false))
      .add_source(
        Environment::with_prefix("HEALTHLOG")
          .prefix_separator("_")
          .separator("__")
          .source(env),
      )
      .build()?;

    let cfg: ServerConfig = settings.try_deserialize()?;
    cfg.tz()?;
    Ok(cfg)
  }

  pub fn tz(&self) -> Result<Tz, Error> {
    self
      .timezone
      .trim()
      .parse()
      .map_err(|_| Error::Timezone(self.timezone.clone()))
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Select the provider and assemble handler state around `store`.
  /// Fails on an unsupported provider or a missing credential.
  pub fn app_state<S: LogStore>(
    &self,
    store: Arc<S>,
  ) -> Result<AppState<Provider, S>, Error> {
    let provider = Provider::from_settings(&self.provider)?;
    Ok(AppState::new(provider, store, self.tz()?, self.max_steps))
  }
}

// ─── One-shot rendering ───────────────────────────────────────────────────────

/// Plain-text transcript of a conversation, one line per message or tool
/// call.
pub fn render(convo: &Conversation) -> String {
  let mut out = String::new();
  for message in convo.messages() {
    match message {
      Message::User { content } => {
        let _ = writeln!(out, "user: {content}");
      }
      Message::Assistant { content, tool_calls } => {
        for call in tool_calls {
          let _ = writeln!(out, "assistant -> {} {}", call.name, call.arguments);
        }
        if !content.is_empty() {
          let _ = writeln!(out, "assistant: {content}");
        }
      }
      Message::Tool { name, outcome, .. } => {
        let _ = writeln!(out, "tool {name}: {}", outcome.to_json());
      }
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use healthlog_agent::{ChatProvider, ToolCall};
  use healthlog_core::{entry::LogKind, outcome::ToolOutcome};
  use healthlog_store_sqlite::SqliteStore;
  use serde_json::json;

  use super::*;

  fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
    Some(
      pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
    )
  }

  fn missing_file() -> PathBuf {
    std::env::temp_dir().join("healthlog-does-not-exist.toml")
  }

  #[test]
  fn defaults_apply_without_file_or_env() {
    let cfg = ServerConfig::load_with_env(&missing_file(), env(&[])).unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:8000");
    assert_eq!(cfg.database_path, PathBuf::from("healthlog.db"));
    assert_eq!(cfg.tz().unwrap(), chrono_tz::America::Chicago);
    assert_eq!(cfg.max_steps, 8);
    assert_eq!(cfg.provider.kind, "ollama");
    assert_eq!(cfg.provider.model, "qwen2.5:7b");
    assert_eq!(cfg.provider.temperature, 0.0);
    assert!(cfg.provider.api_key.is_none());
  }

  #[test]
  fn environment_overrides_nested_keys() {
    let cfg = ServerConfig::load_with_env(
      &missing_file(),
      env(&[
        ("HEALTHLOG_PORT", "9100"),
        ("HEALTHLOG_TIMEZONE", "Europe/Berlin"),
        ("HEALTHLOG_PROVIDER__KIND", "openai"),
        ("HEALTHLOG_PROVIDER__MODEL", "gpt-4o-mini"),
        ("HEALTHLOG_PROVIDER__API_KEY", "sk-test"),
      ]),
    )
    .unwrap();

    assert_eq!(cfg.port, 9100);
    assert_eq!(cfg.tz().unwrap(), chrono_tz::Europe::Berlin);
    assert_eq!(cfg.provider.kind, "openai");
    assert_eq!(cfg.provider.model, "gpt-4o-mini");
    assert_eq!(cfg.provider.api_key.as_deref(), Some("sk-test"));
  }

  #[test]
  fn file_is_layered_under_environment() {
    let path = std::env::temp_dir()
      .join(format!("healthlog-config-{}.toml", std::process::id()));
    std::fs::write(
      &path,
      "port = 7000\ndatabase_path = \"/var/lib/healthlog.db\"\n\n\
       [provider]\nmodel = \"llama3.1:8b\"\ntemperature = 0.2\n",
    )
    .unwrap();

    let cfg = ServerConfig::load_with_env(&path, env(&[("HEALTHLOG_PORT", "7001")]));
    std::fs::remove_file(&path).ok();
    let cfg = cfg.unwrap();

    assert_eq!(cfg.port, 7001);
    assert_eq!(cfg.database_path, PathBuf::from("/var/lib/healthlog.db"));
    assert_eq!(cfg.provider.kind, "ollama");
    assert_eq!(cfg.provider.model, "llama3.1:8b");
    assert!((cfg.provider.temperature - 0.2).abs() < f32::EPSILON);
  }

  #[test]
  fn invalid_timezone_aborts_loading() {
    let err = ServerConfig::load_with_env(
      &missing_file(),
      env(&[("HEALTHLOG_TIMEZONE", "Mars/Olympus_Mons")]),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Timezone(tz) if tz == "Mars/Olympus_Mons"));
  }

  #[tokio::test]
  async fn provider_selection_fails_eagerly() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());

    let cfg = ServerConfig::load_with_env(
      &missing_file(),
      env(&[("HEALTHLOG_PROVIDER__KIND", "openai")]),
    )
    .unwrap();
    assert!(matches!(
      cfg.app_state(store.clone()),
      Err(Error::Provider(healthlog_agent::ProviderError::MissingCredential(_)))
    ));

    let cfg = ServerConfig::load_with_env(
      &missing_file(),
      env(&[("HEALTHLOG_PROVIDER__KIND", "palm")]),
    )
    .unwrap();
    assert!(matches!(
      cfg.app_state(store.clone()),
      Err(Error::Provider(healthlog_agent::ProviderError::Unsupported(_)))
    ));

    let state = ServerConfig::load_with_env(&missing_file(), env(&[]))
      .unwrap()
      .app_state(store)
      .unwrap();
    assert_eq!(state.agent.provider().name(), "ollama");
    assert_eq!(state.agent.timezone(), chrono_tz::America::Chicago);
  }

  #[test]
  fn render_shows_calls_results_and_answer() {
    let call = ToolCall {
      id:        "call_1".into(),
      name:      "log_sauna_data".into(),
      arguments: json!({ "duration_min": 20 }),
    };
    let mut convo = Conversation::new(vec![Message::user("20 min sauna")]);
    convo.push(Message::Assistant {
      content:    String::new(),
      tool_calls: vec![call.clone()],
    });
    convo.push(Message::tool_result(&call, ToolOutcome::Logged {
      id:   1,
      kind: LogKind::Sauna,
      echo: Default::default(),
    }));
    convo.push(Message::assistant("Logged."));

    let text = render(&convo);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "user: 20 min sauna");
    assert_eq!(lines[1], r#"assistant -> log_sauna_data {"duration_min":20}"#);
    let result = lines[2].strip_prefix("tool log_sauna_data: ").unwrap();
    assert_eq!(
      serde_json::from_str::<serde_json::Value>(result).unwrap(),
      json!({ "success": true, "logged": "sauna session" })
    );
    assert_eq!(lines[3], "assistant: Logged.");
  }
}
