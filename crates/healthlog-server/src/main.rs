//! healthlog server binary.
//!
//! Reads `healthlog.toml` (or the path given with `--config`) layered under
//! `HEALTHLOG_*` environment variables, opens the SQLite store, and serves
//! the chat API over HTTP.
//!
//! # One-shot mode
//!
//! Run the agent over prompts without serving, printing each conversation:
//!
//! ```
//! cargo run -p healthlog-server -- --prompt "20 minutes in the sauna just now"
//! cargo run -p healthlog-server -- --demo
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use healthlog_agent::{ChatProvider, Message, Provider};
use healthlog_api::AppState;
use healthlog_server::{DEMO_PROMPTS, ServerConfig, render};
use healthlog_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Conversational health data logger")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "healthlog.toml")]
  config: PathBuf,

  /// Run the agent over this prompt and print the conversation instead of
  /// serving. May be repeated.
  #[arg(short, long)]
  prompt: Vec<String>,

  /// Like `--prompt`, over a fixed set of sample prompts.
  #[arg(long, conflicts_with = "prompt")]
  demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;

  let store_path = expand_tilde(&cfg.database_path);
  let store = Arc::new(
    SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?,
  );

  let state = cfg
    .app_state(store.clone())
    .context("failed to configure model provider")?;
  tracing::info!(
    provider = state.agent.provider().name(),
    model = state.agent.provider().model(),
    timezone = state.agent.timezone().name(),
    "agent ready"
  );

  let prompts: Vec<String> = if cli.demo {
    DEMO_PROMPTS.iter().map(|p| p.to_string()).collect()
  } else {
    cli.prompt
  };

  if prompts.is_empty() {
    serve(&cfg.address(), state).await?;
  } else {
    one_shot(&state, &prompts).await;
    drop(state);
  }

  // Every other handle on the store went away with the router or the state.
  match Arc::try_unwrap(store) {
    Ok(store) => store.close().await.context("failed to close store")?,
    Err(_) => tracing::warn!("store still in use at shutdown; not closed"),
  }
  Ok(())
}

async fn serve(
  address: &str,
  state: AppState<Provider, SqliteStore>,
) -> anyhow::Result<()> {
  let app = healthlog_api::router(state).layer(TraceLayer::new_for_http());

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      tokio::signal::ctrl_c().await.ok();
      tracing::info!("shutting down");
    })
    .await
    .context("server error")
}

/// Run each prompt as its own single-turn conversation and print it.
async fn one_shot(state: &AppState<Provider, SqliteStore>, prompts: &[String]) {
  for (i, prompt) in prompts.iter().enumerate() {
    println!("=== {} / {} ===", i + 1, prompts.len());
    match state.agent.run(vec![Message::user(prompt.as_str())]).await {
      Ok(convo) => print!("{}", render(&convo)),
      Err(e) => {
        println!("user: {prompt}");
        println!("error: {e}");
      }
    }
    println!();
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
