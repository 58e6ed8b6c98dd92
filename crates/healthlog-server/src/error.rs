//! Startup errors.

use healthlog_agent::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),
  #[error("unknown timezone: {0:?}")]
  Timezone(String),
  #[error(transparent)]
  Provider(#[from] ProviderError),
}
