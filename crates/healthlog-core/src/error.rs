//! Error types for `healthlog-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown log kind: {0:?}")]
  UnknownKind(String),

  #[error("{field} must not be empty")]
  EmptyField { field: &'static str },

  #[error("{field} must be at most {max} characters (got {len})")]
  FieldTooLong {
    field: &'static str,
    max:   usize,
    len:   usize,
  },

  #[error("{field} must be a finite, non-negative number (got {value})")]
  InvalidMeasurement { field: &'static str, value: f64 },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
