//! The result envelope returned by every logging tool.
//!
//! Tools never fail past their own boundary: persistence and validation
//! errors become [`ToolOutcome::Failed`] and travel back to the model as data.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::entry::LogKind;

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
  /// Exactly one row was written.
  Logged {
    id:   i64,
    kind: LogKind,
    /// The persisted fields, echoed back as the tool received them.
    echo: Map<String, Value>,
  },
  /// Nothing was written.
  Failed { error: String },
}

impl ToolOutcome {
  pub fn failed(error: impl ToString) -> Self {
    Self::Failed { error: error.to_string() }
  }

  pub fn is_success(&self) -> bool { matches!(self, Self::Logged { .. }) }

  /// Wire form handed to the model and to API clients. A logged outcome is
  /// an object with `success: true`, the table's `logged` label and every
  /// echoed field; a failed one has `success: false` and an `error` message.
  pub fn to_json(&self) -> Value {
    match self {
      ToolOutcome::Logged { kind, echo, .. } => {
        let mut out = Map::with_capacity(echo.len() + 2);
        out.insert("success".into(), Value::Bool(true));
        out.insert("logged".into(), Value::String(kind.label().to_owned()));
        out.extend(echo.iter().map(|(k, v)| (k.clone(), v.clone())));
        Value::Object(out)
      }
      ToolOutcome::Failed { error } => {
        json!({ "success": false, "error": error })
      }
    }
  }
}

impl Serialize for ToolOutcome {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.to_json().serialize(serializer)
  }
}
