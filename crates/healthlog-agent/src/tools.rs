//! The logging tools the model may call, one per fact table.
//!
//! Every tool takes a `datetime_value` plus its table's fields, validates
//! them, writes one row through the [`LogStore`], and answers with a
//! [`ToolOutcome`]. Nothing a tool does can abort the conversation.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use healthlog_core::{
  entry::{
    AlcoholIntake, BodyComposition, CaffeineIntake, HeartReading, LogEntry,
    LogKind, NutritionIntake, Reading, SaunaSession,
  },
  outcome::ToolOutcome,
  store::LogStore,
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{error::ToolError, message::ToolCall};

// ─── Tool catalogue ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
  LogHeart,
  LogBody,
  LogNutrition,
  LogCaffeine,
  LogAlcohol,
  LogSauna,
}

impl Tool {
  pub const ALL: [Tool; 6] = [
    Tool::LogHeart,
    Tool::LogBody,
    Tool::LogNutrition,
    Tool::LogCaffeine,
    Tool::LogAlcohol,
    Tool::LogSauna,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Tool::LogHeart => "log_heart_data",
      Tool::LogBody => "log_body_data",
      Tool::LogNutrition => "log_nutrition_data",
      Tool::LogCaffeine => "log_caffeine_data",
      Tool::LogAlcohol => "log_alcohol_data",
      Tool::LogSauna => "log_sauna_data",
    }
  }

  pub fn from_name(name: &str) -> Option<Tool> {
    Tool::ALL.into_iter().find(|t| t.name() == name)
  }

  pub fn kind(self) -> LogKind {
    match self {
      Tool::LogHeart => LogKind::Heart,
      Tool::LogBody => LogKind::Body,
      Tool::LogNutrition => LogKind::Nutrition,
      Tool::LogCaffeine => LogKind::Caffeine,
      Tool::LogAlcohol => LogKind::Alcohol,
      Tool::LogSauna => LogKind::Sauna,
    }
  }

  /// One-line summary, also used in the system prompt.
  pub fn summary(self) -> &'static str {
    match self {
      Tool::LogHeart => {
        "For blood pressure and heart rate (requires systolic, diastolic, heart rate)"
      }
      Tool::LogBody => {
        "For body composition (requires weight, muscle mass, body fat %, water ratio)"
      }
      Tool::LogNutrition => {
        "For meals and snacks (requires a short and a long description, protein, sodium, potassium)"
      }
      Tool::LogCaffeine => {
        "For caffeinated drinks (requires an item description and caffeine in mg)"
      }
      Tool::LogAlcohol => {
        "For alcoholic drinks (requires an item description and ounces of alcohol)"
      }
      Tool::LogSauna => {
        "For sauna sessions (requires duration in minutes; temperature in Fahrenheit is optional)"
      }
    }
  }

  /// JSON-Schema description of the tool's arguments.
  pub fn parameters(self) -> Value {
    let datetime = json!({
      "type": "string",
      "description": "When it happened, ISO 8601 (e.g. 2025-07-28T10:12:00). \
                      Times without an offset are read in the user's timezone."
    });
    let (properties, required): (Value, Vec<&str>) = match self {
      Tool::LogHeart => (
        json!({
          "datetime_value": datetime,
          "systolic_mmhg":  { "type": "integer", "description": "Systolic blood pressure in mmHg" },
          "diastolic_mmhg": { "type": "integer", "description": "Diastolic blood pressure in mmHg" },
          "rate_bpm":       { "type": "integer", "description": "Heart rate in beats per minute" }
        }),
        vec!["datetime_value", "systolic_mmhg", "diastolic_mmhg", "rate_bpm"],
      ),
      Tool::LogBody => (
        json!({
          "datetime_value": datetime,
          "weight_lb": { "type": "number", "description": "Body weight in pounds" },
          "smm_lb":    { "type": "number", "description": "Skeletal muscle mass in pounds" },
          "pbf":       { "type": "number", "description": "Percent body fat" },
          "ecw_tcw":   { "type": "number", "description": "Extracellular water to total body water ratio" }
        }),
        vec!["datetime_value", "weight_lb", "smm_lb", "pbf", "ecw_tcw"],
      ),
      Tool::LogNutrition => (
        json!({
          "datetime_value":    datetime,
          "short_description": { "type": "string", "description": "What was eaten, at most 255 characters" },
          "protein_g":         { "type": "number", "description": "Protein in grams" },
          "sodium_mg":         { "type": "number", "description": "Sodium in milligrams" },
          "potassium_mg":      { "type": "number", "description": "Potassium in milligrams" },
          "long_description":  { "type": "string", "description": "Full description of the meal" }
        }),
        vec![
          "datetime_value",
          "short_description",
          "protein_g",
          "sodium_mg",
          "potassium_mg",
          "long_description",
        ],
      ),
      Tool::LogCaffeine => (
        json!({
          "datetime_value":   datetime,
          "item_description": { "type": "string", "description": "The drink, at most 255 characters" },
          "caffeine_mg":      { "type": "number", "description": "Caffeine in milligrams" }
        }),
        vec!["datetime_value", "item_description", "caffeine_mg"],
      ),
      Tool::LogAlcohol => (
        json!({
          "datetime_value":   datetime,
          "item_description": { "type": "string", "description": "The drink, at most 255 characters" },
          "alcohol_oz":       { "type": "number", "description": "Pure alcohol in fluid ounces" }
        }),
        vec!["datetime_value", "item_description", "alcohol_oz"],
      ),
      Tool::LogSauna => (
        json!({
          "datetime_value": datetime,
          "duration_min":   { "type": "integer", "description": "Duration of the session in minutes" },
          "temperature_f":  { "type": "integer", "description": "Sauna temperature in Fahrenheit, if given" }
        }),
        vec!["datetime_value", "duration_min"],
      ),
    };
    json!({
      "type": "object",
      "properties": properties,
      "required": required,
    })
  }

  pub fn spec(self) -> ToolSpec {
    ToolSpec {
      name:        self.name(),
      description: self.summary(),
      parameters:  self.parameters(),
    }
  }
}

/// A tool as advertised to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
  pub name:        &'static str,
  pub description: &'static str,
  pub parameters:  Value,
}

impl ToolSpec {
  /// The `{"type": "function", "function": {...}}` shape shared by the
  /// OpenAI and Ollama chat APIs.
  pub fn to_function_json(&self) -> Value {
    json!({
      "type": "function",
      "function": {
        "name": self.name,
        "description": self.description,
        "parameters": self.parameters,
      }
    })
  }
}

// ─── Arguments ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Args<T> {
  datetime_value: String,
  #[serde(flatten)]
  fields:         T,
}

fn parse_args<T: DeserializeOwned>(
  tool: Tool,
  arguments: &Value,
) -> Result<(String, T), ToolError> {
  let args: Args<T> = serde_json::from_value(arguments.clone()).map_err(
    |source| ToolError::InvalidArguments { tool: tool.name(), source },
  )?;
  Ok((args.datetime_value, args.fields))
}

/// Interpret a model-supplied timestamp.
///
/// Strings with an offset keep it, with or without seconds. Naive
/// `YYYY-MM-DD[T ]HH:MM[:SS]` strings are read as wall-clock time in `tz`;
/// an ambiguous local time (DST fall-back) resolves to the earlier instant.
pub fn parse_timestamp(
  raw: &str,
  tz: Tz,
) -> Result<DateTime<FixedOffset>, ToolError> {
  const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z"];
  const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
  ];

  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Ok(dt);
  }

  let zulu = raw.strip_suffix(['Z', 'z']).map(|r| format!("{r}+00:00"));
  let with_offset = zulu.as_deref().unwrap_or(raw);
  for format in OFFSET_FORMATS {
    if let Ok(dt) = DateTime::parse_from_str(with_offset, format) {
      return Ok(dt);
    }
  }

  for format in NAIVE_FORMATS {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
      return tz
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| {
          ToolError::Timestamp(format!("{raw} does not exist in {}", tz.name()))
        });
    }
  }

  Err(ToolError::Timestamp(format!(
    "unrecognised timestamp {raw:?}; expected ISO 8601"
  )))
}

// ─── Toolbox ─────────────────────────────────────────────────────────────────

/// Executes tool calls against a store.
pub struct Toolbox<S> {
  store: Arc<S>,
  tz:    Tz,
}

impl<S> Toolbox<S>
where
  S: LogStore,
{
  pub fn new(store: Arc<S>, tz: Tz) -> Self { Self { store, tz } }

  pub fn specs(&self) -> Vec<ToolSpec> {
    Tool::ALL.into_iter().map(Tool::spec).collect()
  }

  /// Run one tool call. Every failure is folded into
  /// [`ToolOutcome::Failed`].
  pub async fn dispatch(&self, call: &ToolCall) -> ToolOutcome {
    match self.execute(call).await {
      Ok(outcome) => outcome,
      Err(e) => ToolOutcome::failed(e),
    }
  }

  async fn execute(&self, call: &ToolCall) -> Result<ToolOutcome, ToolError> {
    let tool = Tool::from_name(&call.name)
      .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;

    let (raw_datetime, reading) = match tool {
      Tool::LogHeart => {
        let (dt, f) = parse_args::<HeartReading>(tool, &call.arguments)?;
        (dt, Reading::Heart(f))
      }
      Tool::LogBody => {
        let (dt, f) = parse_args::<BodyComposition>(tool, &call.arguments)?;
        (dt, Reading::Body(f))
      }
      Tool::LogNutrition => {
        let (dt, f) = parse_args::<NutritionIntake>(tool, &call.arguments)?;
        (dt, Reading::Nutrition(f))
      }
      Tool::LogCaffeine => {
        let (dt, f) = parse_args::<CaffeineIntake>(tool, &call.arguments)?;
        (dt, Reading::Caffeine(f))
      }
      Tool::LogAlcohol => {
        let (dt, f) = parse_args::<AlcoholIntake>(tool, &call.arguments)?;
        (dt, Reading::Alcohol(f))
      }
      Tool::LogSauna => {
        let (dt, f) = parse_args::<SaunaSession>(tool, &call.arguments)?;
        (dt, Reading::Sauna(f))
      }
    };

    let datetime = parse_timestamp(&raw_datetime, self.tz)?;
    reading.validate()?;

    let stored = self
      .store
      .record(LogEntry::new(datetime, reading))
      .await
      .map_err(|e| ToolError::Store(Box::new(e)))?;

    Ok(ToolOutcome::Logged {
      id:   stored.id,
      kind: tool.kind(),
      echo: stored.entry.echo()?,
    })
  }
}
