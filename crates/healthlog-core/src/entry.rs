//! Log entry types, one variant per fact table.
//!
//! An entry is an immutable measurement taken at a point in time. Entries are
//! only ever appended; no update or delete path exists.

use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, coerce};

/// Maximum length of the short text columns (`VARCHAR(255)` in the schema).
pub const DESCRIPTION_MAX: usize = 255;

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Which fact table an entry belongs to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
  Heart,
  Body,
  Nutrition,
  Caffeine,
  Alcohol,
  Sauna,
}

impl LogKind {
  pub const ALL: [LogKind; 6] = [
    LogKind::Heart,
    LogKind::Body,
    LogKind::Nutrition,
    LogKind::Caffeine,
    LogKind::Alcohol,
    LogKind::Sauna,
  ];

  /// Short identifier used in URLs and serialised entries.
  pub fn as_str(self) -> &'static str {
    match self {
      LogKind::Heart => "heart",
      LogKind::Body => "body",
      LogKind::Nutrition => "nutrition",
      LogKind::Caffeine => "caffeine",
      LogKind::Alcohol => "alcohol",
      LogKind::Sauna => "sauna",
    }
  }

  /// Backing table name.
  pub fn table(self) -> &'static str {
    match self {
      LogKind::Heart => "heart_log",
      LogKind::Body => "body_log",
      LogKind::Nutrition => "nutrition_log",
      LogKind::Caffeine => "caffeine_log",
      LogKind::Alcohol => "alcohol_log",
      LogKind::Sauna => "sauna_log",
    }
  }

  /// Human-readable label reported back in the `logged` field of a tool
  /// result.
  pub fn label(self) -> &'static str {
    match self {
      LogKind::Heart => "heart data",
      LogKind::Body => "body composition",
      LogKind::Nutrition => "nutrition",
      LogKind::Caffeine => "caffeine intake",
      LogKind::Alcohol => "alcohol intake",
      LogKind::Sauna => "sauna session",
    }
  }
}

impl fmt::Display for LogKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for LogKind {
  type Err = Error;

  /// Accepts either the short identifier (`"sauna"`) or the table name
  /// (`"sauna_log"`).
  fn from_str(s: &str) -> Result<Self> {
    LogKind::ALL
      .into_iter()
      .find(|k| k.as_str() == s || k.table() == s)
      .ok_or_else(|| Error::UnknownKind(s.to_owned()))
  }
}

// ─── Readings ────────────────────────────────────────────────────────────────

/// Blood pressure and heart rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartReading {
  #[serde(deserialize_with = "coerce::uint")]
  pub systolic_mmhg:  u32,
  #[serde(deserialize_with = "coerce::uint")]
  pub diastolic_mmhg: u32,
  #[serde(deserialize_with = "coerce::uint")]
  pub rate_bpm:       u32,
}

/// Body composition scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyComposition {
  /// Body weight in pounds.
  #[serde(deserialize_with = "coerce::float")]
  pub weight_lb: f64,
  /// Skeletal muscle mass in pounds.
  #[serde(deserialize_with = "coerce::float")]
  pub smm_lb:    f64,
  /// Percent body fat.
  #[serde(deserialize_with = "coerce::float")]
  pub pbf:       f64,
  /// Extracellular water to total body water ratio.
  #[serde(deserialize_with = "coerce::float")]
  pub ecw_tcw:   f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionIntake {
  pub short_description: String,
  #[serde(deserialize_with = "coerce::float")]
  pub protein_g:         f64,
  #[serde(deserialize_with = "coerce::float")]
  pub sodium_mg:         f64,
  #[serde(deserialize_with = "coerce::float")]
  pub potassium_mg:      f64,
  pub long_description:  String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaffeineIntake {
  pub item_description: String,
  #[serde(deserialize_with = "coerce::float")]
  pub caffeine_mg:      f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlcoholIntake {
  pub item_description: String,
  #[serde(deserialize_with = "coerce::float")]
  pub alcohol_oz:       f64,
}

/// A sauna session. Temperature is the only optional field in the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaunaSession {
  #[serde(deserialize_with = "coerce::uint")]
  pub duration_min:  u32,
  /// Degrees Fahrenheit.
  #[serde(
    default,
    deserialize_with = "coerce::opt_uint",
    skip_serializing_if = "Option::is_none"
  )]
  pub temperature_f: Option<u32>,
}

/// The table-specific payload of an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reading {
  Heart(HeartReading),
  Body(BodyComposition),
  Nutrition(NutritionIntake),
  Caffeine(CaffeineIntake),
  Alcohol(AlcoholIntake),
  Sauna(SaunaSession),
}

impl Reading {
  pub fn kind(&self) -> LogKind {
    match self {
      Reading::Heart(_) => LogKind::Heart,
      Reading::Body(_) => LogKind::Body,
      Reading::Nutrition(_) => LogKind::Nutrition,
      Reading::Caffeine(_) => LogKind::Caffeine,
      Reading::Alcohol(_) => LogKind::Alcohol,
      Reading::Sauna(_) => LogKind::Sauna,
    }
  }

  /// Check field-level constraints before anything touches the store.
  pub fn validate(&self) -> Result<()> {
    match self {
      // Unsigned integers cannot be out of range.
      Reading::Heart(_) => Ok(()),
      Reading::Body(b) => {
        measurement("weight_lb", b.weight_lb)?;
        measurement("smm_lb", b.smm_lb)?;
        measurement("pbf", b.pbf)?;
        measurement("ecw_tcw", b.ecw_tcw)
      }
      Reading::Nutrition(n) => {
        short_text("short_description", &n.short_description)?;
        measurement("protein_g", n.protein_g)?;
        measurement("sodium_mg", n.sodium_mg)?;
        measurement("potassium_mg", n.potassium_mg)?;
        if n.long_description.trim().is_empty() {
          return Err(Error::EmptyField { field: "long_description" });
        }
        Ok(())
      }
      Reading::Caffeine(c) => {
        short_text("item_description", &c.item_description)?;
        measurement("caffeine_mg", c.caffeine_mg)
      }
      Reading::Alcohol(a) => {
        short_text("item_description", &a.item_description)?;
        measurement("alcohol_oz", a.alcohol_oz)
      }
      Reading::Sauna(_) => Ok(()),
    }
  }
}

fn short_text(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::EmptyField { field });
  }
  let len = value.chars().count();
  if len > DESCRIPTION_MAX {
    return Err(Error::FieldTooLong { field, max: DESCRIPTION_MAX, len });
  }
  Ok(())
}

fn measurement(field: &'static str, value: f64) -> Result<()> {
  if value.is_finite() && value >= 0.0 {
    Ok(())
  } else {
    Err(Error::InvalidMeasurement { field, value })
  }
}

// ─── Entries ─────────────────────────────────────────────────────────────────

/// A measurement ready to be written: when it happened plus what was measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
  /// When the measurement was taken, with the local offset preserved.
  pub datetime: DateTime<FixedOffset>,
  #[serde(flatten)]
  pub reading:  Reading,
}

impl LogEntry {
  pub fn new(datetime: DateTime<FixedOffset>, reading: Reading) -> Self {
    Self { datetime, reading }
  }

  pub fn kind(&self) -> LogKind { self.reading.kind() }

  /// The entry's fields as a flat JSON object: `datetime` followed by the
  /// reading's own fields, without the `kind` tag.
  pub fn echo(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
    let mut fields = match serde_json::to_value(&self.reading)? {
      serde_json::Value::Object(map) => map,
      _ => serde_json::Map::new(),
    };
    fields.remove("kind");

    let mut echo = serde_json::Map::with_capacity(fields.len() + 1);
    echo.insert(
      "datetime".into(),
      self
        .datetime
        .to_rfc3339_opts(SecondsFormat::AutoSi, false)
        .into(),
    );
    echo.extend(fields);
    Ok(echo)
  }
}

/// An entry as persisted, with its store-assigned surrogate key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
  pub id:    i64,
  #[serde(flatten)]
  pub entry: LogEntry,
}
