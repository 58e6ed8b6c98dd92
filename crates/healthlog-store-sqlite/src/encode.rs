//! Encoding and decoding helpers between Rust domain types and the plain
//! column representations stored in SQLite.
//!
//! Timestamps are stored as RFC 3339 strings that keep the local offset the
//! measurement was taken in. Measurements map one-to-one onto typed columns.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use healthlog_core::entry::{
  AlcoholIntake, BodyComposition, CaffeineIntake, HeartReading, LogEntry,
  LogKind, NutritionIntake, Reading, SaunaSession, StoredEntry,
};

use crate::{Error, Result};

// ─── DateTime<FixedOffset> ───────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<FixedOffset>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

pub fn decode_dt(s: &str) -> Result<DateTime<FixedOffset>> {
  DateTime::parse_from_rfc3339(s).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Measurement columns for `kind`, in the order [`read_reading`] expects
/// them after `id, datetime`.
pub fn measurement_columns(kind: LogKind) -> &'static str {
  match kind {
    LogKind::Heart => "systolic_mmhg, diastolic_mmhg, rate_bpm",
    LogKind::Body => "weight_lb, smm_lb, pbf, ecw_tcw",
    LogKind::Nutrition => {
      "short_description, protein_g, sodium_mg, potassium_mg, long_description"
    }
    LogKind::Caffeine => "item_description, caffeine_mg",
    LogKind::Alcohol => "item_description, alcohol_oz",
    LogKind::Sauna => "duration_min, temperature_f",
  }
}

/// Insert `reading` into its table and return the new row id.
pub fn insert_reading(
  conn: &rusqlite::Connection,
  datetime: &str,
  reading: &Reading,
) -> rusqlite::Result<i64> {
  match reading {
    Reading::Heart(h) => conn.execute(
      "INSERT INTO heart_log (datetime, systolic_mmhg, diastolic_mmhg, rate_bpm)
       VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![datetime, h.systolic_mmhg, h.diastolic_mmhg, h.rate_bpm],
    )?,
    Reading::Body(b) => conn.execute(
      "INSERT INTO body_log (datetime, weight_lb, smm_lb, pbf, ecw_tcw)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      rusqlite::params![datetime, b.weight_lb, b.smm_lb, b.pbf, b.ecw_tcw],
    )?,
    Reading::Nutrition(n) => conn.execute(
      "INSERT INTO nutrition_log (
         datetime, short_description, protein_g, sodium_mg, potassium_mg,
         long_description
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      rusqlite::params![
        datetime,
        n.short_description,
        n.protein_g,
        n.sodium_mg,
        n.potassium_mg,
        n.long_description,
      ],
    )?,
    Reading::Caffeine(c) => conn.execute(
      "INSERT INTO caffeine_log (datetime, item_description, caffeine_mg)
       VALUES (?1, ?2, ?3)",
      rusqlite::params![datetime, c.item_description, c.caffeine_mg],
    )?,
    Reading::Alcohol(a) => conn.execute(
      "INSERT INTO alcohol_log (datetime, item_description, alcohol_oz)
       VALUES (?1, ?2, ?3)",
      rusqlite::params![datetime, a.item_description, a.alcohol_oz],
    )?,
    Reading::Sauna(s) => conn.execute(
      "INSERT INTO sauna_log (datetime, duration_min, temperature_f)
       VALUES (?1, ?2, ?3)",
      rusqlite::params![datetime, s.duration_min, s.temperature_f],
    )?,
  };
  Ok(conn.last_insert_rowid())
}

/// Build a [`Reading`] from a row whose measurement columns start at index 2.
pub fn read_reading(
  kind: LogKind,
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<Reading> {
  Ok(match kind {
    LogKind::Heart => Reading::Heart(HeartReading {
      systolic_mmhg:  row.get(2)?,
      diastolic_mmhg: row.get(3)?,
      rate_bpm:       row.get(4)?,
    }),
    LogKind::Body => Reading::Body(BodyComposition {
      weight_lb: row.get(2)?,
      smm_lb:    row.get(3)?,
      pbf:       row.get(4)?,
      ecw_tcw:   row.get(5)?,
    }),
    LogKind::Nutrition => Reading::Nutrition(NutritionIntake {
      short_description: row.get(2)?,
      protein_g:         row.get(3)?,
      sodium_mg:         row.get(4)?,
      potassium_mg:      row.get(5)?,
      long_description:  row.get(6)?,
    }),
    LogKind::Caffeine => Reading::Caffeine(CaffeineIntake {
      item_description: row.get(2)?,
      caffeine_mg:      row.get(3)?,
    }),
    LogKind::Alcohol => Reading::Alcohol(AlcoholIntake {
      item_description: row.get(2)?,
      alcohol_oz:       row.get(3)?,
    }),
    LogKind::Sauna => Reading::Sauna(SaunaSession {
      duration_min:  row.get(2)?,
      temperature_f: row.get(3)?,
    }),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A row as read from any log table; only the timestamp still needs decoding.
pub struct RawEntry {
  pub id:       i64,
  pub datetime: String,
  pub reading:  Reading,
}

impl RawEntry {
  pub fn into_stored(self) -> Result<StoredEntry> {
    Ok(StoredEntry {
      id:    self.id,
      entry: LogEntry::new(decode_dt(&self.datetime)?, self.reading),
    })
  }
}
