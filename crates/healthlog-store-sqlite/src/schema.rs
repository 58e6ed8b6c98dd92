//! SQL schema for the health log SQLite store.
//!
//! Executed once at connection startup. Schema evolution beyond
//! `CREATE TABLE IF NOT EXISTS` belongs to external migration tooling.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Every table is an independent, append-only fact table. No UPDATE or
/// DELETE is ever issued against any of them.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS heart_log (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    datetime       TEXT    NOT NULL,   -- RFC 3339, local offset preserved
    systolic_mmhg  INTEGER NOT NULL CHECK (systolic_mmhg >= 0),
    diastolic_mmhg INTEGER NOT NULL CHECK (diastolic_mmhg >= 0),
    rate_bpm       INTEGER NOT NULL CHECK (rate_bpm >= 0)
);

CREATE TABLE IF NOT EXISTS body_log (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    datetime  TEXT NOT NULL,
    weight_lb REAL NOT NULL,
    smm_lb    REAL NOT NULL,
    pbf       REAL NOT NULL,
    ecw_tcw   REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS nutrition_log (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    datetime          TEXT NOT NULL,
    short_description TEXT NOT NULL CHECK (length(short_description) <= 255),
    protein_g         REAL NOT NULL,
    sodium_mg         REAL NOT NULL,
    potassium_mg      REAL NOT NULL,
    long_description  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS caffeine_log (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    datetime         TEXT NOT NULL,
    item_description TEXT NOT NULL CHECK (length(item_description) <= 255),
    caffeine_mg      REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS alcohol_log (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    datetime         TEXT NOT NULL,
    item_description TEXT NOT NULL CHECK (length(item_description) <= 255),
    alcohol_oz       REAL NOT NULL
);

-- temperature_f is the only nullable measurement column.
CREATE TABLE IF NOT EXISTS sauna_log (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    datetime      TEXT    NOT NULL,
    duration_min  INTEGER NOT NULL CHECK (duration_min >= 0),
    temperature_f INTEGER
);

CREATE INDEX IF NOT EXISTS heart_log_datetime_idx     ON heart_log(datetime);
CREATE INDEX IF NOT EXISTS body_log_datetime_idx      ON body_log(datetime);
CREATE INDEX IF NOT EXISTS nutrition_log_datetime_idx ON nutrition_log(datetime);
CREATE INDEX IF NOT EXISTS caffeine_log_datetime_idx  ON caffeine_log(datetime);
CREATE INDEX IF NOT EXISTS alcohol_log_datetime_idx   ON alcohol_log(datetime);
CREATE INDEX IF NOT EXISTS sauna_log_datetime_idx     ON sauna_log(datetime);

PRAGMA user_version = 1;
";
