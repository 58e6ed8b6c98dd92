//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, FixedOffset};
use healthlog_core::{
  entry::{
    AlcoholIntake, BodyComposition, CaffeineIntake, HeartReading, LogEntry,
    LogKind, NutritionIntake, Reading, SaunaSession,
  },
  store::LogStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn at(s: &str) -> DateTime<FixedOffset> {
  DateTime::parse_from_rfc3339(s).unwrap()
}

fn sauna(when: &str, duration_min: u32, temperature_f: Option<u32>) -> LogEntry {
  LogEntry::new(
    at(when),
    Reading::Sauna(SaunaSession { duration_min, temperature_f }),
  )
}

fn heart(when: &str) -> LogEntry {
  LogEntry::new(
    at(when),
    Reading::Heart(HeartReading {
      systolic_mmhg:  120,
      diastolic_mmhg: 80,
      rate_bpm:       65,
    }),
  )
}

// ─── Recording ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_adds_exactly_one_row() {
  let s = store().await;

  let stored = s
    .record(sauna("2025-07-28T10:12:00-05:00", 20, Some(174)))
    .await
    .unwrap();
  assert_eq!(stored.id, 1);
  assert_eq!(s.count(LogKind::Sauna).await.unwrap(), 1);

  for kind in LogKind::ALL.into_iter().filter(|k| *k != LogKind::Sauna) {
    assert_eq!(s.count(kind).await.unwrap(), 0, "{kind} should be empty");
  }
}

#[tokio::test]
async fn every_kind_roundtrips_through_its_table() {
  let s = store().await;
  let when = "2025-07-28T08:00:00-05:00";

  let entries = vec![
    heart(when),
    LogEntry::new(
      at(when),
      Reading::Body(BodyComposition {
        weight_lb: 185.0,
        smm_lb:    85.0,
        pbf:       22.0,
        ecw_tcw:   0.38,
      }),
    ),
    LogEntry::new(
      at(when),
      Reading::Nutrition(NutritionIntake {
        short_description: "Greek yogurt".into(),
        protein_g:         17.0,
        sodium_mg:         65.0,
        potassium_mg:      240.0,
        long_description:  "One cup of plain non-fat Greek yogurt".into(),
      }),
    ),
    LogEntry::new(
      at(when),
      Reading::Caffeine(CaffeineIntake {
        item_description: "Cold brew, 16 oz".into(),
        caffeine_mg:      200.0,
      }),
    ),
    LogEntry::new(
      at(when),
      Reading::Alcohol(AlcoholIntake {
        item_description: "Glass of red wine".into(),
        alcohol_oz:       0.6,
      }),
    ),
    sauna(when, 20, None),
  ];

  for entry in entries {
    let kind = entry.kind();
    let stored = s.record(entry.clone()).await.unwrap();

    let listed = s.list(kind, None).await.unwrap();
    assert_eq!(listed.len(), 1, "{kind}");
    assert_eq!(listed[0].id, stored.id);
    assert_eq!(listed[0].entry, entry);
  }
}

#[tokio::test]
async fn local_offset_is_preserved() {
  let s = store().await;
  s.record(heart("2025-07-27T15:00:00-05:00")).await.unwrap();

  let listed = s.list(LogKind::Heart, None).await.unwrap();
  assert_eq!(listed[0].entry.datetime.offset().local_minus_utc(), -5 * 3600);
  assert_eq!(listed[0].entry.datetime, at("2025-07-27T20:00:00Z"));
}

#[tokio::test]
async fn optional_temperature_may_be_absent() {
  let s = store().await;
  s.record(sauna("2025-07-28T07:00:00-05:00", 30, None))
    .await
    .unwrap();

  let listed = s.list(LogKind::Sauna, None).await.unwrap();
  assert_eq!(
    listed[0].entry.reading,
    Reading::Sauna(SaunaSession { duration_min: 30, temperature_f: None })
  );
}

#[tokio::test]
async fn recording_twice_writes_two_rows() {
  let s = store().await;
  let entry = sauna("2025-07-28T10:12:00-05:00", 20, None);

  let first = s.record(entry.clone()).await.unwrap();
  let second = s.record(entry).await.unwrap();

  assert_ne!(first.id, second.id);
  assert_eq!(s.count(LogKind::Sauna).await.unwrap(), 2);
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_orders_by_instant_across_offsets() {
  let s = store().await;
  // 15:00 UTC
  s.record(heart("2025-07-28T10:00:00-05:00")).await.unwrap();
  // 14:00 UTC, but lexically later
  s.record(heart("2025-07-28T16:00:00+02:00")).await.unwrap();
  // 16:00 UTC
  s.record(heart("2025-07-28T16:00:00Z")).await.unwrap();

  let ids: Vec<i64> = s
    .list(LogKind::Heart, None)
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.id)
    .collect();
  assert_eq!(ids, vec![3, 1, 2]);
}

#[tokio::test]
async fn list_respects_limit() {
  let s = store().await;
  for day in 1..=5 {
    s.record(sauna(&format!("2025-07-0{day}T07:00:00-05:00"), 15, None))
      .await
      .unwrap();
  }

  let latest = s.list(LogKind::Sauna, Some(2)).await.unwrap();
  assert_eq!(latest.len(), 2);
  assert_eq!(latest[0].entry.datetime, at("2025-07-05T07:00:00-05:00"));
  assert_eq!(latest[1].entry.datetime, at("2025-07-04T07:00:00-05:00"));
}

// ─── Failure paths ───────────────────────────────────────────────────────────

#[tokio::test]
async fn invalid_entry_writes_nothing() {
  let s = store().await;
  let entry = LogEntry::new(
    at("2025-07-28T09:00:00-05:00"),
    Reading::Caffeine(CaffeineIntake {
      item_description: String::new(),
      caffeine_mg:      95.0,
    }),
  );

  let err = s.record(entry).await.unwrap_err();
  assert!(matches!(err, Error::Core(_)), "{err:?}");
  assert_eq!(s.count(LogKind::Caffeine).await.unwrap(), 0);
}

#[tokio::test]
async fn session_rolls_back_on_error() {
  let s = store().await;

  let result: crate::Result<()> = s
    .session(|tx| {
      tx.execute(
        "INSERT INTO sauna_log (datetime, duration_min) VALUES (?1, ?2)",
        rusqlite::params!["2025-07-28T10:12:00-05:00", 20],
      )?;
      Err(rusqlite::Error::QueryReturnedNoRows)
    })
    .await;

  assert!(matches!(result, Err(Error::Database(_))));
  assert_eq!(s.count(LogKind::Sauna).await.unwrap(), 0);
}

#[tokio::test]
async fn session_commits_on_success() {
  let s = store().await;

  let inserted = s
    .session(|tx| {
      tx.execute(
        "INSERT INTO sauna_log (datetime, duration_min) VALUES (?1, ?2)",
        rusqlite::params!["2025-07-28T10:12:00-05:00", 20],
      )?;
      tx.execute(
        "INSERT INTO sauna_log (datetime, duration_min) VALUES (?1, ?2)",
        rusqlite::params!["2025-07-29T10:12:00-05:00", 25],
      )
    })
    .await
    .unwrap();

  assert_eq!(inserted, 1);
  assert_eq!(s.count(LogKind::Sauna).await.unwrap(), 2);
}

#[tokio::test]
async fn constraint_violation_rolls_back() {
  let s = store().await;

  let result = s
    .session(|tx| {
      tx.execute(
        "INSERT INTO heart_log (datetime, systolic_mmhg, diastolic_mmhg, rate_bpm)
         VALUES ('2025-07-28T10:00:00-05:00', 120, 80, 65)",
        [],
      )?;
      // rate_bpm is NOT NULL
      tx.execute(
        "INSERT INTO heart_log (datetime, systolic_mmhg, diastolic_mmhg, rate_bpm)
         VALUES ('2025-07-28T11:00:00-05:00', 118, 75, NULL)",
        [],
      )
    })
    .await;

  assert!(result.is_err());
  assert_eq!(s.count(LogKind::Heart).await.unwrap(), 0);
}

#[tokio::test]
async fn closed_store_reports_errors() {
  let s = store().await;
  let handle = s.clone();
  s.close().await.unwrap();

  let err = handle
    .record(sauna("2025-07-28T10:12:00-05:00", 20, None))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Database(_)), "{err:?}");
  assert!(!err.to_string().is_empty());
}
