//! [`SqliteStore`], the SQLite implementation of [`LogStore`].

use std::path::Path;

use healthlog_core::{
  entry::{LogEntry, LogKind, StoredEntry},
  store::LogStore,
};

use crate::{
  Result,
  encode::{RawEntry, encode_dt, insert_reading, measurement_columns, read_reading},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A health log backed by a single SQLite file.
///
/// The handle is constructed explicitly with [`open`](Self::open) and shut
/// down with [`close`](Self::close). Cloning is cheap; the inner connection
/// is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection. Clones of this handle fail every
  /// subsequent call.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` inside a scoped session.
  ///
  /// The connection is checked for liveness first. `f` runs inside a
  /// transaction that is committed when it returns `Ok` and rolled back when
  /// it returns `Err`, in which case the error is passed on. The transaction
  /// is released on every path.
  pub async fn session<F, T>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&rusqlite::Transaction<'_>) -> rusqlite::Result<T> + Send + 'static,
    T: Send + 'static,
  {
    let value = self
      .conn
      .call(move |conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;

        let tx = conn.transaction()?;
        match f(&tx) {
          Ok(value) => {
            tx.commit()?;
            Ok(value)
          }
          Err(e) => {
            tx.rollback().ok();
            Err(e.into())
          }
        }
      })
      .await?;
    Ok(value)
  }
}

// ─── LogStore impl ───────────────────────────────────────────────────────────

impl LogStore for SqliteStore {
  type Error = crate::Error;

  async fn record(&self, entry: LogEntry) -> Result<StoredEntry> {
    entry.reading.validate()?;

    let datetime_str = encode_dt(entry.datetime);
    let reading      = entry.reading.clone();

    let id = self
      .session(move |tx| insert_reading(tx, &datetime_str, &reading))
      .await?;

    Ok(StoredEntry { id, entry })
  }

  async fn list(
    &self,
    kind:  LogKind,
    limit: Option<usize>,
  ) -> Result<Vec<StoredEntry>> {
    // SQLite treats a negative LIMIT as "no limit".
    let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
    let sql = format!(
      "SELECT id, datetime, {} FROM {}
       ORDER BY julianday(datetime) DESC, id DESC
       LIMIT ?1",
      measurement_columns(kind),
      kind.table(),
    );

    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(RawEntry {
              id:       row.get(0)?,
              datetime: row.get(1)?,
              reading:  read_reading(kind, row)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_stored).collect()
  }

  async fn count(&self, kind: LogKind) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", kind.table());

    let n: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
      .await?;

    Ok(n.max(0) as u64)
  }
}
