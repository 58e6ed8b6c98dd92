//! The `LogStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `healthlog-store-sqlite`). Higher layers (the logging tools, the API)
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::entry::{LogEntry, LogKind, StoredEntry};

/// Abstraction over a health log backend.
///
/// Every table is append-only: there is a write path and read paths, but no
/// update or delete.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait LogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist one entry in the table matching its kind and return it with
  /// its assigned id. Writes nothing on failure.
  fn record(
    &self,
    entry: LogEntry,
  ) -> impl Future<Output = Result<StoredEntry, Self::Error>> + Send + '_;

  /// List entries of one kind, most recent measurement first.
  fn list(
    &self,
    kind: LogKind,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<StoredEntry>, Self::Error>> + Send + '_;

  /// Number of rows in the table for `kind`.
  fn count(
    &self,
    kind: LogKind,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
