//! `GET /logs/{kind}`: read back what the agent has written.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use healthlog_agent::ChatProvider;
use healthlog_core::{
  entry::{LogKind, StoredEntry},
  store::LogStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Maximum number of rows. Unset returns the whole table.
  pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LogListing {
  pub kind:    LogKind,
  /// Rows in the table, regardless of `limit`.
  pub total:   u64,
  pub entries: Vec<StoredEntry>,
}

/// `GET /logs/{kind}[?limit=N]`
///
/// `kind` accepts the short name (`sauna`) or the table name (`sauna_log`).
pub async fn list<P, S>(
  State(state): State<AppState<P, S>>,
  Path(kind): Path<String>,
  Query(params): Query<ListParams>,
) -> Result<Json<LogListing>, ApiError>
where
  P: ChatProvider + 'static,
  S: LogStore + 'static,
{
  let kind: LogKind = kind
    .parse()
    .map_err(|e: healthlog_core::Error| ApiError::NotFound(e.to_string()))?;

  let store_err = |e: S::Error| ApiError::Store(Box::new(e));
  let total = state.store.count(kind).await.map_err(store_err)?;
  let entries = state.store.list(kind, params.limit).await.map_err(store_err)?;

  Ok(Json(LogListing { kind, total, entries }))
}
