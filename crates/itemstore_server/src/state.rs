//! Shared store handle.
//!
//! One SQLite connection is opened before serving, shared by every request
//! and closed once after the server stops. Store calls run on tokio's
//! blocking pool so request tasks only suspend while waiting for them.

use std::sync::{Arc, Mutex, PoisonError};

use itemstore_core::db::close_db;
use itemstore_core::{DbError, ItemService, RepoResult, SqliteItemRepository};
use log::warn;
use rusqlite::Connection;

use crate::error::{ApiError, ApiResult};

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps a provisioned connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `op` against an item service bound to the shared connection.
    pub async fn with_items<T, F>(&self, op: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&ItemService<SqliteItemRepository<'c>>) -> RepoResult<T>
            + Send
            + 'static,
    {
        let db = Arc::clone(&self.db);
        let joined = tokio::task::spawn_blocking(move || {
            // A panicking request already rolled its transaction back on unwind.
            let conn = db.lock().unwrap_or_else(PoisonError::into_inner);
            let service = ItemService::new(SqliteItemRepository::new(&conn));
            op(&service).map_err(ApiError::from)
        })
        .await;

        joined.map_err(|err| ApiError::Internal(format!("store task failed: {err}")))?
    }

    /// Releases the connection once no request holds the state anymore.
    pub fn close(self) -> Result<(), DbError> {
        match Arc::try_unwrap(self.db) {
            Ok(mutex) => close_db(mutex.into_inner().unwrap_or_else(PoisonError::into_inner)),
            Err(_) => {
                warn!("event=db_close module=server status=skipped reason=handle_still_shared");
                Ok(())
            }
        }
    }
}
