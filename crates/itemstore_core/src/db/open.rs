//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Either provision the schema or verify that it was provisioned.
//!
//! # Invariants
//! - Returned connections have a `busy_timeout` configured.
//! - `open_db` never mutates schema; only `provision_db` does.

use super::migrations::{apply_migrations, current_user_version, latest_version};
use super::{DatabaseLocation, DbError, DbResult};
use log::{error, info, warn};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::time::{Duration, Instant};

const ITEMS_TABLE: &str = "items";
const ITEMS_COLUMNS: [&str; 4] = ["id", "name", "description", "price"];
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens an already provisioned database.
///
/// # Errors
/// - `UninitializedSchema` when migrations were never applied.
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
/// - `MissingRequiredTable`/`MissingRequiredColumn` on schema drift.
/// - `Sqlite` when the database file does not exist; it is never created here.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(location: &DatabaseLocation) -> DbResult<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    bootstrap("db_open", location, flags, |conn| ensure_schema_ready(conn))
}

/// Opens a database and applies all pending migrations.
///
/// # Side effects
/// - Creates the database file when it does not exist.
/// - Emits `db_provision` logging events with duration and status.
pub fn provision_db(location: &DatabaseLocation) -> DbResult<Connection> {
    bootstrap("db_provision", location, OpenFlags::default(), |conn| {
        apply_migrations(conn)?;
        ensure_schema_ready(conn)
    })
}

/// Opens a fresh, fully provisioned in-memory database.
pub fn open_db_in_memory() -> DbResult<Connection> {
    provision_db(&DatabaseLocation::Memory)
}

/// Closes a connection, surfacing errors that `Drop` would swallow.
pub fn close_db(conn: Connection) -> DbResult<()> {
    match conn.close() {
        Ok(()) => {
            info!("event=db_close module=db status=ok");
            Ok(())
        }
        Err((_conn, err)) => {
            warn!("event=db_close module=db status=error error={}", err);
            Err(err.into())
        }
    }
}

/// Verifies that `conn` carries the exact schema this binary serves.
pub fn ensure_schema_ready(conn: &Connection) -> DbResult<()> {
    let actual_version = current_user_version(conn)?;
    let latest = latest_version();
    if actual_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: actual_version,
            latest_supported: latest,
        });
    }
    if actual_version < latest {
        return Err(DbError::UninitializedSchema {
            expected_version: latest,
            actual_version,
        });
    }

    let table: Option<String> = conn
        .query_row(
            "SELECT name
             FROM sqlite_master
             WHERE type = 'table' AND name = ?1;",
            [ITEMS_TABLE],
            |row| row.get(0),
        )
        .optional()?;
    if table.is_none() {
        return Err(DbError::MissingRequiredTable(ITEMS_TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({ITEMS_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for column in ITEMS_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(DbError::MissingRequiredColumn {
                table: ITEMS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn bootstrap(
    event: &str,
    location: &DatabaseLocation,
    flags: OpenFlags,
    prepare: impl FnOnce(&mut Connection) -> DbResult<()>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = if location.is_memory() { "memory" } else { "file" };
    info!("event={event} module=db status=start mode={mode} location={location}");

    let opened = match location {
        DatabaseLocation::Memory => Connection::open_in_memory(),
        DatabaseLocation::File(path) => Connection::open_with_flags(path, flags),
    };
    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event={event} module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    let result = conn
        .busy_timeout(BUSY_TIMEOUT)
        .map_err(DbError::from)
        .and_then(|()| prepare(&mut conn));

    match result {
        Ok(()) => {
            info!(
                "event={event} module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event={event} module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}
