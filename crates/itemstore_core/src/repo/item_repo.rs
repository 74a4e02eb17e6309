//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD + list APIs over the `items` table.
//! - Enforce uniqueness and existence invariants around every mutation.
//!
//! # Invariants
//! - Write paths call `Item::validate()` before SQL mutations.
//! - Existence checks and writes share one immediate transaction, so at most
//!   one writer wins per id and operation.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::item::{Item, ItemId, ItemValidationError};
use log::info;
use rusqlite::{
    params, Connection, ErrorCode, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    price
FROM items";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    Db(DbError),
    NotFound(ItemId),
    Conflict(ItemId),
    IdMismatch { path_id: ItemId, body_id: ItemId },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::Conflict(id) => write!(f, "item already exists: {id}"),
            Self::IdMismatch { path_id, body_id } => {
                write!(f, "item id mismatch: target {path_id}, payload {body_id}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::Conflict(_)
            | Self::IdMismatch { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing items.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemListQuery {
    /// Inclusive upper bound on `price`; `None` returns every item.
    pub max_price: Option<f64>,
}

/// Repository interface for item CRUD operations.
pub trait ItemRepository {
    fn create_item(&self, item: &Item) -> RepoResult<Item>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// Replaces every field of the row identified by `id`.
    fn update_item(&self, id: ItemId, item: &Item) -> RepoResult<Item>;
    fn delete_item(&self, id: ItemId) -> RepoResult<()>;
    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<Item>>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Wraps a provisioned connection. See `db::ensure_schema_ready`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, item: &Item) -> RepoResult<Item> {
        item.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if item_exists(&tx, item.id)? {
            return Err(RepoError::Conflict(item.id));
        }

        let inserted = tx.execute(
            "INSERT INTO items (
                id,
                name,
                description,
                price
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                item.id,
                item.name.as_str(),
                item.description.as_deref(),
                item.price,
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                return Err(RepoError::Conflict(item.id));
            }
            Err(err) => return Err(err.into()),
        }
        tx.commit()?;

        info!("event=item_create module=repo status=ok item_id={}", item.id);
        Ok(item.clone())
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }

        Ok(None)
    }

    fn update_item(&self, id: ItemId, item: &Item) -> RepoResult<Item> {
        item.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !item_exists(&tx, id)? {
            return Err(RepoError::NotFound(id));
        }
        if item.id != id {
            return Err(RepoError::IdMismatch {
                path_id: id,
                body_id: item.id,
            });
        }

        tx.execute(
            "UPDATE items
             SET
                name = ?2,
                description = ?3,
                price = ?4
             WHERE id = ?1;",
            params![
                id,
                item.name.as_str(),
                item.description.as_deref(),
                item.price,
            ],
        )?;
        tx.commit()?;

        info!("event=item_update module=repo status=ok item_id={id}");
        Ok(item.clone())
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM items WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=item_delete module=repo status=ok item_id={id}");
        Ok(())
    }

    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!("{ITEM_SELECT_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            let item = parse_item_row(row)?;
            if query.max_price.map_or(true, |max_price| item.price <= max_price) {
                items.push(item);
            }
        }

        Ok(items)
    }
}

fn item_exists(conn: &Connection, id: ItemId) -> RepoResult<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM items WHERE id = ?1;", [id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let item = Item {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        price: row.get("price")?,
    };
    item.validate().map_err(|err| {
        RepoError::InvalidData(format!("row items.id={} violates constraints: {err}", item.id))
    })?;
    Ok(item)
}
