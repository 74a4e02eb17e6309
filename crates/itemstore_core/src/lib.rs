//! Core domain logic for the item store.
//! This crate is the single source of truth for item invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{DatabaseLocation, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{validate_item, FieldIssue, Item, ItemId, ItemValidationError};
pub use repo::item_repo::{
    ItemListQuery, ItemRepository, RepoError, RepoResult, SqliteItemRepository,
};
pub use service::item_service::ItemService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
