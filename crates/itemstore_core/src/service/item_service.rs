//! Item use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for transport callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::item::{Item, ItemId};
use crate::repo::item_repo::{ItemListQuery, ItemRepository, RepoError, RepoResult};

/// Use-case service wrapper for item CRUD operations.
pub struct ItemService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a new item; fails with `Conflict` when the id is taken.
    pub fn create_item(&self, item: &Item) -> RepoResult<Item> {
        self.repo.create_item(item)
    }

    /// Gets one item by id.
    ///
    /// # Contract
    /// - An absent row is reported as `RepoError::NotFound`.
    pub fn get_item(&self, id: ItemId) -> RepoResult<Item> {
        self.repo.get_item(id)?.ok_or(RepoError::NotFound(id))
    }

    /// Replaces every field of an existing item.
    ///
    /// Returns repository-level not-found, mismatch or validation errors
    /// unchanged.
    pub fn update_item(&self, id: ItemId, item: &Item) -> RepoResult<Item> {
        self.repo.update_item(id, item)
    }

    /// Hard-deletes an item by id.
    pub fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        self.repo.delete_item(id)
    }

    /// Lists items, optionally bounded by an inclusive `max_price`.
    pub fn list_items(&self, max_price: Option<f64>) -> RepoResult<Vec<Item>> {
        self.repo.list_items(&ItemListQuery { max_price })
    }
}
