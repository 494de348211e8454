//! Record store seam for entries.
//!
//! `EntryRepository` holds an `Arc<dyn EntryStore>`, so the PostgreSQL backend
//! and the in-memory backend used by tests are interchangeable.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::entry::{Entry, EntryChanges, NewEntry};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg_attr(not(test), allow(dead_code))]
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable table of entries. Every method is a single atomic statement.
///
/// List methods return rows ordered by `created_at` descending, ties broken
/// by `id` descending.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Inserts a row, assigning `id` and `created_at`.
    async fn insert(&self, entry: NewEntry) -> StoreResult<Entry>;

    async fn select_all(&self) -> StoreResult<Vec<Entry>>;

    async fn select_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Entry>>;

    async fn select_by_postal_code(&self, postal_code: i32) -> StoreResult<Vec<Entry>>;

    async fn select_by_id(&self, id: i32) -> StoreResult<Option<Entry>>;

    /// Merges `changes` into the row and returns it, or `None` if no row has `id`.
    /// The merge is evaluated in the same statement as the existence check.
    async fn update(&self, id: i32, changes: EntryChanges) -> StoreResult<Option<Entry>>;

    /// Removes the row and returns its last state, or `None` if no row has `id`.
    async fn delete(&self, id: i32) -> StoreResult<Option<Entry>>;
}
