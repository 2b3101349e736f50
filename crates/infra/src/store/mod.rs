//! Inventory persistence.

mod sqlite;

pub use sqlite::SqliteInventoryStore;

use thiserror::Error;

use stockroom_inventory::{InventoryRecord, NewRecord};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists under the requested item name.
    #[error("item not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage contract of the inventory table.
///
/// Every method is a single round trip against the store; callers get no
/// isolation beyond the atomicity of that one statement. Mutations take the
/// `last_updated` stamp from the caller so the store stays clock-free.
#[async_trait::async_trait]
pub trait InventoryStore: Send + Sync {
    /// All records, oldest id first.
    async fn list(&self) -> StoreResult<Vec<InventoryRecord>>;

    /// Insert `record`, replacing any existing row with the same item name
    /// outright (fresh id, no field merge).
    async fn upsert(&self, record: &NewRecord, last_updated: &str) -> StoreResult<()>;

    /// Remove one record. [`StoreError::NotFound`] when nothing was removed.
    async fn delete(&self, item: &str) -> StoreResult<()>;

    /// Add `change` to the quantity, clamping at zero. Returns the stored value.
    async fn adjust(&self, item: &str, change: i64, last_updated: &str) -> StoreResult<i64>;

    /// Overwrite the quantity unconditionally (negative values allowed).
    async fn set_quantity(&self, item: &str, quantity: i64, last_updated: &str) -> StoreResult<i64>;

    /// Remove every record. Returns how many were removed.
    async fn delete_all(&self) -> StoreResult<u64>;
}

