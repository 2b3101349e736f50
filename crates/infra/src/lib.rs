//! Infrastructure layer: SQLite pool, schema, and the inventory store.

pub mod db;
pub mod store;

pub use store::{InventoryStore, SqliteInventoryStore, StoreError, StoreResult};
