//! Inventory domain module.
//!
//! This crate contains the business rules for inventory records, implemented
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;
pub mod quantity;
pub mod timestamp;

pub use item::{InventoryRecord, ItemName, NewRecord};
pub use quantity::adjusted_quantity;
pub use timestamp::{format_timestamp, now_timestamp};
