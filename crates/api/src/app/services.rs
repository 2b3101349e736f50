use std::sync::Arc;

use stockroom_infra::{db, InventoryStore, SqliteInventoryStore, StoreResult};
use stockroom_inventory::{now_timestamp, InventoryRecord, NewRecord};

use crate::config::ApiConfig;

/// The inventory service: the five table operations over one store.
///
/// Every write is stamped with the current local time as `last_updated`.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn InventoryStore>,
}

impl AppServices {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Open the configured database and make sure the schema exists.
    pub async fn connect(config: &ApiConfig) -> anyhow::Result<Self> {
        let pool = db::connect_and_init(&config.database_url, config.max_connections).await?;
        Ok(Self::new(Arc::new(SqliteInventoryStore::new(pool))))
    }

    pub async fn list_items(&self) -> StoreResult<Vec<InventoryRecord>> {
        self.store.list().await
    }

    pub async fn save_item(&self, record: &NewRecord) -> StoreResult<()> {
        self.store.upsert(record, &now_timestamp()).await
    }

    pub async fn delete_item(&self, item: &str) -> StoreResult<()> {
        self.store.delete(item).await
    }

    pub async fn adjust_quantity(&self, item: &str, change: i64) -> StoreResult<i64> {
        self.store.adjust(item, change, &now_timestamp()).await
    }

    pub async fn set_quantity(&self, item: &str, new_quantity: i64) -> StoreResult<i64> {
        self.store.set_quantity(item, new_quantity, &now_timestamp()).await
    }

    pub async fn delete_all_items(&self) -> StoreResult<u64> {
        self.store.delete_all().await
    }
}
