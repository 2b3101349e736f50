//! SQLite-backed inventory store.

use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use stockroom_core::RecordId;
use stockroom_inventory::{InventoryRecord, NewRecord};

use super::{InventoryStore, StoreError, StoreResult};

/// Inventory store over a shared [`SqlitePool`].
///
/// Each call acquires one connection, runs a single statement on it, and
/// releases it when the guard drops (including on the error path).
#[derive(Debug, Clone)]
pub struct SqliteInventoryStore {
    pool: SqlitePool,
}

impl SqliteInventoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &SqliteRow) -> Result<InventoryRecord, sqlx::Error> {
    // Tables created by older deployments allow NULLs in every column.
    Ok(InventoryRecord {
        id: RecordId::new(row.try_get("id")?),
        item: row.try_get::<Option<String>, _>("item")?.unwrap_or_default(),
        quantity: row.try_get::<Option<i64>, _>("quantity")?.unwrap_or_default(),
        notes: row.try_get::<Option<String>, _>("notes")?.unwrap_or_default(),
        last_updated: row.try_get::<Option<String>, _>("last_updated")?.unwrap_or_default(),
    })
}

#[async_trait::async_trait]
impl InventoryStore for SqliteInventoryStore {
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> StoreResult<Vec<InventoryRecord>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query(
            r#"
            SELECT id, item, quantity, notes, last_updated
            FROM inventory
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    #[tracing::instrument(skip(self, record), fields(item = %record.item()))]
    async fn upsert(&self, record: &NewRecord, last_updated: &str) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO inventory (item, quantity, notes, last_updated)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(record.item().as_str())
        .bind(record.quantity())
        .bind(record.notes())
        .bind(last_updated)
        .execute(&mut *conn)
        .await?;

        tracing::debug!(quantity = record.quantity(), "item saved");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, item: &str) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query("DELETE FROM inventory WHERE item = ?1")
            .bind(item)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!("delete of unknown item");
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, last_updated))]
    async fn adjust(&self, item: &str, change: i64, last_updated: &str) -> StoreResult<i64> {
        let mut conn = self.pool.acquire().await?;

        // Read and write in one statement so concurrent adjustments cannot
        // lose each other's updates. The CASE saturates at i64::MAX instead of
        // letting SQLite promote the sum to REAL.
        let row = sqlx::query(
            r#"
            UPDATE inventory
            SET quantity = CASE
                    WHEN ?1 > 0 AND quantity > 9223372036854775807 - ?1 THEN 9223372036854775807
                    ELSE MAX(0, quantity + ?1)
                END,
                last_updated = ?2
            WHERE item = ?3
            RETURNING quantity
            "#,
        )
        .bind(change)
        .bind(last_updated)
        .bind(item)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            tracing::debug!("adjust of unknown item");
            return Err(StoreError::NotFound);
        };

        let quantity: i64 = row.try_get("quantity")?;
        tracing::debug!(new_quantity = quantity, "quantity adjusted");
        Ok(quantity)
    }

    #[tracing::instrument(skip(self, last_updated))]
    async fn set_quantity(&self, item: &str, quantity: i64, last_updated: &str) -> StoreResult<i64> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query(
            r#"
            UPDATE inventory
            SET quantity = ?1, last_updated = ?2
            WHERE item = ?3
            RETURNING quantity
            "#,
        )
        .bind(quantity)
        .bind(last_updated)
        .bind(item)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            tracing::debug!("set of unknown item");
            return Err(StoreError::NotFound);
        };

        Ok(row.try_get("quantity")?)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_all(&self) -> StoreResult<u64> {
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query("DELETE FROM inventory")
            .execute(&mut *conn)
            .await?;

        tracing::debug!(removed = result.rows_affected(), "inventory cleared");
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stockroom_inventory::{adjusted_quantity, ItemName};

    use super::*;
    use crate::db;

    const T0: &str = "2024-03-01T09:00:00.000000";
    const T1: &str = "2024-03-01T10:00:00.000000";

    async fn store() -> SqliteInventoryStore {
        let pool = db::connect_and_init("sqlite::memory:", 1).await.unwrap();
        SqliteInventoryStore::new(pool)
    }

    fn new_record(item: &str, quantity: i64, notes: Option<&str>) -> NewRecord {
        NewRecord::new(ItemName::parse(item).unwrap(), quantity, notes.map(str::to_string))
    }

    async fn only(store: &SqliteInventoryStore, item: &str) -> InventoryRecord {
        let matching: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.item == item)
            .collect();
        assert_eq!(matching.len(), 1, "expected exactly one record for {item}");
        matching.into_iter().next().unwrap()
    }

    #[tokio::test]
    async fn create_then_list_returns_the_input() {
        let store = store().await;
        store.upsert(&new_record("bolt", 10, Some("aisle 3")), T0).await.unwrap();

        let record = only(&store, "bolt").await;
        assert_eq!(record.quantity, 10);
        assert_eq!(record.notes, "aisle 3");
        assert_eq!(record.last_updated, T0);
    }

    #[tokio::test]
    async fn recreate_replaces_without_merging() {
        let store = store().await;
        store.upsert(&new_record("bolt", 10, Some("aisle 3")), T0).await.unwrap();
        let first_id = only(&store, "bolt").await.id;

        store.upsert(&new_record("bolt", 4, None), T1).await.unwrap();

        let record = only(&store, "bolt").await;
        assert_eq!(record.quantity, 4);
        assert_eq!(record.notes, "");
        assert_eq!(record.last_updated, T1);
        assert_ne!(record.id, first_id);
    }

    #[tokio::test]
    async fn item_names_are_case_sensitive() {
        let store = store().await;
        store.upsert(&new_record("bolt", 1, None), T0).await.unwrap();
        store.upsert(&new_record("Bolt", 2, None), T0).await.unwrap();

        assert_eq!(store.list().await.unwrap().len(), 2);
        assert!(matches!(store.delete("BOLT").await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn list_is_in_insertion_order() {
        let store = store().await;
        for name in ["nut", "bolt", "washer"] {
            store.upsert(&new_record(name, 1, None), T0).await.unwrap();
        }

        let names: Vec<_> = store.list().await.unwrap().into_iter().map(|r| r.item).collect();
        assert_eq!(names, vec!["nut", "bolt", "washer"]);
    }

    #[tokio::test]
    async fn delete_removes_and_second_delete_is_not_found() {
        let store = store().await;
        store.upsert(&new_record("bolt", 10, None), T0).await.unwrap();

        store.delete("bolt").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(store.delete("bolt").await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn adjust_clamps_at_zero() {
        let store = store().await;
        store.upsert(&new_record("bolt", 5, None), T0).await.unwrap();

        let quantity = store.adjust("bolt", -10, T1).await.unwrap();
        assert_eq!(quantity, 0);

        let record = only(&store, "bolt").await;
        assert_eq!(record.quantity, 0);
        assert_eq!(record.last_updated, T1);
    }

    #[tokio::test]
    async fn adjust_matches_the_domain_rule() {
        let store = store().await;
        let cases = [(0, 0), (10, -3), (5, -10), (-3, 1), (-3, 5), (i64::MAX - 1, 5), (i64::MAX, i64::MAX)];

        for (start, change) in cases {
            store.upsert(&new_record("bolt", start, None), T0).await.unwrap();
            let stored = store.adjust("bolt", change, T1).await.unwrap();
            assert_eq!(stored, adjusted_quantity(start, change), "start={start} change={change}");
        }
    }

    #[tokio::test]
    async fn adjust_unknown_item_creates_nothing() {
        let store = store().await;
        assert!(matches!(store.adjust("ghost", 1, T0).await, Err(StoreError::NotFound)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_quantity_accepts_negative_values() {
        let store = store().await;
        store.upsert(&new_record("bolt", 10, Some("keep me")), T0).await.unwrap();

        assert_eq!(store.set_quantity("bolt", -3, T1).await.unwrap(), -3);

        let record = only(&store, "bolt").await;
        assert_eq!(record.quantity, -3);
        assert_eq!(record.notes, "keep me");
        assert_eq!(record.last_updated, T1);
    }

    #[tokio::test]
    async fn set_quantity_unknown_item_is_not_found() {
        let store = store().await;
        assert!(matches!(store.set_quantity("ghost", 1, T0).await, Err(StoreError::NotFound)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_all_on_empty_table_succeeds() {
        let store = store().await;
        assert_eq!(store.delete_all().await.unwrap(), 0);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_all_removes_everything() {
        let store = store().await;
        store.upsert(&new_record("bolt", 1, None), T0).await.unwrap();
        store.upsert(&new_record("nut", 2, None), T0).await.unwrap();

        assert_eq!(store.delete_all().await.unwrap(), 2);
        assert!(store.list().await.unwrap().is_empty());
    }

    /// File-backed so several pooled connections really do write at once.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adjustments_do_not_lose_updates() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("inventory.db").display());
        let pool = db::connect_and_init(&url, 8).await.unwrap();
        assert_eq!(pool.options().get_max_connections(), 8);

        let store = Arc::new(SqliteInventoryStore::new(pool));
        store.upsert(&new_record("bolt", 0, None), T0).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..200 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.adjust("bolt", 1, T1).await }));
        }

        let mut failures = 0;
        for handle in handles {
            if handle.await.unwrap().is_err() {
                failures += 1;
            }
        }

        assert_eq!(failures, 0);
        assert_eq!(only(&store, "bolt").await.quantity, 200);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_decrements_never_go_below_zero() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("inventory.db").display());
        let store = Arc::new(SqliteInventoryStore::new(db::connect_and_init(&url, 8).await.unwrap()));
        store.upsert(&new_record("bolt", 50, None), T0).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..120 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.adjust("bolt", -1, T1).await.unwrap() }));
        }
        for handle in handles {
            assert!(handle.await.unwrap() >= 0);
        }

        assert_eq!(only(&store, "bolt").await.quantity, 0);
    }
}
