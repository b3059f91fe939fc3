// SQLite-backed device-local key-value store

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use coldline_core::error::Result;
use coldline_core::port::{KeyValueStore, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct SqliteKeyValueStore {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteKeyValueStore {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = self.time_provider.now_millis();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use coldline_core::port::time_provider::FixedTimeProvider;

    async fn setup_store() -> (SqliteKeyValueStore, SqlitePool, Arc<FixedTimeProvider>) {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let time = Arc::new(FixedTimeProvider::new(1_000));
        let store = SqliteKeyValueStore::new(pool.clone(), time.clone());
        (store, pool, time)
    }

    #[tokio::test]
    async fn test_set_get_overwrite() {
        let (store, pool, time) = setup_store().await;

        assert!(store.get("k").await.unwrap().is_none());
        store.set("k", "one").await.unwrap();
        time.advance(500);
        store.set("k", "two").await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));

        let updated_at: i64 = sqlx::query_scalar("SELECT updated_at FROM kv_store WHERE key = 'k'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(updated_at, 1_500);
    }

    #[tokio::test]
    async fn test_remove() {
        let (store, _pool, _time) = setup_store().await;
        store.set("k", "v").await.unwrap();

        assert!(store.remove("k").await.unwrap());
        assert!(!store.remove("k").await.unwrap());
        assert!(store.get("k").await.unwrap().is_none());
    }
}
