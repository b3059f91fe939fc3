// Maintenance adapter: GC of the session cache and idle sessions, VACUUM
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use coldline_core::application::session_sync::SESSION_CACHE_PREFIX;
use coldline_core::error::Result;
use coldline_core::port::{Maintenance, MaintenanceStats, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const MB: f64 = 1024.0 * 1024.0;

/// File layout as reported by SQLite pragmas
#[derive(Debug, sqlx::FromRow)]
struct PageInfo {
    page_count: i64,
    page_size: i64,
    freelist_count: i64,
}

impl PageInfo {
    fn size_bytes(&self) -> i64 {
        self.page_count * self.page_size
    }
}

pub struct SqliteMaintenance {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteMaintenance {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }

    async fn page_info(&self) -> Result<PageInfo> {
        sqlx::query_as::<_, PageInfo>(
            r#"
            SELECT p.page_count, s.page_size, f.freelist_count
            FROM pragma_page_count() AS p, pragma_page_size() AS s, pragma_freelist_count() AS f
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn count(&self, table: &str) -> Result<i64> {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl Maintenance for SqliteMaintenance {
    async fn vacuum(&self) -> Result<f64> {
        let before = self.page_info().await?.size_bytes();

        sqlx::query("VACUUM")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let after = self.page_info().await?.size_bytes();
        let reclaimed_mb = (before - after).max(0) as f64 / MB;
        info!(before_bytes = before, after_bytes = after, "VACUUM completed");

        Ok(reclaimed_mb)
    }

    async fn gc_stale_cache(&self, max_age_ms: i64) -> Result<i64> {
        let cutoff = self.time_provider.now_millis().saturating_sub(max_age_ms);

        let deleted = sqlx::query("DELETE FROM kv_store WHERE key LIKE ? AND updated_at < ?")
            .bind(format!("{}%", SESSION_CACHE_PREFIX))
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected() as i64;

        debug!(cutoff = cutoff, deleted = deleted, "Session cache GC");
        Ok(deleted)
    }

    async fn gc_stale_sessions(&self, retention_days: i64) -> Result<i64> {
        let cutoff = self
            .time_provider
            .now_millis()
            .saturating_sub(retention_days.saturating_mul(DAY_MS));

        let deleted = sqlx::query("DELETE FROM sessions WHERE updated_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected() as i64;

        debug!(cutoff = cutoff, deleted = deleted, "Idle session GC");
        Ok(deleted)
    }

    async fn get_stats(&self) -> Result<MaintenanceStats> {
        let pages = self.page_info().await?;
        let fragmentation_percent = if pages.page_count > 0 {
            pages.freelist_count as f64 * 100.0 / pages.page_count as f64
        } else {
            0.0
        };

        Ok(MaintenanceStats {
            db_size_mb: pages.size_bytes() as f64 / MB,
            db_size_bytes: pages.size_bytes(),
            list_count: self.count("lead_lists").await?,
            lead_count: self.count("leads").await?,
            session_count: self.count("sessions").await?,
            cache_entry_count: self.count("kv_store").await?,
            fragmentation_percent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations, SqliteKeyValueStore, SqliteSessionRepository};
    use coldline_core::domain::SessionState;
    use coldline_core::port::time_provider::FixedTimeProvider;
    use coldline_core::port::{KeyValueStore, MaintenanceConfig, SessionRepository};

    const NOW: i64 = 100 * DAY_MS;

    async fn setup() -> (SqlitePool, Arc<FixedTimeProvider>) {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        (pool, Arc::new(FixedTimeProvider::new(NOW)))
    }

    #[tokio::test]
    async fn test_maintenance_stats() {
        let (pool, time) = setup().await;
        let maintenance = SqliteMaintenance::new(pool, time);

        let stats = maintenance.get_stats().await.unwrap();

        assert!(stats.db_size_mb > 0.0);
        assert_eq!(stats.list_count, 0);
        assert_eq!(stats.lead_count, 0);
        assert_eq!(stats.session_count, 0);
        assert!(stats.fragmentation_percent >= 0.0);
    }

    #[tokio::test]
    async fn test_vacuum() {
        let (pool, time) = setup().await;
        let maintenance = SqliteMaintenance::new(pool, time);

        let reclaimed = maintenance.vacuum().await.unwrap();
        assert!(reclaimed >= 0.0);
    }

    #[tokio::test]
    async fn test_gc_stale_cache_keeps_templates() {
        let (pool, time) = setup().await;
        let store = SqliteKeyValueStore::new(pool.clone(), time.clone());
        let maintenance = SqliteMaintenance::new(pool, time.clone());

        time.set(NOW - 2 * DAY_MS);
        store.set("session:u1:laptop", "{}").await.unwrap();
        store.set("templates:u1:email", "{}").await.unwrap();
        time.set(NOW);
        store.set("session:u1:phone", "{}").await.unwrap();

        let deleted = maintenance.gc_stale_cache(DAY_MS).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(store.get("session:u1:laptop").await.unwrap().is_none());
        assert!(store.get("session:u1:phone").await.unwrap().is_some());
        assert!(store.get("templates:u1:email").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_full_maintenance_collects_idle_sessions() {
        let (pool, time) = setup().await;
        let sessions = SqliteSessionRepository::new(pool.clone());
        let maintenance = SqliteMaintenance::new(pool, time);

        let mut idle = SessionState::new("u1", "old-device");
        idle.updated_at = NOW - 120 * DAY_MS;
        sessions.upsert(&idle).await.unwrap();

        let mut active = SessionState::new("u1", "laptop");
        active.updated_at = NOW - DAY_MS;
        sessions.upsert(&active).await.unwrap();

        let stats = maintenance
            .run_full_maintenance(&MaintenanceConfig::default())
            .await
            .unwrap();
        assert_eq!(stats.session_count, 1);
        assert!(sessions.find("u1", "laptop").await.unwrap().is_some());
    }
}
