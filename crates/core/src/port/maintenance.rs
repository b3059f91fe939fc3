// Maintenance port: garbage collection and storage statistics
use crate::error::Result;
use async_trait::async_trait;

/// Storage snapshot reported by `admin.stats`
#[derive(Debug, Clone)]
pub struct MaintenanceStats {
    pub db_size_mb: f64,
    pub db_size_bytes: i64,
    pub list_count: i64,
    pub lead_count: i64,
    pub session_count: i64,
    pub cache_entry_count: i64,
    /// Free pages as a share of all pages
    pub fragmentation_percent: f64,
}

#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// Cached session copies older than this are dropped (ms)
    pub cache_max_age_ms: i64,
    /// Remote sessions idle longer than this are dropped (days)
    pub session_retention_days: i64,
    /// VACUUM runs once the file grows past this size (MB)
    pub max_db_size_mb: f64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            cache_max_age_ms: 24 * 60 * 60 * 1000,
            session_retention_days: 90,
            max_db_size_mb: 500.0,
        }
    }
}

#[async_trait]
pub trait Maintenance: Send + Sync {
    /// Compact the database; returns the reclaimed size in MB
    async fn vacuum(&self) -> Result<f64>;

    /// Delete cached session copies older than `max_age_ms`
    ///
    /// Templates share the store and are never collected.
    async fn gc_stale_cache(&self, max_age_ms: i64) -> Result<i64>;

    /// Delete remote sessions idle for more than `retention_days`
    async fn gc_stale_sessions(&self, retention_days: i64) -> Result<i64>;

    async fn get_stats(&self) -> Result<MaintenanceStats>;

    /// Both collections, then VACUUM when the file is over the size cap
    async fn run_full_maintenance(&self, config: &MaintenanceConfig) -> Result<MaintenanceStats> {
        let oversized = self.get_stats().await?.db_size_mb > config.max_db_size_mb;

        let cache_entries = self.gc_stale_cache(config.cache_max_age_ms).await?;
        let sessions = self.gc_stale_sessions(config.session_retention_days).await?;
        let reclaimed_mb = if oversized { self.vacuum().await? } else { 0.0 };

        tracing::info!(
            cache_entries = cache_entries,
            sessions = sessions,
            reclaimed_mb = reclaimed_mb,
            "Maintenance pass completed"
        );

        self.get_stats().await
    }
}
