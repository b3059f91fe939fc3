// Background maintenance: cache/session GC and VACUUM on a fixed period

use crate::error::Result;
use crate::port::{Maintenance, MaintenanceConfig, MaintenanceStats};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

pub struct MaintenanceScheduler {
    maintenance: Arc<dyn Maintenance>,
    config: MaintenanceConfig,
    period: Duration,
}

impl MaintenanceScheduler {
    /// `interval_hours` is clamped to at least one hour
    pub fn new(
        maintenance: Arc<dyn Maintenance>,
        config: MaintenanceConfig,
        interval_hours: u64,
    ) -> Self {
        Self {
            maintenance,
            config,
            period: Duration::from_secs(interval_hours.max(1).saturating_mul(3600)),
        }
    }

    /// Run forever; the first pass happens immediately
    ///
    /// Meant to be spawned and aborted on shutdown.
    pub async fn run(self) {
        info!(
            period_secs = self.period.as_secs(),
            cache_max_age_ms = self.config.cache_max_age_ms,
            session_retention_days = self.config.session_retention_days,
            "Maintenance scheduler started"
        );

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.run_once().await {
                error!(error = %e, "Scheduled maintenance failed");
            }
        }
    }

    pub async fn run_once(&self) -> Result<MaintenanceStats> {
        let stats = self.maintenance.run_full_maintenance(&self.config).await?;
        info!(
            lists = stats.list_count,
            leads = stats.lead_count,
            sessions = stats.session_count,
            cache_entries = stats.cache_entry_count,
            db_size_mb = stats.db_size_mb,
            "Scheduled maintenance completed"
        );
        Ok(stats)
    }
}
