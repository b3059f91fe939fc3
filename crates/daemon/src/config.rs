//! Daemon configuration from environment variables

use anyhow::{Context, Result};
use coldline_api_rpc::RpcServerConfig;
use coldline_core::application::SessionSyncConfig;
use coldline_core::port::MaintenanceConfig;
use std::path::PathBuf;
use std::str::FromStr;

const DB_FILE_NAME: &str = "coldline.db";
const FALLBACK_DB_PATH: &str = "~/.coldline/coldline.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Everything the server needs to start
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub db_path: PathBuf,
    pub rpc: RpcServerConfig,
    pub cache_ttl_hours: i64,
    pub maintenance_interval_hours: u64,
    pub session_retention_days: i64,
    pub log_format: LogFormat,
    /// Daily rolling log files are written here when set
    pub log_dir: Option<PathBuf>,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_defaults = RpcServerConfig::default();

        let db_path = match lookup("COLDLINE_DB_PATH") {
            Some(path) => expand(&path),
            None => default_db_path(),
        };

        let log_format = match lookup("COLDLINE_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let cache_ttl_hours: i64 = parse_or(&lookup, "COLDLINE_CACHE_TTL_HOURS", 24)?;
        if cache_ttl_hours <= 0 {
            anyhow::bail!("COLDLINE_CACHE_TTL_HOURS must be positive");
        }

        Ok(Self {
            db_path,
            rpc: RpcServerConfig {
                host: lookup("COLDLINE_RPC_HOST").unwrap_or(rpc_defaults.host),
                port: parse_or(&lookup, "COLDLINE_RPC_PORT", rpc_defaults.port)?,
                rate_limit_burst: parse_or(
                    &lookup,
                    "COLDLINE_RATE_LIMIT_BURST",
                    rpc_defaults.rate_limit_burst,
                )?,
                rate_limit_rate: parse_or(
                    &lookup,
                    "COLDLINE_RATE_LIMIT_RATE",
                    rpc_defaults.rate_limit_rate,
                )?,
            },
            cache_ttl_hours,
            maintenance_interval_hours: parse_or(
                &lookup,
                "COLDLINE_MAINTENANCE_INTERVAL_HOURS",
                24,
            )?,
            session_retention_days: parse_or(&lookup, "COLDLINE_SESSION_RETENTION_DAYS", 90)?,
            log_format,
            log_dir: lookup("COLDLINE_LOG_DIR").map(|dir| expand(&dir)),
        })
    }

    /// SQLite connection URL for the configured file
    pub fn database_url(&self) -> String {
        format!("sqlite://{}", self.db_path.display())
    }

    fn cache_ttl_ms(&self) -> i64 {
        self.cache_ttl_hours.saturating_mul(60 * 60 * 1000)
    }

    pub fn sync_config(&self) -> SessionSyncConfig {
        SessionSyncConfig {
            cache_ttl_ms: self.cache_ttl_ms(),
        }
    }

    pub fn maintenance_config(&self) -> MaintenanceConfig {
        MaintenanceConfig {
            cache_max_age_ms: self.cache_ttl_ms(),
            session_retention_days: self.session_retention_days,
            ..MaintenanceConfig::default()
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("dev", "coldline", "coldline")
        .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
        .unwrap_or_else(|| expand(FALLBACK_DB_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<DaemonConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DaemonConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.rpc.host, "127.0.0.1");
        assert_eq!(config.cache_ttl_hours, 24);
        assert_eq!(config.maintenance_interval_hours, 24);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.log_dir.is_none());
        assert!(config.db_path.ends_with(DB_FILE_NAME));
        assert_eq!(config.sync_config().cache_ttl_ms, 24 * 60 * 60 * 1000);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("COLDLINE_DB_PATH", "/tmp/leads.db"),
            ("COLDLINE_RPC_PORT", "9999"),
            ("COLDLINE_CACHE_TTL_HOURS", "2"),
            ("COLDLINE_SESSION_RETENTION_DAYS", "7"),
            ("COLDLINE_LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/leads.db"));
        assert_eq!(config.database_url(), "sqlite:///tmp/leads.db");
        assert_eq!(config.rpc.port, 9999);
        assert_eq!(config.log_format, LogFormat::Json);

        let maintenance = config.maintenance_config();
        assert_eq!(maintenance.cache_max_age_ms, 2 * 60 * 60 * 1000);
        assert_eq!(maintenance.session_retention_days, 7);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = config_from(&[("COLDLINE_RPC_PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("COLDLINE_RPC_PORT"));

        assert!(config_from(&[("COLDLINE_CACHE_TTL_HOURS", "0")]).is_err());
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let config = config_from(&[("COLDLINE_CACHE_TTL_HOURS", &i64::MAX.to_string())]).unwrap();
        assert_eq!(config.sync_config().cache_ttl_ms, i64::MAX);
        assert_eq!(config.maintenance_config().cache_max_age_ms, i64::MAX);
    }
}
