// Session Sync - local cache + remote session table
//
// The local key-value store holds a cached copy of the session for 24h
// (configurable). The remote table holds one row per user+device. On load,
// the newest of the local copy and the user's newest remote row wins (last
// write wins); a newer row written by another device is reported as a
// conflict so the client can offer to keep its local copy instead.

use crate::domain::SessionState;
use crate::error::{AppError, Result};
use crate::port::{KeyValueStore, SessionRepository, TimeProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_CACHE_TTL_MS: i64 = 24 * 60 * 60 * 1000;
pub const SESSION_CACHE_PREFIX: &str = "session:";

/// Sync Configuration
#[derive(Debug, Clone)]
pub struct SessionSyncConfig {
    /// How long a locally cached session stays authoritative
    pub cache_ttl_ms: i64,
}

impl Default for SessionSyncConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
        }
    }
}

/// Where the loaded state came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncSource {
    Local,
    Remote,
    Default,
}

/// Newer remote state written by another device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictInfo {
    pub remote_device_id: String,
    pub remote_updated_at: i64,
    pub local_updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub state: SessionState,
    pub source: SyncSource,
    pub conflict: Option<ConflictInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub state: SessionState,
    pub remote_synced: bool,
}

/// Local cache entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedSession {
    state: SessionState,
    cached_at: i64,
}

pub fn cache_key(user_id: &str, device_id: &str) -> String {
    format!("{}{}:{}", SESSION_CACHE_PREFIX, user_id, device_id)
}

/// Session Sync Service
pub struct SessionSyncService {
    local: Arc<dyn KeyValueStore>,
    remote: Arc<dyn SessionRepository>,
    time_provider: Arc<dyn TimeProvider>,
    config: SessionSyncConfig,
}

impl SessionSyncService {
    pub fn new(
        local: Arc<dyn KeyValueStore>,
        remote: Arc<dyn SessionRepository>,
        time_provider: Arc<dyn TimeProvider>,
        config: SessionSyncConfig,
    ) -> Self {
        Self {
            local,
            remote,
            time_provider,
            config,
        }
    }

    /// Load the session for a device
    pub async fn load(&self, user_id: &str, device_id: &str) -> Result<SyncOutcome> {
        if user_id.trim().is_empty() || device_id.trim().is_empty() {
            return Err(AppError::Validation(
                "user_id and device_id are required".to_string(),
            ));
        }

        let now = self.time_provider.now_millis();
        let local = self
            .read_cache(user_id, device_id)
            .await
            .filter(|cached| {
                let fresh = now - cached.cached_at < self.config.cache_ttl_ms;
                if !fresh {
                    debug!(
                        user_id = %user_id,
                        device_id = %device_id,
                        "Local session cache expired"
                    );
                }
                fresh
            })
            .map(|cached| cached.state);

        let remote = match self.remote.latest_for_user(user_id).await {
            Ok(remote) => remote,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    error = %e,
                    "Remote session fetch failed, using local copy"
                );
                None
            }
        };

        let outcome = match (local, remote) {
            (None, None) => SyncOutcome {
                state: SessionState::new(user_id, device_id),
                source: SyncSource::Default,
                conflict: None,
            },
            (Some(local), None) => SyncOutcome {
                state: local,
                source: SyncSource::Local,
                conflict: None,
            },
            (None, Some(remote)) => SyncOutcome {
                state: adopt(remote, device_id),
                source: SyncSource::Remote,
                conflict: None,
            },
            (Some(local), Some(remote)) if remote.updated_at > local.updated_at => {
                let conflict = (remote.device_id != device_id).then(|| ConflictInfo {
                    remote_device_id: remote.device_id.clone(),
                    remote_updated_at: remote.updated_at,
                    local_updated_at: local.updated_at,
                });
                if let Some(conflict) = &conflict {
                    info!(
                        user_id = %user_id,
                        device_id = %device_id,
                        remote_device_id = %conflict.remote_device_id,
                        "Newer session from another device, remote wins"
                    );
                }
                SyncOutcome {
                    state: adopt(remote, device_id),
                    source: SyncSource::Remote,
                    conflict,
                }
            }
            (Some(local), Some(_)) => SyncOutcome {
                state: local,
                source: SyncSource::Local,
                conflict: None,
            },
        };

        // On conflict the local copy stays cached so keep_local can restore it
        if outcome.source == SyncSource::Remote && outcome.conflict.is_none() {
            self.write_cache(&outcome.state, now).await;
        }

        Ok(outcome)
    }

    /// Persist a state change locally and remotely
    ///
    /// A failing remote write is logged and reported, the local copy is
    /// still updated.
    pub async fn save(&self, mut state: SessionState) -> Result<SaveOutcome> {
        state.validate()?;

        let now = self.time_provider.now_millis();
        state.updated_at = now;

        let key = cache_key(&state.user_id, &state.device_id);
        let value = serde_json::to_string(&CachedSession {
            state: state.clone(),
            cached_at: now,
        })?;
        self.local.set(&key, &value).await?;

        let remote_synced = match self.remote.upsert(&state).await {
            Ok(written) => {
                if !written {
                    warn!(
                        user_id = %state.user_id,
                        device_id = %state.device_id,
                        "Remote session is newer, write skipped"
                    );
                }
                written
            }
            Err(e) => {
                warn!(
                    user_id = %state.user_id,
                    device_id = %state.device_id,
                    error = %e,
                    "Remote session upsert failed"
                );
                false
            }
        };

        Ok(SaveOutcome {
            state,
            remote_synced,
        })
    }

    /// Resolve a conflict in favor of the local copy
    ///
    /// Uses the cached copy even when outside the cache window.
    pub async fn keep_local(&self, user_id: &str, device_id: &str) -> Result<SaveOutcome> {
        let cached = self.read_cache(user_id, device_id).await.ok_or_else(|| {
            AppError::NotFound(format!(
                "No local session for user {} on device {}",
                user_id, device_id
            ))
        })?;
        self.save(cached.state).await
    }

    /// Forget the local copy (e.g. on sign-out)
    pub async fn clear_local(&self, user_id: &str, device_id: &str) -> Result<bool> {
        self.local.remove(&cache_key(user_id, device_id)).await
    }

    async fn read_cache(&self, user_id: &str, device_id: &str) -> Option<CachedSession> {
        let key = cache_key(user_id, device_id);
        let raw = match self.local.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key = %key, error = %e, "Local session read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(cached) => Some(cached),
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupt local session entry ignored");
                None
            }
        }
    }

    async fn write_cache(&self, state: &SessionState, now: i64) {
        let cached = CachedSession {
            state: state.clone(),
            cached_at: now,
        };
        let key = cache_key(&state.user_id, &state.device_id);
        let result = match serde_json::to_string(&cached) {
            Ok(value) => self.local.set(&key, &value).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            warn!(key = %key, error = %e, "Local session cache write failed");
        }
    }
}

/// Take over another row's state on this device
fn adopt(mut remote: SessionState, device_id: &str) -> SessionState {
    remote.device_id = device_id.to_string();
    remote
}
