// SQLite Remote Session Table

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use coldline_core::domain::{LeadFilter, SessionState};
use coldline_core::error::Result;
use coldline_core::port::SessionRepository;
use sqlx::SqlitePool;
use tracing::{debug, warn};

pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SESSION_COLUMNS: &str = "user_id, device_id, list_id, current_index, filter, shuffle, \
     shuffle_seed, auto_call, call_delay_secs, updated_at";

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn upsert(&self, state: &SessionState) -> Result<bool> {
        let filter = serde_json::to_string(&state.filter)?;

        // Last write wins: an older updated_at never replaces a newer row
        let result = sqlx::query(
            r#"
            INSERT INTO sessions (
                user_id, device_id, list_id, current_index, filter, shuffle,
                shuffle_seed, auto_call, call_delay_secs, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, device_id) DO UPDATE SET
                list_id = excluded.list_id,
                current_index = excluded.current_index,
                filter = excluded.filter,
                shuffle = excluded.shuffle,
                shuffle_seed = excluded.shuffle_seed,
                auto_call = excluded.auto_call,
                call_delay_secs = excluded.call_delay_secs,
                updated_at = excluded.updated_at
            WHERE excluded.updated_at >= sessions.updated_at
            "#,
        )
        .bind(&state.user_id)
        .bind(&state.device_id)
        .bind(&state.list_id)
        .bind(state.current_index as i64)
        .bind(filter)
        .bind(state.shuffle)
        .bind(state.shuffle_seed as i64) // bit-preserving
        .bind(state.auto_call)
        .bind(state.call_delay_secs as i64)
        .bind(state.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let written = result.rows_affected() > 0;
        if !written {
            debug!(
                user_id = %state.user_id,
                device_id = %state.device_id,
                updated_at = state.updated_at,
                "Stale session write ignored"
            );
        }
        Ok(written)
    }

    async fn find(&self, user_id: &str, device_id: &str) -> Result<Option<SessionState>> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sessions WHERE user_id = ? AND device_id = ?",
            SESSION_COLUMNS
        ))
        .bind(user_id)
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_state()))
    }

    async fn latest_for_user(&self, user_id: &str) -> Result<Option<SessionState>> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM sessions WHERE user_id = ? ORDER BY updated_at DESC, device_id ASC LIMIT 1",
            SESSION_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_state()))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    user_id: String,
    device_id: String,
    list_id: Option<String>,
    current_index: i64,
    filter: String, // JSON
    shuffle: bool,
    shuffle_seed: i64,
    auto_call: bool,
    call_delay_secs: i64,
    updated_at: i64,
}

impl SessionRow {
    fn into_state(self) -> SessionState {
        let filter: LeadFilter = serde_json::from_str(&self.filter).unwrap_or_else(|e| {
            warn!(user_id = %self.user_id, error = %e, "Unreadable session filter, using default");
            LeadFilter::default()
        });

        SessionState {
            user_id: self.user_id,
            device_id: self.device_id,
            list_id: self.list_id,
            current_index: self.current_index.max(0) as usize,
            filter,
            shuffle: self.shuffle,
            shuffle_seed: self.shuffle_seed as u64,
            auto_call: self.auto_call,
            call_delay_secs: self.call_delay_secs.clamp(0, u32::MAX as i64) as u32,
            updated_at: self.updated_at,
        }
    }
}
