// Remote Session Table Port

use crate::domain::SessionState;
use crate::error::Result;
use async_trait::async_trait;

/// Remote session table (one row per user+device)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert or replace the row for `(user_id, device_id)`
    ///
    /// Last write wins: the row is only replaced when the incoming
    /// `updated_at` is not older than the stored one. Returns whether the
    /// row was written.
    async fn upsert(&self, state: &SessionState) -> Result<bool>;

    /// Find the row for a specific device
    async fn find(&self, user_id: &str, device_id: &str) -> Result<Option<SessionState>>;

    /// Most recently updated row of the user across all devices
    async fn latest_for_user(&self, user_id: &str) -> Result<Option<SessionState>>;
}
