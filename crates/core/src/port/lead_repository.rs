// Lead + Lead List Repository Ports (Interfaces)

use crate::domain::{Lead, LeadId, LeadList, ListId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Lead persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Find lead by ID
    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>>;

    /// All leads of a list in import order
    async fn find_by_list(&self, list_id: &ListId) -> Result<Vec<Lead>>;

    /// Persist call bookkeeping (call_count, last_called_at)
    async fn update_calls(&self, lead: &Lead) -> Result<()>;

    /// Clear call bookkeeping for a whole list
    async fn reset_calls(&self, list_id: &ListId) -> Result<u64>;
}

/// Repository interface for Lead List persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadListRepository: Send + Sync {
    /// Find list by ID
    async fn find_by_id(&self, id: &ListId) -> Result<Option<LeadList>>;

    /// All lists of a user, newest first
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<LeadList>>;

    /// Delete list and its leads
    ///
    /// Returns false when the list did not exist
    async fn delete(&self, id: &ListId) -> Result<bool>;
}
