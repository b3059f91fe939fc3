// Lead List Service

use crate::domain::{LeadList, ListId};
use crate::error::{AppError, Result};
use crate::port::LeadListRepository;
use std::sync::Arc;
use tracing::info;

/// Load a list owned by `user_id`; lists of other users are reported as missing
pub(crate) async fn owned_list(
    list_repo: &dyn LeadListRepository,
    user_id: &str,
    list_id: &ListId,
) -> Result<LeadList> {
    match list_repo.find_by_id(list_id).await? {
        Some(list) if list.user_id == user_id => Ok(list),
        _ => Err(AppError::NotFound(format!("List {} not found", list_id))),
    }
}

pub struct ListService {
    list_repo: Arc<dyn LeadListRepository>,
}

impl ListService {
    pub fn new(list_repo: Arc<dyn LeadListRepository>) -> Self {
        Self { list_repo }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<LeadList>> {
        self.list_repo.find_by_user(user_id).await
    }

    pub async fn get(&self, user_id: &str, list_id: &ListId) -> Result<LeadList> {
        owned_list(self.list_repo.as_ref(), user_id, list_id).await
    }

    /// Delete a list together with its leads
    pub async fn delete(&self, user_id: &str, list_id: &ListId) -> Result<()> {
        self.get(user_id, list_id).await?;
        if !self.list_repo.delete(list_id).await? {
            return Err(AppError::NotFound(format!("List {} not found", list_id)));
        }
        info!(list_id = %list_id, user_id = %user_id, "Lead list deleted");
        Ok(())
    }
}
