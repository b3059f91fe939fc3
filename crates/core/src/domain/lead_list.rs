// Lead List Domain Model

use serde::{Deserialize, Serialize};

/// List ID (UUID v4)
pub type ListId = String;

/// A lead list created from one CSV file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadList {
    pub id: ListId,
    pub user_id: String,
    pub name: String,
    pub file_name: String,
    pub total_leads: i64,
    pub created_at: i64, // epoch ms
}

impl LeadList {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        name: impl Into<String>,
        file_name: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            name: name.into(),
            file_name: file_name.into(),
            total_leads: 0,
            created_at,
        }
    }
}
