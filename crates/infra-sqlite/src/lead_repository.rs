// SQLite Lead + Lead List Repository Implementation

use crate::error::map_sqlx_error;
use crate::SqliteImportTransaction;
use async_trait::async_trait;
use coldline_core::domain::{Lead, LeadId, LeadList, ListId, Timezone};
use coldline_core::error::Result;
use coldline_core::port::{
    ImportTransaction, LeadListRepository, LeadRepository, TransactionalLeadRepository,
};
use sqlx::SqlitePool;
use tracing::{debug, warn};

pub struct SqliteLeadRepository {
    pool: SqlitePool,
}

impl SqliteLeadRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const LEAD_COLUMNS: &str = "id, list_id, position, name, phone, company, email, \
     additional_phones, timezone, call_count, last_called_at, created_at";

#[async_trait]
impl LeadRepository for SqliteLeadRepository {
    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>> {
        let row: Option<LeadRow> =
            sqlx::query_as(&format!("SELECT {} FROM leads WHERE id = ?", LEAD_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_lead()))
    }

    async fn find_by_list(&self, list_id: &ListId) -> Result<Vec<Lead>> {
        let rows: Vec<LeadRow> = sqlx::query_as(&format!(
            "SELECT {} FROM leads WHERE list_id = ? ORDER BY position ASC",
            LEAD_COLUMNS
        ))
        .bind(list_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|row| row.into_lead()).collect())
    }

    async fn update_calls(&self, lead: &Lead) -> Result<()> {
        let result = sqlx::query("UPDATE leads SET call_count = ?, last_called_at = ? WHERE id = ?")
            .bind(lead.call_count)
            .bind(lead.last_called_at)
            .bind(&lead.id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            warn!(lead_id = %lead.id, "update_calls matched no lead");
        }
        Ok(())
    }

    async fn reset_calls(&self, list_id: &ListId) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE leads
            SET call_count = 0, last_called_at = NULL
            WHERE list_id = ? AND (call_count > 0 OR last_called_at IS NOT NULL)
            "#,
        )
        .bind(list_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(list_id = %list_id, reset = result.rows_affected(), "Call counts reset");
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl LeadListRepository for SqliteLeadRepository {
    async fn find_by_id(&self, id: &ListId) -> Result<Option<LeadList>> {
        let row: Option<ListRow> = sqlx::query_as(
            "SELECT id, user_id, name, file_name, total_leads, created_at FROM lead_lists WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_list()))
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<LeadList>> {
        let rows: Vec<ListRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, name, file_name, total_leads, created_at
            FROM lead_lists
            WHERE user_id = ?
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|row| row.into_list()).collect())
    }

    async fn delete(&self, id: &ListId) -> Result<bool> {
        // Leads go with the list (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM lead_lists WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TransactionalLeadRepository for SqliteLeadRepository {
    async fn begin_import(&self) -> Result<Box<dyn ImportTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteImportTransaction::new(tx)))
    }
}

/// SQLite row representation of a lead
#[derive(Debug, sqlx::FromRow)]
struct LeadRow {
    id: String,
    list_id: String,
    position: i64,
    name: String,
    phone: String,
    company: Option<String>,
    email: Option<String>,
    additional_phones: String, // JSON array
    timezone: String,
    call_count: i64,
    last_called_at: Option<i64>,
    created_at: i64,
}

impl LeadRow {
    fn into_lead(self) -> Lead {
        let additional_phones: Vec<String> = match serde_json::from_str(&self.additional_phones) {
            Ok(phones) => phones,
            Err(e) => {
                warn!(lead_id = %self.id, error = %e, "Corrupt additional_phones, ignoring");
                Vec::new()
            }
        };
        let timezone = self.timezone.parse().unwrap_or_else(|_| {
            warn!(lead_id = %self.id, timezone = %self.timezone, "Unknown stored timezone");
            Timezone::Unknown
        });

        Lead {
            id: self.id,
            list_id: self.list_id,
            position: self.position,
            name: self.name,
            phone: self.phone,
            company: self.company,
            email: self.email,
            additional_phones,
            timezone,
            call_count: self.call_count,
            last_called_at: self.last_called_at,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ListRow {
    id: String,
    user_id: String,
    name: String,
    file_name: String,
    total_leads: i64,
    created_at: i64,
}

impl ListRow {
    fn into_list(self) -> LeadList {
        LeadList {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            file_name: self.file_name,
            total_leads: self.total_leads,
            created_at: self.created_at,
        }
    }
}
