// SQLite Import Transaction

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use coldline_core::domain::{Lead, LeadList};
use coldline_core::error::Result;
use coldline_core::port::{ImportTransaction, Transaction};
use sqlx::{Sqlite, Transaction as SqlxTransaction};

/// List + leads written atomically
pub struct SqliteImportTransaction<'a> {
    tx: SqlxTransaction<'a, Sqlite>,
}

impl<'a> SqliteImportTransaction<'a> {
    pub fn new(tx: SqlxTransaction<'a, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteImportTransaction<'_> {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl ImportTransaction for SqliteImportTransaction<'_> {
    async fn insert_list(&mut self, list: &LeadList) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO lead_lists (id, user_id, name, file_name, total_leads, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&list.id)
        .bind(&list.user_id)
        .bind(&list.name)
        .bind(&list.file_name)
        .bind(list.total_leads)
        .bind(list.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn insert_leads(&mut self, leads: &[Lead]) -> Result<u64> {
        let mut inserted = 0;

        for lead in leads {
            let additional_phones = serde_json::to_string(&lead.additional_phones)?;

            let result = sqlx::query(
                r#"
                INSERT INTO leads (
                    id, list_id, position, name, phone, company, email,
                    additional_phones, timezone, call_count, last_called_at, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&lead.id)
            .bind(&lead.list_id)
            .bind(lead.position)
            .bind(&lead.name)
            .bind(&lead.phone)
            .bind(&lead.company)
            .bind(&lead.email)
            .bind(additional_phones)
            .bind(lead.timezone.to_string())
            .bind(lead.call_count)
            .bind(lead.last_called_at)
            .bind(lead.created_at)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

            inserted += result.rows_affected();
        }

        Ok(inserted)
    }
}
