// Transaction port for atomic operations

use crate::domain::{Lead, LeadList};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Repository able to open an import transaction
#[async_trait]
pub trait TransactionalLeadRepository: Send + Sync {
    /// Begin a new transaction
    async fn begin_import(&self) -> Result<Box<dyn ImportTransaction>>;
}

/// CSV import operations within a transaction
#[async_trait]
pub trait ImportTransaction: Transaction {
    /// Insert the list row (within transaction)
    async fn insert_list(&mut self, list: &LeadList) -> Result<()>;

    /// Insert leads (within transaction)
    async fn insert_leads(&mut self, leads: &[Lead]) -> Result<u64>;
}
