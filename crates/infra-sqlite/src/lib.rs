// Coldline Infrastructure - SQLite Adapter
// Implements: LeadRepository, LeadListRepository, TransactionalLeadRepository,
// SessionRepository, KeyValueStore, Maintenance

mod connection;
mod error;
mod kv_store;
mod lead_repository;
mod maintenance_impl;
mod migration;
mod session_repository;
mod transaction;

pub use connection::create_pool;
pub use kv_store::SqliteKeyValueStore;
pub use lead_repository::SqliteLeadRepository;
pub use maintenance_impl::SqliteMaintenance;
pub use migration::run_migrations;
pub use session_repository::SqliteSessionRepository;
pub use transaction::SqliteImportTransaction;

// Note: sqlx::Error conversion is handled by a helper function
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
