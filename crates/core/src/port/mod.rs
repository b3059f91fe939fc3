// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod key_value_store;
pub mod lead_repository;
pub mod maintenance;
pub mod session_repository;
pub mod time_provider;
pub mod transaction;

// Re-exports
pub use id_provider::IdProvider;
pub use key_value_store::KeyValueStore;
pub use lead_repository::{LeadListRepository, LeadRepository};
pub use maintenance::{Maintenance, MaintenanceConfig, MaintenanceStats};
pub use session_repository::SessionRepository;
pub use time_provider::TimeProvider;
pub use transaction::{ImportTransaction, Transaction, TransactionalLeadRepository};
