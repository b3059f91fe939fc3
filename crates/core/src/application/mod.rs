// Application Layer - Use Cases and Business Logic

pub mod contact;
pub mod import;
pub mod leads;
pub mod lists;
pub mod maintenance;
pub mod navigation;
pub mod navigator;
pub mod session_sync;
pub mod template;

// Re-exports
pub use contact::{ContactAction, ContactRequest, ContactService, PreparedContact};
pub use import::{ImportRequest, ImportService, ImportSummary};
pub use leads::{LeadPage, LeadService, ListStats};
pub use lists::ListService;
pub use maintenance::MaintenanceScheduler;
pub use navigation::{NavigationResult, NavigationService, SessionSettings};
pub use navigator::{Direction, LeadNavigator};
pub use session_sync::{SessionSyncConfig, SessionSyncService, SyncOutcome, SyncSource};
pub use template::{RenderContext, Sender, TemplateService, Templates};
