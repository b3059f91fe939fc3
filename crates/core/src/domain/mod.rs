// Domain Layer - Pure business logic and entities

pub mod error;
pub mod lead;
pub mod lead_list;
pub mod phone;
pub mod session;
pub mod template;
pub mod timezone;

// Re-exports
pub use error::DomainError;
pub use lead::{CallStatusFilter, Lead, LeadFilter, LeadId};
pub use lead_list::{LeadList, ListId};
pub use session::{DeviceId, SessionState, UserId};
pub use template::{EmailTemplate, TemplateChannel, TextTemplate};
pub use timezone::Timezone;
