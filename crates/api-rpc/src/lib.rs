//! JSON-RPC API Layer
//!
//! Exposes lead import, navigation, session sync, templates and contact
//! actions as versioned JSON-RPC 2.0 methods.

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use handler::{RpcHandler, Services};
pub use server::{RpcServer, RpcServerConfig};
