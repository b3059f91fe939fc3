//! JSON-RPC Server
//!
//! JSON-RPC 2.0 over HTTP on localhost.

use crate::handler::{RpcHandler, Services};
use crate::rate_limiter::RateLimiter;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9537;
const DEFAULT_RATE_LIMIT_BURST: u32 = 200;
const DEFAULT_RATE_LIMIT_RATE: u32 = 100;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    /// 0 picks a free port
    pub port: u16,
    pub rate_limit_burst: u32,
    /// Requests per second
    pub rate_limit_rate: u32,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
            rate_limit_burst: DEFAULT_RATE_LIMIT_BURST,
            rate_limit_rate: DEFAULT_RATE_LIMIT_RATE,
        }
    }
}

/// Register `$method` to parse `$req` params and call `handler.$func`
macro_rules! register {
    ($module:expr, $handler:expr, $method:literal, $req:ty, $func:ident) => {{
        let handler = Arc::clone($handler);
        $module
            .register_async_method($method, move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: $req = params.parse()?;
                    handler.$func(req).await
                }
            })
            .map_err(|e| e.to_string())?;
    }};
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, services: Services) -> Self {
        let rate_limiter = RateLimiter::new(config.rate_limit_burst, config.rate_limit_rate);
        Self {
            config,
            handler: Arc::new(RpcHandler::new(services, rate_limiter)),
        }
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address and the handle that keeps the server alive.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        use crate::types::*;
        use coldline_core::application::ContactRequest;

        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            rate_limit_burst = self.config.rate_limit_burst,
            rate_limit_rate = self.config.rate_limit_rate,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let mut module = RpcModule::new(());
        let h = &self.handler;

        // Lists
        register!(module, h, "lists.import.v1", ImportListRequest, import_list);
        register!(module, h, "lists.list.v1", ListListsRequest, list_lists);
        register!(module, h, "lists.delete.v1", DeleteListRequest, delete_list);

        // Leads
        register!(module, h, "leads.page.v1", LeadPageRequest, lead_page);
        register!(module, h, "leads.call.v1", RecordCallRequest, record_call);
        register!(module, h, "leads.reset.v1", ResetCallsRequest, reset_calls);
        register!(module, h, "leads.stats.v1", ListStatsRequest, list_stats);

        // Session
        register!(module, h, "session.load.v1", SessionRequest, load_session);
        register!(module, h, "session.save.v1", SaveSessionRequest, save_session);
        register!(module, h, "session.keep_local.v1", SessionRequest, keep_local);
        register!(module, h, "session.clear_local.v1", SessionRequest, clear_local);
        register!(module, h, "session.select_list.v1", SelectListRequest, select_list);
        register!(module, h, "session.settings.v1", SessionSettingsRequest, update_settings);
        register!(module, h, "session.navigate.v1", NavigateRequest, navigate);

        // Templates
        register!(module, h, "templates.get.v1", TemplatesRequest, get_templates);
        register!(module, h, "templates.save.v1", SaveTemplatesRequest, save_templates);
        register!(module, h, "templates.reset.v1", TemplatesRequest, reset_templates);
        register!(module, h, "templates.render.v1", RenderTemplateRequest, render_template);

        // Contact
        register!(module, h, "contact.prepare.v1", ContactRequest, prepare_contact);

        // Admin
        register!(module, h, "admin.stats.v1", StatsRequest, stats);
        register!(module, h, "admin.maintenance.v1", MaintenanceRequest, maintenance);

        info!(addr = %local_addr, "JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok((local_addr, handle))
    }
}
