//! RPC Method Handlers
//!
//! Thin adapters from JSON-RPC parameters onto the application services.

use crate::error::{throttled, to_rpc_error};
use crate::rate_limiter::RateLimiter;
use crate::types::{
    ClearLocalResponse, DeleteListRequest, DeleteListResponse, ImportListRequest,
    LeadPageRequest, ListListsRequest, ListListsResponse, ListStatsRequest, MaintenanceRequest,
    MaintenanceResponse, NavigateRequest, RecordCallRequest, RenderTemplateRequest,
    RenderTemplateResponse, ResetCallsRequest, ResetCallsResponse, SaveSessionRequest,
    SaveTemplatesRequest, SaveTemplatesResponse, SelectListRequest, SessionRequest,
    SessionSettingsRequest, StatsRequest, StatsResponse, TemplatesRequest,
};
use coldline_core::application::session_sync::SaveOutcome;
use coldline_core::application::template::render;
use coldline_core::application::{
    ContactRequest, ContactService, ImportRequest, ImportService, ImportSummary, LeadPage,
    LeadService, ListService, ListStats, NavigationResult, NavigationService, PreparedContact,
    RenderContext, SessionSettings, SessionSyncService, SyncOutcome, TemplateService, Templates,
};
use coldline_core::domain::{Lead, TemplateChannel};
use coldline_core::error::AppError;
use coldline_core::port::{Maintenance, MaintenanceConfig, TimeProvider};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// Application services wired by the composition root
pub struct Services {
    pub import: Arc<ImportService>,
    pub lists: Arc<ListService>,
    pub leads: Arc<LeadService>,
    pub navigation: Arc<NavigationService>,
    pub sync: Arc<SessionSyncService>,
    pub templates: Arc<TemplateService>,
    pub contact: Arc<ContactService>,
    pub maintenance: Arc<dyn Maintenance>,
    pub maintenance_config: MaintenanceConfig,
    pub time_provider: Arc<dyn TimeProvider>,
}

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    services: Services,
    rate_limiter: RateLimiter,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(services: Services, rate_limiter: RateLimiter) -> Self {
        Self {
            services,
            rate_limiter,
            start_time: std::time::Instant::now(),
        }
    }

    /// Rate limiting for writes
    async fn throttle(&self) -> RpcResult<()> {
        if self.rate_limiter.check().await {
            Ok(())
        } else {
            Err(throttled())
        }
    }

    /// lists.import.v1
    pub async fn import_list(&self, params: ImportListRequest) -> RpcResult<ImportSummary> {
        self.throttle().await?;

        let req = ImportRequest {
            user_id: params.user_id,
            name: params.name,
            file_name: params.file_name,
            content: params.content,
        };
        self.services.import.import(req).await.map_err(to_rpc_error)
    }

    /// lists.list.v1
    pub async fn list_lists(&self, params: ListListsRequest) -> RpcResult<ListListsResponse> {
        let lists = self
            .services
            .lists
            .list(&params.user_id)
            .await
            .map_err(to_rpc_error)?;
        Ok(ListListsResponse { lists })
    }

    /// lists.delete.v1
    pub async fn delete_list(&self, params: DeleteListRequest) -> RpcResult<DeleteListResponse> {
        self.throttle().await?;

        // Lists of other users are reported as missing
        self.services
            .lists
            .delete(&params.user_id, &params.list_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(DeleteListResponse {
            list_id: params.list_id,
            deleted: true,
        })
    }

    /// leads.page.v1
    pub async fn lead_page(&self, params: LeadPageRequest) -> RpcResult<LeadPage> {
        self.services
            .leads
            .page(
                &params.user_id,
                &params.list_id,
                &params.filter,
                params.offset,
                params.limit,
            )
            .await
            .map_err(to_rpc_error)
    }

    /// leads.call.v1
    pub async fn record_call(&self, params: RecordCallRequest) -> RpcResult<Lead> {
        self.throttle().await?;
        self.services
            .leads
            .record_call(&params.user_id, &params.lead_id)
            .await
            .map_err(to_rpc_error)
    }

    /// leads.reset.v1
    pub async fn reset_calls(&self, params: ResetCallsRequest) -> RpcResult<ResetCallsResponse> {
        self.throttle().await?;

        let reset = match (params.lead_id, params.list_id) {
            (Some(lead_id), _) => {
                self.services
                    .leads
                    .reset_lead(&params.user_id, &lead_id)
                    .await
                    .map_err(to_rpc_error)?;
                1
            }
            (None, Some(list_id)) => self
                .services
                .leads
                .reset_calls(&params.user_id, &list_id)
                .await
                .map_err(to_rpc_error)?,
            (None, None) => {
                return Err(to_rpc_error(AppError::Validation(
                    "Either lead_id or list_id is required".to_string(),
                )))
            }
        };

        Ok(ResetCallsResponse { reset })
    }

    /// leads.stats.v1
    pub async fn list_stats(&self, params: ListStatsRequest) -> RpcResult<ListStats> {
        self.services
            .leads
            .stats(&params.user_id, &params.list_id)
            .await
            .map_err(to_rpc_error)
    }

    /// session.load.v1
    pub async fn load_session(&self, params: SessionRequest) -> RpcResult<SyncOutcome> {
        self.services
            .navigation
            .session(&params.user_id, &params.device_id)
            .await
            .map_err(to_rpc_error)
    }

    /// session.save.v1
    pub async fn save_session(&self, params: SaveSessionRequest) -> RpcResult<SaveOutcome> {
        self.throttle().await?;
        self.services
            .sync
            .save(params.state)
            .await
            .map_err(to_rpc_error)
    }

    /// session.keep_local.v1
    pub async fn keep_local(&self, params: SessionRequest) -> RpcResult<SaveOutcome> {
        self.throttle().await?;
        self.services
            .sync
            .keep_local(&params.user_id, &params.device_id)
            .await
            .map_err(to_rpc_error)
    }

    /// session.clear_local.v1
    pub async fn clear_local(&self, params: SessionRequest) -> RpcResult<ClearLocalResponse> {
        let cleared = self
            .services
            .sync
            .clear_local(&params.user_id, &params.device_id)
            .await
            .map_err(to_rpc_error)?;
        Ok(ClearLocalResponse { cleared })
    }

    /// session.select_list.v1
    pub async fn select_list(&self, params: SelectListRequest) -> RpcResult<NavigationResult> {
        self.throttle().await?;
        self.services
            .navigation
            .select_list(&params.user_id, &params.device_id, &params.list_id)
            .await
            .map_err(to_rpc_error)
    }

    /// session.settings.v1
    pub async fn update_settings(
        &self,
        params: SessionSettingsRequest,
    ) -> RpcResult<NavigationResult> {
        self.throttle().await?;

        let settings = SessionSettings {
            filter: params.filter,
            shuffle: params.shuffle,
            auto_call: params.auto_call,
            call_delay_secs: params.call_delay_secs,
        };
        self.services
            .navigation
            .update_settings(&params.user_id, &params.device_id, settings)
            .await
            .map_err(to_rpc_error)
    }

    /// session.navigate.v1
    pub async fn navigate(&self, params: NavigateRequest) -> RpcResult<NavigationResult> {
        self.throttle().await?;
        self.services
            .navigation
            .navigate(&params.user_id, &params.device_id, params.direction)
            .await
            .map_err(to_rpc_error)
    }

    /// templates.get.v1
    pub async fn get_templates(&self, params: TemplatesRequest) -> RpcResult<Templates> {
        self.get_templates_for(&params.user_id).await
    }

    /// templates.save.v1
    pub async fn save_templates(
        &self,
        params: SaveTemplatesRequest,
    ) -> RpcResult<SaveTemplatesResponse> {
        self.throttle().await?;

        let mut unknown = Vec::new();
        if let Some(email) = &params.email {
            unknown.extend(
                self.services
                    .templates
                    .save_email(&params.user_id, email)
                    .await
                    .map_err(to_rpc_error)?,
            );
        }
        if let Some(text) = &params.text {
            unknown.extend(
                self.services
                    .templates
                    .save_text(&params.user_id, text)
                    .await
                    .map_err(to_rpc_error)?,
            );
        }
        unknown.sort();
        unknown.dedup();

        let templates = self.get_templates_for(&params.user_id).await?;
        Ok(SaveTemplatesResponse {
            email: templates.email,
            text: templates.text,
            unknown_placeholders: unknown,
        })
    }

    /// templates.reset.v1
    pub async fn reset_templates(&self, params: TemplatesRequest) -> RpcResult<Templates> {
        self.throttle().await?;
        self.services
            .templates
            .reset(&params.user_id)
            .await
            .map_err(to_rpc_error)?;
        self.get_templates_for(&params.user_id).await
    }

    /// templates.render.v1
    pub async fn render_template(
        &self,
        params: RenderTemplateRequest,
    ) -> RpcResult<RenderTemplateResponse> {
        let lead = self
            .services
            .leads
            .get(&params.user_id, &params.lead_id)
            .await
            .map_err(to_rpc_error)?;
        let templates = self.get_templates_for(&params.user_id).await?;

        let now = self.services.time_provider.now_millis();
        let ctx = RenderContext::for_lead(&lead, &params.sender, now);

        match params.channel {
            TemplateChannel::Email => Ok(RenderTemplateResponse {
                subject: Some(render(&templates.email.subject, &ctx)),
                body: render(&templates.email.body, &ctx),
            }),
            TemplateChannel::Sms => Ok(RenderTemplateResponse {
                subject: None,
                body: render(&templates.text.message, &ctx),
            }),
            TemplateChannel::Call => Err(to_rpc_error(AppError::Validation(
                "Calls have no template".to_string(),
            ))),
        }
    }

    /// contact.prepare.v1
    pub async fn prepare_contact(&self, params: ContactRequest) -> RpcResult<PreparedContact> {
        self.throttle().await?;
        self.services
            .contact
            .prepare(params)
            .await
            .map_err(to_rpc_error)
    }

    /// admin.stats.v1
    pub async fn stats(&self, _params: StatsRequest) -> RpcResult<StatsResponse> {
        let stats = self
            .services
            .maintenance
            .get_stats()
            .await
            .map_err(to_rpc_error)?;

        Ok(StatsResponse {
            list_count: stats.list_count,
            lead_count: stats.lead_count,
            session_count: stats.session_count,
            cache_entry_count: stats.cache_entry_count,
            db_size_bytes: stats.db_size_bytes,
            fragmentation_percent: stats.fragmentation_percent,
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
        })
    }

    /// admin.maintenance.v1
    pub async fn maintenance(&self, params: MaintenanceRequest) -> RpcResult<MaintenanceResponse> {
        let maintenance = &self.services.maintenance;
        let config = &self.services.maintenance_config;

        let stats_before = maintenance.get_stats().await.map_err(to_rpc_error)?;

        let cache_entries_deleted = maintenance
            .gc_stale_cache(config.cache_max_age_ms)
            .await
            .map_err(to_rpc_error)?;

        let sessions_deleted = maintenance
            .gc_stale_sessions(config.session_retention_days)
            .await
            .map_err(to_rpc_error)?;

        // VACUUM if forced or fragmented
        let vacuum_run = if params.force_vacuum || stats_before.fragmentation_percent > 10.0 {
            maintenance.vacuum().await.map_err(to_rpc_error)?;
            true
        } else {
            false
        };

        let stats_after = maintenance.get_stats().await.map_err(to_rpc_error)?;

        Ok(MaintenanceResponse {
            vacuum_run,
            cache_entries_deleted,
            sessions_deleted,
            db_size_before: stats_before.db_size_bytes,
            db_size_after: stats_after.db_size_bytes,
        })
    }

    async fn get_templates_for(&self, user_id: &str) -> RpcResult<Templates> {
        self.services
            .templates
            .get(user_id)
            .await
            .map_err(to_rpc_error)
    }
}
