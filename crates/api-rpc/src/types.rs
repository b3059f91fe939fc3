//! RPC Request/Response Types
//!
//! JSON-RPC method parameters and results. Results that already exist as
//! application types (lead pages, sync outcomes, ...) are returned as-is.

use coldline_core::application::{Direction, Sender};
use coldline_core::domain::{
    EmailTemplate, LeadFilter, LeadList, SessionState, TemplateChannel, TextTemplate,
};
use serde::{Deserialize, Serialize};

/// lists.import.v1 - Import a CSV file as a new lead list
#[derive(Debug, Deserialize)]
pub struct ImportListRequest {
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub file_name: String,
    pub content: String,
}

/// lists.list.v1 - Lists of a user
#[derive(Debug, Deserialize)]
pub struct ListListsRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListListsResponse {
    pub lists: Vec<LeadList>,
}

/// lists.delete.v1 - Delete a list and its leads
#[derive(Debug, Deserialize)]
pub struct DeleteListRequest {
    pub user_id: String,
    pub list_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteListResponse {
    pub list_id: String,
    pub deleted: bool,
}

/// leads.page.v1 - Page through a list
#[derive(Debug, Deserialize)]
pub struct LeadPageRequest {
    pub user_id: String,
    pub list_id: String,
    #[serde(default)]
    pub filter: LeadFilter,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_page_size")]
    pub limit: usize,
}

fn default_page_size() -> usize {
    50
}

/// leads.call.v1 - Record a call attempt
#[derive(Debug, Deserialize)]
pub struct RecordCallRequest {
    pub user_id: String,
    pub lead_id: String,
}

/// leads.reset.v1 - Clear call bookkeeping of one lead or a whole list
#[derive(Debug, Deserialize)]
pub struct ResetCallsRequest {
    pub user_id: String,
    #[serde(default)]
    pub list_id: Option<String>,
    #[serde(default)]
    pub lead_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetCallsResponse {
    pub reset: u64,
}

/// leads.stats.v1 - Call statistics of a list
#[derive(Debug, Deserialize)]
pub struct ListStatsRequest {
    pub user_id: String,
    pub list_id: String,
}

/// session.load.v1, session.keep_local.v1, session.clear_local.v1
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub user_id: String,
    pub device_id: String,
}

/// session.save.v1 - Persist a full session state
#[derive(Debug, Deserialize)]
pub struct SaveSessionRequest {
    pub state: SessionState,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearLocalResponse {
    pub cleared: bool,
}

/// session.select_list.v1
#[derive(Debug, Deserialize)]
pub struct SelectListRequest {
    pub user_id: String,
    pub device_id: String,
    pub list_id: String,
}

/// session.settings.v1 - Any subset of the session settings
#[derive(Debug, Deserialize)]
pub struct SessionSettingsRequest {
    pub user_id: String,
    pub device_id: String,
    #[serde(default)]
    pub filter: Option<LeadFilter>,
    #[serde(default)]
    pub shuffle: Option<bool>,
    #[serde(default)]
    pub auto_call: Option<bool>,
    #[serde(default)]
    pub call_delay_secs: Option<u32>,
}

/// session.navigate.v1
#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub user_id: String,
    pub device_id: String,
    pub direction: Direction,
}

/// templates.get.v1, templates.reset.v1
#[derive(Debug, Deserialize)]
pub struct TemplatesRequest {
    pub user_id: String,
}

/// templates.save.v1 - Save either or both templates
#[derive(Debug, Deserialize)]
pub struct SaveTemplatesRequest {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<EmailTemplate>,
    #[serde(default)]
    pub text: Option<TextTemplate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveTemplatesResponse {
    pub email: EmailTemplate,
    pub text: TextTemplate,
    /// Tokens that will be left verbatim when rendering
    pub unknown_placeholders: Vec<String>,
}

/// templates.render.v1 - Preview the user's template against a lead
#[derive(Debug, Deserialize)]
pub struct RenderTemplateRequest {
    pub user_id: String,
    pub lead_id: String,
    pub channel: TemplateChannel,
    #[serde(default)]
    pub sender: Sender,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderTemplateResponse {
    pub subject: Option<String>,
    pub body: String,
}

/// admin.stats.v1 - Get system statistics
#[derive(Debug, Deserialize)]
pub struct StatsRequest {
    // No parameters needed
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub list_count: i64,
    pub lead_count: i64,
    pub session_count: i64,
    pub cache_entry_count: i64,
    pub db_size_bytes: i64,
    pub fragmentation_percent: f64,
    pub uptime_seconds: i64,
}

/// admin.maintenance.v1 - Run manual maintenance
#[derive(Debug, Deserialize)]
pub struct MaintenanceRequest {
    #[serde(default)]
    pub force_vacuum: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceResponse {
    pub vacuum_run: bool,
    pub cache_entries_deleted: i64,
    pub sessions_deleted: i64,
    pub db_size_before: i64,
    pub db_size_after: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use coldline_core::domain::{CallStatusFilter, Timezone};

    #[test]
    fn test_page_request_defaults() {
        let req: LeadPageRequest = serde_json::from_value(serde_json::json!({
            "user_id": "u1", "list_id": "l1"
        }))
        .unwrap();
        assert_eq!(req.offset, 0);
        assert_eq!(req.limit, 50);
        assert!(req.filter.is_empty());
    }

    #[test]
    fn test_page_request_filter() {
        let req: LeadPageRequest = serde_json::from_value(serde_json::json!({
            "user_id": "u1",
            "list_id": "l1",
            "filter": { "timezones": ["EASTERN"], "call_status": "NOT_CALLED" }
        }))
        .unwrap();
        assert_eq!(req.filter.timezones, vec![Timezone::Eastern]);
        assert_eq!(req.filter.call_status, CallStatusFilter::NotCalled);
    }

    #[test]
    fn test_lead_requests_require_user() {
        let req = serde_json::from_value::<RecordCallRequest>(serde_json::json!({
            "lead_id": "a"
        }));
        assert!(req.is_err());
    }

    #[test]
    fn test_navigate_direction_wire_format() {
        let req: NavigateRequest = serde_json::from_value(serde_json::json!({
            "user_id": "u", "device_id": "d", "direction": "NEXT"
        }))
        .unwrap();
        assert_eq!(req.direction, Direction::Next);

        let req: NavigateRequest = serde_json::from_value(serde_json::json!({
            "user_id": "u", "device_id": "d", "direction": { "JUMP": 4 }
        }))
        .unwrap();
        assert_eq!(req.direction, Direction::Jump(4));
    }
}
