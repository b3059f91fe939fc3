// Session State Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::lead::LeadFilter;
use serde::{Deserialize, Serialize};

pub type UserId = String;
pub type DeviceId = String;

pub const DEFAULT_CALL_DELAY_SECS: u32 = 5;
pub const MAX_CALL_DELAY_SECS: u32 = 300;

/// Per user+device calling session
///
/// Upserted on every change; `updated_at` drives multi-device conflict
/// detection (last write wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub user_id: UserId,
    pub device_id: DeviceId,
    pub list_id: Option<String>,
    pub current_index: usize,
    #[serde(default)]
    pub filter: LeadFilter,
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default)]
    pub shuffle_seed: u64,
    #[serde(default)]
    pub auto_call: bool,
    #[serde(default = "default_call_delay")]
    pub call_delay_secs: u32,
    pub updated_at: i64, // epoch ms
}

fn default_call_delay() -> u32 {
    DEFAULT_CALL_DELAY_SECS
}

impl SessionState {
    pub fn new(user_id: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            device_id: device_id.into(),
            list_id: None,
            current_index: 0,
            filter: LeadFilter::default(),
            shuffle: false,
            shuffle_seed: 0,
            auto_call: false,
            call_delay_secs: DEFAULT_CALL_DELAY_SECS,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "user_id cannot be empty".to_string(),
            ));
        }
        if self.device_id.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "device_id cannot be empty".to_string(),
            ));
        }
        if self.call_delay_secs > MAX_CALL_DELAY_SECS {
            return Err(DomainError::InvalidCallDelay(self.call_delay_secs));
        }
        Ok(())
    }

    /// Switch to another list, resetting position
    pub fn select_list(&mut self, list_id: Option<String>) {
        if self.list_id != list_id {
            self.list_id = list_id;
            self.current_index = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_defaults() {
        let s = SessionState::new("u1", "d1");
        assert_eq!(s.current_index, 0);
        assert_eq!(s.call_delay_secs, DEFAULT_CALL_DELAY_SECS);
        assert_ok!(s.validate());
    }

    #[test]
    fn test_validate_rejects_long_delay() {
        let mut s = SessionState::new("u1", "d1");
        s.call_delay_secs = MAX_CALL_DELAY_SECS + 1;
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("call delay"));
    }

    #[test]
    fn test_validate_rejects_empty_device() {
        let s = SessionState::new("u1", " ");
        assert_err!(s.validate());
    }

    #[test]
    fn test_select_list_resets_index() {
        let mut s = SessionState::new("u1", "d1");
        s.select_list(Some("a".to_string()));
        s.current_index = 7;
        s.select_list(Some("a".to_string()));
        assert_eq!(s.current_index, 7);
        s.select_list(Some("b".to_string()));
        assert_eq!(s.current_index, 0);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let s: SessionState = serde_json::from_str(
            r#"{"user_id":"u","device_id":"d","list_id":null,"current_index":3,"updated_at":9}"#,
        )
        .unwrap();
        assert_eq!(s.current_index, 3);
        assert_eq!(s.call_delay_secs, DEFAULT_CALL_DELAY_SECS);
        assert!(s.filter.is_empty());
    }
}
