// Lead Domain Model

use crate::domain::timezone::Timezone;
use serde::{Deserialize, Serialize};

/// Lead ID (UUID v4)
pub type LeadId = String;

/// Lead Entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub list_id: String,
    pub position: i64, // 0-based import order within the list

    pub name: String,
    pub phone: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub additional_phones: Vec<String>,
    pub timezone: Timezone,

    pub call_count: i64,
    pub last_called_at: Option<i64>, // epoch ms
    pub created_at: i64,             // epoch ms
}

impl Lead {
    /// Create a new lead
    ///
    /// The timezone is derived from the phone's area code.
    pub fn new(
        id: impl Into<String>,
        list_id: impl Into<String>,
        position: i64,
        name: impl Into<String>,
        phone: impl Into<String>,
        created_at: i64,
    ) -> Self {
        let phone = phone.into();
        let timezone = Timezone::from_phone(&phone);
        Self {
            id: id.into(),
            list_id: list_id.into(),
            position,
            name: name.into(),
            phone,
            company: None,
            email: None,
            additional_phones: Vec::new(),
            timezone,
            call_count: 0,
            last_called_at: None,
            created_at,
        }
    }

    pub fn is_called(&self) -> bool {
        self.call_count > 0
    }

    /// Register a call attempt
    pub fn record_call(&mut self, now_millis: i64) {
        self.call_count += 1;
        self.last_called_at = Some(now_millis);
    }

    pub fn reset_calls(&mut self) {
        self.call_count = 0;
        self.last_called_at = None;
    }

    /// First whitespace-separated token of the name
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }

    /// Everything after the first name token
    pub fn last_name(&self) -> String {
        self.name
            .split_whitespace()
            .skip(1)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Call status filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatusFilter {
    #[default]
    All,
    Called,
    NotCalled,
}

impl std::str::FromStr for CallStatusFilter {
    type Err = crate::domain::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "all" => Ok(CallStatusFilter::All),
            "called" => Ok(CallStatusFilter::Called),
            "notcalled" | "uncalled" => Ok(CallStatusFilter::NotCalled),
            other => Err(crate::domain::DomainError::ValidationError(format!(
                "Unknown call status: {}",
                other
            ))),
        }
    }
}

/// Lead filter (timezones + call status)
///
/// An empty timezone set matches any timezone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadFilter {
    #[serde(default)]
    pub timezones: Vec<Timezone>,
    #[serde(default)]
    pub call_status: CallStatusFilter,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        let tz_ok = self.timezones.is_empty() || self.timezones.contains(&lead.timezone);
        let status_ok = match self.call_status {
            CallStatusFilter::All => true,
            CallStatusFilter::Called => lead.is_called(),
            CallStatusFilter::NotCalled => !lead.is_called(),
        };
        tz_ok && status_ok
    }

    pub fn is_empty(&self) -> bool {
        self.timezones.is_empty() && self.call_status == CallStatusFilter::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(phone: &str) -> Lead {
        Lead::new("l1", "list", 0, "Ada Lovelace", phone, 1000)
    }

    #[test]
    fn test_new_derives_timezone() {
        assert_eq!(lead("(212) 555-0100").timezone, Timezone::Eastern);
        assert_eq!(lead("555-0100").timezone, Timezone::Unknown);
    }

    #[test]
    fn test_record_and_reset_calls() {
        let mut l = lead("2125550100");
        assert!(!l.is_called());

        l.record_call(2000);
        l.record_call(3000);
        assert_eq!(l.call_count, 2);
        assert_eq!(l.last_called_at, Some(3000));

        l.reset_calls();
        assert!(!l.is_called());
        assert!(l.last_called_at.is_none());
    }

    #[test]
    fn test_name_parts() {
        let l = Lead::new("l1", "list", 0, "Mary Ann  Evans", "2125550100", 0);
        assert_eq!(l.first_name(), "Mary");
        assert_eq!(l.last_name(), "Ann Evans");
    }

    #[test]
    fn test_filter_matches() {
        let mut called = lead("4155550100");
        called.record_call(1);
        let fresh = lead("2125550100");

        let filter = LeadFilter {
            timezones: vec![Timezone::Pacific],
            call_status: CallStatusFilter::All,
        };
        assert!(filter.matches(&called));
        assert!(!filter.matches(&fresh));

        let filter = LeadFilter {
            timezones: vec![],
            call_status: CallStatusFilter::NotCalled,
        };
        assert!(!filter.matches(&called));
        assert!(filter.matches(&fresh));

        assert!(LeadFilter::default().is_empty());
    }

    #[test]
    fn test_call_status_parse() {
        assert_eq!(
            "not-called".parse::<CallStatusFilter>().unwrap(),
            CallStatusFilter::NotCalled
        );
        assert!("maybe".parse::<CallStatusFilter>().is_err());
    }
}
