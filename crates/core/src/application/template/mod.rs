// Template placeholder interpolation
//
// `{{ key }}` and `{key}` tokens are replaced from a fixed key table.
// Keys are normalized (lowercase, alphanumerics only) and folded through a
// synonym table, so `{{First Name}}`, `{first_name}` and `{{FIRST}}` all
// resolve to the same value.

pub mod service;

pub use service::{TemplateService, Templates};

use crate::domain::{phone, Lead};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Canonical placeholder keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKey {
    Name,
    FirstName,
    LastName,
    Company,
    Phone,
    Email,
    SenderName,
    SenderCompany,
    Date,
}

impl PlaceholderKey {
    /// Resolve a raw token through normalization + synonyms
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let resolved = match key.as_str() {
            "name" | "fullname" | "contactname" | "leadname" | "contact" | "lead" => {
                PlaceholderKey::Name
            }
            "firstname" | "first" | "fname" | "givenname" => PlaceholderKey::FirstName,
            "lastname" | "last" | "lname" | "surname" | "familyname" => PlaceholderKey::LastName,
            "company" | "companyname" | "business" | "businessname" | "organization"
            | "organisation" | "org" => PlaceholderKey::Company,
            "phone" | "phonenumber" | "number" | "mobile" | "cell" | "tel" => PlaceholderKey::Phone,
            "email" | "emailaddress" | "mail" => PlaceholderKey::Email,
            "myname" | "sender" | "sendername" | "agent" | "agentname" | "yourname" | "rep" => {
                PlaceholderKey::SenderName
            }
            "mycompany" | "sendercompany" | "agentcompany" | "yourcompany" => {
                PlaceholderKey::SenderCompany
            }
            "date" | "today" | "todaysdate" => PlaceholderKey::Date,
            _ => return None,
        };
        Some(resolved)
    }
}

/// Values available to a template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderContext {
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub sender_name: Option<String>,
    pub sender_company: Option<String>,
    pub date: String,
}

/// Sender identity used by `{{my_name}}` / `{{my_company}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub name: Option<String>,
    pub company: Option<String>,
    /// Sender's local offset from UTC; `{{date}}` is the sender's calendar day
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl RenderContext {
    /// Build the context for a lead
    pub fn for_lead(lead: &Lead, sender: &Sender, now_millis: i64) -> Self {
        // Out-of-range offsets fall back to UTC
        let offset = sender
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        let date = DateTime::from_timestamp_millis(now_millis)
            .map(|dt| dt.with_timezone(&offset).format("%B %-d, %Y").to_string())
            .unwrap_or_default();

        Self {
            name: lead.name.clone(),
            first_name: lead.first_name().to_string(),
            last_name: lead.last_name(),
            company: lead.company.clone(),
            phone: phone::display(&lead.phone),
            email: lead.email.clone(),
            sender_name: sender.name.clone(),
            sender_company: sender.company.clone(),
            date,
        }
    }

    fn value(&self, key: PlaceholderKey) -> &str {
        match key {
            PlaceholderKey::Name => &self.name,
            PlaceholderKey::FirstName => &self.first_name,
            PlaceholderKey::LastName => &self.last_name,
            PlaceholderKey::Company => self.company.as_deref().unwrap_or(""),
            PlaceholderKey::Phone => &self.phone,
            PlaceholderKey::Email => self.email.as_deref().unwrap_or(""),
            PlaceholderKey::SenderName => self.sender_name.as_deref().unwrap_or(""),
            PlaceholderKey::SenderCompany => self.sender_company.as_deref().unwrap_or(""),
            PlaceholderKey::Date => &self.date,
        }
    }
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}|\{\s*([A-Za-z][A-Za-z0-9 _.\-]*?)\s*\}")
            .expect("placeholder regex is valid")
    })
}

fn token<'a>(caps: &'a Captures<'_>) -> &'a str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or("")
}

/// Substitute placeholders; unknown tokens are left verbatim
pub fn render(template: &str, ctx: &RenderContext) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures<'_>| {
            match PlaceholderKey::parse(token(caps)) {
                Some(key) => ctx.value(key).to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Canonical keys referenced by a template, in order of first appearance
pub fn placeholders(template: &str) -> Vec<PlaceholderKey> {
    let mut keys = Vec::new();
    for caps in placeholder_regex().captures_iter(template) {
        if let Some(key) = PlaceholderKey::parse(token(&caps)) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys
}

/// Tokens that do not resolve to any known key
pub fn unknown_placeholders(template: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(template)
        .filter(|caps| PlaceholderKey::parse(token(caps)).is_none())
        .map(|caps| caps[0].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> RenderContext {
        let mut lead = Lead::new("l1", "list", 0, "Ada Lovelace", "2125550100", 0);
        lead.company = Some("Engines Ltd".to_string());
        let sender = Sender {
            name: Some("Sam".to_string()),
            ..Default::default()
        };
        // 2024-03-05T12:00:00Z
        RenderContext::for_lead(&lead, &sender, 1_709_640_000_000)
    }

    #[test]
    fn test_render_synonyms() {
        let out = render(
            "Hi {{First Name}} ({first_name}/{{FIRST}}) at {{ Company Name }}, {myName}",
            &context(),
        );
        assert_eq!(out, "Hi Ada (Ada/Ada) at Engines Ltd, Sam");
    }

    #[test]
    fn test_render_phone_and_date() {
        let out = render("{{phone}} on {{today}}", &context());
        assert_eq!(out, "(212) 555-0100 on March 5, 2024");
    }

    #[test]
    fn test_date_follows_sender_offset() {
        let lead = Lead::new("l1", "list", 0, "Ada", "2125550100", 0);
        let at = |utc_offset_minutes| {
            let sender = Sender {
                utc_offset_minutes,
                ..Default::default()
            };
            RenderContext::for_lead(&lead, &sender, 1_709_640_000_000).date
        };
        assert_eq!(at(-13 * 60), "March 4, 2024");
        assert_eq!(at(14 * 60), "March 6, 2024");
        assert_eq!(at(i32::MAX), "March 5, 2024");
    }

    #[test]
    fn test_known_key_without_value_is_empty() {
        assert_eq!(render("[{{email}}][{my_company}]", &context()), "[][]");
    }

    #[test]
    fn test_unknown_tokens_left_verbatim() {
        let out = render("{{favorite color}} and {x} and {} and {{ }}", &context());
        assert_eq!(out, "{{favorite color}} and {x} and {} and {{ }}");
    }

    #[test]
    fn test_json_like_braces_untouched() {
        let out = render(r#"{"a": 1} {{name}}"#, &context());
        assert_eq!(out, r#"{"a": 1} Ada Lovelace"#);
    }

    #[test]
    fn test_placeholders_listing() {
        let keys = placeholders("{{name}} {first} {{Name}} {{bogus}}");
        assert_eq!(keys, vec![PlaceholderKey::Name, PlaceholderKey::FirstName]);
        assert_eq!(unknown_placeholders("{{name}} {{bogus}}"), vec!["{{bogus}}"]);
    }
}
