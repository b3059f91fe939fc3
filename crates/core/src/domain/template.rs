// Message Templates (email + text)

use serde::{Deserialize, Serialize};

/// Outbound channel a template or contact action targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateChannel {
    Call,
    Email,
    Sms,
}

impl std::fmt::Display for TemplateChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateChannel::Call => write!(f, "CALL"),
            TemplateChannel::Email => write!(f, "EMAIL"),
            TemplateChannel::Sms => write!(f, "SMS"),
        }
    }
}

impl std::str::FromStr for TemplateChannel {
    type Err = crate::domain::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "phone" | "tel" => Ok(TemplateChannel::Call),
            "email" | "mail" => Ok(TemplateChannel::Email),
            "sms" | "text" => Ok(TemplateChannel::Sms),
            other => Err(crate::domain::DomainError::ValidationError(format!(
                "Unknown channel: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
}

impl Default for EmailTemplate {
    fn default() -> Self {
        Self {
            subject: "Following up, {{first_name}}".to_string(),
            body: "Hi {{first_name}},\n\nI tried reaching you at {{phone}} earlier today. \
                   I'd love to find a few minutes to talk about {{company}}.\n\n\
                   Best,\n{{my_name}}"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextTemplate {
    pub message: String,
}

impl Default for TextTemplate {
    fn default() -> Self {
        Self {
            message: "Hi {{first_name}}, this is {{my_name}}. Sorry I missed you, \
                      when is a good time to call back?"
                .to_string(),
        }
    }
}
