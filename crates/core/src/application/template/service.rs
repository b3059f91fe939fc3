// Template persistence (plain key-value strings)

use super::unknown_placeholders;
use crate::domain::{EmailTemplate, TextTemplate};
use crate::error::{AppError, Result};
use crate::port::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const MAX_SUBJECT_LEN: usize = 256;
pub const MAX_BODY_LEN: usize = 10_000;
pub const MAX_SMS_LEN: usize = 1_600;

/// Both templates of a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Templates {
    pub email: EmailTemplate,
    pub text: TextTemplate,
}

fn email_key(user_id: &str) -> String {
    format!("templates:{}:email", user_id)
}

fn text_key(user_id: &str) -> String {
    format!("templates:{}:text", user_id)
}

/// Template Service
pub struct TemplateService {
    store: Arc<dyn KeyValueStore>,
}

impl TemplateService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load templates, falling back to defaults for missing or corrupt entries
    pub async fn get(&self, user_id: &str) -> Result<Templates> {
        let email = self
            .load(&email_key(user_id))
            .await?
            .unwrap_or_default();
        let text = self.load(&text_key(user_id)).await?.unwrap_or_default();
        Ok(Templates { email, text })
    }

    /// Save the email template
    ///
    /// Returns tokens that will not be substituted.
    pub async fn save_email(&self, user_id: &str, template: &EmailTemplate) -> Result<Vec<String>> {
        if template.subject.chars().count() > MAX_SUBJECT_LEN {
            return Err(AppError::Validation(format!(
                "Email subject too long (max {} chars)",
                MAX_SUBJECT_LEN
            )));
        }
        if template.body.chars().count() > MAX_BODY_LEN {
            return Err(AppError::Validation(format!(
                "Email body too long (max {} chars)",
                MAX_BODY_LEN
            )));
        }

        let value = serde_json::to_string(template)?;
        self.store.set(&email_key(user_id), &value).await?;

        let mut unknown = unknown_placeholders(&template.subject);
        unknown.extend(unknown_placeholders(&template.body));
        debug!(user_id = %user_id, unknown = unknown.len(), "Email template saved");
        Ok(unknown)
    }

    /// Save the text template
    ///
    /// Returns tokens that will not be substituted.
    pub async fn save_text(&self, user_id: &str, template: &TextTemplate) -> Result<Vec<String>> {
        if template.message.chars().count() > MAX_SMS_LEN {
            return Err(AppError::Validation(format!(
                "Text message too long (max {} chars)",
                MAX_SMS_LEN
            )));
        }

        let value = serde_json::to_string(template)?;
        self.store.set(&text_key(user_id), &value).await?;

        let unknown = unknown_placeholders(&template.message);
        debug!(user_id = %user_id, unknown = unknown.len(), "Text template saved");
        Ok(unknown)
    }

    /// Drop both templates (defaults apply again)
    pub async fn reset(&self, user_id: &str) -> Result<()> {
        self.store.remove(&email_key(user_id)).await?;
        self.store.remove(&text_key(user_id)).await?;
        Ok(())
    }

    async fn load<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupt template entry, using default");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::key_value_store::MockKeyValueStore;

    #[tokio::test]
    async fn test_get_defaults_when_missing() {
        let mut store = MockKeyValueStore::new();
        store.expect_get().returning(|_| Ok(None));

        let service = TemplateService::new(Arc::new(store));
        let templates = service.get("u1").await.unwrap();
        assert_eq!(templates, Templates::default());
    }

    #[tokio::test]
    async fn test_get_corrupt_entry_falls_back() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .withf(|key| key.to_string() == "templates:u1:email")
            .returning(|_| Ok(Some("{not json".to_string())));
        store
            .expect_get()
            .withf(|key| key.to_string() == "templates:u1:text")
            .returning(|_| Ok(Some(r#"{"message":"Hi {{name}}"}"#.to_string())));

        let service = TemplateService::new(Arc::new(store));
        let templates = service.get("u1").await.unwrap();
        assert_eq!(templates.email, EmailTemplate::default());
        assert_eq!(templates.text.message, "Hi {{name}}");
    }

    #[tokio::test]
    async fn test_save_text_reports_unknown_tokens() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .withf(|key, value| {
                key.to_string() == "templates:u1:text" && value.contains("{{shoe size}}")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let service = TemplateService::new(Arc::new(store));
        let unknown = service
            .save_text(
                "u1",
                &TextTemplate {
                    message: "Hi {{name}}, {{shoe size}}?".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(unknown, vec!["{{shoe size}}"]);
    }

    #[tokio::test]
    async fn test_save_text_too_long() {
        let store = MockKeyValueStore::new();
        let service = TemplateService::new(Arc::new(store));
        let result = service
            .save_text(
                "u1",
                &TextTemplate {
                    message: "x".repeat(MAX_SMS_LEN + 1),
                },
            )
            .await;
        assert!(result.unwrap_err().to_string().contains("too long"));
    }
}
