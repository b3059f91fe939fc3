// Contact actions - tel:, mailto: and sms: URIs

use crate::application::leads::owned_lead;
use crate::application::template::{render, RenderContext, Sender, TemplateService};
use crate::domain::{phone, DomainError, Lead, LeadId, TemplateChannel};
use crate::error::{AppError, Result};
use crate::port::{LeadListRepository, LeadRepository, TimeProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// An action the client hands to the OS URI handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactAction {
    Call {
        phone: String,
    },
    Email {
        to: String,
        subject: String,
        body: String,
    },
    Sms {
        phone: String,
        body: String,
    },
}

impl ContactAction {
    pub fn to_uri(&self) -> String {
        match self {
            ContactAction::Call { phone } => format!("tel:{}", phone::e164(phone)),
            ContactAction::Email { to, subject, body } => format!(
                "mailto:{}?subject={}&body={}",
                urlencoding::encode(to.trim()),
                urlencoding::encode(subject),
                urlencoding::encode(body)
            ),
            ContactAction::Sms { phone, body } => format!(
                "sms:{}?body={}",
                phone::e164(phone),
                urlencoding::encode(body)
            ),
        }
    }

    pub fn channel(&self) -> TemplateChannel {
        match self {
            ContactAction::Call { .. } => TemplateChannel::Call,
            ContactAction::Email { .. } => TemplateChannel::Email,
            ContactAction::Sms { .. } => TemplateChannel::Sms,
        }
    }
}

/// Contact request for one lead
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRequest {
    pub user_id: String,
    pub lead_id: LeadId,
    pub channel: TemplateChannel,
    /// 0 = primary phone, 1.. = additional phones
    #[serde(default)]
    pub phone_index: usize,
    #[serde(default)]
    pub sender: Sender,
}

/// Ready-to-open contact action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparedContact {
    pub lead: Lead,
    pub action: ContactAction,
    pub uri: String,
}

fn pick_phone(lead: &Lead, phone_index: usize) -> Result<String> {
    let phone = if phone_index == 0 {
        Some(&lead.phone)
    } else {
        lead.additional_phones.get(phone_index - 1)
    };
    phone.cloned().ok_or_else(|| {
        AppError::Validation(format!(
            "Lead {} has no phone at index {}",
            lead.id, phone_index
        ))
    })
}

/// Contact Service
pub struct ContactService {
    lead_repo: Arc<dyn LeadRepository>,
    list_repo: Arc<dyn LeadListRepository>,
    templates: Arc<TemplateService>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ContactService {
    pub fn new(
        lead_repo: Arc<dyn LeadRepository>,
        list_repo: Arc<dyn LeadListRepository>,
        templates: Arc<TemplateService>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            lead_repo,
            list_repo,
            templates,
            time_provider,
        }
    }

    /// Build the contact action for a lead
    ///
    /// Email and SMS bodies come from the user's templates. A call is
    /// recorded on the lead. Leads outside the caller's lists are not found.
    pub async fn prepare(&self, req: ContactRequest) -> Result<PreparedContact> {
        let mut lead = owned_lead(
            self.lead_repo.as_ref(),
            self.list_repo.as_ref(),
            &req.user_id,
            &req.lead_id,
        )
        .await?;

        let now = self.time_provider.now_millis();

        let action = match req.channel {
            TemplateChannel::Call => {
                let phone = pick_phone(&lead, req.phone_index)?;
                lead.record_call(now);
                self.lead_repo.update_calls(&lead).await?;
                ContactAction::Call { phone }
            }
            TemplateChannel::Email => {
                let to = lead.email.clone().ok_or_else(|| DomainError::MissingEmail {
                    lead_id: lead.id.clone(),
                })?;
                let templates = self.templates.get(&req.user_id).await?;
                let ctx = RenderContext::for_lead(&lead, &req.sender, now);
                ContactAction::Email {
                    to,
                    subject: render(&templates.email.subject, &ctx),
                    body: render(&templates.email.body, &ctx),
                }
            }
            TemplateChannel::Sms => {
                let phone = pick_phone(&lead, req.phone_index)?;
                let templates = self.templates.get(&req.user_id).await?;
                let ctx = RenderContext::for_lead(&lead, &req.sender, now);
                ContactAction::Sms {
                    phone,
                    body: render(&templates.text.message, &ctx),
                }
            }
        };

        info!(
            lead_id = %lead.id,
            channel = %action.channel(),
            "Contact action prepared"
        );

        let uri = action.to_uri();
        Ok(PreparedContact { lead, action, uri })
    }
}
