//! Gatekeeper between the contact form and the email provider.
//!
//! A submission is validated and checked against the sender's cooldown
//! before any network I/O. Only a delivered message updates the cooldown.

use crate::api::EmailProvider;
use crate::api::models::{ContactMessage, ProviderError, ProviderResponse, TemplateParams};
use crate::app::AppConfig;
use crate::contact::cooldown::{self, CooldownStatus};
use crate::contact::error::SubmitError;
use crate::contact::validate;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    pub template_id: String,
    pub auto_reply_template_id: Option<String>,
    /// Owner inbox the message is forwarded to.
    pub to_email: String,
}

impl From<&AppConfig> for GatewaySettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            template_id: config.template_id.clone(),
            auto_reply_template_id: config
                .auto_reply_template_id
                .clone()
                .filter(|t| !t.trim().is_empty()),
            to_email: config.to_email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoReply {
    Sent,
    Failed(ProviderError),
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub response: ProviderResponse,
    pub auto_reply: AutoReply,
}

pub struct ContactGateway<S, P> {
    store: S,
    provider: P,
    settings: GatewaySettings,
}

impl<S: KeyValueStore, P: EmailProvider> ContactGateway<S, P> {
    pub fn new(store: S, provider: P, settings: GatewaySettings) -> Self {
        Self {
            store,
            provider,
            settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn validate(&self, message: &ContactMessage) -> Result<ContactMessage, SubmitError> {
        validate::validate(message)
    }

    pub fn check_cooldown(&self, email: &str, now: DateTime<Utc>) -> CooldownStatus {
        cooldown::check_cooldown(&self.store, email.trim(), now)
    }

    pub async fn submit(
        &self,
        message: &ContactMessage,
        now: DateTime<Utc>,
    ) -> Result<SendOutcome, SubmitError> {
        let message = self.validate(message).map_err(|e| {
            log::debug!("rejected contact submission: {:?}", e);
            e
        })?;
        let email = message.sender_email.as_str();

        if let CooldownStatus::Blocked(remaining) = self.check_cooldown(email, now) {
            log::warn!("{} is cooling down for another {}", email, remaining);
            return Err(SubmitError::RateLimited(remaining));
        }

        let params = self.primary_params(&message);
        let template_id = self.settings.template_id.as_str();
        log::debug!("forwarding message from {} via {}", email, template_id);
        let response = match self.provider.send(template_id, &params).await {
            Ok(resp) => resp,
            Err(err) => {
                log::warn!("provider rejected message from {}: {}", email, err);
                return Err(SubmitError::from(err));
            }
        };
        log::info!(
            "delivered contact message from {} (HTTP {})",
            email,
            response.status
        );

        // Delivery already happened, so a failed write must not turn into an error.
        if let Err(e) = cooldown::record_send(&self.store, email, now) {
            log::error!("could not record cooldown for {}: {}", email, e);
        }

        let auto_reply = self.send_auto_reply(&message).await;
        Ok(SendOutcome {
            response,
            auto_reply,
        })
    }

    fn primary_params(&self, message: &ContactMessage) -> TemplateParams {
        TemplateParams::new()
            .with("from_name", message.sender_name.as_str())
            .with("from_email", message.sender_email.as_str())
            .with("subject", message.subject.as_str())
            .with("message", message.body.as_str())
            .with("to_email", self.settings.to_email.as_str())
            .with("reply_to", message.sender_email.as_str())
    }

    async fn send_auto_reply(&self, message: &ContactMessage) -> AutoReply {
        let Some(template_id) = self.settings.auto_reply_template_id.as_deref() else {
            return AutoReply::Skipped;
        };
        let params = TemplateParams::new()
            .with("to_name", message.sender_name.as_str())
            .with("to_email", message.sender_email.as_str())
            .with("subject", message.subject.as_str())
            .with("message", message.body.as_str());
        match self.provider.send(template_id, &params).await {
            Ok(_) => AutoReply::Sent,
            Err(err) => {
                log::warn!("auto-reply to {} failed: {}", message.sender_email, err);
                AutoReply::Failed(err)
            }
        }
    }
}
