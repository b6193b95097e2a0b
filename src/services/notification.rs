//! WhatsApp Business and Resend clients behind [NotificationService].

use anyhow::{Context, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{config::AppConfig, consts};

#[derive(Clone)]
pub struct NotificationHandler {
    pub client: reqwest::Client,
    /// WhatsApp Business API endpoint for sending messages
    pub whatsapp_endpoint: String,
    pub whatsapp_auth_token: String,
    pub resend_api_key: String,
    pub email_from: String,
}

impl NotificationHandler {
    pub fn from_config(app_config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            whatsapp_endpoint: app_config.whatsapp_send_msg_endpoint(),
            whatsapp_auth_token: app_config.whatsapp_business_auth.clone(),
            resend_api_key: app_config.resend_api_key.clone(),
            email_from: app_config.email_from.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WhatsAppMessageId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WhatsAppMessageResponse {
    messages: Vec<WhatsAppMessageId>,
}

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResendEmailResponse {
    id: String,
}

/// Reads the provider error body and turns it into an error
async fn provider_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let error_body = response
        .json::<serde_json::Value>()
        .await
        .unwrap_or_else(|_| json!({"error": "Unknown error"}));

    tracing::error!(%status, %error_body, "{provider} rejected the message");

    anyhow::anyhow!("{provider} API error {status}: {error_body}")
}

#[async_trait]
impl crate::services::NotificationService for NotificationHandler {
    async fn send_whatsapp_text(&self, to: &str, body: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .post(&self.whatsapp_endpoint)
            .header("accept", "application/json")
            .bearer_auth(&self.whatsapp_auth_token)
            .json(&json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": to,
                "type": "text",
                "text": {"preview_url": true, "body": body}
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error("WhatsApp", response).await);
        }

        let sent = response.json::<WhatsAppMessageResponse>().await?;
        match sent.messages.into_iter().next() {
            Some(message) => Ok(message.id),
            None => bail!("WhatsApp accepted the message without returning an id"),
        }
    }

    async fn send_email(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .post(consts::RESEND_EMAILS_ENDPOINT)
            .bearer_auth(&self.resend_api_key)
            .json(&ResendEmail {
                from: &self.email_from,
                to: [to],
                subject,
                html,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error("Resend", response).await);
        }

        Ok(response
            .json::<ResendEmailResponse>()
            .await
            .context("Resend response without an email id")?
            .id)
    }
}
