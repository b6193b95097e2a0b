pub mod notification;

use async_trait::async_trait;

/// Outbound channels used to collect invoices.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationService {
    /// Sends a free text WhatsApp message, returns the provider message id
    async fn send_whatsapp_text(&self, to: &str, body: &str) -> anyhow::Result<String>;

    /// Sends an html email, returns the provider message id
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<String>;
}

pub type ImplNotificationService = Box<dyn NotificationService>;
