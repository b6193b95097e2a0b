//! Collection of open invoices: the message sent to the client with the pix
//! copy-paste code, by WhatsApp or email.

use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    BillingError, load_invoice, load_organization,
    pix::{InvoicePix, store_invoice_pix},
};
use crate::{consts, models, qr, repo, services, templates, utils};

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
pub enum CollectionChannel {
    #[display("whatsapp")]
    WhatsApp,
    #[display("email")]
    Email,
}

/// Rendered collection texts of one invoice
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CollectionMessage {
    pub text: String,
    pub email_subject: String,
    pub email_html: String,
    /// `wa.me` link opening a chat with the text, when the client has a phone
    pub whatsapp_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CollectionReceipt {
    pub invoice_id: Uuid,
    pub channel: CollectionChannel,
    pub provider_message_id: String,
    pub whatsapp_link: Option<String>,
}

/// `https://wa.me/<digits>?text=<message>`, None for unusable phones
pub fn whatsapp_share_link(phone: &str, text: &str) -> Option<String> {
    let digits = utils::whatsapp_phone_digits(phone)?;
    let mut url = reqwest::Url::parse(consts::WHATSAPP_SHARE_URL)
        .and_then(|base| base.join(&digits))
        .ok()?;
    url.query_pairs_mut().append_pair("text", text);

    Some(url.to_string())
}

pub fn build_collection_message(
    organization: &models::organization::Organization,
    client: &models::client::Client,
    invoice: &models::invoice::Invoice,
    pix_payload: &str,
    today: NaiveDate,
) -> anyhow::Result<CollectionMessage> {
    let month = utils::format_month_br(invoice.reference_month);

    let mut context = tera::Context::new();
    context.insert("client_first_name", client.first_name());
    context.insert("month", &month);
    context.insert("organization_name", &organization.name);
    context.insert("amount", &utils::format_brl(invoice.amount));
    context.insert("due_date", &utils::format_date_br(invoice.due_date));
    context.insert("is_late", &invoice.is_late(today));
    context.insert("pix_payload", pix_payload);

    let text = templates::TEMPLATES.render(templates::COLLECTION_WHATSAPP, &context)?;

    let qr_code = qr::render_pix_qr_png(pix_payload)?;
    context.insert("qr_code_data_uri", &qr::png_data_uri(&qr_code));
    let email_html = templates::TEMPLATES.render(templates::COLLECTION_EMAIL, &context)?;

    let whatsapp_link = client
        .phone()
        .and_then(|phone| whatsapp_share_link(phone, &text));

    Ok(CollectionMessage {
        email_subject: format!("Mensalidade {month} - {}", organization.name),
        text,
        email_html,
        whatsapp_link,
    })
}

/// Sends the collection message of an open invoice to its client.
///
/// # Errors
/// - [BillingError::NoContact] when the client has no phone or email for the channel
/// - [BillingError::Internal] when the provider refuses the message
pub async fn send_collection(
    repo: &repo::ImplAppRepo,
    notification_service: &services::ImplNotificationService,
    organization_id: Uuid,
    invoice_id: Uuid,
    channel: CollectionChannel,
    today: NaiveDate,
) -> Result<CollectionReceipt, BillingError> {
    let organization = load_organization(repo, organization_id).await?;
    let invoice = load_invoice(repo, organization_id, invoice_id).await?;

    if !invoice.is_open() {
        return Err(BillingError::InvoiceNotOpen(invoice.status));
    }

    let client = repo
        .get_client(organization_id, invoice.client_id)
        .await?
        .ok_or(BillingError::ClientNotFound)?;

    // resolved before anything is stored for the invoice
    let recipient = match channel {
        CollectionChannel::WhatsApp => client
            .phone()
            .and_then(utils::whatsapp_phone_digits)
            .ok_or(BillingError::NoContact("whatsapp"))?,
        CollectionChannel::Email => client
            .email()
            .map(String::from)
            .ok_or(BillingError::NoContact("email"))?,
    };

    let InvoicePix {
        organization,
        invoice,
        payload,
    } = store_invoice_pix(repo, organization, invoice).await?;

    let message = build_collection_message(&organization, &client, &invoice, &payload, today)?;

    let provider_message_id = match channel {
        CollectionChannel::WhatsApp => {
            notification_service
                .send_whatsapp_text(&recipient, &message.text)
                .await?
        }
        CollectionChannel::Email => {
            notification_service
                .send_email(&recipient, &message.email_subject, &message.email_html)
                .await?
        }
    };

    tracing::info!(%invoice_id, %channel, %provider_message_id, "collection sent");

    Ok(CollectionReceipt {
        invoice_id,
        channel,
        provider_message_id,
        whatsapp_link: message.whatsapp_link,
    })
}
