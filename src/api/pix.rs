use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::{BillingError, load_invoice, load_organization};
use crate::{models, pix, qr, repo};

/// Pix copy-paste code of an open invoice, ready to show or send.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PixCharge {
    pub invoice_id: Uuid,
    pub payload: String,
    pub amount: Decimal,
    pub qr_code_data_uri: String,
}

/// Invoice together with its organization and current pix payload
pub struct InvoicePix {
    pub organization: models::organization::Organization,
    pub invoice: models::invoice::Invoice,
    pub payload: String,
}

/// Builds the pix payload of an open invoice and keeps it on the invoice.
///
/// The payload is only written back when it differs from the stored one,
/// e.g. after the organization changed its pix key.
///
/// # Errors
/// - [BillingError::InvoiceNotOpen] for paid or cancelled invoices
/// - [BillingError::Pix] when the organization has no usable pix key
pub async fn invoice_pix(
    repo: &repo::ImplAppRepo,
    organization_id: Uuid,
    invoice_id: Uuid,
) -> Result<InvoicePix, BillingError> {
    let organization = load_organization(repo, organization_id).await?;
    let invoice = load_invoice(repo, organization_id, invoice_id).await?;

    store_invoice_pix(repo, organization, invoice).await
}

/// Same as [invoice_pix] for an organization and invoice already loaded
pub(crate) async fn store_invoice_pix(
    repo: &repo::ImplAppRepo,
    organization: models::organization::Organization,
    invoice: models::invoice::Invoice,
) -> Result<InvoicePix, BillingError> {
    if !invoice.is_open() {
        return Err(BillingError::InvoiceNotOpen(invoice.status));
    }

    let payload = pix::build_pix_payload(&organization.pix_input_for(&invoice))?;

    if invoice.pix_payload.as_deref() != Some(payload.as_str()) {
        repo.save_invoice_pix_payload(invoice.id, &payload).await?;
        tracing::info!(invoice_id = %invoice.id, "pix payload stored");
    }

    Ok(InvoicePix {
        organization,
        invoice,
        payload,
    })
}

pub async fn pix_charge_for_invoice(
    repo: &repo::ImplAppRepo,
    organization_id: Uuid,
    invoice_id: Uuid,
) -> Result<PixCharge, BillingError> {
    let InvoicePix {
        invoice, payload, ..
    } = invoice_pix(repo, organization_id, invoice_id).await?;

    let qr_code = qr::render_pix_qr_png(&payload)?;

    Ok(PixCharge {
        invoice_id: invoice.id,
        amount: invoice.amount,
        qr_code_data_uri: qr::png_data_uri(&qr_code),
        payload,
    })
}
