//! # API Module
//!
//! Billing operations of an organization. Handlers in `front` only parse
//! requests and map [BillingError] to responses, every rule lives here.
//!
//! ## Modules
//!
//! - [`collection`] - Collection messages and their dispatch by WhatsApp or email
//! - [`invoice`] - Invoice lifecycle: generation, overdue marking, payments, cancellation
//! - [`membership`] - Organization membership checks with a TTL cache
//! - [`pdf_handler`] - PDF generation from Typst markup
//! - [`pix`] - PIX charges of invoices
//! - [`report`] - Financial summary and CSV/PDF exports

pub mod collection;
pub mod invoice;
pub mod membership;
pub mod pdf_handler;
pub mod pix;
pub mod report;

use derive_more::{Display, Error};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{models, models::invoice::InvoiceStatus, pix::PixError, repo};

#[derive(Debug, Display, Error)]
pub enum BillingError {
    #[display("organization not found")]
    OrganizationNotFound,
    #[display("invoice not found")]
    InvoiceNotFound,
    #[display("client not found")]
    ClientNotFound,
    #[display("user is not a member of this organization")]
    NotAMember,
    #[display("only owners and admins can manage billing")]
    Forbidden,
    #[display("invoice is {_0}")]
    InvoiceNotOpen(#[error(not(source))] InvoiceStatus),
    #[display("payment amount must be greater than zero")]
    InvalidPaymentAmount,
    #[display("partial payments are not accepted, invoice amount is {_0}")]
    PartialPayment(#[error(not(source))] Decimal),
    #[display("client has no {_0} contact")]
    NoContact(#[error(not(source))] &'static str),
    #[display("invalid period: {_0}")]
    InvalidPeriod(#[error(not(source))] String),
    #[display("{_0}")]
    Pix(PixError),
    #[display("{_0}")]
    Internal(#[error(not(source))] anyhow::Error),
}

impl From<anyhow::Error> for BillingError {
    fn from(error: anyhow::Error) -> Self {
        Self::Internal(error)
    }
}

impl From<PixError> for BillingError {
    fn from(error: PixError) -> Self {
        Self::Pix(error)
    }
}

pub(crate) async fn load_organization(
    repo: &repo::ImplAppRepo,
    organization_id: Uuid,
) -> Result<models::organization::Organization, BillingError> {
    repo.get_organization(organization_id)
        .await?
        .ok_or(BillingError::OrganizationNotFound)
}

pub(crate) async fn load_invoice(
    repo: &repo::ImplAppRepo,
    organization_id: Uuid,
    invoice_id: Uuid,
) -> Result<models::invoice::Invoice, BillingError> {
    repo.get_invoice(organization_id, invoice_id)
        .await?
        .ok_or(BillingError::InvoiceNotFound)
}
