use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{BillingError, load_invoice, load_organization};
use crate::{models, models::invoice::InvoiceStatus, repo, utils};

/// Creates the invoices of a month for every active client.
///
/// `reference_month` may be any day of the month, the current month is used
/// when missing. Clients already invoiced for the month are skipped by the
/// stored procedure, so running it twice is harmless.
pub async fn generate_monthly_invoices(
    repo: &repo::ImplAppRepo,
    organization_id: Uuid,
    reference_month: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<u64, BillingError> {
    load_organization(repo, organization_id).await?;

    let month = utils::first_day_of_month(reference_month.unwrap_or(today));
    let created = repo
        .generate_monthly_invoices(organization_id, month)
        .await?;

    tracing::info!(%organization_id, %month, created, "monthly invoices generated");

    Ok(created)
}

/// Flags pending invoices due before `today` as overdue.
///
/// Without an organization the whole database is swept, which is what the
/// daily scheduler does.
pub async fn mark_overdue_invoices(
    repo: &repo::ImplAppRepo,
    organization_id: Option<Uuid>,
    today: NaiveDate,
) -> Result<u64, BillingError> {
    let marked = repo.mark_overdue_invoices(organization_id, today).await?;

    tracing::info!(?organization_id, %today, marked, "overdue invoices marked");

    Ok(marked)
}

/// Reconciles a payment received outside the pix flow.
///
/// # Errors
/// - [BillingError::InvalidPaymentAmount] when the amount is not positive
/// - [BillingError::InvoiceNotOpen] when the invoice was paid or cancelled
/// - [BillingError::PartialPayment] when less than the invoice amount was paid
pub async fn register_manual_payment(
    repo: &repo::ImplAppRepo,
    organization_id: Uuid,
    payment: &models::payment::ManualPayment,
) -> Result<models::invoice::Invoice, BillingError> {
    if payment.amount.is_sign_negative() || payment.amount.is_zero() {
        return Err(BillingError::InvalidPaymentAmount);
    }

    let invoice = load_invoice(repo, organization_id, payment.invoice_id).await?;

    if !invoice.is_open() {
        return Err(BillingError::InvoiceNotOpen(invoice.status));
    }

    if payment.amount < invoice.amount {
        return Err(BillingError::PartialPayment(invoice.amount));
    }

    let paid_invoice = repo
        .register_manual_payment(organization_id, payment, Utc::now())
        .await?;

    tracing::info!(
        invoice_id = %payment.invoice_id,
        method = %payment.method,
        amount = %payment.amount,
        "manual payment registered"
    );

    Ok(paid_invoice)
}

/// Cancels an open invoice, cancelling twice is a no-op
pub async fn cancel_invoice(
    repo: &repo::ImplAppRepo,
    organization_id: Uuid,
    invoice_id: Uuid,
) -> Result<(), BillingError> {
    let invoice = load_invoice(repo, organization_id, invoice_id).await?;

    match invoice.status {
        InvoiceStatus::Cancelled => Ok(()),
        InvoiceStatus::Paid => Err(BillingError::InvoiceNotOpen(InvoiceStatus::Paid)),
        InvoiceStatus::Pending | InvoiceStatus::Overdue => {
            repo.cancel_invoice(organization_id, invoice_id).await?;
            tracing::info!(%invoice_id, "invoice cancelled");
            Ok(())
        }
    }
}

/// Invoices of an organization due within a period
pub async fn list_invoices(
    repo: &repo::ImplAppRepo,
    organization_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<models::invoice::Invoice>, BillingError> {
    super::report::validate_period(from, to)?;

    Ok(repo.list_invoices(organization_id, from, to).await?)
}
