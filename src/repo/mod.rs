pub mod postgres;
pub mod postgres_queries;

use crate::models;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Persistence of the billing data.
///
/// Invoice generation and overdue marking are stored procedures owned by the
/// database, this trait only triggers them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppRepo {
    async fn get_organization(
        &self,
        organization_id: Uuid,
    ) -> anyhow::Result<Option<models::organization::Organization>>;

    async fn get_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<models::organization::Membership>>;

    async fn get_client(
        &self,
        organization_id: Uuid,
        client_id: Uuid,
    ) -> anyhow::Result<Option<models::client::Client>>;

    async fn list_clients(
        &self,
        organization_id: Uuid,
    ) -> anyhow::Result<Vec<models::client::Client>>;

    async fn get_invoice(
        &self,
        organization_id: Uuid,
        invoice_id: Uuid,
    ) -> anyhow::Result<Option<models::invoice::Invoice>>;

    /// Invoices with a due date between `from` and `to`, both inclusive
    async fn list_invoices(
        &self,
        organization_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> anyhow::Result<Vec<models::invoice::Invoice>>;

    async fn save_invoice_pix_payload(&self, invoice_id: Uuid, payload: &str)
    -> anyhow::Result<()>;

    async fn register_manual_payment(
        &self,
        organization_id: Uuid,
        payment: &models::payment::ManualPayment,
        registered_at: DateTime<Utc>,
    ) -> anyhow::Result<models::invoice::Invoice>;

    async fn cancel_invoice(&self, organization_id: Uuid, invoice_id: Uuid) -> anyhow::Result<()>;

    /// Runs the `generate_monthly_invoices` procedure, returns the number of new invoices
    async fn generate_monthly_invoices(
        &self,
        organization_id: Uuid,
        reference_month: NaiveDate,
    ) -> anyhow::Result<u64>;

    /// Runs the `mark_overdue_invoices` procedure for one or every organization
    async fn mark_overdue_invoices(
        &self,
        organization_id: Option<Uuid>,
        today: NaiveDate,
    ) -> anyhow::Result<u64>;
}

pub type ImplAppRepo = Box<dyn AppRepo>;
