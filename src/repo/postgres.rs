use crate::models;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use sqlx::{FromRow, PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::{AppRepo, postgres_queries};

#[derive(Clone)]
pub struct PgRepo {
    pub db_pool: PgPool,
}

/// Text columns holding a snake_case enum value, unknown values fail the row
fn enum_from_text<T: DeserializeOwned>(column: &str, value: &str) -> sqlx::Result<T> {
    serde_json::from_value::<T>(serde_json::Value::String(value.to_string())).map_err(|e| {
        sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        }
    })
}

fn enum_column<T: DeserializeOwned>(row: &PgRow, column: &str) -> sqlx::Result<T> {
    enum_from_text(column, row.try_get::<&str, &str>(column)?)
}

fn optional_enum_column<T: DeserializeOwned>(
    row: &PgRow,
    column: &str,
) -> sqlx::Result<Option<T>> {
    row.try_get::<Option<&str>, &str>(column)?
        .map(|value| enum_from_text(column, value))
        .transpose()
}

impl FromRow<'_, PgRow> for models::organization::Organization {
    fn from_row(row: &PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            pix_key: row.try_get("pix_key")?,
            pix_merchant_name: row.try_get("pix_merchant_name")?,
            pix_merchant_city: row.try_get("pix_merchant_city")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl FromRow<'_, PgRow> for models::organization::Membership {
    fn from_row(row: &PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            organization_id: row.try_get("organization_id")?,
            user_id: row.try_get("user_id")?,
            role: enum_column(row, "role")?,
        })
    }
}

impl FromRow<'_, PgRow> for models::client::Client {
    fn from_row(row: &PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            organization_id: row.try_get("organization_id")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            monthly_fee: row.try_get("monthly_fee")?,
            due_day: row.try_get("due_day")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl FromRow<'_, PgRow> for models::invoice::Invoice {
    fn from_row(row: &PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            organization_id: row.try_get("organization_id")?,
            client_id: row.try_get("client_id")?,
            reference_month: row.try_get("reference_month")?,
            amount: row.try_get("amount")?,
            due_date: row.try_get("due_date")?,
            status: enum_column(row, "status")?,
            paid_at: row.try_get("paid_at")?,
            paid_amount: row.try_get("paid_amount")?,
            payment_method: optional_enum_column(row, "payment_method")?,
            pix_payload: row.try_get("pix_payload")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl AppRepo for PgRepo {
    async fn get_organization(
        &self,
        organization_id: Uuid,
    ) -> anyhow::Result<Option<models::organization::Organization>> {
        Ok(sqlx::query_as(postgres_queries::QUERY_GET_ORGANIZATION)
            .bind(organization_id)
            .fetch_optional(&self.db_pool)
            .await?)
    }

    async fn get_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<models::organization::Membership>> {
        Ok(sqlx::query_as(postgres_queries::QUERY_GET_MEMBERSHIP)
            .bind(organization_id)
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?)
    }

    async fn get_client(
        &self,
        organization_id: Uuid,
        client_id: Uuid,
    ) -> anyhow::Result<Option<models::client::Client>> {
        Ok(sqlx::query_as(postgres_queries::QUERY_GET_CLIENT)
            .bind(organization_id)
            .bind(client_id)
            .fetch_optional(&self.db_pool)
            .await?)
    }

    async fn list_clients(
        &self,
        organization_id: Uuid,
    ) -> anyhow::Result<Vec<models::client::Client>> {
        Ok(sqlx::query_as(postgres_queries::QUERY_LIST_CLIENTS)
            .bind(organization_id)
            .fetch_all(&self.db_pool)
            .await?)
    }

    async fn get_invoice(
        &self,
        organization_id: Uuid,
        invoice_id: Uuid,
    ) -> anyhow::Result<Option<models::invoice::Invoice>> {
        Ok(sqlx::query_as(postgres_queries::QUERY_GET_INVOICE)
            .bind(organization_id)
            .bind(invoice_id)
            .fetch_optional(&self.db_pool)
            .await?)
    }

    async fn list_invoices(
        &self,
        organization_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> anyhow::Result<Vec<models::invoice::Invoice>> {
        Ok(sqlx::query_as(postgres_queries::QUERY_LIST_INVOICES)
            .bind(organization_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.db_pool)
            .await?)
    }

    async fn save_invoice_pix_payload(
        &self,
        invoice_id: Uuid,
        payload: &str,
    ) -> anyhow::Result<()> {
        Ok(sqlx::query(postgres_queries::QUERY_SAVE_PIX_PAYLOAD)
            .bind(invoice_id)
            .bind(payload)
            .execute(&self.db_pool)
            .await
            .map(|_| ())?)
    }

    async fn register_manual_payment(
        &self,
        organization_id: Uuid,
        payment: &models::payment::ManualPayment,
        registered_at: DateTime<Utc>,
    ) -> anyhow::Result<models::invoice::Invoice> {
        let paid_at = payment
            .paid_on
            .and_hms_opt(12, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or(registered_at);

        sqlx::query_as(postgres_queries::QUERY_REGISTER_MANUAL_PAYMENT)
            .bind(organization_id)
            .bind(payment.invoice_id)
            .bind(paid_at)
            .bind(payment.amount)
            .bind(payment.method.to_string())
            .bind(payment.notes.as_deref())
            .bind(registered_at)
            .fetch_optional(&self.db_pool)
            .await?
            .context("invoice is not open for payment")
    }

    async fn cancel_invoice(&self, organization_id: Uuid, invoice_id: Uuid) -> anyhow::Result<()> {
        Ok(sqlx::query(postgres_queries::QUERY_CANCEL_INVOICE)
            .bind(organization_id)
            .bind(invoice_id)
            .execute(&self.db_pool)
            .await
            .map(|_| ())?)
    }

    async fn generate_monthly_invoices(
        &self,
        organization_id: Uuid,
        reference_month: NaiveDate,
    ) -> anyhow::Result<u64> {
        let created: i64 = sqlx::query(postgres_queries::QUERY_GENERATE_MONTHLY_INVOICES)
            .bind(organization_id)
            .bind(reference_month)
            .fetch_one(&self.db_pool)
            .await?
            .try_get("created")?;

        Ok(u64::try_from(created).unwrap_or_default())
    }

    async fn mark_overdue_invoices(
        &self,
        organization_id: Option<Uuid>,
        today: NaiveDate,
    ) -> anyhow::Result<u64> {
        let updated: i64 = sqlx::query(postgres_queries::QUERY_MARK_OVERDUE_INVOICES)
            .bind(organization_id)
            .bind(today)
            .fetch_one(&self.db_pool)
            .await?
            .try_get("updated")?;

        Ok(u64::try_from(updated).unwrap_or_default())
    }
}
