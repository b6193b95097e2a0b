use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payment::PaymentMethod;

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    // Generated for the month and waiting for payment
    #[default]
    #[display("pending")]
    Pending,
    // Reconciled, either by pix or by a manual entry
    #[display("paid")]
    Paid,
    // Past its due date, flagged by the overdue stored procedure
    #[display("overdue")]
    Overdue,
    #[display("cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub client_id: Uuid,
    /// First day of the billed month
    pub reference_month: NaiveDate,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub paid_amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    pub pix_payload: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Reference label carried in the pix payload, unique per invoice.
    ///
    /// Format: `SHAD{YYYYMM}{first 8 hex chars of the id}`
    pub fn txid(&self) -> String {
        let id = self.id.simple().to_string().to_uppercase();
        format!(
            "SHAD{month}{id}",
            month = self.reference_month.format("%Y%m"),
            id = &id[..8]
        )
    }

    pub fn description(&self) -> String {
        format!("Mensalidade {}", self.reference_month.format("%m/%Y"))
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, InvoiceStatus::Pending | InvoiceStatus::Overdue)
    }

    pub fn is_paid(&self) -> bool {
        self.status.eq(&InvoiceStatus::Paid)
    }

    /// Open and past its due date, whether or not it was flagged yet
    pub fn is_late(&self, today: NaiveDate) -> bool {
        self.is_open() && self.due_date < today
    }

    /// Status as of `today`, late pending invoices count as overdue
    pub fn status_on(&self, today: NaiveDate) -> InvoiceStatus {
        if self.is_late(today) {
            return InvoiceStatus::Overdue;
        }
        self.status
    }

    /// Amount actually received, falls back to the billed amount
    pub fn received_amount(&self) -> Decimal {
        self.paid_amount.unwrap_or(self.amount)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    pub(crate) fn create_test_invoice(status: InvoiceStatus) -> Invoice {
        Invoice {
            id: Uuid::from_str("a1b2c3d4-0000-4000-8000-000000000001").unwrap(),
            organization_id: Uuid::from_str("0f0f0f0f-0000-4000-8000-000000000000").unwrap(),
            client_id: Uuid::from_str("c0ffee00-0000-4000-8000-000000000000").unwrap(),
            reference_month: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            amount: dec!(150.00),
            due_date: NaiveDate::from_ymd_opt(2026, 10, 10).unwrap(),
            status,
            paid_at: None,
            paid_amount: None,
            payment_method: None,
            pix_payload: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_txid() {
        let invoice = create_test_invoice(InvoiceStatus::Pending);
        assert_eq!(invoice.txid(), "SHAD202610A1B2C3D4");
        assert!(invoice.txid().len() <= 25);
    }

    #[test]
    fn test_description() {
        let invoice = create_test_invoice(InvoiceStatus::Pending);
        assert_eq!(invoice.description(), "Mensalidade 10/2026");
    }

    #[test]
    fn test_is_late() {
        let invoice = create_test_invoice(InvoiceStatus::Pending);
        let due = invoice.due_date;

        assert!(!invoice.is_late(due));
        assert!(invoice.is_late(due.succ_opt().unwrap()));
        assert_eq!(invoice.status_on(due.succ_opt().unwrap()), InvoiceStatus::Overdue);

        let paid = create_test_invoice(InvoiceStatus::Paid);
        assert!(!paid.is_late(due.succ_opt().unwrap()));
        assert_eq!(paid.status_on(due.succ_opt().unwrap()), InvoiceStatus::Paid);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&InvoiceStatus::Overdue).unwrap(),
            "\"overdue\""
        );
        assert_eq!(InvoiceStatus::Cancelled.to_string(), "cancelled");
    }
}
