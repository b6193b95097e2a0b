use chrono::NaiveDate;
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    #[display("pix")]
    Pix,
    #[display("cash")]
    Cash,
    #[display("bank_transfer")]
    BankTransfer,
    #[display("card")]
    Card,
}

/// A payment reconciled by hand against an invoice.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ManualPayment {
    pub invoice_id: Uuid,
    pub amount: Decimal,
    #[serde(default)]
    pub method: PaymentMethod,
    pub paid_on: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}
