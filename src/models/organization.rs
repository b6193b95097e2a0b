use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::invoice::Invoice;
use crate::pix::PixPayloadInput;

/// A tenant: a gym, school or club billing its members.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub pix_key: Option<String>,
    pub pix_merchant_name: Option<String>,
    pub pix_merchant_city: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    /// Pix input charging `invoice` to this organization's account.
    ///
    /// The organization name stands in for a missing merchant name, blank
    /// keys are left for the payload builder to reject.
    pub fn pix_input_for(&self, invoice: &Invoice) -> PixPayloadInput {
        PixPayloadInput {
            key: self.pix_key.clone().unwrap_or_default(),
            amount: Some(invoice.amount.to_string()),
            merchant_name: self
                .pix_merchant_name
                .clone()
                .or_else(|| Some(self.name.clone())),
            merchant_city: self.pix_merchant_city.clone(),
            txid: Some(invoice.txid()),
            description: Some(invoice.description()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    #[display("owner")]
    Owner,
    #[display("admin")]
    Admin,
    #[default]
    #[display("member")]
    Member,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Membership {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
}

impl Membership {
    pub fn can_manage_billing(&self) -> bool {
        matches!(self.role, MemberRole::Owner | MemberRole::Admin)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::invoice::{InvoiceStatus, tests::create_test_invoice};

    pub(crate) fn create_test_organization(pix_key: Option<&str>) -> Organization {
        Organization {
            id: Uuid::new_v4(),
            name: "Academia Shad".into(),
            pix_key: pix_key.map(String::from),
            pix_merchant_name: None,
            pix_merchant_city: Some("Campinas".into()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_pix_input_for_invoice() {
        let organization = create_test_organization(Some("fulano@example.com"));
        let invoice = create_test_invoice(InvoiceStatus::Pending);

        let input = organization.pix_input_for(&invoice);

        assert_eq!(input.key, "fulano@example.com");
        assert_eq!(input.amount.as_deref(), Some("150.00"));
        assert_eq!(input.merchant_name.as_deref(), Some("Academia Shad"));
        assert_eq!(input.merchant_city.as_deref(), Some("Campinas"));
        assert_eq!(input.txid.as_deref(), Some("SHAD202610A1B2C3D4"));
        assert_eq!(input.description.as_deref(), Some("Mensalidade 10/2026"));
    }

    #[test]
    fn test_can_manage_billing() {
        let membership = |role| Membership {
            organization_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role,
        };

        assert!(membership(MemberRole::Owner).can_manage_billing());
        assert!(membership(MemberRole::Admin).can_manage_billing());
        assert!(!membership(MemberRole::Member).can_manage_billing());
    }
}
