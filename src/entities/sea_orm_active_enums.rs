//! String-backed enums shared by several entities.
//!
//! Each enum is stored as its `snake_case` string value and serialized the same
//! way over JSON, so API payloads and database rows use identical spellings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a quotation sent to a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    /// Being prepared
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Sent to the customer, awaiting an answer
    #[sea_orm(string_value = "sent")]
    Sent,
    /// Accepted by the customer; a work order may be opened
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Declined by the customer
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Lifecycle of a work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    /// Not started yet
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Work under way
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Delivered
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Abandoned
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// How a voucher was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash in hand
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Bank transfer
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    /// Paper check; the voucher carries a `check_detail` row
    #[sea_orm(string_value = "check")]
    Check,
}

/// Where the money of a receipt voucher came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ReceiptSource {
    /// Payment received from a customer
    #[sea_orm(string_value = "customer")]
    Customer,
    /// Capital injected by a partner; raises the partner's capital
    #[sea_orm(string_value = "partner_capital")]
    PartnerCapital,
    /// Anything else
    #[sea_orm(string_value = "other")]
    Other,
}

/// Who receives the money of a payment voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentBeneficiary {
    /// A supplier invoice
    #[sea_orm(string_value = "supplier")]
    Supplier,
    /// Salary or advance to an employee
    #[sea_orm(string_value = "employee")]
    Employee,
    /// Capital withdrawn by a partner; lowers the partner's capital
    #[sea_orm(string_value = "partner_withdrawal")]
    PartnerWithdrawal,
    /// Anything else
    #[sea_orm(string_value = "other")]
    Other,
}

/// State of a paper check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Not yet presented or cleared
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Funds transferred
    #[sea_orm(string_value = "cleared")]
    Cleared,
    /// Returned unpaid
    #[sea_orm(string_value = "bounced")]
    Bounced,
    /// Voided
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Whether a check was received or issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CheckDirection {
    /// Received with a receipt voucher
    #[sea_orm(string_value = "incoming")]
    Incoming,
    /// Issued with a payment voucher
    #[sea_orm(string_value = "outgoing")]
    Outgoing,
}

macro_rules! display_as_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.to_value())
                }
            }
        )*
    };
}

display_as_value!(
    QuotationStatus,
    WorkOrderStatus,
    PaymentMethod,
    ReceiptSource,
    PaymentBeneficiary,
    CheckStatus,
    CheckDirection,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_stored_value() {
        assert_eq!(WorkOrderStatus::InProgress.to_string(), "in_progress");
        assert_eq!(PaymentMethod::BankTransfer.to_string(), "bank_transfer");
        assert_eq!(
            PaymentBeneficiary::PartnerWithdrawal.to_string(),
            "partner_withdrawal"
        );
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ReceiptSource::PartnerCapital).unwrap_or_default();
        assert_eq!(json, "\"partner_capital\"");

        let status: CheckStatus = serde_json::from_str("\"bounced\"").unwrap_or(CheckStatus::Pending);
        assert_eq!(status, CheckStatus::Bounced);
    }
}
