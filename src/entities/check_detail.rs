//! Check detail entity - A paper check attached to a receipt or payment voucher.

use super::sea_orm_active_enums::{CheckDirection, CheckStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Check detail database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "check_details")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Number printed on the check
    pub check_number: String,
    /// Drawee bank
    pub bank_name: String,
    /// Date the check can be cashed
    pub due_date: Date,
    /// Face value; always equals the owning voucher's amount
    pub amount: f64,
    /// Received or issued
    pub direction: CheckDirection,
    /// Clearing status
    pub status: CheckStatus,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `CheckDetail` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Receipt vouchers settled with this check
    #[sea_orm(has_many = "super::receipt_voucher::Entity")]
    ReceiptVouchers,
    /// Payment vouchers settled with this check
    #[sea_orm(has_many = "super::payment_voucher::Entity")]
    PaymentVouchers,
}

impl Related<super::receipt_voucher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReceiptVouchers.def()
    }
}

impl Related<super::payment_voucher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentVouchers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
