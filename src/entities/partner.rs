//! Partner entity - Owners of the business and their capital accounts.
//!
//! `current_capital` is a stored running balance. It always equals
//! `initial_capital` plus capital receipts minus capital withdrawals, and is only
//! ever changed inside the same database transaction as the voucher that moves it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Partner database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partners")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable code, e.g. `PRT-0001`
    #[sea_orm(unique)]
    pub code: String,
    /// Full name
    pub name: String,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Share of profits in percent (0-100)
    pub share_percentage: f64,
    /// Capital contributed when the partner joined
    pub initial_capital: f64,
    /// Running capital balance
    pub current_capital: f64,
    /// When the partner was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Partner and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Capital receipts from this partner
    #[sea_orm(has_many = "super::receipt_voucher::Entity")]
    ReceiptVouchers,
    /// Capital withdrawals by this partner
    #[sea_orm(has_many = "super::payment_voucher::Entity")]
    PaymentVouchers,
    /// Profit distributions to this partner
    #[sea_orm(has_many = "super::shareen::Entity")]
    Distributions,
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

impl Related<super::shareen::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Distributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
