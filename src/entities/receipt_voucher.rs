//! Receipt voucher entity - Money received by the business.
//!
//! A receipt with source `partner_capital` raises the referenced partner's capital.

use super::sea_orm_active_enums::{PaymentMethod, ReceiptSource};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Receipt voucher database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receipt_vouchers")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable code, e.g. `RV-0001`
    #[sea_orm(unique)]
    pub code: String,
    /// Date the money was received
    pub date: Date,
    /// Amount received (always positive)
    pub amount: f64,
    /// Origin of the money
    pub source: ReceiptSource,
    /// Paying customer when `source` is `customer`
    pub customer_id: Option<i64>,
    /// Contributing partner when `source` is `partner_capital`
    pub partner_id: Option<i64>,
    /// Settlement method
    pub payment_method: PaymentMethod,
    /// Check row when `payment_method` is `check`
    pub check_id: Option<i64>,
    /// Free-form description
    pub description: Option<String>,
    /// When the voucher was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `ReceiptVoucher` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Paying customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// Contributing partner
    #[sea_orm(
        belongs_to = "super::partner::Entity",
        from = "Column::PartnerId",
        to = "super::partner::Column::Id"
    )]
    Partner,
    /// Attached check
    #[sea_orm(
        belongs_to = "super::check_detail::Entity",
        from = "Column::CheckId",
        to = "super::check_detail::Column::Id"
    )]
    CheckDetail,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::partner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Partner.def()
    }
}

impl Related<super::check_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CheckDetail.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
