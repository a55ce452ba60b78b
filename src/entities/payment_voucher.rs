//! Payment voucher entity - Money paid out by the business.
//!
//! A payment with beneficiary `partner_withdrawal` lowers the referenced partner's capital.

use super::sea_orm_active_enums::{PaymentBeneficiary, PaymentMethod};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment voucher database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_vouchers")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable code, e.g. `PV-0001`
    #[sea_orm(unique)]
    pub code: String,
    /// Date the money was paid
    pub date: Date,
    /// Amount paid (always positive)
    pub amount: f64,
    /// Kind of recipient
    pub beneficiary: PaymentBeneficiary,
    /// Supplier paid when `beneficiary` is `supplier`
    pub supplier_id: Option<i64>,
    /// Employee paid when `beneficiary` is `employee`
    pub employee_id: Option<i64>,
    /// Withdrawing partner when `beneficiary` is `partner_withdrawal`
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

/// Defines relationships between `PaymentVoucher` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Supplier paid
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
    /// Employee paid
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
    /// Withdrawing partner
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

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
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
