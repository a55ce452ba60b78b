//! Supplier entity - Vendors the business buys goods and services from.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Supplier database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suppliers")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable code, e.g. `SUP-0001`
    #[sea_orm(unique)]
    pub code: String,
    /// Display name
    pub name: String,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// What the supplier provides (catering, lighting, ...)
    pub service_type: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the supplier was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Supplier and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One supplier has many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
    /// One supplier has many payment vouchers
    #[sea_orm(has_many = "super::payment_voucher::Entity")]
    PaymentVouchers,
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::payment_voucher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentVouchers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
