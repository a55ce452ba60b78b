//! Employee entity - Staff on the payroll.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employee database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable code, e.g. `EMP-0001`
    #[sea_orm(unique)]
    pub code: String,
    /// Full name
    pub name: String,
    /// Job title
    pub position: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Monthly salary
    pub salary: f64,
    /// First working day
    pub hire_date: Option<Date>,
    /// Whether the employee still works for the company
    pub is_active: bool,
    /// When the employee was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Employee and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One employee has many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
    /// One employee has many payment vouchers
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
