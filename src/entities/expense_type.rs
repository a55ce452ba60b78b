//! Expense type entity - Lookup list used to classify expenses.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_types")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique display name (e.g. "Rent", "Salaries")
    #[sea_orm(unique)]
    pub name: String,
    /// Optional description
    pub description: Option<String>,
}

/// Defines relationships between `ExpenseType` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One type classifies many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
