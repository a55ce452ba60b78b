//! Customer entity - People or companies the business sells events and services to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable code, e.g. `CUS-0001`
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
    /// VAT registration number
    pub tax_number: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the customer was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Customer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One customer has many quotations
    #[sea_orm(has_many = "super::quotation::Entity")]
    Quotations,
    /// One customer has many work orders
    #[sea_orm(has_many = "super::work_order::Entity")]
    WorkOrders,
    /// One customer has many revenues
    #[sea_orm(has_many = "super::revenue::Entity")]
    Revenues,
    /// One customer has many reviews
    #[sea_orm(has_many = "super::customer_review::Entity")]
    Reviews,
}

impl Related<super::quotation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotations.def()
    }
}

impl Related<super::work_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrders.def()
    }
}

impl Related<super::revenue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Revenues.def()
    }
}

impl Related<super::customer_review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
