//! Quotation entity - A priced proposal sent to a customer.
//!
//! The monetary totals are stored denormalized and recomputed from the items
//! every time the quotation is written.

use super::sea_orm_active_enums::QuotationStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Quotation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quotations")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable code, e.g. `QUO-0001`
    #[sea_orm(unique)]
    pub code: String,
    /// Customer the quotation is addressed to
    pub customer_id: i64,
    /// Kind of project being quoted
    pub project_type_id: Option<i64>,
    /// Date the quotation was issued
    pub issue_date: Date,
    /// Last day the offer is valid
    pub valid_until: Option<Date>,
    /// Workflow status
    pub status: QuotationStatus,
    /// Absolute discount applied before VAT
    pub discount: f64,
    /// VAT rate in percent
    pub vat_rate: f64,
    /// Sum of item totals
    pub subtotal: f64,
    /// VAT charged on the discounted subtotal
    pub vat_amount: f64,
    /// Amount payable
    pub total: f64,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the quotation was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Quotation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each quotation belongs to one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// Each quotation may reference a project type
    #[sea_orm(
        belongs_to = "super::project_type::Entity",
        from = "Column::ProjectTypeId",
        to = "super::project_type::Column::Id"
    )]
    ProjectType,
    /// One quotation has many line items
    #[sea_orm(has_many = "super::quotation_item::Entity")]
    Items,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::project_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectType.def()
    }
}

impl Related<super::quotation_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
