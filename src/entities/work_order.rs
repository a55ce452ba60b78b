//! Work order entity - Operational record of a job, usually opened from an accepted quotation.

use super::sea_orm_active_enums::WorkOrderStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Work order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_orders")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable code, e.g. `WO-0001`
    #[sea_orm(unique)]
    pub code: String,
    /// Customer the work is done for
    pub customer_id: i64,
    /// Quotation this order was opened from, if any
    pub quotation_id: Option<i64>,
    /// Short title
    pub title: String,
    /// Planned start
    pub start_date: Option<Date>,
    /// Planned end
    pub end_date: Option<Date>,
    /// Workflow status
    pub status: WorkOrderStatus,
    /// Contract amount
    pub amount: f64,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the work order was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `WorkOrder` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each work order belongs to one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// Each work order may come from a quotation
    #[sea_orm(
        belongs_to = "super::quotation::Entity",
        from = "Column::QuotationId",
        to = "super::quotation::Column::Id"
    )]
    Quotation,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::quotation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
