//! Revenue entity - Income booked by the business.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Revenue database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revenues")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable code, e.g. `REV-0001`
    #[sea_orm(unique)]
    pub code: String,
    /// Paying customer, if known
    pub customer_id: Option<i64>,
    /// Classification
    pub revenue_type_id: Option<i64>,
    /// Work order the income belongs to
    pub work_order_id: Option<i64>,
    /// Amount received (always positive)
    pub amount: f64,
    /// Booking date
    pub date: Date,
    /// Free-form description
    pub description: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Revenue and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Paying customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// Classification
    #[sea_orm(
        belongs_to = "super::revenue_type::Entity",
        from = "Column::RevenueTypeId",
        to = "super::revenue_type::Column::Id"
    )]
    RevenueType,
    /// Related work order
    #[sea_orm(
        belongs_to = "super::work_order::Entity",
        from = "Column::WorkOrderId",
        to = "super::work_order::Column::Id"
    )]
    WorkOrder,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::revenue_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RevenueType.def()
    }
}

impl Related<super::work_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
