//! Customer review entity - Feedback left by a customer, optionally about a work order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer review database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_reviews")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Reviewing customer
    pub customer_id: i64,
    /// Work order being reviewed
    pub work_order_id: Option<i64>,
    /// Rating from 1 to 5
    pub rating: i32,
    /// Free-form comment
    pub comment: Option<String>,
    /// When the review was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `CustomerReview` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each review belongs to one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// Reviewed work order
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

impl Related<super::work_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
