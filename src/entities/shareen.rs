//! Shareen entity - A partner's recorded share of the net profit for a period.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profit distribution database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shareen")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Receiving partner
    pub partner_id: i64,
    /// First day of the period (inclusive)
    pub period_from: Date,
    /// Last day of the period (inclusive)
    pub period_to: Date,
    /// Net profit of the whole period
    pub net_profit: f64,
    /// Partner's share percentage at the time of recording
    pub share_percentage: f64,
    /// Amount attributed to the partner
    pub amount: f64,
    /// When the distribution was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Shareen and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each distribution belongs to one partner
    #[sea_orm(
        belongs_to = "super::partner::Entity",
        from = "Column::PartnerId",
        to = "super::partner::Column::Id"
    )]
    Partner,
}

impl Related<super::partner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Partner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
