//! Project type entity - Kind of event or service a quotation is for.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Project type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_types")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique display name
    #[sea_orm(unique)]
    pub name: String,
    /// Optional description
    pub description: Option<String>,
}

/// Defines relationships between `ProjectType` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One project type is used by many quotations
    #[sea_orm(has_many = "super::quotation::Entity")]
    Quotations,
}

impl Related<super::quotation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
