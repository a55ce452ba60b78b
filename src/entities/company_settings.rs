//! Company settings entity - Single row holding the business identity and defaults.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Company settings database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company_settings")]
pub struct Model {
    /// Always 1; the table holds a single row
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    /// Legal name printed on quotations and vouchers
    pub company_name: String,
    /// VAT registration number
    pub tax_number: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// VAT rate in percent applied to new quotations
    pub default_vat_rate: f64,
    /// Currency code shown on documents
    pub currency: String,
    /// When the settings were last modified
    pub updated_at: DateTimeUtc,
}

/// `CompanySettings` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
