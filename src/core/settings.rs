//! Company settings - the single row describing the business itself.

use crate::{
    core::validate,
    entities::{CompanySettings, company_settings},
    errors::Result,
};
use sea_orm::{Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Primary key of the settings row.
pub const SETTINGS_ID: i32 = 1;
/// VAT rate used until the company configures its own.
pub const DEFAULT_VAT_RATE: f64 = 15.0;
/// Currency used until the company configures its own.
pub const DEFAULT_CURRENCY: &str = "SAR";

/// Fields accepted when saving the company settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsInput {
    /// Legal name
    pub company_name: String,
    /// VAT registration number
    pub tax_number: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// VAT in percent applied to new quotations
    #[serde(default = "default_vat_rate")]
    pub default_vat_rate: f64,
    /// ISO currency code, stored upper-case
    #[serde(default = "default_currency")]
    pub currency: String,
}

const fn default_vat_rate() -> f64 {
    DEFAULT_VAT_RATE
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn defaults() -> company_settings::Model {
    company_settings::Model {
        id: SETTINGS_ID,
        company_name: String::new(),
        tax_number: None,
        address: None,
        phone: None,
        email: None,
        default_vat_rate: DEFAULT_VAT_RATE,
        currency: DEFAULT_CURRENCY.to_string(),
        updated_at: chrono::Utc::now(),
    }
}

async fn stored_settings<C>(db: &C) -> Result<Option<company_settings::Model>>
where
    C: ConnectionTrait,
{
    CompanySettings::find_by_id(SETTINGS_ID)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the stored settings, or the defaults when none were saved yet.
pub async fn get_settings<C>(db: &C) -> Result<company_settings::Model>
where
    C: ConnectionTrait,
{
    Ok(stored_settings(db).await?.unwrap_or_else(defaults))
}

/// VAT rate new quotations start with.
pub async fn current_vat_rate<C>(db: &C) -> Result<f64>
where
    C: ConnectionTrait,
{
    Ok(get_settings(db).await?.default_vat_rate)
}

/// Whether settings have ever been saved.
pub async fn settings_exist(db: &DatabaseConnection) -> Result<bool> {
    Ok(stored_settings(db).await?.is_some())
}

/// Creates or replaces the settings row.
#[instrument(skip(db, input), fields(company = %input.company_name))]
pub async fn upsert_settings(
    db: &DatabaseConnection,
    input: SettingsInput,
) -> Result<company_settings::Model> {
    let company_name = validate::required_text(&input.company_name, "Company name")?;
    let vat_rate = validate::percentage(input.default_vat_rate, "Default VAT rate")?;
    let currency = validate::required_text(&input.currency, "Currency")?.to_uppercase();
    let email = validate::optional_email(input.email)?;

    let existing = stored_settings(db).await?;
    let is_new = existing.is_none();
    let mut model = match existing {
        Some(row) => company_settings::ActiveModel::from(row),
        None => company_settings::ActiveModel {
            id: Set(SETTINGS_ID),
            ..Default::default()
        },
    };
    model.company_name = Set(company_name);
    model.tax_number = Set(validate::optional_text(input.tax_number));
    model.address = Set(validate::optional_text(input.address));
    model.phone = Set(validate::optional_text(input.phone));
    model.email = Set(email);
    model.default_vat_rate = Set(vat_rate);
    model.currency = Set(currency);
    model.updated_at = Set(chrono::Utc::now());

    let saved = if is_new {
        model.insert(db).await?
    } else {
        model.update(db).await?
    };
    info!(is_new, "company settings saved");
    Ok(saved)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{errors::Error, test_utils::*};

    fn input(name: &str, vat: f64) -> SettingsInput {
        SettingsInput {
            company_name: name.to_string(),
            tax_number: None,
            address: None,
            phone: None,
            email: None,
            default_vat_rate: vat,
            currency: "sar".to_string(),
        }
    }

    #[tokio::test]
    async fn test_defaults_before_first_save() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = get_settings(&db).await?;
        assert_eq!(settings.default_vat_rate, 15.0);
        assert_eq!(settings.currency, "SAR");
        assert!(!settings_exist(&db).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() -> Result<()> {
        let db = setup_test_db().await?;
        let first = upsert_settings(&db, input("Share In", 15.0)).await?;
        assert_eq!(first.id, SETTINGS_ID);
        assert_eq!(first.currency, "SAR");

        let second = upsert_settings(&db, input("Share In Events", 5.0)).await?;
        assert_eq!(second.id, SETTINGS_ID);
        assert_eq!(current_vat_rate(&db).await?, 5.0);
        assert_eq!(get_settings(&db).await?.company_name, "Share In Events");
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_validation() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(matches!(
            upsert_settings(&db, input(" ", 15.0)).await,
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            upsert_settings(&db, input("Share In", 120.0)).await,
            Err(Error::Validation { .. })
        ));
        Ok(())
    }
}
