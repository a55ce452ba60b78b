//! Seed data loading from config.toml
//!
//! The seed file describes the company and the lookup lists (revenue types,
//! expense types, project types) a fresh installation starts with. Seeding is
//! idempotent: rows that already exist by name are left alone, and saved company
//! settings are never overwritten.

use crate::{
    core::{
        catalog::{self, CatalogInput},
        settings::{self, SettingsInput},
    },
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Structure of the seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    /// Company settings applied when none are saved yet
    pub company: Option<SettingsInput>,
    /// Revenue types to create
    #[serde(default)]
    pub revenue_types: Vec<CatalogInput>,
    /// Expense types to create
    #[serde(default)]
    pub expense_types: Vec<CatalogInput>,
    /// Project types to create
    #[serde(default)]
    pub project_types: Vec<CatalogInput>,
}

/// Number of rows created by [`seed_database`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Whether company settings were written
    pub company: bool,
    /// Revenue types created
    pub revenue_types: usize,
    /// Expense types created
    pub expense_types: usize,
    /// Project types created
    pub project_types: usize,
}

/// Loads seed data from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_seed_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read seed file: {e}"),
    })?;

    parse_seed_config(&contents)
}

/// Loads seed data, returning an empty seed when the file does not exist.
pub fn load_seed_config_or_default<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let path = path.as_ref();
    if !path.exists() {
        warn!(path = %path.display(), "seed file not found, skipping seed data");
        return Ok(SeedConfig::default());
    }
    load_seed_config(path)
}

/// Parses seed data from TOML text.
pub fn parse_seed_config(contents: &str) -> Result<SeedConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file: {e}"),
    })
}

/// Inserts whatever part of the seed is missing from the database.
#[instrument(skip_all)]
pub async fn seed_database(db: &DatabaseConnection, seed: &SeedConfig) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    if let Some(company) = &seed.company {
        if settings::settings_exist(db).await? {
            debug!("company settings already saved, leaving them untouched");
        } else {
            settings::upsert_settings(db, company.clone()).await?;
            report.company = true;
        }
    }

    for entry in &seed.revenue_types {
        if catalog::get_revenue_type_by_name(db, &entry.name).await?.is_none() {
            catalog::create_revenue_type(db, entry.clone()).await?;
            report.revenue_types += 1;
        }
    }
    for entry in &seed.expense_types {
        if catalog::get_expense_type_by_name(db, &entry.name).await?.is_none() {
            catalog::create_expense_type(db, entry.clone()).await?;
            report.expense_types += 1;
        }
    }
    for entry in &seed.project_types {
        if catalog::get_project_type_by_name(db, &entry.name).await?.is_none() {
            catalog::create_project_type(db, entry.clone()).await?;
            report.project_types += 1;
        }
    }

    info!(
        company = report.company,
        revenue_types = report.revenue_types,
        expense_types = report.expense_types,
        project_types = report.project_types,
        "seed data applied"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::setup_test_db;

    const SEED: &str = r#"
        [company]
        company_name = "Share In Events"
        tax_number = "300000000000003"

        [[revenue_types]]
        name = "Exhibition"

        [[revenue_types]]
        name = "Consulting"
        description = "Hourly advisory work"

        [[expense_types]]
        name = "Rent"

        [[project_types]]
        name = "Booth"
    "#;

    #[test]
    fn test_parse_seed_config() {
        let seed = parse_seed_config(SEED).unwrap();
        let company = seed.company.unwrap();
        assert_eq!(company.company_name, "Share In Events");
        assert_eq!(company.default_vat_rate, 15.0);
        assert_eq!(company.currency, "SAR");
        assert_eq!(seed.revenue_types.len(), 2);
        assert_eq!(
            seed.revenue_types[1].description.as_deref(),
            Some("Hourly advisory work")
        );
        assert_eq!(seed.expense_types[0].name, "Rent");
        assert_eq!(seed.project_types[0].name, "Booth");
    }

    #[test]
    fn test_empty_and_invalid_seed() {
        let seed = parse_seed_config("").unwrap();
        assert!(seed.company.is_none());
        assert!(seed.revenue_types.is_empty());

        let result = parse_seed_config("[[revenue_types]]\ndescription = 3");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file() {
        let path = "definitely/not/here/seed.toml";
        assert!(matches!(load_seed_config(path), Err(Error::Config { .. })));
        let seed = load_seed_config_or_default(path).unwrap();
        assert!(seed.company.is_none());
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let seed = parse_seed_config(SEED)?;

        let first = seed_database(&db, &seed).await?;
        assert_eq!(
            first,
            SeedReport {
                company: true,
                revenue_types: 2,
                expense_types: 1,
                project_types: 1,
            }
        );

        let second = seed_database(&db, &seed).await?;
        assert_eq!(second, SeedReport::default());
        assert_eq!(catalog::list_revenue_types(&db).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_keeps_saved_settings() -> Result<()> {
        let db = setup_test_db().await?;
        let mut own = parse_seed_config(SEED)?.company.unwrap();
        own.company_name = "Renamed Co".to_string();
        settings::upsert_settings(&db, own).await?;

        let report = seed_database(&db, &parse_seed_config(SEED)?).await?;
        assert!(!report.company);
        assert_eq!(settings::get_settings(&db).await?.company_name, "Renamed Co");
        Ok(())
    }
}
