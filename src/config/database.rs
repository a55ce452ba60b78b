//! Database configuration module for Share In.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL. Creation is
//! idempotent (`IF NOT EXISTS`) and runs on every start-up.

use crate::entities::{
    CheckDetail, CompanySettings, Customer, CustomerReview, Employee, Expense, ExpenseType,
    Partner, PaymentVoucher, ProjectType, Quotation, QuotationItem, ReceiptVoucher, Revenue,
    RevenueType, Shareen, Supplier, WorkOrder,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info};

/// Default database used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/share_in.sqlite?mode=rwc";

/// Establishes a connection to the database at `database_url`.
///
/// For file-backed `SQLite` URLs the parent directory is created first so a fresh
/// checkout can start without manual setup.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(dir)?;
    }

    info!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Returns the directory holding a file-backed `SQLite` database, if any.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    debug!(table = entity.table_name(), "ensured table exists");
    Ok(())
}

/// Creates all tables, referenced tables first.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, CompanySettings).await?;
    create_table(db, &schema, Customer).await?;
    create_table(db, &schema, Supplier).await?;
    create_table(db, &schema, Employee).await?;
    create_table(db, &schema, Partner).await?;
    create_table(db, &schema, RevenueType).await?;
    create_table(db, &schema, ExpenseType).await?;
    create_table(db, &schema, ProjectType).await?;
    create_table(db, &schema, Quotation).await?;
    create_table(db, &schema, QuotationItem).await?;
    create_table(db, &schema, WorkOrder).await?;
    create_table(db, &schema, Revenue).await?;
    create_table(db, &schema, Expense).await?;
    create_table(db, &schema, CheckDetail).await?;
    create_table(db, &schema, ReceiptVoucher).await?;
    create_table(db, &schema, PaymentVoucher).await?;
    create_table(db, &schema, CustomerReview).await?;
    create_table(db, &schema, Shareen).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _ = Customer::find().limit(1).all(&db).await?;
        let _ = Partner::find().limit(1).all(&db).await?;
        let _ = ReceiptVoucher::find().limit(1).all(&db).await?;
        let _ = PaymentVoucher::find().limit(1).all(&db).await?;
        let _ = Shareen::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(
            sqlite_parent_dir("sqlite://data/share_in.sqlite?mode=rwc"),
            Some(Path::new("data"))
        );
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_parent_dir("sqlite://local.sqlite"), None);
        assert_eq!(sqlite_parent_dir("postgres://user@localhost/share_in"), None);
    }
}
