//! Lookup lists - revenue types, expense types, and project types.
//!
//! All three are plain named rows with a unique name and an optional description.

use crate::{
    core::{codes, guard::DeleteGuard, validate},
    entities::{
        Expense, ExpenseType, ProjectType, Quotation, Revenue, RevenueType, expense, expense_type,
        project_type, quotation, revenue, revenue_type,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Fields accepted for any lookup row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogInput {
    /// Unique display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
}

impl CatalogInput {
    /// Convenience constructor used by seeding and tests.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

async fn ensure_unique_name<E>(
    db: &DatabaseConnection,
    name_column: E::Column,
    id_column: E::Column,
    name: &str,
    exclude_id: Option<i64>,
    entity: &'static str,
) -> Result<()>
where
    E: EntityTrait,
{
    let exclude = exclude_id.map(|id| (id_column, id));
    if codes::code_taken::<E, _>(db, name_column, name, exclude).await? {
        return Err(Error::DuplicateCode {
            entity,
            code: name.to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Revenue types
// ---------------------------------------------------------------------------

const REVENUE_TYPE: &str = "revenue type";

/// Lists revenue types alphabetically.
pub async fn list_revenue_types(db: &DatabaseConnection) -> Result<Vec<revenue_type::Model>> {
    RevenueType::find()
        .order_by_asc(revenue_type::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a revenue type by name.
pub async fn get_revenue_type_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<revenue_type::Model>> {
    RevenueType::find()
        .filter(revenue_type::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a revenue type by primary key, failing with [`Error::NotFound`] when absent.
pub async fn require_revenue_type<C>(db: &C, id: i64) -> Result<revenue_type::Model>
where
    C: ConnectionTrait,
{
    RevenueType::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(REVENUE_TYPE, id))
}

/// Creates a revenue type with a unique name.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_revenue_type(
    db: &DatabaseConnection,
    input: CatalogInput,
) -> Result<revenue_type::Model> {
    let name = validate::required_text(&input.name, "Revenue type name")?;
    ensure_unique_name::<RevenueType>(
        db,
        revenue_type::Column::Name,
        revenue_type::Column::Id,
        &name,
        None,
        REVENUE_TYPE,
    )
    .await?;

    let model = revenue_type::ActiveModel {
        name: Set(name),
        description: Set(validate::optional_text(input.description)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(revenue_type_id = model.id, "revenue type created");
    Ok(model)
}

/// Renames or re-describes a revenue type.
#[instrument(skip(db, input))]
pub async fn update_revenue_type(
    db: &DatabaseConnection,
    id: i64,
    input: CatalogInput,
) -> Result<revenue_type::Model> {
    let name = validate::required_text(&input.name, "Revenue type name")?;
    let existing = require_revenue_type(db, id).await?;
    ensure_unique_name::<RevenueType>(
        db,
        revenue_type::Column::Name,
        revenue_type::Column::Id,
        &name,
        Some(id),
        REVENUE_TYPE,
    )
    .await?;

    let mut model: revenue_type::ActiveModel = existing.into();
    model.name = Set(name);
    model.description = Set(validate::optional_text(input.description));
    model.update(db).await.map_err(Into::into)
}

/// Deletes a revenue type no revenue uses.
#[instrument(skip(db))]
pub async fn delete_revenue_type(db: &DatabaseConnection, id: i64) -> Result<()> {
    let existing = require_revenue_type(db, id).await?;
    DeleteGuard::new(REVENUE_TYPE, id)
        .check::<Revenue, _>(db, revenue::Column::RevenueTypeId.eq(id), "revenue(s)")
        .await?
        .finish()?;
    existing.delete(db).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Expense types
// ---------------------------------------------------------------------------

const EXPENSE_TYPE: &str = "expense type";

/// Lists expense types alphabetically.
pub async fn list_expense_types(db: &DatabaseConnection) -> Result<Vec<expense_type::Model>> {
    ExpenseType::find()
        .order_by_asc(expense_type::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an expense type by name.
pub async fn get_expense_type_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<expense_type::Model>> {
    ExpenseType::find()
        .filter(expense_type::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an expense type by primary key, failing with [`Error::NotFound`] when absent.
pub async fn require_expense_type<C>(db: &C, id: i64) -> Result<expense_type::Model>
where
    C: ConnectionTrait,
{
    ExpenseType::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(EXPENSE_TYPE, id))
}

/// Creates an expense type with a unique name.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_expense_type(
    db: &DatabaseConnection,
    input: CatalogInput,
) -> Result<expense_type::Model> {
    let name = validate::required_text(&input.name, "Expense type name")?;
    ensure_unique_name::<ExpenseType>(
        db,
        expense_type::Column::Name,
        expense_type::Column::Id,
        &name,
        None,
        EXPENSE_TYPE,
    )
    .await?;

    let model = expense_type::ActiveModel {
        name: Set(name),
        description: Set(validate::optional_text(input.description)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(expense_type_id = model.id, "expense type created");
    Ok(model)
}

/// Renames or re-describes an expense type.
#[instrument(skip(db, input))]
pub async fn update_expense_type(
    db: &DatabaseConnection,
    id: i64,
    input: CatalogInput,
) -> Result<expense_type::Model> {
    let name = validate::required_text(&input.name, "Expense type name")?;
    let existing = require_expense_type(db, id).await?;
    ensure_unique_name::<ExpenseType>(
        db,
        expense_type::Column::Name,
        expense_type::Column::Id,
        &name,
        Some(id),
        EXPENSE_TYPE,
    )
    .await?;

    let mut model: expense_type::ActiveModel = existing.into();
    model.name = Set(name);
    model.description = Set(validate::optional_text(input.description));
    model.update(db).await.map_err(Into::into)
}

/// Deletes an expense type no expense uses.
#[instrument(skip(db))]
pub async fn delete_expense_type(db: &DatabaseConnection, id: i64) -> Result<()> {
    let existing = require_expense_type(db, id).await?;
    DeleteGuard::new(EXPENSE_TYPE, id)
        .check::<Expense, _>(db, expense::Column::ExpenseTypeId.eq(id), "expense(s)")
        .await?
        .finish()?;
    existing.delete(db).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Project types
// ---------------------------------------------------------------------------

const PROJECT_TYPE: &str = "project type";

/// Lists project types alphabetically.
pub async fn list_project_types(db: &DatabaseConnection) -> Result<Vec<project_type::Model>> {
    ProjectType::find()
        .order_by_asc(project_type::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a project type by name.
pub async fn get_project_type_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<project_type::Model>> {
    ProjectType::find()
        .filter(project_type::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a project type by primary key, failing with [`Error::NotFound`] when absent.
pub async fn require_project_type<C>(db: &C, id: i64) -> Result<project_type::Model>
where
    C: ConnectionTrait,
{
    ProjectType::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(PROJECT_TYPE, id))
}

/// Creates a project type with a unique name.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_project_type(
    db: &DatabaseConnection,
    input: CatalogInput,
) -> Result<project_type::Model> {
    let name = validate::required_text(&input.name, "Project type name")?;
    ensure_unique_name::<ProjectType>(
        db,
        project_type::Column::Name,
        project_type::Column::Id,
        &name,
        None,
        PROJECT_TYPE,
    )
    .await?;

    let model = project_type::ActiveModel {
        name: Set(name),
        description: Set(validate::optional_text(input.description)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(project_type_id = model.id, "project type created");
    Ok(model)
}

/// Renames or re-describes a project type.
#[instrument(skip(db, input))]
pub async fn update_project_type(
    db: &DatabaseConnection,
    id: i64,
    input: CatalogInput,
) -> Result<project_type::Model> {
    let name = validate::required_text(&input.name, "Project type name")?;
    let existing = require_project_type(db, id).await?;
    ensure_unique_name::<ProjectType>(
        db,
        project_type::Column::Name,
        project_type::Column::Id,
        &name,
        Some(id),
        PROJECT_TYPE,
    )
    .await?;

    let mut model: project_type::ActiveModel = existing.into();
    model.name = Set(name);
    model.description = Set(validate::optional_text(input.description));
    model.update(db).await.map_err(Into::into)
}

/// Deletes a project type no quotation uses.
#[instrument(skip(db))]
pub async fn delete_project_type(db: &DatabaseConnection, id: i64) -> Result<()> {
    let existing = require_project_type(db, id).await?;
    DeleteGuard::new(PROJECT_TYPE, id)
        .check::<Quotation, _>(db, quotation::Column::ProjectTypeId.eq(id), "quotation(s)")
        .await?
        .finish()?;
    existing.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_revenue_type_names_are_unique() -> Result<()> {
        let db = setup_test_db().await?;
        create_revenue_type(&db, CatalogInput::named("Weddings")).await?;

        let result = create_revenue_type(&db, CatalogInput::named("  Weddings ")).await;
        assert!(matches!(result, Err(Error::DuplicateCode { .. })));

        let other = create_revenue_type(&db, CatalogInput::named("Conferences")).await?;
        let result = update_revenue_type(&db, other.id, CatalogInput::named("Weddings")).await;
        assert!(matches!(result, Err(Error::DuplicateCode { .. })));

        // Renaming to its own name is allowed
        update_revenue_type(&db, other.id, CatalogInput::named("Conferences")).await?;

        let names: Vec<String> = list_revenue_types(&db)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Conferences", "Weddings"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_expense_type_in_use_cannot_be_deleted() -> Result<()> {
        let db = setup_test_db().await?;
        let rent = create_expense_type(&db, CatalogInput::named("Rent")).await?;
        let unused = create_expense_type(&db, CatalogInput::named("Misc")).await?;
        create_typed_expense(&db, rent.id, 900.0).await?;

        let result = delete_expense_type(&db, rent.id).await;
        assert!(matches!(result, Err(Error::HasDependents { .. })));

        delete_expense_type(&db, unused.id).await?;
        assert!(get_expense_type_by_name(&db, "Misc").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_project_type_crud() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_project_type(
            &db,
            CatalogInput {
                name: "Exhibition".to_string(),
                description: Some("Booth design and build".to_string()),
            },
        )
        .await?;
        let updated =
            update_project_type(&db, created.id, CatalogInput::named("Trade Exhibition")).await?;
        assert_eq!(updated.name, "Trade Exhibition");
        assert_eq!(updated.description, None);

        delete_project_type(&db, created.id).await?;
        assert!(list_project_types(&db).await?.is_empty());
        Ok(())
    }
}
