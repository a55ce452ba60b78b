//! Supplier business logic.

use crate::{
    core::{
        codes,
        guard::DeleteGuard,
        pagination::{self, Page, PageParams},
        validate,
    },
    entities::{Expense, PaymentVoucher, Supplier, expense, payment_voucher, supplier},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

const ENTITY: &str = "supplier";

/// Fields accepted when creating or updating a supplier.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierInput {
    /// Explicit code; generated when absent on create, kept when absent on update
    pub code: Option<String>,
    /// Display name
    pub name: String,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// What the supplier provides
    pub service_type: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Lists suppliers ordered by code, optionally filtered by a name/code substring.
pub async fn list_suppliers(
    db: &DatabaseConnection,
    search: Option<&str>,
    params: &PageParams,
) -> Result<Page<supplier::Model>> {
    let mut query = Supplier::find().order_by_asc(supplier::Column::Code);
    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(supplier::Column::Name.contains(term))
                .add(supplier::Column::Code.contains(term)),
        );
    }
    pagination::fetch_page(db, query, params).await
}

/// Finds a supplier by primary key, failing with [`Error::NotFound`] when absent.
pub async fn require_supplier<C>(db: &C, supplier_id: i64) -> Result<supplier::Model>
where
    C: ConnectionTrait,
{
    Supplier::find_by_id(supplier_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, supplier_id))
}

/// Creates a supplier, generating a `SUP-NNNN` code unless one is supplied.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_supplier(
    db: &DatabaseConnection,
    input: SupplierInput,
) -> Result<supplier::Model> {
    let name = validate::required_text(&input.name, "Supplier name")?;
    let email = validate::optional_email(input.email)?;
    let code = codes::resolve_new_code::<Supplier, _>(
        db,
        supplier::Column::Code,
        codes::SUPPLIER,
        input.code.as_deref(),
        ENTITY,
    )
    .await?;

    let model = supplier::ActiveModel {
        code: Set(code),
        name: Set(name),
        phone: Set(validate::optional_text(input.phone)),
        email: Set(email),
        address: Set(validate::optional_text(input.address)),
        service_type: Set(validate::optional_text(input.service_type)),
        notes: Set(validate::optional_text(input.notes)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(supplier_id = model.id, code = %model.code, "supplier created");
    Ok(model)
}

/// Replaces a supplier's fields. An absent code keeps the current one.
#[instrument(skip(db, input))]
pub async fn update_supplier(
    db: &DatabaseConnection,
    supplier_id: i64,
    input: SupplierInput,
) -> Result<supplier::Model> {
    let name = validate::required_text(&input.name, "Supplier name")?;
    let email = validate::optional_email(input.email)?;
    let existing = require_supplier(db, supplier_id).await?;

    let code = match validate::optional_text(input.code) {
        Some(code) if code != existing.code => {
            if codes::code_taken::<Supplier, _>(
                db,
                supplier::Column::Code,
                &code,
                Some((supplier::Column::Id, supplier_id)),
            )
            .await?
            {
                return Err(Error::DuplicateCode { entity: ENTITY, code });
            }
            code
        }
        _ => existing.code.clone(),
    };

    let mut model: supplier::ActiveModel = existing.into();
    model.code = Set(code);
    model.name = Set(name);
    model.phone = Set(validate::optional_text(input.phone));
    model.email = Set(email);
    model.address = Set(validate::optional_text(input.address));
    model.service_type = Set(validate::optional_text(input.service_type));
    model.notes = Set(validate::optional_text(input.notes));

    model.update(db).await.map_err(Into::into)
}

/// Deletes a supplier that has no expenses or payment vouchers.
#[instrument(skip(db))]
pub async fn delete_supplier(db: &DatabaseConnection, supplier_id: i64) -> Result<()> {
    let supplier = require_supplier(db, supplier_id).await?;

    DeleteGuard::new(ENTITY, supplier_id)
        .check::<Expense, _>(db, expense::Column::SupplierId.eq(supplier_id), "expense(s)")
        .await?
        .check::<PaymentVoucher, _>(
            db,
            payment_voucher::Column::SupplierId.eq(supplier_id),
            "payment voucher(s)",
        )
        .await?
        .finish()?;

    supplier.delete(db).await?;
    info!(supplier_id, "supplier deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_and_update_supplier() -> Result<()> {
        let db = setup_test_db().await?;

        let supplier = create_test_supplier(&db, "Bright Lights Co").await?;
        assert_eq!(supplier.code, "SUP-0001");

        let updated = update_supplier(
            &db,
            supplier.id,
            SupplierInput {
                name: "Bright Lights Company".to_string(),
                service_type: Some("lighting".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.name, "Bright Lights Company");
        assert_eq!(updated.service_type.as_deref(), Some("lighting"));
        assert_eq!(updated.code, "SUP-0001");
        Ok(())
    }

    #[tokio::test]
    async fn test_list_suppliers_search() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_supplier(&db, "Catering Plus").await?;
        create_test_supplier(&db, "Sound Masters").await?;

        let page = list_suppliers(&db, Some("SUP-0002"), &PageParams::default()).await?;
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].name, "Sound Masters");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_supplier_with_expense_is_refused() -> Result<()> {
        let db = setup_test_db().await?;
        let supplier = create_test_supplier(&db, "Tents R Us").await?;
        create_test_expense(&db, Some(supplier.id), 120.0, date(2024, 1, 5)).await?;

        let result = delete_supplier(&db, supplier.id).await;
        assert!(matches!(
            result,
            Err(Error::HasDependents {
                entity: "supplier",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_unreferenced_supplier() -> Result<()> {
        let db = setup_test_db().await?;
        let supplier = create_test_supplier(&db, "One-off").await?;
        delete_supplier(&db, supplier.id).await?;
        assert!(matches!(
            require_supplier(&db, supplier.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }
}
