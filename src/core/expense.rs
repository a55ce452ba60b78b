//! Expense bookings.

use crate::{
    core::{
        catalog::require_expense_type,
        codes,
        employee::require_employee,
        pagination::{self, Page, PageParams},
        supplier::require_supplier,
        validate,
    },
    entities::{Expense, expense},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

const ENTITY: &str = "expense";

/// Fields accepted when creating or updating an expense.
///
/// An expense is paid to at most one counterparty: a supplier or an employee.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseInput {
    /// Explicit code; generated when absent on create, kept when absent on update
    pub code: Option<String>,
    /// Supplier paid, exclusive with `employee_id`
    pub supplier_id: Option<i64>,
    /// Employee paid, exclusive with `supplier_id`
    pub employee_id: Option<i64>,
    /// Expense category
    pub expense_type_id: Option<i64>,
    /// Amount spent
    pub amount: f64,
    /// Booking date
    pub date: NaiveDate,
    /// Free-form description
    pub description: Option<String>,
}

/// Filters for [`list_expenses`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseFilter {
    /// Dated on or after
    pub date_from: Option<NaiveDate>,
    /// Dated on or before
    pub date_to: Option<NaiveDate>,
    /// Only this category
    pub expense_type_id: Option<i64>,
    /// Only this supplier
    pub supplier_id: Option<i64>,
    /// Only this employee
    pub employee_id: Option<i64>,
}

/// Finds an expense by primary key, failing with [`Error::NotFound`] when absent.
pub async fn require_expense<C>(db: &C, expense_id: i64) -> Result<expense::Model>
where
    C: ConnectionTrait,
{
    Expense::find_by_id(expense_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, expense_id))
}

/// Lists expenses, most recent date first.
pub async fn list_expenses(
    db: &DatabaseConnection,
    filter: &ExpenseFilter,
    params: &PageParams,
) -> Result<Page<expense::Model>> {
    validate::date_order(filter.date_from, filter.date_to, "Expense date range")?;

    let mut query = Expense::find()
        .order_by_desc(expense::Column::Date)
        .order_by_desc(expense::Column::Id);
    if let Some(from) = filter.date_from {
        query = query.filter(expense::Column::Date.gte(from));
    }
    if let Some(to) = filter.date_to {
        query = query.filter(expense::Column::Date.lte(to));
    }
    if let Some(type_id) = filter.expense_type_id {
        query = query.filter(expense::Column::ExpenseTypeId.eq(type_id));
    }
    if let Some(supplier_id) = filter.supplier_id {
        query = query.filter(expense::Column::SupplierId.eq(supplier_id));
    }
    if let Some(employee_id) = filter.employee_id {
        query = query.filter(expense::Column::EmployeeId.eq(employee_id));
    }
    pagination::fetch_page(db, query, params).await
}

async fn ensure_references(db: &DatabaseConnection, input: &ExpenseInput) -> Result<()> {
    if input.supplier_id.is_some() && input.employee_id.is_some() {
        return Err(Error::validation(
            "An expense is paid to a supplier or an employee, not both",
        ));
    }
    if let Some(supplier_id) = input.supplier_id {
        require_supplier(db, supplier_id).await?;
    }
    if let Some(employee_id) = input.employee_id {
        require_employee(db, employee_id).await?;
    }
    if let Some(type_id) = input.expense_type_id {
        require_expense_type(db, type_id).await?;
    }
    Ok(())
}

/// Books an expense.
#[instrument(skip(db, input), fields(amount = input.amount))]
pub async fn create_expense(db: &DatabaseConnection, input: ExpenseInput) -> Result<expense::Model> {
    let amount = validate::round2(validate::positive_amount(input.amount)?);
    ensure_references(db, &input).await?;
    let code = codes::resolve_new_code::<Expense, _>(
        db,
        expense::Column::Code,
        codes::EXPENSE,
        input.code.as_deref(),
        ENTITY,
    )
    .await?;

    let model = expense::ActiveModel {
        code: Set(code),
        supplier_id: Set(input.supplier_id),
        employee_id: Set(input.employee_id),
        expense_type_id: Set(input.expense_type_id),
        amount: Set(amount),
        date: Set(input.date),
        description: Set(validate::optional_text(input.description)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(expense_id = model.id, code = %model.code, "expense booked");
    Ok(model)
}

/// Replaces an expense's fields.
#[instrument(skip(db, input))]
pub async fn update_expense(
    db: &DatabaseConnection,
    expense_id: i64,
    input: ExpenseInput,
) -> Result<expense::Model> {
    let amount = validate::round2(validate::positive_amount(input.amount)?);
    let existing = require_expense(db, expense_id).await?;
    ensure_references(db, &input).await?;

    let code = match validate::optional_text(input.code) {
        Some(code) if code != existing.code => {
            if codes::code_taken::<Expense, _>(
                db,
                expense::Column::Code,
                &code,
                Some((expense::Column::Id, expense_id)),
            )
            .await?
            {
                return Err(Error::DuplicateCode { entity: ENTITY, code });
            }
            code
        }
        _ => existing.code.clone(),
    };

    let mut model: expense::ActiveModel = existing.into();
    model.code = Set(code);
    model.supplier_id = Set(input.supplier_id);
    model.employee_id = Set(input.employee_id);
    model.expense_type_id = Set(input.expense_type_id);
    model.amount = Set(amount);
    model.date = Set(input.date);
    model.description = Set(validate::optional_text(input.description));

    model.update(db).await.map_err(Into::into)
}

/// Deletes an expense.
#[instrument(skip(db))]
pub async fn delete_expense(db: &DatabaseConnection, expense_id: i64) -> Result<()> {
    require_expense(db, expense_id).await?.delete(db).await?;
    info!(expense_id, "expense deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_supplier_or_employee_not_both() -> Result<()> {
        let db = setup_test_db().await?;
        let supplier = create_test_supplier(&db, "Print Shop").await?;
        let employee = create_test_employee(&db, "Omar").await?;

        let result = create_expense(
            &db,
            ExpenseInput {
                code: None,
                supplier_id: Some(supplier.id),
                employee_id: Some(employee.id),
                expense_type_id: None,
                amount: 50.0,
                date: date(2024, 8, 1),
                description: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_explicit_code_must_be_unique() -> Result<()> {
        let db = setup_test_db().await?;
        let input = ExpenseInput {
            code: Some("EXP-0100".to_string()),
            supplier_id: None,
            employee_id: None,
            expense_type_id: None,
            amount: 50.0,
            date: date(2024, 8, 1),
            description: None,
        };
        create_expense(&db, input.clone()).await?;
        let result = create_expense(&db, input.clone()).await;
        assert!(matches!(result, Err(Error::DuplicateCode { .. })));

        // Generated codes continue after the highest existing number
        let generated = create_expense(
            &db,
            ExpenseInput {
                code: None,
                ..input
            },
        )
        .await?;
        assert_eq!(generated.code, "EXP-0101");
        Ok(())
    }

    #[tokio::test]
    async fn test_list_filters_by_supplier() -> Result<()> {
        let db = setup_test_db().await?;
        let supplier = create_test_supplier(&db, "Print Shop").await?;
        create_test_expense(&db, Some(supplier.id), 75.0, date(2024, 8, 2)).await?;
        create_test_expense(&db, None, 20.0, date(2024, 8, 3)).await?;

        let page = list_expenses(
            &db,
            &ExpenseFilter {
                supplier_id: Some(supplier.id),
                ..Default::default()
            },
            &PageParams::default(),
        )
        .await?;
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].amount, 75.0);

        let expense = page.data[0].clone();
        delete_expense(&db, expense.id).await?;
        assert!(require_expense(&db, expense.id).await.is_err());
        Ok(())
    }
}
