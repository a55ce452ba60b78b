//! Employee business logic.

use crate::{
    core::{
        codes,
        guard::DeleteGuard,
        pagination::{self, Page, PageParams},
        validate,
    },
    entities::{Employee, Expense, PaymentVoucher, employee, expense, payment_voucher},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

const ENTITY: &str = "employee";

fn default_active() -> bool {
    true
}

/// Fields accepted when creating or updating an employee.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeInput {
    /// Explicit code; generated when absent on create, kept when absent on update
    pub code: Option<String>,
    /// Full name
    pub name: String,
    /// Job title
    pub position: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Monthly salary
    #[serde(default)]
    pub salary: f64,
    /// First working day
    pub hire_date: Option<NaiveDate>,
    /// Whether the employee still works for the company
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Default for EmployeeInput {
    fn default() -> Self {
        Self {
            code: None,
            name: String::new(),
            position: None,
            phone: None,
            email: None,
            salary: 0.0,
            hire_date: None,
            is_active: true,
        }
    }
}

/// Filters for [`list_employees`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeFilter {
    /// Name/code substring
    pub search: Option<String>,
    /// Only active (`true`) or only former (`false`) employees
    pub active: Option<bool>,
}

/// Lists employees ordered by code.
pub async fn list_employees(
    db: &DatabaseConnection,
    filter: &EmployeeFilter,
    params: &PageParams,
) -> Result<Page<employee::Model>> {
    let mut query = Employee::find().order_by_asc(employee::Column::Code);
    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(employee::Column::Name.contains(term))
                .add(employee::Column::Code.contains(term)),
        );
    }
    if let Some(active) = filter.active {
        query = query.filter(employee::Column::IsActive.eq(active));
    }
    pagination::fetch_page(db, query, params).await
}

/// Finds an employee by primary key, failing with [`Error::NotFound`] when absent.
pub async fn require_employee<C>(db: &C, employee_id: i64) -> Result<employee::Model>
where
    C: ConnectionTrait,
{
    Employee::find_by_id(employee_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, employee_id))
}

/// Creates an employee, generating an `EMP-NNNN` code unless one is supplied.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_employee(
    db: &DatabaseConnection,
    input: EmployeeInput,
) -> Result<employee::Model> {
    let name = validate::required_text(&input.name, "Employee name")?;
    let email = validate::optional_email(input.email)?;
    let salary = validate::non_negative_amount(input.salary)?;
    let code = codes::resolve_new_code::<Employee, _>(
        db,
        employee::Column::Code,
        codes::EMPLOYEE,
        input.code.as_deref(),
        ENTITY,
    )
    .await?;

    let model = employee::ActiveModel {
        code: Set(code),
        name: Set(name),
        position: Set(validate::optional_text(input.position)),
        phone: Set(validate::optional_text(input.phone)),
        email: Set(email),
        salary: Set(salary),
        hire_date: Set(input.hire_date),
        is_active: Set(input.is_active),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(employee_id = model.id, code = %model.code, "employee created");
    Ok(model)
}

/// Replaces an employee's fields. An absent code keeps the current one.
#[instrument(skip(db, input))]
pub async fn update_employee(
    db: &DatabaseConnection,
    employee_id: i64,
    input: EmployeeInput,
) -> Result<employee::Model> {
    let name = validate::required_text(&input.name, "Employee name")?;
    let email = validate::optional_email(input.email)?;
    let salary = validate::non_negative_amount(input.salary)?;
    let existing = require_employee(db, employee_id).await?;

    let code = match validate::optional_text(input.code) {
        Some(code) if code != existing.code => {
            if codes::code_taken::<Employee, _>(
                db,
                employee::Column::Code,
                &code,
                Some((employee::Column::Id, employee_id)),
            )
            .await?
            {
                return Err(Error::DuplicateCode { entity: ENTITY, code });
            }
            code
        }
        _ => existing.code.clone(),
    };

    let mut model: employee::ActiveModel = existing.into();
    model.code = Set(code);
    model.name = Set(name);
    model.position = Set(validate::optional_text(input.position));
    model.phone = Set(validate::optional_text(input.phone));
    model.email = Set(email);
    model.salary = Set(salary);
    model.hire_date = Set(input.hire_date);
    model.is_active = Set(input.is_active);

    model.update(db).await.map_err(Into::into)
}

/// Deletes an employee that has no expenses or payment vouchers.
///
/// Employees with history should be deactivated instead.
#[instrument(skip(db))]
pub async fn delete_employee(db: &DatabaseConnection, employee_id: i64) -> Result<()> {
    let employee = require_employee(db, employee_id).await?;

    DeleteGuard::new(ENTITY, employee_id)
        .check::<Expense, _>(db, expense::Column::EmployeeId.eq(employee_id), "expense(s)")
        .await?
        .check::<PaymentVoucher, _>(
            db,
            payment_voucher::Column::EmployeeId.eq(employee_id),
            "payment voucher(s)",
        )
        .await?
        .finish()?;

    employee.delete(db).await?;
    info!(employee_id, "employee deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_negative_salary_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result = create_employee(
            &db,
            EmployeeInput {
                name: "Sara".to_string(),
                salary: -1.0,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: _ })));
    }

    #[tokio::test]
    async fn test_create_employee_defaults_active() -> Result<()> {
        let db = setup_test_db().await?;
        let employee = create_test_employee(&db, "Omar").await?;
        assert_eq!(employee.code, "EMP-0001");
        assert!(employee.is_active);
        assert_eq!(employee.salary, 4000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_employees_active_filter() -> Result<()> {
        let db = setup_test_db().await?;
        let leaving = create_test_employee(&db, "Leaving").await?;
        create_test_employee(&db, "Staying").await?;

        update_employee(
            &db,
            leaving.id,
            EmployeeInput {
                name: "Leaving".to_string(),
                salary: 4000.0,
                is_active: false,
                ..Default::default()
            },
        )
        .await?;

        let active = list_employees(
            &db,
            &EmployeeFilter {
                active: Some(true),
                ..Default::default()
            },
            &PageParams::default(),
        )
        .await?;
        assert_eq!(active.total, 1);
        assert_eq!(active.data[0].name, "Staying");

        let all = list_employees(&db, &EmployeeFilter::default(), &PageParams::default()).await?;
        assert_eq!(all.total, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_guarded_by_expenses_and_payments() -> Result<()> {
        use crate::{
            core::{
                expense::{ExpenseInput, create_expense},
                voucher::{PaymentVoucherInput, create_payment_voucher},
            },
            entities::sea_orm_active_enums::{PaymentBeneficiary, PaymentMethod},
        };

        let db = setup_test_db().await?;
        let with_expense = create_test_employee(&db, "Omar").await?;
        let with_payment = create_test_employee(&db, "Huda").await?;
        let clean = create_test_employee(&db, "Sami").await?;

        create_expense(
            &db,
            ExpenseInput {
                code: None,
                supplier_id: None,
                employee_id: Some(with_expense.id),
                expense_type_id: None,
                amount: 4_000.0,
                date: date(2024, 3, 31),
                description: Some("March salary".to_string()),
            },
        )
        .await?;
        create_payment_voucher(
            &db,
            PaymentVoucherInput {
                code: None,
                date: date(2024, 3, 31),
                amount: 4_000.0,
                beneficiary: PaymentBeneficiary::Employee,
                supplier_id: None,
                employee_id: Some(with_payment.id),
                partner_id: None,
                payment_method: PaymentMethod::BankTransfer,
                check: None,
                description: None,
            },
        )
        .await?;

        let result = delete_employee(&db, with_expense.id).await;
        assert!(matches!(
            result,
            Err(Error::HasDependents { dependents, .. }) if dependents == "1 expense(s)"
        ));
        let result = delete_employee(&db, with_payment.id).await;
        assert!(matches!(
            result,
            Err(Error::HasDependents { dependents, .. }) if dependents == "1 payment voucher(s)"
        ));

        delete_employee(&db, clean.id).await?;
        assert!(matches!(
            require_employee(&db, clean.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_employee_input_deserializes_defaults() {
        let input: EmployeeInput = serde_json::from_str(r#"{"name": "Huda"}"#).unwrap();
        assert!(input.is_active);
        assert_eq!(input.salary, 0.0);
    }
}
