//! Shared test utilities for the Share In back-office.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    core::{
        customer::{self, CustomerInput},
        employee::{self, EmployeeInput},
        expense::{self, ExpenseInput},
        partner::{self, PartnerInput},
        quotation::{self, QuotationInput, QuotationItemInput},
        review::{self, ReviewInput},
        revenue::{self, RevenueInput},
        supplier::{self, SupplierInput},
        voucher::{self, PaymentVoucherInput, ReceiptVoucherInput},
        work_order::{self, WorkOrderInput},
    },
    entities::{
        self,
        sea_orm_active_enums::{PaymentBeneficiary, PaymentMethod, ReceiptSource},
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date. Panics on an invalid date.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates a test customer with only a name.
pub async fn create_test_customer(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::customer::Model> {
    customer::create_customer(
        db,
        CustomerInput {
            name: name.to_string(),
            ..Default::default()
        },
    )
    .await
}

/// Creates a test supplier with only a name.
pub async fn create_test_supplier(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::supplier::Model> {
    supplier::create_supplier(
        db,
        SupplierInput {
            name: name.to_string(),
            ..Default::default()
        },
    )
    .await
}

/// Creates an active test employee.
///
/// # Defaults
/// * `salary`: 4000.0
pub async fn create_test_employee(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::employee::Model> {
    employee::create_employee(
        db,
        EmployeeInput {
            name: name.to_string(),
            salary: 4_000.0,
            ..Default::default()
        },
    )
    .await
}

/// Creates a test partner.
///
/// # Arguments
/// * `db` - Database connection
/// * `name` - Partner name
/// * `share` - Profit share in percent
/// * `initial_capital` - Capital brought in at creation
pub async fn create_test_partner(
    db: &DatabaseConnection,
    name: &str,
    share: f64,
    initial_capital: f64,
) -> Result<entities::partner::Model> {
    partner::create_partner(
        db,
        PartnerInput {
            name: name.to_string(),
            share_percentage: share,
            initial_capital,
            ..Default::default()
        },
    )
    .await
}

/// Records a cash capital injection by a partner, dated 2024-01-01.
pub async fn create_test_capital_receipt(
    db: &DatabaseConnection,
    partner_id: i64,
    amount: f64,
) -> Result<entities::receipt_voucher::Model> {
    create_dated_capital_receipt(db, partner_id, amount, date(2024, 1, 1)).await
}

/// Records a cash capital injection by a partner on the given date.
pub async fn create_dated_capital_receipt(
    db: &DatabaseConnection,
    partner_id: i64,
    amount: f64,
    on: NaiveDate,
) -> Result<entities::receipt_voucher::Model> {
    voucher::create_receipt_voucher(
        db,
        ReceiptVoucherInput {
            code: None,
            date: on,
            amount,
            source: ReceiptSource::PartnerCapital,
            customer_id: None,
            partner_id: Some(partner_id),
            payment_method: PaymentMethod::Cash,
            check: None,
            description: None,
        },
    )
    .await
}

/// Records a cash capital withdrawal by a partner on the given date.
pub async fn create_dated_capital_withdrawal(
    db: &DatabaseConnection,
    partner_id: i64,
    amount: f64,
    on: NaiveDate,
) -> Result<entities::payment_voucher::Model> {
    voucher::create_payment_voucher(
        db,
        PaymentVoucherInput {
            code: None,
            date: on,
            amount,
            beneficiary: PaymentBeneficiary::PartnerWithdrawal,
            supplier_id: None,
            employee_id: None,
            partner_id: Some(partner_id),
            payment_method: PaymentMethod::Cash,
            check: None,
            description: None,
        },
    )
    .await
}

/// Books an untyped revenue with a generated code.
pub async fn create_test_revenue(
    db: &DatabaseConnection,
    customer_id: Option<i64>,
    amount: f64,
    on: NaiveDate,
) -> Result<entities::revenue::Model> {
    revenue::create_revenue(
        db,
        RevenueInput {
            code: None,
            customer_id,
            revenue_type_id: None,
            work_order_id: None,
            amount,
            date: on,
            description: None,
        },
    )
    .await
}

/// Books an untyped expense with a generated code.
pub async fn create_test_expense(
    db: &DatabaseConnection,
    supplier_id: Option<i64>,
    amount: f64,
    on: NaiveDate,
) -> Result<entities::expense::Model> {
    expense::create_expense(
        db,
        ExpenseInput {
            code: None,
            supplier_id,
            employee_id: None,
            expense_type_id: None,
            amount,
            date: on,
            description: None,
        },
    )
    .await
}

/// Books an expense of the given type, dated 2024-06-01.
pub async fn create_typed_expense(
    db: &DatabaseConnection,
    expense_type_id: i64,
    amount: f64,
) -> Result<entities::expense::Model> {
    expense::create_expense(
        db,
        ExpenseInput {
            code: None,
            supplier_id: None,
            employee_id: None,
            expense_type_id: Some(expense_type_id),
            amount,
            date: date(2024, 6, 1),
            description: None,
        },
    )
    .await
}

/// Creates a draft quotation with a single line.
///
/// # Defaults
/// * `issue_date`: 2024-04-01
/// * `items`: one "Stand design" line, quantity 1
/// * `discount`: 0.0
/// * `vat_rate`: company default (15% on a fresh database)
pub async fn create_test_quotation(
    db: &DatabaseConnection,
    customer_id: i64,
    unit_price: f64,
) -> Result<entities::quotation::Model> {
    quotation::create_quotation(
        db,
        QuotationInput {
            code: None,
            customer_id,
            project_type_id: None,
            issue_date: date(2024, 4, 1),
            valid_until: None,
            discount: 0.0,
            vat_rate: None,
            notes: None,
            items: vec![QuotationItemInput {
                description: "Stand design".to_string(),
                quantity: 1.0,
                unit_price,
            }],
        },
    )
    .await
}

/// Opens a pending work order without a quotation.
pub async fn create_test_work_order(
    db: &DatabaseConnection,
    customer_id: i64,
    title: &str,
) -> Result<entities::work_order::Model> {
    work_order::create_work_order(
        db,
        WorkOrderInput {
            code: None,
            customer_id,
            quotation_id: None,
            title: title.to_string(),
            start_date: None,
            end_date: None,
            amount: 0.0,
            notes: None,
        },
    )
    .await
}

/// Records a review without a comment.
pub async fn create_test_review(
    db: &DatabaseConnection,
    customer_id: i64,
    work_order_id: Option<i64>,
    rating: i32,
) -> Result<entities::customer_review::Model> {
    review::create_review(
        db,
        ReviewInput {
            customer_id,
            work_order_id,
            rating,
            comment: None,
        },
    )
    .await
}
