//! Customer business logic - registration, lookup, and guarded deletion of customers.

use crate::{
    core::{
        codes,
        guard::DeleteGuard,
        pagination::{self, Page, PageParams},
        validate,
    },
    entities::{
        Customer, CustomerReview, Quotation, ReceiptVoucher, Revenue, WorkOrder, customer,
        customer_review, quotation, receipt_voucher, revenue, work_order,
    },
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

const ENTITY: &str = "customer";

/// Fields accepted when creating or updating a customer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerInput {
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
    /// VAT registration number
    pub tax_number: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// A customer together with the records hanging off it.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetails {
    /// The customer row
    #[serde(flatten)]
    pub customer: customer::Model,
    /// Quotations addressed to the customer, newest first
    pub quotations: Vec<quotation::Model>,
    /// Work orders for the customer, newest first
    pub work_orders: Vec<work_order::Model>,
    /// Reviews left by the customer
    pub reviews: Vec<customer_review::Model>,
    /// Sum of all revenues booked against the customer
    pub total_revenue: f64,
}

/// Lists customers ordered by code, optionally filtered by a name/code substring.
pub async fn list_customers(
    db: &DatabaseConnection,
    search: Option<&str>,
    params: &PageParams,
) -> Result<Page<customer::Model>> {
    let mut query = Customer::find().order_by_asc(customer::Column::Code);
    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(customer::Column::Name.contains(term))
                .add(customer::Column::Code.contains(term)),
        );
    }
    pagination::fetch_page(db, query, params).await
}

/// Finds a customer by primary key.
pub async fn get_customer_by_id<C>(db: &C, customer_id: i64) -> Result<Option<customer::Model>>
where
    C: ConnectionTrait,
{
    Customer::find_by_id(customer_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a customer by primary key, failing with [`Error::NotFound`] when absent.
pub async fn require_customer<C>(db: &C, customer_id: i64) -> Result<customer::Model>
where
    C: ConnectionTrait,
{
    get_customer_by_id(db, customer_id)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, customer_id))
}

/// Loads a customer with its quotations, work orders, reviews, and revenue total.
pub async fn get_customer_details(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<CustomerDetails> {
    let customer = require_customer(db, customer_id).await?;

    let quotations = customer
        .find_related(Quotation)
        .order_by_desc(quotation::Column::IssueDate)
        .all(db)
        .await?;
    let work_orders = customer
        .find_related(WorkOrder)
        .order_by_desc(work_order::Column::CreatedAt)
        .all(db)
        .await?;
    let reviews = customer
        .find_related(CustomerReview)
        .order_by_desc(customer_review::Column::CreatedAt)
        .all(db)
        .await?;
    let total_revenue = validate::round2(
        customer
            .find_related(Revenue)
            .all(db)
            .await?
            .iter()
            .map(|r| r.amount)
            .sum(),
    );

    Ok(CustomerDetails {
        customer,
        quotations,
        work_orders,
        reviews,
        total_revenue,
    })
}

/// Creates a customer, generating a `CUS-NNNN` code unless one is supplied.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_customer(
    db: &DatabaseConnection,
    input: CustomerInput,
) -> Result<customer::Model> {
    let name = validate::required_text(&input.name, "Customer name")?;
    let email = validate::optional_email(input.email)?;
    let code = codes::resolve_new_code::<Customer, _>(
        db,
        customer::Column::Code,
        codes::CUSTOMER,
        input.code.as_deref(),
        ENTITY,
    )
    .await?;

    let model = customer::ActiveModel {
        code: Set(code),
        name: Set(name),
        phone: Set(validate::optional_text(input.phone)),
        email: Set(email),
        address: Set(validate::optional_text(input.address)),
        tax_number: Set(validate::optional_text(input.tax_number)),
        notes: Set(validate::optional_text(input.notes)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(customer_id = model.id, code = %model.code, "customer created");
    Ok(model)
}

/// Replaces a customer's fields. An absent code keeps the current one.
#[instrument(skip(db, input))]
pub async fn update_customer(
    db: &DatabaseConnection,
    customer_id: i64,
    input: CustomerInput,
) -> Result<customer::Model> {
    let name = validate::required_text(&input.name, "Customer name")?;
    let email = validate::optional_email(input.email)?;
    let existing = require_customer(db, customer_id).await?;

    let code = match validate::optional_text(input.code) {
        Some(code) if code != existing.code => {
            if codes::code_taken::<Customer, _>(
                db,
                customer::Column::Code,
                &code,
                Some((customer::Column::Id, customer_id)),
            )
            .await?
            {
                return Err(Error::DuplicateCode { entity: ENTITY, code });
            }
            code
        }
        _ => existing.code.clone(),
    };

    let mut model: customer::ActiveModel = existing.into();
    model.code = Set(code);
    model.name = Set(name);
    model.phone = Set(validate::optional_text(input.phone));
    model.email = Set(email);
    model.address = Set(validate::optional_text(input.address));
    model.tax_number = Set(validate::optional_text(input.tax_number));
    model.notes = Set(validate::optional_text(input.notes));

    model.update(db).await.map_err(Into::into)
}

/// Deletes a customer that nothing references.
#[instrument(skip(db))]
pub async fn delete_customer(db: &DatabaseConnection, customer_id: i64) -> Result<()> {
    let customer = require_customer(db, customer_id).await?;

    DeleteGuard::new(ENTITY, customer_id)
        .check::<Quotation, _>(db, quotation::Column::CustomerId.eq(customer_id), "quotation(s)")
        .await?
        .check::<WorkOrder, _>(db, work_order::Column::CustomerId.eq(customer_id), "work order(s)")
        .await?
        .check::<Revenue, _>(db, revenue::Column::CustomerId.eq(customer_id), "revenue(s)")
        .await?
        .check::<ReceiptVoucher, _>(
            db,
            receipt_voucher::Column::CustomerId.eq(customer_id),
            "receipt voucher(s)",
        )
        .await?
        .check::<CustomerReview, _>(
            db,
            customer_review::Column::CustomerId.eq(customer_id),
            "review(s)",
        )
        .await?
        .finish()?;

    customer.delete(db).await?;
    info!(customer_id, "customer deleted");
    Ok(())
}
