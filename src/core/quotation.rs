//! Quotations and their items.
//!
//! The stored `subtotal`, `vat_amount`, and `total` are always recomputed from
//! the items on write:
//!
//! ```text
//! line      = round2(quantity × unit_price)
//! subtotal  = Σ line
//! vat       = round2((subtotal − discount) × vat_rate / 100)
//! total     = round2(subtotal − discount + vat)
//! ```

use crate::{
    core::{
        catalog::require_project_type,
        codes,
        customer::require_customer,
        guard::DeleteGuard,
        pagination::{self, Page, PageParams},
        settings, validate,
    },
    entities::{
        Quotation, QuotationItem, WorkOrder, customer, quotation, quotation_item,
        sea_orm_active_enums::QuotationStatus, work_order,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

const ENTITY: &str = "quotation";

/// One priced line of a quotation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuotationItemInput {
    /// What is being quoted
    pub description: String,
    /// Quantity, above zero
    pub quantity: f64,
    /// Price of one unit, not negative
    pub unit_price: f64,
}

/// Fields accepted when creating or updating a quotation.
#[derive(Debug, Clone, Deserialize)]
pub struct QuotationInput {
    /// Explicit code; generated when absent on create, kept when absent on update
    pub code: Option<String>,
    /// Customer the quotation is addressed to
    pub customer_id: i64,
    /// Kind of project
    pub project_type_id: Option<i64>,
    /// Date the quotation was issued
    pub issue_date: NaiveDate,
    /// Must not precede `issue_date`
    pub valid_until: Option<NaiveDate>,
    /// Absolute discount, at most the subtotal
    #[serde(default)]
    pub discount: f64,
    /// VAT in percent; the company default when absent
    pub vat_rate: Option<f64>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Priced lines, at least one
    pub items: Vec<QuotationItemInput>,
}

/// Monetary totals of a quotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotationTotals {
    /// Rounded total of each item, in input order
    pub line_totals: Vec<f64>,
    /// Sum of the line totals
    pub subtotal: f64,
    /// Discount taken off the subtotal
    pub discount: f64,
    /// VAT on the discounted subtotal
    pub vat_amount: f64,
    /// Amount due
    pub total: f64,
}

/// A quotation with its customer and items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotationDetails {
    /// The quotation
    #[serde(flatten)]
    pub quotation: quotation::Model,
    /// Customer it is addressed to
    pub customer: customer::Model,
    /// Priced lines
    pub items: Vec<quotation_item::Model>,
}

/// Filters for [`list_quotations`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuotationFilter {
    /// Only this status
    pub status: Option<QuotationStatus>,
    /// Only this customer
    pub customer_id: Option<i64>,
    /// Issued on or after
    pub date_from: Option<NaiveDate>,
    /// Issued on or before
    pub date_to: Option<NaiveDate>,
}

/// Validates the items and computes the totals.
pub fn compute_totals(
    items: &[QuotationItemInput],
    discount: f64,
    vat_rate: f64,
) -> Result<QuotationTotals> {
    if items.is_empty() {
        return Err(Error::validation("A quotation needs at least one item"));
    }
    let discount = validate::non_negative_amount(discount)?;
    let vat_rate = validate::percentage(vat_rate, "VAT rate")?;

    let mut line_totals = Vec::with_capacity(items.len());
    for item in items {
        validate::required_text(&item.description, "Item description")?;
        validate::positive_amount(item.quantity)?;
        validate::non_negative_amount(item.unit_price)?;
        line_totals.push(validate::round2(item.quantity * item.unit_price));
    }

    let subtotal = validate::round2(line_totals.iter().sum());
    if discount > subtotal {
        return Err(Error::validation(format!(
            "Discount {discount:.2} exceeds subtotal {subtotal:.2}"
        )));
    }
    let vat_amount = validate::round2((subtotal - discount) * vat_rate / 100.0);
    let total = validate::round2(subtotal - discount + vat_amount);

    Ok(QuotationTotals {
        line_totals,
        subtotal,
        discount,
        vat_amount,
        total,
    })
}

/// Whether a quotation may move from `from` to `to`.
#[must_use]
pub const fn can_transition(from: QuotationStatus, to: QuotationStatus) -> bool {
    matches!(
        (from, to),
        (QuotationStatus::Draft, QuotationStatus::Sent)
            | (
                QuotationStatus::Draft | QuotationStatus::Sent,
                QuotationStatus::Accepted | QuotationStatus::Rejected
            )
    )
}

/// Finds a quotation by primary key, failing with [`Error::NotFound`] when absent.
pub async fn require_quotation<C>(db: &C, quotation_id: i64) -> Result<quotation::Model>
where
    C: ConnectionTrait,
{
    Quotation::find_by_id(quotation_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, quotation_id))
}

/// Returns a quotation with its customer and items.
pub async fn get_quotation(db: &DatabaseConnection, quotation_id: i64) -> Result<QuotationDetails> {
    let quotation = require_quotation(db, quotation_id).await?;
    let customer = require_customer(db, quotation.customer_id).await?;
    let items = quotation
        .find_related(QuotationItem)
        .order_by_asc(quotation_item::Column::Id)
        .all(db)
        .await?;
    Ok(QuotationDetails {
        quotation,
        customer,
        items,
    })
}

/// Lists quotations, newest issue date first.
pub async fn list_quotations(
    db: &DatabaseConnection,
    filter: &QuotationFilter,
    params: &PageParams,
) -> Result<Page<quotation::Model>> {
    validate::date_order(filter.date_from, filter.date_to, "Quotation date range")?;

    let mut query = Quotation::find()
        .order_by_desc(quotation::Column::IssueDate)
        .order_by_desc(quotation::Column::Id);
    if let Some(status) = filter.status {
        query = query.filter(quotation::Column::Status.eq(status));
    }
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(quotation::Column::CustomerId.eq(customer_id));
    }
    if let Some(from) = filter.date_from {
        query = query.filter(quotation::Column::IssueDate.gte(from));
    }
    if let Some(to) = filter.date_to {
        query = query.filter(quotation::Column::IssueDate.lte(to));
    }
    pagination::fetch_page(db, query, params).await
}

async fn insert_items<C>(
    db: &C,
    quotation_id: i64,
    items: Vec<QuotationItemInput>,
    line_totals: &[f64],
) -> Result<()>
where
    C: ConnectionTrait,
{
    for (item, total) in items.into_iter().zip(line_totals) {
        quotation_item::ActiveModel {
            quotation_id: Set(quotation_id),
            description: Set(item.description.trim().to_string()),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            total: Set(*total),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

async fn ensure_references<C>(db: &C, input: &QuotationInput) -> Result<()>
where
    C: ConnectionTrait,
{
    require_customer(db, input.customer_id).await?;
    if let Some(project_type_id) = input.project_type_id {
        require_project_type(db, project_type_id).await?;
    }
    Ok(())
}

/// Creates a draft quotation with its items.
#[instrument(skip(db, input), fields(customer_id = input.customer_id, items = input.items.len()))]
pub async fn create_quotation(
    db: &DatabaseConnection,
    input: QuotationInput,
) -> Result<quotation::Model> {
    validate::date_order(Some(input.issue_date), input.valid_until, "Quotation validity")?;

    let txn = db.begin().await?;

    let vat_rate = match input.vat_rate {
        Some(rate) => rate,
        None => settings::current_vat_rate(&txn).await?,
    };
    let totals = compute_totals(&input.items, input.discount, vat_rate)?;
    ensure_references(&txn, &input).await?;
    let code = codes::resolve_new_code::<Quotation, _>(
        &txn,
        quotation::Column::Code,
        codes::QUOTATION,
        input.code.as_deref(),
        ENTITY,
    )
    .await?;

    let model = quotation::ActiveModel {
        code: Set(code),
        customer_id: Set(input.customer_id),
        project_type_id: Set(input.project_type_id),
        issue_date: Set(input.issue_date),
        valid_until: Set(input.valid_until),
        status: Set(QuotationStatus::Draft),
        discount: Set(totals.discount),
        vat_rate: Set(vat_rate),
        subtotal: Set(totals.subtotal),
        vat_amount: Set(totals.vat_amount),
        total: Set(totals.total),
        notes: Set(validate::optional_text(input.notes)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    insert_items(&txn, model.id, input.items, &totals.line_totals).await?;

    txn.commit().await?;

    info!(quotation_id = model.id, code = %model.code, total = model.total, "quotation created");
    Ok(model)
}

/// Replaces a quotation's fields and items. Only drafts and sent quotations can change.
#[instrument(skip(db, input))]
pub async fn update_quotation(
    db: &DatabaseConnection,
    quotation_id: i64,
    input: QuotationInput,
) -> Result<quotation::Model> {
    validate::date_order(Some(input.issue_date), input.valid_until, "Quotation validity")?;

    let txn = db.begin().await?;

    let existing = require_quotation(&txn, quotation_id).await?;
    if !matches!(existing.status, QuotationStatus::Draft | QuotationStatus::Sent) {
        return Err(Error::Conflict {
            message: format!(
                "Quotation {} is {} and can no longer be edited",
                existing.code, existing.status
            ),
        });
    }

    let vat_rate = input.vat_rate.unwrap_or(existing.vat_rate);
    let totals = compute_totals(&input.items, input.discount, vat_rate)?;
    ensure_references(&txn, &input).await?;

    let code = match validate::optional_text(input.code) {
        Some(code) if code != existing.code => {
            if codes::code_taken::<Quotation, _>(
                &txn,
                quotation::Column::Code,
                &code,
                Some((quotation::Column::Id, quotation_id)),
            )
            .await?
            {
                return Err(Error::DuplicateCode { entity: ENTITY, code });
            }
            code
        }
        _ => existing.code.clone(),
    };

    let mut model: quotation::ActiveModel = existing.into();
    model.code = Set(code);
    model.customer_id = Set(input.customer_id);
    model.project_type_id = Set(input.project_type_id);
    model.issue_date = Set(input.issue_date);
    model.valid_until = Set(input.valid_until);
    model.discount = Set(totals.discount);
    model.vat_rate = Set(vat_rate);
    model.subtotal = Set(totals.subtotal);
    model.vat_amount = Set(totals.vat_amount);
    model.total = Set(totals.total);
    model.notes = Set(validate::optional_text(input.notes));
    let updated = model.update(&txn).await?;

    QuotationItem::delete_many()
        .filter(quotation_item::Column::QuotationId.eq(quotation_id))
        .exec(&txn)
        .await?;
    insert_items(&txn, quotation_id, input.items, &totals.line_totals).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Moves a quotation along its workflow.
#[instrument(skip(db))]
pub async fn set_quotation_status(
    db: &DatabaseConnection,
    quotation_id: i64,
    status: QuotationStatus,
) -> Result<quotation::Model> {
    let existing = require_quotation(db, quotation_id).await?;
    if !can_transition(existing.status, status) {
        return Err(Error::InvalidStatusTransition {
            entity: ENTITY,
            from: existing.status.to_string(),
            to: status.to_string(),
        });
    }

    let mut model: quotation::ActiveModel = existing.into();
    model.status = Set(status);
    let updated = model.update(db).await?;
    info!(quotation_id, status = %status, "quotation status changed");
    Ok(updated)
}

/// Deletes a quotation and its items unless a work order was opened from it.
#[instrument(skip(db))]
pub async fn delete_quotation(db: &DatabaseConnection, quotation_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = require_quotation(&txn, quotation_id).await?;
    DeleteGuard::new(ENTITY, quotation_id)
        .check::<WorkOrder, _>(
            &txn,
            work_order::Column::QuotationId.eq(quotation_id),
            "work order(s)",
        )
        .await?
        .finish()?;

    QuotationItem::delete_many()
        .filter(quotation_item::Column::QuotationId.eq(quotation_id))
        .exec(&txn)
        .await?;
    existing.delete(&txn).await?;

    txn.commit().await?;
    info!(quotation_id, "quotation deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn item(description: &str, quantity: f64, unit_price: f64) -> QuotationItemInput {
        QuotationItemInput {
            description: description.to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_compute_totals() {
        let totals = compute_totals(
            &[item("Stage", 1.0, 1_000.0), item("Chairs", 150.0, 3.333)],
            100.0,
            15.0,
        )
        .unwrap();
        assert_eq!(totals.line_totals, vec![1_000.0, 499.95]);
        assert_eq!(totals.subtotal, 1_499.95);
        assert_eq!(totals.vat_amount, 209.99);
        assert_eq!(totals.total, 1_609.94);
    }

    #[test]
    fn test_compute_totals_rejections() {
        assert!(compute_totals(&[], 0.0, 15.0).is_err());
        assert!(compute_totals(&[item("x", 1.0, 10.0)], 10.01, 15.0).is_err());
        assert!(compute_totals(&[item("x", 0.0, 10.0)], 0.0, 15.0).is_err());
        assert!(compute_totals(&[item(" ", 1.0, 10.0)], 0.0, 15.0).is_err());
        assert!(compute_totals(&[item("x", 1.0, -1.0)], 0.0, 15.0).is_err());
        assert!(compute_totals(&[item("x", 1.0, 10.0)], 0.0, 101.0).is_err());
        // Free items are fine
        assert_eq!(
            compute_totals(&[item("x", 1.0, 0.0)], 0.0, 15.0).unwrap().total,
            0.0
        );
    }

    #[test]
    fn test_status_transitions() {
        use QuotationStatus::{Accepted, Draft, Rejected, Sent};
        assert!(can_transition(Draft, Sent));
        assert!(can_transition(Draft, Accepted));
        assert!(can_transition(Sent, Rejected));
        assert!(!can_transition(Sent, Draft));
        assert!(!can_transition(Accepted, Rejected));
        assert!(!can_transition(Rejected, Sent));
        assert!(!can_transition(Draft, Draft));
    }

    #[tokio::test]
    async fn test_create_uses_default_vat_and_stores_items() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Acme").await?;

        let quotation = create_test_quotation(&db, customer.id, 2_000.0).await?;
        assert_eq!(quotation.code, "QUO-0001");
        assert_eq!(quotation.status, QuotationStatus::Draft);
        assert_eq!(quotation.vat_rate, 15.0);
        assert_eq!(quotation.total, 2_300.0);

        let details = get_quotation(&db, quotation.id).await?;
        assert_eq!(details.items.len(), 1);
        assert_eq!(details.customer.id, customer.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_replaces_items_only_while_open() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Acme").await?;
        let quotation = create_test_quotation(&db, customer.id, 2_000.0).await?;

        let input = QuotationInput {
            code: None,
            customer_id: customer.id,
            project_type_id: None,
            issue_date: date(2024, 4, 1),
            valid_until: Some(date(2024, 4, 30)),
            discount: 0.0,
            vat_rate: Some(0.0),
            notes: None,
            items: vec![item("Tent", 2.0, 400.0), item("Lights", 1.0, 200.0)],
        };
        let updated = update_quotation(&db, quotation.id, input.clone()).await?;
        assert_eq!(updated.total, 1_000.0);
        assert_eq!(get_quotation(&db, quotation.id).await?.items.len(), 2);

        set_quotation_status(&db, quotation.id, QuotationStatus::Accepted).await?;
        let result = update_quotation(&db, quotation.id, input).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_transition_and_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Acme").await?;
        let other = create_test_customer(&db, "Globex").await?;
        let q1 = create_test_quotation(&db, customer.id, 100.0).await?;
        create_test_quotation(&db, other.id, 100.0).await?;

        set_quotation_status(&db, q1.id, QuotationStatus::Rejected).await?;
        let result = set_quotation_status(&db, q1.id, QuotationStatus::Sent).await;
        assert!(matches!(result, Err(Error::InvalidStatusTransition { .. })));

        let drafts = list_quotations(
            &db,
            &QuotationFilter {
                status: Some(QuotationStatus::Draft),
                ..Default::default()
            },
            &PageParams::default(),
        )
        .await?;
        assert_eq!(drafts.total, 1);
        assert_eq!(drafts.data[0].customer_id, other.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_removes_items() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Acme").await?;
        let quotation = create_test_quotation(&db, customer.id, 100.0).await?;

        delete_quotation(&db, quotation.id).await?;
        assert!(QuotationItem::find().all(&db).await?.is_empty());
        assert!(matches!(
            require_quotation(&db, quotation.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_customer() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_test_quotation(&db, 77, 100.0).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "customer",
                ..
            })
        ));
        Ok(())
    }
}
