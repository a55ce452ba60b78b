//! Work orders - the jobs actually carried out for customers.

use crate::{
    core::{
        codes,
        customer::require_customer,
        guard::DeleteGuard,
        pagination::{self, Page, PageParams},
        quotation::require_quotation,
        validate,
    },
    entities::{
        CustomerReview, Revenue, WorkOrder, customer_review, revenue,
        sea_orm_active_enums::{QuotationStatus, WorkOrderStatus},
        work_order,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;
use tracing::{info, instrument};

const ENTITY: &str = "work order";

/// Fields accepted when creating or updating a work order.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkOrderInput {
    /// Explicit code; generated when absent on create, kept when absent on update
    pub code: Option<String>,
    /// Customer the work is done for
    pub customer_id: i64,
    /// Quotation the work comes from
    pub quotation_id: Option<i64>,
    /// Short title
    pub title: String,
    /// Planned start
    pub start_date: Option<NaiveDate>,
    /// Planned end, not before the start
    pub end_date: Option<NaiveDate>,
    /// Agreed amount
    #[serde(default)]
    pub amount: f64,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Optional overrides when opening a work order from a quotation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FromQuotationInput {
    /// Defaults to "Work order for <quotation code>"
    pub title: Option<String>,
    /// Planned start
    pub start_date: Option<NaiveDate>,
    /// Planned end, not before the start
    pub end_date: Option<NaiveDate>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Filters for [`list_work_orders`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkOrderFilter {
    /// Only this status
    pub status: Option<WorkOrderStatus>,
    /// Only this customer
    pub customer_id: Option<i64>,
}

/// Whether a work order may move from `from` to `to`.
#[must_use]
pub const fn can_transition(from: WorkOrderStatus, to: WorkOrderStatus) -> bool {
    matches!(
        (from, to),
        (
            WorkOrderStatus::Pending,
            WorkOrderStatus::InProgress | WorkOrderStatus::Cancelled
        ) | (
            WorkOrderStatus::InProgress,
            WorkOrderStatus::Completed | WorkOrderStatus::Cancelled
        )
    )
}

/// Finds a work order by primary key, failing with [`Error::NotFound`] when absent.
pub async fn require_work_order<C>(db: &C, work_order_id: i64) -> Result<work_order::Model>
where
    C: ConnectionTrait,
{
    WorkOrder::find_by_id(work_order_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, work_order_id))
}

/// Lists work orders, newest first.
pub async fn list_work_orders(
    db: &DatabaseConnection,
    filter: &WorkOrderFilter,
    params: &PageParams,
) -> Result<Page<work_order::Model>> {
    let mut query = WorkOrder::find().order_by_desc(work_order::Column::Id);
    if let Some(status) = filter.status {
        query = query.filter(work_order::Column::Status.eq(status));
    }
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(work_order::Column::CustomerId.eq(customer_id));
    }
    pagination::fetch_page(db, query, params).await
}

async fn existing_for_quotation<C>(db: &C, quotation_id: i64) -> Result<Option<work_order::Model>>
where
    C: ConnectionTrait,
{
    WorkOrder::find()
        .filter(work_order::Column::QuotationId.eq(quotation_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a pending work order.
#[instrument(skip(db, input), fields(title = %input.title))]
pub async fn create_work_order(
    db: &DatabaseConnection,
    input: WorkOrderInput,
) -> Result<work_order::Model> {
    let title = validate::required_text(&input.title, "Work order title")?;
    let amount = validate::non_negative_amount(input.amount)?;
    validate::date_order(input.start_date, input.end_date, "Work order schedule")?;

    let txn = db.begin().await?;

    require_customer(&txn, input.customer_id).await?;
    if let Some(quotation_id) = input.quotation_id {
        let quotation = require_quotation(&txn, quotation_id).await?;
        if quotation.customer_id != input.customer_id {
            return Err(Error::validation(format!(
                "Quotation {} belongs to another customer",
                quotation.code
            )));
        }
        if existing_for_quotation(&txn, quotation_id).await?.is_some() {
            return Err(Error::Conflict {
                message: format!("Quotation {} already has a work order", quotation.code),
            });
        }
    }
    let code = codes::resolve_new_code::<WorkOrder, _>(
        &txn,
        work_order::Column::Code,
        codes::WORK_ORDER,
        input.code.as_deref(),
        ENTITY,
    )
    .await?;

    let model = work_order::ActiveModel {
        code: Set(code),
        customer_id: Set(input.customer_id),
        quotation_id: Set(input.quotation_id),
        title: Set(title),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        status: Set(WorkOrderStatus::Pending),
        amount: Set(amount),
        notes: Set(validate::optional_text(input.notes)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(work_order_id = model.id, code = %model.code, "work order created");
    Ok(model)
}

/// Opens the work order of an accepted quotation, copying its customer and total.
///
/// Fails with [`Error::Conflict`] unless the quotation is accepted and has no
/// work order yet.
#[instrument(skip(db, input))]
pub async fn create_from_quotation(
    db: &DatabaseConnection,
    quotation_id: i64,
    input: FromQuotationInput,
) -> Result<work_order::Model> {
    let quotation = require_quotation(db, quotation_id).await?;
    if quotation.status != QuotationStatus::Accepted {
        return Err(Error::Conflict {
            message: format!(
                "Quotation {} is {}; only accepted quotations become work orders",
                quotation.code, quotation.status
            ),
        });
    }

    let title = validate::optional_text(input.title)
        .unwrap_or_else(|| format!("Work order for {}", quotation.code));

    create_work_order(
        db,
        WorkOrderInput {
            code: None,
            customer_id: quotation.customer_id,
            quotation_id: Some(quotation.id),
            title,
            start_date: input.start_date,
            end_date: input.end_date,
            amount: quotation.total,
            notes: input.notes,
        },
    )
    .await
}

/// Replaces a work order's descriptive fields. Status moves through [`set_work_order_status`].
#[instrument(skip(db, input))]
pub async fn update_work_order(
    db: &DatabaseConnection,
    work_order_id: i64,
    input: WorkOrderInput,
) -> Result<work_order::Model> {
    let title = validate::required_text(&input.title, "Work order title")?;
    let amount = validate::non_negative_amount(input.amount)?;
    validate::date_order(input.start_date, input.end_date, "Work order schedule")?;

    let txn = db.begin().await?;

    let existing = require_work_order(&txn, work_order_id).await?;
    require_customer(&txn, input.customer_id).await?;
    let customer_changed = input.customer_id != existing.customer_id;
    if let Some(quotation_id) = input.quotation_id {
        let relinked = Some(quotation_id) != existing.quotation_id;
        if relinked || customer_changed {
            let quotation = require_quotation(&txn, quotation_id).await?;
            if quotation.customer_id != input.customer_id {
                return Err(Error::validation(format!(
                    "Quotation {} belongs to another customer",
                    quotation.code
                )));
            }
            if relinked && existing_for_quotation(&txn, quotation_id).await?.is_some() {
                return Err(Error::Conflict {
                    message: format!("Quotation {} already has a work order", quotation.code),
                });
            }
        }
    }
    if customer_changed {
        // Revenues of a work order always carry its customer
        Revenue::update_many()
            .col_expr(revenue::Column::CustomerId, Expr::value(input.customer_id))
            .filter(revenue::Column::WorkOrderId.eq(work_order_id))
            .exec(&txn)
            .await?;
    }

    let code = match validate::optional_text(input.code) {
        Some(code) if code != existing.code => {
            if codes::code_taken::<WorkOrder, _>(
                &txn,
                work_order::Column::Code,
                &code,
                Some((work_order::Column::Id, work_order_id)),
            )
            .await?
            {
                return Err(Error::DuplicateCode { entity: ENTITY, code });
            }
            code
        }
        _ => existing.code.clone(),
    };

    let mut model: work_order::ActiveModel = existing.into();
    model.code = Set(code);
    model.customer_id = Set(input.customer_id);
    model.quotation_id = Set(input.quotation_id);
    model.title = Set(title);
    model.start_date = Set(input.start_date);
    model.end_date = Set(input.end_date);
    model.amount = Set(amount);
    model.notes = Set(validate::optional_text(input.notes));
    let updated = model.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Moves a work order along its workflow.
#[instrument(skip(db))]
pub async fn set_work_order_status(
    db: &DatabaseConnection,
    work_order_id: i64,
    status: WorkOrderStatus,
) -> Result<work_order::Model> {
    let existing = require_work_order(db, work_order_id).await?;
    if !can_transition(existing.status, status) {
        return Err(Error::InvalidStatusTransition {
            entity: ENTITY,
            from: existing.status.to_string(),
            to: status.to_string(),
        });
    }

    let mut model: work_order::ActiveModel = existing.into();
    model.status = Set(status);
    let updated = model.update(db).await?;
    info!(work_order_id, status = %status, "work order status changed");
    Ok(updated)
}

/// Deletes a work order that no revenue or review points at.
#[instrument(skip(db))]
pub async fn delete_work_order(db: &DatabaseConnection, work_order_id: i64) -> Result<()> {
    let existing = require_work_order(db, work_order_id).await?;

    DeleteGuard::new(ENTITY, work_order_id)
        .check::<Revenue, _>(db, revenue::Column::WorkOrderId.eq(work_order_id), "revenue(s)")
        .await?
        .check::<CustomerReview, _>(
            db,
            customer_review::Column::WorkOrderId.eq(work_order_id),
            "review(s)",
        )
        .await?
        .finish()?;

    existing.delete(db).await?;
    info!(work_order_id, "work order deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{core::quotation::set_quotation_status, test_utils::*};

    #[test]
    fn test_status_transitions() {
        use WorkOrderStatus::{Cancelled, Completed, InProgress, Pending};
        assert!(can_transition(Pending, InProgress));
        assert!(can_transition(Pending, Cancelled));
        assert!(can_transition(InProgress, Completed));
        assert!(can_transition(InProgress, Cancelled));
        assert!(!can_transition(Pending, Completed));
        assert!(!can_transition(Completed, InProgress));
        assert!(!can_transition(Cancelled, Pending));
    }

    #[tokio::test]
    async fn test_create_from_quotation() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Acme").await?;
        let quotation = create_test_quotation(&db, customer.id, 1_000.0).await?;

        // Draft quotations cannot be turned into work
        let result = create_from_quotation(&db, quotation.id, FromQuotationInput::default()).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        set_quotation_status(&db, quotation.id, QuotationStatus::Accepted).await?;
        let order = create_from_quotation(&db, quotation.id, FromQuotationInput::default()).await?;
        assert_eq!(order.code, "WO-0001");
        assert_eq!(order.customer_id, customer.id);
        assert_eq!(order.amount, 1_150.0);
        assert_eq!(order.status, WorkOrderStatus::Pending);
        assert_eq!(order.title, format!("Work order for {}", quotation.code));

        let result = create_from_quotation(&db, quotation.id, FromQuotationInput::default()).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_schedule_must_be_ordered() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Acme").await?;
        let result = create_work_order(
            &db,
            WorkOrderInput {
                code: None,
                customer_id: customer.id,
                quotation_id: None,
                title: "Gala dinner".to_string(),
                start_date: Some(date(2024, 6, 10)),
                end_date: Some(date(2024, 6, 9)),
                amount: 0.0,
                notes: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_customer_change_follows_quotation_and_revenues() -> Result<()> {
        use crate::core::revenue::{RevenueInput, create_revenue, require_revenue};

        let db = setup_test_db().await?;
        let acme = create_test_customer(&db, "Acme").await?;
        let globex = create_test_customer(&db, "Globex").await?;

        let quotation = create_test_quotation(&db, acme.id, 1_000.0).await?;
        set_quotation_status(&db, quotation.id, QuotationStatus::Accepted).await?;
        let quoted = create_from_quotation(&db, quotation.id, FromQuotationInput::default()).await?;
        let moved = WorkOrderInput {
            code: None,
            customer_id: globex.id,
            quotation_id: quoted.quotation_id,
            title: quoted.title.clone(),
            start_date: None,
            end_date: None,
            amount: quoted.amount,
            notes: None,
        };
        let result = update_work_order(&db, quoted.id, moved).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(require_work_order(&db, quoted.id).await?.customer_id, acme.id);

        let order = create_test_work_order(&db, acme.id, "Exhibition").await?;
        let earned = create_revenue(
            &db,
            RevenueInput {
                code: None,
                customer_id: None,
                revenue_type_id: None,
                work_order_id: Some(order.id),
                amount: 500.0,
                date: date(2024, 5, 1),
                description: None,
            },
        )
        .await?;
        assert_eq!(earned.customer_id, Some(acme.id));

        update_work_order(
            &db,
            order.id,
            WorkOrderInput {
                code: None,
                customer_id: globex.id,
                quotation_id: None,
                title: "Exhibition".to_string(),
                start_date: None,
                end_date: None,
                amount: order.amount,
                notes: None,
            },
        )
        .await?;
        assert_eq!(require_revenue(&db, earned.id).await?.customer_id, Some(globex.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_status_flow_and_delete_guard() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Acme").await?;
        let order = create_test_work_order(&db, customer.id, "Wedding").await?;

        let result = set_work_order_status(&db, order.id, WorkOrderStatus::Completed).await;
        assert!(matches!(result, Err(Error::InvalidStatusTransition { .. })));
        set_work_order_status(&db, order.id, WorkOrderStatus::InProgress).await?;
        set_work_order_status(&db, order.id, WorkOrderStatus::Completed).await?;

        create_test_review(&db, customer.id, Some(order.id), 5).await?;
        let result = delete_work_order(&db, order.id).await;
        assert!(matches!(result, Err(Error::HasDependents { .. })));

        let spare = create_test_work_order(&db, customer.id, "Spare").await?;
        delete_work_order(&db, spare.id).await?;

        let page = list_work_orders(
            &db,
            &WorkOrderFilter {
                status: Some(WorkOrderStatus::Completed),
                ..Default::default()
            },
            &PageParams::default(),
        )
        .await?;
        assert_eq!(page.total, 1);
        Ok(())
    }
}
