//! Revenue bookings.

use crate::{
    core::{
        catalog::require_revenue_type,
        codes,
        customer::require_customer,
        pagination::{self, Page, PageParams},
        validate,
        work_order::require_work_order,
    },
    entities::{Revenue, revenue},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

const ENTITY: &str = "revenue";

/// Fields accepted when creating or updating a revenue.
#[derive(Debug, Clone, Deserialize)]
pub struct RevenueInput {
    /// Explicit code; generated when absent on create, kept when absent on update
    pub code: Option<String>,
    /// Customer billed
    pub customer_id: Option<i64>,
    /// Revenue category
    pub revenue_type_id: Option<i64>,
    /// Job the revenue was earned on; supplies the customer when none is given
    pub work_order_id: Option<i64>,
    /// Amount earned
    pub amount: f64,
    /// Booking date
    pub date: NaiveDate,
    /// Free-form description
    pub description: Option<String>,
}

/// Filters for [`list_revenues`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevenueFilter {
    /// Dated on or after
    pub date_from: Option<NaiveDate>,
    /// Dated on or before
    pub date_to: Option<NaiveDate>,
    /// Only this category
    pub revenue_type_id: Option<i64>,
    /// Only this customer
    pub customer_id: Option<i64>,
    /// Only this work order
    pub work_order_id: Option<i64>,
}

/// Finds a revenue by primary key, failing with [`Error::NotFound`] when absent.
pub async fn require_revenue<C>(db: &C, revenue_id: i64) -> Result<revenue::Model>
where
    C: ConnectionTrait,
{
    Revenue::find_by_id(revenue_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, revenue_id))
}

/// Lists revenues, most recent date first.
pub async fn list_revenues(
    db: &DatabaseConnection,
    filter: &RevenueFilter,
    params: &PageParams,
) -> Result<Page<revenue::Model>> {
    validate::date_order(filter.date_from, filter.date_to, "Revenue date range")?;

    let mut query = Revenue::find()
        .order_by_desc(revenue::Column::Date)
        .order_by_desc(revenue::Column::Id);
    if let Some(from) = filter.date_from {
        query = query.filter(revenue::Column::Date.gte(from));
    }
    if let Some(to) = filter.date_to {
        query = query.filter(revenue::Column::Date.lte(to));
    }
    if let Some(type_id) = filter.revenue_type_id {
        query = query.filter(revenue::Column::RevenueTypeId.eq(type_id));
    }
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(revenue::Column::CustomerId.eq(customer_id));
    }
    if let Some(work_order_id) = filter.work_order_id {
        query = query.filter(revenue::Column::WorkOrderId.eq(work_order_id));
    }
    pagination::fetch_page(db, query, params).await
}

/// Checks the references and returns the customer the revenue belongs to.
async fn resolve_customer(db: &DatabaseConnection, input: &RevenueInput) -> Result<Option<i64>> {
    if let Some(type_id) = input.revenue_type_id {
        require_revenue_type(db, type_id).await?;
    }
    if let Some(customer_id) = input.customer_id {
        require_customer(db, customer_id).await?;
    }
    match input.work_order_id {
        Some(work_order_id) => {
            let order = require_work_order(db, work_order_id).await?;
            match input.customer_id {
                Some(customer_id) if customer_id != order.customer_id => {
                    Err(Error::validation(format!(
                        "Work order {} belongs to another customer",
                        order.code
                    )))
                }
                _ => Ok(Some(order.customer_id)),
            }
        }
        None => Ok(input.customer_id),
    }
}

/// Books a revenue.
#[instrument(skip(db, input), fields(amount = input.amount))]
pub async fn create_revenue(db: &DatabaseConnection, input: RevenueInput) -> Result<revenue::Model> {
    let amount = validate::round2(validate::positive_amount(input.amount)?);
    let customer_id = resolve_customer(db, &input).await?;
    let code = codes::resolve_new_code::<Revenue, _>(
        db,
        revenue::Column::Code,
        codes::REVENUE,
        input.code.as_deref(),
        ENTITY,
    )
    .await?;

    let model = revenue::ActiveModel {
        code: Set(code),
        customer_id: Set(customer_id),
        revenue_type_id: Set(input.revenue_type_id),
        work_order_id: Set(input.work_order_id),
        amount: Set(amount),
        date: Set(input.date),
        description: Set(validate::optional_text(input.description)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(revenue_id = model.id, code = %model.code, "revenue booked");
    Ok(model)
}

/// Replaces a revenue's fields.
#[instrument(skip(db, input))]
pub async fn update_revenue(
    db: &DatabaseConnection,
    revenue_id: i64,
    input: RevenueInput,
) -> Result<revenue::Model> {
    let amount = validate::round2(validate::positive_amount(input.amount)?);
    let existing = require_revenue(db, revenue_id).await?;
    let customer_id = resolve_customer(db, &input).await?;

    let code = match validate::optional_text(input.code) {
        Some(code) if code != existing.code => {
            if codes::code_taken::<Revenue, _>(
                db,
                revenue::Column::Code,
                &code,
                Some((revenue::Column::Id, revenue_id)),
            )
            .await?
            {
                return Err(Error::DuplicateCode { entity: ENTITY, code });
            }
            code
        }
        _ => existing.code.clone(),
    };

    let mut model: revenue::ActiveModel = existing.into();
    model.code = Set(code);
    model.customer_id = Set(customer_id);
    model.revenue_type_id = Set(input.revenue_type_id);
    model.work_order_id = Set(input.work_order_id);
    model.amount = Set(amount);
    model.date = Set(input.date);
    model.description = Set(validate::optional_text(input.description));

    model.update(db).await.map_err(Into::into)
}

/// Deletes a revenue.
#[instrument(skip(db))]
pub async fn delete_revenue(db: &DatabaseConnection, revenue_id: i64) -> Result<()> {
    require_revenue(db, revenue_id).await?.delete(db).await?;
    info!(revenue_id, "revenue deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn input(amount: f64, day: u32) -> RevenueInput {
        RevenueInput {
            code: None,
            customer_id: None,
            revenue_type_id: None,
            work_order_id: None,
            amount,
            date: date(2024, 7, day),
            description: Some("Booth rental".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_revenue_codes_and_amount() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_revenue(&db, input(100.0, 1)).await?;
        let second = create_revenue(&db, input(250.456, 2)).await?;
        assert_eq!(first.code, "REV-0001");
        assert_eq!(second.code, "REV-0002");
        assert_eq!(second.amount, 250.46);

        let result = create_revenue(&db, input(-5.0, 3)).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_work_order_supplies_customer() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Acme").await?;
        let other = create_test_customer(&db, "Globex").await?;
        let order = create_test_work_order(&db, customer.id, "Expo").await?;

        let mut linked = input(500.0, 5);
        linked.work_order_id = Some(order.id);
        let revenue = create_revenue(&db, linked.clone()).await?;
        assert_eq!(revenue.customer_id, Some(customer.id));

        linked.customer_id = Some(other.id);
        let result = create_revenue(&db, linked).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_and_update_and_delete() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Acme").await?;
        let early = create_test_revenue(&db, Some(customer.id), 100.0, date(2024, 7, 1)).await?;
        create_test_revenue(&db, None, 200.0, date(2024, 7, 15)).await?;

        let page = list_revenues(
            &db,
            &RevenueFilter {
                date_from: Some(date(2024, 7, 10)),
                ..Default::default()
            },
            &PageParams::default(),
        )
        .await?;
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].amount, 200.0);

        let updated = update_revenue(&db, early.id, input(120.0, 2)).await?;
        assert_eq!(updated.code, early.code);
        assert_eq!(updated.customer_id, None);

        delete_revenue(&db, early.id).await?;
        assert!(matches!(
            require_revenue(&db, early.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }
}
