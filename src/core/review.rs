//! Customer reviews.

use crate::{
    core::{
        customer::require_customer,
        pagination::{self, Page, PageParams},
        validate,
        work_order::require_work_order,
    },
    entities::{CustomerReview, customer_review},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

const ENTITY: &str = "review";

/// Fields accepted when recording a review.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    /// Customer giving the review
    pub customer_id: i64,
    /// Must belong to `customer_id`
    pub work_order_id: Option<i64>,
    /// 1 (worst) to 5 (best)
    pub rating: i32,
    /// Free-form comment
    pub comment: Option<String>,
}

/// Lists reviews, newest first.
pub async fn list_reviews(
    db: &DatabaseConnection,
    customer_id: Option<i64>,
    params: &PageParams,
) -> Result<Page<customer_review::Model>> {
    let mut query = CustomerReview::find().order_by_desc(customer_review::Column::Id);
    if let Some(customer_id) = customer_id {
        query = query.filter(customer_review::Column::CustomerId.eq(customer_id));
    }
    pagination::fetch_page(db, query, params).await
}

/// Records a customer's review.
#[instrument(skip(db, input), fields(customer_id = input.customer_id, rating = input.rating))]
pub async fn create_review(
    db: &DatabaseConnection,
    input: ReviewInput,
) -> Result<customer_review::Model> {
    if !(1..=5).contains(&input.rating) {
        return Err(Error::validation(format!(
            "Rating must be between 1 and 5, got {}",
            input.rating
        )));
    }

    require_customer(db, input.customer_id).await?;
    if let Some(work_order_id) = input.work_order_id {
        let order = require_work_order(db, work_order_id).await?;
        if order.customer_id != input.customer_id {
            return Err(Error::validation(format!(
                "Work order {} was not done for this customer",
                order.code
            )));
        }
    }

    let model = customer_review::ActiveModel {
        customer_id: Set(input.customer_id),
        work_order_id: Set(input.work_order_id),
        rating: Set(input.rating),
        comment: Set(validate::optional_text(input.comment)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(review_id = model.id, "review recorded");
    Ok(model)
}

/// Deletes a review.
#[instrument(skip(db))]
pub async fn delete_review(db: &DatabaseConnection, review_id: i64) -> Result<()> {
    let review = CustomerReview::find_by_id(review_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, review_id))?;
    review.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_rating_bounds() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Acme").await?;

        for rating in [0, 6, -1] {
            let result = create_test_review(&db, customer.id, None, rating).await;
            assert!(matches!(result, Err(Error::Validation { .. })));
        }
        let review = create_test_review(&db, customer.id, None, 4).await?;
        assert_eq!(review.rating, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_work_order_must_match_customer() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Acme").await?;
        let other = create_test_customer(&db, "Globex").await?;
        let order = create_test_work_order(&db, other.id, "Launch").await?;

        let result = create_test_review(&db, customer.id, Some(order.id), 5).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        create_test_review(&db, other.id, Some(order.id), 5).await?;
        let page = list_reviews(&db, Some(other.id), &PageParams::default()).await?;
        assert_eq!(page.total, 1);

        delete_review(&db, page.data[0].id).await?;
        assert!(matches!(
            delete_review(&db, page.data[0].id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }
}
