//! Check details - paper checks attached to vouchers.
//!
//! Check rows are only ever created by voucher creation; the voucher module calls
//! [`insert_check`] inside its own transaction. Afterwards a check's life is its
//! clearing status.

use crate::{
    core::{
        pagination::{self, Page, PageParams},
        validate,
    },
    entities::{
        CheckDetail, check_detail,
        sea_orm_active_enums::{CheckDirection, CheckStatus},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Iterable, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

const ENTITY: &str = "check";

/// Check details supplied with a voucher paid by check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckInput {
    /// Number printed on the check
    pub check_number: String,
    /// Drawee bank
    pub bank_name: String,
    /// Date the check can be cashed
    pub due_date: NaiveDate,
}

/// Filters for [`list_checks`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckFilter {
    /// Only checks in this status
    pub status: Option<CheckStatus>,
    /// Only incoming or only outgoing checks
    pub direction: Option<CheckDirection>,
    /// Due on or after
    pub due_from: Option<NaiveDate>,
    /// Due on or before
    pub due_to: Option<NaiveDate>,
}

/// Count and face value of the checks in one status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckStatusTotal {
    /// The status
    pub status: CheckStatus,
    /// Number of checks
    pub count: u64,
    /// Sum of their amounts
    pub amount: f64,
}

/// Aggregate view of all checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckStats {
    /// One entry per status, in workflow order
    pub by_status: Vec<CheckStatusTotal>,
    /// Pending checks due before the reference day
    pub overdue_count: u64,
    /// Amount of the overdue checks
    pub overdue_amount: f64,
}

/// Inserts a pending check row for a voucher of `amount`.
pub(crate) async fn insert_check<C>(
    db: &C,
    input: CheckInput,
    amount: f64,
    direction: CheckDirection,
) -> Result<check_detail::Model>
where
    C: ConnectionTrait,
{
    let check_number = validate::required_text(&input.check_number, "Check number")?;
    let bank_name = validate::required_text(&input.bank_name, "Bank name")?;
    let amount = validate::positive_amount(amount)?;

    check_detail::ActiveModel {
        check_number: Set(check_number),
        bank_name: Set(bank_name),
        due_date: Set(input.due_date),
        amount: Set(amount),
        direction: Set(direction),
        status: Set(CheckStatus::Pending),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds a check by primary key, failing with [`Error::NotFound`] when absent.
pub async fn require_check<C>(db: &C, check_id: i64) -> Result<check_detail::Model>
where
    C: ConnectionTrait,
{
    CheckDetail::find_by_id(check_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, check_id))
}

/// Lists checks ordered by due date.
pub async fn list_checks(
    db: &DatabaseConnection,
    filter: &CheckFilter,
    params: &PageParams,
) -> Result<Page<check_detail::Model>> {
    let mut query = CheckDetail::find()
        .order_by_asc(check_detail::Column::DueDate)
        .order_by_asc(check_detail::Column::Id);
    if let Some(status) = filter.status {
        query = query.filter(check_detail::Column::Status.eq(status));
    }
    if let Some(direction) = filter.direction {
        query = query.filter(check_detail::Column::Direction.eq(direction));
    }
    if let Some(from) = filter.due_from {
        query = query.filter(check_detail::Column::DueDate.gte(from));
    }
    if let Some(to) = filter.due_to {
        query = query.filter(check_detail::Column::DueDate.lte(to));
    }
    pagination::fetch_page(db, query, params).await
}

/// Moves a pending check to `cleared`, `bounced`, or `cancelled`.
///
/// Settled checks are final; any other change fails with
/// [`Error::InvalidStatusTransition`].
#[instrument(skip(db))]
pub async fn set_check_status(
    db: &DatabaseConnection,
    check_id: i64,
    status: CheckStatus,
) -> Result<check_detail::Model> {
    let check = require_check(db, check_id).await?;
    if check.status != CheckStatus::Pending || status == CheckStatus::Pending {
        return Err(Error::InvalidStatusTransition {
            entity: ENTITY,
            from: check.status.to_string(),
            to: status.to_string(),
        });
    }

    let mut model: check_detail::ActiveModel = check.into();
    model.status = Set(status);
    let updated = model.update(db).await?;
    info!(check_id, status = %status, "check status changed");
    Ok(updated)
}

/// Counts checks per status and the pending ones already past due on `today`.
pub async fn check_stats(db: &DatabaseConnection, today: NaiveDate) -> Result<CheckStats> {
    let checks = CheckDetail::find().all(db).await?;

    let by_status = CheckStatus::iter()
        .map(|status| {
            let matching = checks.iter().filter(|c| c.status == status);
            CheckStatusTotal {
                status,
                count: matching.clone().count() as u64,
                amount: validate::round2(matching.map(|c| c.amount).sum()),
            }
        })
        .collect();

    let overdue: Vec<&check_detail::Model> = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Pending && c.due_date < today)
        .collect();

    Ok(CheckStats {
        by_status,
        overdue_count: overdue.len() as u64,
        overdue_amount: validate::round2(overdue.iter().map(|c| c.amount).sum()),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn input(number: &str, due: NaiveDate) -> CheckInput {
        CheckInput {
            check_number: number.to_string(),
            bank_name: "Al Rajhi".to_string(),
            due_date: due,
        }
    }

    #[tokio::test]
    async fn test_insert_check_is_pending() -> Result<()> {
        let db = setup_test_db().await?;
        let check = insert_check(
            &db,
            input("100234", date(2024, 3, 1)),
            750.0,
            CheckDirection::Incoming,
        )
        .await?;
        assert_eq!(check.status, CheckStatus::Pending);
        assert_eq!(check.amount, 750.0);

        let result = insert_check(
            &db,
            input("  ", date(2024, 3, 1)),
            750.0,
            CheckDirection::Incoming,
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_status_only_leaves_pending_once() -> Result<()> {
        let db = setup_test_db().await?;
        let check = insert_check(
            &db,
            input("1", date(2024, 3, 1)),
            100.0,
            CheckDirection::Outgoing,
        )
        .await?;

        let cleared = set_check_status(&db, check.id, CheckStatus::Cleared).await?;
        assert_eq!(cleared.status, CheckStatus::Cleared);

        let result = set_check_status(&db, check.id, CheckStatus::Bounced).await;
        assert!(matches!(result, Err(Error::InvalidStatusTransition { .. })));

        let other = insert_check(
            &db,
            input("2", date(2024, 3, 1)),
            100.0,
            CheckDirection::Outgoing,
        )
        .await?;
        let result = set_check_status(&db, other.id, CheckStatus::Pending).await;
        assert!(matches!(result, Err(Error::InvalidStatusTransition { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_check_stats_and_filters() -> Result<()> {
        let db = setup_test_db().await?;
        insert_check(&db, input("1", date(2024, 1, 10)), 100.0, CheckDirection::Incoming).await?;
        insert_check(&db, input("2", date(2024, 2, 10)), 250.0, CheckDirection::Incoming).await?;
        let bounced =
            insert_check(&db, input("3", date(2024, 1, 5)), 40.0, CheckDirection::Outgoing)
                .await?;
        set_check_status(&db, bounced.id, CheckStatus::Bounced).await?;

        let stats = check_stats(&db, date(2024, 2, 1)).await?;
        let pending = &stats.by_status[0];
        assert_eq!(pending.status, CheckStatus::Pending);
        assert_eq!(pending.count, 2);
        assert_eq!(pending.amount, 350.0);
        assert_eq!(stats.overdue_count, 1);
        assert_eq!(stats.overdue_amount, 100.0);

        let incoming = list_checks(
            &db,
            &CheckFilter {
                direction: Some(CheckDirection::Incoming),
                due_from: Some(date(2024, 2, 1)),
                ..Default::default()
            },
            &PageParams::default(),
        )
        .await?;
        assert_eq!(incoming.total, 1);
        assert_eq!(incoming.data[0].check_number, "2");
        Ok(())
    }
}
