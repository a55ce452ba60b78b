//! Shareen - distribution of a period's net profit between the partners.
//!
//! Each partner is owed `net_profit * share_percentage / 100` for the period.
//! Recording a distribution only writes the shareen rows; partner capital is
//! left alone.

use crate::{
    core::{
        ledger,
        pagination::{self, Page, PageParams},
        partner::get_all_partners,
        validate,
    },
    entities::{Shareen, partner, shareen},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

const ENTITY: &str = "shareen";

/// One partner's portion of the profit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerShare {
    /// Partner receiving the share
    pub partner_id: i64,
    /// Partner name at the time of the preview
    pub partner_name: String,
    /// Profit share in percent
    pub share_percentage: f64,
    /// Amount owed, rounded to cents
    pub amount: f64,
}

/// How a period's profit would be split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionPreview {
    /// First day of the period
    pub period_from: NaiveDate,
    /// Last day of the period
    pub period_to: NaiveDate,
    /// Revenue minus expense of the period
    pub net_profit: f64,
    /// One entry per partner, in partner code order
    pub shares: Vec<PartnerShare>,
    /// Sum of all shares
    pub distributed: f64,
    /// Profit not covered by any share (partner shares under 100 %)
    pub undistributed: f64,
}

/// Period to distribute, both ends inclusive.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DistributionPeriod {
    /// First day of the period
    pub period_from: NaiveDate,
    /// Last day of the period
    pub period_to: NaiveDate,
}

/// Splits `net_profit` between `partners` by share percentage.
///
/// A period without profit yields zero for everyone.
#[must_use]
pub fn split_profit(net_profit: f64, partners: &[partner::Model]) -> Vec<PartnerShare> {
    let distributable = net_profit.max(0.0);
    partners
        .iter()
        .map(|p| PartnerShare {
            partner_id: p.id,
            partner_name: p.name.clone(),
            share_percentage: p.share_percentage,
            amount: validate::round2(distributable * p.share_percentage / 100.0),
        })
        .collect()
}

/// Computes the distribution of `[period_from, period_to]` without writing anything.
pub async fn preview_distribution(
    db: &DatabaseConnection,
    period: DistributionPeriod,
) -> Result<DistributionPreview> {
    validate::date_order(
        Some(period.period_from),
        Some(period.period_to),
        "Distribution period",
    )?;

    let summary =
        ledger::period_summary(db, Some(period.period_from), Some(period.period_to)).await?;
    let partners = get_all_partners(db).await?;
    let shares = split_profit(summary.net_profit, &partners);
    let distributed = validate::round2(shares.iter().map(|s| s.amount).sum());

    Ok(DistributionPreview {
        period_from: period.period_from,
        period_to: period.period_to,
        net_profit: summary.net_profit,
        undistributed: validate::round2(summary.net_profit.max(0.0) - distributed),
        distributed,
        shares,
    })
}

/// Persists the distribution of a period, one row per partner whose share is
/// above zero.
///
/// Fails with [`Error::Conflict`] when the period was already recorded and with
/// [`Error::Validation`] when the period made no profit.
#[instrument(skip(db))]
pub async fn record_distribution(
    db: &DatabaseConnection,
    period: DistributionPeriod,
) -> Result<Vec<shareen::Model>> {
    let preview = preview_distribution(db, period).await?;
    if preview.net_profit <= 0.0 {
        return Err(Error::validation(format!(
            "No profit to distribute for {} to {} (net {:.2})",
            period.period_from, period.period_to, preview.net_profit
        )));
    }

    let txn = db.begin().await?;

    let already = Shareen::find()
        .filter(shareen::Column::PeriodFrom.eq(period.period_from))
        .filter(shareen::Column::PeriodTo.eq(period.period_to))
        .one(&txn)
        .await?;
    if already.is_some() {
        return Err(Error::Conflict {
            message: format!(
                "Profit for {} to {} has already been distributed",
                period.period_from, period.period_to
            ),
        });
    }

    let now = chrono::Utc::now();
    let mut rows = Vec::new();
    for share in preview.shares.iter().filter(|s| s.amount > 0.0) {
        let row = shareen::ActiveModel {
            partner_id: Set(share.partner_id),
            period_from: Set(period.period_from),
            period_to: Set(period.period_to),
            net_profit: Set(preview.net_profit),
            share_percentage: Set(share.share_percentage),
            amount: Set(share.amount),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        rows.push(row);
    }

    txn.commit().await?;

    info!(
        partners = rows.len(),
        net_profit = preview.net_profit,
        distributed = preview.distributed,
        "profit distribution recorded"
    );
    Ok(rows)
}

/// Lists recorded distributions, newest period first.
pub async fn list_distributions(
    db: &DatabaseConnection,
    partner_id: Option<i64>,
    params: &PageParams,
) -> Result<Page<shareen::Model>> {
    let mut query = Shareen::find()
        .order_by_desc(shareen::Column::PeriodTo)
        .order_by_asc(shareen::Column::PartnerId);
    if let Some(partner_id) = partner_id {
        query = query.filter(shareen::Column::PartnerId.eq(partner_id));
    }
    pagination::fetch_page(db, query, params).await
}

/// Deletes one recorded distribution row.
#[instrument(skip(db))]
pub async fn delete_distribution(db: &DatabaseConnection, id: i64) -> Result<()> {
    let row = Shareen::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, id))?;
    row.delete(db).await?;
    Ok(())
}
