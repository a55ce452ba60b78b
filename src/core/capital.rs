//! Partner capital - the one balance the system keeps denormalized.
//!
//! For every partner:
//!
//! ```text
//! current_capital = initial_capital
//!                 + Σ receipt vouchers (source = partner_capital)
//!                 − Σ payment vouchers (beneficiary = partner_withdrawal)
//! ```
//!
//! Vouchers move `current_capital` with [`adjust_capital`] inside the same
//! database transaction that writes the voucher. [`reconcile_partner`] rebuilds
//! the stored value from the vouchers when it has drifted.

use crate::{
    core::{partner::require_partner, validate},
    entities::{
        PaymentVoucher, ReceiptVoucher, partner, payment_voucher,
        sea_orm_active_enums::{PaymentBeneficiary, ReceiptSource},
        receipt_voucher,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{info, instrument, warn};

/// Stored and computed capital differing by less than this are considered equal.
const CAPITAL_TOLERANCE: f64 = 0.005;

/// Outcome of rebuilding one partner's stored capital.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapitalReconciliation {
    /// Partner that was checked
    pub partner_id: i64,
    /// Value stored before reconciliation
    pub stored_capital: f64,
    /// Value computed from the vouchers
    pub computed_capital: f64,
    /// Whether the stored value had to be rewritten
    pub corrected: bool,
}

/// Direction of a capital movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapitalMovement {
    /// Money put in by the partner
    Contribution,
    /// Money taken out by the partner
    Withdrawal,
}

/// One line of a partner's capital statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapitalEntry {
    /// Voucher date
    pub date: NaiveDate,
    /// Voucher code (`RV-…` or `PV-…`)
    pub voucher_code: String,
    /// Contribution or withdrawal
    pub movement: CapitalMovement,
    /// Voucher amount (always positive)
    pub amount: f64,
    /// Capital after this movement
    pub balance: f64,
}

/// A partner's capital history with running balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapitalStatement {
    /// The partner
    pub partner: partner::Model,
    /// Starting point of the statement
    pub initial_capital: f64,
    /// Movements in date order
    pub entries: Vec<CapitalEntry>,
    /// Capital after the last movement
    pub closing_capital: f64,
}

/// Atomically moves a partner's `current_capital` by `delta`.
///
/// Runs a single `UPDATE partners SET current_capital = current_capital + delta`
/// whose `WHERE` clause also requires the result to stay non-negative, so
/// concurrent vouchers can neither lose updates nor overdraw the partner.
/// Fails with [`Error::InsufficientCapital`] when no row qualified.
///
/// # Arguments
/// * `db` - Database connection or transaction
/// * `partner_id` - Partner whose capital moves
/// * `delta` - Amount to add (negative to subtract)
///
/// # Returns
/// The updated partner model
pub async fn adjust_capital<C>(db: &C, partner_id: i64, delta: f64) -> Result<partner::Model>
where
    C: ConnectionTrait,
{
    let result = crate::entities::Partner::update_many()
        .col_expr(
            partner::Column::CurrentCapital,
            Expr::col(partner::Column::CurrentCapital).add(delta),
        )
        .filter(partner::Column::Id.eq(partner_id))
        .filter(
            Expr::expr(Expr::col(partner::Column::CurrentCapital).add(delta))
                .gte(-CAPITAL_TOLERANCE),
        )
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        // Either the partner is missing or the guard refused the movement
        let partner = require_partner(db, partner_id).await?;
        return Err(Error::InsufficientCapital {
            partner_id,
            available: partner.current_capital,
            required: -delta,
        });
    }

    require_partner(db, partner_id).await
}

async fn capital_receipts<C>(db: &C, partner_id: i64) -> Result<Vec<receipt_voucher::Model>>
where
    C: ConnectionTrait,
{
    ReceiptVoucher::find()
        .filter(receipt_voucher::Column::PartnerId.eq(partner_id))
        .filter(receipt_voucher::Column::Source.eq(ReceiptSource::PartnerCapital))
        .order_by_asc(receipt_voucher::Column::Date)
        .order_by_asc(receipt_voucher::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn capital_withdrawals<C>(db: &C, partner_id: i64) -> Result<Vec<payment_voucher::Model>>
where
    C: ConnectionTrait,
{
    PaymentVoucher::find()
        .filter(payment_voucher::Column::PartnerId.eq(partner_id))
        .filter(payment_voucher::Column::Beneficiary.eq(PaymentBeneficiary::PartnerWithdrawal))
        .order_by_asc(payment_voucher::Column::Date)
        .order_by_asc(payment_voucher::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Computes a partner's capital from `initial_capital` and the capital vouchers.
pub async fn compute_capital<C>(db: &C, partner_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let partner = require_partner(db, partner_id).await?;
    let contributed: f64 = capital_receipts(db, partner_id)
        .await?
        .iter()
        .map(|v| v.amount)
        .sum();
    let withdrawn: f64 = capital_withdrawals(db, partner_id)
        .await?
        .iter()
        .map(|v| v.amount)
        .sum();

    Ok(validate::round2(
        partner.initial_capital + contributed - withdrawn,
    ))
}

/// Rewrites a partner's stored capital from the vouchers if it drifted.
#[instrument(skip(db))]
pub async fn reconcile_partner(
    db: &DatabaseConnection,
    partner_id: i64,
) -> Result<CapitalReconciliation> {
    let txn = db.begin().await?;

    let partner = require_partner(&txn, partner_id).await?;
    let computed = compute_capital(&txn, partner_id).await?;
    let stored = partner.current_capital;
    let corrected = (stored - computed).abs() >= CAPITAL_TOLERANCE;

    if corrected {
        warn!(partner_id, stored, computed, "partner capital drifted, correcting");
        let mut model: partner::ActiveModel = partner.into();
        model.current_capital = Set(computed);
        model.update(&txn).await?;
    }

    txn.commit().await?;

    Ok(CapitalReconciliation {
        partner_id,
        stored_capital: stored,
        computed_capital: computed,
        corrected,
    })
}

/// Reconciles every partner.
#[instrument(skip(db))]
pub async fn reconcile_all(db: &DatabaseConnection) -> Result<Vec<CapitalReconciliation>> {
    let partners = crate::core::partner::get_all_partners(db).await?;
    let mut results = Vec::with_capacity(partners.len());
    for partner in partners {
        results.push(reconcile_partner(db, partner.id).await?);
    }

    let corrected = results.iter().filter(|r| r.corrected).count();
    info!(partners = results.len(), corrected, "capital reconciliation finished");
    Ok(results)
}

/// Builds a partner's capital statement: initial capital followed by every
/// capital voucher in date order with the running balance.
pub async fn capital_statement(
    db: &DatabaseConnection,
    partner_id: i64,
) -> Result<CapitalStatement> {
    let partner = require_partner(db, partner_id).await?;

    let mut movements: Vec<(NaiveDate, i64, String, CapitalMovement, f64)> = Vec::new();
    for v in capital_receipts(db, partner_id).await? {
        movements.push((v.date, v.id, v.code, CapitalMovement::Contribution, v.amount));
    }
    for v in capital_withdrawals(db, partner_id).await? {
        movements.push((v.date, v.id, v.code, CapitalMovement::Withdrawal, v.amount));
    }
    // Same-day contributions come before withdrawals
    movements.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| match (a.3, b.3) {
                (CapitalMovement::Contribution, CapitalMovement::Withdrawal) => Ordering::Less,
                (CapitalMovement::Withdrawal, CapitalMovement::Contribution) => Ordering::Greater,
                _ => Ordering::Equal,
            })
            .then_with(|| a.1.cmp(&b.1))
    });

    let mut balance = partner.initial_capital;
    let entries = movements
        .into_iter()
        .map(|(date, _, voucher_code, movement, amount)| {
            balance = validate::round2(match movement {
                CapitalMovement::Contribution => balance + amount,
                CapitalMovement::Withdrawal => balance - amount,
            });
            CapitalEntry {
                date,
                voucher_code,
                movement,
                amount,
                balance,
            }
        })
        .collect();

    Ok(CapitalStatement {
        initial_capital: partner.initial_capital,
        closing_capital: balance,
        partner,
        entries,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_adjust_capital() -> Result<()> {
        let db = setup_test_db().await?;
        let partner = create_test_partner(&db, "Khalid", 50.0, 1_000.0).await?;

        let updated = adjust_capital(&db, partner.id, 250.0).await?;
        assert_eq!(updated.current_capital, 1_250.0);

        let updated = adjust_capital(&db, partner.id, -1_250.0).await?;
        assert_eq!(updated.current_capital, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_capital_refuses_negative_result() -> Result<()> {
        let db = setup_test_db().await?;
        let partner = create_test_partner(&db, "Khalid", 50.0, 100.0).await?;

        let result = adjust_capital(&db, partner.id, -100.01).await;
        assert!(matches!(
            result,
            Err(Error::InsufficientCapital {
                available: 100.0,
                ..
            })
        ));

        let unchanged = require_partner(&db, partner.id).await?;
        assert_eq!(unchanged.current_capital, 100.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_second_withdrawal_sees_first() -> Result<()> {
        let db = setup_test_db().await?;
        let partner = create_test_partner(&db, "Khalid", 50.0, 1_000.0).await?;

        // Each withdrawal fits the starting balance, together they do not
        adjust_capital(&db, partner.id, -600.0).await?;
        let result = adjust_capital(&db, partner.id, -600.0).await;
        assert!(matches!(
            result,
            Err(Error::InsufficientCapital {
                available: 400.0,
                ..
            })
        ));
        assert_eq!(require_partner(&db, partner.id).await?.current_capital, 400.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_adjust_capital_unknown_partner() -> Result<()> {
        let db = setup_test_db().await?;
        let result = adjust_capital(&db, 42, 10.0).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "partner",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_reconcile_repairs_drift() -> Result<()> {
        let db = setup_test_db().await?;
        let partner = create_test_partner(&db, "Khalid", 50.0, 1_000.0).await?;
        create_test_capital_receipt(&db, partner.id, 500.0).await?;

        // Corrupt the stored value behind the service's back
        let mut model: partner::ActiveModel = require_partner(&db, partner.id).await?.into();
        model.current_capital = Set(42.0);
        model.update(&db).await?;

        let result = reconcile_partner(&db, partner.id).await?;
        assert!(result.corrected);
        assert_eq!(result.stored_capital, 42.0);
        assert_eq!(result.computed_capital, 1_500.0);
        assert_eq!(
            require_partner(&db, partner.id).await?.current_capital,
            1_500.0
        );

        let again = reconcile_all(&db).await?;
        assert_eq!(again.len(), 1);
        assert!(!again[0].corrected);
        Ok(())
    }

    #[tokio::test]
    async fn test_capital_statement_running_balance() -> Result<()> {
        let db = setup_test_db().await?;
        let partner = create_test_partner(&db, "Khalid", 50.0, 1_000.0).await?;
        create_dated_capital_withdrawal(&db, partner.id, 300.0, date(2024, 2, 1)).await?;
        create_dated_capital_receipt(&db, partner.id, 500.0, date(2024, 1, 15)).await?;
        create_dated_capital_receipt(&db, partner.id, 200.0, date(2024, 2, 1)).await?;

        let statement = capital_statement(&db, partner.id).await?;
        let balances: Vec<f64> = statement.entries.iter().map(|e| e.balance).collect();
        let movements: Vec<CapitalMovement> =
            statement.entries.iter().map(|e| e.movement).collect();

        assert_eq!(balances, vec![1_500.0, 1_700.0, 1_400.0]);
        assert_eq!(
            movements,
            vec![
                CapitalMovement::Contribution,
                CapitalMovement::Contribution,
                CapitalMovement::Withdrawal
            ]
        );
        assert_eq!(statement.closing_capital, 1_400.0);
        assert_eq!(
            require_partner(&db, partner.id).await?.current_capital,
            statement.closing_capital
        );
        Ok(())
    }
}
