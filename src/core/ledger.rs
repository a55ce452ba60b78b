//! Running-balance ledger over revenues and expenses, plus period summaries.
//!
//! [`build_ledger`] is pure so the ordering and balance rules can be tested
//! without a database; [`compute_ledger`] feeds it from the tables.

use crate::{
    core::validate,
    entities::{Expense, PaymentVoucher, ReceiptVoucher, Revenue, expense, payment_voucher, receipt_voucher, revenue},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{QuerySelect, prelude::*};
use serde::Serialize;
use std::cmp::Ordering;

/// Which side of the ledger an entry sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Money in
    Revenue,
    /// Money out
    Expense,
}

impl EntryKind {
    /// Revenues sort before expenses on the same day.
    const fn rank(self) -> u8 {
        match self {
            Self::Revenue => 0,
            Self::Expense => 1,
        }
    }
}

/// One revenue or expense fed into [`build_ledger`].
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// Row id, used as the final tie-breaker
    pub id: i64,
    /// Revenue or expense
    pub kind: EntryKind,
    /// Booking date
    pub date: NaiveDate,
    /// `REV-…` or `EXP-…`
    pub code: String,
    /// Free-form description
    pub description: Option<String>,
    /// Always positive
    pub amount: f64,
}

impl From<revenue::Model> for LedgerEntry {
    fn from(model: revenue::Model) -> Self {
        Self {
            id: model.id,
            kind: EntryKind::Revenue,
            date: model.date,
            code: model.code,
            description: model.description,
            amount: model.amount,
        }
    }
}

impl From<expense::Model> for LedgerEntry {
    fn from(model: expense::Model) -> Self {
        Self {
            id: model.id,
            kind: EntryKind::Expense,
            date: model.date,
            code: model.code,
            description: model.description,
            amount: model.amount,
        }
    }
}

/// One ledger line with the balance after it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    /// Booking date
    pub date: NaiveDate,
    /// Revenue or expense
    pub kind: EntryKind,
    /// Code of the booked record
    pub code: String,
    /// Description of the booked record
    pub description: Option<String>,
    /// Amount in (revenues), zero for expenses
    pub credit: f64,
    /// Amount out (expenses), zero for revenues
    pub debit: f64,
    /// Running balance after this line
    pub balance: f64,
}

/// A ledger for a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ledger {
    /// Balance carried in from before the period
    pub opening_balance: f64,
    /// Lines of the period in date order
    pub rows: Vec<LedgerRow>,
    /// Sum of credits
    pub total_in: f64,
    /// Sum of debits
    pub total_out: f64,
    /// `opening_balance + total_in - total_out`
    pub closing_balance: f64,
}

/// Money in and out over a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    /// First day of the period, open when absent
    pub from: Option<NaiveDate>,
    /// Last day of the period, open when absent
    pub to: Option<NaiveDate>,
    /// Sum of revenues
    pub total_revenue: f64,
    /// Sum of expenses
    pub total_expense: f64,
    /// `total_revenue - total_expense`
    pub net_profit: f64,
    /// Sum of receipt vouchers
    pub total_receipts: f64,
    /// Sum of payment vouchers
    pub total_payments: f64,
}

fn entry_order(a: &LedgerEntry, b: &LedgerEntry) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.kind.rank().cmp(&b.kind.rank()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Orders `entries` and walks them, keeping a running balance from `opening`.
#[must_use]
pub fn build_ledger(opening: f64, mut entries: Vec<LedgerEntry>) -> Ledger {
    entries.sort_by(entry_order);

    let mut balance = validate::round2(opening);
    let mut total_in = 0.0;
    let mut total_out = 0.0;

    let rows = entries
        .into_iter()
        .map(|entry| {
            let (credit, debit) = match entry.kind {
                EntryKind::Revenue => (entry.amount, 0.0),
                EntryKind::Expense => (0.0, entry.amount),
            };
            total_in += credit;
            total_out += debit;
            balance = validate::round2(balance + credit - debit);
            LedgerRow {
                date: entry.date,
                kind: entry.kind,
                code: entry.code,
                description: entry.description,
                credit,
                debit,
                balance,
            }
        })
        .collect();

    let opening_balance = validate::round2(opening);
    let total_in = validate::round2(total_in);
    let total_out = validate::round2(total_out);
    Ledger {
        opening_balance,
        rows,
        total_in,
        total_out,
        closing_balance: validate::round2(opening_balance + total_in - total_out),
    }
}

async fn sum_amounts<E>(
    db: &DatabaseConnection,
    amount: E::Column,
    date: E::Column,
    from: Option<NaiveDate>,
    to_exclusive: Option<NaiveDate>,
    to_inclusive: Option<NaiveDate>,
) -> Result<f64>
where
    E: EntityTrait,
{
    let mut query = E::find().select_only().column(amount);
    if let Some(from) = from {
        query = query.filter(date.gte(from));
    }
    if let Some(to) = to_exclusive {
        query = query.filter(date.lt(to));
    }
    if let Some(to) = to_inclusive {
        query = query.filter(date.lte(to));
    }
    let amounts: Vec<f64> = query.into_tuple().all(db).await?;
    Ok(validate::round2(amounts.iter().sum()))
}

/// Builds the ledger of revenues and expenses dated within `[from, to]`.
///
/// The opening balance is everything booked strictly before `from` (zero
/// without a `from`).
pub async fn compute_ledger(
    db: &DatabaseConnection,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Ledger> {
    validate::date_order(from, to, "Ledger range")?;

    let opening = match from {
        Some(from) => {
            let earlier_in = sum_amounts::<Revenue>(
                db,
                revenue::Column::Amount,
                revenue::Column::Date,
                None,
                Some(from),
                None,
            )
            .await?;
            let earlier_out = sum_amounts::<Expense>(
                db,
                expense::Column::Amount,
                expense::Column::Date,
                None,
                Some(from),
                None,
            )
            .await?;
            earlier_in - earlier_out
        }
        None => 0.0,
    };

    let mut revenues = Revenue::find();
    let mut expenses = Expense::find();
    if let Some(from) = from {
        revenues = revenues.filter(revenue::Column::Date.gte(from));
        expenses = expenses.filter(expense::Column::Date.gte(from));
    }
    if let Some(to) = to {
        revenues = revenues.filter(revenue::Column::Date.lte(to));
        expenses = expenses.filter(expense::Column::Date.lte(to));
    }

    let mut entries: Vec<LedgerEntry> = revenues
        .all(db)
        .await?
        .into_iter()
        .map(LedgerEntry::from)
        .collect();
    entries.extend(expenses.all(db).await?.into_iter().map(LedgerEntry::from));

    Ok(build_ledger(opening, entries))
}

/// Totals revenue, expense, receipts, and payments dated within `[from, to]`.
pub async fn period_summary(
    db: &DatabaseConnection,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<PeriodSummary> {
    validate::date_order(from, to, "Summary range")?;

    let total_revenue =
        sum_amounts::<Revenue>(db, revenue::Column::Amount, revenue::Column::Date, from, None, to)
            .await?;
    let total_expense =
        sum_amounts::<Expense>(db, expense::Column::Amount, expense::Column::Date, from, None, to)
            .await?;
    let total_receipts = sum_amounts::<ReceiptVoucher>(
        db,
        receipt_voucher::Column::Amount,
        receipt_voucher::Column::Date,
        from,
        None,
        to,
    )
    .await?;
    let total_payments = sum_amounts::<PaymentVoucher>(
        db,
        payment_voucher::Column::Amount,
        payment_voucher::Column::Date,
        from,
        None,
        to,
    )
    .await?;

    Ok(PeriodSummary {
        from,
        to,
        total_revenue,
        total_expense,
        net_profit: validate::round2(total_revenue - total_expense),
        total_receipts,
        total_payments,
    })
}
