//! Human-readable record codes such as `CUS-0007` or `RV-0142`.
//!
//! New codes are allocated by scanning the existing codes of a table for the
//! `PREFIX-<digits>` pattern and taking the highest number plus one. Codes that
//! were typed by hand and do not follow the pattern are ignored by the scan.

use crate::errors::{Error, Result};
use regex::Regex;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};

/// Prefix used for customer codes
pub const CUSTOMER: &str = "CUS";
/// Prefix used for supplier codes
pub const SUPPLIER: &str = "SUP";
/// Prefix used for employee codes
pub const EMPLOYEE: &str = "EMP";
/// Prefix used for partner codes
pub const PARTNER: &str = "PRT";
/// Prefix used for quotation codes
pub const QUOTATION: &str = "QUO";
/// Prefix used for work order codes
pub const WORK_ORDER: &str = "WO";
/// Prefix used for revenue codes
pub const REVENUE: &str = "REV";
/// Prefix used for expense codes
pub const EXPENSE: &str = "EXP";
/// Prefix used for receipt voucher codes
pub const RECEIPT_VOUCHER: &str = "RV";
/// Prefix used for payment voucher codes
pub const PAYMENT_VOUCHER: &str = "PV";

/// Computes the next code for `prefix` given the codes already in use.
///
/// Numbers are zero-padded to four digits; larger numbers simply grow wider.
/// Fails with [`Error::Conflict`] when the highest number in use cannot be
/// incremented.
pub fn next_code<'a, I>(existing: I, prefix: &str) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let pattern = Regex::new(&format!(r"^{}-(\d+)$", regex::escape(prefix))).map_err(|e| {
        Error::Config {
            message: format!("Invalid code prefix '{prefix}': {e}"),
        }
    })?;

    let max = existing
        .into_iter()
        .filter_map(|code| pattern.captures(code.trim()))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    let next = max.checked_add(1).ok_or_else(|| Error::Conflict {
        message: format!("No {prefix} code left after {prefix}-{max}"),
    })?;
    Ok(format!("{prefix}-{next:04}"))
}

/// Reads every code of `column` that starts with `prefix` and returns the next free one.
pub async fn next_code_for<E, Conn>(db: &Conn, column: E::Column, prefix: &str) -> Result<String>
where
    E: EntityTrait,
    Conn: ConnectionTrait,
{
    let codes: Vec<String> = E::find()
        .select_only()
        .column(column)
        .filter(column.starts_with(format!("{prefix}-")))
        .into_tuple()
        .all(db)
        .await?;

    next_code(codes.iter().map(String::as_str), prefix)
}

/// Returns `true` when a row (other than the excluded `(id column, id)`) already uses `code`.
pub async fn code_taken<E, Conn>(
    db: &Conn,
    column: E::Column,
    code: &str,
    exclude: Option<(E::Column, i64)>,
) -> Result<bool>
where
    E: EntityTrait,
    Conn: ConnectionTrait,
{
    let mut query = E::find().filter(column.eq(code));
    if let Some((id_column, id)) = exclude {
        query = query.filter(id_column.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

/// Picks the code for a new row: the caller's code if given (trimmed and checked
/// for uniqueness) or a freshly generated one.
pub async fn resolve_new_code<E, Conn>(
    db: &Conn,
    column: E::Column,
    prefix: &str,
    requested: Option<&str>,
    entity: &'static str,
) -> Result<String>
where
    E: EntityTrait,
    Conn: ConnectionTrait,
{
    match requested.map(str::trim).filter(|code| !code.is_empty()) {
        Some(code) => {
            if code_taken::<E, Conn>(db, column, code, None).await? {
                return Err(Error::DuplicateCode {
                    entity,
                    code: code.to_string(),
                });
            }
            Ok(code.to_string())
        }
        None => next_code_for::<E, Conn>(db, column, prefix).await,
    }
}
