//! User- and bill-scoped store queries backing the aggregation layer.
//!
//! These are the collaborator contracts of the core: plain entity queries,
//! no business logic. Amount sums are done in Rust with checked decimal
//! arithmetic rather than pushed into the database.

use chrono::NaiveDate;
use model::entities::{bill, transaction_journal};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::trace;

use crate::error::{ComputeError, Result};

/// Fetches the bills owned by `user_id`, optionally filtered on the active
/// flag.
pub async fn bills_for_user(
    db: &DatabaseConnection,
    user_id: i32,
    active: Option<bool>,
) -> Result<Vec<bill::Model>> {
    let mut query = bill::Entity::find().filter(bill::Column::OwnerId.eq(user_id));
    if let Some(active) = active {
        query = query.filter(bill::Column::Active.eq(active));
    }
    let bills = query.all(db).await?;
    trace!(
        "Found {} bills for user {} (active filter: {:?})",
        bills.len(),
        user_id,
        active
    );
    Ok(bills)
}

pub async fn active_bills_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<bill::Model>> {
    bills_for_user(db, user_id, Some(true)).await
}

/// Counts journals linked to the bill dated within the half-open window
/// `[start, end)`. Used to decide whether a bill already fired in a
/// recurrence interval.
pub async fn count_journals_half_open(
    db: &DatabaseConnection,
    bill_id: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<u64> {
    let count = transaction_journal::Entity::find()
        .filter(transaction_journal::Column::BillId.eq(bill_id))
        .filter(transaction_journal::Column::Date.gte(start))
        .filter(transaction_journal::Column::Date.lt(end))
        .count(db)
        .await?;
    Ok(count)
}

/// Counts journals linked to the bill dated within `[start, end]` inclusive.
/// This is the "actual occurrence count" side of the reconciliation.
pub async fn count_journals_in_range(
    db: &DatabaseConnection,
    bill_id: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<u64> {
    let count = transaction_journal::Entity::find()
        .filter(transaction_journal::Column::BillId.eq(bill_id))
        .filter(transaction_journal::Column::Date.gte(start))
        .filter(transaction_journal::Column::Date.lte(end))
        .count(db)
        .await?;
    Ok(count)
}

/// Fetches the signed amounts of negative (expense) journals linked to the
/// bill within `[start, end]` inclusive.
pub async fn negative_amounts_in_range(
    db: &DatabaseConnection,
    bill_id: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Decimal>> {
    let journals = transaction_journal::Entity::find()
        .filter(transaction_journal::Column::BillId.eq(bill_id))
        .filter(transaction_journal::Column::Date.gte(start))
        .filter(transaction_journal::Column::Date.lte(end))
        .filter(transaction_journal::Column::Amount.lt(Decimal::ZERO))
        .all(db)
        .await?;
    Ok(journals.into_iter().map(|j| j.amount).collect())
}

/// Fetches the signed amount of every journal linked to the bill, optionally
/// restricted to one calendar year. One entry per linked journal.
pub async fn journal_amounts(
    db: &DatabaseConnection,
    bill_id: i32,
    year: Option<i32>,
) -> Result<Vec<Decimal>> {
    let mut query =
        transaction_journal::Entity::find().filter(transaction_journal::Column::BillId.eq(bill_id));

    if let Some(year) = year {
        let first = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| ComputeError::Date(format!("invalid year {}", year)))?;
        let last = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| ComputeError::Date(format!("invalid year {}", year)))?;
        query = query
            .filter(transaction_journal::Column::Date.gte(first))
            .filter(transaction_journal::Column::Date.lte(last));
    }

    let journals = query.all(db).await?;
    Ok(journals.into_iter().map(|j| j.amount).collect())
}
