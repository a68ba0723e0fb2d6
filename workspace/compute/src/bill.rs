use chrono::NaiveDate;
use model::entities::bill;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing::{debug, info, instrument};

use crate::error::{ComputeError, Result};
use crate::recurrence::RecurrenceEngine;

pub mod queries;

/// Aggregates paid and still-expected bill amounts over date ranges,
/// reconciling the occurrences projected by the [`RecurrenceEngine`] against
/// the journals actually recorded.
///
/// Every operation takes the user explicitly; there is no ambient request
/// state. All money math is exact decimal arithmetic.
#[derive(Clone, Default)]
pub struct BillAggregator {
    engine: RecurrenceEngine,
}

impl BillAggregator {
    pub fn new(engine: RecurrenceEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &RecurrenceEngine {
        &self.engine
    }

    /// Sums the negative (expense) journal amounts linked to the user's
    /// active bills within `[start, end]` inclusive. The result is signed,
    /// so a period with payments comes out negative.
    #[instrument(skip(self, db), fields(user_id = user_id, start = %start, end = %end))]
    pub async fn paid_in_range(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Decimal> {
        let bills = queries::active_bills_for_user(db, user_id).await?;
        debug!("Summing payments over {} active bills", bills.len());

        let mut sum = Decimal::ZERO;
        for bill in &bills {
            for amount in queries::negative_amounts_in_range(db, bill.id, start, end).await? {
                sum = checked_add(sum, amount)?;
            }
        }

        info!("Paid in range for user {}: {}", user_id, sum);
        Ok(sum)
    }

    /// Estimates the monetary value of occurrences that were expected within
    /// `[start, end]` but not yet recorded.
    ///
    /// Per active bill: each expected-but-missing occurrence contributes the
    /// midpoint of the bill's amount band. Bills with at least as many
    /// recorded journals as expected occurrences contribute nothing.
    #[instrument(skip(self, db), fields(user_id = user_id, start = %start, end = %end))]
    pub async fn unpaid_in_range(
        &self,
        db: &DatabaseConnection,
        user_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Decimal> {
        let bills = queries::active_bills_for_user(db, user_id).await?;
        debug!("Estimating unpaid amounts over {} active bills", bills.len());

        let mut sum = Decimal::ZERO;
        for bill in &bills {
            let expected = self.engine.pay_dates_in_range(bill, start, end)?.len();
            let actual = queries::count_journals_in_range(db, bill.id, start, end).await? as usize;
            debug!(
                "Bill {}: {} expected occurrences, {} recorded journals",
                bill.id, expected, actual
            );

            if expected > actual {
                let missing = Decimal::from((expected - actual) as u64);
                let estimate = expected_average(bill)?
                    .checked_mul(missing)
                    .ok_or_else(|| {
                        ComputeError::Arithmetic(format!(
                            "overflow estimating {} missing occurrences of bill {}",
                            missing, bill.id
                        ))
                    })?;
                sum = checked_add(sum, estimate)?;
            }
        }

        info!("Unpaid in range for user {}: {}", user_id, sum);
        Ok(sum)
    }

    /// Arithmetic mean of the signed amount of every journal linked to the
    /// bill, over its whole history. Exact zero when no journals are linked.
    #[instrument(skip(self, db, bill), fields(bill_id = bill.id))]
    pub async fn overall_average(
        &self,
        db: &DatabaseConnection,
        bill: &bill::Model,
    ) -> Result<Decimal> {
        let amounts = queries::journal_amounts(db, bill.id, None).await?;
        average_of(&amounts)
    }

    /// Like [`overall_average`](Self::overall_average), restricted to
    /// journals dated within the given calendar year.
    #[instrument(skip(self, db, bill), fields(bill_id = bill.id, year = year))]
    pub async fn year_average(
        &self,
        db: &DatabaseConnection,
        bill: &bill::Model,
        year: i32,
    ) -> Result<Decimal> {
        let amounts = queries::journal_amounts(db, bill.id, Some(year)).await?;
        average_of(&amounts)
    }
}

/// Midpoint of the bill's expected amount band.
///
/// The model layer rejects inverted bands at save time; re-checking here
/// guards against rows written by other tooling.
fn expected_average(bill: &bill::Model) -> Result<Decimal> {
    if bill.amount_min > bill.amount_max {
        return Err(ComputeError::InvalidBillDefinition(format!(
            "bill {} has amount_min {} above amount_max {}",
            bill.id, bill.amount_min, bill.amount_max
        )));
    }
    bill.amount_min
        .checked_add(bill.amount_max)
        .and_then(|total| total.checked_div(Decimal::from(2)))
        .ok_or_else(|| {
            ComputeError::Arithmetic(format!(
                "overflow averaging amount band of bill {}",
                bill.id
            ))
        })
}

/// Exact-decimal mean; empty input is a normal case and yields exact zero.
fn average_of(amounts: &[Decimal]) -> Result<Decimal> {
    if amounts.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let mut sum = Decimal::ZERO;
    for amount in amounts {
        sum = checked_add(sum, *amount)?;
    }
    sum.checked_div(Decimal::from(amounts.len() as u64))
        .ok_or_else(|| ComputeError::Arithmetic("division failed computing mean".to_string()))
}

fn checked_add(lhs: Decimal, rhs: Decimal) -> Result<Decimal> {
    lhs.checked_add(rhs)
        .ok_or_else(|| ComputeError::Arithmetic(format!("overflow adding {} and {}", lhs, rhs)))
}
