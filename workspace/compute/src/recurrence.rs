use chrono::{Duration, Months, NaiveDate};
use model::entities::bill::{self, RecurrenceFrequency};
use sea_orm::DatabaseConnection;
use tracing::{debug, instrument, trace};

use crate::bill::queries;
use crate::error::{ComputeError, Result};

pub mod cache;

use cache::{RecurrenceCache, RecurrenceKey, RecurrenceOp};

/// Advances `date` by one occurrence of `frequency`, plus `skip` additional
/// occurrences (total advance = `1 + skip` periods).
///
/// Month-based steps are calendar-correct: advancing monthly from Jan 31
/// lands on Feb 28/29, not on an overflowed date. Pure function of its
/// inputs.
pub fn add_period(date: NaiveDate, frequency: &RecurrenceFrequency, skip: i32) -> Result<NaiveDate> {
    // Reject broken rules up front; the projection loops in this module
    // terminate only if every step strictly advances the clock.
    if skip < 0 {
        return Err(ComputeError::InvalidRecurrenceRule(format!(
            "negative skip {} for frequency {:?}",
            skip, frequency
        )));
    }
    let steps = 1 + skip as u32;

    let next = match frequency {
        RecurrenceFrequency::Weekly => date
            .checked_add_signed(Duration::weeks(i64::from(steps)))
            .ok_or_else(|| ComputeError::Date(format!("weekly advance overflow from {}", date)))?,
        RecurrenceFrequency::Monthly => add_months(date, steps)?,
        RecurrenceFrequency::Quarterly => add_months(date, 3 * steps)?,
        RecurrenceFrequency::HalfYearly => add_months(date, 6 * steps)?,
        RecurrenceFrequency::Yearly => add_months(date, 12 * steps)?,
    };

    if next <= date {
        return Err(ComputeError::InvalidRecurrenceRule(format!(
            "rule {:?} (skip {}) does not advance past {}",
            frequency, skip, date
        )));
    }
    Ok(next)
}

fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| ComputeError::Date(format!("cannot add {} months to {}", months, date)))
}

/// Projects the occurrence dates of a bill's recurrence rule.
///
/// All projection starts from the bill's anchor date and walks the sequence
/// {anchor, add_period(anchor), add_period(add_period(anchor)), ...}. Results
/// are memoized in a [`RecurrenceCache`] since they depend only on the bill's
/// immutable rule fields and the input date.
#[derive(Clone, Default)]
pub struct RecurrenceEngine {
    cache: RecurrenceCache,
}

impl RecurrenceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine sharing the given cache (clones share storage).
    pub fn with_cache(cache: RecurrenceCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &RecurrenceCache {
        &self.cache
    }

    /// Returns the first occurrence of the bill on or after `date`.
    ///
    /// Walks the occurrence sequence from the anchor while it is still before
    /// `date`; if the anchor itself is not before `date`, it is returned
    /// unchanged. Journal-blind: this looks only at the recurrence rule.
    #[instrument(skip(self, bill), fields(bill_id = bill.id, date = %date))]
    pub fn next_date_match(&self, bill: &bill::Model, date: NaiveDate) -> Result<NaiveDate> {
        let key = RecurrenceKey::new(bill.id, RecurrenceOp::DateMatch, date);
        if let Some(hit) = self.cache.get(&key) {
            trace!("Cache hit for next_date_match: {}", hit);
            return Ok(hit);
        }

        let mut start = bill.date;
        while start < date {
            start = add_period(start, &bill.repeat_freq, bill.skip)?;
        }
        debug!(
            "Next date match for bill {} relative to {} is {}",
            bill.id, date, start
        );

        self.cache.put(key, start);
        Ok(start)
    }

    /// Returns the next occurrence of the bill that is still expected to
    /// produce a transaction, given what was already recorded.
    ///
    /// Finds the occurrence interval `[start, end)` the same way as
    /// [`next_date_match`](Self::next_date_match), then counts journals
    /// linked to the bill inside that half-open window. One or more journals
    /// mean the bill already fired this interval, so the expected occurrence
    /// moves one interval later.
    #[instrument(skip(self, db, bill), fields(bill_id = bill.id, date = %date))]
    pub async fn next_expected_match(
        &self,
        db: &DatabaseConnection,
        bill: &bill::Model,
        date: NaiveDate,
    ) -> Result<NaiveDate> {
        let key = RecurrenceKey::new(bill.id, RecurrenceOp::ExpectedMatch, date);
        if let Some(hit) = self.cache.get(&key) {
            trace!("Cache hit for next_expected_match: {}", hit);
            return Ok(hit);
        }

        let mut start = bill.date;
        while start < date {
            start = add_period(start, &bill.repeat_freq, bill.skip)?;
        }
        let end = add_period(start, &bill.repeat_freq, bill.skip)?;

        let journal_count = queries::count_journals_half_open(db, bill.id, start, end).await?;
        if journal_count > 0 {
            debug!(
                "Bill {} already paid in [{}, {}), moving expected match to {}",
                bill.id, start, end, end
            );
            start = end;
        }

        self.cache.put(key, start);
        Ok(start)
    }

    /// Returns every occurrence date of the bill within `[start, end]`,
    /// in strictly increasing order, fully materialized.
    ///
    /// A `start` after `end` yields an empty sequence rather than an error;
    /// so does a rule whose first occurrence falls beyond `end`.
    #[instrument(skip(self, bill), fields(bill_id = bill.id, start = %start, end = %end))]
    pub fn pay_dates_in_range(
        &self,
        bill: &bill::Model,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let mut dates = Vec::new();
        let mut current = start;

        while current <= end {
            let matched = self.next_date_match(bill, current)?;
            if matched > end {
                // This occurrence falls outside the window; nothing later
                // can fall inside it either.
                break;
            }
            dates.push(matched);
            current = matched.succ_opt().ok_or_else(|| {
                ComputeError::Date(format!("cannot advance past {}", matched))
            })?;
        }

        debug!(
            "Bill {} has {} expected occurrences in [{}, {}]",
            bill.id,
            dates.len(),
            start,
            end
        );
        Ok(dates)
    }
}
