use chrono::{Months, NaiveDate};

use crate::error::FinMathError;
use crate::FinMathResult;

/// Calendar arithmetic the dated schedule relies on.
pub trait MonthCalendar {
    /// `date` moved forward by `months` calendar months
    fn add_months(&self, date: NaiveDate, months: u32) -> FinMathResult<NaiveDate>;
}

/// Gregorian calendar backed by chrono.
///
/// Landing on a day the target month does not have clamps to that month's
/// last day, so 31 January plus one month is 28 (or 29) February.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoCalendar;

impl MonthCalendar for ChronoCalendar {
    fn add_months(&self, date: NaiveDate, months: u32) -> FinMathResult<NaiveDate> {
        date.checked_add_months(Months::new(months)).ok_or_else(|| {
            FinMathError::DateError(format!("{date} plus {months} months is out of range"))
        })
    }
}
