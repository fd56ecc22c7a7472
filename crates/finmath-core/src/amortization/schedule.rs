use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::calendar::{ChronoCalendar, MonthCalendar};
use super::terms::LoanTerms;
use crate::error::FinMathError;
use crate::types::{Money, Rate};
use crate::FinMathResult;

/// Most decimal places a rust_decimal value can carry
const MAX_SCALE: u32 = 28;

/// Round half away from zero to `scale` decimal places
pub(crate) fn round_money(value: Money, scale: u32) -> Money {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Unwrap a checked Decimal operation, reporting overflow as a domain error
pub(crate) fn checked(value: Option<Money>, context: &str) -> FinMathResult<Money> {
    value.ok_or_else(|| FinMathError::DomainError(format!("{context} overflows the decimal range")))
}

/// Sum of `values`, reporting overflow as a domain error
pub(crate) fn sum_checked<I>(values: I, context: &str) -> FinMathResult<Money>
where
    I: IntoIterator<Item = Money>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| checked(total.checked_add(value), context))
}

/// One row of a repayment schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePeriod {
    /// 0 is the disbursement, 1..=n the repayments
    pub period: u32,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
}

impl SchedulePeriod {
    /// Period 0: the lender pays the capital out, so every amount is negative
    pub fn disbursement(capital: Money) -> Self {
        SchedulePeriod {
            period: 0,
            payment: -capital,
            principal: -capital,
            interest: Decimal::ZERO,
        }
    }
}

/// Rounding and presentation controls for a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleOptions {
    /// Decimal places every amount is rounded to
    pub scale: u32,
    /// Period that absorbs the accumulated rounding residual.
    /// Negative values count back from the end, so -1 is the last period.
    pub fix_period: i64,
    /// Keep the period-0 disbursement row in the output
    pub include_disbursement: bool,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        ScheduleOptions {
            scale: 2,
            fix_period: -1,
            include_disbursement: false,
        }
    }
}

impl ScheduleOptions {
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_fix_period(mut self, fix_period: i64) -> Self {
        self.fix_period = fix_period;
        self
    }

    pub fn with_disbursement(mut self, include: bool) -> Self {
        self.include_disbursement = include;
        self
    }

    pub fn validate(&self) -> FinMathResult<()> {
        if self.scale > MAX_SCALE {
            return Err(FinMathError::InvalidInput {
                field: "scale".into(),
                reason: format!("Scale must be at most {MAX_SCALE} decimal places"),
            });
        }
        Ok(())
    }

    /// Index of the residual-absorbing period within 1..=periods
    fn resolve_fix_period(&self, periods: u32) -> FinMathResult<usize> {
        let records = i64::from(periods) + 1;
        let index = if self.fix_period < 0 {
            records + self.fix_period
        } else {
            self.fix_period
        };
        if index < 1 || index > i64::from(periods) {
            return Err(FinMathError::InvalidInput {
                field: "fix_period".into(),
                reason: format!(
                    "Period {} does not resolve to a repayment period in 1..={periods}",
                    self.fix_period
                ),
            });
        }
        Ok(index as usize)
    }
}

/// A complete repayment schedule in period order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub periods: Vec<SchedulePeriod>,
}

impl AmortizationSchedule {
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    fn repayments(&self) -> impl Iterator<Item = &SchedulePeriod> {
        self.periods.iter().filter(|p| p.period > 0)
    }

    /// Principal repaid over periods 1..=n
    pub fn total_principal(&self) -> FinMathResult<Money> {
        sum_checked(self.repayments().map(|p| p.principal), "total principal")
    }

    /// Interest paid over periods 1..=n
    pub fn total_interest(&self) -> FinMathResult<Money> {
        sum_checked(self.repayments().map(|p| p.interest), "total interest")
    }

    /// Payments made over periods 1..=n
    pub fn total_payment(&self) -> FinMathResult<Money> {
        sum_checked(self.repayments().map(|p| p.payment), "total payment")
    }

    /// Keep every row, or drop the period-0 disbursement
    pub(crate) fn from_rows(mut rows: Vec<SchedulePeriod>, include_disbursement: bool) -> Self {
        if !include_disbursement {
            rows.retain(|row| row.period > 0);
        }
        AmortizationSchedule { periods: rows }
    }
}

/// A way of splitting each repayment between principal and interest.
pub trait RepaymentModel {
    fn name(&self) -> &'static str;

    fn terms(&self) -> &LoanTerms;

    /// The amount held constant across periods (payment or principal), rounded to `scale`
    fn level_amount(&self, scale: u32) -> FinMathResult<Money>;

    /// Split period `period` given the balance outstanding when it starts
    fn split_period(
        &self,
        period: u32,
        level: Money,
        balance: Money,
        scale: u32,
    ) -> FinMathResult<SchedulePeriod>;

    /// Rebuild `row` around a corrected principal
    fn reconcile(
        &self,
        row: &SchedulePeriod,
        level: Money,
        principal: Money,
        scale: u32,
    ) -> FinMathResult<SchedulePeriod>;

    /// Closed-form interest over the life of the loan, unrounded
    fn total_interest(&self) -> FinMathResult<Money>;

    /// Closed-form sum of all payments, unrounded
    fn total_payment(&self) -> FinMathResult<Money> {
        checked(
            self.total_interest()?.checked_add(self.terms().capital),
            "total payment",
        )
    }

    fn monthly_interest_rate(&self) -> Rate {
        self.terms().monthly_rate()
    }

    fn issue_interest_rate(&self) -> Rate {
        self.terms().period_rate()
    }

    fn schedule(&self, options: &ScheduleOptions) -> FinMathResult<AmortizationSchedule> {
        build_schedule(self, options)
    }

    fn dated_schedule(
        &self,
        start: NaiveDate,
        options: &ScheduleOptions,
    ) -> FinMathResult<BTreeMap<NaiveDate, SchedulePeriod>> {
        dated_schedule(self, start, options, &ChronoCalendar)
    }
}

/// Every row including period 0, with the rounding residual already absorbed
pub(crate) fn full_schedule<M>(model: &M, options: &ScheduleOptions) -> FinMathResult<Vec<SchedulePeriod>>
where
    M: RepaymentModel + ?Sized,
{
    let terms = model.terms();
    terms.validate()?;
    options.validate()?;

    let scale = options.scale;
    let fix = options.resolve_fix_period(terms.periods)?;
    let level = model.level_amount(scale)?;

    let mut rows = Vec::with_capacity(terms.periods as usize + 1);
    rows.push(SchedulePeriod::disbursement(terms.capital));

    let mut balance = terms.capital;
    for period in 1..=terms.periods {
        let row = model.split_period(period, level, balance, scale)?;
        balance = round_money(checked(balance.checked_sub(row.principal), "balance")?, scale);
        rows.push(row);
    }

    // Principal of every other repayment is final; the fix period takes the rest
    let others = sum_checked(
        rows.iter()
            .skip(1)
            .filter(|row| row.period as usize != fix)
            .map(|row| row.principal),
        "repaid principal",
    )?;
    let principal = round_money(checked(terms.capital.checked_sub(others), "fix principal")?, scale);
    let residual = checked(principal.checked_sub(rows[fix].principal), "rounding residual")?;
    rows[fix] = model.reconcile(&rows[fix], level, principal, scale)?;

    debug!(model = model.name(), period = fix, %residual, "rounding residual absorbed");
    if principal.is_sign_negative() {
        warn!(model = model.name(), period = fix, %principal, "fix period repays negative principal");
    }

    Ok(rows)
}

/// Build the per-period schedule for `model`.
///
/// Each period is rounded on its own, then the difference between the capital
/// and the rounded principals is folded into `options.fix_period`, so the
/// principals of periods 1..=n add up to the capital exactly at `options.scale`.
pub fn build_schedule<M>(model: &M, options: &ScheduleOptions) -> FinMathResult<AmortizationSchedule>
where
    M: RepaymentModel + ?Sized,
{
    let rows = full_schedule(model, options)?;
    Ok(AmortizationSchedule::from_rows(rows, options.include_disbursement))
}

/// The schedule keyed by due date.
///
/// Period `k` falls `k * months_per_period` months after `start`; the
/// disbursement sits on `start` itself and is only kept when requested.
pub fn dated_schedule<M, C>(
    model: &M,
    start: NaiveDate,
    options: &ScheduleOptions,
    calendar: &C,
) -> FinMathResult<BTreeMap<NaiveDate, SchedulePeriod>>
where
    M: RepaymentModel + ?Sized,
    C: MonthCalendar + ?Sized,
{
    let rows = full_schedule(model, options)?;
    key_by_date(
        &rows,
        start,
        model.terms().months_per_period,
        options.include_disbursement,
        calendar,
    )
}

/// Key already-built rows by due date; period `k` falls `k * step` months after `start`
pub(crate) fn key_by_date<C>(
    rows: &[SchedulePeriod],
    start: NaiveDate,
    step: u32,
    include_disbursement: bool,
    calendar: &C,
) -> FinMathResult<BTreeMap<NaiveDate, SchedulePeriod>>
where
    C: MonthCalendar + ?Sized,
{
    let mut dated = BTreeMap::new();
    for row in rows {
        if row.period == 0 && !include_disbursement {
            continue;
        }
        let months = row.period.checked_mul(step).ok_or_else(|| {
            FinMathError::DateError(format!("period {} is too far from {start}", row.period))
        })?;
        let due = calendar.add_months(start, months)?;
        if dated.insert(due, *row).is_some() {
            return Err(FinMathError::DateError(format!(
                "more than one period falls due on {due}"
            )));
        }
    }
    Ok(dated)
}
