//! Loan amortisation schedules.
//!
//! Two repayment models share one schedule builder: [`EqualInstallment`]
//! (level payments) and [`EqualPrincipal`] (level principal). Amounts are
//! rounded half away from zero per period and the rounding residual lands in
//! a configurable period so the principals sum exactly to the capital.

pub mod calendar;
pub mod equal_installment;
pub mod equal_principal;
pub mod schedule;
pub mod terms;

pub use calendar::{ChronoCalendar, MonthCalendar};
pub use equal_installment::EqualInstallment;
pub use equal_principal::EqualPrincipal;
pub use schedule::{
    build_schedule, dated_schedule, AmortizationSchedule, RepaymentModel, ScheduleOptions,
    SchedulePeriod,
};
pub use terms::LoanTerms;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::FinMathResult;

/// Repayment model selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentMethod {
    #[default]
    EqualInstallment,
    EqualPrincipal,
}

/// Input for [`amortize`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub terms: LoanTerms,
    #[serde(default)]
    pub method: RepaymentMethod,
    #[serde(default)]
    pub options: ScheduleOptions,
    /// Disbursement date; when present every row carries its due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// A schedule row with its due date, if the loan is dated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub period: SchedulePeriod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub method: RepaymentMethod,
    /// Rounded level payment (equal installment) or level principal (equal principal)
    pub level_amount: Money,
    pub monthly_interest_rate: Rate,
    pub issue_interest_rate: Rate,
    /// Closed-form totals
    pub total_payment: Money,
    pub total_interest: Money,
    /// Totals of the rounded schedule
    pub schedule_payment: Money,
    pub schedule_interest: Money,
    pub schedule: Vec<ScheduleLine>,
}

fn model_for(input: &AmortizationInput) -> Box<dyn RepaymentModel> {
    match input.method {
        RepaymentMethod::EqualInstallment => Box::new(EqualInstallment::new(input.terms.clone())),
        RepaymentMethod::EqualPrincipal => Box::new(EqualPrincipal::new(input.terms.clone())),
    }
}

/// Build a full amortisation schedule with totals and rates.
pub fn amortize(input: &AmortizationInput) -> FinMathResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let model = model_for(input);
    let options = &input.options;

    let rows = schedule::full_schedule(model.as_ref(), options)?;
    let lines: Vec<ScheduleLine> = match input.start_date {
        Some(date) => schedule::key_by_date(
            &rows,
            date,
            input.terms.months_per_period,
            options.include_disbursement,
            &ChronoCalendar,
        )?
        .into_iter()
        .map(|(due, period)| ScheduleLine {
            date: Some(due),
            period,
        })
        .collect(),
        None => rows
            .iter()
            .filter(|row| options.include_disbursement || row.period > 0)
            .map(|&period| ScheduleLine { date: None, period })
            .collect(),
    };
    let schedule = AmortizationSchedule::from_rows(rows, options.include_disbursement);

    if schedule
        .periods
        .iter()
        .any(|p| p.period > 0 && p.principal.is_sign_negative())
    {
        warnings.push(
            "A repayment period carries negative principal; check the fix period and scale".into(),
        );
    }
    if input.terms.annual_rate.is_zero() {
        warnings.push("Interest-free loan: payments repay principal only".into());
    }

    let output = AmortizationOutput {
        method: input.method,
        level_amount: model.level_amount(options.scale)?,
        monthly_interest_rate: model.monthly_interest_rate(),
        issue_interest_rate: model.issue_interest_rate(),
        total_payment: model.total_payment()?,
        total_interest: model.total_interest()?,
        schedule_payment: schedule.total_payment()?,
        schedule_interest: schedule.total_interest()?,
        schedule: lines,
    };

    let methodology = match input.method {
        RepaymentMethod::EqualInstallment => "Equal installment (level payment) amortisation",
        RepaymentMethod::EqualPrincipal => "Equal principal (straight-line) amortisation",
    };
    let assumptions = serde_json::json!({
        "rounding": "half away from zero per period",
        "scale": options.scale,
        "fix_period": options.fix_period,
        "months_per_period": input.terms.months_per_period,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}
