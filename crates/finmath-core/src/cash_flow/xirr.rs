use chrono::NaiveDate;

use super::require_mixed_signs;
use crate::error::FinMathError;
use crate::solver::{step_halving_search, SolverConfig};
use crate::FinMathResult;

const DAYS_PER_YEAR: f64 = 365.0;

/// Actual/365 year fraction of every date measured from the first one
fn year_fractions(values: &[f64], dates: &[NaiveDate]) -> FinMathResult<Vec<f64>> {
    if values.len() != dates.len() {
        return Err(FinMathError::InvalidInput {
            field: "dates".into(),
            reason: format!(
                "Expected one date per cash flow ({} values, {} dates)",
                values.len(),
                dates.len()
            ),
        });
    }
    let Some(&first) = dates.first() else {
        return Err(FinMathError::InvalidInput {
            field: "values".into(),
            reason: "At least one dated cash flow is required".into(),
        });
    };

    Ok(dates
        .iter()
        .map(|date| (*date - first).num_days().abs() as f64 / DAYS_PER_YEAR)
        .collect())
}

fn discounted(rate: f64, values: &[f64], years: &[f64]) -> f64 {
    let one_plus_r = 1.0 + rate;
    values
        .iter()
        .zip(years)
        .map(|(v, t)| v / one_plus_r.powf(*t))
        .sum()
}

/// Net present value of irregularly dated cash flows, discounted by actual days / 365
pub fn xnpv(rate: f64, values: &[f64], dates: &[NaiveDate]) -> FinMathResult<f64> {
    let years = year_fractions(values, dates)?;
    let result = discounted(rate, values, &years);
    if result.is_finite() {
        Ok(result)
    } else {
        Err(FinMathError::DomainError(format!(
            "XNPV is undefined at rate {rate}"
        )))
    }
}

/// Extended IRR for irregular cash flow dates, solved with the step-halving search
pub fn xirr(values: &[f64], dates: &[NaiveDate], config: &SolverConfig) -> FinMathResult<f64> {
    let years = year_fractions(values, dates)?;
    require_mixed_signs(values, "XIRR")?;
    step_halving_search("XIRR", config, |rate| discounted(rate, values, &years))
}
