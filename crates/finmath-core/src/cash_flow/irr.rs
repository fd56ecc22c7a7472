use serde::{Deserialize, Serialize};
use tracing::debug;

use super::require_mixed_signs;
use crate::error::FinMathError;
use crate::solver::{step_halving_search, SolverConfig};
use crate::time_value::discounted_sum;
use crate::FinMathResult;

/// Root-finding strategy for IRR
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrMethod {
    /// Newton-Raphson with a linear-interpolation finish
    #[default]
    Newton,
    /// Derivative-free step-halving search, the same one XIRR uses
    StepHalving,
}

/// Internal Rate of Return using the chosen strategy
pub fn irr(values: &[f64], method: IrrMethod, config: &SolverConfig) -> FinMathResult<f64> {
    match method {
        IrrMethod::Newton => irr_newton(values, config),
        IrrMethod::StepHalving => irr_step_halving(values, config),
    }
}

/// `d(NPV)/d(rate) = −Σ k·values[k] / (1+rate)^(k+1)`
fn npv_derivative(rate: f64, values: &[f64]) -> f64 {
    let one_plus_r = 1.0 + rate;
    values
        .iter()
        .enumerate()
        .skip(1)
        .map(|(k, v)| -(k as f64) * v / one_plus_r.powi(k as i32 + 1))
        .sum()
}

/// Internal Rate of Return using Newton-Raphson.
///
/// Converges when a step of at most `10^-precision` either brackets the root
/// (NPV changes sign across it) or leaves NPV unchanged. The bracketing pair
/// is then refined by linear interpolation.
pub fn irr_newton(values: &[f64], config: &SolverConfig) -> FinMathResult<f64> {
    config.validate()?;
    require_mixed_signs(values, "IRR")?;

    let epsilon = config.tolerance();
    let mut old_rate = config.guess;

    for iteration in 0..config.max_iterations {
        let old_npv = discounted_sum(old_rate, values);
        let slope = npv_derivative(old_rate, values);

        if slope == 0.0 {
            return Err(FinMathError::DegenerateDerivative {
                function: "IRR".into(),
                rate: old_rate,
                iteration,
            });
        }

        let step = old_npv / slope;
        let new_rate = old_rate - step;
        let new_npv = discounted_sum(new_rate, values);

        if !new_rate.is_finite() || !new_npv.is_finite() {
            return Err(FinMathError::NonConvergence {
                function: "IRR".into(),
                iterations: iteration + 1,
                last_delta: new_npv,
            });
        }

        let brackets_root = old_npv * new_npv <= 0.0;
        if (brackets_root || old_npv == new_npv) && step.abs() <= epsilon {
            let rate = interpolate(old_rate, old_npv, new_rate, new_npv);
            debug!(iterations = iteration + 1, rate, "IRR (Newton) converged");
            return Ok(rate);
        }

        old_rate = new_rate;
    }

    Err(FinMathError::NonConvergence {
        function: "IRR".into(),
        iterations: config.max_iterations,
        last_delta: discounted_sum(old_rate, values),
    })
}

/// Linear interpolation between the last two Newton iterates.
fn interpolate(old_rate: f64, old_npv: f64, new_rate: f64, new_npv: f64) -> f64 {
    if old_rate == 0.0 {
        return old_rate;
    }
    if new_rate == 0.0 || old_rate == new_rate {
        return new_rate;
    }

    // "high" is the iterate with the larger NPV
    let ((npv_high, rate_high), (npv_low, rate_low)) = if old_npv > new_npv {
        ((old_npv, old_rate), (new_npv, new_rate))
    } else {
        ((new_npv, new_rate), (old_npv, old_rate))
    };
    npv_high / (npv_high.abs() + npv_low.abs()) * (rate_low - rate_high) + rate_high
}

/// Internal Rate of Return using the step-halving search.
///
/// Slower than Newton but needs no derivative, so it keeps working where the
/// NPV curve is flat at the guess.
pub fn irr_step_halving(values: &[f64], config: &SolverConfig) -> FinMathResult<f64> {
    require_mixed_signs(values, "IRR")?;
    step_halving_search("IRR", config, |rate| discounted_sum(rate, values))
}
