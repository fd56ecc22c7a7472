use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bc::Operand;
use crate::error::FinMathError;
use crate::FinMathResult;

/// Starting step of the step-halving search
const INITIAL_STEP: f64 = 0.05;

/// Extra digits carried by the decimal step arithmetic beyond `precision`.
/// With fewer, the step truncates to zero before the residual can reach
/// 10^-precision on cash flows in the hundreds of thousands.
const STEP_GUARD_DIGITS: u32 = 10;

/// Largest precision whose tolerance 10^-precision is still a normal f64
const MAX_PRECISION: u32 = 300;

/// Iteration controls shared by every iterative solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Starting rate
    pub guess: f64,
    /// Decimal places of the convergence tolerance (tolerance = 10^-precision)
    pub precision: u32,
    /// Hard cap on iterations before reporting non-convergence
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            guess: 0.1,
            precision: 7,
            max_iterations: 10_000,
        }
    }
}

impl SolverConfig {
    /// Defaults for XIRR: eight decimal places
    pub fn for_xirr() -> Self {
        SolverConfig::default().with_precision(8)
    }

    /// Defaults for RATE: eight decimal places
    pub fn for_rate() -> Self {
        SolverConfig::default().with_precision(8)
    }

    pub fn with_guess(mut self, guess: f64) -> Self {
        self.guess = guess;
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn tolerance(&self) -> f64 {
        10f64.powi(-(self.precision.min(MAX_PRECISION) as i32))
    }

    pub(crate) fn validate(&self) -> FinMathResult<()> {
        if !self.guess.is_finite() {
            return Err(FinMathError::InvalidInput {
                field: "guess".into(),
                reason: "Initial guess must be a finite number".into(),
            });
        }
        if self.precision > MAX_PRECISION {
            return Err(FinMathError::InvalidInput {
                field: "precision".into(),
                reason: format!("Precision must be at most {MAX_PRECISION} decimal places"),
            });
        }
        if self.max_iterations == 0 {
            return Err(FinMathError::InvalidInput {
                field: "max_iterations".into(),
                reason: "At least one iteration is required".into(),
            });
        }
        Ok(())
    }
}

/// Step-halving root search over a residual that decreases as the rate grows.
///
/// A positive residual raises the guess by the current step and a negative one
/// lowers it. After every move the step becomes half the gap between the last
/// raised and the last lowered guess, computed in exact decimal arithmetic so
/// the step shrinks predictably instead of degenerating in floating point.
/// The search stops once `|residual| <= 10^-precision`; running out of
/// iterations or having the step truncate to zero first is a non-convergence.
pub(crate) fn step_halving_search<F>(
    function: &str,
    config: &SolverConfig,
    mut residual_at: F,
) -> FinMathResult<f64>
where
    F: FnMut(f64) -> f64,
{
    config.validate()?;

    let epsilon = config.tolerance();
    let step_scale = config.precision + STEP_GUARD_DIGITS;

    let mut guess = config.guess;
    let mut last_raised = guess;
    let mut last_lowered = guess;
    let mut step = INITIAL_STEP;
    let mut residual = f64::INFINITY;
    let mut iterations = 0u32;

    while residual.abs() > epsilon && iterations < config.max_iterations && step != 0.0 {
        iterations += 1;
        residual = residual_at(guess);

        if !residual.is_finite() {
            return Err(FinMathError::NonConvergence {
                function: function.into(),
                iterations,
                last_delta: residual,
            });
        }

        if residual.abs() > epsilon {
            if residual > 0.0 {
                guess += step;
                last_raised = guess;
            } else {
                guess -= step;
                last_lowered = guess;
            }
            step = half_gap(last_raised, last_lowered, step_scale)?;
        }
    }

    if residual.abs() > epsilon {
        return Err(FinMathError::NonConvergence {
            function: function.into(),
            iterations,
            last_delta: residual,
        });
    }

    debug!(function, iterations, rate = guess, residual, "step-halving search converged");
    Ok(guess)
}

/// `|a - b| / 2`, both operations truncated at `scale` digits
fn half_gap(a: f64, b: f64, scale: u32) -> FinMathResult<f64> {
    let gap = a.to_bc()?.sub_at(&b.to_bc()?, scale).abs();
    let half = gap.div_at(&2u32.to_bc()?, scale)?;
    half.to_f64().ok_or_else(|| {
        FinMathError::DomainError(format!("step {half} is not representable as f64"))
    })
}
