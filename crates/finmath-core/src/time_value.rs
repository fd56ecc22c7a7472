use tracing::debug;

use crate::error::FinMathError;
use crate::solver::SolverConfig;
use crate::types::PaymentTiming;
use crate::FinMathResult;

fn finite(value: f64, function: &str) -> FinMathResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FinMathError::DomainError(format!(
            "{function} is undefined for these inputs"
        )))
    }
}

/// `(1+rate)^nper` and the annuity factor `(1 + rate·type)·((1+rate)^nper − 1)/rate`,
/// which collapses to `nper` at a zero rate.
fn growth_and_factor(rate: f64, nper: u32, timing: PaymentTiming) -> (f64, f64) {
    let growth = (1.0 + rate).powi(nper as i32);
    let factor = if rate == 0.0 {
        nper as f64
    } else {
        (1.0 + rate * timing.weight()) * (growth - 1.0) / rate
    };
    (growth, factor)
}

/// `Σ values[k] / (1+rate)^k` without input validation; may be non-finite.
pub(crate) fn discounted_sum(rate: f64, values: &[f64]) -> f64 {
    let one_plus_r = 1.0 + rate;
    values
        .iter()
        .enumerate()
        .map(|(k, v)| v / one_plus_r.powi(k as i32))
        .sum()
}

/// Net Present Value of a series of cash flows, the first one undiscounted
pub fn npv(rate: f64, values: &[f64]) -> FinMathResult<f64> {
    if rate == -1.0 {
        return Err(FinMathError::DivisionByZero {
            context: "NPV discount factor at rate -100%".into(),
        });
    }
    finite(discounted_sum(rate, values), "NPV")
}

/// Future Value
pub fn fv(rate: f64, nper: u32, pmt: f64, pv: f64, timing: PaymentTiming) -> FinMathResult<f64> {
    let (growth, factor) = growth_and_factor(rate, nper, timing);
    finite(-(pv * growth + pmt * factor), "FV")
}

/// Present Value
pub fn pv(rate: f64, nper: u32, pmt: f64, fv: f64, timing: PaymentTiming) -> FinMathResult<f64> {
    let (growth, factor) = growth_and_factor(rate, nper, timing);
    if growth == 0.0 {
        return Err(FinMathError::DivisionByZero {
            context: "PV growth factor".into(),
        });
    }
    finite(-(fv + pmt * factor) / growth, "PV")
}

/// Payment (PMT)
pub fn pmt(rate: f64, nper: u32, pv: f64, fv: f64, timing: PaymentTiming) -> FinMathResult<f64> {
    if nper == 0 {
        return Err(FinMathError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    let (growth, factor) = growth_and_factor(rate, nper, timing);
    if factor == 0.0 {
        return Err(FinMathError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }
    finite(-(fv + pv * growth) / factor, "PMT")
}

/// Interest portion of the payment in period `per` (1-based)
pub fn ipmt(
    rate: f64,
    per: u32,
    nper: u32,
    pv: f64,
    fv: f64,
    timing: PaymentTiming,
) -> FinMathResult<f64> {
    if per == 0 || per > nper {
        return Err(FinMathError::InvalidInput {
            field: "per".into(),
            reason: format!("Period must be between 1 and {nper}"),
        });
    }

    // Nothing has accrued yet when the first payment is made up front
    if timing == PaymentTiming::Begin && per == 1 {
        return Ok(0.0);
    }

    let total = pmt(rate, nper, pv, fv, timing)?;
    let mut interest = self::fv(rate, per - 1, total, pv, timing)? * rate;
    if timing == PaymentTiming::Begin {
        interest /= 1.0 + rate;
    }
    finite(interest, "IPMT")
}

/// Principal portion of the payment in period `per` (1-based)
pub fn ppmt(
    rate: f64,
    per: u32,
    nper: u32,
    pv: f64,
    fv: f64,
    timing: PaymentTiming,
) -> FinMathResult<f64> {
    let total = pmt(rate, nper, pv, fv, timing)?;
    Ok(total - ipmt(rate, per, nper, pv, fv, timing)?)
}

/// Number of periods (NPER). Fractional results are returned as-is.
pub fn nper(rate: f64, pmt: f64, pv: f64, fv: f64, timing: PaymentTiming) -> FinMathResult<f64> {
    if rate == 0.0 {
        if pmt == 0.0 {
            return Err(FinMathError::DivisionByZero {
                context: "NPER with zero rate and zero payment".into(),
            });
        }
        return finite(-(fv + pv) / pmt, "NPER");
    }
    if rate <= -1.0 {
        return Err(FinMathError::DomainError(
            "NPER requires a rate greater than -100%".into(),
        ));
    }

    let z = pmt * (1.0 + rate * timing.weight()) / rate;
    let ratio = (z - fv) / (pv + z);
    if ratio.is_nan() || ratio <= 0.0 {
        return Err(FinMathError::DomainError(format!(
            "NPER has no solution: payment {pmt} never settles present value {pv}"
        )));
    }
    finite(ratio.ln() / (1.0 + rate).ln(), "NPER")
}

/// Interest rate per period (RATE) by Newton iteration on the annuity equation
///
/// `g(r) = fv + pv·(1+r)^n + pmt·(1+r·type)/r·((1+r)^n − 1) = 0`
///
/// Stops once successive rates differ by less than `10^-precision`.
pub fn rate(
    nper: u32,
    pmt: f64,
    pv: f64,
    fv: f64,
    timing: PaymentTiming,
    config: &SolverConfig,
) -> FinMathResult<f64> {
    config.validate()?;
    if nper == 0 {
        return Err(FinMathError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    let tolerance = config.tolerance();
    let mut current = config.guess;
    let mut delta = f64::INFINITY;

    for iteration in 1..=config.max_iterations {
        let next = current - newton_ratio(current, nper, pmt, pv, fv, timing.weight());
        if !next.is_finite() {
            return Err(FinMathError::NonConvergence {
                function: "RATE".into(),
                iterations: iteration,
                last_delta: next,
            });
        }

        delta = (next - current).abs();
        current = next;
        if delta < tolerance {
            debug!(iterations = iteration, rate = current, "RATE converged");
            return Ok(current);
        }
    }

    Err(FinMathError::NonConvergence {
        function: "RATE".into(),
        iterations: config.max_iterations,
        last_delta: delta,
    })
}

/// Closed-form `g(r) / g'(r)` for the annuity equation
fn newton_ratio(r: f64, n: u32, pmt: f64, pv: f64, fv: f64, w: f64) -> f64 {
    let n_f = n as f64;
    let t1 = (1.0 + r).powi(n as i32);
    let t2 = (1.0 + r).powi(n as i32 - 1);
    let g = fv + t1 * pv + pmt * (t1 - 1.0) * (r * w + 1.0) / r;
    let g_prime = n_f * t2 * pv - pmt * (t1 - 1.0) * (r * w + 1.0) / (r * r)
        + n_f * pmt * t2 * (r * w + 1.0) / r
        + pmt * (t1 - 1.0) * w / r;
    g / g_prime
}
