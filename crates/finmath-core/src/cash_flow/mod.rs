//! Cash-flow solvers: IRR, XNPV/XIRR and MIRR.
//!
//! Every solver is a pure function over its inputs. Series passed to the
//! rate solvers must contain at least one strictly positive and one strictly
//! negative value; anything else fails with `InvalidCashFlow`.

pub mod irr;
pub mod mirr;
pub mod xirr;

pub use irr::{irr, irr_newton, irr_step_halving, IrrMethod};
pub use mirr::mirr;
pub use xirr::{xirr, xnpv};

pub use crate::time_value::npv;

use crate::error::FinMathError;
use crate::FinMathResult;

/// True when the series has both a strictly positive and a strictly negative value
pub fn has_mixed_signs(values: &[f64]) -> bool {
    let mut positive = false;
    let mut negative = false;
    for &v in values {
        positive |= v > 0.0;
        negative |= v < 0.0;
        if positive && negative {
            return true;
        }
    }
    false
}

pub(crate) fn require_mixed_signs(values: &[f64], function: &str) -> FinMathResult<()> {
    if has_mixed_signs(values) {
        Ok(())
    } else {
        Err(FinMathError::InvalidCashFlow {
            function: function.into(),
        })
    }
}
