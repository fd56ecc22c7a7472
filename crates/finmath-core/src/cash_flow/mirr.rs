use super::require_mixed_signs;
use crate::error::FinMathError;
use crate::time_value::npv;
use crate::FinMathResult;

/// Modified Internal Rate of Return.
///
/// Inflows are discounted at `reinvest_rate` and outflows at `finance_rate`:
/// `|NPV(reinvest, inflows) / NPV(finance, outflows)|^(1/(n−1)) · (1 + reinvest) − 1`
pub fn mirr(values: &[f64], finance_rate: f64, reinvest_rate: f64) -> FinMathResult<f64> {
    require_mixed_signs(values, "MIRR")?;

    let inflows: Vec<f64> = values.iter().map(|&v| v.max(0.0)).collect();
    let outflows: Vec<f64> = values.iter().map(|&v| v.min(0.0)).collect();

    let npv_in = npv(reinvest_rate, &inflows)?;
    let npv_out = npv(finance_rate, &outflows)?;
    if npv_out == 0.0 {
        return Err(FinMathError::DivisionByZero {
            context: "MIRR outflow present value".into(),
        });
    }

    let periods = (values.len() - 1) as f64;
    let result = (npv_in / npv_out).abs().powf(1.0 / periods) * (1.0 + reinvest_rate) - 1.0;
    if result.is_finite() {
        Ok(result)
    } else {
        Err(FinMathError::DomainError(
            "MIRR is undefined for these rates".into(),
        ))
    }
}
