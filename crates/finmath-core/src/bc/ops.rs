//! Scale-truncating arithmetic on [`BcNumber`] and the string-level operation set.
//!
//! Every result is computed exactly and then truncated toward zero at the
//! requested scale, padding with zeros when the exact result is shorter.
//! Omitting the scale (`None`) uses the process-wide default from
//! [`default_scale`](super::default_scale).

use num_integer::{Integer, Roots};
use num_traits::{Signed, Zero};
use std::cmp::Ordering;

use super::context::resolve_scale;
use super::number::{integral_u64, ten_pow, BcNumber, Operand};
use crate::error::FinMathError;
use crate::FinMathResult;

impl BcNumber {
    pub fn add_at(&self, other: &BcNumber, scale: u32) -> BcNumber {
        let (left, right, exact_scale) = self.aligned(other);
        BcNumber::new(left + right, exact_scale).with_scale(scale)
    }

    pub fn sub_at(&self, other: &BcNumber, scale: u32) -> BcNumber {
        let (left, right, exact_scale) = self.aligned(other);
        BcNumber::new(left - right, exact_scale).with_scale(scale)
    }

    pub fn mul_at(&self, other: &BcNumber, scale: u32) -> BcNumber {
        BcNumber::new(
            self.unscaled() * other.unscaled(),
            self.scale() + other.scale(),
        )
        .with_scale(scale)
    }

    pub fn div_at(&self, divisor: &BcNumber, scale: u32) -> FinMathResult<BcNumber> {
        if divisor.is_zero() {
            return Err(FinMathError::DivisionByZero {
                context: format!("{self} / {divisor}"),
            });
        }
        // (a / 10^sa) / (b / 10^sb) * 10^scale = a * 10^(sb + scale) / (b * 10^sa)
        let numerator = self.unscaled() * ten_pow(divisor.scale() + scale);
        let denominator = divisor.unscaled() * ten_pow(self.scale());
        Ok(BcNumber::new(numerator / denominator, scale))
    }

    /// Remainder of truncated division. The sign follows the dividend.
    pub fn rem_at(&self, modulus: &BcNumber, scale: u32) -> FinMathResult<BcNumber> {
        if modulus.is_zero() {
            return Err(FinMathError::DivisionByZero {
                context: format!("{self} mod {modulus}"),
            });
        }
        let quotient = self.div_at(modulus, 0)?;
        let product = modulus.mul_at(&quotient, modulus.scale());
        let exact_scale = self.scale().max(modulus.scale());
        Ok(self.sub_at(&product, exact_scale).with_scale(scale))
    }

    /// Integer power. A negative exponent yields the reciprocal at `scale`.
    pub fn pow_at(&self, exponent: &BcNumber, scale: u32) -> FinMathResult<BcNumber> {
        let magnitude = integral_u64(exponent, "exponent")?;
        let magnitude = u32::try_from(magnitude).map_err(|_| {
            FinMathError::DomainError(format!("exponent {exponent} is too large"))
        })?;

        if magnitude == 0 {
            return Ok(BcNumber::one().with_scale(scale));
        }

        let power_scale = self.scale().checked_mul(magnitude).ok_or_else(|| {
            FinMathError::DomainError(format!(
                "{self}^{exponent} exceeds the representable scale"
            ))
        })?;
        let exact = BcNumber::new(self.unscaled().pow(magnitude), power_scale);

        if exponent.is_negative() {
            BcNumber::one().div_at(&exact, scale)
        } else {
            Ok(exact.with_scale(scale))
        }
    }

    /// `(self ^ exponent) mod modulus` by square-and-multiply on whole numbers.
    pub fn powmod_at(
        &self,
        exponent: &BcNumber,
        modulus: &BcNumber,
        scale: u32,
    ) -> FinMathResult<BcNumber> {
        if !self.is_integer() {
            return Err(FinMathError::DomainError(format!(
                "base must be an integer, got {self}"
            )));
        }
        if !exponent.is_integer() {
            return Err(FinMathError::DomainError(format!(
                "exponent must be an integer, got {exponent}"
            )));
        }
        if exponent.is_negative() {
            return Err(FinMathError::DomainError(format!(
                "exponent must be non-negative, got {exponent}"
            )));
        }
        if !modulus.is_integer() {
            return Err(FinMathError::DomainError(format!(
                "modulus must be an integer, got {modulus}"
            )));
        }
        if modulus.to_bigint().is_zero() {
            return Err(FinMathError::DivisionByZero {
                context: format!("{self}^{exponent} mod {modulus}"),
            });
        }

        let base = self.to_bigint();
        let exponent = exponent.to_bigint();
        let modulus = modulus.to_bigint().abs();

        let mut result = base.abs().modpow(&exponent, &modulus);
        if base.is_negative() && exponent.is_odd() && !result.is_zero() {
            result = -result;
        }
        Ok(BcNumber::new(result, 0).with_scale(scale))
    }

    /// Principal square root, truncated at `scale`.
    pub fn sqrt_at(&self, scale: u32) -> FinMathResult<BcNumber> {
        if self.is_negative() {
            return Err(FinMathError::DomainError(format!(
                "square root of negative number {self}"
            )));
        }
        // floor(sqrt(x) * 10^scale) = isqrt(floor(x * 10^(2 * scale)))
        let target = scale * 2;
        let radicand = if target >= self.scale() {
            self.unscaled() * ten_pow(target - self.scale())
        } else {
            self.unscaled() / ten_pow(self.scale() - target)
        };
        Ok(BcNumber::new(radicand.sqrt(), scale))
    }

    /// Compare only the digits up to `scale`.
    pub fn cmp_at(&self, other: &BcNumber, scale: u32) -> Ordering {
        self.with_scale(scale).cmp(&other.with_scale(scale))
    }
}

fn unary<A: Operand>(operand: A) -> FinMathResult<BcNumber> {
    operand.to_bc()
}

/// `left + right`
pub fn add(left: impl Operand, right: impl Operand, scale: Option<u32>) -> FinMathResult<String> {
    Ok(unary(left)?
        .add_at(&unary(right)?, resolve_scale(scale))
        .to_string())
}

/// Left fold of [`add`] starting from `0`; every partial sum is truncated at the same scale.
pub fn adds<T: Operand>(operands: &[T], scale: Option<u32>) -> FinMathResult<String> {
    Ok(sum_at(operands, resolve_scale(scale))?.to_string())
}

/// `left - right`
pub fn sub(left: impl Operand, right: impl Operand, scale: Option<u32>) -> FinMathResult<String> {
    Ok(unary(left)?
        .sub_at(&unary(right)?, resolve_scale(scale))
        .to_string())
}

/// `left - (right[0] + right[1] + ...)`
pub fn subs<T: Operand>(
    left: impl Operand,
    right: &[T],
    scale: Option<u32>,
) -> FinMathResult<String> {
    let scale = resolve_scale(scale);
    let total = sum_at(right, scale)?;
    Ok(unary(left)?.sub_at(&total, scale).to_string())
}

/// `left * right`
pub fn mul(left: impl Operand, right: impl Operand, scale: Option<u32>) -> FinMathResult<String> {
    Ok(unary(left)?
        .mul_at(&unary(right)?, resolve_scale(scale))
        .to_string())
}

/// Left fold of [`mul`] starting from `1`; every partial product is truncated at the same scale.
pub fn muls<T: Operand>(operands: &[T], scale: Option<u32>) -> FinMathResult<String> {
    Ok(product_at(operands, resolve_scale(scale))?.to_string())
}

/// `left / right`
pub fn div(left: impl Operand, right: impl Operand, scale: Option<u32>) -> FinMathResult<String> {
    Ok(unary(left)?
        .div_at(&unary(right)?, resolve_scale(scale))?
        .to_string())
}

/// `left / (right[0] * right[1] * ...)`, the divisor product folded at the same scale.
pub fn divs<T: Operand>(
    left: impl Operand,
    right: &[T],
    scale: Option<u32>,
) -> FinMathResult<String> {
    let scale = resolve_scale(scale);
    let divisor = product_at(right, scale)?;
    Ok(unary(left)?.div_at(&divisor, scale)?.to_string())
}

/// Remainder of `left / modulus`, sign following `left`.
pub fn modulo(
    left: impl Operand,
    modulus: impl Operand,
    scale: Option<u32>,
) -> FinMathResult<String> {
    Ok(unary(left)?
        .rem_at(&unary(modulus)?, resolve_scale(scale))?
        .to_string())
}

/// `base ^ exponent` for a whole-number exponent.
pub fn pow(base: impl Operand, exponent: impl Operand, scale: Option<u32>) -> FinMathResult<String> {
    Ok(unary(base)?
        .pow_at(&unary(exponent)?, resolve_scale(scale))?
        .to_string())
}

/// `(base ^ exponent) mod modulus` without materialising the full power.
pub fn powmod(
    base: impl Operand,
    exponent: impl Operand,
    modulus: impl Operand,
    scale: Option<u32>,
) -> FinMathResult<String> {
    Ok(unary(base)?
        .powmod_at(&unary(exponent)?, &unary(modulus)?, resolve_scale(scale))?
        .to_string())
}

pub fn sqrt(operand: impl Operand, scale: Option<u32>) -> FinMathResult<String> {
    Ok(unary(operand)?.sqrt_at(resolve_scale(scale))?.to_string())
}

/// Three-way comparison of the digits up to `scale`: -1, 0 or 1.
pub fn comp(left: impl Operand, right: impl Operand, scale: Option<u32>) -> FinMathResult<i32> {
    let ordering = unary(left)?.cmp_at(&unary(right)?, resolve_scale(scale));
    Ok(match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    })
}

pub(crate) fn sum_at<T: Operand>(operands: &[T], scale: u32) -> FinMathResult<BcNumber> {
    let total = operands.iter().try_fold(BcNumber::zero(), |total, operand| {
        Ok::<_, FinMathError>(total.add_at(&operand.to_bc()?, scale))
    })?;
    Ok(total.with_scale(scale))
}

pub(crate) fn product_at<T: Operand>(operands: &[T], scale: u32) -> FinMathResult<BcNumber> {
    let total = operands.iter().try_fold(BcNumber::one(), |total, operand| {
        Ok::<_, FinMathError>(total.mul_at(&operand.to_bc()?, scale))
    })?;
    Ok(total.with_scale(scale))
}
