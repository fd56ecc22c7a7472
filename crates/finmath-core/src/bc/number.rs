use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, ToPrimitive, Zero};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::FinMathError;
use crate::FinMathResult;

/// 10^exp as a BigInt
pub(crate) fn ten_pow(exp: u32) -> BigInt {
    BigInt::from(10u8).pow(exp)
}

/// An exact base-10 number: `unscaled / 10^scale`.
///
/// The scale is the count of digits kept after the decimal point. Values are
/// never normalised, so `"1.50"` keeps scale 2 and renders back as `"1.50"`.
#[derive(Debug, Clone)]
pub struct BcNumber {
    unscaled: BigInt,
    scale: u32,
}

impl BcNumber {
    pub fn new(unscaled: BigInt, scale: u32) -> Self {
        BcNumber { unscaled, scale }
    }

    pub fn zero() -> Self {
        BcNumber::new(BigInt::zero(), 0)
    }

    pub fn one() -> Self {
        BcNumber::new(BigInt::one(), 0)
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.unscaled.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.unscaled.sign() == Sign::Minus
    }

    /// True when every digit after the decimal point is zero
    pub fn is_integer(&self) -> bool {
        self.scale == 0 || (&self.unscaled % ten_pow(self.scale)).is_zero()
    }

    pub fn abs(&self) -> Self {
        BcNumber::new(self.unscaled.abs(), self.scale)
    }

    /// Change the scale. Widening pads with zeros; narrowing truncates toward zero.
    pub fn with_scale(&self, scale: u32) -> Self {
        match scale.cmp(&self.scale) {
            Ordering::Equal => self.clone(),
            Ordering::Greater => {
                BcNumber::new(&self.unscaled * ten_pow(scale - self.scale), scale)
            }
            Ordering::Less => BcNumber::new(&self.unscaled / ten_pow(self.scale - scale), scale),
        }
    }

    /// Integer part, truncated toward zero
    pub fn to_bigint(&self) -> BigInt {
        &self.unscaled / ten_pow(self.scale)
    }

    pub fn to_f64(&self) -> Option<f64> {
        self.to_string().parse::<f64>().ok()
    }

    /// Both unscaled values expressed at the larger of the two scales
    pub(crate) fn aligned(&self, other: &BcNumber) -> (BigInt, BigInt, u32) {
        let scale = self.scale.max(other.scale);
        let left = self.with_scale(scale).unscaled;
        let right = other.with_scale(scale).unscaled;
        (left, right, scale)
    }
}

impl PartialEq for BcNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BcNumber {}

impl PartialOrd for BcNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BcNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        let (left, right, _) = self.aligned(other);
        left.cmp(&right)
    }
}

impl FromStr for BcNumber {
    type Err = FinMathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let malformed = || FinMathError::InvalidInput {
            field: "operand".into(),
            reason: format!("'{s}' is not a well-formed decimal number"),
        };

        let (negative, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(malformed());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let scale = u32::try_from(frac_part.len()).map_err(|_| malformed())?;
        let digits = format!("{int_part}{frac_part}");
        let mut unscaled = BigInt::from_str(&digits).map_err(|_| malformed())?;
        if negative {
            unscaled = -unscaled;
        }

        Ok(BcNumber::new(unscaled, scale))
    }
}

impl fmt::Display for BcNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.abs().to_string();
        let scale = self.scale as usize;

        // Zero never carries a sign: -0.001 truncated to scale 2 prints "0.00"
        if self.is_negative() {
            write!(f, "-")?;
        }

        if scale == 0 {
            return write!(f, "{digits}");
        }

        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{int_part}.{frac_part}")
    }
}

/// Anything that converts to an exact decimal: strings, integers, floats, Decimals.
pub trait Operand {
    fn to_bc(&self) -> FinMathResult<BcNumber>;
}

impl Operand for BcNumber {
    fn to_bc(&self) -> FinMathResult<BcNumber> {
        Ok(self.clone())
    }
}

impl Operand for str {
    fn to_bc(&self) -> FinMathResult<BcNumber> {
        self.parse()
    }
}

impl Operand for String {
    fn to_bc(&self) -> FinMathResult<BcNumber> {
        self.parse()
    }
}

impl Operand for Decimal {
    fn to_bc(&self) -> FinMathResult<BcNumber> {
        BcNumber::from_str(&self.to_string())
    }
}

impl Operand for f64 {
    fn to_bc(&self) -> FinMathResult<BcNumber> {
        if !self.is_finite() {
            return Err(FinMathError::InvalidInput {
                field: "operand".into(),
                reason: format!("{self} has no exact decimal representation"),
            });
        }
        // f64's Display never uses exponent notation
        BcNumber::from_str(&self.to_string())
    }
}

macro_rules! impl_integer_operand {
    ($($t:ty),*) => {
        $(
            impl Operand for $t {
                fn to_bc(&self) -> FinMathResult<BcNumber> {
                    Ok(BcNumber::new(BigInt::from(*self), 0))
                }
            }
        )*
    };
}

impl_integer_operand!(i32, i64, u32, u64, usize);

impl<T: Operand + ?Sized> Operand for &T {
    fn to_bc(&self) -> FinMathResult<BcNumber> {
        (**self).to_bc()
    }
}

/// Exponent and modulus arguments must be whole numbers that fit the machine word.
pub(crate) fn integral_u64(value: &BcNumber, field: &str) -> FinMathResult<u64> {
    if !value.is_integer() {
        return Err(FinMathError::DomainError(format!(
            "{field} must be an integer, got {value}"
        )));
    }
    value.to_bigint().abs().to_u64().ok_or_else(|| {
        FinMathError::DomainError(format!("{field} {value} is too large"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_keep_scale() {
        let n: BcNumber = "-12.340".parse().unwrap();
        assert_eq!(n.scale(), 3);
        assert_eq!(n.to_string(), "-12.340");
    }

    #[test]
    fn test_parse_leading_and_trailing_point() {
        assert_eq!(".5".parse::<BcNumber>().unwrap().to_string(), "0.5");
        assert_eq!("7.".parse::<BcNumber>().unwrap().to_string(), "7");
        assert_eq!("+3".parse::<BcNumber>().unwrap().to_string(), "3");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<BcNumber>().is_err());
        assert!(".".parse::<BcNumber>().is_err());
        assert!("1e5".parse::<BcNumber>().is_err());
        assert!("12a".parse::<BcNumber>().is_err());
        assert!("--1".parse::<BcNumber>().is_err());
    }

    #[test]
    fn test_with_scale_truncates_toward_zero() {
        let n: BcNumber = "-1.999".parse().unwrap();
        assert_eq!(n.with_scale(1).to_string(), "-1.9");
        assert_eq!(n.with_scale(5).to_string(), "-1.99900");
    }

    #[test]
    fn test_negative_zero_prints_unsigned() {
        let n: BcNumber = "-0.001".parse().unwrap();
        assert_eq!(n.with_scale(2).to_string(), "0.00");
    }

    #[test]
    fn test_small_fraction_display() {
        let n = BcNumber::new(BigInt::from(5), 4);
        assert_eq!(n.to_string(), "0.0005");
    }

    #[test]
    fn test_ordering_ignores_scale() {
        let a: BcNumber = "1.50".parse().unwrap();
        let b: BcNumber = "1.5".parse().unwrap();
        assert_eq!(a, b);
        assert!("-2".parse::<BcNumber>().unwrap() < b);
    }

    #[test]
    fn test_float_operand() {
        assert_eq!(0.1f64.to_bc().unwrap().to_string(), "0.1");
        assert_eq!(1e-7f64.to_bc().unwrap().to_string(), "0.0000001");
        assert!(f64::NAN.to_bc().is_err());
    }

    #[test]
    fn test_is_integer() {
        assert!("4.000".parse::<BcNumber>().unwrap().is_integer());
        assert!(!"4.001".parse::<BcNumber>().unwrap().is_integer());
    }
}
