use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

use super::number::Operand;
use super::ops;
use crate::FinMathResult;

static DEFAULT_SCALE: AtomicU32 = AtomicU32::new(0);

/// Set the process-wide default scale used by operations called with `None`.
///
/// Returns the previous default. Only calls made after this returns are
/// affected. Concurrent callers that mutate the default race with each
/// other's `None`-scale calls; pass an explicit scale or use a [`BcContext`]
/// instead.
pub fn scale(scale: u32) -> u32 {
    DEFAULT_SCALE.swap(scale, Ordering::SeqCst)
}

/// Current process-wide default scale
pub fn default_scale() -> u32 {
    DEFAULT_SCALE.load(Ordering::SeqCst)
}

pub(crate) fn resolve_scale(scale: Option<u32>) -> u32 {
    scale.unwrap_or_else(default_scale)
}

/// An explicit execution context carrying its own scale.
///
/// Every operation runs at `self.scale` and never reads the process-wide
/// default, so contexts can be shared freely across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BcContext {
    pub scale: u32,
}

impl BcContext {
    pub fn new(scale: u32) -> Self {
        BcContext { scale }
    }

    fn s(&self) -> Option<u32> {
        Some(self.scale)
    }

    pub fn add(&self, left: impl Operand, right: impl Operand) -> FinMathResult<String> {
        ops::add(left, right, self.s())
    }

    pub fn adds<T: Operand>(&self, operands: &[T]) -> FinMathResult<String> {
        ops::adds(operands, self.s())
    }

    pub fn sub(&self, left: impl Operand, right: impl Operand) -> FinMathResult<String> {
        ops::sub(left, right, self.s())
    }

    pub fn subs<T: Operand>(&self, left: impl Operand, right: &[T]) -> FinMathResult<String> {
        ops::subs(left, right, self.s())
    }

    pub fn mul(&self, left: impl Operand, right: impl Operand) -> FinMathResult<String> {
        ops::mul(left, right, self.s())
    }

    pub fn muls<T: Operand>(&self, operands: &[T]) -> FinMathResult<String> {
        ops::muls(operands, self.s())
    }

    pub fn div(&self, left: impl Operand, right: impl Operand) -> FinMathResult<String> {
        ops::div(left, right, self.s())
    }

    pub fn divs<T: Operand>(&self, left: impl Operand, right: &[T]) -> FinMathResult<String> {
        ops::divs(left, right, self.s())
    }

    pub fn modulo(&self, left: impl Operand, modulus: impl Operand) -> FinMathResult<String> {
        ops::modulo(left, modulus, self.s())
    }

    pub fn pow(&self, base: impl Operand, exponent: impl Operand) -> FinMathResult<String> {
        ops::pow(base, exponent, self.s())
    }

    pub fn powmod(
        &self,
        base: impl Operand,
        exponent: impl Operand,
        modulus: impl Operand,
    ) -> FinMathResult<String> {
        ops::powmod(base, exponent, modulus, self.s())
    }

    pub fn sqrt(&self, operand: impl Operand) -> FinMathResult<String> {
        ops::sqrt(operand, self.s())
    }

    pub fn comp(&self, left: impl Operand, right: impl Operand) -> FinMathResult<i32> {
        ops::comp(left, right, self.s())
    }
}
