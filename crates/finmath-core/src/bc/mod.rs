//! Arbitrary-precision decimal arithmetic.
//!
//! Operands are anything convertible to an exact decimal ([`Operand`]) and
//! results come back as exact decimal strings, truncated at the requested
//! scale. Pass `None` to use the process-wide default set with [`scale`], or
//! hold a [`BcContext`] to keep the scale explicit.
//!
//! ```
//! use finmath_core::bc;
//!
//! assert_eq!(bc::add("110.2", "229.2", Some(1)).unwrap(), "339.4");
//! assert_eq!(bc::div(5, 2, Some(1)).unwrap(), "2.5");
//! assert_eq!(bc::sqrt("2", Some(3)).unwrap(), "1.414");
//! ```

mod context;
mod number;
mod ops;

pub use context::{default_scale, scale, BcContext};
pub use number::{BcNumber, Operand};
pub use ops::{add, adds, comp, div, divs, modulo, mul, muls, pow, powmod, sqrt, sub, subs};
