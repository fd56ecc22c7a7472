pub mod bc;
pub mod error;
pub mod solver;
pub mod time_value;
pub mod types;

#[cfg(feature = "cash_flow")]
pub mod cash_flow;

#[cfg(feature = "amortization")]
pub mod amortization;

pub use error::FinMathError;
pub use solver::SolverConfig;
pub use types::*;

/// Standard result type for all finmath operations
pub type FinMathResult<T> = Result<T, FinMathError>;
