use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinMathError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid cash flow: {function} requires at least one positive and one negative value")]
    InvalidCashFlow { function: String },

    #[error("Degenerate derivative: {function} derivative is zero at rate {rate} (iteration {iteration})")]
    DegenerateDerivative {
        function: String,
        rate: f64,
        iteration: u32,
    },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (residual: {last_delta})")]
    NonConvergence {
        function: String,
        iterations: u32,
        last_delta: f64,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FinMathError {
    fn from(e: serde_json::Error) -> Self {
        FinMathError::SerializationError(e.to_string())
    }
}
