use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinMathError;
use crate::types::{Money, Rate};
use crate::FinMathResult;

fn default_months_per_period() -> u32 {
    1
}

/// The loan being repaid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount disbursed
    pub capital: Money,
    /// Nominal annual interest rate (0.05 = 5%)
    pub annual_rate: Rate,
    /// Number of repayment periods
    pub periods: u32,
    /// Calendar months covered by one period (1 = monthly, 3 = quarterly)
    #[serde(default = "default_months_per_period")]
    pub months_per_period: u32,
}

impl LoanTerms {
    pub fn new(capital: Money, annual_rate: Rate, periods: u32) -> Self {
        LoanTerms {
            capital,
            annual_rate,
            periods,
            months_per_period: default_months_per_period(),
        }
    }

    pub fn with_months_per_period(mut self, months: u32) -> Self {
        self.months_per_period = months;
        self
    }

    pub fn validate(&self) -> FinMathResult<()> {
        if self.capital <= Decimal::ZERO {
            return Err(FinMathError::InvalidInput {
                field: "capital".into(),
                reason: "Loan capital must be positive".into(),
            });
        }
        if self.annual_rate < Decimal::ZERO {
            return Err(FinMathError::InvalidInput {
                field: "annual_rate".into(),
                reason: "Annual rate cannot be negative".into(),
            });
        }
        if self.periods == 0 {
            return Err(FinMathError::InvalidInput {
                field: "periods".into(),
                reason: "At least one repayment period is required".into(),
            });
        }
        if self.months_per_period == 0 {
            return Err(FinMathError::InvalidInput {
                field: "months_per_period".into(),
                reason: "A period must span at least one month".into(),
            });
        }
        Ok(())
    }

    /// Annual rate spread over twelve months
    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate / dec!(12)
    }

    /// Rate charged per repayment period
    pub fn period_rate(&self) -> Rate {
        self.annual_rate * Decimal::from(self.months_per_period) / dec!(12)
    }
}
