use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use super::schedule::{checked, round_money, RepaymentModel, SchedulePeriod};
use super::terms::LoanTerms;
use crate::error::FinMathError;
use crate::types::Money;
use crate::FinMathResult;

/// Level-payment loan (French amortisation): every period pays the same
/// amount, with interest shrinking and principal growing as the balance falls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualInstallment {
    pub terms: LoanTerms,
}

impl EqualInstallment {
    pub fn new(terms: LoanTerms) -> Self {
        EqualInstallment { terms }
    }

    /// Unrounded level payment `C·i·(1+i)^n / ((1+i)^n − 1)`, or `C/n` interest-free
    pub fn rent(&self) -> FinMathResult<Money> {
        let capital = self.terms.capital;
        let periods = Decimal::from(self.terms.periods);
        let rate = self.terms.period_rate();

        if rate.is_zero() {
            if periods.is_zero() {
                return Err(FinMathError::DivisionByZero {
                    context: "equal installment with zero periods".into(),
                });
            }
            return Ok(capital / periods);
        }

        let growth = checked(
            (Decimal::ONE + rate).checked_powu(u64::from(self.terms.periods)),
            "compound growth",
        )?;
        let numerator = checked(
            capital
                .checked_mul(rate)
                .and_then(|v| v.checked_mul(growth)),
            "level payment",
        )?;
        checked(numerator.checked_div(growth - Decimal::ONE), "level payment")
    }
}

impl RepaymentModel for EqualInstallment {
    fn name(&self) -> &'static str {
        "equal_installment"
    }

    fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    fn level_amount(&self, scale: u32) -> FinMathResult<Money> {
        Ok(round_money(self.rent()?, scale))
    }

    fn split_period(
        &self,
        period: u32,
        level: Money,
        balance: Money,
        scale: u32,
    ) -> FinMathResult<SchedulePeriod> {
        let interest = round_money(
            checked(balance.checked_mul(self.terms.period_rate()), "interest")?,
            scale,
        );
        Ok(SchedulePeriod {
            period,
            payment: level,
            principal: round_money(checked(level.checked_sub(interest), "principal")?, scale),
            interest,
        })
    }

    fn reconcile(
        &self,
        row: &SchedulePeriod,
        level: Money,
        principal: Money,
        scale: u32,
    ) -> FinMathResult<SchedulePeriod> {
        Ok(SchedulePeriod {
            period: row.period,
            payment: level,
            principal,
            interest: round_money(checked(level.checked_sub(principal), "interest")?, scale),
        })
    }

    /// `rent · n − C`
    fn total_interest(&self) -> FinMathResult<Money> {
        let total = checked(
            self.rent()?
                .checked_mul(Decimal::from(self.terms.periods)),
            "total payment",
        )?;
        checked(total.checked_sub(self.terms.capital), "total interest")
    }
}
