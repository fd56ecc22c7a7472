use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::{checked, round_money, RepaymentModel, SchedulePeriod};
use super::terms::LoanTerms;
use crate::error::FinMathError;
use crate::types::Money;
use crate::FinMathResult;

/// Straight-line loan: the same principal every period plus interest on
/// the outstanding balance, so payments decline over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualPrincipal {
    pub terms: LoanTerms,
}

impl EqualPrincipal {
    pub fn new(terms: LoanTerms) -> Self {
        EqualPrincipal { terms }
    }
}

impl RepaymentModel for EqualPrincipal {
    fn name(&self) -> &'static str {
        "equal_principal"
    }

    fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    fn level_amount(&self, scale: u32) -> FinMathResult<Money> {
        let periods = Decimal::from(self.terms.periods);
        if periods.is_zero() {
            return Err(FinMathError::DivisionByZero {
                context: "equal principal with zero periods".into(),
            });
        }
        Ok(round_money(self.terms.capital / periods, scale))
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
            payment: round_money(checked(level.checked_add(interest), "payment")?, scale),
            principal: level,
            interest,
        })
    }

    fn reconcile(
        &self,
        row: &SchedulePeriod,
        _level: Money,
        principal: Money,
        scale: u32,
    ) -> FinMathResult<SchedulePeriod> {
        Ok(SchedulePeriod {
            period: row.period,
            payment: round_money(
                checked(principal.checked_add(row.interest), "payment")?,
                scale,
            ),
            principal,
            interest: row.interest,
        })
    }

    /// `(n + 1) · C · i / 2`
    fn total_interest(&self) -> FinMathResult<Money> {
        let factor = Decimal::from(u64::from(self.terms.periods) + 1);
        let product = checked(
            factor
                .checked_mul(self.terms.capital)
                .and_then(|v| v.checked_mul(self.terms.period_rate())),
            "total interest",
        )?;
        Ok(product / Decimal::TWO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::ScheduleOptions;
    use rust_decimal_macros::dec;

    fn loan(capital: Decimal, rate: Decimal, periods: u32) -> EqualPrincipal {
        EqualPrincipal::new(LoanTerms::new(capital, rate, periods))
    }

    #[test]
    fn test_three_period_schedule() {
        let model = loan(dec!(10000), dec!(0.12), 3);
        let schedule = model.schedule(&ScheduleOptions::default()).unwrap();
        let rows: Vec<_> = schedule
            .periods
            .iter()
            .map(|p| (p.payment, p.principal, p.interest))
            .collect();
        assert_eq!(
            rows,
            vec![
                (dec!(3433.33), dec!(3333.33), dec!(100.00)),
                (dec!(3400.00), dec!(3333.33), dec!(66.67)),
                (dec!(3366.67), dec!(3333.34), dec!(33.33)),
            ]
        );
    }

    #[test]
    fn test_fix_in_first_period() {
        let model = loan(dec!(10000), dec!(0.12), 3);
        let options = ScheduleOptions::default().with_fix_period(1);
        let schedule = model.schedule(&options).unwrap();
        assert_eq!(schedule.periods[0].principal, dec!(3333.34));
        assert_eq!(schedule.periods[0].interest, dec!(100.00));
        assert_eq!(schedule.periods[0].payment, dec!(3433.34));
        assert_eq!(schedule.periods[2].principal, dec!(3333.33));
        assert_eq!(schedule.total_principal().unwrap(), dec!(10000));
    }

    #[test]
    fn test_total_interest_closed_form() {
        let model = loan(dec!(10000), dec!(0.12), 3);
        assert_eq!(model.total_interest().unwrap(), dec!(200));
        assert_eq!(model.total_payment().unwrap(), dec!(10200));

        let schedule = model.schedule(&ScheduleOptions::default()).unwrap();
        assert_eq!(schedule.total_interest().unwrap(), dec!(200.00));
    }

    #[test]
    fn test_interest_free() {
        let model = loan(dec!(100), dec!(0), 3);
        let schedule = model.schedule(&ScheduleOptions::default()).unwrap();
        assert!(schedule.periods.iter().all(|p| p.interest.is_zero()));
        assert_eq!(schedule.periods[2].principal, dec!(33.34));
        assert_eq!(schedule.total_payment().unwrap(), dec!(100));
    }

    #[test]
    fn test_payment_overflow_is_reported() {
        // 7.8e28 principal plus 2% interest exceeds the decimal range
        let model = loan(dec!(78000000000000000000000000000), dec!(0.24), 1);
        let err = model.schedule(&ScheduleOptions::default()).unwrap_err();
        assert!(matches!(err, FinMathError::DomainError(_)));
    }
}
