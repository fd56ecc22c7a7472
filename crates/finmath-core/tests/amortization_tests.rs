use chrono::NaiveDate;
use finmath_core::amortization::{
    amortize, AmortizationInput, EqualInstallment, EqualPrincipal, LoanTerms, RepaymentMethod,
    RepaymentModel, ScheduleOptions, SchedulePeriod,
};
use finmath_core::FinMathError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn mortgage() -> LoanTerms {
    LoanTerms::new(dec!(1180000), dec!(0.0525), 360)
}

fn row(period: u32, payment: Decimal, principal: Decimal, interest: Decimal) -> SchedulePeriod {
    SchedulePeriod {
        period,
        payment,
        principal,
        interest,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ===========================================================================
// Equal installment
// ===========================================================================

#[test]
fn test_equal_installment_mortgage() {
    let model = EqualInstallment::new(mortgage());
    let schedule = model.schedule(&ScheduleOptions::default()).unwrap();

    assert_eq!(schedule.len(), 360);
    assert_eq!(
        schedule.periods[0],
        row(1, dec!(6516.00), dec!(1353.50), dec!(5162.50))
    );
    assert_eq!(
        schedule.periods[359],
        row(360, dec!(6516.00), dec!(6490.58), dec!(25.42))
    );
    assert!(schedule.periods.iter().all(|p| p.payment == dec!(6516.00)));
    assert_eq!(schedule.total_principal().unwrap(), dec!(1180000.00));
    assert_eq!(schedule.total_interest().unwrap(), dec!(1165760.00));
}

#[test]
fn test_equal_installment_fix_in_first_period() {
    let model = EqualInstallment::new(mortgage());
    let options = ScheduleOptions::default().with_fix_period(1);
    let schedule = model.schedule(&options).unwrap();

    assert_eq!(
        schedule.periods[0],
        row(1, dec!(6516.00), dec!(1356.48), dec!(5159.52))
    );
    assert_eq!(
        schedule.periods[359],
        row(360, dec!(6516.00), dec!(6487.60), dec!(28.40))
    );
}

#[test]
fn test_equal_installment_rates() {
    let model = EqualInstallment::new(mortgage());
    assert_eq!(model.monthly_interest_rate(), dec!(0.004375));
    assert_eq!(model.issue_interest_rate(), dec!(0.004375));
}

#[test]
fn test_quarterly_installments() {
    let terms = LoanTerms::new(dec!(1000), dec!(0.12), 4).with_months_per_period(3);
    let model = EqualInstallment::new(terms);
    let schedule = model.schedule(&ScheduleOptions::default()).unwrap();
    assert_eq!(
        schedule.periods,
        vec![
            row(1, dec!(269.03), dec!(239.03), dec!(30.00)),
            row(2, dec!(269.03), dec!(246.20), dec!(22.83)),
            row(3, dec!(269.03), dec!(253.59), dec!(15.44)),
            row(4, dec!(269.03), dec!(261.18), dec!(7.85)),
        ]
    );
}

// ===========================================================================
// Equal principal
// ===========================================================================

#[test]
fn test_equal_principal_mortgage() {
    let model = EqualPrincipal::new(mortgage());
    let schedule = model.schedule(&ScheduleOptions::default()).unwrap();

    assert_eq!(
        schedule.periods[0],
        row(1, dec!(8440.28), dec!(3277.78), dec!(5162.50))
    );
    assert_eq!(
        schedule.periods[359],
        row(360, dec!(3291.32), dec!(3276.98), dec!(14.34))
    );
    assert_eq!(schedule.total_interest().unwrap(), dec!(931830.64));
    assert_eq!(schedule.total_payment().unwrap(), dec!(2111830.64));
}

#[test]
fn test_equal_principal_total_interest_formula() {
    // 361 * 1180000 * 0.004375 / 2
    let model = EqualPrincipal::new(mortgage());
    assert_eq!(model.total_interest().unwrap(), dec!(931831.25));
    assert_eq!(model.total_payment().unwrap(), dec!(2111831.25));
}

// ===========================================================================
// Shared schedule behaviour
// ===========================================================================

#[test]
fn test_principal_sums_to_capital_for_every_fix_period() {
    let models: Vec<Box<dyn RepaymentModel>> = vec![
        Box::new(EqualInstallment::new(mortgage())),
        Box::new(EqualPrincipal::new(mortgage())),
    ];
    for model in &models {
        for fix in [-1, -2, -360, 1, 180, 360] {
            let options = ScheduleOptions::default().with_fix_period(fix);
            let schedule = model.schedule(&options).unwrap();
            assert_eq!(
                schedule.total_principal().unwrap(),
                dec!(1180000.00),
                "{} fix {fix}",
                model.name()
            );
        }
    }
}

#[test]
fn test_invalid_fix_period() {
    let model = EqualInstallment::new(mortgage());
    for fix in [0, 361, -361] {
        let options = ScheduleOptions::default().with_fix_period(fix);
        let err = model.schedule(&options).unwrap_err();
        assert!(matches!(err, FinMathError::InvalidInput { .. }), "fix {fix}");
    }
}

#[test]
fn test_disbursement_row() {
    let model = EqualPrincipal::new(LoanTerms::new(dec!(10000), dec!(0.12), 3));
    let options = ScheduleOptions::default().with_disbursement(true);
    let schedule = model.schedule(&options).unwrap();

    assert_eq!(schedule.len(), 4);
    assert_eq!(
        schedule.periods[0],
        row(0, dec!(-10000), dec!(-10000), dec!(0))
    );
    // Totals cover repayments only
    assert_eq!(schedule.total_principal().unwrap(), dec!(10000.00));
}

#[test]
fn test_scale_zero() {
    let model = EqualInstallment::new(LoanTerms::new(dec!(10000), dec!(0.12), 12));
    let options = ScheduleOptions::default().with_scale(0);
    let schedule = model.schedule(&options).unwrap();
    assert!(schedule.periods.iter().all(|p| p.payment == dec!(888)));
    assert_eq!(schedule.total_principal().unwrap(), dec!(10000));
}

#[test]
fn test_overflowing_capital_returns_error() {
    let huge = Decimal::MAX - dec!(1);
    let principal_model = EqualPrincipal::new(LoanTerms::new(huge, dec!(0.24), 1));
    let err = principal_model
        .schedule(&ScheduleOptions::default())
        .unwrap_err();
    assert!(matches!(err, FinMathError::DomainError(_)));

    let installment_model = EqualInstallment::new(LoanTerms::new(
        dec!(40000000000000000000000000000),
        dec!(0.12),
        360,
    ));
    let totals = installment_model
        .schedule(&ScheduleOptions::default())
        .and_then(|schedule| schedule.total_payment());
    assert!(matches!(totals, Err(FinMathError::DomainError(_))));
}

// ===========================================================================
// Dated schedule
// ===========================================================================

#[test]
fn test_dated_schedule_monthly() {
    let model = EqualPrincipal::new(LoanTerms::new(dec!(10000), dec!(0.12), 3));
    let dated = model
        .dated_schedule(date(2021, 6, 30), &ScheduleOptions::default())
        .unwrap();

    let dates: Vec<_> = dated.keys().copied().collect();
    assert_eq!(
        dates,
        vec![date(2021, 7, 30), date(2021, 8, 30), date(2021, 9, 30)]
    );
    assert_eq!(dated[&date(2021, 9, 30)].principal, dec!(3333.34));
}

#[test]
fn test_dated_schedule_keeps_start_when_asked() {
    let model = EqualInstallment::new(LoanTerms::new(dec!(1000), dec!(0.12), 4).with_months_per_period(3));
    let options = ScheduleOptions::default().with_disbursement(true);
    let dated = model.dated_schedule(date(2021, 1, 31), &options).unwrap();

    let dates: Vec<_> = dated.keys().copied().collect();
    assert_eq!(
        dates,
        vec![
            date(2021, 1, 31),
            date(2021, 4, 30),
            date(2021, 7, 31),
            date(2021, 10, 31),
            date(2022, 1, 31),
        ]
    );
    assert_eq!(dated[&date(2021, 1, 31)].period, 0);
}

// ===========================================================================
// Envelope
// ===========================================================================

#[test]
fn test_amortize_envelope() {
    let input = AmortizationInput {
        terms: mortgage(),
        method: RepaymentMethod::EqualInstallment,
        options: ScheduleOptions::default(),
        start_date: Some(date(2021, 1, 15)),
    };
    let out = amortize(&input).unwrap();

    assert_eq!(out.result.level_amount, dec!(6516.00));
    assert_eq!(out.result.schedule.len(), 360);
    assert_eq!(out.result.schedule[0].date, Some(date(2021, 2, 15)));
    assert_eq!(out.result.schedule[359].date, Some(date(2051, 1, 15)));
    assert_eq!(out.result.schedule_interest, dec!(1165760.00));
    assert!(out.methodology.contains("Equal installment"));

    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["result"]["schedule"][0]["payment"], "6516.00");
    assert_eq!(json["result"]["schedule"][0]["date"], "2021-02-15");
}
