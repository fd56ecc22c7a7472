use finmath_core::bc::{self, BcContext, BcNumber};
use finmath_core::FinMathError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal_macros::dec;

/// Render a count of thousandths as a 3-place decimal string
fn thousandths(n: i64) -> String {
    let sign = if n < 0 { "-" } else { "" };
    format!("{sign}{}.{:03}", n.abs() / 1000, n.abs() % 1000)
}

// ===========================================================================
// Truncation and formatting
// ===========================================================================

#[test]
fn test_results_truncate_toward_zero() {
    assert_eq!(bc::mul("1.25", "1.25", Some(2)).unwrap(), "1.56");
    assert_eq!(bc::div("1", "3", Some(5)).unwrap(), "0.33333");
    assert_eq!(bc::div("-1", "3", Some(2)).unwrap(), "-0.33");
    assert_eq!(bc::sub("0", "2.999", Some(1)).unwrap(), "-2.9");
}

#[test]
fn test_results_padded_to_scale() {
    assert_eq!(bc::add("1", "2", Some(4)).unwrap(), "3.0000");
    assert_eq!(bc::div("100", "4", Some(3)).unwrap(), "25.000");
    assert_eq!(bc::sqrt("16", Some(0)).unwrap(), "4");
}

#[test]
fn test_negative_zero_prints_unsigned() {
    assert_eq!(bc::add("-0.001", "0.0005", Some(3)).unwrap(), "0.000");
    assert_eq!(bc::mul("-0.01", "0.01", Some(2)).unwrap(), "0.00");
}

#[test]
fn test_mixed_operand_types() {
    assert_eq!(bc::add(1i32, 2.5f64, Some(1)).unwrap(), "3.5");
    assert_eq!(bc::mul(dec!(1.5), "2", Some(2)).unwrap(), "3.00");
    assert_eq!(bc::sub(10u64, String::from("0.25"), Some(2)).unwrap(), "9.75");
}

// ===========================================================================
// Powers, roots and modular arithmetic
// ===========================================================================

#[test]
fn test_pow() {
    assert_eq!(bc::pow("2", "10", Some(0)).unwrap(), "1024");
    assert_eq!(bc::pow("2", "-2", Some(4)).unwrap(), "0.2500");
    assert_eq!(bc::pow("1.1", "2", Some(1)).unwrap(), "1.2");
}

#[test]
fn test_sqrt_of_negative_is_domain_error() {
    let err = bc::sqrt("-4", Some(2)).unwrap_err();
    assert!(matches!(err, FinMathError::DomainError(_)));
}

#[test]
fn test_powmod() {
    assert_eq!(bc::powmod("4", "13", "497", Some(0)).unwrap(), "445");
    let err = bc::powmod("4", "13", "0", Some(0)).unwrap_err();
    assert!(matches!(err, FinMathError::DivisionByZero { .. }));
}

#[test]
fn test_division_by_zero() {
    for result in [
        bc::div("1", "0", Some(2)),
        bc::modulo("1", "0.00", Some(2)),
        bc::divs("1", &["2", "0"], Some(2)),
    ] {
        assert!(matches!(
            result.unwrap_err(),
            FinMathError::DivisionByZero { .. }
        ));
    }
}

#[test]
fn test_malformed_operand() {
    let err = bc::add("1e5", "1", Some(0)).unwrap_err();
    assert!(matches!(err, FinMathError::InvalidInput { .. }));
    assert!(bc::add("abc", "1", Some(0)).is_err());
}

// ===========================================================================
// Variadic helpers and comparison
// ===========================================================================

#[test]
fn test_variadic_folds() {
    assert_eq!(bc::adds(&["1.5", "2.25", "3"], Some(2)).unwrap(), "6.75");
    assert_eq!(bc::subs("10", &["1", "2", "3"], Some(0)).unwrap(), "4");
    assert_eq!(bc::divs("100", &["2", "5"], Some(2)).unwrap(), "10.00");
    // 1.5 * 1.5 = 2.25 -> 2.2, then 2.2 * 1.5 = 3.3
    assert_eq!(bc::muls(&["1.5", "1.5", "1.5"], Some(1)).unwrap(), "3.3");
}

#[test]
fn test_empty_folds() {
    let none: [&str; 0] = [];
    assert_eq!(bc::adds(&none, Some(2)).unwrap(), "0.00");
    assert_eq!(bc::muls(&none, Some(2)).unwrap(), "1.00");
}

#[test]
fn test_comp_respects_scale() {
    assert_eq!(bc::comp("1.001", "1.002", Some(2)).unwrap(), 0);
    assert_eq!(bc::comp("1.001", "1.002", Some(3)).unwrap(), -1);
    assert_eq!(bc::comp("5", "-5", Some(0)).unwrap(), 1);
}

#[test]
fn test_context_matches_free_functions() {
    let ctx = BcContext::new(4);
    assert_eq!(
        ctx.div("22", "7").unwrap(),
        bc::div("22", "7", Some(4)).unwrap()
    );
    assert_eq!(ctx.sqrt("2").unwrap(), "1.4142");
}

#[test]
fn test_bcnumber_equality_ignores_scale() {
    let a: BcNumber = "1.50".parse().unwrap();
    let b: BcNumber = "1.5".parse().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "1.50");
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn prop_add_then_sub_restores_operand(a in -1_000_000_000i64..1_000_000_000, b in -1_000_000_000i64..1_000_000_000) {
        let x = thousandths(a);
        let y = thousandths(b);
        let sum = bc::add(&x, &y, Some(3)).unwrap();
        prop_assert_eq!(bc::sub(&sum, &y, Some(3)).unwrap(), x);
    }

    #[test]
    fn prop_lower_scale_is_truncation(a in -1_000_000_000i64..1_000_000_000, b in -1_000_000_000i64..1_000_000_000, scale in 0u32..3) {
        let x = thousandths(a);
        let y = thousandths(b);
        let exact = bc::add(&x, &y, Some(3)).unwrap();
        prop_assert_eq!(
            bc::add(&x, &y, Some(scale)).unwrap(),
            bc::add(&exact, "0", Some(scale)).unwrap()
        );
    }

    #[test]
    fn prop_divs_divides_by_truncated_product(a in 1i64..1_000_000, b in 1i64..1_000_000, c in 1i64..1_000_000, scale in 3u32..8) {
        let (x, y, z) = (thousandths(a), thousandths(b), thousandths(c));
        let product = bc::mul(&y, &z, Some(scale)).unwrap();
        let expected = bc::div(&x, &product, Some(scale));
        let actual = bc::divs(&x, &[&y, &z], Some(scale));
        match (actual, expected) {
            (Ok(actual), Ok(expected)) => prop_assert_eq!(actual, expected),
            (Err(_), Err(_)) => {}
            (actual, expected) => prop_assert!(false, "{:?} vs {:?}", actual, expected),
        }
    }

    #[test]
    fn prop_comp_is_antisymmetric(a in any::<i64>(), b in any::<i64>()) {
        let x = thousandths(a / 10);
        let y = thousandths(b / 10);
        prop_assert_eq!(
            bc::comp(&x, &y, Some(3)).unwrap(),
            -bc::comp(&y, &x, Some(3)).unwrap()
        );
    }
}
