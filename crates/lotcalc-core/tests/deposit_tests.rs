use lotcalc_core::assumptions::{DepositAssumptions, RateTrajectory, YearRate};
use lotcalc_core::deposit::{compare_deposits, DepositComparator, DepositComparison, DepositInput};
use lotcalc_core::LotCalcError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn compare(amount: Decimal, years: u32, scenario: &str) -> DepositComparison {
    compare_deposits(&DepositInput {
        amount,
        years,
        scenario: scenario.into(),
    })
    .unwrap()
    .result
}

// ===========================================================================
// Reference comparisons
// ===========================================================================

#[test]
fn test_eleven_year_comparison_matches_reference() {
    let out = compare(dec!(6000000), 11, "all");

    let p = out.scenario("pessimistic").unwrap();
    assert_eq!(p.total_gross_interest, dec!(11587130.20));
    assert_eq!(p.total_tax, dec!(1520569.54));
    assert_eq!(p.total_roi_pct, dec!(167.78));
    assert_eq!(p.effective_rate, dec!(15.25));

    let b = out.scenario("base").unwrap();
    assert_eq!(b.total_net_interest, dec!(6427414.71));
    assert_eq!(b.total_roi_pct, dec!(107.12));

    let o = out.scenario("optimistic").unwrap();
    assert_eq!(o.total_gross_interest, dec!(4450624.47));
    assert_eq!(o.total_tax, dec!(515343.68));
    assert_eq!(o.final_balance, dec!(9935280.79));
    assert_eq!(o.total_roi_pct, dec!(65.59));
    assert_eq!(o.effective_rate, dec!(5.96));
}

#[test]
fn test_scenarios_rank_by_rate_path() {
    let out = compare(dec!(6000000), 11, "all");
    let net: Vec<Decimal> = out.scenarios.iter().map(|s| s.total_net_interest).collect();
    assert!(net[0] > net[1] && net[1] > net[2]);
}

#[test]
fn test_one_year_small_deposits() {
    let out = compare(dec!(1000000), 1, "all");
    let roi: Vec<Decimal> = out.scenarios.iter().map(|s| s.total_roi_pct).collect();
    assert_eq!(roi, vec![dec!(16.44), dec!(13.50), dec!(11.00)]);
}

#[test]
fn test_large_deposit_is_taxed_in_first_year() {
    let out = compare(dec!(15000000), 1, "base");
    let s = &out.scenarios[0];
    // 13.5% on 15,000,000; 140,000 allowance; 1,885,000 taxable at 13%
    assert_eq!(s.total_gross_interest, dec!(2025000));
    assert_eq!(s.total_tax, dec!(245050));
    assert_eq!(s.total_net_interest, dec!(1779950));
    assert_eq!(s.total_roi_pct, dec!(11.87));
}

#[test]
fn test_yearly_rows_disclose_tax_inputs() {
    let out = compare(dec!(6000000), 3, "pessimistic");
    let y = &out.scenarios[0].yearly;
    assert_eq!(y.iter().map(|r| r.year).collect::<Vec<_>>(), vec![2026, 2027, 2028]);
    assert_eq!(y[0].deposit_rate, dec!(16.5));
    assert_eq!(y[0].tax_free_limit, dec!(160000));
    assert_eq!(y[1].key_rate, dec!(14.0));
    assert_eq!(y[1].tax_free_limit, dec!(140000));
    for r in y {
        assert_eq!(r.net_interest, r.gross_interest - r.tax_amount);
    }
}

#[test]
fn test_custom_trajectory() {
    let assumptions = DepositAssumptions {
        start_year: 2030,
        scenarios: vec![RateTrajectory {
            key: "flat".into(),
            name: "Flat 10%".into(),
            key_rates: vec![YearRate::new(2030, dec!(10))],
            spread: Decimal::ZERO,
        }],
        ..DepositAssumptions::default()
    };
    let cmp = DepositComparator::new(assumptions).unwrap();
    let out = cmp
        .compare(&DepositInput {
            amount: dec!(100000),
            years: 2,
            scenario: "flat".into(),
        })
        .unwrap();
    let s = &out.result.scenarios[0];
    // 10,000 then 11,000, both under the 100,000 allowance
    assert_eq!(s.total_gross_interest, dec!(21000));
    assert_eq!(s.total_tax, Decimal::ZERO);
    assert_eq!(s.final_balance, dec!(121000));
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_reserved_scenario_key_rejected() {
    let mut assumptions = DepositAssumptions::default();
    assumptions.scenarios[0].key = "all".into();
    assert!(DepositComparator::new(assumptions).is_err());
}

#[test]
fn test_error_codes() {
    let unknown = compare_deposits(&DepositInput {
        amount: dec!(1000000),
        years: 1,
        scenario: "moon".into(),
    })
    .unwrap_err();
    assert_eq!(unknown.code(), "unknown_scenario");
    assert!(unknown.is_client_error());

    let bad = compare_deposits(&DepositInput {
        amount: dec!(-1),
        years: 1,
        scenario: "all".into(),
    })
    .unwrap_err();
    assert!(matches!(bad, LotCalcError::InvalidInput { ref field, .. } if field == "amount"));
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn prop_totals_reconcile(amount in 1_000u64..1_000_000_000, years in 1u32..=15) {
        let out = compare(Decimal::from(amount), years, "all");
        prop_assert_eq!(out.scenarios.len(), 3);
        for s in &out.scenarios {
            prop_assert_eq!(s.total_net_interest, s.total_gross_interest - s.total_tax);
            prop_assert!(s.total_tax <= s.total_gross_interest);
            prop_assert!(s.final_balance >= out.amount);
            prop_assert_eq!(s.yearly.len() as u32, years);
        }
    }

    #[test]
    fn prop_net_interest_monotone_in_amount(
        amount in 10_000u64..500_000_000,
        step in 1u64..1_000,
        years in 1u32..=11,
    ) {
        let lower = compare(Decimal::from(amount), years, "all");
        let higher = compare(Decimal::from(amount + step * 1_000), years, "all");
        for (a, b) in lower.scenarios.iter().zip(&higher.scenarios) {
            prop_assert_eq!(&a.key, &b.key);
            prop_assert!(b.total_net_interest > a.total_net_interest, "scenario {}", a.key);
        }
    }

    #[test]
    fn prop_comparison_is_idempotent(amount in 1_000u64..1_000_000_000, years in 1u32..=20) {
        let a = compare(Decimal::from(amount), years, "all");
        let b = compare(Decimal::from(amount), years, "all");
        prop_assert_eq!(a, b);
    }
}
