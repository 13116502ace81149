use lotcalc_core::assumptions::{RoiAssumptions, YearRate};
use lotcalc_core::roi::{project_roi, RoiInput, RoiProjector};
use lotcalc_core::LotCalcError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// ROI projection: reference lots
// ===========================================================================

fn roi(area: Decimal, price: Decimal) -> lotcalc_core::roi::RoiResult {
    project_roi(&RoiInput { area, price }).unwrap().result
}

#[test]
fn test_reference_lot_45m2() {
    let out = roi(dec!(45), dec!(6000000));
    assert_eq!(out.roi_pct, dec!(898.7));
    assert_eq!(out.avg_annual_pct, dec!(81.7));
    assert_eq!(out.total_profit, dec!(53921867));
    assert_eq!(out.final_value, dec!(59921867));
}

#[test]
fn test_growth_does_not_depend_on_area() {
    let small = roi(dec!(20), dec!(6000000));
    let large = roi(dec!(80), dec!(6000000));
    assert_eq!(small.total_growth, large.total_growth);
    assert!(large.total_rental > small.total_rental);
}

#[test]
fn test_rent_does_not_depend_on_price() {
    let cheap = roi(dec!(45), dec!(3000000));
    let dear = roi(dec!(45), dec!(9000000));
    assert_eq!(cheap.total_rental, dear.total_rental);
    assert!(cheap.roi_pct > dear.roi_pct);
}

#[test]
fn test_fractional_area_accepted() {
    let out = roi(dec!(32.7), dec!(4850000));
    assert_eq!(out.total_profit, out.total_rental + out.total_growth);
    assert_eq!(out.price_m2, dec!(148318));
}

#[test]
fn test_output_carries_methodology_and_assumptions() {
    let out = project_roi(&RoiInput {
        area: dec!(45),
        price: dec!(6000000),
    })
    .unwrap();
    assert!(out.methodology.contains("ROI"));
    assert_eq!(out.assumptions["horizon_years"], 11);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_flat_market_is_rent_only() {
    let assumptions = RoiAssumptions {
        appreciation: vec![YearRate::new(2025, Decimal::ZERO)],
        ..RoiAssumptions::default()
    };
    let out = RoiProjector::new(assumptions)
        .unwrap()
        .project(&RoiInput {
            area: dec!(45),
            price: dec!(6000000),
        })
        .unwrap()
        .result;
    assert_eq!(out.total_growth, Decimal::ZERO);
    assert_eq!(out.total_rental, dec!(39682791));
}

#[test]
fn test_invalid_inputs_name_the_field() {
    for (area, price, field) in [
        (dec!(0), dec!(6000000), "area"),
        (dec!(-3), dec!(6000000), "area"),
        (dec!(45), dec!(0), "price"),
    ] {
        match project_roi(&RoiInput { area, price }) {
            Err(LotCalcError::InvalidInput { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected invalid input for {field}, got {other:?}"),
        }
    }
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn prop_totals_reconcile(area in 1u32..500, price in 1u64..1_000_000_000) {
        let out = roi(Decimal::from(area), Decimal::from(price));
        prop_assert_eq!(out.total_profit, out.total_rental + out.total_growth);
        prop_assert_eq!(out.final_value, out.price + out.total_profit);
        prop_assert_eq!(out.years.len(), 11);

        let exact = out.total_profit / out.price * dec!(100);
        prop_assert!((exact - out.roi_pct).abs() <= dec!(0.05));
    }

    #[test]
    fn prop_profit_strictly_increases_with_price(price in 1_000u64..500_000_000, step in 1u64..1_000) {
        let lower = roi(dec!(45), Decimal::from(price));
        let higher = roi(dec!(45), Decimal::from(price + step * 1_000));
        prop_assert!(higher.total_growth > lower.total_growth);
        prop_assert!(higher.total_profit > lower.total_profit);
    }

    #[test]
    fn prop_rent_monotone_in_area(area in 1u32..400, extra in 1u32..100) {
        let lower = roi(Decimal::from(area), dec!(6000000));
        let higher = roi(Decimal::from(area + extra), dec!(6000000));
        prop_assert!(higher.total_rental >= lower.total_rental);
    }

    #[test]
    fn prop_projection_is_idempotent(area in 1u32..500, price in 1u64..100_000_000) {
        let a = roi(Decimal::from(area), Decimal::from(price));
        let b = roi(Decimal::from(area), Decimal::from(price));
        prop_assert_eq!(a, b);
    }
}
