use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::assumptions::{rate_for_year, RoiAssumptions};
use crate::error::LotCalcError;
use crate::rounding::{
    checked_add, checked_mul, floor_units, require_positive, round_pct, round_units, share_pct,
};
use crate::types::{with_metadata, Area, ComputationOutput, Money, Percent};
use crate::LotCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for the ROI projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiInput {
    /// Lot floor area in square meters
    pub area: Area,
    /// Purchase price
    pub price: Money,
}

/// One projected calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiYear {
    pub year: i32,
    /// Net rental income earned this year
    pub rental_profit: Money,
    /// Appreciation earned this year
    pub growth_profit: Money,
    /// Rental plus appreciation since the start of the horizon
    pub cumulative_profit: Money,
    /// Price plus all appreciation to date
    pub current_value: Money,
}

/// Result of the ROI projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiResult {
    pub area: Area,
    pub price: Money,
    /// Price per square meter, whole units
    pub price_m2: Money,
    /// Total profit over the horizon as a percentage of price
    pub roi_pct: Percent,
    /// `roi_pct` divided evenly over the horizon (not compounded)
    pub avg_annual_pct: Percent,
    pub total_rental: Money,
    pub total_growth: Money,
    /// `total_rental + total_growth`
    pub total_profit: Money,
    /// `price + total_profit`
    pub final_value: Money,
    pub years: Vec<RoiYear>,
}

// ---------------------------------------------------------------------------
// Projector
// ---------------------------------------------------------------------------

/// Projects rental income and capital appreciation for a lot.
#[derive(Debug, Clone, Default)]
pub struct RoiProjector {
    assumptions: RoiAssumptions,
}

impl RoiProjector {
    pub fn new(assumptions: RoiAssumptions) -> LotCalcResult<Self> {
        assumptions.validate()?;
        Ok(RoiProjector { assumptions })
    }

    pub fn assumptions(&self) -> &RoiAssumptions {
        &self.assumptions
    }

    /// Project ROI over the configured horizon.
    ///
    /// Appreciation compounds on price plus the appreciation already earned.
    /// Rent is `days * daily rate per m² * area * occupancy`, net of the
    /// expense ratio. Each year's figures are rounded to whole units before
    /// they are summed, so the totals reconcile exactly.
    pub fn project(&self, input: &RoiInput) -> LotCalcResult<ComputationOutput<RoiResult>> {
        let start = Instant::now();
        require_positive("area", input.area)?;
        require_positive("price", input.price)?;

        let a = &self.assumptions;
        let net_share = Decimal::ONE - a.expense_ratio;
        let mut warnings: Vec<String> = Vec::new();

        let mut years = Vec::with_capacity(a.horizon_years as usize);
        let mut total_growth = Decimal::ZERO;
        let mut total_rental = Decimal::ZERO;

        for year in a.start_year..=a.target_year() {
            let rate = rate_for_year(&a.appreciation, year).ok_or_else(|| {
                LotCalcError::InternalComputation {
                    context: format!("no appreciation rate for {year}"),
                }
            })?;
            let base = checked_add(input.price, total_growth, "roi appreciation")?;
            let growth_profit = round_units(checked_mul(base, rate, "roi appreciation")?);

            let rental_profit = match a.rental_for_year(year) {
                Some(r) => {
                    let days = Decimal::from(days_in_year(year)?);
                    let gross = checked_mul(
                        checked_mul(days * r.daily_rate_per_m2, input.area, "roi rent")?,
                        r.occupancy,
                        "roi rent",
                    )?;
                    round_units(gross * net_share)
                }
                None => Decimal::ZERO,
            };

            total_growth = checked_add(total_growth, growth_profit, "roi appreciation")?;
            total_rental = checked_add(total_rental, rental_profit, "roi rent")?;

            years.push(RoiYear {
                year,
                rental_profit,
                growth_profit,
                cumulative_profit: checked_add(total_rental, total_growth, "roi cumulative")?,
                current_value: checked_add(input.price, total_growth, "roi value")?,
            });
        }

        if total_rental.is_zero() {
            warnings.push(format!(
                "No rental income falls inside {}..={}; return is appreciation only",
                a.start_year,
                a.target_year()
            ));
        }

        let total_profit = checked_add(total_rental, total_growth, "roi total")?;
        let final_value = checked_add(input.price, total_profit, "roi total")?;
        let price_m2 = input
            .price
            .checked_div(input.area)
            .map(floor_units)
            .ok_or_else(|| LotCalcError::overflow("price_m2"))?;
        let raw_pct = share_pct(total_profit, input.price, "roi_pct")?;
        let roi_pct = round_pct(raw_pct, 1);
        let avg_annual_pct = round_pct(raw_pct / Decimal::from(a.horizon_years), 1);

        tracing::debug!(
            area = %input.area,
            price = %input.price,
            %total_profit,
            %roi_pct,
            "roi projected"
        );

        let result = RoiResult {
            area: input.area,
            price: input.price,
            price_m2,
            roi_pct,
            avg_annual_pct,
            total_rental,
            total_growth,
            total_profit,
            final_value,
            years,
        };

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Lot ROI projection (short-term rental yield + compounded appreciation)",
            &self.assumptions,
            warnings,
            elapsed,
            result,
        ))
    }
}

/// Project ROI with the default assumption set.
pub fn project_roi(input: &RoiInput) -> LotCalcResult<ComputationOutput<RoiResult>> {
    RoiProjector::default().project(input)
}

fn days_in_year(year: i32) -> LotCalcResult<u32> {
    NaiveDate::from_ymd_opt(year, 12, 31)
        .map(|d| d.ordinal())
        .ok_or_else(|| LotCalcError::InternalComputation {
            context: format!("calendar year {year} out of range"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{RentalYear, YearRate};
    use rust_decimal_macros::dec;

    fn sample_input() -> RoiInput {
        RoiInput {
            area: dec!(45),
            price: dec!(6000000),
        }
    }

    #[test]
    fn test_reference_lot_projection() {
        let out = project_roi(&sample_input()).unwrap().result;

        assert_eq!(out.total_rental, dec!(39682791));
        assert_eq!(out.total_growth, dec!(14239076));
        assert_eq!(out.total_profit, dec!(53921867));
        assert_eq!(out.final_value, dec!(59921867));
        assert_eq!(out.roi_pct, dec!(898.7));
        assert_eq!(out.avg_annual_pct, dec!(81.7));
        assert_eq!(out.price_m2, dec!(133333));
    }

    #[test]
    fn test_profit_sum_invariants() {
        let out = project_roi(&sample_input()).unwrap().result;
        assert_eq!(out.total_profit, out.total_rental + out.total_growth);
        assert_eq!(out.final_value, out.price + out.total_profit);

        let pct = out.total_profit / out.price * dec!(100);
        assert!((pct - out.roi_pct).abs() <= dec!(0.05));
    }

    #[test]
    fn test_eleven_years_through_2035() {
        let out = project_roi(&sample_input()).unwrap().result;
        assert_eq!(out.years.len(), 11);
        assert_eq!(out.years.first().unwrap().year, 2025);
        assert_eq!(out.years.last().unwrap().year, 2035);
    }

    #[test]
    fn test_no_rent_before_delivery() {
        let out = project_roi(&sample_input()).unwrap().result;
        for y in out.years.iter().filter(|y| y.year < 2028) {
            assert_eq!(y.rental_profit, Decimal::ZERO, "rent in {}", y.year);
        }
        // 2028 is a leap year: 366 * 664.18 * 45 * 0.40 * 0.5 = 2,187,809.28
        assert_eq!(out.years[3].rental_profit, dec!(2187809));
    }

    #[test]
    fn test_first_year_growth() {
        let out = project_roi(&sample_input()).unwrap().result;
        // 6,000,000 * 18%
        assert_eq!(out.years[0].growth_profit, dec!(1080000));
        assert_eq!(out.years[0].current_value, dec!(7080000));
    }

    #[test]
    fn test_cumulative_profit_matches_total() {
        let out = project_roi(&sample_input()).unwrap().result;
        assert_eq!(out.years.last().unwrap().cumulative_profit, out.total_profit);
        assert_eq!(
            out.years.last().unwrap().current_value,
            out.price + out.total_growth
        );
    }

    #[test]
    fn test_avg_annual_is_simple_not_compound() {
        let out = project_roi(&sample_input()).unwrap().result;
        // Compound annual growth would be ~22%; the simple average is roi / 11.
        assert!(out.avg_annual_pct > dec!(80));
    }

    #[test]
    fn test_zero_area_rejected() {
        let input = RoiInput {
            area: Decimal::ZERO,
            price: dec!(6000000),
        };
        let err = project_roi(&input).unwrap_err();
        assert!(matches!(err, LotCalcError::InvalidInput { ref field, .. } if field == "area"));
    }

    #[test]
    fn test_negative_price_rejected() {
        let input = RoiInput {
            area: dec!(45),
            price: dec!(-1),
        };
        let err = project_roi(&input).unwrap_err();
        assert!(matches!(err, LotCalcError::InvalidInput { ref field, .. } if field == "price"));
    }

    #[test]
    fn test_custom_assumptions_are_used() {
        let assumptions = RoiAssumptions {
            start_year: 2030,
            horizon_years: 2,
            appreciation: vec![YearRate::new(2030, dec!(0.10))],
            rental: vec![RentalYear {
                year: 2030,
                daily_rate_per_m2: dec!(10),
                occupancy: dec!(0.5),
            }],
            expense_ratio: dec!(0.2),
        };
        let projector = RoiProjector::new(assumptions).unwrap();
        let out = projector
            .project(&RoiInput {
                area: dec!(10),
                price: dec!(1000),
            })
            .unwrap()
            .result;

        // growth: 100, then 110
        assert_eq!(out.total_growth, dec!(210));
        // rent: 365 * 10 * 10 * 0.5 * 0.8 = 14600 per year
        assert_eq!(out.total_rental, dec!(29200));
        assert_eq!(out.roi_pct, dec!(2941.0));
        assert_eq!(out.avg_annual_pct, dec!(1470.5));
    }

    #[test]
    fn test_appreciation_only_warns() {
        let assumptions = RoiAssumptions {
            rental: Vec::new(),
            ..RoiAssumptions::default()
        };
        let out = RoiProjector::new(assumptions)
            .unwrap()
            .project(&sample_input())
            .unwrap();
        assert_eq!(out.result.total_rental, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_assumptions_rejected_at_construction() {
        let assumptions = RoiAssumptions {
            horizon_years: 0,
            ..RoiAssumptions::default()
        };
        assert!(RoiProjector::new(assumptions).is_err());

        let assumptions = RoiAssumptions {
            horizon_years: u32::MAX,
            ..RoiAssumptions::default()
        };
        assert!(matches!(
            RoiProjector::new(assumptions),
            Err(LotCalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_price_per_m2_overflow_is_an_error() {
        let tiny_area = RoiInput {
            area: dec!(0.00000000000000000001),
            price: dec!(1000000000000),
        };
        match project_roi(&tiny_area) {
            Err(LotCalcError::InternalComputation { context }) => assert!(context.contains("price_m2")),
            other => panic!("expected overflow error, got {other:?}"),
        }

        let huge_price = RoiInput {
            area: dec!(0.1),
            price: dec!(10000000000000000000000000000),
        };
        assert!(project_roi(&huge_price).is_err());
    }
}
