//! Assumption tables injected into the calculators.
//!
//! Every calculator is built from one of these values, so an alternative
//! assumption set (a test fixture, a file loaded by the server) never
//! touches calculator logic. The `Default` impls hold the figures the sales
//! team publishes for the current project.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LotCalcError;
use crate::types::{Money, Percent, Rate};
use crate::LotCalcResult;

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// A rate that applies to one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRate {
    pub year: i32,
    pub rate: Decimal,
}

impl YearRate {
    pub fn new(year: i32, rate: Decimal) -> Self {
        YearRate { year, rate }
    }
}

/// Value for `year`, or the last entry when the table ends before `year`.
/// Returns `None` for years before the first entry.
pub fn rate_for_year(table: &[YearRate], year: i32) -> Option<Decimal> {
    let mut found = None;
    for entry in table {
        if entry.year > year {
            break;
        }
        found = Some(entry.rate);
    }
    found
}

/// Longest projection or deposit horizon an assumption set may configure.
pub const MAX_HORIZON_YEARS: u32 = 100;

fn invalid(field: &str, reason: impl Into<String>) -> LotCalcError {
    LotCalcError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

fn check_sorted(field: &str, years: impl Iterator<Item = i32>) -> LotCalcResult<()> {
    let mut prev: Option<i32> = None;
    for y in years {
        if let Some(p) = prev {
            if y <= p {
                return Err(invalid(field, format!("years must be strictly increasing ({p} then {y})")));
            }
        }
        prev = Some(y);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ROI
// ---------------------------------------------------------------------------

/// Short-term rental assumptions for one operating year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalYear {
    pub year: i32,
    /// Nightly rate per square meter
    pub daily_rate_per_m2: Money,
    /// Share of nights booked (0.70 = 70%)
    pub occupancy: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiAssumptions {
    /// First projected calendar year
    pub start_year: i32,
    /// Number of projected years; the target year is `start_year + horizon_years - 1`
    pub horizon_years: u32,
    /// Annual appreciation, compounded on price plus prior appreciation
    pub appreciation: Vec<YearRate>,
    /// Rental table; years before the first entry earn no rent
    pub rental: Vec<RentalYear>,
    /// Operating expenses as a share of gross rent
    pub expense_ratio: Rate,
}

impl Default for RoiAssumptions {
    fn default() -> Self {
        let rental = [
            (2028, dec!(664.18), dec!(0.40)),
            (2029, dec!(723.88), dec!(0.60)),
            (2030, dec!(787.31), dec!(0.70)),
            (2031, dec!(858.21), dec!(0.70)),
            (2032, dec!(932.84), dec!(0.70)),
            (2033, dec!(1014.93), dec!(0.70)),
            (2034, dec!(1104.48), dec!(0.70)),
            (2035, dec!(1201.49), dec!(0.70)),
        ]
        .into_iter()
        .map(|(year, daily_rate_per_m2, occupancy)| RentalYear {
            year,
            daily_rate_per_m2,
            occupancy,
        })
        .collect();

        RoiAssumptions {
            start_year: 2025,
            horizon_years: 11,
            appreciation: vec![
                YearRate::new(2025, dec!(0.18)),
                YearRate::new(2026, dec!(0.20)),
                YearRate::new(2027, dec!(0.20)),
                YearRate::new(2028, dec!(0.10)),
                YearRate::new(2029, dec!(0.088)),
            ],
            rental,
            expense_ratio: dec!(0.50),
        }
    }
}

impl RoiAssumptions {
    /// Last projected year. The horizon is clamped to [`MAX_HORIZON_YEARS`].
    pub fn target_year(&self) -> i32 {
        let span = self.horizon_years.min(MAX_HORIZON_YEARS) as i32;
        self.start_year.saturating_add(span).saturating_sub(1)
    }

    pub fn rental_for_year(&self, year: i32) -> Option<&RentalYear> {
        self.rental.iter().rev().find(|r| r.year <= year)
    }

    pub fn validate(&self) -> LotCalcResult<()> {
        if self.horizon_years == 0 || self.horizon_years > MAX_HORIZON_YEARS {
            return Err(invalid(
                "roi.horizon_years",
                format!("horizon must be within 1..={MAX_HORIZON_YEARS} years"),
            ));
        }
        if self.appreciation.is_empty() {
            return Err(invalid("roi.appreciation", "at least one appreciation rate is required"));
        }
        check_sorted("roi.appreciation", self.appreciation.iter().map(|r| r.year))?;
        check_sorted("roi.rental", self.rental.iter().map(|r| r.year))?;
        if rate_for_year(&self.appreciation, self.start_year).is_none() {
            return Err(invalid(
                "roi.appreciation",
                format!("no appreciation rate covers start year {}", self.start_year),
            ));
        }
        if self.appreciation.iter().any(|r| r.rate < Decimal::ZERO) {
            return Err(invalid("roi.appreciation", "appreciation rates must be non-negative"));
        }
        for r in &self.rental {
            if r.daily_rate_per_m2 < Decimal::ZERO {
                return Err(invalid("roi.rental", format!("negative daily rate in {}", r.year)));
            }
            if r.occupancy < Decimal::ZERO || r.occupancy > Decimal::ONE {
                return Err(invalid("roi.rental", format!("occupancy in {} must be within 0..=1", r.year)));
            }
        }
        if self.expense_ratio < Decimal::ZERO || self.expense_ratio > Decimal::ONE {
            return Err(invalid("roi.expense_ratio", "expense ratio must be within 0..=1"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Installments
// ---------------------------------------------------------------------------

/// What the down-payment fraction is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownPaymentBasis {
    /// The catalog price; any surcharge is carried by the installments
    ListPrice,
    /// The surcharged financed total
    FinancedTotal,
}

/// How the balance after the down payment is split into periodic payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentSplit {
    /// Equal installments; the last one absorbs rounding
    Equal,
    /// Round fixed payments, the last one absorbs the remainder
    Fixed { increment: Money },
    /// Round fixed payments around a balloon payment at `balloon_period`
    /// sized as `balloon_rate` of the list price; the last one absorbs the
    /// remainder
    FixedWithBalloon {
        increment: Money,
        balloon_rate: Rate,
        balloon_period: u32,
    },
}

/// One down-payment tier of an installment program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierTerms {
    /// Tier label in percent (30, 40, 50)
    pub tier: u32,
    pub down_payment_rate: Rate,
    /// Markup on the list price for deferring payment
    pub surcharge_rate: Rate,
    pub basis: DownPaymentBasis,
    pub split: PaymentSplit,
}

/// An installment program over a fixed number of periodic payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonTerms {
    /// Program length in months, used as its label
    pub months: u32,
    /// Number of periodic payments after the down payment
    pub periods: u32,
    pub tiers: Vec<TierTerms>,
}

impl HorizonTerms {
    pub fn tier(&self, tier: u32) -> Option<&TierTerms> {
        self.tiers.iter().find(|t| t.tier == tier)
    }

    fn validate(&self, field: &str) -> LotCalcResult<()> {
        if self.periods == 0 {
            return Err(invalid(field, "at least one periodic payment is required"));
        }
        for required in [30, 40, 50] {
            if self.tier(required).is_none() {
                return Err(invalid(field, format!("missing the {required}% tier")));
            }
        }
        for t in &self.tiers {
            if t.down_payment_rate <= Decimal::ZERO || t.down_payment_rate >= Decimal::ONE {
                return Err(invalid(field, format!("{}% tier: down payment must be within 0..1", t.tier)));
            }
            if t.surcharge_rate < Decimal::ZERO {
                return Err(invalid(field, format!("{}% tier: surcharge must be non-negative", t.tier)));
            }
            match &t.split {
                PaymentSplit::Equal => {}
                PaymentSplit::Fixed { increment } => {
                    if *increment <= Decimal::ZERO {
                        return Err(invalid(field, format!("{}% tier: increment must be positive", t.tier)));
                    }
                }
                PaymentSplit::FixedWithBalloon {
                    increment,
                    balloon_rate,
                    balloon_period,
                } => {
                    if *increment <= Decimal::ZERO {
                        return Err(invalid(field, format!("{}% tier: increment must be positive", t.tier)));
                    }
                    if *balloon_rate < Decimal::ZERO || *balloon_rate >= Decimal::ONE {
                        return Err(invalid(field, format!("{}% tier: balloon rate must be within 0..1", t.tier)));
                    }
                    if *balloon_period == 0 || *balloon_period >= self.periods {
                        return Err(invalid(
                            field,
                            format!("{}% tier: balloon period must fall before the last payment", t.tier),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentAssumptions {
    pub short: HorizonTerms,
    pub long: HorizonTerms,
}

impl Default for InstallmentAssumptions {
    fn default() -> Self {
        let balloon = |increment: Money| PaymentSplit::FixedWithBalloon {
            increment,
            balloon_rate: dec!(0.10),
            balloon_period: 9,
        };

        InstallmentAssumptions {
            short: HorizonTerms {
                months: 12,
                periods: 11,
                tiers: vec![
                    TierTerms {
                        tier: 30,
                        down_payment_rate: dec!(0.30),
                        surcharge_rate: Decimal::ZERO,
                        basis: DownPaymentBasis::ListPrice,
                        split: PaymentSplit::Equal,
                    },
                    TierTerms {
                        tier: 40,
                        down_payment_rate: dec!(0.40),
                        surcharge_rate: Decimal::ZERO,
                        basis: DownPaymentBasis::ListPrice,
                        split: PaymentSplit::Fixed {
                            increment: dec!(200000),
                        },
                    },
                    TierTerms {
                        tier: 50,
                        down_payment_rate: dec!(0.50),
                        surcharge_rate: Decimal::ZERO,
                        basis: DownPaymentBasis::ListPrice,
                        split: PaymentSplit::Fixed {
                            increment: dec!(100000),
                        },
                    },
                ],
            },
            long: HorizonTerms {
                months: 18,
                periods: 18,
                tiers: vec![
                    TierTerms {
                        tier: 30,
                        down_payment_rate: dec!(0.30),
                        surcharge_rate: dec!(0.09),
                        basis: DownPaymentBasis::FinancedTotal,
                        split: PaymentSplit::Equal,
                    },
                    TierTerms {
                        tier: 40,
                        down_payment_rate: dec!(0.40),
                        surcharge_rate: dec!(0.07),
                        basis: DownPaymentBasis::ListPrice,
                        split: balloon(dec!(250000)),
                    },
                    TierTerms {
                        tier: 50,
                        down_payment_rate: dec!(0.50),
                        surcharge_rate: dec!(0.04),
                        basis: DownPaymentBasis::ListPrice,
                        split: balloon(dec!(150000)),
                    },
                ],
            },
        }
    }
}

impl InstallmentAssumptions {
    pub fn validate(&self) -> LotCalcResult<()> {
        self.short.validate("installment.short")?;
        self.long.validate("installment.long")
    }
}

// ---------------------------------------------------------------------------
// Deposits
// ---------------------------------------------------------------------------

/// A named central-bank key-rate path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTrajectory {
    pub key: String,
    pub name: String,
    /// Key rate in percent by year; later years repeat the last entry
    pub key_rates: Vec<YearRate>,
    /// Deposit rate minus key rate, in percentage points
    pub spread: Percent,
}

impl RateTrajectory {
    fn from_table(key: &str, name: &str, spread: Percent, rates: [Percent; 11]) -> Self {
        RateTrajectory {
            key: key.into(),
            name: name.into(),
            key_rates: rates
                .into_iter()
                .zip(2025..)
                .map(|(rate, year)| YearRate::new(year, rate))
                .collect(),
            spread,
        }
    }
}

/// Tax on deposit interest: a tax-free allowance equal to
/// `allowance_base * key rate`, then a two-bracket progressive rate on the
/// cumulative taxable income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositTaxRule {
    pub allowance_base: Money,
    pub base_rate: Rate,
    pub higher_rate: Rate,
    pub higher_threshold: Money,
}

impl Default for DepositTaxRule {
    fn default() -> Self {
        DepositTaxRule {
            allowance_base: dec!(1000000),
            base_rate: dec!(0.13),
            higher_rate: dec!(0.15),
            higher_threshold: dec!(2400000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositAssumptions {
    /// Calendar year of the first simulated year
    pub start_year: i32,
    /// Lowest deposit rate offered, in percent
    pub min_deposit_rate: Percent,
    /// Capitalise net interest each year
    pub reinvest: bool,
    /// Longest horizon a comparison may request
    #[serde(default = "default_max_years")]
    pub max_years: u32,
    pub scenarios: Vec<RateTrajectory>,
    pub tax: DepositTaxRule,
}

impl Default for DepositAssumptions {
    fn default() -> Self {
        DepositAssumptions {
            start_year: 2026,
            min_deposit_rate: dec!(4.0),
            reinvest: true,
            max_years: default_max_years(),
            scenarios: vec![
                RateTrajectory::from_table(
                    "pessimistic",
                    "Пессимистичный",
                    dec!(0.5),
                    [
                        dec!(16.5), dec!(16.0), dec!(14.0), dec!(12.0), dec!(11.0), dec!(10.0),
                        dec!(9.0), dec!(9.0), dec!(8.0), dec!(8.0), dec!(8.0),
                    ],
                ),
                RateTrajectory::from_table(
                    "base",
                    "Базовый (прогноз ЦБ)",
                    dec!(-0.5),
                    [
                        dec!(16.5), dec!(14.0), dec!(11.0), dec!(9.0), dec!(8.0), dec!(7.5),
                        dec!(7.0), dec!(7.0), dec!(7.0), dec!(7.0), dec!(7.0),
                    ],
                ),
                RateTrajectory::from_table(
                    "optimistic",
                    "Оптимистичный",
                    dec!(-1.0),
                    [
                        dec!(16.5), dec!(12.0), dec!(9.0), dec!(7.0), dec!(6.0), dec!(5.5),
                        dec!(5.0), dec!(5.0), dec!(5.0), dec!(5.0), dec!(5.0),
                    ],
                ),
            ],
            tax: DepositTaxRule::default(),
        }
    }
}

fn default_max_years() -> u32 {
    50
}

impl DepositAssumptions {
    pub fn scenario(&self, key: &str) -> Option<&RateTrajectory> {
        self.scenarios.iter().find(|s| s.key == key)
    }

    pub fn validate(&self) -> LotCalcResult<()> {
        if self.scenarios.is_empty() {
            return Err(invalid("deposit.scenarios", "at least one scenario is required"));
        }
        if self.max_years == 0 || self.max_years > MAX_HORIZON_YEARS {
            return Err(invalid(
                "deposit.max_years",
                format!("must be within 1..={MAX_HORIZON_YEARS}"),
            ));
        }
        if self.min_deposit_rate < Decimal::ZERO {
            return Err(invalid("deposit.min_deposit_rate", "must be non-negative"));
        }
        for (i, s) in self.scenarios.iter().enumerate() {
            if s.key.is_empty() || s.key == "all" {
                return Err(invalid("deposit.scenarios", format!("scenario key '{}' is reserved or empty", s.key)));
            }
            if self.scenarios[..i].iter().any(|other| other.key == s.key) {
                return Err(invalid("deposit.scenarios", format!("duplicate scenario key '{}'", s.key)));
            }
            if s.key_rates.is_empty() {
                return Err(invalid("deposit.scenarios", format!("scenario '{}' has no key rates", s.key)));
            }
            check_sorted("deposit.scenarios", s.key_rates.iter().map(|r| r.year))?;
            if rate_for_year(&s.key_rates, self.start_year).is_none() {
                return Err(invalid(
                    "deposit.scenarios",
                    format!("scenario '{}' has no key rate for {}", s.key, self.start_year),
                ));
            }
        }
        let tax = &self.tax;
        if tax.allowance_base < Decimal::ZERO || tax.higher_threshold < Decimal::ZERO {
            return Err(invalid("deposit.tax", "allowance and threshold must be non-negative"));
        }
        for rate in [tax.base_rate, tax.higher_rate] {
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(invalid("deposit.tax", "tax rates must be within 0..1"));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// Every assumption set, as loaded from a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assumptions {
    pub roi: RoiAssumptions,
    pub installment: InstallmentAssumptions,
    pub deposit: DepositAssumptions,
}

impl Assumptions {
    pub fn validate(&self) -> LotCalcResult<()> {
        self.roi.validate()?;
        self.installment.validate()?;
        self.deposit.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        Assumptions::default().validate().unwrap();
    }

    #[test]
    fn test_default_roi_horizon_ends_in_2035() {
        let a = RoiAssumptions::default();
        assert_eq!(a.target_year(), 2035);
    }

    #[test]
    fn test_target_year_does_not_wrap() {
        let roi = RoiAssumptions {
            horizon_years: u32::MAX,
            ..RoiAssumptions::default()
        };
        assert_eq!(roi.target_year(), 2025 + MAX_HORIZON_YEARS as i32 - 1);
        assert_eq!(RoiAssumptions::default().target_year(), 2035);
    }

    #[test]
    fn test_oversized_horizons_are_rejected() {
        let roi = RoiAssumptions {
            horizon_years: u32::MAX,
            ..RoiAssumptions::default()
        };
        assert!(matches!(roi.validate(), Err(LotCalcError::InvalidInput { ref field, .. }) if field == "roi.horizon_years"));

        let deposit = DepositAssumptions {
            max_years: MAX_HORIZON_YEARS + 1,
            ..DepositAssumptions::default()
        };
        assert!(deposit.validate().is_err());
    }

    #[test]
    fn test_rate_for_year_repeats_last_entry() {
        let table = vec![YearRate::new(2025, dec!(0.18)), YearRate::new(2029, dec!(0.088))];
        assert_eq!(rate_for_year(&table, 2024), None);
        assert_eq!(rate_for_year(&table, 2025), Some(dec!(0.18)));
        assert_eq!(rate_for_year(&table, 2028), Some(dec!(0.18)));
        assert_eq!(rate_for_year(&table, 2040), Some(dec!(0.088)));
    }

    #[test]
    fn test_rental_lookup_before_delivery_is_none() {
        let a = RoiAssumptions::default();
        assert!(a.rental_for_year(2027).is_none());
        assert_eq!(a.rental_for_year(2031).unwrap().daily_rate_per_m2, dec!(858.21));
    }

    #[test]
    fn test_missing_tier_is_rejected() {
        let mut a = InstallmentAssumptions::default();
        a.long.tiers.retain(|t| t.tier != 50);
        assert!(matches!(a.validate(), Err(LotCalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_balloon_after_last_period_is_rejected() {
        let mut a = InstallmentAssumptions::default();
        a.long.tiers[1].split = PaymentSplit::FixedWithBalloon {
            increment: dec!(250000),
            balloon_rate: dec!(0.1),
            balloon_period: 18,
        };
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_reserved_scenario_key_is_rejected() {
        let mut a = DepositAssumptions::default();
        a.scenarios[0].key = "all".into();
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_unsorted_key_rates_are_rejected() {
        let mut a = DepositAssumptions::default();
        a.scenarios[1].key_rates.swap(2, 3);
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_partial_bundle_deserializes_with_defaults() {
        let json = r#"{"deposit": {"start_year": 2027, "min_deposit_rate": "3", "reinvest": false,
            "scenarios": [{"key": "flat", "name": "Flat", "key_rates": [{"year": 2025, "rate": "10"}], "spread": "0"}],
            "tax": {"allowance_base": "1000000", "base_rate": "0.13", "higher_rate": "0.15", "higher_threshold": "2400000"}}}"#;
        let a: Assumptions = serde_json::from_str(json).unwrap();
        a.validate().unwrap();
        assert_eq!(a.deposit.start_year, 2027);
        assert_eq!(a.roi, RoiAssumptions::default());
    }
}
