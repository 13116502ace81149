use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::assumptions::{HorizonTerms, InstallmentAssumptions, PaymentSplit};
use crate::error::LotCalcError;
use crate::installment::schedule::{build_schedule, TierSchedule};
use crate::rounding::{format_money, require_positive};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::LotCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentInput {
    pub price: Money,
}

/// All tiers of one installment program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonPlan {
    pub months: u32,
    pub periods: u32,
    pub tiers: Vec<TierSchedule>,
}

impl HorizonPlan {
    pub fn tier(&self, tier: u32) -> Option<&TierSchedule> {
        self.tiers.iter().find(|t| t.tier == tier)
    }

    /// Like [`HorizonPlan::tier`], but a missing tier is an engine fault.
    pub fn require_tier(&self, tier: u32) -> LotCalcResult<&TierSchedule> {
        self.tier(tier).ok_or_else(|| LotCalcError::InternalComputation {
            context: format!("{}-month plan has no {tier}% tier", self.months),
        })
    }
}

/// Short (12-month, no surcharge) and long (18-month, surcharged) programs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub price: Money,
    pub short: HorizonPlan,
    pub long: HorizonPlan,
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct InstallmentPlanner {
    assumptions: InstallmentAssumptions,
}

impl InstallmentPlanner {
    pub fn new(assumptions: InstallmentAssumptions) -> LotCalcResult<Self> {
        assumptions.validate()?;
        Ok(InstallmentPlanner { assumptions })
    }

    pub fn assumptions(&self) -> &InstallmentAssumptions {
        &self.assumptions
    }

    pub fn plan(&self, input: &InstallmentInput) -> LotCalcResult<ComputationOutput<InstallmentPlan>> {
        let start = Instant::now();
        require_positive("price", input.price)?;

        let mut warnings: Vec<String> = Vec::new();
        let short = plan_horizon(input.price, &self.assumptions.short, &mut warnings)?;
        let long = plan_horizon(input.price, &self.assumptions.long, &mut warnings)?;

        tracing::debug!(
            price = %input.price,
            warnings = warnings.len(),
            "installment plan built"
        );

        let plan = InstallmentPlan {
            price: input.price,
            short,
            long,
        };

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Installment plans: equal or fixed-increment schedules per down-payment tier",
            &self.assumptions,
            warnings,
            elapsed,
            plan,
        ))
    }
}

/// Build both installment programs with the default terms.
pub fn plan_installments(
    input: &InstallmentInput,
) -> LotCalcResult<ComputationOutput<InstallmentPlan>> {
    InstallmentPlanner::default().plan(input)
}

fn plan_horizon(
    price: Money,
    terms: &HorizonTerms,
    warnings: &mut Vec<String>,
) -> LotCalcResult<HorizonPlan> {
    let mut tiers = Vec::with_capacity(terms.tiers.len());
    for t in &terms.tiers {
        let schedule = build_schedule(price, terms.periods, t)?;

        let configured = match &t.split {
            PaymentSplit::Equal => None,
            PaymentSplit::Fixed { increment } => Some(*increment),
            PaymentSplit::FixedWithBalloon { increment, .. } => Some(*increment),
        };
        if let (Some(configured), Some(used)) = (configured, schedule.increment) {
            if used < configured {
                warnings.push(format!(
                    "{}-month plan, {}% tier: fixed payment reduced from {} to {} to fit the balance",
                    terms.months,
                    t.tier,
                    format_money(configured),
                    format_money(used)
                ));
            }
        }
        tiers.push(schedule);
    }

    Ok(HorizonPlan {
        months: terms.months,
        periods: terms.periods,
        tiers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn plan(price: Money) -> ComputationOutput<InstallmentPlan> {
        plan_installments(&InstallmentInput { price }).unwrap()
    }

    #[test]
    fn test_reference_twelve_month_forty() {
        let out = plan(dec!(6000000)).result;
        let t = out.short.require_tier(40).unwrap();

        assert_eq!(t.down_payment, dec!(2400000));
        assert_eq!(t.payments.len(), 11);
        assert_eq!(&t.payments[..10], &[dec!(200000); 10]);
        assert_eq!(t.last_payment(), dec!(1600000));
    }

    #[test]
    fn test_reference_twelve_month_fifty() {
        let out = plan(dec!(6000000)).result;
        let t = out.short.require_tier(50).unwrap();
        assert_eq!(t.down_payment, dec!(3000000));
        assert_eq!(t.last_payment(), dec!(2000000));
    }

    #[test]
    fn test_every_tier_reconciles() {
        let out = plan(dec!(6000000)).result;
        for h in [&out.short, &out.long] {
            assert_eq!(h.tiers.len(), 3);
            for t in &h.tiers {
                assert_eq!(t.total_paid(), t.financed_total, "{}m/{}%", h.months, t.tier);
            }
        }
    }

    #[test]
    fn test_long_surcharges() {
        let out = plan(dec!(6000000)).result;
        let surcharge = |tier| out.long.require_tier(tier).unwrap().markup;
        assert_eq!(surcharge(30), dec!(540000));
        assert_eq!(surcharge(40), dec!(420000));
        assert_eq!(surcharge(50), dec!(240000));
        assert!(out.short.tiers.iter().all(|t| t.markup == Decimal::ZERO));
    }

    #[test]
    fn test_balloon_shared_by_forty_and_fifty() {
        let out = plan(dec!(15000000)).result;
        let p40 = out.long.require_tier(40).unwrap().balloon_payment();
        let p50 = out.long.require_tier(50).unwrap().balloon_payment();
        assert_eq!(p40, Some(dec!(1500000)));
        assert_eq!(p40, p50);
    }

    #[test]
    fn test_capped_increment_is_reported() {
        let out = plan(dec!(6000000));
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("18-month plan, 40% tier"));

        let roomy = plan(dec!(15000000));
        assert!(roomy.warnings.is_empty());
    }

    #[test]
    fn test_zero_price_rejected() {
        let err = plan_installments(&InstallmentInput {
            price: Decimal::ZERO,
        })
        .unwrap_err();
        assert!(matches!(err, LotCalcError::InvalidInput { .. }));
    }

    #[test]
    fn test_plan_is_idempotent() {
        assert_eq!(plan(dec!(7345123)).result, plan(dec!(7345123)).result);
    }
}
