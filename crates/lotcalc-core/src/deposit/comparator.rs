use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;

use crate::assumptions::{rate_for_year, DepositAssumptions, RateTrajectory};
use crate::error::LotCalcError;
use crate::rounding::{checked_add, checked_mul, pct_to_rate, require_positive, round_minor, round_pct, share_pct};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::LotCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which rate trajectories to simulate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioSelector {
    All,
    One(String),
}

impl From<&str> for ScenarioSelector {
    fn from(s: &str) -> Self {
        let key = s.trim().to_lowercase();
        if key == "all" {
            ScenarioSelector::All
        } else {
            ScenarioSelector::One(key)
        }
    }
}

impl FromStr for ScenarioSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ScenarioSelector::from(s))
    }
}

fn default_scenario() -> String {
    "all".into()
}

/// Input for the deposit comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositInput {
    /// Principal placed on deposit
    pub amount: Money,
    /// Horizon in whole years
    pub years: u32,
    /// `all` or a single scenario key
    #[serde(default = "default_scenario")]
    pub scenario: String,
}

/// One simulated deposit year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositYear {
    pub year: i32,
    pub start_balance: Money,
    pub key_rate: Percent,
    pub deposit_rate: Percent,
    pub gross_interest: Money,
    pub tax_free_limit: Money,
    pub taxable_income: Money,
    pub tax_amount: Money,
    pub net_interest: Money,
    pub end_balance: Money,
}

/// Outcome of one rate trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositScenario {
    pub key: String,
    pub scenario_name: String,
    pub total_gross_interest: Money,
    pub total_tax: Money,
    /// `total_gross_interest - total_tax`
    pub total_net_interest: Money,
    /// Net interest as a percentage of the principal
    pub total_roi_pct: Percent,
    /// `total_roi_pct` per year
    pub effective_rate: Percent,
    pub final_balance: Money,
    pub yearly: Vec<DepositYear>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositComparison {
    pub amount: Money,
    pub years: u32,
    pub scenarios: Vec<DepositScenario>,
}

impl DepositComparison {
    pub fn scenario(&self, key: &str) -> Option<&DepositScenario> {
        self.scenarios.iter().find(|s| s.key == key)
    }
}

// ---------------------------------------------------------------------------
// Comparator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct DepositComparator {
    assumptions: DepositAssumptions,
}

impl DepositComparator {
    pub fn new(assumptions: DepositAssumptions) -> LotCalcResult<Self> {
        assumptions.validate()?;
        Ok(DepositComparator { assumptions })
    }

    pub fn assumptions(&self) -> &DepositAssumptions {
        &self.assumptions
    }

    /// Resolve a selector against the configured scenarios.
    pub fn select(&self, selector: &ScenarioSelector) -> LotCalcResult<Vec<&RateTrajectory>> {
        match selector {
            ScenarioSelector::All => Ok(self.assumptions.scenarios.iter().collect()),
            ScenarioSelector::One(key) => self
                .assumptions
                .scenario(key)
                .map(|s| vec![s])
                .ok_or_else(|| LotCalcError::UnknownScenario(key.clone())),
        }
    }

    pub fn compare(&self, input: &DepositInput) -> LotCalcResult<ComputationOutput<DepositComparison>> {
        let start = Instant::now();
        require_positive("amount", input.amount)?;
        if input.years == 0 || input.years > self.assumptions.max_years {
            return Err(LotCalcError::InvalidInput {
                field: "years".into(),
                reason: format!(
                    "years must be within 1..={}, got {}",
                    self.assumptions.max_years, input.years
                ),
            });
        }
        let selector = ScenarioSelector::from(input.scenario.as_str());
        let trajectories = self.select(&selector)?;

        let mut warnings: Vec<String> = Vec::new();
        let last_year = self.assumptions.start_year + input.years as i32 - 1;
        for t in &trajectories {
            if let Some(end) = t.key_rates.last().map(|r| r.year) {
                if end < last_year {
                    warnings.push(format!(
                        "Scenario '{}': key rate after {end} held at its final value",
                        t.key
                    ));
                }
            }
        }

        let scenarios = trajectories
            .into_iter()
            .map(|t| self.simulate(input.amount, input.years, t))
            .collect::<LotCalcResult<Vec<_>>>()?;

        tracing::debug!(
            amount = %input.amount,
            years = input.years,
            scenarios = scenarios.len(),
            "deposit scenarios simulated"
        );

        let comparison = DepositComparison {
            amount: input.amount,
            years: input.years,
            scenarios,
        };

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Bank deposit simulation: annual capitalisation net of interest tax",
            &self.assumptions,
            warnings,
            elapsed,
            comparison,
        ))
    }

    /// Run one trajectory. Interest accrues yearly in kopecks; tax is
    /// assessed on each year's interest and, when reinvesting, the net
    /// interest is added to the balance.
    fn simulate(&self, amount: Money, years: u32, trajectory: &RateTrajectory) -> LotCalcResult<DepositScenario> {
        let a = &self.assumptions;
        let mut balance = amount;
        let mut total_gross = Decimal::ZERO;
        let mut total_tax = Decimal::ZERO;
        let mut prior_taxable = Decimal::ZERO;
        let mut yearly = Vec::new();

        for i in 0..years {
            let year = a.start_year + i as i32;
            let key_rate = rate_for_year(&trajectory.key_rates, year).ok_or_else(|| {
                LotCalcError::InternalComputation {
                    context: format!("scenario '{}' has no key rate for {year}", trajectory.key),
                }
            })?;
            let deposit_rate = (key_rate + trajectory.spread).max(a.min_deposit_rate);

            let gross_interest = round_minor(checked_mul(balance, pct_to_rate(deposit_rate), "deposit interest")?);
            let tax = a.tax.assess(gross_interest, key_rate, prior_taxable);
            prior_taxable += tax.taxable_income;
            let net_interest = gross_interest - tax.tax_amount;

            let end_balance = if a.reinvest {
                checked_add(balance, net_interest, "deposit balance")?
            } else {
                balance
            };

            yearly.push(DepositYear {
                year,
                start_balance: round_minor(balance),
                key_rate,
                deposit_rate,
                gross_interest,
                tax_free_limit: round_minor(tax.tax_free_limit),
                taxable_income: round_minor(tax.taxable_income),
                tax_amount: tax.tax_amount,
                net_interest,
                end_balance: round_minor(end_balance),
            });

            total_gross = checked_add(total_gross, gross_interest, "deposit interest")?;
            total_tax += tax.tax_amount;
            balance = end_balance;
        }

        let total_net_interest = total_gross - total_tax;
        let roi = share_pct(total_net_interest, amount, "deposit roi")?;

        Ok(DepositScenario {
            key: trajectory.key.clone(),
            scenario_name: trajectory.name.clone(),
            total_gross_interest: total_gross,
            total_tax,
            total_net_interest,
            total_roi_pct: round_pct(roi, 2),
            effective_rate: round_pct(roi / Decimal::from(years), 2),
            final_balance: round_minor(balance),
            yearly,
        })
    }
}

/// Compare deposit scenarios with the default rate tables.
pub fn compare_deposits(input: &DepositInput) -> LotCalcResult<ComputationOutput<DepositComparison>> {
    DepositComparator::default().compare(input)
}
