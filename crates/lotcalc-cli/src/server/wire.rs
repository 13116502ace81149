//! Request and response bodies of the HTTP API.
//!
//! The engine works in `Decimal`; the catalog UI expects plain JSON numbers,
//! so whole-unit money goes out as integers and everything else as floats.
//! Fields that can carry kopecks switch between the two per value.
//! Requests take either numbers or numeric strings.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use lotcalc_core::deposit::{DepositComparison, DepositInput};
use lotcalc_core::installment::{HorizonPlan, InstallmentPlan};
use lotcalc_core::roi::RoiResult;
use lotcalc_core::{LotCalcError, LotCalcResult};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RoiRequest {
    pub area: Decimal,
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct InstallmentRequest {
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YearsField {
    Number(i64),
    Text(String),
}

fn default_scenario() -> String {
    "all".into()
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: Decimal,
    years: YearsField,
    #[serde(default = "default_scenario")]
    pub scenario: String,
}

impl DepositRequest {
    pub fn into_input(self) -> LotCalcResult<DepositInput> {
        let years = match self.years {
            YearsField::Number(n) => n,
            YearsField::Text(s) => s.trim().parse::<i64>().map_err(|_| invalid_years(&s))?,
        };
        if years <= 0 {
            return Err(LotCalcError::InvalidInput {
                field: "years".into(),
                reason: format!("years must be positive, got {years}"),
            });
        }
        let years = u32::try_from(years).map_err(|_| invalid_years(&years.to_string()))?;
        Ok(DepositInput {
            amount: self.amount,
            years,
            scenario: self.scenario,
        })
    }
}

fn invalid_years(raw: &str) -> LotCalcError {
    LotCalcError::InvalidInput {
        field: "years".into(),
        reason: format!("'{raw}' is not a whole number of years"),
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct RoiData {
    pub roi_pct: f64,
    pub avg_annual_pct: f64,
    pub total_rental: i64,
    pub total_growth: i64,
    pub total_profit: i64,
    pub final_value: i64,
}

impl TryFrom<&RoiResult> for RoiData {
    type Error = LotCalcError;

    fn try_from(r: &RoiResult) -> LotCalcResult<Self> {
        Ok(RoiData {
            roi_pct: float(r.roi_pct, "roi_pct")?,
            avg_annual_pct: float(r.avg_annual_pct, "avg_annual_pct")?,
            total_rental: units(r.total_rental, "total_rental")?,
            total_growth: units(r.total_growth, "total_growth")?,
            total_profit: units(r.total_profit, "total_profit")?,
            final_value: units(r.final_value, "final_value")?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ShortPlanData {
    pub pv_30: i64,
    pub monthly_30: i64,
    pub pv_40: i64,
    pub last_40: serde_json::Number,
    pub pv_50: i64,
    pub last_50: serde_json::Number,
}

#[derive(Debug, Serialize)]
pub struct LongPlanData {
    pub pv_30: i64,
    pub monthly_30: i64,
    pub final_price_30: serde_json::Number,
    pub pv_40: i64,
    pub payment_9: i64,
    pub last_40: serde_json::Number,
    pub pv_50: i64,
    pub last_50: serde_json::Number,
}

#[derive(Debug, Serialize)]
pub struct InstallmentData {
    pub price: serde_json::Number,
    pub i12: ShortPlanData,
    pub i18: LongPlanData,
}

impl TryFrom<&InstallmentPlan> for InstallmentData {
    type Error = LotCalcError;

    fn try_from(p: &InstallmentPlan) -> LotCalcResult<Self> {
        Ok(InstallmentData {
            price: number(p.price, "price")?,
            i12: short_plan(&p.short)?,
            i18: long_plan(&p.long)?,
        })
    }
}

fn short_plan(h: &HorizonPlan) -> LotCalcResult<ShortPlanData> {
    let (t30, t40, t50) = (h.require_tier(30)?, h.require_tier(40)?, h.require_tier(50)?);
    Ok(ShortPlanData {
        pv_30: units(t30.down_payment, "pv_30")?,
        monthly_30: units(t30.installment(), "monthly_30")?,
        pv_40: units(t40.down_payment, "pv_40")?,
        last_40: number(t40.last_payment(), "last_40")?,
        pv_50: units(t50.down_payment, "pv_50")?,
        last_50: number(t50.last_payment(), "last_50")?,
    })
}

fn long_plan(h: &HorizonPlan) -> LotCalcResult<LongPlanData> {
    let (t30, t40, t50) = (h.require_tier(30)?, h.require_tier(40)?, h.require_tier(50)?);
    let payment_9 = t40
        .balloon_payment()
        .ok_or_else(|| LotCalcError::InternalComputation {
            context: format!("{}-month 40% tier has no balloon payment", h.months),
        })?;
    Ok(LongPlanData {
        pv_30: units(t30.down_payment, "pv_30")?,
        monthly_30: units(t30.installment(), "monthly_30")?,
        final_price_30: number(t30.financed_total, "final_price_30")?,
        pv_40: units(t40.down_payment, "pv_40")?,
        payment_9: units(payment_9, "payment_9")?,
        last_40: number(t40.last_payment(), "last_40")?,
        pv_50: units(t50.down_payment, "pv_50")?,
        last_50: number(t50.last_payment(), "last_50")?,
    })
}

#[derive(Debug, Serialize)]
pub struct DepositScenarioData {
    pub scenario_name: String,
    pub total_net_interest: f64,
    pub total_roi_pct: f64,
    pub total_tax: f64,
}

/// Scenario key to summary.
pub type DepositData = BTreeMap<String, DepositScenarioData>;

pub fn deposit_data(c: &DepositComparison) -> LotCalcResult<DepositData> {
    c.scenarios
        .iter()
        .map(|s| -> LotCalcResult<(String, DepositScenarioData)> {
            Ok((
                s.key.clone(),
                DepositScenarioData {
                    scenario_name: s.scenario_name.clone(),
                    total_net_interest: float(s.total_net_interest, "total_net_interest")?,
                    total_roi_pct: float(s.total_roi_pct, "total_roi_pct")?,
                    total_tax: float(s.total_tax, "total_tax")?,
                },
            ))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn out_of_range(field: &str, value: Decimal) -> LotCalcError {
    LotCalcError::InternalComputation {
        context: format!("{field} = {value} does not fit a JSON number"),
    }
}

fn units(value: Decimal, field: &str) -> LotCalcResult<i64> {
    value.round().to_i64().ok_or_else(|| out_of_range(field, value))
}

/// Goes through the decimal text so the float is the nearest one to the
/// printed value.
fn float(value: Decimal, field: &str) -> LotCalcResult<f64> {
    value
        .normalize()
        .to_string()
        .parse::<f64>()
        .map_err(|_| out_of_range(field, value))
}

/// Integer when the value is whole, float otherwise.
fn number(value: Decimal, field: &str) -> LotCalcResult<serde_json::Number> {
    if value.fract().is_zero() {
        return Ok(units(value, field)?.into());
    }
    serde_json::Number::from_f64(float(value, field)?).ok_or_else(|| out_of_range(field, value))
}
