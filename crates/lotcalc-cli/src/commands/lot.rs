use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use lotcalc_core::deposit::{DepositComparator, DepositInput};
use lotcalc_core::installment::{InstallmentInput, InstallmentPlanner};
use lotcalc_core::roi::{RoiInput, RoiProjector};
use lotcalc_core::{Lot, LotStatus};

use crate::input;

/// Deposit horizon used when a lot is compared against a bank deposit.
const LOT_DEPOSIT_YEARS: u32 = 11;

/// Arguments for the full lot report
#[derive(Args)]
pub struct LotArgs {
    /// Path to a catalog lot JSON file
    #[arg(long)]
    pub input: Option<String>,

    /// Lot code
    #[arg(long)]
    pub code: Option<String>,

    /// List price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Floor area in square meters
    #[arg(long)]
    pub area: Option<Decimal>,

    /// JSON file overriding the default assumption tables
    #[arg(long)]
    pub assumptions: Option<String>,
}

/// Run every calculator for one catalog lot: ROI, both installment
/// programs, and the same money placed on deposit for the ROI horizon.
pub fn run_lot(args: LotArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let lot: Lot = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        Lot {
            code: args.code.unwrap_or_default(),
            price: args.price.ok_or("--price is required (or provide --input)")?,
            area: args.area.ok_or("--area is required (or provide --input)")?,
            floor: None,
            building: None,
            status: LotStatus::Available,
        }
    };

    if lot.status != LotStatus::Available {
        tracing::warn!(code = %lot.code, status = ?lot.status, "lot is not available");
    }

    let assumptions = super::load_assumptions(args.assumptions.as_deref())?;

    let roi = RoiProjector::new(assumptions.roi)?.project(&RoiInput {
        area: lot.area,
        price: lot.price,
    })?;
    let installment = InstallmentPlanner::new(assumptions.installment)?.plan(&InstallmentInput {
        price: lot.price,
    })?;
    let deposit = DepositComparator::new(assumptions.deposit)?.compare(&DepositInput {
        amount: lot.price,
        years: LOT_DEPOSIT_YEARS,
        scenario: "all".into(),
    })?;

    tracing::info!(code = %lot.code, "lot report built");

    Ok(json!({
        "lot": lot,
        "roi": roi,
        "installment": installment,
        "deposit": deposit,
    }))
}
