use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use lotcalc_core::roi::{RoiInput, RoiProjector};

use crate::input;

/// Arguments for the ROI projection
#[derive(Args)]
pub struct RoiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Lot floor area in square meters
    #[arg(long)]
    pub area: Option<Decimal>,

    /// Purchase price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// JSON file overriding the default assumption tables
    #[arg(long)]
    pub assumptions: Option<String>,
}

pub fn run_roi(args: RoiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let roi_input: RoiInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        RoiInput {
            area: args.area.ok_or("--area is required (or provide --input)")?,
            price: args.price.ok_or("--price is required (or provide --input)")?,
        }
    };

    let assumptions = super::load_assumptions(args.assumptions.as_deref())?;
    let result = RoiProjector::new(assumptions.roi)?.project(&roi_input)?;
    Ok(serde_json::to_value(result)?)
}
