use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use lotcalc_core::installment::{InstallmentInput, InstallmentPlanner};

use crate::input;

/// Arguments for installment plan generation
#[derive(Args)]
pub struct InstallmentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// List price of the lot
    #[arg(long)]
    pub price: Option<Decimal>,

    /// JSON file overriding the default assumption tables
    #[arg(long)]
    pub assumptions: Option<String>,
}

pub fn run_installment(args: InstallmentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let plan_input: InstallmentInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        InstallmentInput {
            price: args.price.ok_or("--price is required (or provide --input)")?,
        }
    };

    let assumptions = super::load_assumptions(args.assumptions.as_deref())?;
    let result = InstallmentPlanner::new(assumptions.installment)?.plan(&plan_input)?;
    Ok(serde_json::to_value(result)?)
}
