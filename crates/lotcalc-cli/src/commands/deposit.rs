use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use lotcalc_core::deposit::{DepositComparator, DepositInput};

use crate::input;

/// Arguments for the deposit comparison
#[derive(Args)]
pub struct DepositArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Principal placed on deposit
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Horizon in years
    #[arg(long, default_value_t = 11)]
    pub years: u32,

    /// Scenario key, or "all"
    #[arg(long, default_value = "all")]
    pub scenario: String,

    /// JSON file overriding the default assumption tables
    #[arg(long)]
    pub assumptions: Option<String>,
}

pub fn run_deposit(args: DepositArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deposit_input: DepositInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        DepositInput {
            amount: args.amount.ok_or("--amount is required (or provide --input)")?,
            years: args.years,
            scenario: args.scenario,
        }
    };

    let assumptions = super::load_assumptions(args.assumptions.as_deref())?;
    let result = DepositComparator::new(assumptions.deposit)?.compare(&deposit_input)?;
    Ok(serde_json::to_value(result)?)
}
