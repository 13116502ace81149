mod commands;
mod input;
mod logger;
mod output;
mod server;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::deposit::DepositArgs;
use commands::installment::InstallmentArgs;
use commands::lot::LotArgs;
use commands::roi::RoiArgs;
use commands::serve::ServeArgs;

/// Investment calculators for real-estate lots
#[derive(Parser)]
#[command(
    name = "lotcalc",
    version,
    about = "Investment calculators for real-estate lots",
    long_about = "Project the return on a lot, lay out installment plans, and compare \
                  the purchase against a bank deposit. All arithmetic is decimal. \
                  `serve` exposes the same calculators as a JSON HTTP API."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Project rental income and appreciation over the ROI horizon
    Roi(RoiArgs),
    /// Build the 12- and 18-month installment plans
    Installment(InstallmentArgs),
    /// Compare bank deposit scenarios
    Deposit(DepositArgs),
    /// Run every calculator for one catalog lot
    Lot(LotArgs),
    /// Serve the calculators over HTTP
    Serve(ServeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Serve(_)) {
        logger::init_server_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Roi(args) => commands::roi::run_roi(args),
        Commands::Installment(args) => commands::installment::run_installment(args),
        Commands::Deposit(args) => commands::deposit::run_deposit(args),
        Commands::Lot(args) => commands::lot::run_lot(args),
        Commands::Serve(args) => {
            if let Err(e) = commands::serve::run_serve(args) {
                fail(e);
            }
            return;
        }
        Commands::Version => {
            println!("lotcalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => fail(e),
    }
}

fn fail(e: Box<dyn std::error::Error>) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}
