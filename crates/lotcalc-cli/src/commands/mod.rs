pub mod deposit;
pub mod installment;
pub mod lot;
pub mod roi;
pub mod serve;

use lotcalc_core::assumptions::Assumptions;

use crate::input;

/// Load an assumption override file, or the built-in defaults.
pub fn load_assumptions(path: Option<&str>) -> Result<Assumptions, Box<dyn std::error::Error>> {
    let assumptions = match path {
        Some(p) => {
            let loaded: Assumptions = input::file::read_json(p)?;
            tracing::info!(path = p, "loaded assumption overrides");
            loaded
        }
        None => Assumptions::default(),
    };
    assumptions.validate()?;
    Ok(assumptions)
}
