pub mod assumptions;
pub mod error;
pub mod rounding;
pub mod types;

#[cfg(feature = "roi")]
pub mod roi;

#[cfg(feature = "installment")]
pub mod installment;

#[cfg(feature = "deposit")]
pub mod deposit;

pub use error::LotCalcError;
pub use types::*;

/// Standard result type for all lot calculations
pub type LotCalcResult<T> = Result<T, LotCalcError>;
