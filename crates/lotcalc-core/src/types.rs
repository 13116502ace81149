use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LotCalcError;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Percentages as displayed (12.5 = 12.5%).
pub type Percent = Decimal;

/// Floor area in square meters
pub type Area = Decimal;

/// Sales status of a lot as reported by the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotStatus {
    #[default]
    Available,
    Booked,
    Sold,
}

/// A catalog lot. Owned by the catalog; the calculators only read
/// `price` and `area`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    pub code: String,
    pub price: Money,
    pub area: Area,
    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub status: LotStatus,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Error body carried by a failed [`Envelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
}

/// Request/response envelope consumed by the catalog UI.
///
/// `ok: true` always comes with `data`; `ok: false` never does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(err: &LotCalcError) -> Self {
        Envelope {
            ok: false,
            data: None,
            error: Some(EnvelopeError {
                code: err.code().to_string(),
                message: err.to_string(),
            }),
        }
    }
}
