use thiserror::Error;

#[derive(Debug, Error)]
pub enum LotCalcError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Internal computation error in {context}")]
    InternalComputation { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LotCalcError {
    /// Stable machine-readable code used in failure envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            LotCalcError::InvalidInput { .. } | LotCalcError::SerializationError(_) => {
                "invalid_input"
            }
            LotCalcError::UnknownScenario(_) => "unknown_scenario",
            LotCalcError::InternalComputation { .. } => "internal_error",
        }
    }

    /// True when the failure was caused by the request rather than the engine.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, LotCalcError::InternalComputation { .. })
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        LotCalcError::InternalComputation {
            context: format!("{}: arithmetic overflow", context.into()),
        }
    }
}

impl From<serde_json::Error> for LotCalcError {
    fn from(e: serde_json::Error) -> Self {
        LotCalcError::SerializationError(e.to_string())
    }
}
