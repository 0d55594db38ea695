//! Error types for parameter and schema validation.

use thiserror::Error;

/// A stable, machine-readable code attached to every error in the workspace.
///
/// Codes are meant for programmatic handling and reporting; the `Display`
/// text of the error is for humans.
pub trait CodedError: std::error::Error {
    /// Returns a static code like "PARAMS_001" or "RIG_004".
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Returns the error category, e.g. "params" or "rig".
    fn category(&self) -> &'static str;
}

/// Errors raised while validating generation parameters and declarations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    /// Knob declared with an inverted range.
    #[error("Knob '{name}' has min {min} greater than max {max}")]
    InvalidKnobRange { name: String, min: f64, max: f64 },

    /// Knob default value outside of its declared range.
    #[error("Knob '{name}' default {value} is outside [{min}, {max}]")]
    DefaultOutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Knob declared without a name.
    #[error("Knob name cannot be empty")]
    EmptyKnobName,

    /// Driver expression references a variable with no binding.
    #[error("Driver variable '{0}' is not bound to a property")]
    UnboundDriverVariable(String),

    /// Bone collection name is empty.
    #[error("Bone collection name cannot be empty")]
    EmptyCollectionName,

    /// Failed to parse parameters from JSON.
    #[error("Failed to parse spring chain params: {0}")]
    Parse(String),
}

impl CodedError for ParamsError {
    fn code(&self) -> &'static str {
        match self {
            ParamsError::InvalidKnobRange { .. } => "PARAMS_001",
            ParamsError::DefaultOutOfRange { .. } => "PARAMS_002",
            ParamsError::EmptyKnobName => "PARAMS_003",
            ParamsError::UnboundDriverVariable(_) => "PARAMS_004",
            ParamsError::EmptyCollectionName => "PARAMS_005",
            ParamsError::Parse(_) => "PARAMS_006",
        }
    }

    fn category(&self) -> &'static str {
        "params"
    }
}
