//! Error types for rig generation.

use springchain_spec::{BoneRole, CodedError, ParamsError};
use thiserror::Error;

use crate::armature::Mode;

/// Result type for rig generation operations.
pub type RigResult<T> = Result<T, RigError>;

/// Errors that can occur while generating a spring chain rig.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RigError {
    /// The connected source chain is too short.
    #[error("Spring chain rig '{rig}' needs at least {required} connected bones, found {found}")]
    ChainTooShort {
        rig: String,
        found: usize,
        required: usize,
    },

    /// A referenced bone does not exist.
    #[error("Bone '{bone}' not found")]
    BoneNotFound { bone: String },

    /// An operation was issued in the wrong host mode.
    #[error("Cannot {operation} in {actual} mode, {expected} mode required")]
    WrongMode {
        operation: &'static str,
        expected: Mode,
        actual: Mode,
    },

    /// Parenting would create a cycle.
    #[error("Cannot parent '{child}' to '{parent}': would create a cycle")]
    ParentCycle { child: String, parent: String },

    /// A driven constraint does not exist on the bone.
    #[error("Constraint '{constraint}' not found on bone '{bone}'")]
    ConstraintNotFound { bone: String, constraint: String },

    /// A driver variable points at an undeclared property.
    #[error("Property '{property}' not found on bone '{bone}'")]
    PropertyNotFound { bone: String, property: String },

    /// A derived chain does not line up with the source chain.
    #[error("Chain '{role}' has {found} bones, expected {expected}")]
    ChainMismatch {
        role: BoneRole,
        expected: usize,
        found: usize,
    },

    /// Invalid parameters or declarations.
    #[error(transparent)]
    Params(#[from] ParamsError),

    /// The host reported a failure.
    #[error("Host operation failed: {message}")]
    Host { message: String },
}

impl RigError {
    /// Creates a new bone not found error.
    pub fn bone_not_found(bone: impl Into<String>) -> Self {
        Self::BoneNotFound { bone: bone.into() }
    }

    /// Creates a new host failure error.
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }

    /// Returns true for errors raised before any mutation.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, RigError::ChainTooShort { .. } | RigError::Params(_))
    }
}

impl CodedError for RigError {
    fn code(&self) -> &'static str {
        match self {
            RigError::ChainTooShort { .. } => "RIG_001",
            RigError::BoneNotFound { .. } => "RIG_002",
            RigError::WrongMode { .. } => "RIG_003",
            RigError::ParentCycle { .. } => "RIG_004",
            RigError::ConstraintNotFound { .. } => "RIG_005",
            RigError::PropertyNotFound { .. } => "RIG_006",
            RigError::ChainMismatch { .. } => "RIG_007",
            RigError::Params(_) => "RIG_008",
            RigError::Host { .. } => "RIG_009",
        }
    }

    fn category(&self) -> &'static str {
        "rig"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RigError::ChainTooShort {
            rig: "ORG-tail".to_string(),
            found: 2,
            required: 3,
        };
        let text = err.to_string();
        assert!(text.contains("ORG-tail"));
        assert!(text.contains("at least 3"));
        assert!(err.is_configuration_error());

        let err = RigError::WrongMode {
            operation: "duplicate bone",
            expected: Mode::Edit,
            actual: Mode::Pose,
        };
        assert_eq!(
            err.to_string(),
            "Cannot duplicate bone in POSE mode, EDIT mode required"
        );
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(RigError::bone_not_found("x").code(), "RIG_002");
        assert_eq!(RigError::host("boom").code(), "RIG_009");
        assert_eq!(RigError::host("boom").category(), "rig");

        let err: RigError = ParamsError::EmptyKnobName.into();
        assert_eq!(err.code(), "RIG_008");
        assert_eq!(err.to_string(), "Knob name cannot be empty");
    }
}
