//! Custom numeric property ("knob") declarations.

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;
use crate::spring::SpringProperty;

/// Name of the global manual/spring blend knob.
pub const FOLLOW_SPRING_KNOB: &str = "follow_spring";

/// Range shared by every per-instance factor knob.
pub const FACTOR_RANGE: (f64, f64) = (0.0, 100.0);

/// A custom numeric property declared on a pose bone.
///
/// Hard and soft ranges are kept separately because hosts store them
/// separately, but every constructor sets them identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnobSpec {
    /// Property name.
    pub name: String,
    /// Initial value.
    pub default: f64,
    /// Hard minimum.
    pub min: f64,
    /// Hard maximum.
    pub max: f64,
    /// UI-suggested minimum.
    pub soft_min: f64,
    /// UI-suggested maximum.
    pub soft_max: f64,
}

impl KnobSpec {
    /// Creates a knob whose soft range equals its hard range.
    pub fn new(name: impl Into<String>, default: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            default,
            min,
            max,
            soft_min: min,
            soft_max: max,
        }
    }

    /// The `follow_spring` blend knob: 1.0 in [0, 1].
    pub fn follow_spring() -> Self {
        Self::new(FOLLOW_SPRING_KNOB, 1.0, 0.0, 1.0)
    }

    /// A per-instance factor knob: 1.0 in [0, 100].
    pub fn factor(name: impl Into<String>) -> Self {
        Self::new(name, 1.0, FACTOR_RANGE.0, FACTOR_RANGE.1)
    }

    /// The shared knob for a spring property, with the given default.
    pub fn global(property: SpringProperty, default: f64) -> Self {
        let (min, max) = property.range();
        Self::new(property.global_knob(), default, min, max)
    }

    /// Clamps a value into the hard range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Validates name, range and default.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.name.is_empty() {
            return Err(ParamsError::EmptyKnobName);
        }
        if self.min > self.max || self.soft_min > self.soft_max {
            return Err(ParamsError::InvalidKnobRange {
                name: self.name.clone(),
                min: self.min,
                max: self.max,
            });
        }
        if !(self.min..=self.max).contains(&self.default) {
            return Err(ParamsError::DefaultOutOfRange {
                name: self.name.clone(),
                value: self.default,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}
