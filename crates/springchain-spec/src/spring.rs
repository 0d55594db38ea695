//! Tunable spring constraint properties.

use serde::{Deserialize, Serialize};

/// A tunable parameter of the spring constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpringProperty {
    /// Simulation speed.
    Speed,
    /// Velocity damping.
    Damping,
    /// Gravity pull.
    Gravity,
    /// Stiffness around the X axis.
    StiffnessX,
    /// Stiffness around the Y axis.
    StiffnessY,
    /// Stiffness around the Z axis.
    StiffnessZ,
    /// Distance under which the spring snaps to rest.
    DistThreshold,
    /// Speed multiplier applied on fast motion.
    FastFactor,
    /// Frame on which the simulation resets.
    ResetOnFrame,
}

impl SpringProperty {
    /// All properties, in the order they are displayed.
    pub const ALL: [SpringProperty; 9] = [
        SpringProperty::Speed,
        SpringProperty::Damping,
        SpringProperty::Gravity,
        SpringProperty::StiffnessX,
        SpringProperty::StiffnessY,
        SpringProperty::StiffnessZ,
        SpringProperty::DistThreshold,
        SpringProperty::FastFactor,
        SpringProperty::ResetOnFrame,
    ];

    /// Returns the constraint attribute name for this property.
    pub fn attribute(&self) -> &'static str {
        match self {
            SpringProperty::Speed => "speed",
            SpringProperty::Damping => "damping",
            SpringProperty::Gravity => "gravity",
            SpringProperty::StiffnessX => "stiffness_x",
            SpringProperty::StiffnessY => "stiffness_y",
            SpringProperty::StiffnessZ => "stiffness_z",
            SpringProperty::DistThreshold => "dist_threshold",
            SpringProperty::FastFactor => "fast_factor",
            SpringProperty::ResetOnFrame => "reset_on_frame",
        }
    }

    /// Returns the UI label for this property.
    pub fn label(&self) -> &'static str {
        match self {
            SpringProperty::Speed => "Speed",
            SpringProperty::Damping => "Damping",
            SpringProperty::Gravity => "Gravity",
            SpringProperty::StiffnessX => "Stiffness X",
            SpringProperty::StiffnessY => "Stiffness Y",
            SpringProperty::StiffnessZ => "Stiffness Z",
            SpringProperty::DistThreshold => "Distance threshold",
            SpringProperty::FastFactor => "Fast factor",
            SpringProperty::ResetOnFrame => "Reset on frame",
        }
    }

    /// Returns the name of the shared knob stored on the prop bone in unify mode.
    pub fn global_knob(&self) -> String {
        format!("spring_{}", self.attribute())
    }

    /// Returns whether each spring instance can scale this property by a factor.
    pub fn is_tweakable(&self) -> bool {
        self.factor_knob().is_some()
    }

    /// Returns the per-instance factor knob name, for tweakable properties.
    pub fn factor_knob(&self) -> Option<&'static str> {
        match self {
            SpringProperty::Speed => Some("speed_factor"),
            SpringProperty::Gravity => Some("gravity_factor"),
            SpringProperty::Damping => Some("damping_factor"),
            _ => None,
        }
    }

    /// Returns the default value of this property.
    pub fn default_value(&self) -> f64 {
        match self {
            SpringProperty::Speed => 1.0,
            SpringProperty::Damping => 0.5,
            SpringProperty::Gravity => 0.0,
            SpringProperty::StiffnessX | SpringProperty::StiffnessY | SpringProperty::StiffnessZ => {
                0.5
            }
            SpringProperty::DistThreshold => 0.0,
            SpringProperty::FastFactor => 1.0,
            SpringProperty::ResetOnFrame => 1.0,
        }
    }

    /// Returns the (min, max) range of this property.
    pub fn range(&self) -> (f64, f64) {
        match self {
            SpringProperty::Speed => (0.0, 10.0),
            SpringProperty::Damping => (0.0, 1.0),
            SpringProperty::Gravity => (-10.0, 10.0),
            SpringProperty::StiffnessX | SpringProperty::StiffnessY | SpringProperty::StiffnessZ => {
                (0.0, 1.0)
            }
            SpringProperty::DistThreshold => (0.0, 10.0),
            SpringProperty::FastFactor => (0.0, 10.0),
            SpringProperty::ResetOnFrame => (-100_000.0, 100_000.0),
        }
    }

    /// Returns the tweakable properties, in factor knob order.
    pub fn tweakable() -> impl Iterator<Item = SpringProperty> {
        [
            SpringProperty::Speed,
            SpringProperty::Gravity,
            SpringProperty::Damping,
        ]
        .into_iter()
    }
}
