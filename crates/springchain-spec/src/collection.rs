//! Bone collections the generated bones are grouped into.

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;

fn shown() -> bool {
    true
}

/// A named group of bones. Hidden groups keep mechanism bones out of the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoneCollection {
    pub name: String,
    #[serde(default = "shown")]
    pub visible: bool,
    /// Unselectable bones cannot be picked in the viewport.
    #[serde(default = "shown")]
    pub selectable: bool,
}

impl BoneCollection {
    /// Visible and selectable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            selectable: true,
        }
    }

    pub fn with_visibility(self, visible: bool) -> Self {
        Self { visible, ..self }
    }

    pub fn with_selectability(self, selectable: bool) -> Self {
        Self { selectable, ..self }
    }

    /// Hosts key collections by name, so it must not be empty.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.name.is_empty() {
            return Err(ParamsError::EmptyCollectionName);
        }
        Ok(())
    }
}

/// Standard bone collections of a spring chain rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoneCollectionPreset {
    /// Animator control bones.
    Controls,
    /// Simulation preview bones.
    Preview,
    /// Deformation bones.
    Deform,
    /// Spring mechanism bones.
    Mechanism,
}

impl BoneCollectionPreset {
    /// Returns the default name for this preset.
    pub fn default_name(&self) -> &'static str {
        match self {
            BoneCollectionPreset::Controls => "Spring Controls",
            BoneCollectionPreset::Preview => "Spring Preview",
            BoneCollectionPreset::Deform => "Deform",
            BoneCollectionPreset::Mechanism => "Mechanism",
        }
    }

    /// Returns whether bones in this collection are user-facing.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            BoneCollectionPreset::Controls | BoneCollectionPreset::Preview
        )
    }

    /// Creates a bone collection from this preset.
    pub fn to_collection(&self) -> BoneCollection {
        BoneCollection::new(self.default_name())
            .with_visibility(self.is_user_facing())
            .with_selectability(self.is_user_facing())
    }
}
