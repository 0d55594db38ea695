//! Bone constraint descriptions handed to the host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::spring::SpringProperty;

/// Name of the spring constraint on every spring target bone.
pub const SPRING: &str = "Spring";
/// Name of the control rotation constraint on spring source bones.
pub const COPY_ROTATION: &str = "Copy Rotation";
/// Name of the deform constraint that copies the spring target.
pub const FOLLOW_SPRING: &str = "Follow Spring";
/// Name of the deform constraint that copies the control bone.
pub const FOLLOW_MANUAL: &str = "Follow Manual";
/// Name of the preview constraint when previews copy the deform chain.
pub const FOLLOW_DEFORM: &str = "Follow Deform";

/// Space a constraint reads or writes transforms in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformSpace {
    /// World space (default).
    #[default]
    World,
    /// Bone local space.
    Local,
}

impl TransformSpace {
    /// Returns the Blender enum name for this space.
    pub fn blender_name(&self) -> &'static str {
        match self {
            TransformSpace::World => "WORLD",
            TransformSpace::Local => "LOCAL",
        }
    }
}

/// Kind-specific constraint data. Every kind targets a bone of the same armature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Copies the target rotation.
    CopyRotation {
        subtarget: String,
        target_space: TransformSpace,
        owner_space: TransformSpace,
    },
    /// Copies the full target transform.
    CopyTransforms { subtarget: String },
    /// Spring simulation reading its rest frame from the subtarget.
    Spring {
        subtarget: String,
        /// Initial values for spring properties; unset ones use host defaults.
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        settings: BTreeMap<SpringProperty, f64>,
    },
}

/// A named constraint instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneConstraint {
    /// Constraint name, unique on its owner.
    pub name: String,
    /// Kind-specific data.
    pub kind: ConstraintKind,
}

impl BoneConstraint {
    /// Local-space to local-space rotation copy.
    pub fn copy_rotation_local(subtarget: impl Into<String>) -> Self {
        Self {
            name: COPY_ROTATION.to_string(),
            kind: ConstraintKind::CopyRotation {
                subtarget: subtarget.into(),
                target_space: TransformSpace::Local,
                owner_space: TransformSpace::Local,
            },
        }
    }

    /// Named full transform copy.
    pub fn copy_transforms(name: impl Into<String>, subtarget: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ConstraintKind::CopyTransforms {
                subtarget: subtarget.into(),
            },
        }
    }

    /// Spring constraint with explicit initial settings.
    pub fn spring(subtarget: impl Into<String>, settings: BTreeMap<SpringProperty, f64>) -> Self {
        Self {
            name: SPRING.to_string(),
            kind: ConstraintKind::Spring {
                subtarget: subtarget.into(),
                settings,
            },
        }
    }

    /// Returns the bone this constraint reads from.
    pub fn subtarget(&self) -> &str {
        match &self.kind {
            ConstraintKind::CopyRotation { subtarget, .. } => subtarget,
            ConstraintKind::CopyTransforms { subtarget } => subtarget,
            ConstraintKind::Spring { subtarget, .. } => subtarget,
        }
    }

    /// Returns the Blender constraint type.
    pub fn blender_type(&self) -> &'static str {
        match self.kind {
            ConstraintKind::CopyRotation { .. } => "COPY_ROTATION",
            ConstraintKind::CopyTransforms { .. } => "COPY_TRANSFORMS",
            ConstraintKind::Spring { .. } => "SPRING",
        }
    }

    /// Returns whether this is a spring constraint.
    pub fn is_spring(&self) -> bool {
        matches!(self.kind, ConstraintKind::Spring { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_rotation_is_local() {
        let con = BoneConstraint::copy_rotation_local("tail");
        assert_eq!(con.name, "Copy Rotation");
        assert_eq!(con.subtarget(), "tail");
        assert_eq!(con.blender_type(), "COPY_ROTATION");
        match con.kind {
            ConstraintKind::CopyRotation {
                target_space,
                owner_space,
                ..
            } => {
                assert_eq!(target_space.blender_name(), "LOCAL");
                assert_eq!(owner_space, TransformSpace::Local);
            }
            _ => panic!("Expected CopyRotation"),
        }
    }

    #[test]
    fn test_spring_serde() {
        let mut settings = BTreeMap::new();
        settings.insert(SpringProperty::Damping, 0.2);
        let con = BoneConstraint::spring("MCH-a_source", settings);
        assert!(con.is_spring());

        let json = serde_json::to_string(&con).unwrap();
        assert!(json.contains("\"type\":\"spring\""));
        assert!(json.contains("\"damping\":0.2"));

        let parsed: BoneConstraint = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, con);
    }

    #[test]
    fn test_spring_serde_defaults() {
        let json = r#"{"name":"Spring","kind":{"type":"spring","subtarget":"x"}}"#;
        let parsed: BoneConstraint = serde_json::from_str(json).unwrap();
        match parsed.kind {
            ConstraintKind::Spring { settings, .. } => assert!(settings.is_empty()),
            _ => panic!("Expected Spring"),
        }
    }
}
