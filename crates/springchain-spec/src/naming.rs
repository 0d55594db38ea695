//! Bone roles and derived bone identities.
//!
//! A derived bone is identified by its [`BoneRole`] plus the base name of the
//! source bone it was copied from. The flat host name (`DEF-tail`,
//! `MCH-tail_target`, ...) is only produced at the host boundary, so display
//! names never have to be recovered by slicing strings.

use serde::{Deserialize, Serialize};

use crate::collection::BoneCollectionPreset;

/// Prefix carried by original (metarig) bones.
pub const ORG_PREFIX: &str = "ORG-";
/// Prefix for deformation bones.
pub const DEFORM_PREFIX: &str = "DEF-";
/// Prefix for mechanism bones.
pub const MECHANISM_PREFIX: &str = "MCH-";
/// Suffix for spring source mechanism bones.
pub const SOURCE_SUFFIX: &str = "_source";
/// Suffix for spring target mechanism bones.
pub const TARGET_SUFFIX: &str = "_target";
/// Suffix for preview bones.
pub const PREVIEW_SUFFIX: &str = "_preview";

/// Strips the original-bone prefix from a name, if present.
pub fn strip_org(name: &str) -> &str {
    name.strip_prefix(ORG_PREFIX).unwrap_or(name)
}

/// Role of a derived bone within the spring chain rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoneRole {
    /// Deformation bone, blends manual and spring motion.
    Deform,
    /// Spring rest frame, follows the control bone rotation.
    SpringSource,
    /// Spring output, carries the spring constraint.
    SpringTarget,
    /// Animator control bone.
    Control,
    /// Non-interactive bone showing the simulated result.
    Preview,
}

impl BoneRole {
    /// All roles in creation order.
    pub const ALL: [BoneRole; 5] = [
        BoneRole::Deform,
        BoneRole::SpringSource,
        BoneRole::SpringTarget,
        BoneRole::Control,
        BoneRole::Preview,
    ];

    /// Returns the host bone name for a base name in this role.
    pub fn host_name(&self, base: &str) -> String {
        match self {
            BoneRole::Deform => format!("{DEFORM_PREFIX}{base}"),
            BoneRole::SpringSource => format!("{MECHANISM_PREFIX}{base}{SOURCE_SUFFIX}"),
            BoneRole::SpringTarget => format!("{MECHANISM_PREFIX}{base}{TARGET_SUFFIX}"),
            BoneRole::Control => base.to_string(),
            BoneRole::Preview => format!("{base}{PREVIEW_SUFFIX}"),
        }
    }

    /// Returns the bone collection this role is grouped into.
    pub fn collection_preset(&self) -> BoneCollectionPreset {
        match self {
            BoneRole::Deform => BoneCollectionPreset::Deform,
            BoneRole::SpringSource | BoneRole::SpringTarget => BoneCollectionPreset::Mechanism,
            BoneRole::Control => BoneCollectionPreset::Controls,
            BoneRole::Preview => BoneCollectionPreset::Preview,
        }
    }
}

impl std::fmt::Display for BoneRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BoneRole::Deform => "deform",
            BoneRole::SpringSource => "spring_source",
            BoneRole::SpringTarget => "spring_target",
            BoneRole::Control => "control",
            BoneRole::Preview => "preview",
        };
        f.write_str(s)
    }
}

/// Structured identity of a derived bone: a role plus the source base name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivedName {
    /// Role of the bone.
    pub role: BoneRole,
    /// Source bone name without the original-bone prefix.
    pub base: String,
}

impl DerivedName {
    /// Creates a derived name directly from a role and base name.
    pub fn new(role: BoneRole, base: impl Into<String>) -> Self {
        Self {
            role,
            base: base.into(),
        }
    }

    /// Derives the identity for `role` from a source bone name.
    pub fn from_source(role: BoneRole, source: &str) -> Self {
        Self::new(role, strip_org(source))
    }

    /// Returns the flat name requested from the host.
    pub fn to_host_name(&self) -> String {
        self.role.host_name(&self.base)
    }

    /// Returns the name shown to animators.
    pub fn display_name(&self) -> &str {
        &self.base
    }
}

impl std::fmt::Display for DerivedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_host_name())
    }
}
