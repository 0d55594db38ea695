//! Chain duplication.
//!
//! Every role gets one copy of each source bone. Copies are index-aligned with
//! the source chain; downstream code pairs bones by position, never by name.

use serde::{Deserialize, Serialize};
use springchain_spec::{BoneRole, DerivedName};
use tracing::debug;

use crate::armature::Armature;
use crate::error::{RigError, RigResult};
use crate::session::EditSession;

/// A bone created by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedBone {
    /// Structured identity.
    pub id: DerivedName,
    /// Name registered by the host.
    pub name: String,
}

/// One derived chain, index-aligned with the source chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedChain {
    /// Role shared by every bone of the chain.
    pub role: BoneRole,
    /// Bones, root first.
    pub bones: Vec<DerivedBone>,
}

impl DerivedChain {
    /// Number of bones.
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Returns true if the chain has no bones.
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Host name of the bone at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.bones.get(index).map(|b| b.name.as_str())
    }

    /// Host names, root first.
    pub fn names(&self) -> Vec<String> {
        self.bones.iter().map(|b| b.name.clone()).collect()
    }

    /// Iterates over host names, root first.
    pub fn iter_names(&self) -> impl Iterator<Item = &str> {
        self.bones.iter().map(|b| b.name.as_str())
    }

    /// Iterates over `(host name, display name)` pairs, root first.
    ///
    /// The display name comes from the structured identity, so it survives
    /// the host renaming a bone on collision.
    pub fn display_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bones
            .iter()
            .map(|b| (b.name.as_str(), b.id.display_name()))
    }
}

/// The five derived chains of a spring chain rig.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedChains {
    /// Deformation chain.
    pub deform: DerivedChain,
    /// Spring source mechanism chain.
    pub spring_source: DerivedChain,
    /// Spring target mechanism chain.
    pub spring_target: DerivedChain,
    /// Control chain.
    pub control: DerivedChain,
    /// Preview chain.
    pub preview: DerivedChain,
}

impl DerivedChains {
    /// Returns the chain for a role.
    pub fn chain(&self, role: BoneRole) -> &DerivedChain {
        match role {
            BoneRole::Deform => &self.deform,
            BoneRole::SpringSource => &self.spring_source,
            BoneRole::SpringTarget => &self.spring_target,
            BoneRole::Control => &self.control,
            BoneRole::Preview => &self.preview,
        }
    }

    /// Iterates over all chains in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &DerivedChain> {
        BoneRole::ALL.into_iter().map(move |role| self.chain(role))
    }

    /// Length of the chains.
    pub fn len(&self) -> usize {
        self.control.len()
    }

    /// Returns true if the chains are empty.
    pub fn is_empty(&self) -> bool {
        self.control.is_empty()
    }

    /// Total number of derived bones.
    pub fn bone_count(&self) -> usize {
        self.iter().map(DerivedChain::len).sum()
    }

    /// Checks that every chain has `expected` bones.
    pub fn check_aligned(&self, expected: usize) -> RigResult<()> {
        for chain in self.iter() {
            if chain.len() != expected {
                return Err(RigError::ChainMismatch {
                    role: chain.role,
                    expected,
                    found: chain.len(),
                });
            }
        }
        Ok(())
    }
}

/// Copies every source bone into a new chain for `role`.
pub fn duplicate_chain<A: Armature + ?Sized>(
    session: &mut EditSession<'_, A>,
    source: &[String],
    role: BoneRole,
) -> RigResult<DerivedChain> {
    let mut bones = Vec::with_capacity(source.len());
    for bone in source {
        let id = DerivedName::from_source(role, bone);
        let name = session.duplicate_bone(bone, &id.to_host_name())?;
        bones.push(DerivedBone { id, name });
    }
    debug!(%role, count = bones.len(), "duplicated chain");
    Ok(DerivedChain { role, bones })
}

/// Creates all five derived chains.
pub fn duplicate_all<A: Armature + ?Sized>(
    session: &mut EditSession<'_, A>,
    source: &[String],
) -> RigResult<DerivedChains> {
    let chains = DerivedChains {
        deform: duplicate_chain(session, source, BoneRole::Deform)?,
        spring_source: duplicate_chain(session, source, BoneRole::SpringSource)?,
        spring_target: duplicate_chain(session, source, BoneRole::SpringTarget)?,
        control: duplicate_chain(session, source, BoneRole::Control)?,
        preview: duplicate_chain(session, source, BoneRole::Preview)?,
    };
    chains.check_aligned(source.len())?;
    Ok(chains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryArmature;
    use glam::DVec3;

    fn source() -> (MemoryArmature, Vec<String>) {
        let mut armature = MemoryArmature::new("rig");
        armature
            .add_chain(
                &["ORG-a", "ORG-b", "ORG-c"],
                None,
                DVec3::ZERO,
                DVec3::Y,
                0.2,
            )
            .unwrap();
        let names = vec!["ORG-a".to_string(), "ORG-b".to_string(), "ORG-c".to_string()];
        (armature, names)
    }

    #[test]
    fn test_duplicate_all() {
        let (mut armature, names) = source();
        let mut session = EditSession::begin(&mut armature).unwrap();
        let chains = duplicate_all(&mut session, &names).unwrap();
        assert_eq!(session.stats().bones_created, 15);

        assert_eq!(chains.len(), 3);
        assert_eq!(chains.bone_count(), 15);
        assert_eq!(chains.deform.names(), vec!["DEF-a", "DEF-b", "DEF-c"]);
        assert_eq!(
            chains.spring_source.names(),
            vec!["MCH-a_source", "MCH-b_source", "MCH-c_source"]
        );
        assert_eq!(
            chains.spring_target.names(),
            vec!["MCH-a_target", "MCH-b_target", "MCH-c_target"]
        );
        assert_eq!(chains.control.names(), vec!["a", "b", "c"]);
        assert_eq!(chains.preview.names(), vec!["a_preview", "b_preview", "c_preview"]);
        assert_eq!(chains.preview.bones[1].id.display_name(), "b");
        assert_eq!(chains.chain(BoneRole::Control).role, BoneRole::Control);
    }

    #[test]
    fn test_copies_keep_geometry() {
        let (mut armature, names) = source();
        let mut session = EditSession::begin(&mut armature).unwrap();
        let chains = duplicate_all(&mut session, &names).unwrap();
        for chain in chains.iter() {
            for (i, bone) in chain.iter_names().enumerate() {
                assert_eq!(
                    session.geometry(bone).unwrap(),
                    session.geometry(&names[i]).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_check_aligned() {
        let (mut armature, names) = source();
        let mut session = EditSession::begin(&mut armature).unwrap();
        let mut chains = duplicate_all(&mut session, &names).unwrap();
        chains.preview.bones.pop();
        assert_eq!(
            chains.check_aligned(3),
            Err(RigError::ChainMismatch {
                role: BoneRole::Preview,
                expected: 3,
                found: 2,
            })
        );
    }
}
