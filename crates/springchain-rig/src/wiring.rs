//! Constraint wiring engine.
//!
//! Runs in the pose phase once the knobs exist, since every driver variable
//! must resolve to a declared property.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use springchain_spec::constraint::{FOLLOW_DEFORM, FOLLOW_MANUAL, FOLLOW_SPRING, SPRING};
use springchain_spec::{
    BoneConstraint, DeformBlend, Driver, DriverTarget, PreviewSource, PropertyPath,
    SpringChainParams, SpringProperty,
};
use tracing::debug;

use crate::armature::Armature;
use crate::chain::DerivedChains;
use crate::error::{RigError, RigResult};
use crate::properties::{bind_driver, KnobSet};
use crate::session::PoseSession;

/// Maps control and preview bones to their spring target bone, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpringLookup {
    entries: Vec<(String, String)>,
}

impl SpringLookup {
    /// Adds or replaces an entry.
    pub fn insert(&mut self, bone: impl Into<String>, spring: impl Into<String>) {
        let bone = bone.into();
        let spring = spring.into();
        match self.entries.iter_mut().find(|(k, _)| *k == bone) {
            Some(entry) => entry.1 = spring,
            None => self.entries.push((bone, spring)),
        }
    }

    /// Returns the spring target for a bone.
    pub fn get(&self, bone: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == bone)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(bone, spring_target)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn spring_settings(params: &SpringChainParams) -> BTreeMap<SpringProperty, f64> {
    if params.unify_spring_props {
        return BTreeMap::new();
    }
    SpringProperty::ALL
        .into_iter()
        .map(|p| (p, params.spring_default(p)))
        .collect()
}

fn require_knob(path: Option<PropertyPath>, bone: &str, name: &str) -> RigResult<PropertyPath> {
    path.ok_or_else(|| RigError::PropertyNotFound {
        bone: bone.to_string(),
        property: name.to_string(),
    })
}

fn spring_driver(knobs: &KnobSet, target: &str, property: SpringProperty) -> RigResult<Driver> {
    let global = require_knob(
        knobs.global_path(property),
        &knobs.prop_bone,
        &property.global_knob(),
    )?;
    match property.factor_knob() {
        Some(factor) => {
            let factor = require_knob(knobs.factor_path(target, property), target, factor)?;
            Ok(Driver::scaled(global, factor))
        }
        None => Ok(Driver::global(global)),
    }
}

fn wire_deform<A: Armature + ?Sized>(
    session: &mut PoseSession<'_, A>,
    deform: &str,
    control: &str,
    spring: &str,
    follow_spring: &PropertyPath,
    blend: DeformBlend,
) -> RigResult<()> {
    let manual = BoneConstraint::copy_transforms(FOLLOW_MANUAL, control);
    let follow = BoneConstraint::copy_transforms(FOLLOW_SPRING, spring);
    let influence = |name: &str| DriverTarget::Influence {
        constraint: name.to_string(),
    };

    match blend {
        DeformBlend::Layered => {
            session.add_constraint(deform, &manual)?;
            session.add_constraint(deform, &follow)?;
            bind_driver(
                session,
                deform,
                &influence(FOLLOW_SPRING),
                &Driver::passthrough(follow_spring.clone()),
            )
        }
        DeformBlend::Split => {
            session.add_constraint(deform, &follow)?;
            bind_driver(
                session,
                deform,
                &influence(FOLLOW_SPRING),
                &Driver::passthrough(follow_spring.clone()),
            )?;
            session.add_constraint(deform, &manual)?;
            bind_driver(
                session,
                deform,
                &influence(FOLLOW_MANUAL),
                &Driver::complement(follow_spring.clone()),
            )
        }
    }
}

/// Adds every constraint and driver of the rig and returns the UI lookup table.
pub fn wire_constraints<A: Armature + ?Sized>(
    session: &mut PoseSession<'_, A>,
    chains: &DerivedChains,
    knobs: &KnobSet,
    params: &SpringChainParams,
) -> RigResult<SpringLookup> {
    let len = chains.len();
    chains.check_aligned(len)?;
    let follow_spring = knobs.follow_spring_path();
    let settings = spring_settings(params);

    for i in 0..len {
        let source = &chains.spring_source.bones[i].name;
        let target = &chains.spring_target.bones[i].name;
        let control = &chains.control.bones[i].name;
        let deform = &chains.deform.bones[i].name;
        let preview = &chains.preview.bones[i].name;

        session.add_constraint(target, &BoneConstraint::spring(source, settings.clone()))?;
        session.add_constraint(source, &BoneConstraint::copy_rotation_local(control))?;
        wire_deform(
            session,
            deform,
            control,
            target,
            &follow_spring,
            params.deform_blend,
        )?;

        let preview_constraint = match params.preview_source {
            PreviewSource::SpringTarget => BoneConstraint::copy_transforms(FOLLOW_SPRING, target),
            PreviewSource::Deform => BoneConstraint::copy_transforms(FOLLOW_DEFORM, deform),
        };
        session.add_constraint(preview, &preview_constraint)?;

        if params.unify_spring_props {
            for property in SpringProperty::ALL {
                let driven = DriverTarget::SpringParam {
                    constraint: SPRING.to_string(),
                    property,
                };
                let driver = spring_driver(knobs, target, property)?;
                bind_driver(session, target, &driven, &driver)?;
            }
        }
    }

    let mut lookup = SpringLookup::default();
    for chain in [&chains.control, &chains.preview] {
        for (bone, target) in chain.iter_names().zip(chains.spring_target.iter_names()) {
            lookup.insert(bone, target);
        }
    }

    debug!(
        chain_length = len,
        unified = params.unify_spring_props,
        blend = ?params.deform_blend,
        preview = ?params.preview_source,
        lookup = lookup.len(),
        "constraints wired"
    );
    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::duplicate_all;
    use crate::memory::MemoryArmature;
    use crate::properties::declare_knobs;
    use crate::session::EditSession;
    use glam::DVec3;
    use springchain_spec::ConstraintKind;

    fn wired(params: &SpringChainParams) -> (MemoryArmature, DerivedChains, SpringLookup) {
        let mut armature = MemoryArmature::new("rig");
        armature
            .add_chain(&["ORG-a", "ORG-b", "ORG-c"], None, DVec3::ZERO, DVec3::Y, 0.0)
            .unwrap();
        let names = vec!["ORG-a".to_string(), "ORG-b".to_string(), "ORG-c".to_string()];
        let mut edit = EditSession::begin(&mut armature).unwrap();
        let chains = duplicate_all(&mut edit, &names).unwrap();
        let mut pose = edit.commit().unwrap();
        let knobs = declare_knobs(&mut pose, "ORG-a", &chains.spring_target, params).unwrap();
        let lookup = wire_constraints(&mut pose, &chains, &knobs, params).unwrap();
        pose.finish().unwrap();
        (armature, chains, lookup)
    }

    #[test]
    fn test_lookup_maps_to_same_index_target() {
        let (_, chains, lookup) = wired(&SpringChainParams::new());
        assert_eq!(lookup.len(), 6);
        assert_eq!(lookup.get("b"), Some("MCH-b_target"));
        assert_eq!(lookup.get("c_preview"), Some("MCH-c_target"));
        assert_eq!(lookup.get("MCH-a_target"), None);
        let keys: Vec<&str> = lookup.iter().map(|(k, _)| k).collect();
        let mut expected = chains.control.names();
        expected.extend(chains.preview.names());
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_mechanism_constraints() {
        let (armature, _, _) = wired(&SpringChainParams::new());
        let target = armature.bone("MCH-b_target").unwrap();
        assert_eq!(target.constraints.len(), 1);
        assert_eq!(target.constraints[0].name, SPRING);
        assert_eq!(target.constraints[0].subtarget(), "MCH-b_source");

        let source = armature.bone("MCH-b_source").unwrap();
        match &source.constraints[0].kind {
            ConstraintKind::CopyRotation {
                subtarget,
                target_space,
                owner_space,
            } => {
                assert_eq!(subtarget, "b");
                assert_eq!(target_space.blender_name(), "LOCAL");
                assert_eq!(owner_space.blender_name(), "LOCAL");
            }
            other => panic!("unexpected constraint {other:?}"),
        }
    }

    #[test]
    fn test_layered_blend() {
        let (mut armature, _, _) = wired(&SpringChainParams::new());
        let deform = armature.bone("DEF-a").unwrap();
        let names: Vec<&str> = deform.constraints.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec![FOLLOW_MANUAL, FOLLOW_SPRING]);
        assert_eq!(deform.drivers.len(), 1);

        assert_eq!(armature.influence("DEF-a", FOLLOW_MANUAL), Some(1.0));
        assert_eq!(armature.influence("DEF-a", FOLLOW_SPRING), Some(1.0));
        armature.set_property_value("ORG-a", "follow_spring", 0.3).unwrap();
        assert_eq!(armature.influence("DEF-c", FOLLOW_SPRING), Some(0.3));
        assert_eq!(armature.influence("DEF-c", FOLLOW_MANUAL), Some(1.0));
    }

    #[test]
    fn test_split_blend() {
        let params = SpringChainParams::new().with_deform_blend(DeformBlend::Split);
        let (mut armature, _, _) = wired(&params);
        let deform = armature.bone("DEF-b").unwrap();
        let names: Vec<&str> = deform.constraints.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec![FOLLOW_SPRING, FOLLOW_MANUAL]);

        armature.set_property_value("ORG-a", "follow_spring", 0.25).unwrap();
        assert_eq!(armature.influence("DEF-b", FOLLOW_SPRING), Some(0.25));
        assert_eq!(armature.influence("DEF-b", FOLLOW_MANUAL), Some(0.75));
    }

    #[test]
    fn test_preview_source() {
        let (armature, _, _) = wired(&SpringChainParams::new());
        let preview = armature.bone("a_preview").unwrap();
        assert_eq!(preview.constraints.len(), 1);
        assert_eq!(preview.constraints[0].name, FOLLOW_SPRING);
        assert_eq!(preview.constraints[0].subtarget(), "MCH-a_target");
        assert!(preview.drivers.is_empty());

        let params = SpringChainParams::new().with_preview_source(PreviewSource::Deform);
        let (armature, _, _) = wired(&params);
        let preview = armature.bone("a_preview").unwrap();
        assert_eq!(preview.constraints[0].name, FOLLOW_DEFORM);
        assert_eq!(preview.constraints[0].subtarget(), "DEF-a");
    }

    #[test]
    fn test_unified_spring_drivers() {
        let (mut armature, _, _) = wired(&SpringChainParams::new());
        let target = armature.bone("MCH-c_target").unwrap();
        assert_eq!(target.drivers.len(), 9);

        armature.set_property_value("ORG-a", "spring_speed", 2.0).unwrap();
        armature.set_property_value("MCH-c_target", "speed_factor", 1.5).unwrap();
        armature.set_property_value("ORG-a", "spring_stiffness_y", 0.8).unwrap();
        assert_eq!(armature.spring_value("MCH-c_target", SpringProperty::Speed), Some(3.0));
        assert_eq!(armature.spring_value("MCH-a_target", SpringProperty::Speed), Some(2.0));
        assert_eq!(
            armature.spring_value("MCH-b_target", SpringProperty::StiffnessY),
            Some(0.8)
        );
        assert_eq!(
            armature.spring_value("MCH-b_target", SpringProperty::Damping),
            Some(0.5)
        );
    }

    #[test]
    fn test_individual_spring_settings() {
        let params = SpringChainParams::new()
            .with_unify_spring_props(false)
            .with_spring_default(SpringProperty::Gravity, -2.0);
        let (armature, _, _) = wired(&params);
        let target = armature.bone("MCH-a_target").unwrap();
        assert!(target.drivers.is_empty());
        assert_eq!(
            armature.spring_value("MCH-a_target", SpringProperty::Gravity),
            Some(-2.0)
        );
        assert_eq!(
            armature.spring_value("MCH-a_target", SpringProperty::FastFactor),
            Some(1.0)
        );
    }

    #[test]
    fn test_lookup_insert_replaces() {
        let mut lookup = SpringLookup::default();
        lookup.insert("a", "x");
        lookup.insert("a", "y");
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.get("a"), Some("y"));
        assert!(!lookup.is_empty());
    }
}
