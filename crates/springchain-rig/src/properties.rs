//! Property schema and driver binding.
//!
//! `follow_spring` always lives on the prop bone (the first source bone). In
//! unify mode the prop bone also carries one shared knob per spring property,
//! and every spring target bone carries a factor knob for each tweakable
//! property.

use serde::{Deserialize, Serialize};
use springchain_spec::{
    Driver, DriverTarget, KnobSpec, PropertyPath, SpringChainParams, SpringProperty,
};
use tracing::debug;

use crate::armature::Armature;
use crate::chain::DerivedChain;
use crate::error::RigResult;
use crate::session::PoseSession;

/// Factor knobs declared on one spring target bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorKnobs {
    /// Spring target bone owning the knobs.
    pub bone: String,
    /// Knobs, in `SpringProperty::tweakable` order.
    pub knobs: Vec<KnobSpec>,
}

/// Every knob declared for one rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnobSet {
    /// Bone carrying `follow_spring` and the shared knobs.
    pub prop_bone: String,
    /// The manual/spring blend knob.
    pub follow_spring: KnobSpec,
    /// Shared spring knobs (unify mode only).
    pub globals: Vec<KnobSpec>,
    /// Per-instance factor knobs (unify mode only).
    pub factors: Vec<FactorKnobs>,
}

impl KnobSet {
    /// Returns true when shared spring knobs were declared.
    pub fn is_unified(&self) -> bool {
        !self.globals.is_empty()
    }

    /// Total number of declared knobs.
    pub fn count(&self) -> usize {
        1 + self.globals.len() + self.factors.iter().map(|f| f.knobs.len()).sum::<usize>()
    }

    /// Path of the `follow_spring` knob.
    pub fn follow_spring_path(&self) -> PropertyPath {
        PropertyPath::new(&self.prop_bone, &self.follow_spring.name)
    }

    /// Path of the shared knob for a spring property, if declared.
    pub fn global_path(&self, property: SpringProperty) -> Option<PropertyPath> {
        let name = property.global_knob();
        self.globals
            .iter()
            .find(|k| k.name == name)
            .map(|k| PropertyPath::new(&self.prop_bone, &k.name))
    }

    /// Path of the factor knob for a spring property on a spring target bone.
    pub fn factor_path(&self, bone: &str, property: SpringProperty) -> Option<PropertyPath> {
        let name = property.factor_knob()?;
        self.factors
            .iter()
            .find(|f| f.bone == bone)?
            .knobs
            .iter()
            .find(|k| k.name == name)
            .map(|k| PropertyPath::new(bone, &k.name))
    }
}

/// Validates and declares a knob, returning its path.
pub fn declare_knob<A: Armature + ?Sized>(
    session: &mut PoseSession<'_, A>,
    owner: &str,
    knob: &KnobSpec,
) -> RigResult<PropertyPath> {
    knob.validate()?;
    session.declare_property(owner, knob)?;
    Ok(PropertyPath::new(owner, &knob.name))
}

/// Validates a driver and attaches it to a constraint attribute of `owner`.
pub fn bind_driver<A: Armature + ?Sized>(
    session: &mut PoseSession<'_, A>,
    owner: &str,
    target: &DriverTarget,
    driver: &Driver,
) -> RigResult<()> {
    driver.validate()?;
    session.add_driver(owner, target, driver)
}

/// Declares the knob set of a rig.
pub fn declare_knobs<A: Armature + ?Sized>(
    session: &mut PoseSession<'_, A>,
    prop_bone: &str,
    spring_targets: &DerivedChain,
    params: &SpringChainParams,
) -> RigResult<KnobSet> {
    let follow_spring = KnobSpec::follow_spring();
    declare_knob(session, prop_bone, &follow_spring)?;

    let mut globals = Vec::new();
    let mut factors = Vec::new();
    if params.unify_spring_props {
        for knob in params.global_knobs() {
            declare_knob(session, prop_bone, &knob)?;
            globals.push(knob);
        }
        for bone in spring_targets.iter_names() {
            let mut knobs = Vec::new();
            for property in SpringProperty::tweakable() {
                if let Some(name) = property.factor_knob() {
                    let knob = KnobSpec::factor(name);
                    declare_knob(session, bone, &knob)?;
                    knobs.push(knob);
                }
            }
            factors.push(FactorKnobs {
                bone: bone.to_string(),
                knobs,
            });
        }
    }

    let set = KnobSet {
        prop_bone: prop_bone.to_string(),
        follow_spring,
        globals,
        factors,
    };
    debug!(
        prop_bone,
        unified = set.is_unified(),
        count = set.count(),
        "knobs declared"
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armature::BoneGeometry;
    use crate::chain::DerivedBone;
    use crate::memory::MemoryArmature;
    use crate::session::EditSession;
    use glam::DVec3;
    use springchain_spec::{BoneRole, DerivedName};

    fn armature() -> MemoryArmature {
        let mut armature = MemoryArmature::new("rig");
        for name in ["ORG-a", "MCH-a_target", "MCH-b_target"] {
            armature
                .add_bone(name, BoneGeometry::new(DVec3::ZERO, DVec3::Y, 0.0), None, false)
                .unwrap();
        }
        armature
    }

    fn targets() -> DerivedChain {
        DerivedChain {
            role: BoneRole::SpringTarget,
            bones: ["a", "b"]
                .iter()
                .map(|base| {
                    let id = DerivedName::new(BoneRole::SpringTarget, *base);
                    DerivedBone {
                        name: id.to_host_name(),
                        id,
                    }
                })
                .collect(),
        }
    }

    #[test]
    fn test_declare_knobs_unified() {
        let mut armature = armature();
        let mut pose = EditSession::begin(&mut armature).unwrap().commit().unwrap();
        let set = declare_knobs(&mut pose, "ORG-a", &targets(), &SpringChainParams::new()).unwrap();

        assert!(set.is_unified());
        assert_eq!(set.globals.len(), 9);
        assert_eq!(set.factors.len(), 2);
        assert_eq!(set.count(), 1 + 9 + 6);
        assert_eq!(pose.stats().properties, 16);

        assert_eq!(
            set.global_path(SpringProperty::FastFactor),
            Some(PropertyPath::new("ORG-a", "spring_fast_factor"))
        );
        assert_eq!(
            set.factor_path("MCH-b_target", SpringProperty::Gravity),
            Some(PropertyPath::new("MCH-b_target", "gravity_factor"))
        );
        assert_eq!(set.factor_path("MCH-b_target", SpringProperty::StiffnessX), None);

        let host = pose.armature();
        let knob = &host.bone("MCH-a_target").unwrap().properties["damping_factor"];
        assert_eq!(knob.value, 1.0);
        assert_eq!((knob.spec.min, knob.spec.max), (0.0, 100.0));
        assert_eq!((knob.spec.soft_min, knob.spec.soft_max), (0.0, 100.0));
    }

    #[test]
    fn test_declare_knobs_individual() {
        let mut armature = armature();
        let mut pose = EditSession::begin(&mut armature).unwrap().commit().unwrap();
        let params = SpringChainParams::new().with_unify_spring_props(false);
        let set = declare_knobs(&mut pose, "ORG-a", &targets(), &params).unwrap();

        assert!(!set.is_unified());
        assert_eq!(set.count(), 1);
        assert_eq!(set.global_path(SpringProperty::Speed), None);
        assert_eq!(set.follow_spring_path().data_path(), "pose.bones[\"ORG-a\"][\"follow_spring\"]");
        assert!(pose.armature().bone("MCH-a_target").unwrap().properties.is_empty());
    }

    #[test]
    fn test_declare_knob_rejects_invalid() {
        let mut armature = armature();
        let mut pose = EditSession::begin(&mut armature).unwrap().commit().unwrap();
        let err = declare_knob(&mut pose, "ORG-a", &KnobSpec::new("bad", 5.0, 0.0, 1.0)).unwrap_err();
        assert!(err.is_configuration_error());
        assert_eq!(pose.stats().properties, 0);
    }
}
