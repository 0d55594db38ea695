//! Spring chain rig generation.

use springchain_spec::{SpringChainParams, MIN_CHAIN_LENGTH};
use tracing::{debug, info};

use crate::armature::Armature;
use crate::chain::duplicate_all;
use crate::display::apply_display;
use crate::error::{RigError, RigResult};
use crate::metrics::{RigMetrics, RigReport};
use crate::properties::declare_knobs;
use crate::session::EditSession;
use crate::topology::{align_chain_rolls, build_topology};
use crate::ui_script::emit_ui_script;
use crate::wiring::wire_constraints;

/// A validated spring chain rig, ready to generate.
///
/// Construction only reads the host. Everything that can fail without
/// touching the skeleton (parameters, root bone, chain length) fails here.
#[derive(Debug, Clone)]
pub struct SpringChainRig {
    source: Vec<String>,
    original_parent: Option<String>,
    params: SpringChainParams,
}

impl SpringChainRig {
    /// Collects the connected chain starting at `root`.
    pub fn new<A: Armature + ?Sized>(
        armature: &A,
        root: &str,
        params: SpringChainParams,
    ) -> RigResult<Self> {
        params.validate()?;
        if !armature.has_bone(root) {
            return Err(RigError::bone_not_found(root));
        }

        let mut source = vec![root.to_string()];
        source.extend(armature.connected_children(root)?);
        if source.len() < MIN_CHAIN_LENGTH {
            return Err(RigError::ChainTooShort {
                rig: root.to_string(),
                found: source.len(),
                required: MIN_CHAIN_LENGTH,
            });
        }

        let original_parent = armature.parent(root)?;
        debug!(root, chain_length = source.len(), ?original_parent, "source chain collected");
        Ok(Self {
            source,
            original_parent,
            params,
        })
    }

    /// Source bones, root first.
    pub fn source_bones(&self) -> &[String] {
        &self.source
    }

    /// Parent of the root bone before generation.
    pub fn original_parent(&self) -> Option<&str> {
        self.original_parent.as_deref()
    }

    pub fn params(&self) -> &SpringChainParams {
        &self.params
    }

    /// Bone carrying `follow_spring` and the shared spring knobs.
    pub fn prop_bone(&self) -> &str {
        &self.source[0]
    }

    /// Builds the rig and returns the UI scripts with generation metrics.
    pub fn generate_report<A: Armature + ?Sized>(&self, armature: &mut A) -> RigResult<RigReport> {
        let params = &self.params;
        info!(
            armature = armature.name(),
            root = self.prop_bone(),
            chain_length = self.source.len(),
            unified = params.unify_spring_props,
            "generating spring chain"
        );

        let mut edit = EditSession::begin(armature)?;
        let chains = duplicate_all(&mut edit, &self.source)?;
        build_topology(&mut edit, &chains, self.original_parent())?;
        align_chain_rolls(&mut edit, &self.source, &chains)?;

        let mut pose = edit.commit()?;
        apply_display(&mut pose, &chains, params)?;
        let knobs = declare_knobs(&mut pose, self.prop_bone(), &chains.spring_target, params)?;
        let lookup = wire_constraints(&mut pose, &chains, &knobs, params)?;
        let stats = pose.finish()?;

        let script = emit_ui_script(
            self.prop_bone(),
            &lookup,
            &chains.control.names(),
            &chains.preview.names(),
            &chains.spring_target,
            params.unify_spring_props,
        );
        debug!(bytes = script.len(), "ui script emitted");

        let metrics = RigMetrics::from_stats(self.source.len(), params.unify_spring_props, stats);
        info!(
            bones = metrics.bones_created,
            constraints = metrics.constraints,
            drivers = metrics.drivers,
            properties = metrics.properties,
            "spring chain generated"
        );
        Ok(RigReport::new(script, metrics))
    }

    /// Builds the rig and returns the UI scripts.
    pub fn generate<A: Armature + ?Sized>(&self, armature: &mut A) -> RigResult<Vec<String>> {
        Ok(self.generate_report(armature)?.scripts)
    }
}

/// Generates a spring chain rig from `root` and returns its UI scripts.
pub fn generate<A: Armature + ?Sized>(
    armature: &mut A,
    root: &str,
    params: &SpringChainParams,
) -> RigResult<Vec<String>> {
    SpringChainRig::new(&*armature, root, params.clone())?.generate(armature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryArmature;
    use glam::DVec3;
    use springchain_spec::{CodedError, ParamsError, SpringProperty};

    fn armature(length: usize) -> MemoryArmature {
        let mut armature = MemoryArmature::new("Armature");
        let names: Vec<String> = (0..length).map(|i| format!("ORG-tail.{i:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        armature
            .add_chain(&refs, None, DVec3::ZERO, DVec3::new(0.0, 0.5, -0.5), 0.0)
            .unwrap();
        armature
    }

    #[test]
    fn test_new_collects_chain() {
        let armature = armature(4);
        let rig = SpringChainRig::new(&armature, "ORG-tail.00", SpringChainParams::new()).unwrap();
        assert_eq!(rig.source_bones().len(), 4);
        assert_eq!(rig.prop_bone(), "ORG-tail.00");
        assert_eq!(rig.original_parent(), None);
        assert!(rig.params().unify_spring_props);

        let rig = SpringChainRig::new(&armature, "ORG-tail.01", SpringChainParams::new()).unwrap();
        assert_eq!(rig.source_bones()[0], "ORG-tail.01");
        assert_eq!(rig.original_parent(), Some("ORG-tail.00"));
    }

    #[test]
    fn test_short_chain_rejected() {
        let armature = armature(2);
        let err = SpringChainRig::new(&armature, "ORG-tail.00", SpringChainParams::new()).unwrap_err();
        assert_eq!(
            err,
            RigError::ChainTooShort {
                rig: "ORG-tail.00".to_string(),
                found: 2,
                required: 3,
            }
        );
        assert_eq!(err.code(), "RIG_001");
        assert!(err.to_string().contains("ORG-tail.00"));
    }

    #[test]
    fn test_missing_root() {
        let armature = armature(3);
        let err = SpringChainRig::new(&armature, "nope", SpringChainParams::new()).unwrap_err();
        assert_eq!(err, RigError::bone_not_found("nope"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let armature = armature(3);
        let params = SpringChainParams::new().with_spring_default(SpringProperty::Damping, 4.0);
        let err = SpringChainRig::new(&armature, "ORG-tail.00", params).unwrap_err();
        assert!(matches!(
            err,
            RigError::Params(ParamsError::DefaultOutOfRange { .. })
        ));
    }

    #[test]
    fn test_generate_report_counts() {
        let mut armature = armature(3);
        let rig = SpringChainRig::new(&armature, "ORG-tail.00", SpringChainParams::new()).unwrap();
        let report = rig.generate_report(&mut armature).unwrap();
        let m = report.metrics;

        assert_eq!(report.scripts.len(), 1);
        assert_eq!(m.bones_created, 15);
        assert_eq!(m.parents_set, 15);
        assert_eq!(m.rolls_set, 30);
        // spring + copy rotation + two deform + preview, per link
        assert_eq!(m.constraints, 15);
        // follow_spring on each deform + nine spring params per target
        assert_eq!(m.drivers, 3 + 27);
        assert_eq!(m.properties, 1 + 9 + 9);
        assert_eq!(m.total_mutations(), armature.mutation_count());
        assert_eq!(armature.bone_count(), 18);
    }
}
