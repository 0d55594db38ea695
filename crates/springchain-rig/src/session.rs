//! Two-phase edit protocol over a host armature.
//!
//! Generation is a batch of structural edits followed by a batch of runtime
//! configuration. [`EditSession`] only exposes structural operations;
//! [`EditSession::commit`] consumes it and yields a [`PoseSession`], which only
//! exposes constraint, driver, property and display operations. Each operation
//! also checks the host's reported mode before touching it.

use serde::{Deserialize, Serialize};
use springchain_spec::{
    BoneCollection, BoneConstraint, Driver, DriverTarget, KnobSpec, TransformLocks, WidgetStyle,
};
use tracing::debug;

use crate::armature::{Armature, BoneGeometry, Mode, ParentMode};
use crate::error::{RigError, RigResult};

/// Counters for the mutations issued through a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Bones created by duplication.
    pub bones_created: usize,
    /// Parent assignments.
    pub parents_set: usize,
    /// Roll assignments.
    pub rolls_set: usize,
    /// Constraints added.
    pub constraints: usize,
    /// Drivers attached.
    pub drivers: usize,
    /// Custom properties declared.
    pub properties: usize,
    /// Widgets, locks and collection assignments.
    pub display_changes: usize,
}

fn expect_mode<A: Armature + ?Sized>(
    armature: &A,
    expected: Mode,
    operation: &'static str,
) -> RigResult<()> {
    let actual = armature.mode();
    if actual != expected {
        return Err(RigError::WrongMode {
            operation,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Structural edit phase.
pub struct EditSession<'a, A: Armature + ?Sized> {
    armature: &'a mut A,
    stats: SessionStats,
}

impl<'a, A: Armature + ?Sized> EditSession<'a, A> {
    /// Switches the host into edit mode.
    pub fn begin(armature: &'a mut A) -> RigResult<Self> {
        armature.set_mode(Mode::Edit)?;
        debug!(armature = armature.name(), "edit phase started");
        Ok(Self {
            armature,
            stats: SessionStats::default(),
        })
    }

    /// Read access to the host.
    pub fn armature(&self) -> &A {
        &*self.armature
    }

    /// Mutations issued so far.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Reads the rest geometry of a bone.
    pub fn geometry(&self, bone: &str) -> RigResult<BoneGeometry> {
        expect_mode(&*self.armature, Mode::Edit, "read bone geometry")?;
        self.armature.geometry(bone)
    }

    /// Sets the roll of a bone.
    pub fn set_roll(&mut self, bone: &str, roll: f64) -> RigResult<()> {
        expect_mode(&*self.armature, Mode::Edit, "set bone roll")?;
        self.armature.set_roll(bone, roll)?;
        self.stats.rolls_set += 1;
        Ok(())
    }

    /// Duplicates a bone and returns the registered name.
    pub fn duplicate_bone(&mut self, source: &str, name: &str) -> RigResult<String> {
        expect_mode(&*self.armature, Mode::Edit, "duplicate bone")?;
        let registered = self.armature.duplicate_bone(source, name)?;
        self.stats.bones_created += 1;
        Ok(registered)
    }

    /// Sets or clears the parent of a bone.
    pub fn set_parent(
        &mut self,
        child: &str,
        parent: Option<&str>,
        mode: ParentMode,
    ) -> RigResult<()> {
        expect_mode(&*self.armature, Mode::Edit, "set bone parent")?;
        self.armature.set_parent(child, parent, mode)?;
        self.stats.parents_set += 1;
        Ok(())
    }

    /// Commits structural edits and enters the pose phase.
    pub fn commit(self) -> RigResult<PoseSession<'a, A>> {
        let Self { armature, stats } = self;
        armature.set_mode(Mode::Pose)?;
        debug!(
            bones_created = stats.bones_created,
            parents_set = stats.parents_set,
            rolls_set = stats.rolls_set,
            "edit phase committed"
        );
        Ok(PoseSession { armature, stats })
    }
}

/// Runtime configuration phase.
pub struct PoseSession<'a, A: Armature + ?Sized> {
    armature: &'a mut A,
    stats: SessionStats,
}

impl<'a, A: Armature + ?Sized> PoseSession<'a, A> {
    /// Read access to the host.
    pub fn armature(&self) -> &A {
        &*self.armature
    }

    /// Mutations issued so far, including the edit phase.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Appends a constraint to a pose bone.
    pub fn add_constraint(&mut self, bone: &str, constraint: &BoneConstraint) -> RigResult<()> {
        expect_mode(&*self.armature, Mode::Pose, "add constraint")?;
        self.armature.add_constraint(bone, constraint)?;
        self.stats.constraints += 1;
        Ok(())
    }

    /// Attaches a driver to a constraint attribute.
    pub fn add_driver(
        &mut self,
        bone: &str,
        target: &DriverTarget,
        driver: &Driver,
    ) -> RigResult<()> {
        expect_mode(&*self.armature, Mode::Pose, "add driver")?;
        self.armature.add_driver(bone, target, driver)?;
        self.stats.drivers += 1;
        Ok(())
    }

    /// Declares a custom property.
    pub fn declare_property(&mut self, bone: &str, knob: &KnobSpec) -> RigResult<()> {
        expect_mode(&*self.armature, Mode::Pose, "declare property")?;
        self.armature.declare_property(bone, knob)?;
        self.stats.properties += 1;
        Ok(())
    }

    /// Assigns a custom shape.
    pub fn set_widget(&mut self, bone: &str, style: WidgetStyle) -> RigResult<()> {
        expect_mode(&*self.armature, Mode::Pose, "set widget")?;
        self.armature.set_widget(bone, style)?;
        self.stats.display_changes += 1;
        Ok(())
    }

    /// Sets transform locks.
    pub fn set_locks(&mut self, bone: &str, locks: TransformLocks) -> RigResult<()> {
        expect_mode(&*self.armature, Mode::Pose, "set transform locks")?;
        self.armature.set_locks(bone, locks)?;
        self.stats.display_changes += 1;
        Ok(())
    }

    /// Adds a bone to a collection.
    pub fn assign_collection(&mut self, bone: &str, collection: &BoneCollection) -> RigResult<()> {
        expect_mode(&*self.armature, Mode::Pose, "assign bone collection")?;
        self.armature.assign_collection(bone, collection)?;
        self.stats.display_changes += 1;
        Ok(())
    }

    /// Leaves pose mode and returns the final counters.
    pub fn finish(self) -> RigResult<SessionStats> {
        self.armature.set_mode(Mode::Object)?;
        debug!(
            constraints = self.stats.constraints,
            drivers = self.stats.drivers,
            properties = self.stats.properties,
            "pose phase finished"
        );
        Ok(self.stats)
    }
}
