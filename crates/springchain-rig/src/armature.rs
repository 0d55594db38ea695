//! Host armature capabilities.
//!
//! The generator never owns the skeleton. Everything it does goes through the
//! [`Armature`] trait: structural edits (duplication, parenting, roll) in
//! [`Mode::Edit`], runtime configuration (constraints, drivers, properties,
//! display) in [`Mode::Pose`]. Hosts reject operations issued in the wrong
//! mode with [`RigError::WrongMode`](crate::RigError::WrongMode).

use glam::DVec3;
use serde::{Deserialize, Serialize};
use springchain_spec::{
    BoneCollection, BoneConstraint, Driver, DriverTarget, KnobSpec, TransformLocks, WidgetStyle,
};

use crate::error::RigResult;
use crate::roll::BoneFrame;

/// Host editing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// No transaction open.
    #[default]
    Object,
    /// Structural edits: bones, parents, rolls.
    Edit,
    /// Runtime configuration: constraints, drivers, properties.
    Pose,
}

impl Mode {
    /// Returns the Blender enum name for this mode.
    pub fn blender_name(&self) -> &'static str {
        match self {
            Mode::Object => "OBJECT",
            Mode::Edit => "EDIT",
            Mode::Pose => "POSE",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.blender_name())
    }
}

/// How a child is attached by [`Armature::set_parent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentMode {
    /// The child's head snaps to the parent's tail.
    Connected,
    /// The child keeps its own transform.
    KeepOffset,
}

/// Rest geometry of a bone in armature space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneGeometry {
    /// Head position.
    pub head: DVec3,
    /// Tail position.
    pub tail: DVec3,
    /// Twist around the head-to-tail axis, in radians.
    pub roll: f64,
}

impl BoneGeometry {
    /// Creates bone geometry.
    pub fn new(head: DVec3, tail: DVec3, roll: f64) -> Self {
        Self { head, tail, roll }
    }

    /// Head to tail vector.
    pub fn vector(&self) -> DVec3 {
        self.tail - self.head
    }

    /// Bone length.
    pub fn length(&self) -> f64 {
        self.vector().length()
    }

    /// Orthonormal axes of the bone.
    pub fn frame(&self) -> BoneFrame {
        BoneFrame::from_vector_roll(self.vector(), self.roll)
    }

    /// Returns the same geometry with another roll.
    pub fn with_roll(mut self, roll: f64) -> Self {
        self.roll = roll;
        self
    }
}

/// A direct child of a bone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildLink {
    /// Child bone name.
    pub name: String,
    /// Whether the child's head is connected to the parent's tail.
    pub connected: bool,
}

/// Capabilities the generator needs from the host skeleton.
pub trait Armature {
    /// Armature object name, used in error messages.
    fn name(&self) -> &str;

    /// Current editing mode.
    fn mode(&self) -> Mode;

    /// Switches editing mode, committing the previous one.
    fn set_mode(&mut self, mode: Mode) -> RigResult<()>;

    /// Number of bones in the armature.
    fn bone_count(&self) -> usize;

    /// Returns true if a bone with this name exists.
    fn has_bone(&self, bone: &str) -> bool;

    /// Returns the parent of a bone.
    fn parent(&self, bone: &str) -> RigResult<Option<String>>;

    /// Returns the direct children of a bone, in creation order.
    fn children(&self, bone: &str) -> RigResult<Vec<ChildLink>>;

    /// Walks the connected chain below `bone`.
    ///
    /// Follows the single connected child of each bone and stops at the first
    /// bone with zero or several connected children. `bone` itself is not
    /// included.
    fn connected_children(&self, bone: &str) -> RigResult<Vec<String>> {
        let mut names = Vec::new();
        let mut current = bone.to_string();
        loop {
            let mut connected = self
                .children(&current)?
                .into_iter()
                .filter(|child| child.connected);
            match (connected.next(), connected.next()) {
                (Some(child), None) => {
                    // Guard against malformed hosts reporting cycles.
                    if child.name == bone || names.contains(&child.name) {
                        break;
                    }
                    current = child.name.clone();
                    names.push(child.name);
                }
                _ => break,
            }
        }
        Ok(names)
    }

    // -- edit mode ---------------------------------------------------------

    /// Reads the rest geometry of a bone.
    fn geometry(&self, bone: &str) -> RigResult<BoneGeometry>;

    /// Sets the roll of a bone.
    fn set_roll(&mut self, bone: &str, roll: f64) -> RigResult<()>;

    /// Copies `source` (geometry, parent, connection) under a new name.
    ///
    /// Returns the name actually registered; hosts may rename on collision.
    fn duplicate_bone(&mut self, source: &str, name: &str) -> RigResult<String>;

    /// Sets or clears the parent of a bone.
    fn set_parent(&mut self, child: &str, parent: Option<&str>, mode: ParentMode) -> RigResult<()>;

    // -- pose mode ---------------------------------------------------------

    /// Appends a constraint to a pose bone's stack.
    fn add_constraint(&mut self, bone: &str, constraint: &BoneConstraint) -> RigResult<()>;

    /// Attaches a driver to an attribute of a constraint on a pose bone.
    fn add_driver(&mut self, bone: &str, target: &DriverTarget, driver: &Driver)
        -> RigResult<()>;

    /// Declares a custom numeric property on a pose bone and sets its value.
    fn declare_property(&mut self, bone: &str, knob: &KnobSpec) -> RigResult<()>;

    /// Assigns a custom shape to a pose bone.
    fn set_widget(&mut self, bone: &str, style: WidgetStyle) -> RigResult<()>;

    /// Sets the transform channel locks of a pose bone.
    fn set_locks(&mut self, bone: &str, locks: TransformLocks) -> RigResult<()>;

    /// Adds a bone to a collection, creating the collection if needed.
    fn assign_collection(&mut self, bone: &str, collection: &BoneCollection) -> RigResult<()>;
}
