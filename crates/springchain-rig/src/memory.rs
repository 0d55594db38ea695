//! In-memory reference armature.
//!
//! [`MemoryArmature`] implements every [`Armature`] capability without a DCC
//! host. It enforces editing modes like Blender does, renames duplicates on
//! collision (`name.001`, `name.002`, ...), checks that constraint subtargets,
//! driven constraints and driver variables resolve, and can evaluate the
//! drivers it stores.

use std::collections::{BTreeMap, HashMap};

use glam::DVec3;
use serde::Serialize;
use springchain_spec::{
    BoneCollection, BoneConstraint, ConstraintKind, Driver, DriverTarget, KnobSpec, SpringProperty,
    TransformLocks, WidgetStyle,
};

use crate::armature::{Armature, BoneGeometry, ChildLink, Mode, ParentMode};
use crate::error::{RigError, RigResult};

/// A declared custom property and its current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredProperty {
    /// Declaration, including ranges.
    pub spec: KnobSpec,
    /// Current value.
    pub value: f64,
}

/// A driver attached to a constraint attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverBinding {
    /// Driven attribute.
    pub target: DriverTarget,
    /// Driver expression and variables.
    pub driver: Driver,
}

/// A bone of the in-memory armature, with its pose-level data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryBone {
    /// Bone name.
    pub name: String,
    /// Rest geometry.
    pub geometry: BoneGeometry,
    /// Parent bone name.
    pub parent: Option<String>,
    /// Whether the head is connected to the parent's tail.
    pub connected: bool,
    /// Constraint stack, in evaluation order.
    pub constraints: Vec<BoneConstraint>,
    /// Drivers on constraint attributes.
    pub drivers: Vec<DriverBinding>,
    /// Custom properties.
    pub properties: BTreeMap<String, StoredProperty>,
    /// Custom shape.
    pub widget: Option<WidgetStyle>,
    /// Transform locks.
    pub locks: TransformLocks,
    /// Names of the collections the bone belongs to.
    pub collections: Vec<String>,
}

impl MemoryBone {
    fn new(name: &str, geometry: BoneGeometry) -> Self {
        Self {
            name: name.to_string(),
            geometry,
            parent: None,
            connected: false,
            constraints: Vec::new(),
            drivers: Vec::new(),
            properties: BTreeMap::new(),
            widget: None,
            locks: TransformLocks::none(),
            collections: Vec::new(),
        }
    }

    /// Returns a constraint by name.
    pub fn constraint(&self, name: &str) -> Option<&BoneConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Returns the driver bound to a target.
    pub fn driver(&self, target: &DriverTarget) -> Option<&Driver> {
        self.drivers
            .iter()
            .find(|b| &b.target == target)
            .map(|b| &b.driver)
    }
}

/// An armature held entirely in memory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryArmature {
    name: String,
    mode: Mode,
    bones: Vec<MemoryBone>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    collections: Vec<BoneCollection>,
    mutations: usize,
}

impl MemoryArmature {
    /// Creates an empty armature in object mode.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds a bone during setup. Does not count as a mutation.
    pub fn add_bone(
        &mut self,
        name: &str,
        geometry: BoneGeometry,
        parent: Option<&str>,
        connected: bool,
    ) -> RigResult<()> {
        if self.index.contains_key(name) {
            return Err(RigError::host(format!("bone '{name}' already exists")));
        }
        if let Some(parent) = parent {
            self.bone_index(parent)?;
        }
        let mut bone = MemoryBone::new(name, geometry);
        bone.parent = parent.map(str::to_string);
        bone.connected = parent.is_some() && connected;
        self.index.insert(name.to_string(), self.bones.len());
        self.bones.push(bone);
        Ok(())
    }

    /// Adds a connected chain of bones laid out along `direction`.
    ///
    /// Each bone has length `|direction|` and starts where the previous one
    /// ends. The first bone starts at `origin` under `parent`, unconnected.
    pub fn add_chain(
        &mut self,
        names: &[&str],
        parent: Option<&str>,
        origin: DVec3,
        direction: DVec3,
        roll: f64,
    ) -> RigResult<()> {
        let mut head = origin;
        let mut previous = parent.map(str::to_string);
        for (i, name) in names.iter().enumerate() {
            let geometry = BoneGeometry::new(head, head + direction, roll);
            self.add_bone(name, geometry, previous.as_deref(), i > 0)?;
            head += direction;
            previous = Some(name.to_string());
        }
        Ok(())
    }

    /// Returns a bone by name.
    pub fn bone(&self, name: &str) -> Option<&MemoryBone> {
        self.index.get(name).map(|&i| &self.bones[i])
    }

    /// All bones, in creation order.
    pub fn bones(&self) -> &[MemoryBone] {
        &self.bones
    }

    /// Collections created so far.
    pub fn collections(&self) -> &[BoneCollection] {
        &self.collections
    }

    /// Number of mutations applied through the [`Armature`] trait.
    pub fn mutation_count(&self) -> usize {
        self.mutations
    }

    /// Current value of a custom property.
    pub fn property_value(&self, bone: &str, property: &str) -> Option<f64> {
        self.bone(bone)?.properties.get(property).map(|p| p.value)
    }

    /// Sets a custom property, clamped to its declared range.
    pub fn set_property_value(&mut self, bone: &str, property: &str, value: f64) -> RigResult<()> {
        let i = self.bone_index(bone)?;
        let stored = self.bones[i]
            .properties
            .get_mut(property)
            .ok_or_else(|| RigError::PropertyNotFound {
                bone: bone.to_string(),
                property: property.to_string(),
            })?;
        stored.value = stored.spec.clamp(value);
        Ok(())
    }

    /// Evaluates the driver bound to `target` on `bone`.
    pub fn evaluate_driver(&self, bone: &str, target: &DriverTarget) -> Option<f64> {
        let driver = self.bone(bone)?.driver(target)?;
        driver.expr.evaluate(|name| {
            let variable = driver.variable(name)?;
            self.property_value(&variable.source.bone, &variable.source.property)
        })
    }

    /// Current value of a spring constraint attribute.
    ///
    /// A driven attribute evaluates its driver; otherwise the constraint's
    /// stored setting, or the property default, is returned.
    pub fn spring_value(&self, bone: &str, property: SpringProperty) -> Option<f64> {
        let owner = self.bone(bone)?;
        let constraint = owner.constraints.iter().find(|c| c.is_spring())?;
        let target = DriverTarget::SpringParam {
            constraint: constraint.name.clone(),
            property,
        };
        if owner.driver(&target).is_some() {
            return self.evaluate_driver(bone, &target);
        }
        match &constraint.kind {
            ConstraintKind::Spring { settings, .. } => Some(
                settings
                    .get(&property)
                    .copied()
                    .unwrap_or_else(|| property.default_value()),
            ),
            _ => None,
        }
    }

    /// Effective influence of a constraint: its driver value, or 1.0 undriven.
    pub fn influence(&self, bone: &str, constraint: &str) -> Option<f64> {
        let owner = self.bone(bone)?;
        owner.constraint(constraint)?;
        let target = DriverTarget::Influence {
            constraint: constraint.to_string(),
        };
        match owner.driver(&target) {
            Some(_) => self.evaluate_driver(bone, &target),
            None => Some(1.0),
        }
    }

    fn bone_index(&self, name: &str) -> RigResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| RigError::bone_not_found(name))
    }

    fn require_mode(&self, expected: Mode, operation: &'static str) -> RigResult<()> {
        if self.mode != expected {
            return Err(RigError::WrongMode {
                operation,
                expected,
                actual: self.mode,
            });
        }
        Ok(())
    }

    fn unique_name(&self, requested: &str) -> String {
        if !self.index.contains_key(requested) {
            return requested.to_string();
        }
        (1..)
            .map(|n| format!("{requested}.{n:03}"))
            .find(|candidate| !self.index.contains_key(candidate))
            .unwrap_or_else(|| requested.to_string())
    }

    fn is_ancestor(&self, ancestor: &str, bone: &str) -> bool {
        let mut current = self.bone(bone).and_then(|b| b.parent.clone());
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            current = self.bone(&name).and_then(|b| b.parent.clone());
        }
        false
    }
}

impl Armature for MemoryArmature {
    fn name(&self) -> &str {
        &self.name
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_mode(&mut self, mode: Mode) -> RigResult<()> {
        self.mode = mode;
        Ok(())
    }

    fn bone_count(&self) -> usize {
        self.bones.len()
    }

    fn has_bone(&self, bone: &str) -> bool {
        self.index.contains_key(bone)
    }

    fn parent(&self, bone: &str) -> RigResult<Option<String>> {
        Ok(self.bones[self.bone_index(bone)?].parent.clone())
    }

    fn children(&self, bone: &str) -> RigResult<Vec<ChildLink>> {
        self.bone_index(bone)?;
        Ok(self
            .bones
            .iter()
            .filter(|b| b.parent.as_deref() == Some(bone))
            .map(|b| ChildLink {
                name: b.name.clone(),
                connected: b.connected,
            })
            .collect())
    }

    fn geometry(&self, bone: &str) -> RigResult<BoneGeometry> {
        self.require_mode(Mode::Edit, "read bone geometry")?;
        Ok(self.bones[self.bone_index(bone)?].geometry)
    }

    fn set_roll(&mut self, bone: &str, roll: f64) -> RigResult<()> {
        self.require_mode(Mode::Edit, "set bone roll")?;
        let i = self.bone_index(bone)?;
        self.bones[i].geometry.roll = roll;
        self.mutations += 1;
        Ok(())
    }

    fn duplicate_bone(&mut self, source: &str, name: &str) -> RigResult<String> {
        self.require_mode(Mode::Edit, "duplicate bone")?;
        let original = &self.bones[self.bone_index(source)?];
        let mut copy = MemoryBone::new(name, original.geometry);
        copy.parent = original.parent.clone();
        copy.connected = original.connected;
        copy.name = self.unique_name(name);

        let registered = copy.name.clone();
        self.index.insert(registered.clone(), self.bones.len());
        self.bones.push(copy);
        self.mutations += 1;
        Ok(registered)
    }

    fn set_parent(&mut self, child: &str, parent: Option<&str>, mode: ParentMode) -> RigResult<()> {
        self.require_mode(Mode::Edit, "set bone parent")?;
        let i = self.bone_index(child)?;
        let parent_tail = match parent {
            Some(p) => {
                let tail = self.bones[self.bone_index(p)?].geometry.tail;
                if p == child || self.is_ancestor(child, p) {
                    return Err(RigError::ParentCycle {
                        child: child.to_string(),
                        parent: p.to_string(),
                    });
                }
                Some(tail)
            }
            None => None,
        };

        let bone = &mut self.bones[i];
        bone.parent = parent.map(str::to_string);
        bone.connected = parent.is_some() && mode == ParentMode::Connected;
        if let (Some(tail), ParentMode::Connected) = (parent_tail, mode) {
            bone.geometry.head = tail;
        }
        self.mutations += 1;
        Ok(())
    }

    fn add_constraint(&mut self, bone: &str, constraint: &BoneConstraint) -> RigResult<()> {
        self.require_mode(Mode::Pose, "add constraint")?;
        let i = self.bone_index(bone)?;
        self.bone_index(constraint.subtarget())?;
        self.bones[i].constraints.push(constraint.clone());
        self.mutations += 1;
        Ok(())
    }

    fn add_driver(&mut self, bone: &str, target: &DriverTarget, driver: &Driver) -> RigResult<()> {
        self.require_mode(Mode::Pose, "add driver")?;
        let i = self.bone_index(bone)?;
        let owner = &self.bones[i];
        if owner.constraint(target.constraint()).is_none() {
            return Err(RigError::ConstraintNotFound {
                bone: bone.to_string(),
                constraint: target.constraint().to_string(),
            });
        }
        driver.validate()?;
        for variable in &driver.variables {
            if self
                .property_value(&variable.source.bone, &variable.source.property)
                .is_none()
            {
                return Err(RigError::PropertyNotFound {
                    bone: variable.source.bone.clone(),
                    property: variable.source.property.clone(),
                });
            }
        }

        let drivers = &mut self.bones[i].drivers;
        drivers.retain(|b| &b.target != target);
        drivers.push(DriverBinding {
            target: target.clone(),
            driver: driver.clone(),
        });
        self.mutations += 1;
        Ok(())
    }

    fn declare_property(&mut self, bone: &str, knob: &KnobSpec) -> RigResult<()> {
        self.require_mode(Mode::Pose, "declare property")?;
        let i = self.bone_index(bone)?;
        self.bones[i].properties.insert(
            knob.name.clone(),
            StoredProperty {
                spec: knob.clone(),
                value: knob.default,
            },
        );
        self.mutations += 1;
        Ok(())
    }

    fn set_widget(&mut self, bone: &str, style: WidgetStyle) -> RigResult<()> {
        self.require_mode(Mode::Pose, "set widget")?;
        let i = self.bone_index(bone)?;
        self.bones[i].widget = Some(style);
        self.mutations += 1;
        Ok(())
    }

    fn set_locks(&mut self, bone: &str, locks: TransformLocks) -> RigResult<()> {
        self.require_mode(Mode::Pose, "set transform locks")?;
        let i = self.bone_index(bone)?;
        self.bones[i].locks = locks;
        self.mutations += 1;
        Ok(())
    }

    fn assign_collection(&mut self, bone: &str, collection: &BoneCollection) -> RigResult<()> {
        self.require_mode(Mode::Pose, "assign bone collection")?;
        collection.validate()?;
        let i = self.bone_index(bone)?;
        if !self.collections.iter().any(|c| c.name == collection.name) {
            self.collections.push(collection.clone());
        }
        let names = &mut self.bones[i].collections;
        if !names.contains(&collection.name) {
            names.push(collection.name.clone());
        }
        self.mutations += 1;
        Ok(())
    }
}
