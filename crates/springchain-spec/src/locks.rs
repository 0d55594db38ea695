//! Pose bone transform channel locks.

use serde::{Deserialize, Serialize};

/// Per-channel transform locks for a pose bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransformLocks {
    /// Location X/Y/Z.
    pub location: [bool; 3],
    /// Rotation X/Y/Z.
    pub rotation: [bool; 3],
    /// Rotation W (quaternion and axis-angle modes).
    pub rotation_w: bool,
    /// Lock rotation as four separate components.
    pub rotations_4d: bool,
    /// Scale X/Y/Z.
    pub scale: [bool; 3],
}

impl TransformLocks {
    /// No channel locked.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every channel locked.
    pub fn all() -> Self {
        Self {
            location: [true; 3],
            rotation: [true; 3],
            rotation_w: true,
            rotations_4d: true,
            scale: [true; 3],
        }
    }

    /// Returns true when no channel can be changed by the animator.
    pub fn is_fully_locked(&self) -> bool {
        *self == Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locks() {
        assert!(TransformLocks::all().is_fully_locked());
        assert!(!TransformLocks::none().is_fully_locked());

        let mut partial = TransformLocks::all();
        partial.scale[1] = false;
        assert!(!partial.is_fully_locked());
    }
}
