//! Bone roll alignment.
//!
//! A bone's frame is fully determined by its head-to-tail vector and its roll:
//! the Y axis is the bone direction and X/Z come from the shortest rotation
//! taking +Y onto that direction, then twisted by `roll` around it.
//!
//! [`aligned_roll`] finds the roll that makes a bone's X axis agree with a
//! reference bone's X axis once the two bone directions are matched by their
//! shortest-arc rotation. `acos` only gives the magnitude of that roll, so the
//! candidate is applied, checked, and negated if it turned the wrong way.

use std::f64::consts::PI;

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::armature::{Armature, BoneGeometry};
use crate::error::RigResult;
use crate::session::EditSession;

/// Dot product above which a rolled axis counts as matching the reference.
pub const ROLL_CHECK_THRESHOLD: f64 = 0.9999;

/// Cross products shorter than this are treated as parallel directions.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Orthonormal axes of a bone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneFrame {
    /// Side axis.
    pub x_axis: DVec3,
    /// Length axis, head to tail.
    pub y_axis: DVec3,
    /// Up axis.
    pub z_axis: DVec3,
}

impl BoneFrame {
    /// Builds the frame of a bone pointing along `vector` with the given roll.
    pub fn from_vector_roll(vector: DVec3, roll: f64) -> Self {
        let y_axis = vector.try_normalize().unwrap_or(DVec3::Y);
        let base = if y_axis.y < -1.0 + 1e-9 {
            // Pointing straight down: half turn around Z, as Blender does.
            DQuat::from_rotation_z(PI)
        } else {
            DQuat::from_rotation_arc(DVec3::Y, y_axis)
        };
        let rotation = DQuat::from_axis_angle(y_axis, roll) * base;
        Self {
            x_axis: rotation * DVec3::X,
            y_axis,
            z_axis: rotation * DVec3::Z,
        }
    }
}

/// Shortest rotation taking direction `from` onto direction `to`.
///
/// Parallel directions give the identity. Opposite directions have no unique
/// shortest arc; they turn half way around `fallback_axis`, which must be
/// orthogonal to `from`.
pub fn alignment_rotation(from: DVec3, to: DVec3, fallback_axis: DVec3) -> DQuat {
    let axis = from.cross(to);
    if axis.length_squared() < PARALLEL_EPSILON {
        if from.dot(to) >= 0.0 {
            return DQuat::IDENTITY;
        }
        return DQuat::from_axis_angle(fallback_axis.try_normalize().unwrap_or(DVec3::Z), PI);
    }
    DQuat::from_axis_angle(axis.normalize(), from.angle_between(to))
}

/// Computes the roll for `bone` that best matches the orientation of `reference`.
///
/// The current roll of `bone` is ignored, which makes the result idempotent.
pub fn aligned_roll(reference: &BoneGeometry, bone: &BoneGeometry) -> f64 {
    let zeroed = bone.with_roll(0.0).frame();
    let target_x = reference.frame().x_axis;
    let rotation = alignment_rotation(zeroed.y_axis, reference.frame().y_axis, zeroed.z_axis);

    let predicted = rotation * zeroed.x_axis;
    let roll = target_x.dot(predicted).clamp(-1.0, 1.0).acos();

    let rolled = bone.with_roll(roll).frame();
    let check = target_x.dot(rotation * rolled.x_axis);
    if check < ROLL_CHECK_THRESHOLD {
        -roll
    } else {
        roll
    }
}

/// Aligns the roll of `bone` to `reference` in the host and returns the new roll.
pub fn align_roll<A: Armature + ?Sized>(
    session: &mut EditSession<'_, A>,
    reference: &str,
    bone: &str,
) -> RigResult<f64> {
    session.set_roll(bone, 0.0)?;
    let reference_geometry = session.geometry(reference)?;
    let bone_geometry = session.geometry(bone)?;
    let roll = aligned_roll(&reference_geometry, &bone_geometry);
    session.set_roll(bone, roll)?;
    Ok(roll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn bone(tail: [f64; 3], roll: f64) -> BoneGeometry {
        BoneGeometry::new(DVec3::ZERO, DVec3::from_array(tail), roll)
    }

    fn assert_orthonormal(frame: &BoneFrame) {
        assert_abs_diff_eq!(frame.x_axis.length(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(frame.z_axis.length(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(frame.x_axis.dot(frame.y_axis), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(frame.x_axis.dot(frame.z_axis), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(frame.y_axis.dot(frame.z_axis), 0.0, epsilon = 1e-9);
        // Right handed.
        assert_abs_diff_eq!(frame.x_axis.cross(frame.y_axis).dot(frame.z_axis), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_frame_of_upright_bone() {
        let frame = BoneFrame::from_vector_roll(DVec3::Y, 0.0);
        assert_abs_diff_eq!(frame.x_axis.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(frame.z_axis.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_frames_are_orthonormal() {
        for tail in [[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.3, -0.2, 0.9]] {
            for roll in [0.0, 0.7, -2.1, PI] {
                assert_orthonormal(&bone(tail, roll).frame());
            }
        }
    }

    #[test]
    fn test_roll_twists_around_length_axis() {
        let frame = BoneFrame::from_vector_roll(DVec3::Y, PI / 2.0);
        // Positive roll is a right-handed turn around +Y: X goes to -Z.
        assert_abs_diff_eq!(frame.x_axis.z, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(frame.y_axis.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_copy_recovers_reference_roll() {
        for roll in [0.0, 0.3, -0.3, 1.2, -2.5, 3.0] {
            let reference = bone([0.2, 1.0, 0.4], roll);
            let copy = reference.with_roll(0.9);
            assert_abs_diff_eq!(aligned_roll(&reference, &copy), roll, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_aligned_axis_matches_reference() {
        let reference = bone([1.0, 0.0, 0.0], 0.4);
        let aligned = bone([0.0, 0.5, 1.0], 0.0);
        let roll = aligned_roll(&reference, &aligned);

        let frame = aligned.with_roll(roll).frame();
        let rotation = alignment_rotation(frame.y_axis, reference.frame().y_axis, DVec3::Z);
        assert!(reference.frame().x_axis.dot(rotation * frame.x_axis) > ROLL_CHECK_THRESHOLD);
    }

    #[test]
    fn test_alignment_is_idempotent() {
        let reference = bone([0.0, 0.2, 1.0], -1.1);
        let aligned = bone([1.0, 1.0, 0.0], 0.0);
        let once = aligned_roll(&reference, &aligned);
        let twice = aligned_roll(&reference, &aligned.with_roll(once));
        assert_abs_diff_eq!(once, twice, epsilon = 1e-5);
    }

    #[test]
    fn test_alignment_is_deterministic_both_ways() {
        let a = bone([1.0, 0.2, 0.0], 0.5);
        let b = bone([0.0, 1.0, 0.3], -0.8);
        let a_to_b = aligned_roll(&b, &a);
        let b_to_a = aligned_roll(&a, &b);
        assert_eq!(a_to_b, aligned_roll(&b, &a));
        assert_eq!(b_to_a, aligned_roll(&a, &b));
    }

    #[test]
    fn test_opposite_directions_use_fallback_axis() {
        let reference = bone([0.0, -1.0, 0.0], 0.0);
        let aligned = bone([0.0, 1.0, 0.0], 0.0);
        let roll = aligned_roll(&reference, &aligned);
        assert!(roll.is_finite());

        let frame = aligned.with_roll(roll).frame();
        let rotation = alignment_rotation(DVec3::Y, DVec3::NEG_Y, DVec3::Z);
        assert_abs_diff_eq!((rotation * DVec3::Y).y, -1.0, epsilon = 1e-12);
        assert!(reference.frame().x_axis.dot(rotation * frame.x_axis) > ROLL_CHECK_THRESHOLD);
    }

    #[test]
    fn test_parallel_rotation_is_identity() {
        let rotation = alignment_rotation(DVec3::X, DVec3::X * 3.0, DVec3::Z);
        assert_eq!(rotation, DQuat::IDENTITY);
    }
}
