//! FABRIK passes over a root-first joint buffer.
//!
//! Every function takes the working pose (`positions`, joint 0 = root) and the
//! chain's `bone_lengths` (`positions.len() - 1` entries). Each joint update
//! places the joint at a fixed radius from an already-placed neighbour, so the
//! bone it shares with that neighbour keeps its length.
//!
//! Coincident joints make a direction undefined. Instead of dividing by zero,
//! each pass reuses the last direction it produced (seeded from the
//! root/target axis, then `+Y`), and the pole correction skips the joint.

use glam::{Quat, Vec3};

/// Squared length below which a direction is treated as undefined.
const DEGENERATE_LENGTH_SQ: f32 = 1e-12;

#[inline]
fn unit(v: Vec3) -> Option<Vec3> {
    if v.length_squared() > DEGENERATE_LENGTH_SQ {
        Some(v.normalize())
    } else {
        None
    }
}

#[inline]
fn unit_or(v: Vec3, fallback: Vec3) -> Vec3 {
    unit(v).unwrap_or(fallback)
}

/// Unreachable target: lay the chain out in a straight line from the root
/// toward `target`. Exact, no iteration.
pub fn stretch_toward(positions: &mut [Vec3], bone_lengths: &[f32], target: Vec3) {
    debug_assert_eq!(positions.len(), bone_lengths.len() + 1);
    let dir = unit_or(target - positions[0], Vec3::ZERO);
    for i in 1..positions.len() {
        positions[i] = positions[i - 1] + dir * bone_lengths[i - 1];
    }
}

/// Backward reaching: pin the tip to `target`, then pull each interior joint
/// toward its just-updated child. The root is never moved.
pub fn backward_pass(positions: &mut [Vec3], bone_lengths: &[f32], target: Vec3) {
    debug_assert_eq!(positions.len(), bone_lengths.len() + 1);
    let tip = positions.len() - 1;
    positions[tip] = target;

    let mut fallback = unit_or(positions[0] - target, Vec3::Y);
    for i in (1..tip).rev() {
        let dir = unit_or(positions[i] - positions[i + 1], fallback);
        positions[i] = positions[i + 1] + dir * bone_lengths[i];
        fallback = dir;
    }
}

/// Forward reaching: re-anchor interior joints from the root outward. Neither
/// the root nor the pinned tip moves.
///
/// Returns the forward-reached tip: where the last bone would end if it were
/// laid from the re-anchored joint `N-1` toward the pinned tip. Its distance
/// to the target is the loop's convergence measure.
pub fn forward_pass(positions: &mut [Vec3], bone_lengths: &[f32], target: Vec3) -> Vec3 {
    debug_assert_eq!(positions.len(), bone_lengths.len() + 1);
    let tip = positions.len() - 1;

    let mut fallback = unit_or(target - positions[0], Vec3::Y);
    for i in 1..tip {
        let dir = unit_or(positions[i] - positions[i - 1], fallback);
        positions[i] = positions[i - 1] + dir * bone_lengths[i - 1];
        fallback = dir;
    }

    let last = unit_or(positions[tip] - positions[tip - 1], fallback);
    positions[tip - 1] + last * bone_lengths[tip - 1]
}

/// Signed angle in radians from `from` to `to` about `axis`. Both vectors are
/// expected to lie in the plane perpendicular to `axis`.
fn signed_angle(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    if from.length_squared() <= DEGENERATE_LENGTH_SQ || to.length_squared() <= DEGENERATE_LENGTH_SQ
    {
        return 0.0;
    }
    from.cross(to).dot(axis).atan2(from.dot(to))
}

/// Swing each interior joint about the axis through its neighbours so that it
/// lies in the half-plane containing `pole`. Both adjacent bone lengths are
/// unchanged because the rotation axis passes through both neighbours.
pub fn apply_pole(positions: &mut [Vec3], pole: Vec3) {
    if positions.len() < 3 {
        return;
    }
    for i in 1..positions.len() - 1 {
        let anchor = positions[i - 1];
        let Some(normal) = unit(positions[i + 1] - anchor) else {
            continue;
        };
        let project = |p: Vec3| p - normal * (p - anchor).dot(normal);

        let bone = project(positions[i]) - anchor;
        let toward_pole = project(pole) - anchor;
        let angle = signed_angle(bone, toward_pole, normal);
        if angle == 0.0 {
            continue;
        }
        positions[i] = Quat::from_axis_angle(normal, angle) * (positions[i] - anchor) + anchor;
    }
}
