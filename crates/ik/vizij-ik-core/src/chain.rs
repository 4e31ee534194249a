//! Static chain geometry derived once from an initial pose.

use glam::Vec3;

use crate::error::{IkError, IkResult};

/// Bone lengths and total reach of a chain.
///
/// Joint 0 is the root, joint `bone_count()` is the tip. `bone_lengths[i]`
/// is the distance from joint `i` to joint `i + 1` in the pose the chain was
/// built from; it is never recomputed implicitly.
#[derive(Clone, Debug, PartialEq)]
pub struct Chain {
    bone_lengths: Vec<f32>,
    total_length: f32,
}

impl Chain {
    /// Build from a root-first pose. Needs at least two joints.
    pub fn from_pose(root_first: &[Vec3]) -> IkResult<Self> {
        if root_first.len() < 2 {
            return Err(IkError::InvalidChain {
                required: 2,
                available: root_first.len(),
            });
        }
        ensure_finite(root_first, "initial pose")?;

        let bone_lengths: Vec<f32> = root_first
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .collect();
        let total_length = bone_lengths.iter().sum();
        Ok(Self {
            bone_lengths,
            total_length,
        })
    }

    /// Build from an end-effector-up traversal (tip first, then each
    /// ancestor). Exactly `chain_length + 1` points are consumed; a shorter
    /// traversal is an [`IkError::InvalidChain`] rather than a truncated chain.
    ///
    /// Returns the geometry together with the pose reordered root first.
    pub fn from_ancestors<I>(tip_first: I, chain_length: usize) -> IkResult<(Self, Vec<Vec3>)>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let required = chain_length + 1;
        let mut pose: Vec<Vec3> = tip_first.into_iter().take(required).collect();
        if pose.len() < required || required < 2 {
            return Err(IkError::InvalidChain {
                required: required.max(2),
                available: pose.len(),
            });
        }
        pose.reverse();
        let chain = Self::from_pose(&pose)?;
        Ok((chain, pose))
    }

    #[inline]
    pub fn bone_lengths(&self) -> &[f32] {
        &self.bone_lengths
    }

    /// Sum of all bone lengths; the chain's maximum reach.
    #[inline]
    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    #[inline]
    pub fn bone_count(&self) -> usize {
        self.bone_lengths.len()
    }

    #[inline]
    pub fn joint_count(&self) -> usize {
        self.bone_lengths.len() + 1
    }

    /// Whether `target` lies within reach of a chain rooted at `root`.
    #[inline]
    pub fn reaches(&self, root: Vec3, target: Vec3) -> bool {
        root.distance_squared(target) <= self.total_length * self.total_length
    }
}

pub(crate) fn ensure_finite(points: &[Vec3], what: &'static str) -> IkResult<()> {
    if points.iter().all(|p| p.is_finite()) {
        Ok(())
    } else {
        Err(IkError::NonFinite { what })
    }
}
