//! Solver configuration for vizij-ik-core.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{IkError, IkResult};

/// Longest chain a config may ask for.
pub const MAX_CHAIN_LENGTH: usize = 1024;

/// When the refinement loop should stop early.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergencePolicy {
    /// Stop once the forward-reached tip (where the last bone ends after the
    /// forward pass) is within `delta` of the target.
    #[default]
    WithinTolerance,
    /// Historical loop: stop once the pinned tip is farther than `delta` from
    /// the target. The pinned tip sits on the target after every backward
    /// pass, so this runs the full iteration budget.
    StopWhenDivergent,
}

impl ConvergencePolicy {
    /// Squared error this policy tests after a pass.
    #[inline]
    pub fn measured_error_sq(self, reached: Vec3, pinned: Vec3, target: Vec3) -> f32 {
        match self {
            ConvergencePolicy::WithinTolerance => reached.distance_squared(target),
            ConvergencePolicy::StopWhenDivergent => pinned.distance_squared(target),
        }
    }

    /// Whether the loop should break given the squared tip error.
    #[inline]
    pub fn should_stop(self, tip_error_sq: f32, delta_sq: f32) -> bool {
        match self {
            ConvergencePolicy::WithinTolerance => tip_error_sq <= delta_sq,
            ConvergencePolicy::StopWhenDivergent => tip_error_sq > delta_sq,
        }
    }
}

/// Chain shape and iteration budget for a [`ChainSolver`](crate::ChainSolver).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkConfig {
    /// Number of bones in the chain, at most [`MAX_CHAIN_LENGTH`]. The chain
    /// has `chain_length + 1` joints.
    pub chain_length: usize,
    /// Maximum backward/forward refinement passes per solve.
    pub iterations: u32,
    /// Convergence threshold in world units (compared squared).
    pub delta: f32,
    pub convergence: ConvergencePolicy,
}

impl Default for IkConfig {
    fn default() -> Self {
        Self {
            chain_length: 2,
            iterations: 10,
            delta: 0.01,
            convergence: ConvergencePolicy::default(),
        }
    }
}

impl IkConfig {
    pub fn with_chain_length(mut self, chain_length: usize) -> Self {
        self.chain_length = chain_length;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_delta(mut self, delta: f32) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_convergence(mut self, convergence: ConvergencePolicy) -> Self {
        self.convergence = convergence;
        self
    }

    /// Joints needed to build this chain (bones + 1).
    #[inline]
    pub fn joint_count(&self) -> usize {
        self.chain_length + 1
    }

    pub fn validate(&self) -> IkResult<()> {
        if self.chain_length < 1 {
            return Err(IkError::InvalidConfig(
                "chain_length must be at least 1".to_string(),
            ));
        }
        if self.chain_length > MAX_CHAIN_LENGTH {
            return Err(IkError::InvalidConfig(format!(
                "chain_length must be at most {MAX_CHAIN_LENGTH}, got {}",
                self.chain_length
            )));
        }
        if self.iterations < 1 {
            return Err(IkError::InvalidConfig(
                "iterations must be at least 1".to_string(),
            ));
        }
        if !self.delta.is_finite() || self.delta <= 0.0 {
            return Err(IkError::InvalidConfig(format!(
                "delta must be a positive finite number, got {}",
                self.delta
            )));
        }
        Ok(())
    }
}
