//! ChainSolver: chain ownership and the public solve API.
//!
//! Methods:
//! - new, initialize / initialize_from_ancestors, reconfigure
//! - solve (stretch or backward/forward loop, then pole), solve_into
//! - positions, debug_segments (read-only)

use glam::Vec3;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::chain::{ensure_finite, Chain};
use crate::config::IkConfig;
use crate::error::{IkError, IkResult};
use crate::fabrik::{apply_pole, backward_pass, forward_pass, stretch_toward};

/// Which branch a solve took.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolveStatus {
    /// No target was supplied; the pose was passed through untouched.
    Skipped,
    /// Target out of reach; the chain was laid out straight toward it.
    Stretched,
    /// Target in reach; `passes` backward/forward passes ran.
    Iterated { passes: u32, converged: bool },
}

/// Summary of a single [`ChainSolver::solve`] call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// Distance from the reached tip to the target. For the iterative branch
    /// this is the forward-reached tip of the last pass.
    pub tip_error: f32,
}

impl SolveOutcome {
    fn skipped() -> Self {
        Self {
            status: SolveStatus::Skipped,
            tip_error: 0.0,
        }
    }
}

/// One bone of the working pose, for host-side debug drawing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebugSegment {
    pub start: Vec3,
    pub end: Vec3,
}

impl DebugSegment {
    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// FABRIK solver for one chain.
///
/// Owns the chain geometry (built once from an initial pose) and a working
/// position buffer reused across calls. Not meant to be shared between
/// threads mid-solve; each chain gets its own solver.
#[derive(Clone, Debug)]
pub struct ChainSolver {
    config: IkConfig,
    chain: Option<Chain>,
    positions: Vec<Vec3>,
}

impl ChainSolver {
    pub fn new(config: IkConfig) -> IkResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            chain: None,
            positions: Vec::new(),
        })
    }

    /// Create and initialize from a root-first pose in one step.
    pub fn with_pose(config: IkConfig, root_first: &[Vec3]) -> IkResult<Self> {
        let mut solver = Self::new(config)?;
        solver.initialize(root_first)?;
        Ok(solver)
    }

    pub fn config(&self) -> &IkConfig {
        &self.config
    }

    /// Chain geometry, once initialized.
    pub fn chain(&self) -> Option<&Chain> {
        self.chain.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.chain.is_some()
    }

    /// Working pose after the most recent initialize/solve, root first.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Build the chain geometry from a root-first pose of exactly
    /// `chain_length + 1` joints.
    pub fn initialize(&mut self, root_first: &[Vec3]) -> IkResult<()> {
        let required = self.config.joint_count();
        if root_first.len() < required {
            warn!(
                "ik chain needs {required} joints, pose only has {}",
                root_first.len()
            );
            return Err(IkError::InvalidChain {
                required,
                available: root_first.len(),
            });
        }
        if root_first.len() > required {
            return Err(IkError::PoseLength {
                expected: required,
                actual: root_first.len(),
            });
        }

        let chain = Chain::from_pose(root_first)?;
        debug!(
            "ik chain initialized: {} bones, total length {}",
            chain.bone_count(),
            chain.total_length()
        );
        self.positions.clear();
        self.positions.extend_from_slice(root_first);
        self.chain = Some(chain);
        Ok(())
    }

    /// Build the chain from a tip-first ancestor walk. Extra ancestors beyond
    /// `chain_length` are ignored; too few is an [`IkError::InvalidChain`].
    pub fn initialize_from_ancestors<I>(&mut self, tip_first: I) -> IkResult<()>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let (chain, pose) = Chain::from_ancestors(tip_first, self.config.chain_length)
            .inspect_err(|err| warn!("ik chain initialization failed: {err}"))?;
        debug!(
            "ik chain initialized from ancestors: {} bones, total length {}",
            chain.bone_count(),
            chain.total_length()
        );
        self.positions = pose;
        self.chain = Some(chain);
        Ok(())
    }

    /// Replace the configuration. The stored chain is dropped so the next
    /// solve rebuilds it from the pose it is handed.
    pub fn reconfigure(&mut self, config: IkConfig) -> IkResult<()> {
        config.validate()?;
        debug!(
            "ik solver reconfigured: chain_length {} -> {}",
            self.config.chain_length, config.chain_length
        );
        self.config = config;
        self.chain = None;
        self.positions.clear();
        Ok(())
    }

    /// Solve toward `target` starting from `current` (root first).
    ///
    /// An absent target is a no-op: the working pose becomes a copy of
    /// `current`. When no chain is stored, or the stored chain no longer has
    /// `chain_length + 1` joints, the chain is (re)built from `current` first.
    pub fn solve(
        &mut self,
        target: Option<Vec3>,
        pole: Option<Vec3>,
        current: &[Vec3],
    ) -> IkResult<SolveOutcome> {
        let Some(target) = target else {
            self.positions.clear();
            self.positions.extend_from_slice(current);
            return Ok(SolveOutcome::skipped());
        };
        ensure_finite(&[target], "target")
            .and_then(|()| pole.map_or(Ok(()), |pole| ensure_finite(&[pole], "pole")))
            .and_then(|()| ensure_finite(current, "pose"))
            .inspect_err(|err| warn!("ik solve rejected: {err}"))?;

        let stale = self
            .chain
            .as_ref()
            .map_or(true, |chain| chain.joint_count() != self.config.joint_count());
        if stale {
            self.initialize(current)?;
        }

        let Self {
            config,
            chain,
            positions,
        } = self;
        let Some(chain) = chain.as_ref() else {
            return Err(IkError::InvalidChain {
                required: config.joint_count(),
                available: current.len(),
            });
        };
        if current.len() != chain.joint_count() {
            let err = IkError::PoseLength {
                expected: chain.joint_count(),
                actual: current.len(),
            };
            warn!("ik solve rejected: {err}");
            return Err(err);
        }
        positions.clear();
        positions.extend_from_slice(current);

        let bones = chain.bone_lengths();
        let outcome = if !chain.reaches(positions[0], target) {
            stretch_toward(positions, bones, target);
            SolveOutcome {
                status: SolveStatus::Stretched,
                tip_error: positions[positions.len() - 1].distance(target),
            }
        } else {
            let delta_sq = config.delta * config.delta;
            let mut passes = 0;
            let mut error_sq = 0.0;
            for _ in 0..config.iterations {
                backward_pass(positions, bones, target);
                let reached = forward_pass(positions, bones, target);
                passes += 1;
                error_sq = reached.distance_squared(target);
                let pinned = positions[positions.len() - 1];
                let measured = config.convergence.measured_error_sq(reached, pinned, target);
                if config.convergence.should_stop(measured, delta_sq) {
                    break;
                }
            }
            SolveOutcome {
                status: SolveStatus::Iterated {
                    passes,
                    converged: error_sq <= delta_sq,
                },
                tip_error: error_sq.sqrt(),
            }
        };

        if let Some(pole) = pole {
            apply_pole(positions, pole);
        }

        trace!("ik solve: {:?}", outcome);
        Ok(outcome)
    }

    /// Like [`solve`](Self::solve), but writes the result back into `pose`.
    pub fn solve_into(
        &mut self,
        target: Option<Vec3>,
        pole: Option<Vec3>,
        pose: &mut [Vec3],
    ) -> IkResult<SolveOutcome> {
        let outcome = self.solve(target, pole, pose)?;
        pose.copy_from_slice(&self.positions);
        Ok(outcome)
    }

    /// Consecutive joint pairs of the working pose, root first.
    pub fn debug_segments(&self) -> impl Iterator<Item = DebugSegment> + '_ {
        self.positions.windows(2).map(|pair| DebugSegment {
            start: pair[0],
            end: pair[1],
        })
    }
}
