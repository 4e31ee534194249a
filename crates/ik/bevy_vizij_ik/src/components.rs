use bevy::prelude::*;
use vizij_ik_core::{ChainSolver, DebugSegment, IkConfig, IkError, IkResult, SolveOutcome};

/// FABRIK chain driver. Put this on the end-effector entity; the chain is the
/// tip plus `chain_length` ancestors found through [`Parent`] links.
///
/// `target` and `pole` name entities whose [`GlobalTransform`] translation is
/// sampled each frame. A missing or despawned target means no solve.
#[derive(Component, Debug)]
pub struct FabrikIk {
    pub target: Option<Entity>,
    pub pole: Option<Entity>,
    pub(crate) solver: ChainSolver,
    pub(crate) last_outcome: Option<SolveOutcome>,
}

impl FabrikIk {
    pub fn new(config: IkConfig) -> IkResult<Self> {
        Ok(Self {
            target: None,
            pole: None,
            solver: ChainSolver::new(config)?,
            last_outcome: None,
        })
    }

    pub fn with_target(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_pole(mut self, pole: Entity) -> Self {
        self.pole = Some(pole);
        self
    }

    pub fn config(&self) -> &IkConfig {
        self.solver.config()
    }

    /// Change chain length / iteration budget. The chain is rebuilt from the
    /// hierarchy on the next solve.
    pub fn reconfigure(&mut self, config: IkConfig) -> IkResult<()> {
        self.last_outcome = None;
        self.solver.reconfigure(config)
    }

    pub fn solver(&self) -> &ChainSolver {
        &self.solver
    }

    /// Outcome of the most recent solve that ran.
    pub fn last_outcome(&self) -> Option<SolveOutcome> {
        self.last_outcome
    }

    /// World-space bone segments of the last solved pose, for gizmo drawing.
    pub fn debug_segments(&self) -> impl Iterator<Item = DebugSegment> + '_ {
        self.solver.debug_segments()
    }
}

impl Default for FabrikIk {
    fn default() -> Self {
        Self {
            target: None,
            pole: None,
            solver: ChainSolver::new(IkConfig::default())
                .expect("default ik config is valid"),
            last_outcome: None,
        }
    }
}

/// Sent when a chain cannot be built or solved. The chain's pose is left as
/// the hierarchy had it.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct IkChainFailed {
    /// The end-effector entity carrying the [`FabrikIk`].
    pub entity: Entity,
    pub error: IkError,
}
