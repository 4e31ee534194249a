//! Bevy integration for `vizij-ik-core`.
//!
//! Add [`VizijIkPlugin`], then put a [`FabrikIk`] on the end-effector entity
//! of a parented joint chain and point it at a target entity:
//!
//! ```ignore
//! let ik = FabrikIk::new(IkConfig::default().with_chain_length(2))?
//!     .with_target(target)
//!     .with_pole(pole);
//! commands.entity(hand).insert(ik);
//! ```
//!
//! Solving runs in [`PostUpdate`] inside [`IkSolveSet`], before transform
//! propagation.

pub mod components;
pub mod systems;

use bevy::prelude::*;
use bevy::transform::TransformSystem;

pub use components::{FabrikIk, IkChainFailed};
pub use systems::solve_fabrik_chains;
pub use vizij_ik_core::{ConvergencePolicy, DebugSegment, IkConfig, IkError, SolveOutcome, SolveStatus};

/// System set containing the FABRIK solve, for ordering host systems around it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct IkSolveSet;

pub struct VizijIkPlugin;

impl Plugin for VizijIkPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<IkChainFailed>()
            .configure_sets(
                PostUpdate,
                IkSolveSet.before(TransformSystem::TransformPropagate),
            )
            .add_systems(PostUpdate, solve_fabrik_chains.in_set(IkSolveSet));
    }
}
