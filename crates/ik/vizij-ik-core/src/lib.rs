//! Vizij IK Core (engine-agnostic)
//!
//! FABRIK (Forward And Backward Reaching Inverse Kinematics) for a single
//! articulated chain. Hosts hand the solver an ordered pose (root first),
//! a target and an optional pole point, and read back the corrected pose.
//! The crate never touches a scene graph; adapters (Bevy, wasm) own that.

pub mod chain;
pub mod config;
pub mod error;
pub mod fabrik;
pub mod solver;

// Re-exports for consumers (adapters)
pub use chain::Chain;
pub use config::{ConvergencePolicy, IkConfig, MAX_CHAIN_LENGTH};
pub use error::{IkError, IkResult};
pub use glam::Vec3;
pub use solver::{ChainSolver, DebugSegment, SolveOutcome, SolveStatus};
