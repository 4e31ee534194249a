use bevy::log::{debug, warn};
use bevy::math::Affine3A;
use bevy::prelude::*;
use vizij_ik_core::IkError;

use crate::components::{FabrikIk, IkChainFailed};

/// Walk `Parent` links from `tip`, collecting at most `required` entities
/// (tip first).
fn ancestors(tip: Entity, required: usize, parents: &Query<&Parent>) -> Vec<Entity> {
    let mut joints = Vec::new();
    let mut current = Some(tip);
    while let Some(entity) = current {
        if joints.len() == required {
            break;
        }
        joints.push(entity);
        current = parents.get(entity).ok().map(Parent::get);
    }
    joints
}

fn sample(entity: Option<Entity>, globals: &Query<&GlobalTransform>) -> Option<Vec3> {
    entity
        .and_then(|e| globals.get(e).ok())
        .map(GlobalTransform::translation)
}

/// Per-frame FABRIK pass for every [`FabrikIk`] chain.
///
/// Reads the chain's world positions from [`GlobalTransform`], solves, then
/// writes each moved joint back root to tip as a local translation relative to
/// its already-updated parent. Runs before transform propagation so the new
/// pose is visible the same frame.
pub fn solve_fabrik_chains(
    mut chains: Query<(Entity, &mut FabrikIk)>,
    parents: Query<&Parent>,
    globals: Query<&GlobalTransform>,
    mut transforms: Query<&mut Transform>,
    mut failures: EventWriter<IkChainFailed>,
) {
    for (tip, mut ik) in &mut chains {
        let Some(target) = sample(ik.target, &globals) else {
            continue;
        };
        let pole = sample(ik.pole, &globals);

        let required = ik.config().joint_count();
        let mut joints = ancestors(tip, required, &parents);
        if joints.len() < required {
            let error = IkError::InvalidChain {
                required,
                available: joints.len(),
            };
            warn!("fabrik chain on {tip:?}: {error}");
            failures.send(IkChainFailed { entity: tip, error });
            continue;
        }
        joints.reverse();

        let mut pose = Vec::with_capacity(joints.len());
        let mut affines = Vec::with_capacity(joints.len());
        for &joint in &joints {
            let Ok(global) = globals.get(joint) else {
                break;
            };
            pose.push(global.translation());
            affines.push(global.affine());
        }
        if pose.len() != joints.len() {
            warn!("fabrik chain on {tip:?}: joint without GlobalTransform");
            continue;
        }

        // Freshly spawned hierarchies report identity globals until the first
        // propagation; building geometry from them would give a zero-length chain.
        if !ik.solver.is_initialized() && pose.windows(2).all(|w| w[0] == w[1]) {
            debug!("fabrik chain on {tip:?}: waiting for propagated transforms");
            continue;
        }

        let outcome = match ik.solver.solve(Some(target), pole, &pose) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!("fabrik chain on {tip:?}: {error}");
                failures.send(IkChainFailed { entity: tip, error });
                continue;
            }
        };
        ik.last_outcome = Some(outcome);

        let solved = ik.solver.positions();
        let mut parent_world = affines[0];
        parent_world.translation = solved[0].into();
        for i in 1..joints.len() {
            let local = parent_world.inverse().transform_point3(solved[i]);
            let Ok(mut transform) = transforms.get_mut(joints[i]) else {
                // Joints below this one are placed relative to it.
                warn!(
                    "fabrik chain on {tip:?}: joint {:?} has no Transform, pose not written past it",
                    joints[i]
                );
                break;
            };
            transform.translation = local;
            // Only translations change, so the joint keeps its old rotation/scale.
            let mut world: Affine3A = affines[i];
            world.translation = solved[i].into();
            parent_world = world;
        }
    }
}
