use approx::assert_relative_eq;
use vizij_ik_core::{
    fabrik, ChainSolver, ConvergencePolicy, IkConfig, IkError, SolveStatus, Vec3,
};

fn straight_chain(bones: usize) -> Vec<Vec3> {
    (0..=bones).map(|i| Vec3::new(0.0, i as f32, 0.0)).collect()
}

#[test]
fn concrete_unreachable_scenario() {
    // Root (0,0,0), joint (0,1,0), tip (0,2,0); target three units out on +Z.
    let pose = straight_chain(2);
    let mut solver = ChainSolver::with_pose(IkConfig::default(), &pose).unwrap();
    let outcome = solver
        .solve(Some(Vec3::new(0.0, 0.0, 3.0)), None, &pose)
        .unwrap();

    assert_eq!(outcome.status, SolveStatus::Stretched);
    let p = solver.positions();
    assert!(p[0].abs_diff_eq(Vec3::ZERO, 1e-6));
    assert!(p[1].abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));
    assert!(p[2].abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-6));
    assert_relative_eq!(p[0].distance(p[1]), 1.0, epsilon = 1e-6);
    assert_relative_eq!(p[1].distance(p[2]), 1.0, epsilon = 1e-6);
}

#[test]
fn single_bone_reachable_tip_hits_target() {
    let pose = [Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)];
    let cfg = IkConfig::default().with_chain_length(1);
    let mut solver = ChainSolver::with_pose(cfg, &pose).unwrap();
    let target = Vec3::new(0.3, 0.4, 0.0);
    solver.solve(Some(target), None, &pose).unwrap();
    assert_eq!(solver.positions()[0], Vec3::ZERO);
    assert_eq!(solver.positions()[1], target);
}

#[test]
fn root_is_stable_on_reachable_targets() {
    let pose = vec![
        Vec3::new(1.0, 2.0, 3.0),
        Vec3::new(1.0, 2.5, 3.0),
        Vec3::new(1.0, 3.5, 3.0),
        Vec3::new(1.5, 4.0, 3.0),
    ];
    let cfg = IkConfig::default().with_chain_length(3).with_iterations(20);
    let mut solver = ChainSolver::with_pose(cfg, &pose).unwrap();
    for target in [
        Vec3::new(2.0, 3.0, 3.5),
        Vec3::new(0.0, 2.0, 4.0),
        Vec3::new(1.0, 2.1, 3.0),
    ] {
        let outcome = solver.solve(Some(target), None, &pose).unwrap();
        assert!(matches!(outcome.status, SolveStatus::Iterated { .. }));
        assert_eq!(solver.positions()[0], pose[0]);
    }
}

#[test]
fn reachable_tip_converges_with_enough_iterations() {
    let pose = straight_chain(4);
    let cfg = IkConfig::default()
        .with_chain_length(4)
        .with_iterations(500)
        .with_delta(1e-4);
    let mut solver = ChainSolver::with_pose(cfg, &pose).unwrap();
    let target = Vec3::new(1.5, 1.0, -1.2);
    let outcome = solver.solve(Some(target), None, &pose).unwrap();
    match outcome.status {
        SolveStatus::Iterated { converged, .. } => assert!(converged),
        other => panic!("unexpected {other:?}"),
    }
    assert!(outcome.tip_error <= 1e-4);
    let p = solver.positions();
    for pair in p.windows(2) {
        assert_relative_eq!(pair[0].distance(pair[1]), 1.0, epsilon = 2e-4);
    }
}

#[test]
fn within_tolerance_stops_early_divergent_runs_on() {
    // This target is solved exactly by the first pass (error 0).
    let pose = straight_chain(2);
    let target = Vec3::new(1.0, 1.0, 0.0);

    let cfg = IkConfig::default().with_iterations(8);
    let mut within = ChainSolver::with_pose(cfg.clone(), &pose).unwrap();
    let outcome = within.solve(Some(target), None, &pose).unwrap();
    assert_eq!(
        outcome.status,
        SolveStatus::Iterated {
            passes: 1,
            converged: true
        }
    );

    let mut divergent = ChainSolver::with_pose(
        cfg.with_convergence(ConvergencePolicy::StopWhenDivergent),
        &pose,
    )
    .unwrap();
    let outcome = divergent.solve(Some(target), None, &pose).unwrap();
    assert_eq!(
        outcome.status,
        SolveStatus::Iterated {
            passes: 8,
            converged: true
        }
    );
    assert_eq!(within.positions(), divergent.positions());
}

#[test]
fn pole_is_idempotent_once_applied() {
    let pose = straight_chain(2);
    let mut solver = ChainSolver::with_pose(IkConfig::default(), &pose).unwrap();
    let pole = Vec3::new(0.0, 1.0, 4.0);
    solver
        .solve(Some(Vec3::new(0.4, 1.2, 0.0)), Some(pole), &pose)
        .unwrap();

    let mut again = solver.positions().to_vec();
    let before = again.clone();
    fabrik::apply_pole(&mut again, pole);
    for (a, b) in again.iter().zip(&before) {
        assert!(a.abs_diff_eq(*b, 1e-5), "{a:?} vs {b:?}");
    }
}

#[test]
fn coincident_pose_stays_finite() {
    let pose = [Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
    let mut solver = ChainSolver::with_pose(IkConfig::default(), &pose).unwrap();
    let collapsed = [Vec3::ZERO; 3];
    solver
        .solve(Some(Vec3::new(0.0, 0.5, 0.0)), Some(Vec3::X), &collapsed)
        .unwrap();
    for p in solver.positions() {
        assert!(p.is_finite(), "{p:?}");
    }
    assert_relative_eq!(
        solver.positions()[0].distance(solver.positions()[1]),
        1.0,
        epsilon = 1e-5
    );
}

#[test]
fn ancestor_walk_shorter_than_chain_fails() {
    let mut solver = ChainSolver::new(IkConfig::default().with_chain_length(4)).unwrap();
    let tip_first = [Vec3::new(0.0, 2.0, 0.0), Vec3::Y, Vec3::ZERO];
    let err = solver.initialize_from_ancestors(tip_first).unwrap_err();
    assert_eq!(
        err,
        IkError::InvalidChain {
            required: 5,
            available: 3
        }
    );
    assert!(!solver.is_initialized());
}

#[test]
fn ancestor_walk_initializes_root_first() {
    let mut solver = ChainSolver::new(IkConfig::default()).unwrap();
    let tip_first = [Vec3::new(0.0, 3.0, 0.0), Vec3::Y, Vec3::ZERO, Vec3::NEG_Y];
    solver.initialize_from_ancestors(tip_first).unwrap();
    assert_eq!(solver.positions(), &[Vec3::ZERO, Vec3::Y, Vec3::new(0.0, 3.0, 0.0)]);
    assert_eq!(solver.chain().unwrap().bone_lengths(), &[1.0f32, 2.0]);
}

#[test]
fn solver_is_reusable_across_frames() {
    let mut pose = straight_chain(3);
    let cfg = IkConfig::default()
        .with_chain_length(3)
        .with_iterations(30)
        .with_delta(1e-3);
    let mut solver = ChainSolver::with_pose(cfg, &pose).unwrap();
    for frame in 0..20 {
        let t = frame as f32 * 0.1;
        let target = Vec3::new(t.cos() * 1.5, 1.5, t.sin() * 1.5);
        solver.solve_into(Some(target), None, &mut pose).unwrap();
        assert!(pose[3].abs_diff_eq(target, 1e-5));
        assert_eq!(pose[0], Vec3::ZERO);
    }
}
