mod common;

use common::{
    box_ground_contacts, box_stack, dt, init_tracing, moving_box, refresh_ground_contacts, refresh_stack_contacts,
    resting_box_island, unit_box, unit_half_extents,
};
use rust_fixphysics::physics::constraints::contact::{ContactConstraintPools, ContactManifoldConstraint};
use rust_fixphysics::physics::{
    Bodies, BodyDescription, BodyPair, BodyVelocity, CollisionResponseSettings, InteractionProperties,
    PoseIntegrator, RigidPose, SimulationError, SolverIsland, Solver, SolverSettings,
};
use rust_fixphysics::utilities::{Fix32, Vector3};

fn settle(island: &mut SolverIsland, steps: usize) -> Result<(), SimulationError> {
    let (solver, integrator) = (Solver::default(), PoseIntegrator::default());
    for _ in 0..steps {
        refresh_ground_contacts(island)?;
        island.step(&solver, &integrator, dt())?;
    }
    Ok(())
}

#[test]
fn resting_box_carries_its_weight() -> Result<(), SimulationError> {
    init_tracing();
    let mass = Fix32::from_i32(10);
    let (mut island, handle) = resting_box_island(mass)?;
    settle(&mut island, 120)?;

    let manifold = island
        .manifold(BodyPair::new(None, Some(handle)))
        .expect("box should be touching the ground");
    assert_eq!(manifold.contact_count(), 4);
    let weight_impulse = mass * Fix32::from_f64(9.81) * dt();
    let total = manifold.total_normal_impulse(island.pools());
    assert!(
        (total - weight_impulse).abs() < weight_impulse * Fix32::from_ratio(1, 20),
        "total normal impulse {total}, expected about {weight_impulse}"
    );

    let body = &island.bodies()[handle];
    assert!(body.velocity.linear.y.abs() < Fix32::from_ratio(1, 20));
    let depth = Fix32::HALF - body.pose.position.y;
    assert!(depth <= CollisionResponseSettings::default().allowed_penetration, "box sank {depth} into the ground");
    Ok(())
}

#[test]
fn dropped_box_comes_to_rest() -> Result<(), SimulationError> {
    init_tracing();
    let mut island = SolverIsland::with_manifold_capacity(1);
    let handle = island.add_body(&unit_box(
        0,
        Vector3::new(Fix32::ZERO, Fix32::from_ratio(11, 2), Fix32::ZERO),
        Fix32::from_i32(10),
    )?)?;
    settle(&mut island, 240)?;

    let body = &island.bodies()[handle];
    let allowed = CollisionResponseSettings::default().allowed_penetration;
    let depth = Fix32::HALF - body.pose.position.y;
    assert!(depth <= allowed, "box sank {depth} into the ground");
    assert!(depth >= -allowed, "box floats {depth} above the ground");
    assert!(body.velocity.linear.y.abs() < Fix32::from_ratio(1, 20));
    assert!(body.velocity.angular.length() < Fix32::from_ratio(1, 20));
    Ok(())
}

#[test]
fn warm_starting_reduces_iterations_on_a_settled_box() -> Result<(), SimulationError> {
    let (mut island, _) = resting_box_island(Fix32::from_i32(10))?;
    settle(&mut island, 120)?;
    let mut cold_island = island.clone();

    let integrator = PoseIntegrator::default();
    let warm = Solver::default();
    let cold = Solver::new(
        SolverSettings {
            warm_starting: false,
            ..SolverSettings::default()
        },
        CollisionResponseSettings::default(),
    );
    refresh_ground_contacts(&mut island)?;
    refresh_ground_contacts(&mut cold_island)?;
    let warm_stats = island.step(&warm, &integrator, dt())?;
    let cold_stats = cold_island.step(&cold, &integrator, dt())?;
    assert!(warm_stats.converged);
    assert!(
        warm_stats.iterations < cold_stats.iterations,
        "warm {warm_stats}, cold {cold_stats}"
    );
    Ok(())
}

#[test]
fn warm_starting_pays_off_on_a_box_stack() -> Result<(), SimulationError> {
    init_tracing();
    let (mut island, handles) = box_stack(4, Fix32::from_i32(10))?;
    let integrator = PoseIntegrator::default();
    let settings = SolverSettings {
        iteration_limit: 100,
        ..SolverSettings::default()
    };
    let warm = Solver::new(settings, CollisionResponseSettings::default());
    let cold = Solver::new(
        SolverSettings {
            warm_starting: false,
            ..settings
        },
        CollisionResponseSettings::default(),
    );
    for _ in 0..300 {
        refresh_stack_contacts(&mut island, &handles)?;
        island.step(&warm, &integrator, dt())?;
    }
    assert_eq!(island.manifolds().len(), handles.len());
    let mut cold_island = island.clone();

    let (mut warm_iterations, mut cold_iterations) = (0, 0);
    for _ in 0..30 {
        refresh_stack_contacts(&mut island, &handles)?;
        warm_iterations += island.step(&warm, &integrator, dt())?.iterations;
        refresh_stack_contacts(&mut cold_island, &handles)?;
        cold_iterations += cold_island.step(&cold, &integrator, dt())?.iterations;
    }
    assert!(
        warm_iterations < cold_iterations,
        "warm {warm_iterations} iterations, cold {cold_iterations}"
    );

    let allowed = CollisionResponseSettings::default().allowed_penetration;
    for (level, &handle) in handles.iter().enumerate() {
        let position = island.bodies()[handle].pose.position;
        let resting_height = Fix32::HALF + Fix32::from_i32(level as i32);
        assert!(
            (position.y - resting_height).abs() <= allowed * Fix32::from_i32(level as i32 + 1),
            "box {level} at {position:?}"
        );
        assert!(position.x.abs() < Fix32::from_ratio(1, 10) && position.z.abs() < Fix32::from_ratio(1, 10));
    }
    Ok(())
}

#[test]
fn moving_platform_carries_a_box_along() -> Result<(), SimulationError> {
    init_tracing();
    let mut island = SolverIsland::with_manifold_capacity(1);
    let platform_velocity = BodyVelocity::from_linear(Vector3::from_i32(1, 0, 0));
    // A flat slab whose top face is the plane y = 0.
    let platform = island.add_body(&BodyDescription::create_kinematic(
        0,
        RigidPose::from_position(Vector3::new(Fix32::ZERO, -Fix32::HALF, Fix32::ZERO)),
        platform_velocity,
    ))?;
    let cargo_position = Vector3::new(Fix32::ZERO, Fix32::HALF, Fix32::ZERO);
    let cargo = island.add_body(&unit_box(1, cargo_position, Fix32::from_i32(10))?)?;
    let (solver, integrator) = (Solver::default(), PoseIntegrator::default());
    let pair = BodyPair::new(Some(platform), Some(cargo));

    for _ in 0..120 {
        let contacts = box_ground_contacts(&island.bodies()[cargo].pose, unit_half_extents());
        island.update_manifold(pair, &contacts)?;
        island.step(&solver, &integrator, dt())?;
    }

    let platform_body = &island.bodies()[platform];
    assert_eq!(platform_body.velocity, platform_velocity);
    assert_eq!(platform_body.pose.position.y, -Fix32::HALF);
    let cargo_body = &island.bodies()[cargo];
    let carried = cargo_body.velocity.linear.x;
    assert!((carried - Fix32::ONE).abs() < Fix32::from_ratio(1, 20), "box moves at {carried}");
    assert!(cargo_body.velocity.linear.y.abs() < Fix32::from_ratio(1, 20));
    // Kinetic friction only covers part of the first second, so the box trails the platform.
    let lag = platform_body.pose.position.x - cargo_body.pose.position.x;
    assert!(lag.is_positive() && lag < Fix32::ONE, "box trails by {lag}");
    let depth = Fix32::HALF - cargo_body.pose.position.y;
    assert!(depth <= CollisionResponseSettings::default().allowed_penetration);
    Ok(())
}

#[test]
fn friction_never_exceeds_its_bound() -> Result<(), SimulationError> {
    let mut rng = fastrand::Rng::with_seed(0xF41C);
    let settings = CollisionResponseSettings::default();
    let material = InteractionProperties::default();
    let random = |rng: &mut fastrand::Rng, range: f64| Fix32::from_f64((rng.f64() * 2.0 - 1.0) * range);

    for _ in 0..64 {
        let velocity = BodyVelocity::new(
            Vector3::new(random(&mut rng, 3.0), -Fix32::from_f64(rng.f64() * 2.0), random(&mut rng, 3.0)),
            Vector3::new(random(&mut rng, 1.0), random(&mut rng, 4.0), random(&mut rng, 1.0)),
        );
        let height = Fix32::HALF - Fix32::from_f64(rng.f64() * 0.05);
        let mut bodies = Bodies::new();
        let handle = bodies.add(&moving_box(
            0,
            Vector3::new(Fix32::ZERO, height, Fix32::ZERO),
            random(&mut rng, 3.0),
            velocity,
            Fix32::from_f64(0.5 + rng.f64() * 20.0),
        )?)?;

        let mut pools = ContactConstraintPools::with_manifold_capacity(1);
        let mut manifold = ContactManifoldConstraint::new(BodyPair::new(None, Some(handle)), material, &mut pools)?;
        manifold.sync(&box_ground_contacts(&bodies[handle].pose, common::unit_half_extents()), &mut pools)?;
        manifold.update(&bodies, &mut pools, &settings, dt());
        manifold.exclusive_update(&mut bodies, &mut pools);

        for _ in 0..10 {
            manifold.solve_iteration(&mut bodies, &mut pools);
            for (penetration, friction) in manifold.contact_constraints() {
                let penetration = &pools.penetration[penetration];
                let friction = &pools.friction[friction];
                assert!(penetration.accumulated_impulse() >= Fix32::ZERO);
                let bound = friction.friction() * penetration.accumulated_impulse();
                assert!(
                    friction.accumulated_impulse().abs() <= bound,
                    "friction {} over bound {bound}",
                    friction.accumulated_impulse()
                );
            }
            let twist = &pools.twist[manifold.twist()];
            assert!(twist.accumulated_impulse().abs() <= twist.maximum_impulse(&pools.penetration));
        }
    }
    Ok(())
}
