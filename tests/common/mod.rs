#![allow(dead_code)]

use rust_fixphysics::physics::{
    BodyDescription, BodyHandle, BodyInertia, BodyPair, BodyVelocity, Contact, RigidPose, SimulationError,
    SolverIsland, MAXIMUM_CONTACT_COUNT,
};
use rust_fixphysics::utilities::{Fix32, Quaternion, Vector3};

/// Gap below which box corners are reported as speculative contacts.
pub const SPECULATIVE_MARGIN: Fix32 = Fix32::from_ratio(1, 5);

pub fn dt() -> Fix32 {
    Fix32::ONE / Fix32::from_i32(60)
}

/// Installs a test-writer subscriber once, so `RUST_LOG=trace` shows solver logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// World space corners of a box, tagged with their corner index.
fn box_corners(pose: &RigidPose, half_extents: Vector3) -> impl Iterator<Item = (u32, Vector3)> + '_ {
    (0..8u32).map(move |index| {
        let sign = |bit: u32| if index & bit == 0 { Fix32::NEG_ONE } else { Fix32::ONE };
        let local = Vector3::new(
            half_extents.x * sign(1),
            half_extents.y * sign(2),
            half_extents.z * sign(4),
        );
        (index, pose.transform(local))
    })
}

/// Keeps the deepest candidates, deepest first. Ties go to the lower corner index.
fn deepest_contacts(mut candidates: Vec<(Fix32, u32, Vector3)>, normal: Vector3) -> Vec<Contact> {
    candidates.sort_by_key(|&(gap, index, _)| (gap, index));
    candidates
        .into_iter()
        .take(MAXIMUM_CONTACT_COUNT)
        .map(|(gap, index, position)| Contact::new(position, normal, -gap, index))
        .collect()
}

/// Contacts between a box and the ground plane `y = 0`, normal pointing up from the ground.
///
/// Every corner below the speculative margin is a candidate; the lowest ones are kept. Feature
/// ids are corner indices, so a corner resting on the ground keeps its id from frame to frame.
pub fn box_ground_contacts(pose: &RigidPose, half_extents: Vector3) -> Vec<Contact> {
    let candidates: Vec<_> = box_corners(pose, half_extents)
        .map(|(index, world)| (world.y, index, world))
        .filter(|(height, _, _)| *height < SPECULATIVE_MARGIN)
        .collect();
    deepest_contacts(candidates, Vector3::UNIT_Y)
}

/// Contacts between the top face of `lower` and the corners of `upper` resting on it. The normal
/// is `lower`'s up axis, pointing from `lower` to `upper`.
///
/// Only corners above the face (with a little overhang) count. Feature ids are `upper`'s corner
/// indices.
pub fn box_on_box_contacts(lower: &RigidPose, upper: &RigidPose, half_extents: Vector3) -> Vec<Contact> {
    let reach = half_extents * Fix32::from_ratio(11, 10);
    let candidates: Vec<_> = box_corners(upper, half_extents)
        .filter_map(|(index, world)| {
            let local = lower.transform_by_inverse(world);
            let over_face = local.x.abs() <= reach.x && local.z.abs() <= reach.z && !local.y.is_negative();
            let gap = local.y - half_extents.y;
            (over_face && gap < SPECULATIVE_MARGIN).then_some((gap, index, world))
        })
        .collect();
    deepest_contacts(candidates, lower.orientation.transform(Vector3::UNIT_Y))
}

pub fn unit_half_extents() -> Vector3 {
    Vector3::splat(Fix32::HALF)
}

/// A dynamic unit cube.
pub fn unit_box(id: u64, position: Vector3, mass: Fix32) -> Result<BodyDescription, SimulationError> {
    Ok(BodyDescription::create_dynamic(
        id,
        RigidPose::from_position(position),
        BodyVelocity::default(),
        BodyInertia::from_box(mass, Fix32::ONE, Fix32::ONE, Fix32::ONE)?,
    ))
}

/// Same as [`unit_box`] with a starting velocity and a yaw.
pub fn moving_box(
    id: u64,
    position: Vector3,
    yaw: Fix32,
    velocity: BodyVelocity,
    mass: Fix32,
) -> Result<BodyDescription, SimulationError> {
    let mut description = unit_box(id, position, mass)?;
    description.pose.orientation = Quaternion::from_axis_angle(Vector3::UNIT_Y, yaw);
    description.velocity = velocity;
    Ok(description)
}

/// Recomputes the ground contacts of every dynamic body of the island, treating each as a unit
/// cube.
pub fn refresh_ground_contacts(island: &mut SolverIsland) -> Result<(), SimulationError> {
    let updates: Vec<(BodyHandle, Vec<Contact>)> = island
        .bodies()
        .iter()
        .filter(|(_, body)| body.is_dynamic())
        .map(|(handle, body)| (handle, box_ground_contacts(&body.pose, unit_half_extents())))
        .collect();
    for (handle, contacts) in updates {
        island.update_manifold(BodyPair::new(None, Some(handle)), &contacts)?;
    }
    Ok(())
}

/// Island holding one box resting exactly on the ground.
pub fn resting_box_island(mass: Fix32) -> Result<(SolverIsland, BodyHandle), SimulationError> {
    let mut island = SolverIsland::with_manifold_capacity(4);
    let handle = island.add_body(&unit_box(0, Vector3::new(Fix32::ZERO, Fix32::HALF, Fix32::ZERO), mass)?)?;
    Ok((island, handle))
}

/// A row of independent islands, each holding a box at a different height and spin.
pub fn scattered_islands(count: u64) -> Result<Vec<SolverIsland>, SimulationError> {
    (0..count)
        .map(|id| {
            let mut island = SolverIsland::with_manifold_capacity(2);
            let height = Fix32::HALF + Fix32::from_ratio(id as i32, 10);
            let velocity = BodyVelocity::new(
                Vector3::new(Fix32::from_ratio(id as i32, 4), Fix32::ZERO, Fix32::ZERO),
                Vector3::new(Fix32::ZERO, Fix32::from_ratio(id as i32, 3), Fix32::ZERO),
            );
            let yaw = Fix32::from_ratio(id as i32, 7);
            island.add_body(&moving_box(
                id,
                Vector3::new(Fix32::from_i32(id as i32 * 3), height, Fix32::ZERO),
                yaw,
                velocity,
                Fix32::from_i32(1 + id as i32),
            )?)?;
            Ok(island)
        })
        .collect()
}

/// A column of unit boxes standing on the ground, one box per unit of height, bottom first.
pub fn box_stack(count: u64, mass: Fix32) -> Result<(SolverIsland, Vec<BodyHandle>), SimulationError> {
    let mut island = SolverIsland::with_manifold_capacity(count as u32);
    let handles = (0..count)
        .map(|level| {
            let height = Fix32::HALF + Fix32::from_i32(level as i32);
            island.add_body(&unit_box(level, Vector3::new(Fix32::ZERO, height, Fix32::ZERO), mass)?)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((island, handles))
}

/// Recomputes the contacts of a stack built by [`box_stack`]: the bottom box against the
/// ground, then every box against the one below it.
pub fn refresh_stack_contacts(island: &mut SolverIsland, handles: &[BodyHandle]) -> Result<(), SimulationError> {
    let Some(&bottom) = handles.first() else {
        return Ok(());
    };
    let contacts = box_ground_contacts(&island.bodies()[bottom].pose, unit_half_extents());
    island.update_manifold(BodyPair::new(None, Some(bottom)), &contacts)?;
    for pair in handles.windows(2) {
        let (lower, upper) = (pair[0], pair[1]);
        let contacts = box_on_box_contacts(
            &island.bodies()[lower].pose,
            &island.bodies()[upper].pose,
            unit_half_extents(),
        );
        island.update_manifold(BodyPair::new(Some(lower), Some(upper)), &contacts)?;
    }
    Ok(())
}
