use crate::physics::bodies::{Bodies, Body};
use crate::physics::handles::BodyHandle;
use crate::utilities::{Fix32, Symmetric3x3, Vector3};

/// Looks up one side of a constraint. `None` stands for the immovable world.
#[inline(always)]
pub(crate) fn side(bodies: &Bodies, handle: Option<BodyHandle>) -> Option<&Body> {
    handle.and_then(|handle| bodies.get(handle))
}

#[inline(always)]
pub(crate) fn is_dynamic(bodies: &Bodies, handle: Option<BodyHandle>) -> bool {
    side(bodies, handle).is_some_and(Body::is_dynamic)
}

/// Offset from the body's center to a world space point; zero for the world.
#[inline(always)]
pub(crate) fn offset_to(bodies: &Bodies, handle: Option<BodyHandle>, point: Vector3) -> Vector3 {
    side(bodies, handle).map_or(Vector3::ZERO, |body| point - body.pose.position)
}

/// Velocity of a body's material at the given offset; zero for the world.
#[inline(always)]
pub(crate) fn velocity_at(bodies: &Bodies, handle: Option<BodyHandle>, offset: Vector3) -> Vector3 {
    side(bodies, handle).map_or(Vector3::ZERO, |body| body.velocity_at_offset(offset))
}

/// Jacobian-weighted velocity of one side: `linear · v + angular · ω`.
#[inline(always)]
pub(crate) fn constraint_space_velocity(
    bodies: &Bodies,
    handle: Option<BodyHandle>,
    linear: Vector3,
    angular: Vector3,
) -> Fix32 {
    side(bodies, handle).map_or(Fix32::ZERO, |body| {
        linear.dot(body.velocity.linear) + angular.dot(body.velocity.angular)
    })
}

/// One side's contribution to the inverse effective mass: `m⁻¹ |linear|² + angularᵀ I⁻¹ angular`.
/// Kinematic bodies and the world contribute nothing.
#[inline(always)]
pub(crate) fn effective_mass_contribution(
    bodies: &Bodies,
    handle: Option<BodyHandle>,
    linear: Vector3,
    angular: Vector3,
) -> Fix32 {
    match side(bodies, handle) {
        Some(body) if body.is_dynamic() => {
            body.inverse_mass() * linear.length_squared()
                + Symmetric3x3::vector_sandwich(angular, body.world_inverse_inertia())
        }
        _ => Fix32::ZERO,
    }
}

/// Applies `impulse` along one side's jacobian.
///
/// Every product on this path rounds to nearest. A solve runs it once per constraint per
/// iteration, and flooring there biases every velocity downwards until stacks never settle.
#[inline(always)]
pub(crate) fn apply_impulse(
    bodies: &mut Bodies,
    handle: Option<BodyHandle>,
    linear: Vector3,
    angular: Vector3,
    impulse: Fix32,
) {
    if let Some(body) = handle.and_then(|handle| bodies.get_mut(handle)) {
        body.apply_linear_impulse(linear.rounding_scale(impulse));
        body.apply_angular_impulse(angular.rounding_scale(impulse));
    }
}

/// Shared validity check of the two sides of a contact constraint: distinct bodies, at least one
/// of them dynamic.
pub(crate) fn sides_are_solvable(bodies: &Bodies, body_a: Option<BodyHandle>, body_b: Option<BodyHandle>) -> bool {
    if body_a.is_some() && body_a == body_b {
        return false;
    }
    is_dynamic(bodies, body_a) || is_dynamic(bodies, body_b)
}
