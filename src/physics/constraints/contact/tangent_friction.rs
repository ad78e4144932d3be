use super::contact_common::{
    apply_impulse, constraint_space_velocity, effective_mass_contribution, velocity_at,
};
use super::penetration_limit::ContactPenetrationConstraint;
use crate::physics::bodies::Bodies;
use crate::physics::constraints::CollisionResponseSettings;
use crate::physics::handles::BodyHandle;
use crate::physics::materials::InteractionProperties;
use crate::utilities::memory::{PoolHandle, Poolable, ResourcePool};
use crate::utilities::{Fix32, Vector3};
use tracing::{debug, trace};

/// Squared tangential speed below which the sliding direction is considered undefined.
const DIRECTION_EPSILON: Fix32 = Fix32::from_raw(2);

/// Resists sliding at one contact.
///
/// The friction direction follows the tangential relative velocity. The impulse is bounded by
/// the friction coefficient times the normal impulse of the sibling penetration constraint,
/// which is read through its pool handle on every iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFrictionConstraint {
    body_a: Option<BodyHandle>,
    body_b: Option<BodyHandle>,
    penetration: Option<PoolHandle<ContactPenetrationConstraint>>,
    accumulated_impulse: Fix32,

    direction: Vector3,
    angular_a: Vector3,
    angular_b: Vector3,
    velocity_to_impulse: Fix32,
    friction: Fix32,
    active: bool,
}

impl ContactFrictionConstraint {
    pub fn setup(
        &mut self,
        body_a: Option<BodyHandle>,
        body_b: Option<BodyHandle>,
        penetration: PoolHandle<ContactPenetrationConstraint>,
    ) {
        self.body_a = body_a;
        self.body_b = body_b;
        self.penetration = Some(penetration);
        self.accumulated_impulse = Fix32::ZERO;
        self.direction = Vector3::ZERO;
        self.active = false;
    }

    pub fn clean_up(&mut self) {
        *self = Self::default();
    }

    /// Picks the friction direction and coefficient for this step. Must run after the sibling
    /// penetration constraint's update, whose lever arms it reuses.
    pub fn update(
        &mut self,
        bodies: &Bodies,
        penetrations: &ResourcePool<ContactPenetrationConstraint>,
        material: &InteractionProperties,
        settings: &CollisionResponseSettings,
    ) {
        let Some(penetration) = self.penetration.and_then(|handle| penetrations.get(handle)) else {
            self.disable();
            return;
        };
        let Some(contact) = penetration.contact().filter(|_| penetration.is_active()) else {
            self.disable();
            return;
        };
        let (offset_a, offset_b) = (penetration.offset_a(), penetration.offset_b());
        let normal = contact.normal;

        let relative = velocity_at(bodies, self.body_a, offset_a) - velocity_at(bodies, self.body_b, offset_b);
        let tangential = relative - normal * relative.dot(normal);
        let sliding_direction = if tangential.length_squared() > DIRECTION_EPSILON {
            tangential.normalize()
        } else {
            None
        };
        match sliding_direction {
            Some(direction) => {
                self.direction = direction;
                self.friction = if tangential.length() > settings.static_friction_velocity_threshold {
                    material.kinetic_friction
                } else {
                    material.static_friction
                };
            }
            None if !self.direction.is_zero() => {
                trace!(feature_id = contact.feature_id, "friction keeps its previous direction");
                self.friction = material.static_friction;
            }
            None => {
                trace!(feature_id = contact.feature_id, "friction disabled: no tangential direction");
                self.disable();
                return;
            }
        }

        let direction = self.direction;
        self.angular_a = offset_a.cross(direction);
        self.angular_b = direction.cross(offset_b);
        let effective_mass_inverse = effective_mass_contribution(bodies, self.body_a, direction, self.angular_a)
            + effective_mass_contribution(bodies, self.body_b, -direction, self.angular_b);
        if !effective_mass_inverse.is_positive() {
            debug!(feature_id = contact.feature_id, "friction disabled: zero effective mass");
            self.disable();
            return;
        }
        self.velocity_to_impulse = -(Fix32::ONE / effective_mass_inverse);
        self.active = true;
    }

    /// Warm start. The carried impulse is first clamped to this step's friction bound.
    pub fn exclusive_update(&mut self, bodies: &mut Bodies, penetrations: &ResourcePool<ContactPenetrationConstraint>) {
        if !self.active {
            return;
        }
        let bound = self.maximum_impulse(penetrations);
        self.accumulated_impulse = self.accumulated_impulse.clamp(-bound, bound);
        if !self.accumulated_impulse.is_zero() {
            self.apply(bodies, self.accumulated_impulse);
        }
    }

    pub fn solve_iteration(
        &mut self,
        bodies: &mut Bodies,
        penetrations: &ResourcePool<ContactPenetrationConstraint>,
    ) -> Fix32 {
        if !self.active {
            return Fix32::ZERO;
        }
        let bound = self.maximum_impulse(penetrations);
        let lambda = self.relative_velocity(bodies) * self.velocity_to_impulse;
        let previous = self.accumulated_impulse;
        self.accumulated_impulse = (previous + lambda).clamp(-bound, bound);
        let delta = self.accumulated_impulse - previous;
        if !delta.is_zero() {
            self.apply(bodies, delta);
        }
        delta.abs()
    }

    /// Sliding speed along the friction direction.
    pub fn relative_velocity(&self, bodies: &Bodies) -> Fix32 {
        constraint_space_velocity(bodies, self.body_a, self.direction, self.angular_a)
            + constraint_space_velocity(bodies, self.body_b, -self.direction, self.angular_b)
    }

    /// Current bound on the magnitude of the accumulated impulse.
    pub fn maximum_impulse(&self, penetrations: &ResourcePool<ContactPenetrationConstraint>) -> Fix32 {
        self.penetration
            .and_then(|handle| penetrations.get(handle))
            .map_or(Fix32::ZERO, |penetration| self.friction * penetration.accumulated_impulse())
    }

    #[inline(always)]
    fn apply(&self, bodies: &mut Bodies, impulse: Fix32) {
        apply_impulse(bodies, self.body_a, self.direction, self.angular_a, impulse);
        apply_impulse(bodies, self.body_b, -self.direction, self.angular_b, impulse);
    }

    fn disable(&mut self) {
        self.active = false;
        self.accumulated_impulse = Fix32::ZERO;
    }

    #[inline(always)]
    pub fn accumulated_impulse(&self) -> Fix32 {
        self.accumulated_impulse
    }

    #[inline(always)]
    pub fn reset_accumulated_impulse(&mut self) {
        self.accumulated_impulse = Fix32::ZERO;
    }

    #[inline(always)]
    pub fn penetration(&self) -> Option<PoolHandle<ContactPenetrationConstraint>> {
        self.penetration
    }

    #[inline(always)]
    pub fn direction(&self) -> Vector3 {
        self.direction
    }

    /// Friction coefficient chosen by the last update.
    #[inline(always)]
    pub fn friction(&self) -> Fix32 {
        self.friction
    }

    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Poolable for ContactFrictionConstraint {
    fn is_cleaned_up(&self) -> bool {
        self.body_a.is_none()
            && self.body_b.is_none()
            && self.penetration.is_none()
            && self.accumulated_impulse.is_zero()
            && !self.active
    }
}
