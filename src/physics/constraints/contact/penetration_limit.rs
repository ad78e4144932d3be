use super::contact_common::{
    apply_impulse, constraint_space_velocity, effective_mass_contribution, offset_to, sides_are_solvable,
};
use crate::physics::bodies::Bodies;
use crate::physics::collision_detection::Contact;
use crate::physics::constraints::CollisionResponseSettings;
use crate::physics::handles::BodyHandle;
use crate::physics::materials::InteractionProperties;
use crate::utilities::memory::Poolable;
use crate::utilities::{Fix32, Vector3};
use tracing::debug;

/// Keeps the two bodies of a contact from moving into each other.
///
/// The jacobian is `(-n, r_a × -n)` for body A and `(n, r_b × n)` for body B, so a positive
/// constraint space velocity means the contact is separating. The accumulated impulse is
/// clamped to be non-negative: contacts push, never pull.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPenetrationConstraint {
    body_a: Option<BodyHandle>,
    body_b: Option<BodyHandle>,
    contact: Option<Contact>,
    accumulated_impulse: Fix32,

    linear_a: Vector3,
    angular_a: Vector3,
    angular_b: Vector3,
    offset_a: Vector3,
    offset_b: Vector3,

    softness: Fix32,
    bias: Fix32,
    velocity_to_impulse: Fix32,
    active: bool,
}

impl ContactPenetrationConstraint {
    /// Binds the constraint to a pair of bodies and a contact. The accumulated impulse starts at
    /// zero.
    pub fn setup(&mut self, body_a: Option<BodyHandle>, body_b: Option<BodyHandle>, contact: Contact) {
        self.body_a = body_a;
        self.body_b = body_b;
        self.contact = Some(contact);
        self.accumulated_impulse = Fix32::ZERO;
        self.active = false;
    }

    /// Replaces the bound contact, keeping the accumulated impulse for warm starting.
    #[inline(always)]
    pub fn set_contact(&mut self, contact: Contact) {
        self.contact = Some(contact);
    }

    /// Clears every reference so the constraint can go back to its pool.
    pub fn clean_up(&mut self) {
        *self = Self::default();
    }

    /// Recomputes jacobians, effective mass, softness and bias from the current body state.
    pub fn update(
        &mut self,
        bodies: &Bodies,
        material: &InteractionProperties,
        settings: &CollisionResponseSettings,
        dt: Fix32,
    ) {
        let Some(contact) = self.contact else {
            self.active = false;
            return;
        };
        if !sides_are_solvable(bodies, self.body_a, self.body_b) {
            debug!(
                feature_id = contact.feature_id,
                "penetration constraint disabled: no dynamic body or same body on both sides"
            );
            self.active = false;
            return;
        }

        let normal = contact.normal;
        self.linear_a = -normal;
        self.offset_a = offset_to(bodies, self.body_a, contact.position);
        self.offset_b = offset_to(bodies, self.body_b, contact.position);
        self.angular_a = self.offset_a.cross(self.linear_a);
        self.angular_b = self.offset_b.cross(normal);

        let effective_mass_inverse = effective_mass_contribution(bodies, self.body_a, self.linear_a, self.angular_a)
            + effective_mass_contribution(bodies, self.body_b, normal, self.angular_b);
        if !effective_mass_inverse.is_positive() {
            debug!(feature_id = contact.feature_id, "penetration constraint disabled: zero effective mass");
            self.active = false;
            return;
        }

        self.softness = settings.softness * (effective_mass_inverse / dt);
        self.velocity_to_impulse = -(Fix32::ONE / (self.softness + effective_mass_inverse));

        let depth = contact.penetration_depth;
        self.bias = if depth.is_negative() {
            // Speculative: let the bodies close the gap within one step, no faster.
            depth / dt
        } else {
            let excess = (depth - settings.allowed_penetration).max(Fix32::ZERO);
            // Softness lets a loaded contact sink by `softness * accumulated` per step. Pushing
            // back by the same amount, using the load carried over from the last step, keeps a
            // resting contact inside the allowed slop instead of settling just past it.
            let mut bias = (excess * settings.penetration_recovery_stiffness / dt)
                .min(settings.maximum_penetration_recovery_speed)
                + self.softness * self.accumulated_impulse;
            if material.bounciness.is_positive() {
                let closing_speed = -self.relative_velocity(bodies);
                if closing_speed.is_positive() {
                    let low = settings.bounciness_low_threshold();
                    let range = settings.bounciness_velocity_threshold - low + Fix32::EPSILON;
                    let ramp = ((closing_speed - low) / range).clamp(Fix32::ZERO, Fix32::ONE);
                    bias = bias.max(ramp * material.bounciness * closing_speed);
                }
            }
            bias
        };
        self.active = true;
    }

    /// Warm start: applies the impulse accumulated during earlier steps.
    pub fn exclusive_update(&self, bodies: &mut Bodies) {
        if self.active && !self.accumulated_impulse.is_zero() {
            self.apply(bodies, self.accumulated_impulse);
        }
    }

    /// One sequential impulse iteration. Returns the magnitude of the applied impulse change.
    pub fn solve_iteration(&mut self, bodies: &mut Bodies) -> Fix32 {
        if !self.active {
            return Fix32::ZERO;
        }
        let lambda = (self.relative_velocity(bodies) - self.bias + self.softness * self.accumulated_impulse)
            * self.velocity_to_impulse;
        let previous = self.accumulated_impulse;
        self.accumulated_impulse = (previous + lambda).max(Fix32::ZERO);
        let delta = self.accumulated_impulse - previous;
        if !delta.is_zero() {
            self.apply(bodies, delta);
        }
        delta.abs()
    }

    /// Constraint space velocity: positive while the contact separates.
    pub fn relative_velocity(&self, bodies: &Bodies) -> Fix32 {
        let normal = self.contact.map_or(Vector3::ZERO, |contact| contact.normal);
        constraint_space_velocity(bodies, self.body_a, self.linear_a, self.angular_a)
            + constraint_space_velocity(bodies, self.body_b, normal, self.angular_b)
    }

    #[inline(always)]
    fn apply(&self, bodies: &mut Bodies, impulse: Fix32) {
        apply_impulse(bodies, self.body_a, self.linear_a, self.angular_a, impulse);
        apply_impulse(bodies, self.body_b, -self.linear_a, self.angular_b, impulse);
    }

    #[inline(always)]
    pub fn accumulated_impulse(&self) -> Fix32 {
        self.accumulated_impulse
    }

    /// Zeroes the accumulated impulse, used when warm starting is turned off.
    #[inline(always)]
    pub fn reset_accumulated_impulse(&mut self) {
        self.accumulated_impulse = Fix32::ZERO;
    }

    #[inline(always)]
    pub fn contact(&self) -> Option<&Contact> {
        self.contact.as_ref()
    }

    #[inline(always)]
    pub fn body_a(&self) -> Option<BodyHandle> {
        self.body_a
    }

    #[inline(always)]
    pub fn body_b(&self) -> Option<BodyHandle> {
        self.body_b
    }

    /// Contact position relative to body A's center, as of the last update.
    #[inline(always)]
    pub fn offset_a(&self) -> Vector3 {
        self.offset_a
    }

    #[inline(always)]
    pub fn offset_b(&self) -> Vector3 {
        self.offset_b
    }

    #[inline(always)]
    pub fn bias(&self) -> Fix32 {
        self.bias
    }

    #[inline(always)]
    pub fn softness(&self) -> Fix32 {
        self.softness
    }

    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Poolable for ContactPenetrationConstraint {
    fn is_cleaned_up(&self) -> bool {
        self.body_a.is_none()
            && self.body_b.is_none()
            && self.contact.is_none()
            && self.accumulated_impulse.is_zero()
            && !self.active
    }
}
