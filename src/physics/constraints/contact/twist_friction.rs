use super::contact_common::{apply_impulse, constraint_space_velocity, effective_mass_contribution};
use super::penetration_limit::ContactPenetrationConstraint;
use crate::physics::bodies::Bodies;
use crate::physics::collision_detection::MAXIMUM_CONTACT_COUNT;
use crate::physics::constraints::CollisionResponseSettings;
use crate::physics::handles::BodyHandle;
use crate::physics::materials::InteractionProperties;
use crate::utilities::memory::{PoolHandle, Poolable, ResourcePool};
use crate::utilities::{Fix32, Vector3};
use tracing::{debug, trace};

/// Resists relative rotation of a manifold's two bodies about the averaged contact normal.
///
/// Contact points alone cannot stop a box from spinning in place on the floor once their
/// tangent friction directions line up with the motion, so the manifold carries one of these.
/// The bound grows with how far each contact sits from the manifold's center and how hard it
/// pushes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwistFrictionConstraint {
    body_a: Option<BodyHandle>,
    body_b: Option<BodyHandle>,
    penetrations: [Option<PoolHandle<ContactPenetrationConstraint>>; MAXIMUM_CONTACT_COUNT],
    lever_arms: [Fix32; MAXIMUM_CONTACT_COUNT],
    accumulated_impulse: Fix32,

    axis: Vector3,
    velocity_to_impulse: Fix32,
    friction: Fix32,
    active: bool,
}

impl TwistFrictionConstraint {
    pub fn setup(&mut self, body_a: Option<BodyHandle>, body_b: Option<BodyHandle>) {
        self.body_a = body_a;
        self.body_b = body_b;
        self.penetrations = [None; MAXIMUM_CONTACT_COUNT];
        self.accumulated_impulse = Fix32::ZERO;
        self.active = false;
    }

    /// Points the constraint at the manifold's current penetration constraints. Handles beyond
    /// the manifold capacity are ignored.
    pub fn set_penetrations(&mut self, handles: impl IntoIterator<Item = PoolHandle<ContactPenetrationConstraint>>) {
        self.penetrations = [None; MAXIMUM_CONTACT_COUNT];
        for (slot, handle) in self.penetrations.iter_mut().zip(handles) {
            *slot = Some(handle);
        }
    }

    pub fn clean_up(&mut self) {
        *self = Self::default();
    }

    /// Recomputes the twist axis, lever arms and friction coefficient. Must run after the
    /// penetration constraints' updates.
    pub fn update(
        &mut self,
        bodies: &Bodies,
        penetrations: &ResourcePool<ContactPenetrationConstraint>,
        material: &InteractionProperties,
        settings: &CollisionResponseSettings,
    ) {
        let handles = self.penetrations;
        let contacts = || {
            handles
                .iter()
                .flatten()
                .filter_map(|&handle| penetrations.get(handle))
                .filter(|penetration| penetration.is_active())
                .filter_map(|penetration| penetration.contact())
        };
        let count = contacts().count() as i32;
        if count == 0 {
            self.disable();
            return;
        }

        let normal_sum = contacts().fold(Vector3::ZERO, |sum, contact| sum + contact.normal);
        let Some(axis) = normal_sum.normalize() else {
            debug!(body_a = ?self.body_a, body_b = ?self.body_b, "twist friction disabled: normals cancel out");
            self.disable();
            return;
        };
        let centroid = contacts().fold(Vector3::ZERO, |sum, contact| sum + contact.position) / Fix32::from_i32(count);

        let mut lever_arms = [Fix32::ZERO; MAXIMUM_CONTACT_COUNT];
        for (lever_arm, handle) in lever_arms.iter_mut().zip(&handles) {
            if let Some(contact) = handle
                .and_then(|handle| penetrations.get(handle))
                .filter(|penetration| penetration.is_active())
                .and_then(|penetration| penetration.contact())
            {
                *lever_arm = (contact.position - centroid).length();
            }
        }
        if lever_arms.iter().all(|lever_arm| lever_arm.is_zero()) {
            trace!(body_a = ?self.body_a, body_b = ?self.body_b, "twist friction disabled: contacts have no spread");
            self.disable();
            return;
        }

        let effective_mass_inverse = effective_mass_contribution(bodies, self.body_a, Vector3::ZERO, axis)
            + effective_mass_contribution(bodies, self.body_b, Vector3::ZERO, -axis);
        if !effective_mass_inverse.is_positive() {
            debug!(body_a = ?self.body_a, body_b = ?self.body_b, "twist friction disabled: zero effective mass");
            self.disable();
            return;
        }

        self.axis = axis;
        self.lever_arms = lever_arms;
        self.velocity_to_impulse = -(Fix32::ONE / effective_mass_inverse);
        let coefficient = if self.relative_velocity(bodies).abs() > settings.static_friction_velocity_threshold {
            material.kinetic_friction
        } else {
            material.static_friction
        };
        self.friction = coefficient * settings.twist_friction_factor;
        self.active = true;
    }

    /// Warm start, clamped to this step's bound.
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

    /// Relative angular velocity of A with respect to B about the twist axis.
    pub fn relative_velocity(&self, bodies: &Bodies) -> Fix32 {
        constraint_space_velocity(bodies, self.body_a, Vector3::ZERO, self.axis)
            + constraint_space_velocity(bodies, self.body_b, Vector3::ZERO, -self.axis)
    }

    /// `friction · Σ lever_arm[i] · penetration[i].accumulated_impulse`, from the current
    /// penetration impulses.
    pub fn maximum_impulse(&self, penetrations: &ResourcePool<ContactPenetrationConstraint>) -> Fix32 {
        let weighted: Fix32 = self
            .penetrations
            .iter()
            .zip(&self.lever_arms)
            .filter_map(|(handle, &lever_arm)| {
                handle
                    .and_then(|handle| penetrations.get(handle))
                    .map(|penetration| lever_arm * penetration.accumulated_impulse())
            })
            .sum();
        self.friction * weighted
    }

    #[inline(always)]
    fn apply(&self, bodies: &mut Bodies, impulse: Fix32) {
        apply_impulse(bodies, self.body_a, Vector3::ZERO, self.axis, impulse);
        apply_impulse(bodies, self.body_b, Vector3::ZERO, -self.axis, impulse);
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
    pub fn axis(&self) -> Vector3 {
        self.axis
    }

    #[inline(always)]
    pub fn lever_arms(&self) -> &[Fix32; MAXIMUM_CONTACT_COUNT] {
        &self.lever_arms
    }

    #[inline(always)]
    pub fn friction(&self) -> Fix32 {
        self.friction
    }

    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Poolable for TwistFrictionConstraint {
    fn is_cleaned_up(&self) -> bool {
        self.body_a.is_none()
            && self.body_b.is_none()
            && self.penetrations.iter().all(Option::is_none)
            && self.accumulated_impulse.is_zero()
            && !self.active
    }
}
