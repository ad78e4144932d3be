use super::bodies::Bodies;
use super::error::SimulationError;
use crate::utilities::{Fix32, MathError, Vector3};

/// Integrates velocities by gravity and damping, and poses by velocities.
///
/// Kinematic bodies keep their velocity; only their pose advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseIntegrator {
    pub gravity: Vector3,
    linear_damping: Fix32,
    angular_damping: Fix32,
}

impl Default for PoseIntegrator {
    fn default() -> Self {
        Self {
            gravity: Vector3::new(Fix32::ZERO, Fix32::from_ratio(-981, 100), Fix32::ZERO),
            linear_damping: Fix32::from_ratio(3, 100),
            angular_damping: Fix32::from_ratio(15, 100),
        }
    }
}

impl PoseIntegrator {
    /// Damping values are the fraction of velocity removed per second and must lie in [0, 1].
    pub fn new(gravity: Vector3, linear_damping: Fix32, angular_damping: Fix32) -> Result<Self, SimulationError> {
        Ok(Self {
            gravity,
            linear_damping: Self::validate_damping(linear_damping)?,
            angular_damping: Self::validate_damping(angular_damping)?,
        })
    }

    fn validate_damping(damping: Fix32) -> Result<Fix32, SimulationError> {
        if damping < Fix32::ZERO || damping > Fix32::ONE {
            return Err(SimulationError::InvalidDamping(damping));
        }
        Ok(damping)
    }

    #[inline(always)]
    pub fn linear_damping(&self) -> Fix32 {
        self.linear_damping
    }

    #[inline(always)]
    pub fn angular_damping(&self) -> Fix32 {
        self.angular_damping
    }

    pub fn set_linear_damping(&mut self, damping: Fix32) -> Result<(), SimulationError> {
        self.linear_damping = Self::validate_damping(damping)?;
        Ok(())
    }

    pub fn set_angular_damping(&mut self, damping: Fix32) -> Result<(), SimulationError> {
        self.angular_damping = Self::validate_damping(damping)?;
        Ok(())
    }

    /// `(1 - damping)^dt`: the velocity scale for one step.
    fn damping_factor(damping: Fix32, dt: Fix32) -> Result<Fix32, MathError> {
        (Fix32::ONE - damping).pow(dt)
    }

    /// Applies gravity and damping to every dynamic body.
    pub fn integrate_velocities(&self, bodies: &mut Bodies, dt: Fix32) -> Result<(), SimulationError> {
        let linear_factor = Self::damping_factor(self.linear_damping, dt)?;
        let angular_factor = Self::damping_factor(self.angular_damping, dt)?;
        let gravity_step = self.gravity * dt;
        for body in bodies.iter_mut().filter(|body| body.is_dynamic()) {
            body.velocity.linear = (body.velocity.linear + gravity_step) * linear_factor;
            body.velocity.angular = body.velocity.angular * angular_factor;
        }
        Ok(())
    }

    /// Advances every pose by its velocity and refreshes world space inertia.
    pub fn integrate_poses(&self, bodies: &mut Bodies, dt: Fix32) {
        for body in bodies.iter_mut() {
            body.pose.position += body.velocity.linear * dt;
            body.pose.orientation = body.pose.orientation.integrate(body.velocity.angular, dt);
            if body.is_dynamic() {
                body.update_world_inertia();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::bodies::BodyDescription;
    use crate::physics::body_properties::{BodyInertia, BodyVelocity, RigidPose};

    fn dt() -> Fix32 {
        Fix32::ONE / Fix32::from_i32(60)
    }

    #[test]
    fn out_of_range_damping_is_rejected() {
        let gravity = PoseIntegrator::default().gravity;
        assert_eq!(
            PoseIntegrator::new(gravity, Fix32::from_ratio(3, 2), Fix32::ZERO),
            Err(SimulationError::InvalidDamping(Fix32::from_ratio(3, 2)))
        );
        let mut integrator = PoseIntegrator::default();
        assert!(integrator.set_angular_damping(-Fix32::ONE).is_err());
        assert_eq!(integrator.angular_damping(), Fix32::from_ratio(15, 100));
    }

    #[test]
    fn free_fall_matches_gravity() -> Result<(), SimulationError> {
        let mut bodies = Bodies::new();
        let inertia = BodyInertia::from_sphere(Fix32::ONE, Fix32::ONE)?;
        let ball = bodies.add(&BodyDescription::create_dynamic(
            0,
            RigidPose::IDENTITY,
            BodyVelocity::default(),
            inertia,
        ))?;
        let integrator = PoseIntegrator::new(PoseIntegrator::default().gravity, Fix32::ZERO, Fix32::ZERO)?;
        for _ in 0..60 {
            integrator.integrate_velocities(&mut bodies, dt())?;
            integrator.integrate_poses(&mut bodies, dt());
        }
        // One second of semi-implicit Euler: v = -9.81, y = -9.81 * (61 / 120).
        let body = &bodies[ball];
        assert!((body.velocity.linear.y + Fix32::from_f64(9.81)).abs() < Fix32::from_ratio(1, 20));
        assert!((body.pose.position.y + Fix32::from_f64(4.987)).abs() < Fix32::from_ratio(1, 20));
        Ok(())
    }

    #[test]
    fn damping_and_spin() -> Result<(), SimulationError> {
        let mut bodies = Bodies::new();
        let inertia = BodyInertia::from_box(Fix32::ONE, Fix32::ONE, Fix32::ONE, Fix32::ONE)?;
        let spinner = bodies.add(&BodyDescription::create_dynamic(
            0,
            RigidPose::IDENTITY,
            BodyVelocity::new(Vector3::ZERO, Vector3::from_i32(0, 1, 0)),
            inertia,
        ))?;
        let platform = bodies.add(&BodyDescription::create_kinematic(
            1,
            RigidPose::IDENTITY,
            BodyVelocity::from_linear(Vector3::from_i32(1, 0, 0)),
        ))?;
        let integrator = PoseIntegrator::new(Vector3::ZERO, Fix32::ZERO, Fix32::HALF)?;
        for _ in 0..60 {
            integrator.integrate_velocities(&mut bodies, dt())?;
            integrator.integrate_poses(&mut bodies, dt());
        }
        // Half the angular velocity is gone after one second.
        let spin = bodies[spinner].velocity.angular.y;
        assert!((spin - Fix32::HALF).abs() < Fix32::from_ratio(1, 50));
        assert!(bodies[spinner].pose.orientation.y.is_positive());
        // Kinematic bodies move but keep their velocity.
        assert_eq!(bodies[platform].velocity.linear, Vector3::from_i32(1, 0, 0));
        assert!((bodies[platform].pose.position.x - Fix32::ONE).abs() < Fix32::from_ratio(1, 50));
        Ok(())
    }
}
