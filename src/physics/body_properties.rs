use std::fmt;

use super::error::SimulationError;
use crate::utilities::{Fix32, Quaternion, Symmetric3x3, Vector3};

/// Represents a rigid transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RigidPose {
    /// Orientation of the pose.
    pub orientation: Quaternion,
    /// Position of the pose.
    pub position: Vector3,
}

impl RigidPose {
    /// Returns a pose with a position at (0,0,0) and identity orientation.
    pub const IDENTITY: Self = Self {
        orientation: Quaternion::IDENTITY,
        position: Vector3::ZERO,
    };

    /// Creates a rigid pose with the given position and orientation.
    #[inline(always)]
    pub fn new(position: Vector3, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Creates a rigid pose with the given position and identity orientation.
    #[inline(always)]
    pub fn from_position(position: Vector3) -> Self {
        Self {
            position,
            orientation: Quaternion::IDENTITY,
        }
    }

    /// Transforms a vector by the rigid pose: v * pose.Orientation + pose.Position.
    #[inline(always)]
    pub fn transform(&self, v: Vector3) -> Vector3 {
        self.orientation.transform(v) + self.position
    }

    /// Transforms a vector by the inverse of a rigid pose: (v - pose.Position) * pose.Orientation^-1.
    #[inline(always)]
    pub fn transform_by_inverse(&self, v: Vector3) -> Vector3 {
        self.orientation.conjugate().transform(v - self.position)
    }
}

impl fmt::Display for RigidPose {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let o = &self.orientation;
        let p = &self.position;
        write!(
            f,
            "Position: ({}, {}, {}), Orientation: ({}, {}, {}, {})",
            p.x, p.y, p.z, o.x, o.y, o.z, o.w
        )
    }
}

/// Linear and angular velocity of a body, both in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyVelocity {
    /// Linear velocity associated with the body.
    pub linear: Vector3,
    /// Angular velocity associated with the body.
    pub angular: Vector3,
}

impl BodyVelocity {
    /// Creates a body velocity with the given linear velocity and zero angular velocity.
    #[inline(always)]
    pub fn from_linear(linear: Vector3) -> Self {
        Self {
            linear,
            angular: Vector3::ZERO,
        }
    }

    #[inline(always)]
    pub fn new(linear: Vector3, angular: Vector3) -> Self {
        Self { linear, angular }
    }
}

impl fmt::Display for BodyVelocity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (l, a) = (&self.linear, &self.angular);
        write!(f, "Linear: ({}, {}, {}), Angular: ({}, {}, {})", l.x, l.y, l.z, a.x, a.y, a.z)
    }
}

/// Stores the inertia for a body.
///
/// A zero inverse mass and zero inverse inertia describe an object that no impulse can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyInertia {
    /// Inverse of the body's inertia tensor, in the body's local space.
    pub inverse_inertia_tensor: Symmetric3x3,
    /// Inverse of the body's mass.
    pub inverse_mass: Fix32,
}

impl BodyInertia {
    /// Inertia of a solid box with the given full extents.
    pub fn from_box(mass: Fix32, width: Fix32, height: Fix32, length: Fix32) -> Result<Self, SimulationError> {
        if !mass.is_positive() {
            return Err(SimulationError::InvalidMass(mass));
        }
        // I = m/12 * (b^2 + c^2), inverted per axis.
        let inverse_mass = Fix32::ONE / mass;
        let twelve_over_mass = Fix32::from_i32(12) * inverse_mass;
        let (w2, h2, l2) = (width * width, height * height, length * length);
        Ok(Self {
            inverse_inertia_tensor: Symmetric3x3::from_diagonal(Vector3::new(
                twelve_over_mass / (h2 + l2),
                twelve_over_mass / (w2 + l2),
                twelve_over_mass / (w2 + h2),
            )),
            inverse_mass,
        })
    }

    /// Inertia of a solid sphere.
    pub fn from_sphere(mass: Fix32, radius: Fix32) -> Result<Self, SimulationError> {
        if !mass.is_positive() {
            return Err(SimulationError::InvalidMass(mass));
        }
        // I = 2/5 m r^2
        let inverse_mass = Fix32::ONE / mass;
        let inverse_inertia = Fix32::from_ratio(5, 2) * inverse_mass / (radius * radius);
        Ok(Self {
            inverse_inertia_tensor: Symmetric3x3::from_diagonal(Vector3::splat(inverse_inertia)),
            inverse_mass,
        })
    }
}

impl fmt::Display for BodyInertia {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "InverseMass: {}, InverseInertiaTensor: {}",
            self.inverse_mass, self.inverse_inertia_tensor
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_box_inertia() -> Result<(), SimulationError> {
        let inertia = BodyInertia::from_box(Fix32::from_i32(10), Fix32::ONE, Fix32::ONE, Fix32::ONE)?;
        assert_eq!(inertia.inverse_mass, Fix32::ONE / Fix32::from_i32(10));
        // 12 / (10 * 2)
        let expected = Fix32::from_f64(0.6);
        assert!((inertia.inverse_inertia_tensor.xx - expected).abs() < Fix32::from_ratio(1, 1000));
        assert_eq!(inertia.inverse_inertia_tensor.xx, inertia.inverse_inertia_tensor.zz);
        assert!(inertia.inverse_inertia_tensor.yx.is_zero());
        Ok(())
    }

    #[test]
    fn non_positive_mass_is_rejected() {
        assert_eq!(
            BodyInertia::from_sphere(Fix32::ZERO, Fix32::ONE),
            Err(SimulationError::InvalidMass(Fix32::ZERO))
        );
        assert!(BodyInertia::from_box(-Fix32::ONE, Fix32::ONE, Fix32::ONE, Fix32::ONE).is_err());
    }

    #[test]
    fn pose_inverse_transform_undoes_transform() {
        let pose = RigidPose::new(
            Vector3::from_i32(1, 2, 3),
            Quaternion::from_axis_angle(Vector3::UNIT_Y, Fix32::from_f64(0.4)),
        );
        let point = Vector3::from_i32(-2, 0, 5);
        let back = pose.transform_by_inverse(pose.transform(point));
        assert!((back - point).length() < Fix32::from_ratio(1, 500));
    }
}
