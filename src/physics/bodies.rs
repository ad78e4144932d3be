use std::ops::{Index, IndexMut};

use super::body_properties::{BodyInertia, BodyVelocity, RigidPose};
use super::error::SimulationError;
use super::handles::BodyHandle;
use crate::utilities::{Fix32, Matrix3x3, Symmetric3x3, Vector3};

/// Describes a body to be added to a [`Bodies`] set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyDescription {
    /// Caller-side identity of the body, unique across every island of a simulation.
    pub id: u64,
    pub pose: RigidPose,
    pub velocity: BodyVelocity,
    /// Local inertia. Ignored for kinematic bodies.
    pub local_inertia: BodyInertia,
    /// Whether the body responds to impulses. Kinematic bodies keep their velocity.
    pub dynamic: bool,
}

impl BodyDescription {
    /// Creates a dynamic body description. The inverse mass must be positive.
    pub fn create_dynamic(
        id: u64,
        pose: RigidPose,
        velocity: BodyVelocity,
        local_inertia: BodyInertia,
    ) -> Self {
        Self {
            id,
            pose,
            velocity,
            local_inertia,
            dynamic: true,
        }
    }

    /// Creates a kinematic body description: infinite mass, moved only by its own velocity.
    pub fn create_kinematic(id: u64, pose: RigidPose, velocity: BodyVelocity) -> Self {
        Self {
            id,
            pose,
            velocity,
            local_inertia: BodyInertia::default(),
            dynamic: false,
        }
    }
}

/// A rigid body as seen by the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    id: u64,
    pub pose: RigidPose,
    pub velocity: BodyVelocity,
    local_inertia: BodyInertia,
    world_inverse_inertia: Symmetric3x3,
    dynamic: bool,
}

impl Body {
    fn new(description: &BodyDescription) -> Self {
        let mut body = Self {
            id: description.id,
            pose: description.pose,
            velocity: description.velocity,
            local_inertia: if description.dynamic {
                description.local_inertia
            } else {
                BodyInertia::default()
            },
            world_inverse_inertia: Symmetric3x3::ZERO,
            dynamic: description.dynamic,
        };
        body.update_world_inertia();
        body
    }

    #[inline(always)]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline(always)]
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Inverse mass; zero for kinematic bodies.
    #[inline(always)]
    pub fn inverse_mass(&self) -> Fix32 {
        self.local_inertia.inverse_mass
    }

    /// World space inverse inertia tensor; zero for kinematic bodies.
    #[inline(always)]
    pub fn world_inverse_inertia(&self) -> &Symmetric3x3 {
        &self.world_inverse_inertia
    }

    #[inline(always)]
    pub fn local_inertia(&self) -> &BodyInertia {
        &self.local_inertia
    }

    /// Velocity of the body's material at a world space point.
    #[inline(always)]
    pub fn velocity_at_offset(&self, offset: Vector3) -> Vector3 {
        self.velocity.linear + self.velocity.angular.cross(offset)
    }

    /// Adds `impulse * inverse_mass` to the linear velocity, rounded to nearest. Kinematic bodies
    /// ignore impulses.
    #[inline(always)]
    pub fn apply_linear_impulse(&mut self, impulse: Vector3) {
        if self.dynamic {
            self.velocity.linear += impulse.rounding_scale(self.local_inertia.inverse_mass);
        }
    }

    /// Adds the world inverse inertia applied to `impulse` to the angular velocity. Kinematic
    /// bodies ignore impulses.
    #[inline(always)]
    pub fn apply_angular_impulse(&mut self, impulse: Vector3) {
        if self.dynamic {
            self.velocity.angular += Symmetric3x3::rounding_transform(impulse, &self.world_inverse_inertia);
        }
    }

    /// Recomputes the world space inverse inertia from the current orientation.
    pub fn update_world_inertia(&mut self) {
        let rotation = Matrix3x3::from_quaternion(self.pose.orientation);
        self.world_inverse_inertia =
            Symmetric3x3::rotation_sandwich(&rotation, &self.local_inertia.inverse_inertia_tensor);
    }
}

/// The bodies owned by one solver island, addressed by [`BodyHandle`].
///
/// Bodies are only ever appended, so handles stay valid for the life of the set.
#[derive(Debug, Clone, Default)]
pub struct Bodies {
    bodies: Vec<Body>,
}

impl Bodies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a body. Dynamic bodies need a positive inverse mass.
    pub fn add(&mut self, description: &BodyDescription) -> Result<BodyHandle, SimulationError> {
        if description.dynamic && !description.local_inertia.inverse_mass.is_positive() {
            return Err(SimulationError::InvalidMass(description.local_inertia.inverse_mass));
        }
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Body::new(description));
        Ok(handle)
    }

    #[inline(always)]
    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.index())
    }

    #[inline(always)]
    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle.index())
    }

    #[inline(always)]
    pub fn contains(&self, handle: BodyHandle) -> bool {
        handle.index() < self.bodies.len()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(index, body)| (BodyHandle(index as u32), body))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.iter_mut()
    }
}

impl Index<BodyHandle> for Bodies {
    type Output = Body;

    #[inline(always)]
    fn index(&self, handle: BodyHandle) -> &Body {
        &self.bodies[handle.index()]
    }
}

impl IndexMut<BodyHandle> for Bodies {
    #[inline(always)]
    fn index_mut(&mut self, handle: BodyHandle) -> &mut Body {
        &mut self.bodies[handle.index()]
    }
}
