pub mod bodies;
pub mod body_properties;
pub mod collision_detection;
pub mod constraints;
mod error;
pub mod handles;
pub mod island;
pub mod materials;
pub mod pose_integrator;
pub mod simulation;
pub mod solver;

pub use self::bodies::{Bodies, Body, BodyDescription};
pub use self::body_properties::{BodyInertia, BodyVelocity, RigidPose};
pub use self::collision_detection::{Contact, MAXIMUM_CONTACT_COUNT};
pub use self::constraints::CollisionResponseSettings;
pub use self::error::SimulationError;
pub use self::handles::{BodyHandle, BodyPair};
pub use self::island::SolverIsland;
pub use self::materials::{InteractionProperties, Material, MaterialBlender};
pub use self::pose_integrator::PoseIntegrator;
pub use self::simulation::{check_island_disjointness, Simulation};
pub use self::solver::{SolveStats, Solver, SolverSettings};
