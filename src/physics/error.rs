use super::collision_detection::MAXIMUM_CONTACT_COUNT;
use super::handles::{BodyHandle, BodyPair};
use crate::utilities::memory::PoolError;
use crate::utilities::{Fix32, MathError};
use thiserror::Error;

/// Setup errors surfaced by bodies, islands and the simulation.
///
/// None of these come out of the solve itself: degenerate contact geometry disables the affected
/// constraint for a step instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Math(#[from] MathError),
    #[error("manifold {0} already holds the maximum of {MAXIMUM_CONTACT_COUNT} contacts")]
    ContactCapacity(BodyPair),
    #[error("{0} does not exist in this island")]
    InvalidBody(BodyHandle),
    #[error("dynamic body requires a positive mass, got {0}")]
    InvalidMass(Fix32),
    #[error("damping {0} outside [0, 1]")]
    InvalidDamping(Fix32),
    #[error("dynamic body {0} appears in more than one island")]
    SharedBody(u64),
}
