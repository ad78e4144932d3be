//! Contact data handed over by the narrow phase.

mod contact_manifold;

pub use contact_manifold::{Contact, MAXIMUM_CONTACT_COUNT};
