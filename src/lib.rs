//! Deterministic rigid-body contact physics on Q16.16 fixed-point arithmetic.
//!
//! Every quantity the solver touches is a [`Fix32`](utilities::Fix32), so identical inputs
//! produce bit-identical outputs on every platform. The crate is split the same way the
//! solver is layered:
//!
//! * [`utilities`]: the fixed-point kernel, its elementary functions, the small linear algebra
//!   layer built on it, resource pools and thread dispatch.
//! * [`physics`]: bodies, materials, the contact constraints, solver islands and the simulation
//!   driver that strings velocity integration, solving and pose integration together.

pub mod physics;
pub mod utilities;
