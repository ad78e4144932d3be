mod contact_common;
mod contact_manifold_constraint;
mod penetration_limit;
mod tangent_friction;
mod twist_friction;

pub use self::contact_manifold_constraint::{ContactConstraintPools, ContactManifoldConstraint};
pub use self::penetration_limit::ContactPenetrationConstraint;
pub use self::tangent_friction::ContactFrictionConstraint;
pub use self::twist_friction::TwistFrictionConstraint;
