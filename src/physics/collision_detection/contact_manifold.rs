use crate::utilities::{Fix32, Vector3};
use std::fmt;

/// Maximum number of contacts a single manifold tracks.
pub const MAXIMUM_CONTACT_COUNT: usize = 4;

/// Information about a single contact, as produced by the narrow phase.
///
/// The solver reads contacts but never modifies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contact {
    /// World space position of the contact.
    pub position: Vector3,
    /// Unit surface normal, pointing from body A toward body B.
    pub normal: Vector3,
    /// Penetration depth between the two bodies at this contact. Negative values represent
    /// separation that is still being tracked.
    pub penetration_depth: Fix32,
    /// Id of the features involved in the collision that generated this contact. Stable across
    /// frames for the same feature pair, which is what lets accumulated impulses carry over.
    pub feature_id: u32,
}

impl Contact {
    pub fn new(position: Vector3, normal: Vector3, penetration_depth: Fix32, feature_id: u32) -> Self {
        Self {
            position,
            normal,
            penetration_depth,
            feature_id,
        }
    }

    #[inline(always)]
    pub fn is_separated(&self) -> bool {
        self.penetration_depth.is_negative()
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (p, n) = (&self.position, &self.normal);
        write!(
            f,
            "Contact #{}: position ({}, {}, {}), normal ({}, {}, {}), depth {}",
            self.feature_id, p.x, p.y, p.z, n.x, n.y, n.z, self.penetration_depth
        )
    }
}
