// Newtype Pattern for enhanced type safety
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyHandle(pub u32);

impl BodyHandle {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Key of the two sides of a contact manifold.
///
/// `None` stands for the immovable world. The order of `a` and `b` matters: it fixes which
/// body the contact normals point away from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BodyPair {
    pub a: Option<BodyHandle>,
    pub b: Option<BodyHandle>,
}

impl BodyPair {
    #[inline(always)]
    pub fn new(a: Option<BodyHandle>, b: Option<BodyHandle>) -> Self {
        Self { a, b }
    }
}

// Simple implementations for Display for user-friendliness
impl std::fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "BodyHandle<{}>", self.0)
    }
}

impl std::fmt::Display for BodyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let side = |handle: Option<BodyHandle>| handle.map_or_else(|| "world".to_string(), |h| h.to_string());
        write!(f, "({}, {})", side(self.a), side(self.b))
    }
}
