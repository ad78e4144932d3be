use crate::utilities::Fix32;

/// Surface properties of one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// Friction coefficient used while the contact is not sliding.
    pub static_friction: Fix32,
    /// Friction coefficient used while the contact slides.
    pub kinetic_friction: Fix32,
    /// Fraction of the closing velocity that is returned as separating velocity.
    pub bounciness: Fix32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            static_friction: Fix32::from_f64(0.6),
            kinetic_friction: Fix32::from_f64(0.3),
            bounciness: Fix32::ZERO,
        }
    }
}

impl Material {
    pub fn new(static_friction: Fix32, kinetic_friction: Fix32, bounciness: Fix32) -> Self {
        Self {
            static_friction,
            kinetic_friction,
            bounciness,
        }
    }
}

/// Friction and bounciness of a particular pair of materials in contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InteractionProperties {
    pub static_friction: Fix32,
    pub kinetic_friction: Fix32,
    pub bounciness: Fix32,
}

impl Default for InteractionProperties {
    fn default() -> Self {
        let material = Material::default();
        Self {
            static_friction: material.static_friction,
            kinetic_friction: material.kinetic_friction,
            bounciness: material.bounciness,
        }
    }
}

/// Combines the materials of the two sides of a contact.
pub type MaterialBlender = fn(&Material, &Material) -> InteractionProperties;

/// Multiplies each coefficient of the two materials.
pub fn blend_multiplicative(a: &Material, b: &Material) -> InteractionProperties {
    InteractionProperties {
        static_friction: a.static_friction * b.static_friction,
        kinetic_friction: a.kinetic_friction * b.kinetic_friction,
        bounciness: a.bounciness * b.bounciness,
    }
}

/// Averages each coefficient of the two materials.
pub fn blend_average(a: &Material, b: &Material) -> InteractionProperties {
    InteractionProperties {
        static_friction: (a.static_friction + b.static_friction) * Fix32::HALF,
        kinetic_friction: (a.kinetic_friction + b.kinetic_friction) * Fix32::HALF,
        bounciness: (a.bounciness + b.bounciness) * Fix32::HALF,
    }
}
