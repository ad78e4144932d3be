use crate::utilities::Fix32;

/// Tuning of how contacts push bodies apart and how friction engages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct CollisionResponseSettings {
    /// Upper bound on the separating speed used to resolve penetration.
    pub maximum_penetration_recovery_speed: Fix32,
    /// Fraction of the excess penetration corrected per second of simulated time, times `dt`.
    pub penetration_recovery_stiffness: Fix32,
    /// Penetration depth that is left alone, so resting contacts stay in contact.
    pub allowed_penetration: Fix32,
    /// Closing speed at which bounciness applies in full. The ramp starts at 30% of it.
    pub bounciness_velocity_threshold: Fix32,
    /// Sliding speed above which kinetic friction replaces static friction.
    pub static_friction_velocity_threshold: Fix32,
    /// Constraint force mixing constant. Scaled by each constraint's effective mass inverse, so
    /// heavy and light bodies sink equally.
    pub softness: Fix32,
    /// Multiplier on the friction coefficient resisting twist about the contact normal.
    pub twist_friction_factor: Fix32,
}

impl Default for CollisionResponseSettings {
    fn default() -> Self {
        Self {
            maximum_penetration_recovery_speed: Fix32::TWO,
            penetration_recovery_stiffness: Fix32::from_ratio(1, 5),
            allowed_penetration: Fix32::from_ratio(1, 100),
            bounciness_velocity_threshold: Fix32::ONE,
            static_friction_velocity_threshold: Fix32::from_ratio(1, 5),
            softness: Fix32::from_ratio(1, 1000),
            twist_friction_factor: Fix32::ONE,
        }
    }
}

impl CollisionResponseSettings {
    /// Start of the bounciness ramp, as a fraction of the full threshold.
    pub(crate) fn bounciness_low_threshold(&self) -> Fix32 {
        self.bounciness_velocity_threshold * Fix32::from_ratio(3, 10)
    }
}
