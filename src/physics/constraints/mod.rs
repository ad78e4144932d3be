mod collision_response_settings;
pub mod contact;

pub use self::collision_response_settings::CollisionResponseSettings;
