mod fix32;
mod fix32_lut;
mod fix32_math;
mod matrix3x3;
pub mod memory;
mod quaternion;
mod symmetric3x3;
pub mod thread_dispatcher;
mod vector3;

pub use self::fix32::Fix32;
pub use self::fix32_math::MathError;
pub use self::matrix3x3::Matrix3x3;
pub use self::quaternion::Quaternion;
pub use self::symmetric3x3::Symmetric3x3;
pub use self::vector3::Vector3;
