use super::fix32::Fix32;
use super::quaternion::Quaternion;
use super::vector3::Vector3;

/// 3 row, 3 column matrix. Vectors are treated as rows: `v * M`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Matrix3x3 {
    /// First row of the matrix.
    pub x: Vector3,
    /// Second row of the matrix.
    pub y: Vector3,
    /// Third row of the matrix.
    pub z: Vector3,
}

impl Matrix3x3 {
    /// The 3x3 identity matrix.
    pub const IDENTITY: Self = Self {
        x: Vector3::UNIT_X,
        y: Vector3::UNIT_Y,
        z: Vector3::UNIT_Z,
    };

    /// Builds the rotation matrix of a unit quaternion. The rows are the rotated basis vectors.
    pub fn from_quaternion(q: Quaternion) -> Self {
        let qx2 = q.x + q.x;
        let qy2 = q.y + q.y;
        let qz2 = q.z + q.z;
        let xx = qx2 * q.x;
        let yy = qy2 * q.y;
        let zz = qz2 * q.z;
        let xy = qx2 * q.y;
        let xz = qx2 * q.z;
        let xw = qx2 * q.w;
        let yz = qy2 * q.z;
        let yw = qy2 * q.w;
        let zw = qz2 * q.w;

        Self {
            x: Vector3::new(Fix32::ONE - yy - zz, xy + zw, xz - yw),
            y: Vector3::new(xy - zw, Fix32::ONE - xx - zz, yz + xw),
            z: Vector3::new(xz + yw, yz - xw, Fix32::ONE - xx - yy),
        }
    }

    /// Transforms the vector by the matrix.
    #[inline(always)]
    pub fn transform(&self, v: Vector3) -> Vector3 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    /// Transforms the vector by the matrix's transpose.
    #[inline(always)]
    pub fn transform_transpose(&self, v: Vector3) -> Vector3 {
        Vector3::new(v.dot(self.x), v.dot(self.y), v.dot(self.z))
    }

    pub fn transpose(&self) -> Self {
        Self {
            x: Vector3::new(self.x.x, self.y.x, self.z.x),
            y: Vector3::new(self.x.y, self.y.y, self.z.y),
            z: Vector3::new(self.x.z, self.y.z, self.z.z),
        }
    }
}
