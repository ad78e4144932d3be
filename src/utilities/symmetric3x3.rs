use super::fix32::Fix32;
use super::matrix3x3::Matrix3x3;
use super::vector3::Vector3;
use core::ops::{Add, Mul, Sub};

/// Lower left triangle (including diagonal) of a symmetric 3x3 matrix.
///
/// Used for inverse inertia tensors, in both local and world space.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Symmetric3x3 {
    /// First row, first column of the matrix.
    pub xx: Fix32,
    /// Second row, first column of the matrix.
    pub yx: Fix32,
    /// Second row, second column of the matrix.
    pub yy: Fix32,
    /// Third row, first column of the matrix.
    pub zx: Fix32,
    /// Third row, second column of the matrix.
    pub zy: Fix32,
    /// Third row, third column of the matrix.
    pub zz: Fix32,
}

impl Symmetric3x3 {
    pub const ZERO: Self = Self::from_diagonal(Vector3::ZERO);

    #[inline(always)]
    pub const fn from_diagonal(diagonal: Vector3) -> Self {
        Self {
            xx: diagonal.x,
            yx: Fix32::ZERO,
            yy: diagonal.y,
            zx: Fix32::ZERO,
            zy: Fix32::ZERO,
            zz: diagonal.z,
        }
    }

    /// Computes rT * m * r for a symmetric matrix m and a rotation matrix r.
    ///
    /// With `r` built from an orientation, this carries a local inverse inertia into world space.
    pub fn rotation_sandwich(r: &Matrix3x3, m: &Self) -> Self {
        let i11 = r.x.x * m.xx + r.y.x * m.yx + r.z.x * m.zx;
        let i12 = r.x.x * m.yx + r.y.x * m.yy + r.z.x * m.zy;
        let i13 = r.x.x * m.zx + r.y.x * m.zy + r.z.x * m.zz;

        let i21 = r.x.y * m.xx + r.y.y * m.yx + r.z.y * m.zx;
        let i22 = r.x.y * m.yx + r.y.y * m.yy + r.z.y * m.zy;
        let i23 = r.x.y * m.zx + r.y.y * m.zy + r.z.y * m.zz;

        let i31 = r.x.z * m.xx + r.y.z * m.yx + r.z.z * m.zx;
        let i32 = r.x.z * m.yx + r.y.z * m.yy + r.z.z * m.zy;
        let i33 = r.x.z * m.zx + r.y.z * m.zy + r.z.z * m.zz;

        Self {
            xx: i11 * r.x.x + i12 * r.y.x + i13 * r.z.x,
            yx: i21 * r.x.x + i22 * r.y.x + i23 * r.z.x,
            yy: i21 * r.x.y + i22 * r.y.y + i23 * r.z.y,
            zx: i31 * r.x.x + i32 * r.y.x + i33 * r.z.x,
            zy: i31 * r.x.y + i32 * r.y.y + i33 * r.z.y,
            zz: i31 * r.x.z + i32 * r.y.z + i33 * r.z.z,
        }
    }

    /// Computes the determinant of a symmetric matrix.
    #[inline(always)]
    pub fn determinant(&self) -> Fix32 {
        let m11 = self.yy * self.zz - self.zy * self.zy;
        let m21 = self.zy * self.zx - self.zz * self.yx;
        let m31 = self.yx * self.zy - self.zx * self.yy;
        m11 * self.xx + m21 * self.yx + m31 * self.zx
    }

    /// Inverts the matrix, or returns `None` when it is singular at this precision.
    pub fn invert(&self) -> Option<Self> {
        let m11 = self.yy * self.zz - self.zy * self.zy;
        let m21 = self.zy * self.zx - self.zz * self.yx;
        let m31 = self.yx * self.zy - self.zx * self.yy;
        let determinant = m11 * self.xx + m21 * self.yx + m31 * self.zx;
        if determinant.is_zero() {
            return None;
        }

        let m22 = self.zz * self.xx - self.zx * self.zx;
        let m32 = self.zx * self.yx - self.xx * self.zy;
        let m33 = self.xx * self.yy - self.yx * self.yx;

        Some(Self {
            xx: m11 / determinant,
            yx: m21 / determinant,
            yy: m22 / determinant,
            zx: m31 / determinant,
            zy: m32 / determinant,
            zz: m33 / determinant,
        })
    }

    #[inline(always)]
    pub fn scale(&self, scale: Fix32) -> Self {
        Self {
            xx: self.xx * scale,
            yx: self.yx * scale,
            yy: self.yy * scale,
            zx: self.zx * scale,
            zy: self.zy * scale,
            zz: self.zz * scale,
        }
    }

    /// Transforms a vector by a symmetric matrix.
    #[inline(always)]
    pub fn transform(v: Vector3, m: &Self) -> Vector3 {
        Vector3::new(
            v.x * m.xx + v.y * m.yx + v.z * m.zx,
            v.x * m.yx + v.y * m.yy + v.z * m.zy,
            v.x * m.zx + v.y * m.zy + v.z * m.zz,
        )
    }

    /// [`Symmetric3x3::transform`] with every product rounded to nearest.
    #[inline(always)]
    pub fn rounding_transform(v: Vector3, m: &Self) -> Vector3 {
        Vector3::new(
            v.x.rounding_mul(m.xx) + v.y.rounding_mul(m.yx) + v.z.rounding_mul(m.zx),
            v.x.rounding_mul(m.yx) + v.y.rounding_mul(m.yy) + v.z.rounding_mul(m.zy),
            v.x.rounding_mul(m.zx) + v.y.rounding_mul(m.zy) + v.z.rounding_mul(m.zz),
        )
    }

    /// Computes v * m * vT, the effective inverse mass contribution of an angular jacobian.
    #[inline(always)]
    pub fn vector_sandwich(v: Vector3, m: &Self) -> Fix32 {
        Self::transform(v, m).dot(v)
    }
}

impl Add for Symmetric3x3 {
    type Output = Self;

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self {
            xx: self.xx + other.xx,
            yx: self.yx + other.yx,
            yy: self.yy + other.yy,
            zx: self.zx + other.zx,
            zy: self.zy + other.zy,
            zz: self.zz + other.zz,
        }
    }
}

impl Sub for Symmetric3x3 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Self {
            xx: self.xx - other.xx,
            yx: self.yx - other.yx,
            yy: self.yy - other.yy,
            zx: self.zx - other.zx,
            zy: self.zy - other.zy,
            zz: self.zz - other.zz,
        }
    }
}

impl Mul<Fix32> for Symmetric3x3 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, scale: Fix32) -> Self {
        self.scale(scale)
    }
}

impl std::fmt::Display for Symmetric3x3 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "x: {}, y: {}, {}, z: {}, {}, {}",
            self.xx, self.yx, self.yy, self.zx, self.zy, self.zz
        )
    }
}
