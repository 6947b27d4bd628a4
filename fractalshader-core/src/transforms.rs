use crate::points::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MathError {
    #[error("matrix is not invertible (determinant {determinant})")]
    SingularMatrix { determinant: f64 },
}

/// A 3x3 homogeneous matrix for 2D affine transformations.
///
/// Elements are stored column-major, the same layout the shader expects for
/// `mat3` uniforms:
///
/// ```text
/// | m[0] m[3] m[6] |
/// | m[1] m[4] m[7] |
/// | m[2] m[5] m[8] |
/// ```
///
/// The constructors below always produce a bottom row of (0, 0, 1).
/// [`Mat3::multiply`] and [`Mat3::inverse`] handle the general 3x3 case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat3 {
    pub m: [f64; 9],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    /// Wraps nine column-major values.
    pub const fn from_cols_array(m: [f64; 9]) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Translation by `offset`.
    pub fn translation(offset: Vec2) -> Self {
        Self::from_cols_array([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, offset.x, offset.y, 1.0])
    }

    /// Uniform scaling about the origin.
    pub fn scaling(scale: f64) -> Self {
        Self::from_cols_array([scale, 0.0, 0.0, 0.0, scale, 0.0, 0.0, 0.0, 1.0])
    }

    /// `translation(offset) × scaling(scale)`: scales first, then translates.
    ///
    /// This is the view transform handed to the shader, built from the pan
    /// center and zoom.
    pub fn transformation(offset: Vec2, scale: f64) -> Self {
        Self::translation(offset).multiply(&Self::scaling(scale))
    }

    #[inline]
    fn at(&self, row: usize, col: usize) -> f64 {
        self.m[col * 3 + row]
    }

    /// Matrix product `self × other`.
    ///
    /// Applied to a column vector, `other` acts first.
    pub fn multiply(&self, other: &Mat3) -> Self {
        let mut result = [0.0; 9];

        for col in 0..3 {
            for row in 0..3 {
                result[col * 3 + row] = (0..3).map(|k| self.at(row, k) * other.at(k, col)).sum();
            }
        }

        Self { m: result }
    }

    /// Transforms a point, treating it as (x, y, 1) and dropping the
    /// homogeneous component of the result.
    pub fn transform_point(&self, v: Vec2) -> Vec2 {
        let m = &self.m;
        Vec2::new(
            v.x * m[0] + v.y * m[3] + m[6],
            v.x * m[1] + v.y * m[4] + m[7],
        )
    }

    pub fn determinant(&self) -> f64 {
        let [a, d, g, b, e, h, c, f, i] = self.m;
        a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g)
    }

    /// Inverse via the adjugate.
    ///
    /// For affine matrices the determinant reduces to `a·e − b·d` of the upper
    /// 2x2 block. A zero or non-finite determinant is an error rather than a
    /// matrix full of inf/NaN.
    pub fn inverse(&self) -> Result<Self, MathError> {
        let determinant = self.determinant();
        if determinant == 0.0 || !determinant.is_finite() {
            return Err(MathError::SingularMatrix { determinant });
        }

        let [a, d, g, b, e, h, c, f, i] = self.m;
        let cofactors = [
            e * i - f * h,
            -(d * i - f * g),
            d * h - e * g,
            -(b * i - c * h),
            a * i - c * g,
            -(a * h - b * g),
            b * f - c * e,
            -(a * f - c * d),
            a * e - b * d,
        ];

        // Transposed cofactor matrix, which column-major storage gives us for free.
        Ok(Self {
            m: cofactors.map(|cofactor| cofactor / determinant),
        })
    }

    /// Bottom row is (0, 0, 1).
    pub fn is_affine(&self) -> bool {
        self.m[2] == 0.0 && self.m[5] == 0.0 && self.m[8] == 1.0
    }

    /// Narrow to single precision for upload to the GPU, keeping column-major order.
    pub fn to_f32_array(&self) -> [f32; 9] {
        self.m.map(|v| v as f32)
    }
}
