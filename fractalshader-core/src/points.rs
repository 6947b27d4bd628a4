use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// A 2D vector of `f64` components.
///
/// Value type: every operation returns a new vector. Keeping components finite
/// is the caller's responsibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise multiply by a scalar.
    pub fn scale(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }

    /// Sum of squared components. Avoids the square root on hot paths.
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Narrow to single precision for upload to the GPU.
    pub fn to_f32_array(self) -> [f32; 2] {
        [self.x as f32, self.y as f32]
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Div for Vec2 {
    type Output = Vec2;

    /// Division by a zero component follows IEEE float semantics (inf/NaN).
    fn div(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x / rhs.x, self.y / rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        self.scale(rhs)
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_add() {
        let sum = Vec2::new(1.0, 2.0) + Vec2::new(3.0, 4.0);
        assert_eq!(sum, Vec2::new(4.0, 6.0));
    }

    #[test]
    fn test_vec2_sub() {
        let diff = Vec2::new(4.0, 6.0) - Vec2::new(3.0, 4.0);
        assert_eq!(diff, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_vec2_mul_component_wise() {
        let product = Vec2::new(2.0, 3.0) * Vec2::new(4.0, -1.0);
        assert_eq!(product, Vec2::new(8.0, -3.0));
    }

    #[test]
    fn test_vec2_div_component_wise() {
        let quotient = Vec2::new(8.0, 3.0) / Vec2::new(4.0, 2.0);
        assert_eq!(quotient, Vec2::new(2.0, 1.5));
    }

    #[test]
    fn test_vec2_div_by_zero_is_not_an_error() {
        let quotient = Vec2::new(1.0, 0.0) / Vec2::new(0.0, 0.0);
        assert!(quotient.x.is_infinite());
        assert!(quotient.y.is_nan());
        assert!(!quotient.is_finite());
    }

    #[test]
    fn test_vec2_scale() {
        assert_eq!(Vec2::new(2.0, 3.0).scale(2.0), Vec2::new(4.0, 6.0));
        assert_eq!(Vec2::new(2.0, 3.0) * 2.0, Vec2::new(4.0, 6.0));
    }

    #[test]
    fn test_vec2_length_squared() {
        assert_eq!(Vec2::new(3.0, 4.0).length_squared(), 25.0);
    }

    #[test]
    fn test_vec2_length() {
        assert_eq!(Vec2::new(3.0, 4.0).length(), 5.0);
        assert_eq!(Vec2::new(-3.0, -4.0).length(), 5.0);
        assert_eq!(Vec2::ZERO.length(), 0.0);
    }

    #[test]
    fn test_vec2_operations_do_not_mutate_operands() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 4.0);
        let _ = a + b;
        let _ = a.scale(10.0);
        assert_eq!(a, Vec2::new(1.0, 2.0));
        assert_eq!(b, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_vec2_to_f32_array() {
        assert_eq!(Vec2::new(0.1, -0.2).to_f32_array(), [0.1_f32, -0.2_f32]);
    }
}
