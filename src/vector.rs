use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::util::{to_degrees, to_radians};

/// 2D vector value. Every operation returns a fresh value.
///
/// Equality is exact: no epsilon, and a NaN component never equals anything.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    /// Point at `radius` along `angle` degrees.
    pub fn from_polar(radius: f64, angle: f64) -> Self {
        let theta = to_radians(angle);
        Vector2D::new(theta.cos() * radius, theta.sin() * radius)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x - other.x, self.y - other.y)
    }

    /// Componentwise product. See [`Vector2D::dot`] for the scalar product.
    pub fn scale(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x * other.x, self.y * other.y)
    }

    pub fn dot(&self, other: Vector2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Multiplies the two vectors as complex numbers `x + yi`.
    pub fn complex_multiply(&self, other: Vector2D) -> Self {
        Vector2D::new(
            self.x * other.x - self.y * other.y,
            self.x * other.y + other.x * self.y,
        )
    }

    pub fn scalar_mult(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn scalar_div(&self, scalar: f64) -> Self {
        Vector2D::new(self.x / scalar, self.y / scalar)
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction. The zero vector is returned as is.
    pub fn normalize(&self) -> Self {
        if self.x == 0.0 && self.y == 0.0 {
            *self
        } else {
            self.scalar_div(self.magnitude())
        }
    }

    /// Direction in degrees, in `(-180, 180]`.
    pub fn angle(&self) -> f64 {
        to_degrees(self.y.atan2(self.x))
    }

    pub fn distance(&self, other: Vector2D) -> f64 {
        self.subtract(other).magnitude()
    }

    /// Manhattan distance.
    pub fn grid_distance(&self, other: Vector2D) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Rotates about `pivot` by `angle` degrees. With y pointing down this
    /// turns clockwise on screen.
    pub fn rotate(&self, pivot: Vector2D, angle: f64) -> Self {
        let theta = to_radians(angle);
        let (sin, cos) = theta.sin_cos();
        let dx = self.x - pivot.x;
        let dy = self.y - pivot.y;
        Vector2D::new(
            pivot.x + dx * cos - dy * sin,
            pivot.y + dx * sin + dy * cos,
        )
    }

    pub fn equals(&self, other: Vector2D) -> bool {
        self == &other
    }
}

impl fmt::Display for Vector2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Vector2D {
    type Output = Vector2D;

    fn add(self, rhs: Vector2D) -> Vector2D {
        Vector2D::add(&self, rhs)
    }
}

impl Sub for Vector2D {
    type Output = Vector2D;

    fn sub(self, rhs: Vector2D) -> Vector2D {
        self.subtract(rhs)
    }
}

impl Neg for Vector2D {
    type Output = Vector2D;

    fn neg(self) -> Vector2D {
        Vector2D::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vector2D {
    type Output = Vector2D;

    fn mul(self, rhs: f64) -> Vector2D {
        self.scalar_mult(rhs)
    }
}

impl Div<f64> for Vector2D {
    type Output = Vector2D;

    fn div(self, rhs: f64) -> Vector2D {
        self.scalar_div(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn componentwise_operations() {
        let a = Vector2D::new(3.0, -2.0);
        let b = Vector2D::new(0.5, 4.0);
        assert_eq!(a.add(b), Vector2D::new(3.5, 2.0));
        assert_eq!(a.subtract(b), Vector2D::new(2.5, -6.0));
        assert_eq!(a.scale(b), Vector2D::new(1.5, -8.0));
        assert_eq!(a.dot(b), -6.5);
        assert_eq!(a + b, a.add(b));
        assert_eq!(a - b, a.subtract(b));
        assert_eq!(-a, Vector2D::new(-3.0, 2.0));
        assert_eq!(a * 2.0, Vector2D::new(6.0, -4.0));
        assert_eq!(a / 2.0, Vector2D::new(1.5, -1.0));
    }

    #[test]
    fn complex_multiply_squares_i_to_minus_one() {
        let i = Vector2D::new(0.0, 1.0);
        assert_eq!(i.complex_multiply(i), Vector2D::new(-1.0, 0.0));
        let a = Vector2D::new(1.0, 2.0);
        let b = Vector2D::new(3.0, 4.0);
        assert_eq!(a.complex_multiply(b), Vector2D::new(-5.0, 10.0));
    }

    #[test]
    fn scalar_div_by_zero_yields_ieee_values() {
        let v = Vector2D::new(1.0, 0.0).scalar_div(0.0);
        assert_eq!(v.x, f64::INFINITY);
        assert!(v.y.is_nan());
    }

    #[test]
    fn normalize_keeps_zero_vector() {
        assert_eq!(Vector2D::ZERO.normalize(), Vector2D::ZERO);
        let n = Vector2D::new(3.0, 4.0).normalize();
        assert_eq!(n, Vector2D::new(0.6, 0.8));
    }

    #[test]
    fn angle_is_in_degrees() {
        assert_eq!(Vector2D::new(1.0, 0.0).angle(), 0.0);
        assert_abs_diff_eq!(Vector2D::new(0.0, 1.0).angle(), 90.0);
        assert_abs_diff_eq!(Vector2D::new(-1.0, 0.0).angle(), 180.0);
        assert_abs_diff_eq!(Vector2D::new(0.0, -2.0).angle(), -90.0);
    }

    #[test]
    fn from_polar_points_along_angle() {
        let v = Vector2D::from_polar(2.0, 90.0);
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn distances() {
        let a = Vector2D::new(1.0, 1.0);
        let b = Vector2D::new(4.0, 5.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.grid_distance(b), 7.0);
        assert_eq!(b.grid_distance(a), 7.0);
    }

    #[test]
    fn rotate_quarter_turn_about_pivot() {
        let pivot = Vector2D::new(1.0, 1.0);
        let r = Vector2D::new(2.0, 1.0).rotate(pivot, 90.0);
        assert_abs_diff_eq!(r.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn equality_is_exact_and_rejects_nan() {
        assert!(Vector2D::new(0.1, 0.2).equals(Vector2D::new(0.1, 0.2)));
        assert!(!Vector2D::new(0.1 + 0.2, 0.0).equals(Vector2D::new(0.3, 0.0)));
        let nan = Vector2D::new(f64::NAN, 1.0);
        assert!(!nan.equals(nan));
    }

    #[test]
    fn formats_with_comma_space() {
        assert_eq!(Vector2D::new(1.0, -2.5).to_string(), "(1, -2.5)");
    }
}
