//! Points, vectors and normals.
//!
//! The three types share the same (x, y, z) storage and most of their
//! algebra, but they are not interchangeable: points translate under a
//! transformation, vectors only scale and rotate, and normals transform by
//! the inverse transpose. Keeping them as separate types lets the compiler
//! pick the right rule in [`Transformation::transform`](crate::Transformation::transform).
//!
//! Equality is tolerance-based: two values are equal when the sum of their
//! absolute component differences is at most [`EPSILON`](crate::EPSILON).

use std::fmt;
use std::ops::{Add, AddAssign, Div, Index, Mul, Neg, Sub};

use glam::DVec3;

use crate::{MathError, MathResult, EPSILON};

/// Polar coordinates of a point or vector.
///
/// `phi` is the azimuth in `[0, 2π)`, measured in the xz plane from +X
/// towards +Z. `theta` is the polar angle in `[0, π]`, measured from +Y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Polar {
    pub r: f64,
    pub phi: f64,
    pub theta: f64,
}

impl Polar {
    fn from_xyz(v: DVec3) -> Self {
        let r = v.length();
        if r == 0.0 {
            return Self::default();
        }

        let mut phi = v.z.atan2(v.x);
        if phi < 0.0 {
            phi += std::f64::consts::TAU;
        }
        let theta = (v.y / r).clamp(-1.0, 1.0).acos();

        Self { r, phi, theta }
    }
}

#[inline]
fn approx_eq3(a: DVec3, b: DVec3) -> bool {
    (a - b).abs().element_sum() <= EPSILON
}

/// Shared constructors, accessors and comparisons for the xyz newtypes.
macro_rules! impl_xyz {
    ($name:ident) => {
        impl $name {
            pub const ZERO: Self = Self(DVec3::ZERO);

            #[inline]
            pub const fn new(x: f64, y: f64, z: f64) -> Self {
                Self(DVec3::new(x, y, z))
            }

            #[inline]
            pub fn x(&self) -> f64 {
                self.0.x
            }

            #[inline]
            pub fn y(&self) -> f64 {
                self.0.y
            }

            #[inline]
            pub fn z(&self) -> f64 {
                self.0.z
            }

            /// The raw glam storage.
            #[inline]
            pub fn to_dvec3(self) -> DVec3 {
                self.0
            }

            /// Polar coordinates relative to the origin.
            pub fn polar(&self) -> Polar {
                Polar::from_xyz(self.0)
            }
        }

        impl From<DVec3> for $name {
            #[inline]
            fn from(v: DVec3) -> Self {
                Self(v)
            }
        }

        impl From<[f64; 3]> for $name {
            #[inline]
            fn from(a: [f64; 3]) -> Self {
                Self(DVec3::from_array(a))
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                approx_eq3(self.0, other.0)
            }
        }

        impl Index<usize> for $name {
            type Output = f64;

            fn index(&self, axis: usize) -> &f64 {
                &self.0[axis]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
            }
        }
    };
}

/// A position in space.
#[derive(Debug, Clone, Copy, Default)]
pub struct Point3(DVec3);

/// A displacement or direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vector3(DVec3);

/// A surface normal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normal3(DVec3);

impl_xyz!(Point3);
impl_xyz!(Vector3);
impl_xyz!(Normal3);

impl Point3 {
    pub fn as_vector(&self) -> Vector3 {
        Vector3(self.0)
    }

    pub fn as_normal(&self) -> Normal3 {
        Normal3(self.0)
    }

    pub fn distance(&self, other: Point3) -> f64 {
        self.0.distance(other.0)
    }

    /// Component-wise minimum.
    pub fn min(&self, other: Point3) -> Point3 {
        Point3(self.0.min(other.0))
    }

    /// Component-wise maximum.
    pub fn max(&self, other: Point3) -> Point3 {
        Point3(self.0.max(other.0))
    }
}

impl Vector3 {
    pub const X: Self = Self(DVec3::X);
    pub const Y: Self = Self(DVec3::Y);
    pub const Z: Self = Self(DVec3::Z);

    #[inline]
    pub fn dot(&self, other: Vector3) -> f64 {
        self.0.dot(other.0)
    }

    #[inline]
    pub fn cross(&self, other: Vector3) -> Vector3 {
        Vector3(self.0.cross(other.0))
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.0.length()
    }

    #[inline]
    pub fn length_squared(&self) -> f64 {
        self.0.length_squared()
    }

    /// Scale to unit length. Fails on a zero-length vector.
    pub fn normalize(&self) -> MathResult<Vector3> {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            return Err(MathError::ZeroLength);
        }
        Ok(Vector3(self.0 / len))
    }

    pub fn as_point(&self) -> Point3 {
        Point3(self.0)
    }

    pub fn as_normal(&self) -> Normal3 {
        Normal3(self.0)
    }

    /// Mirror this vector about `normal`: `d - 2(d·n)n`.
    ///
    /// `normal` is expected to be unit length.
    pub fn reflect(&self, normal: Normal3) -> Vector3 {
        let n = normal.0;
        Vector3(self.0 - 2.0 * self.0.dot(n) * n)
    }
}

impl Normal3 {
    #[inline]
    pub fn dot(&self, v: Vector3) -> f64 {
        self.0.dot(v.0)
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.0.length()
    }

    /// Scale to unit length. Fails on a zero-length normal.
    pub fn normalize(&self) -> MathResult<Normal3> {
        self.as_vector().normalize().map(|v| v.as_normal())
    }

    pub fn as_vector(&self) -> Vector3 {
        Vector3(self.0)
    }

    /// Flip this normal, if needed, so that it opposes `incident`.
    pub fn face_forward(&self, incident: Vector3) -> Normal3 {
        if self.dot(incident) > 0.0 {
            -*self
        } else {
            *self
        }
    }
}

// Point algebra

impl Sub for Point3 {
    type Output = Vector3;

    fn sub(self, other: Point3) -> Vector3 {
        Vector3(self.0 - other.0)
    }
}

impl Add<Vector3> for Point3 {
    type Output = Point3;

    fn add(self, v: Vector3) -> Point3 {
        Point3(self.0 + v.0)
    }
}

impl Sub<Vector3> for Point3 {
    type Output = Point3;

    fn sub(self, v: Vector3) -> Point3 {
        Point3(self.0 - v.0)
    }
}

// Vector algebra

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, other: Vector3) -> Vector3 {
        Vector3(self.0 + other.0)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, other: Vector3) {
        self.0 += other.0;
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, other: Vector3) -> Vector3 {
        Vector3(self.0 - other.0)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3(-self.0)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, s: f64) -> Vector3 {
        Vector3(self.0 * s)
    }
}

impl Mul<Vector3> for f64 {
    type Output = Vector3;

    fn mul(self, v: Vector3) -> Vector3 {
        Vector3(self * v.0)
    }
}

impl Div<f64> for Vector3 {
    type Output = Vector3;

    fn div(self, s: f64) -> Vector3 {
        Vector3(self.0 / s)
    }
}

// Normal algebra

impl Add for Normal3 {
    type Output = Normal3;

    fn add(self, other: Normal3) -> Normal3 {
        Normal3(self.0 + other.0)
    }
}

impl Neg for Normal3 {
    type Output = Normal3;

    fn neg(self) -> Normal3 {
        Normal3(-self.0)
    }
}

impl Mul<f64> for Normal3 {
    type Output = Normal3;

    fn mul(self, s: f64) -> Normal3 {
        Normal3(self.0 * s)
    }
}

impl Mul<Normal3> for f64 {
    type Output = Normal3;

    fn mul(self, n: Normal3) -> Normal3 {
        Normal3(self * n.0)
    }
}
