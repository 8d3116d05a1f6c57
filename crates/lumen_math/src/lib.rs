//! Lumen math kernel.
//!
//! Value types for the ray tracer: points, vectors and normals with
//! distinct transformation rules, cached-inverse 4x4 matrices, composable
//! transformations, rays, bounding boxes and a closed-form polynomial
//! root solver.
//!
//! Storage and arithmetic are backed by glam's f64 types, which are
//! re-exported for convenience.

pub use glam::{DMat4, DVec2, DVec3, DVec4};

mod aabb;
mod error;
mod interval;
mod matrix;
mod ray;
pub mod solver;
mod transform;
mod tuple;

pub use aabb::BoundingBox;
pub use error::{MathError, MathResult};
pub use interval::Interval;
pub use matrix::Matrix;
pub use ray::Ray;
pub use solver::{Solver, SolverError, SolverResult};
pub use transform::{Transformable, Transformation, DEFAULT_FAR, DEFAULT_NEAR};
pub use tuple::{Normal3, Point3, Polar, Vector3};

/// Tolerance used for approximate equality of points, vectors and matrices.
pub const EPSILON: f64 = 1e-10;

pub const INV_PI: f64 = std::f64::consts::FRAC_1_PI;
pub const INV_TWO_PI: f64 = 0.5 * std::f64::consts::FRAC_1_PI;

/// Compare two scalars with the kernel tolerance.
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}
