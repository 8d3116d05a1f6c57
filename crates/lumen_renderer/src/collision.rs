use glam::DVec2;
use lumen_math::{Normal3, Point3, Ray};

use crate::Shape;

/// Record of a ray/shape intersection, in world space.
#[derive(Debug, Clone, Copy)]
pub struct Collision<'a> {
    /// The ray that produced the hit
    pub ray: Ray,
    /// The shape that was hit
    pub shape: &'a Shape,
    /// Ray parameter of the hit
    pub distance: f64,
    pub point: Point3,
    /// Unit surface normal, facing against the ray
    pub normal: Normal3,
    /// Surface coordinates in the shape's local parameterization
    pub uv: DVec2,
}
