//! Geometric primitives.
//!
//! Every primitive is defined in a canonical object space (unit sphere,
//! y = 0 plane, triangle in its own coordinates) and placed in the world by
//! an object-to-world [`Transformation`]. Intersection runs in object space:
//! the world ray is mapped through the inverse transform, solved against the
//! canonical form, and the hit is mapped back.

mod plane;
mod sphere;
mod triangle;

pub use plane::Plane;
pub use sphere::Sphere;
pub use triangle::{Triangle, TriangleNormals};

use glam::DVec2;
use lumen_math::{BoundingBox, MathError, Normal3, Point3, Ray, Transformation};
use thiserror::Error;

use crate::{Collision, Shader};

/// Errors raised while constructing shapes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("shape needs a degree {expected} solver, got degree {actual}")]
    SolverDegree { expected: usize, actual: usize },

    #[error("triangle vertices are collinear")]
    DegenerateTriangle,

    #[error("invalid angular range: {0}")]
    InvalidRange(String),

    #[error(transparent)]
    Math(#[from] MathError),
}

pub type ShapeResult<T> = Result<T, ShapeError>;

/// A hit found by a primitive, before it is tied to a [`Shape`].
#[derive(Debug, Clone, Copy)]
pub struct SurfaceHit {
    pub distance: f64,
    pub point: Point3,
    pub normal: Normal3,
    pub uv: DVec2,
}

/// Capability shared by all primitives.
pub trait Intersect {
    /// World-space bounds, computed at construction.
    fn bounding_box(&self) -> BoundingBox;

    /// Nearest hit within the ray's parametric interval.
    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit>;
}

/// A primitive placed in the scene.
#[derive(Debug, Clone)]
pub enum Shape {
    Sphere(Sphere),
    Plane(Plane),
    Triangle(Triangle),
}

impl Shape {
    pub fn shader(&self) -> &Shader {
        match self {
            Shape::Sphere(s) => s.shader(),
            Shape::Plane(p) => p.shader(),
            Shape::Triangle(t) => t.shader(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Sphere(_) => "sphere",
            Shape::Plane(_) => "plane",
            Shape::Triangle(_) => "triangle",
        }
    }

    fn primitive(&self) -> &dyn Intersect {
        match self {
            Shape::Sphere(s) => s,
            Shape::Plane(p) => p,
            Shape::Triangle(t) => t,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.primitive().bounding_box()
    }

    /// Exact intersection test, without the bounding-box pre-test.
    pub fn intersect(&self, ray: &Ray) -> Option<Collision<'_>> {
        let hit = self.primitive().intersect(ray)?;
        Some(Collision {
            ray: *ray,
            shape: self,
            distance: hit.distance,
            point: hit.point,
            normal: hit.normal,
            uv: hit.uv,
        })
    }
}

impl From<Sphere> for Shape {
    fn from(s: Sphere) -> Self {
        Shape::Sphere(s)
    }
}

impl From<Plane> for Shape {
    fn from(p: Plane) -> Self {
        Shape::Plane(p)
    }
}

impl From<Triangle> for Shape {
    fn from(t: Triangle) -> Self {
        Shape::Triangle(t)
    }
}

/// A hit in object space, as produced by the canonical solvers.
struct LocalHit {
    distance: f64,
    point: Point3,
    normal: Normal3,
    uv: DVec2,
}

/// Map an object-space hit back to world space.
///
/// The ray parameter is shared by both spaces because the object ray's
/// direction is the linear image of the world direction. The normal is
/// re-normalized and flipped to face against `world_ray`.
fn to_world(transform: &Transformation, world_ray: &Ray, local: LocalHit) -> Option<SurfaceHit> {
    let normal = transform
        .transform(local.normal)
        .normalize()
        .ok()?
        .face_forward(world_ray.direction());

    Some(SurfaceHit {
        distance: local.distance,
        point: transform.transform(local.point),
        normal,
        uv: local.uv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::solver::QuadraticSolver;
    use lumen_math::{Point3, Vector3};
    use std::sync::Arc;

    #[test]
    fn test_shape_dispatch() {
        let sphere = Sphere::new(
            Transformation::IDENTITY,
            Shader::default(),
            Arc::new(QuadraticSolver),
        )
        .unwrap();
        let shape = Shape::from(sphere);
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::Z);

        let hit = shape.intersect(&ray).unwrap();
        assert_eq!(shape.kind(), "sphere");
        assert!(std::ptr::eq(hit.shape, &shape));
        assert!((hit.distance - 4.0).abs() < 1e-9);
    }
}
