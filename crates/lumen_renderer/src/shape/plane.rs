use glam::DVec2;
use lumen_math::{BoundingBox, Normal3, Point3, Ray, Transformation, Vector3, EPSILON};

use super::{to_world, Intersect, LocalHit, ShapeResult, SurfaceHit};
use crate::Shader;

/// An infinite plane: y = 0 with normal +Y in object space.
#[derive(Debug, Clone)]
pub struct Plane {
    transform: Transformation,
    shader: Shader,
}

impl Plane {
    pub fn new(transform: Transformation, shader: Shader) -> Self {
        Self { transform, shader }
    }

    /// Plane through `point` with the given `normal`.
    pub fn from_point_normal(point: Point3, normal: Normal3, shader: Shader) -> ShapeResult<Self> {
        let n = normal.as_vector().normalize()?;
        let cos = n.dot(Vector3::Y).clamp(-1.0, 1.0);

        let rotation = if (cos - 1.0).abs() < EPSILON {
            Transformation::IDENTITY
        } else if (cos + 1.0).abs() < EPSILON {
            Transformation::rotate_x(std::f64::consts::PI)
        } else {
            Transformation::rotate(cos.acos(), Vector3::Y.cross(n))?
        };

        let transform = Transformation::translate(point.as_vector()).mul(&rotation);
        Ok(Self::new(transform, shader))
    }

    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    pub fn transform(&self) -> &Transformation {
        &self.transform
    }
}

impl Intersect for Plane {
    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::INFINITE
    }

    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let local_ray = self.transform.transform_inverse(*ray);
        let origin = local_ray.origin();

        // t = ((p0 - o) · n) / (d · n) with p0 = 0, n = +Y
        let numerator = -origin.y();
        let denominator = local_ray.direction().y();

        let t = if denominator.abs() < EPSILON {
            if numerator.abs() < EPSILON {
                // The ray runs inside the plane: it touches it everywhere.
                local_ray.t_min()
            } else {
                return None;
            }
        } else {
            let t = numerator / denominator;
            if !local_ray.interval().contains(t) {
                return None;
            }
            t
        };

        let point = local_ray.at(t);
        let local = LocalHit {
            distance: t,
            point,
            normal: Normal3::new(0.0, 1.0, 0.0),
            uv: DVec2::new(point.x(), point.z()),
        };
        to_world(&self.transform, ray, local)
    }
}
