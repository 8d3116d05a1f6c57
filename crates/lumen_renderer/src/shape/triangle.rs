//! Triangle primitive.
//!
//! Intersection solves `o + t d = v0 + β (v1 - v0) + γ (v2 - v0)` with
//! Cramer's rule. Shading normals are either the flat face normal or the
//! barycentric blend of three vertex normals.

use glam::DVec2;
use lumen_math::{BoundingBox, Normal3, Point3, Ray, Transformation, Vector3};

use super::{to_world, Intersect, LocalHit, ShapeError, ShapeResult, SurfaceHit};
use crate::Shader;

/// Determinants below this mean the ray runs parallel to the triangle.
const PARALLEL_TOLERANCE: f64 = 1e-12;

/// Blended vertex normals shorter than this fall back to the face normal.
const MIN_BLEND_LENGTH: f64 = 1e-6;

/// How a triangle's shading normal is obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriangleNormals {
    /// Geometric normal, `(v1 - v0) × (v2 - v0)`.
    Flat,
    /// Per-vertex normals interpolated across the face.
    Smooth([Normal3; 3]),
}

#[derive(Debug, Clone)]
pub struct Triangle {
    transform: Transformation,
    shader: Shader,
    vertices: [Point3; 3],
    face_normal: Normal3,
    normals: TriangleNormals,
    uvs: [DVec2; 3],
    bbox: BoundingBox,
}

impl Triangle {
    /// Default per-vertex surface coordinates.
    pub const DEFAULT_UVS: [DVec2; 3] = [DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(1.0, 1.0)];

    /// Create a flat-shaded triangle. Fails if the vertices are collinear.
    pub fn new(transform: Transformation, shader: Shader, vertices: [Point3; 3]) -> ShapeResult<Self> {
        let [v0, v1, v2] = vertices;
        let face_normal = (v1 - v0)
            .cross(v2 - v0)
            .normalize()
            .map_err(|_| ShapeError::DegenerateTriangle)?
            .as_normal();

        let bbox = transform.transform(BoundingBox::from_points(v0, v1).including(v2));

        Ok(Self {
            transform,
            shader,
            vertices,
            face_normal,
            normals: TriangleNormals::Flat,
            uvs: Self::DEFAULT_UVS,
            bbox,
        })
    }

    /// Interpolate the given vertex normals instead of using the face normal.
    pub fn with_vertex_normals(mut self, normals: [Normal3; 3]) -> ShapeResult<Self> {
        let normalized = [normals[0].normalize()?, normals[1].normalize()?, normals[2].normalize()?];
        self.normals = TriangleNormals::Smooth(normalized);
        Ok(self)
    }

    pub fn with_uvs(mut self, uvs: [DVec2; 3]) -> Self {
        self.uvs = uvs;
        self
    }

    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    pub fn vertices(&self) -> &[Point3; 3] {
        &self.vertices
    }

    pub fn normals(&self) -> &TriangleNormals {
        &self.normals
    }

    fn shading_normal(&self, alpha: f64, beta: f64, gamma: f64) -> Normal3 {
        match self.normals {
            TriangleNormals::Flat => self.face_normal,
            TriangleNormals::Smooth([n0, n1, n2]) => {
                let blended = alpha * n0 + beta * n1 + gamma * n2;
                if blended.length() < MIN_BLEND_LENGTH {
                    self.face_normal
                } else {
                    blended
                }
            }
        }
    }
}

impl Intersect for Triangle {
    fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let local_ray = self.transform.transform_inverse(*ray);
        let [v0, v1, v2] = self.vertices;
        let d = local_ray.direction();

        let e1: Vector3 = v0 - v1;
        let e2: Vector3 = v0 - v2;
        let r: Vector3 = v0 - local_ray.origin();

        let e2_cross_d = e2.cross(d);
        let det = e1.dot(e2_cross_d);
        if det.abs() < PARALLEL_TOLERANCE {
            return None;
        }
        let inv_det = 1.0 / det;

        let beta = r.dot(e2_cross_d) * inv_det;
        if beta < 0.0 {
            return None;
        }

        let gamma = e1.dot(r.cross(d)) * inv_det;
        if gamma < 0.0 || beta + gamma > 1.0 {
            return None;
        }

        let t = e1.dot(e2.cross(r)) * inv_det;
        if !local_ray.interval().contains(t) {
            return None;
        }

        let alpha = 1.0 - beta - gamma;
        let local = LocalHit {
            distance: t,
            point: local_ray.at(t),
            normal: self.shading_normal(alpha, beta, gamma),
            uv: alpha * self.uvs[0] + beta * self.uvs[1] + gamma * self.uvs[2],
        };
        to_world(&self.transform, ray, local)
    }
}
