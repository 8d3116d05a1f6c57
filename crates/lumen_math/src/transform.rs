//! Composable transformations.
//!
//! A [`Transformation`] is a forward/inverse matrix pair that is kept
//! consistent by construction. Factories with a closed-form inverse build
//! the pair directly; general matrices go through LU inversion and fail on
//! singular input.
//!
//! `transform` is overloaded by argument kind through [`Transformable`]:
//!
//! - points use w = 1 and are divided by the resulting w,
//! - vectors use w = 0, so translation never contributes,
//! - normals are multiplied by the transpose of the inverse,
//! - rays transform origin and direction and keep their parametric interval,
//! - bounding boxes are rebuilt from their transformed corners.

use glam::{DMat4, DVec3, DVec4};

use crate::{BoundingBox, MathError, MathResult, Matrix, Normal3, Point3, Ray, Vector3};

/// Clipping planes for projections whose depth range does not matter,
/// such as camera ray generation.
pub const DEFAULT_NEAR: f64 = 1e-2;
pub const DEFAULT_FAR: f64 = 1000.0;

/// An invertible affine or projective transformation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transformation {
    forward: DMat4,
    inverse: DMat4,
}

/// Values that a [`Transformation`] knows how to map.
pub trait Transformable: Sized {
    /// Apply `forward`; `inverse` is supplied for rules that need it.
    fn transform_with(self, forward: &DMat4, inverse: &DMat4) -> Self;
}

impl Transformation {
    pub const IDENTITY: Transformation = Transformation {
        forward: DMat4::IDENTITY,
        inverse: DMat4::IDENTITY,
    };

    /// Build a transformation from an arbitrary matrix.
    pub fn from_matrix(matrix: &Matrix) -> MathResult<Self> {
        let inverse = matrix.inverse()?;
        Ok(Self {
            forward: *matrix.as_dmat4(),
            inverse: *inverse.as_dmat4(),
        })
    }

    /// Pair a matrix with an inverse the caller already knows.
    fn from_pair(forward: DMat4, inverse: DMat4) -> Self {
        Self { forward, inverse }
    }

    pub fn translate(delta: Vector3) -> Self {
        let d = delta.to_dvec3();
        Self::from_pair(DMat4::from_translation(d), DMat4::from_translation(-d))
    }

    /// Non-uniform scale. Fails if any factor is zero.
    pub fn scale(x: f64, y: f64, z: f64) -> MathResult<Self> {
        if x == 0.0 || y == 0.0 || z == 0.0 {
            return Err(MathError::InvalidArgument(format!(
                "scale factors must be non-zero, got ({x}, {y}, {z})"
            )));
        }
        Ok(Self::from_pair(
            DMat4::from_scale(DVec3::new(x, y, z)),
            DMat4::from_scale(DVec3::new(1.0 / x, 1.0 / y, 1.0 / z)),
        ))
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotate_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let m = Matrix::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        Self::from_orthonormal(&m)
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotate_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let m = Matrix::from_rows([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        Self::from_orthonormal(&m)
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotate_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let m = Matrix::from_rows([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        Self::from_orthonormal(&m)
    }

    /// Rotation by `angle` radians about an arbitrary axis (Rodrigues).
    pub fn rotate(angle: f64, axis: Vector3) -> MathResult<Self> {
        let a = axis.normalize()?;
        let (x, y, z) = (a.x(), a.y(), a.z());
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;

        let m = Matrix::from_rows([
            [t * x * x + c, t * x * y - s * z, t * x * z + s * y, 0.0],
            [t * x * y + s * z, t * y * y + c, t * y * z - s * x, 0.0],
            [t * x * z - s * y, t * y * z + s * x, t * z * z + c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        Ok(Self::from_orthonormal(&m))
    }

    /// Camera-to-world transformation for a camera at `eye` looking at
    /// `target`.
    ///
    /// Camera space looks down +Z with +X to the right and +Y up. Fails when
    /// `eye == target` or `up` is parallel to the viewing direction.
    pub fn look_at(eye: Point3, target: Point3, up: Vector3) -> MathResult<Self> {
        let dir = (target - eye).normalize()?;
        let right = dir.cross(up.normalize()?).normalize()?;
        let new_up = right.cross(dir);

        let m = Matrix::from_rows([
            [right.x(), new_up.x(), dir.x(), eye.x()],
            [right.y(), new_up.y(), dir.y(), eye.y()],
            [right.z(), new_up.z(), dir.z(), eye.z()],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        Self::from_matrix(&m)
    }

    /// Perspective projection from camera space to screen space.
    ///
    /// Points on the near plane map to screen z = 0, the far plane to 1;
    /// x and y are divided by depth and scaled by `1 / tan(fov / 2)`.
    pub fn perspective(fov: f64, near: f64, far: f64) -> MathResult<Self> {
        if !(fov > 0.0 && fov < std::f64::consts::PI) {
            return Err(MathError::InvalidArgument(format!(
                "field of view must lie in (0, π), got {fov}"
            )));
        }
        if !(near > 0.0 && far > near) {
            return Err(MathError::InvalidArgument(format!(
                "perspective planes must satisfy 0 < near < far, got {near}, {far}"
            )));
        }

        let persp = Matrix::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, far / (far - near), -far * near / (far - near)],
            [0.0, 0.0, 1.0, 0.0],
        ]);
        let inv_tan = 1.0 / (fov / 2.0).tan();
        let projection = Self::from_matrix(&persp)?;

        Ok(Self::scale(inv_tan, inv_tan, 1.0)?.mul(&projection))
    }

    /// Orthographic projection: maps camera z in `[near, far]` to `[0, 1]`.
    pub fn orthographic(near: f64, far: f64) -> MathResult<Self> {
        if far <= near {
            return Err(MathError::InvalidArgument(format!(
                "orthographic planes must satisfy near < far, got {near}, {far}"
            )));
        }
        Ok(Self::scale(1.0, 1.0, 1.0 / (far - near))?
            .mul(&Self::translate(Vector3::new(0.0, 0.0, -near))))
    }

    /// Map raster coordinates `[0, width] x [0, height]` onto the unit square.
    pub fn raster_to_unit_square(width: u32, height: u32) -> MathResult<Self> {
        if width == 0 || height == 0 {
            return Err(MathError::InvalidArgument(format!(
                "raster must be non-empty, got {width}x{height}"
            )));
        }
        Self::scale(1.0 / width as f64, 1.0 / height as f64, 1.0)
    }

    /// Map the unit square onto a screen window, flipping y so that the top
    /// raster row lands on `y_max`.
    pub fn unit_square_to_screen(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> MathResult<Self> {
        let scale = Self::scale(x_max - x_min, y_min - y_max, 1.0)?;
        Ok(Self::translate(Vector3::new(x_min, y_max, 0.0)).mul(&scale))
    }

    fn from_orthonormal(m: &Matrix) -> Self {
        let forward = *m.as_dmat4();
        Self::from_pair(forward, forward.transpose())
    }

    /// Composition `self ∘ other`: `other` is applied first.
    ///
    /// The inverse of the result is `other⁻¹ ∘ self⁻¹`.
    pub fn mul(&self, other: &Transformation) -> Transformation {
        Self::from_pair(self.forward * other.forward, other.inverse * self.inverse)
    }

    /// The inverse transformation. Always available: the pair is kept
    /// consistent from construction.
    pub fn inverse(&self) -> Transformation {
        Self::from_pair(self.inverse, self.forward)
    }

    pub fn matrix(&self) -> Matrix {
        Matrix::from_dmat4(self.forward)
    }

    pub fn inverse_matrix(&self) -> Matrix {
        Matrix::from_dmat4(self.inverse)
    }

    /// Apply this transformation to a point, vector, normal, ray or box.
    #[inline]
    pub fn transform<T: Transformable>(&self, x: T) -> T {
        x.transform_with(&self.forward, &self.inverse)
    }

    /// Apply the inverse without building the swapped pair.
    #[inline]
    pub fn transform_inverse<T: Transformable>(&self, x: T) -> T {
        x.transform_with(&self.inverse, &self.forward)
    }
}

impl Default for Transformation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transformable for Point3 {
    fn transform_with(self, forward: &DMat4, _inverse: &DMat4) -> Self {
        let p = *forward * DVec4::new(self.x(), self.y(), self.z(), 1.0);
        if p.w == 1.0 || p.w == 0.0 {
            Point3::from(p.truncate())
        } else {
            Point3::from(p.truncate() / p.w)
        }
    }
}

impl Transformable for Vector3 {
    fn transform_with(self, forward: &DMat4, _inverse: &DMat4) -> Self {
        let v = *forward * DVec4::new(self.x(), self.y(), self.z(), 0.0);
        Vector3::from(v.truncate())
    }
}

impl Transformable for Normal3 {
    fn transform_with(self, _forward: &DMat4, inverse: &DMat4) -> Self {
        let n = inverse.transpose() * DVec4::new(self.x(), self.y(), self.z(), 0.0);
        Normal3::from(n.truncate())
    }
}

impl Transformable for Ray {
    fn transform_with(self, forward: &DMat4, inverse: &DMat4) -> Self {
        Ray::with_interval(
            self.origin().transform_with(forward, inverse),
            self.direction().transform_with(forward, inverse),
            self.t_min(),
            self.t_max(),
        )
    }
}

impl Transformable for BoundingBox {
    fn transform_with(self, forward: &DMat4, inverse: &DMat4) -> Self {
        if self.is_infinite() || self.is_empty() {
            return self;
        }

        let (lo, hi) = (self.min(), self.max());
        let mut result = BoundingBox::EMPTY;
        for i in 0..8 {
            let corner = Point3::new(
                if i & 1 == 0 { lo.x() } else { hi.x() },
                if i & 2 == 0 { lo.y() } else { hi.y() },
                if i & 4 == 0 { lo.z() } else { hi.z() },
            );
            result = result.including(corner.transform_with(forward, inverse));
        }
        result
    }
}
