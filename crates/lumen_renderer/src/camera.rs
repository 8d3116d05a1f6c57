//! Cameras: raster samples to world-space rays.
//!
//! Every camera composes, once at construction:
//!
//! raster → unit square → screen window → camera space → world space
//!
//! Camera space looks down +Z with +Y up. The screen window spans
//! `[-aspect, aspect] x [-1, 1]` for perspective projection and
//! `[-aspect·h, aspect·h] x [-h, h]` for orthographic projection with half
//! height `h`.

use glam::DVec2;
use lumen_math::{MathError, Point3, Ray, Transformation, Vector3, DEFAULT_FAR, DEFAULT_NEAR};
use thiserror::Error;

use crate::{CancelToken, RenderResult, RenderSettings, Rendering, Scene, TileScheduler};

/// Errors raised while building a camera.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("image must be at least 1x1, got {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("invalid lens: {0}")]
    InvalidLens(String),

    #[error(transparent)]
    Math(#[from] MathError),
}

pub type CameraResult<T> = Result<T, CameraError>;

/// Projection model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Pinhole when `lens_radius` is zero, thin lens otherwise.
    Perspective {
        /// Vertical field of view, radians
        fov: f64,
        lens_radius: f64,
        /// Distance of the plane in perfect focus
        focal_distance: f64,
    },
    Orthographic {
        /// Half the height of the visible window, world units
        half_height: f64,
    },
}

impl Projection {
    /// Pinhole perspective with vertical field of view `fov` (radians).
    pub fn pinhole(fov: f64) -> Self {
        Projection::Perspective {
            fov,
            lens_radius: 0.0,
            focal_distance: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    width: u32,
    height: u32,
    projection: Projection,
    camera_to_world: Transformation,
    raster_to_camera: Transformation,
}

impl Camera {
    /// Camera at `eye` looking at `target`, producing a `width` x `height`
    /// image.
    pub fn new(
        width: u32,
        height: u32,
        eye: Point3,
        target: Point3,
        up: Vector3,
        projection: Projection,
    ) -> CameraResult<Self> {
        if width == 0 || height == 0 {
            return Err(CameraError::InvalidResolution { width, height });
        }

        let aspect = width as f64 / height as f64;
        let (camera_to_screen, half_height) = match projection {
            Projection::Perspective {
                fov,
                lens_radius,
                focal_distance,
            } => {
                if lens_radius < 0.0 || (lens_radius > 0.0 && focal_distance <= 0.0) {
                    return Err(CameraError::InvalidLens(format!(
                        "radius {lens_radius} with focal distance {focal_distance}"
                    )));
                }
                (Transformation::perspective(fov, DEFAULT_NEAR, DEFAULT_FAR)?, 1.0)
            }
            Projection::Orthographic { half_height } => {
                if half_height <= 0.0 {
                    return Err(CameraError::InvalidLens(format!(
                        "orthographic half height must be positive, got {half_height}"
                    )));
                }
                (Transformation::orthographic(DEFAULT_NEAR, DEFAULT_FAR)?, half_height)
            }
        };

        let screen = Transformation::unit_square_to_screen(
            -aspect * half_height,
            aspect * half_height,
            -half_height,
            half_height,
        )?;
        let raster_to_camera = camera_to_screen
            .inverse()
            .mul(&screen)
            .mul(&Transformation::raster_to_unit_square(width, height)?);

        Ok(Self {
            width,
            height,
            projection,
            camera_to_world: Transformation::look_at(eye, target, up)?,
            raster_to_camera,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// True when rays should be spread over a lens.
    pub fn has_lens(&self) -> bool {
        matches!(self.projection, Projection::Perspective { lens_radius, .. } if lens_radius > 0.0)
    }

    /// World-space ray through raster position `raster`.
    ///
    /// `lens` is a point in the unit disc, used only when the camera has a
    /// lens.
    pub fn generate_ray(&self, raster: DVec2, lens: DVec2) -> Ray {
        let p_camera = self
            .raster_to_camera
            .transform(Point3::new(raster.x, raster.y, 0.0));

        let local = match self.projection {
            Projection::Orthographic { .. } => {
                Ray::new(Point3::new(p_camera.x(), p_camera.y(), 0.0), Vector3::Z)
            }
            Projection::Perspective {
                lens_radius,
                focal_distance,
                ..
            } => {
                let direction = p_camera.as_vector().normalize().unwrap_or(Vector3::Z);
                if lens_radius > 0.0 {
                    let origin = Point3::new(lens.x * lens_radius, lens.y * lens_radius, 0.0);
                    let focus = Point3::ZERO + direction * (focal_distance / direction.z());
                    let direction = (focus - origin).normalize().unwrap_or(direction);
                    Ray::new(origin, direction)
                } else {
                    Ray::new(Point3::ZERO, direction)
                }
            }
        };

        self.camera_to_world.transform(local)
    }

    /// Render `scene` through this camera.
    pub fn render_scene(&self, scene: &Scene, settings: &RenderSettings, cancel: &CancelToken) -> RenderResult<Rendering> {
        TileScheduler::new(settings.clone()).render(scene, self, cancel)
    }
}
