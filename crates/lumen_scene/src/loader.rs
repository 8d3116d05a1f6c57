//! Scene file loading.
//!
//! Reads a JSON scene description and assembles it into a renderable
//! [`Scene`]. All spheres share one quadratic solver.

use std::path::Path;
use std::sync::Arc;

use lumen_math::solver::{QuadraticSolver, Solver};
use lumen_math::{DVec2, MathError, Normal3, Point3, Transformation, Vector3};
use lumen_renderer::{
    Camera, CameraError, Color, Light, Plane, Projection, RenderSettings, Scene, Shader, Shape, ShapeError, Sphere,
    Triangle,
};
use thiserror::Error;

use crate::description::{
    CameraDescription, LightDescription, SceneDescription, ShaderDescription, ShapeDescription, TransformOp, Vec3,
};

/// Errors that can occur while loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value in {context}: {message}")]
    InvalidValue { context: String, message: String },

    #[error("Shape {index}: {source}")]
    Shape {
        index: usize,
        #[source]
        source: ShapeError,
    },

    #[error("Camera {index}: {source}")]
    Camera {
        index: usize,
        #[source]
        source: CameraError,
    },

    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// A scene ready to render, with the settings it was saved with.
#[derive(Debug, Clone)]
pub struct LoadedScene {
    pub scene: Scene,
    pub settings: RenderSettings,
}

/// Load a scene file from disk.
pub fn load_scene<P: AsRef<Path>>(path: P) -> SceneResult<LoadedScene> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let loaded = parse_scene(&text)?;

    log::info!(
        "Loaded {}: {} shapes, {} lights, {} cameras",
        path.display(),
        loaded.scene.shapes().len(),
        loaded.scene.lights().len(),
        loaded.scene.cameras().len()
    );
    Ok(loaded)
}

/// Parse a scene from JSON text.
pub fn parse_scene(text: &str) -> SceneResult<LoadedScene> {
    let description: SceneDescription = serde_json::from_str(text)?;
    description.build()
}

impl SceneDescription {
    /// Assemble the described scene.
    pub fn build(&self) -> SceneResult<LoadedScene> {
        let solver: Arc<dyn Solver> = Arc::new(QuadraticSolver);
        let mut scene = Scene::new();

        for (index, camera) in self.cameras.iter().enumerate() {
            let camera = build_camera(camera).map_err(|source| SceneError::Camera { index, source })?;
            scene.add_camera(camera);
        }
        for (index, light) in self.lights.iter().enumerate() {
            scene.add_light(build_light(index, light)?);
        }
        for (index, shape) in self.shapes.iter().enumerate() {
            scene.add_shape(build_shape(index, shape, &solver)?);
        }

        if scene.cameras().is_empty() {
            log::warn!("Scene has no cameras; it can be inspected but not rendered");
        }

        Ok(LoadedScene {
            scene,
            settings: self.settings.clone(),
        })
    }
}

/// Compose a transform stack. The first listed step is applied first.
pub(crate) fn compose(ops: &[TransformOp]) -> SceneResult<Transformation> {
    let mut result = Transformation::IDENTITY;
    for op in ops {
        let step = match op {
            TransformOp::Translate(d) => Transformation::translate(vector(*d)),
            TransformOp::Scale([x, y, z]) => Transformation::scale(*x, *y, *z)?,
            TransformOp::RotateX(angle) => Transformation::rotate_x(angle.to_radians()),
            TransformOp::RotateY(angle) => Transformation::rotate_y(angle.to_radians()),
            TransformOp::RotateZ(angle) => Transformation::rotate_z(angle.to_radians()),
            TransformOp::Rotate { angle, axis } => Transformation::rotate(angle.to_radians(), vector(*axis))?,
            TransformOp::LookAt { eye, target, up } => Transformation::look_at(point(*eye), point(*target), vector(*up))?,
        };
        result = step.mul(&result);
    }
    Ok(result)
}

fn build_shape(index: usize, desc: &ShapeDescription, solver: &Arc<dyn Solver>) -> SceneResult<Shape> {
    let wrap = |source| SceneError::Shape { index, source };

    let shape = match desc {
        ShapeDescription::Sphere {
            transform,
            shader,
            theta,
            phi,
        } => {
            let mut sphere = Sphere::new(compose(transform)?, build_shader(shader), Arc::clone(solver)).map_err(wrap)?;
            if theta.is_some() || phi.is_some() {
                let [t0, t1] = theta.unwrap_or([0.0, 180.0]);
                let [p0, p1] = phi.unwrap_or([0.0, 360.0]);
                sphere = sphere
                    .with_range(t0.to_radians(), t1.to_radians(), p0.to_radians(), p1.to_radians())
                    .map_err(wrap)?;
            }
            Shape::from(sphere)
        }
        ShapeDescription::Plane {
            transform,
            point: at,
            normal,
            shader,
        } => match normal {
            Some(n) => {
                if !transform.is_empty() {
                    return Err(SceneError::InvalidValue {
                        context: format!("shape {index}"),
                        message: "a plane takes either a transform or a point and normal".into(),
                    });
                }
                let at = point(at.unwrap_or([0.0; 3]));
                Shape::from(Plane::from_point_normal(at, Normal3::new(n[0], n[1], n[2]), build_shader(shader)).map_err(wrap)?)
            }
            None if at.is_some() => {
                return Err(SceneError::InvalidValue {
                    context: format!("shape {index}"),
                    message: "plane point given without a normal".into(),
                });
            }
            None => Shape::from(Plane::new(compose(transform)?, build_shader(shader))),
        },
        ShapeDescription::Triangle {
            transform,
            vertices,
            normals,
            uvs,
            shader,
        } => {
            let mut triangle = Triangle::new(compose(transform)?, build_shader(shader), vertices.map(point)).map_err(wrap)?;
            if let Some(normals) = normals {
                triangle = triangle
                    .with_vertex_normals(normals.map(|n| Normal3::new(n[0], n[1], n[2])))
                    .map_err(wrap)?;
            }
            if let Some(uvs) = uvs {
                triangle = triangle.with_uvs(uvs.map(|[u, v]| DVec2::new(u, v)));
            }
            Shape::from(triangle)
        }
    };
    Ok(shape)
}

fn build_light(index: usize, desc: &LightDescription) -> SceneResult<Light> {
    let invalid = |message: String| SceneError::InvalidValue {
        context: format!("light {index}"),
        message,
    };

    let power = match desc {
        LightDescription::Point { power, .. }
        | LightDescription::Directional { power, .. }
        | LightDescription::Ambient { power, .. }
        | LightDescription::Sphere { power, .. } => *power,
    };
    if !(power.is_finite() && power >= 0.0) {
        return Err(invalid(format!("power must be a non-negative number, got {power}")));
    }

    let light = match *desc {
        LightDescription::Point { position, color, power } => Light::Point {
            position: point(position),
            color: color_of(color),
            power,
        },
        LightDescription::Directional { direction, color, power } => {
            let direction = vector(direction);
            if direction.length() == 0.0 {
                return Err(invalid("directional light needs a non-zero direction".into()));
            }
            Light::Directional {
                direction,
                color: color_of(color),
                power,
            }
        }
        LightDescription::Ambient { color, power } => Light::Ambient {
            color: color_of(color),
            power,
        },
        LightDescription::Sphere {
            center,
            radius,
            color,
            power,
        } => {
            if radius <= 0.0 {
                return Err(invalid(format!("sphere light radius must be positive, got {radius}")));
            }
            Light::Sphere {
                center: point(center),
                radius,
                color: color_of(color),
                power,
            }
        }
    };
    Ok(light)
}

fn build_camera(desc: &CameraDescription) -> Result<Camera, CameraError> {
    match *desc {
        CameraDescription::Perspective {
            width,
            height,
            eye,
            target,
            up,
            fov,
            lens_radius,
            focal_distance,
        } => Camera::new(
            width,
            height,
            point(eye),
            point(target),
            vector(up),
            Projection::Perspective {
                fov: fov.to_radians(),
                lens_radius,
                focal_distance,
            },
        ),
        CameraDescription::Orthographic {
            width,
            height,
            eye,
            target,
            up,
            half_height,
        } => Camera::new(
            width,
            height,
            point(eye),
            point(target),
            vector(up),
            Projection::Orthographic { half_height },
        ),
    }
}

fn build_shader(desc: &ShaderDescription) -> Shader {
    Shader::new(color_of(desc.color), desc.material)
}

fn point([x, y, z]: Vec3) -> Point3 {
    Point3::new(x, y, z)
}

fn vector([x, y, z]: Vec3) -> Vector3 {
    Vector3::new(x, y, z)
}

fn color_of([r, g, b]: Vec3) -> Color {
    Color::new(r, g, b)
}
