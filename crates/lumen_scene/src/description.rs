//! Serde model of a scene file.
//!
//! Each family is an internally tagged enum keyed by `"type"`. Angles are
//! written in degrees; they are converted to radians when the scene is
//! built.
//!
//! ```json
//! {
//!   "settings": { "samples_per_pixel": 16 },
//!   "cameras": [{ "type": "perspective", "width": 640, "height": 480,
//!                 "eye": [0, 2, -8], "target": [0, 1, 0], "fov": 40 }],
//!   "lights": [{ "type": "point", "position": [4, 8, -4], "power": 120 }],
//!   "shapes": [{ "type": "sphere", "transform": [{ "translate": [0, 1, 0] }] }]
//! }
//! ```

use lumen_renderer::{Material, RenderSettings};
use serde::{Deserialize, Serialize};

pub type Vec3 = [f64; 3];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneDescription {
    pub settings: RenderSettings,
    pub cameras: Vec<CameraDescription>,
    pub lights: Vec<LightDescription>,
    pub shapes: Vec<ShapeDescription>,
}

/// One step of a transform stack. Steps apply in list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOp {
    Translate(Vec3),
    Scale(Vec3),
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),
    /// Rotation by `angle` degrees about `axis`
    Rotate { angle: f64, axis: Vec3 },
    LookAt {
        eye: Vec3,
        target: Vec3,
        #[serde(default = "default_up")]
        up: Vec3,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderDescription {
    pub color: Vec3,
    pub material: Material,
}

impl Default for ShaderDescription {
    fn default() -> Self {
        Self {
            color: [0.8, 0.8, 0.8],
            material: Material::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDescription {
    /// Unit sphere placed by its transform. `theta` and `phi` restrict it
    /// to a sub-range in degrees.
    Sphere {
        #[serde(default)]
        transform: Vec<TransformOp>,
        #[serde(default)]
        shader: ShaderDescription,
        #[serde(default)]
        theta: Option<[f64; 2]>,
        #[serde(default)]
        phi: Option<[f64; 2]>,
    },
    /// Either the y = 0 plane under `transform`, or the plane through
    /// `point` with `normal`.
    Plane {
        #[serde(default)]
        transform: Vec<TransformOp>,
        #[serde(default)]
        point: Option<Vec3>,
        #[serde(default)]
        normal: Option<Vec3>,
        #[serde(default)]
        shader: ShaderDescription,
    },
    Triangle {
        #[serde(default)]
        transform: Vec<TransformOp>,
        vertices: [Vec3; 3],
        #[serde(default)]
        normals: Option<[Vec3; 3]>,
        #[serde(default)]
        uvs: Option<[[f64; 2]; 3]>,
        #[serde(default)]
        shader: ShaderDescription,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightDescription {
    Point {
        position: Vec3,
        #[serde(default = "white")]
        color: Vec3,
        #[serde(default = "unit")]
        power: f64,
    },
    Directional {
        direction: Vec3,
        #[serde(default = "white")]
        color: Vec3,
        #[serde(default = "unit")]
        power: f64,
    },
    Ambient {
        #[serde(default = "white")]
        color: Vec3,
        #[serde(default = "unit")]
        power: f64,
    },
    Sphere {
        center: Vec3,
        radius: f64,
        #[serde(default = "white")]
        color: Vec3,
        #[serde(default = "unit")]
        power: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraDescription {
    Perspective {
        width: u32,
        height: u32,
        eye: Vec3,
        target: Vec3,
        #[serde(default = "default_up")]
        up: Vec3,
        /// Vertical field of view, degrees
        fov: f64,
        #[serde(default)]
        lens_radius: f64,
        #[serde(default = "unit")]
        focal_distance: f64,
    },
    Orthographic {
        width: u32,
        height: u32,
        eye: Vec3,
        target: Vec3,
        #[serde(default = "default_up")]
        up: Vec3,
        half_height: f64,
    },
}

fn default_up() -> Vec3 {
    [0.0, 1.0, 0.0]
}

fn white() -> Vec3 {
    [1.0, 1.0, 1.0]
}

fn unit() -> f64 {
    1.0
}
