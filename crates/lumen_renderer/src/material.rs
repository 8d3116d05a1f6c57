//! Surface appearance: a base color plus the coefficients of the fixed
//! ambient + diffuse + mirror shading model.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Linear RGB color.
pub type Color = DVec3;

/// Shading coefficients.
///
/// `specular` and `refraction` are carried for completeness; the tracer
/// does not use them yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub reflection: f64,
    pub refraction: f64,
}

impl Material {
    /// A matte surface with a little ambient light.
    pub const MATTE: Material = Material {
        ambient: 0.1,
        diffuse: 0.9,
        specular: 0.0,
        reflection: 0.0,
        refraction: 0.0,
    };

    /// A perfect mirror.
    pub const MIRROR: Material = Material {
        ambient: 0.0,
        diffuse: 0.0,
        specular: 0.0,
        reflection: 1.0,
        refraction: 0.0,
    };

    pub fn is_reflective(&self) -> bool {
        self.reflection > 0.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::MATTE
    }
}

/// What a shape looks like: its color and material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shader {
    pub color: Color,
    pub material: Material,
}

impl Shader {
    pub fn new(color: Color, material: Material) -> Self {
        Self { color, material }
    }
}

impl Default for Shader {
    fn default() -> Self {
        Self {
            color: Color::splat(0.8),
            material: Material::default(),
        }
    }
}
