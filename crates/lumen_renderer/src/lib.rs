//! Lumen renderer.
//!
//! A Whitted-style ray tracer: shapes and lights live in a [`Scene`], a
//! [`Camera`] turns raster samples into rays, the [`Tracer`] resolves
//! ambient, direct and mirror contributions recursively, and the tile
//! scheduler spreads the image over a rayon thread pool.

mod camera;
mod collision;
mod config;
mod film;
mod light;
mod material;
mod sampler;
mod scene;
mod scheduler;
pub mod shape;
mod stats;
mod tracer;

pub use camera::{Camera, CameraError, CameraResult, Projection};
pub use collision::Collision;
pub use config::{RenderSettings, SamplerLifecycle};
pub use film::{color_to_rgba, Film};
pub use light::{Incidence, Light, LightSample};
pub use material::{Color, Material, Shader};
pub use sampler::{Sampler, SamplerKind};
pub use scene::Scene;
pub use scheduler::{
    partition, CancelToken, RenderError, RenderResult, RenderWindow, Rendering, TileResult,
    TileScheduler,
};
pub use shape::{Intersect, Plane, Shape, ShapeError, ShapeResult, Sphere, Triangle, TriangleNormals};
pub use stats::{RayCounts, RenderStatistics};
pub use tracer::{Tracer, MAX_DEPTH, SURFACE_EPSILON};

/// Re-export the math kernel so downstream crates need a single import.
pub use lumen_math as math;
