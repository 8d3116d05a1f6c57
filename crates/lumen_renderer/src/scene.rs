//! Scene container and ray queries.

use lumen_math::Ray;

use crate::{Camera, CancelToken, Collision, Light, RenderError, RenderResult, RenderSettings, Rendering, Shape};

/// Shapes, lights and cameras.
///
/// Populated once before rendering and only read afterwards; both ray
/// queries take `&self` and are safe to call from many threads.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    shapes: Vec<Shape>,
    lights: Vec<Light>,
    cameras: Vec<Camera>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn add_camera(&mut self, camera: Camera) {
        self.cameras.push(camera);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn camera(&self, index: usize) -> Option<&Camera> {
        self.cameras.get(index)
    }

    /// Closest hit along `ray` over all shapes.
    ///
    /// The ray is clipped to the closest hit so far, so later shapes only
    /// report hits that are nearer.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<Collision<'_>> {
        let mut closest: Option<Collision<'_>> = None;
        let mut query = *ray;

        for shape in &self.shapes {
            if !shape.bounding_box().hit(&query) {
                continue;
            }
            if let Some(hit) = shape.intersect(&query) {
                query = query.clipped(hit.distance);
                closest = Some(Collision { ray: *ray, ..hit });
            }
        }

        closest
    }

    /// Any hit along `ray`. Used for occlusion tests.
    pub fn first_hit(&self, ray: &Ray) -> Option<Collision<'_>> {
        self.shapes
            .iter()
            .filter(|shape| shape.bounding_box().hit(ray))
            .find_map(|shape| shape.intersect(ray))
    }

    /// Render through camera `index`.
    pub fn render(&self, index: usize, settings: &RenderSettings, cancel: &CancelToken) -> RenderResult<Rendering> {
        let camera = self.camera(index).ok_or(RenderError::NoCamera(index))?;
        camera.render_scene(self, settings, cancel)
    }
}
