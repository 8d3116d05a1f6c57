//! Recursive Whitted-style shading.

use lumen_math::Ray;

use crate::{Collision, Color, Incidence, RayCounts, Sampler, Scene};

/// Default recursion limit for reflected rays.
pub const MAX_DEPTH: u32 = 10;

/// Distance by which secondary ray origins are pushed off a surface.
pub const SURFACE_EPSILON: f64 = 1e-6;

/// Traces rays through a read-only scene.
///
/// A tracer borrows everything it reads, so one can be built per tile at
/// no cost. Ray counts go to the caller's [`RayCounts`].
pub struct Tracer<'a> {
    scene: &'a Scene,
    sampler: &'a Sampler,
    max_depth: u32,
}

impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene, sampler: &'a Sampler, max_depth: u32) -> Self {
        Self {
            scene,
            sampler,
            max_depth,
        }
    }

    /// Color seen along `ray`. `depth` is 1 for camera rays.
    ///
    /// `set` selects the sampler set used for area lights.
    pub fn trace_ray(&self, ray: &Ray, depth: u32, set: usize, counts: &mut RayCounts) -> Color {
        if depth > self.max_depth {
            counts.cancelled += 1;
            return Color::ZERO;
        }

        if depth == 1 {
            counts.eye += 1;
        } else {
            counts.secondary += 1;
        }

        let Some(hit) = self.scene.nearest_hit(ray) else {
            return Color::ZERO;
        };

        let shader = hit.shape.shader();
        let mut color = Color::ZERO;

        if depth == 1 {
            color += shader.color * shader.material.ambient;
        }
        color += self.direct_light(&hit, set, counts);
        if shader.material.is_reflective() {
            color += self.reflect(&hit, depth, set, counts) * shader.material.reflection;
        }
        color += self.refract(&hit);

        color
    }

    /// Sum of unoccluded light contributions at the hit.
    fn direct_light(&self, hit: &Collision<'_>, set: usize, counts: &mut RayCounts) -> Color {
        let shader = hit.shape.shader();
        let origin = hit.point + hit.normal.as_vector() * SURFACE_EPSILON;
        let mut color = Color::ZERO;

        for light in self.scene.lights() {
            for sample in light.sample(hit.point, self.sampler, set) {
                let cos = match sample.incidence {
                    Incidence::Omni => 1.0,
                    Incidence::Directed { direction, distance } => {
                        counts.shadow += 1;
                        let shadow = Ray::with_interval(origin, direction, 0.0, distance);
                        if self.scene.first_hit(&shadow).is_some() {
                            continue;
                        }
                        hit.normal.dot(direction).abs()
                    }
                };
                color += shader.color * sample.color * shader.material.diffuse * cos * sample.energy;
            }
        }

        color
    }

    fn reflect(&self, hit: &Collision<'_>, depth: u32, set: usize, counts: &mut RayCounts) -> Color {
        let Ok(direction) = hit.ray.direction().reflect(hit.normal).normalize() else {
            return Color::ZERO;
        };
        let origin = hit.point + direction * SURFACE_EPSILON;
        self.trace_ray(&Ray::new(origin, direction), depth + 1, set, counts)
    }

    /// Transmission is not modelled; glass renders as its other terms.
    fn refract(&self, _hit: &Collision<'_>) -> Color {
        Color::ZERO
    }
}
