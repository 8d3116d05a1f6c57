//! Unit sphere primitive, optionally restricted to an angular patch.

use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use glam::DVec2;
use lumen_math::{BoundingBox, Point3, Ray, Solver, Transformation, INV_PI, INV_TWO_PI};

use super::{to_world, Intersect, LocalHit, ShapeError, ShapeResult, SurfaceHit};
use crate::Shader;

/// A sphere of radius one centred on the object-space origin.
///
/// Radius and position come from the transform. The polar angle `theta`
/// (from +Y) and azimuth `phi` (from +X towards +Z) can be limited to cut
/// out a partial sphere; the default covers the whole surface.
#[derive(Debug, Clone)]
pub struct Sphere {
    transform: Transformation,
    shader: Shader,
    solver: Arc<dyn Solver>,
    theta: (f64, f64),
    phi: (f64, f64),
    bbox: BoundingBox,
}

impl Sphere {
    /// Create a full sphere. The solver must be of degree 2.
    pub fn new(transform: Transformation, shader: Shader, solver: Arc<dyn Solver>) -> ShapeResult<Self> {
        if solver.degree() != 2 {
            return Err(ShapeError::SolverDegree {
                expected: 2,
                actual: solver.degree(),
            });
        }

        let unit = BoundingBox::from_points(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        Ok(Self {
            bbox: transform.transform(unit),
            transform,
            shader,
            solver,
            theta: (0.0, PI),
            phi: (0.0, TAU),
        })
    }

    /// Restrict the surface to `theta_min..=theta_max` and `phi_min..=phi_max`
    /// (radians).
    pub fn with_range(mut self, theta_min: f64, theta_max: f64, phi_min: f64, phi_max: f64) -> ShapeResult<Self> {
        if !(0.0..=PI).contains(&theta_min) || !(0.0..=PI).contains(&theta_max) || theta_min >= theta_max {
            return Err(ShapeError::InvalidRange(format!(
                "theta must satisfy 0 <= min < max <= π, got {theta_min}..{theta_max}"
            )));
        }
        if !(0.0..=TAU).contains(&phi_min) || !(0.0..=TAU).contains(&phi_max) || phi_min >= phi_max {
            return Err(ShapeError::InvalidRange(format!(
                "phi must satisfy 0 <= min < max <= 2π, got {phi_min}..{phi_max}"
            )));
        }
        self.theta = (theta_min, theta_max);
        self.phi = (phi_min, phi_max);
        Ok(self)
    }

    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    pub fn transform(&self) -> &Transformation {
        &self.transform
    }

    fn is_partial(&self) -> bool {
        self.theta != (0.0, PI) || self.phi != (0.0, TAU)
    }

    fn in_range(&self, p: Point3) -> bool {
        let polar = p.polar();
        (self.theta.0..=self.theta.1).contains(&polar.theta) && (self.phi.0..=self.phi.1).contains(&polar.phi)
    }
}

impl Intersect for Sphere {
    fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let local_ray = self.transform.transform_inverse(*ray);
        let o = local_ray.origin().as_vector();
        let d = local_ray.direction();

        let a = d.dot(d);
        let b = 2.0 * o.dot(d);
        let c = o.dot(o) - 1.0;
        let roots = self.solver.solve(&[c, b, a]).ok()?;

        let interval = local_ray.interval();
        let (t, point) = roots
            .into_iter()
            .filter(|t| interval.contains(*t))
            .map(|t| (t, local_ray.at(t)))
            .find(|(_, p)| !self.is_partial() || self.in_range(*p))?;

        let polar = point.polar();
        let local = LocalHit {
            distance: t,
            point,
            normal: point.as_normal(),
            uv: DVec2::new(polar.phi * INV_TWO_PI, polar.theta * INV_PI),
        };
        to_world(&self.transform, ray, local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::solver::{CubicSolver, QuadraticSolver};
    use lumen_math::{Normal3, Vector3};

    fn unit_sphere() -> Sphere {
        Sphere::new(Transformation::IDENTITY, Shader::default(), Arc::new(QuadraticSolver)).unwrap()
    }

    #[test]
    fn test_entry_and_exit_distance() {
        let sphere = unit_sphere();
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));

        let entry = sphere.intersect(&ray).unwrap();
        assert!((entry.distance - 4.0).abs() < 1e-9);
        assert_eq!(entry.point, Point3::new(0.0, 0.0, -1.0));
        assert_eq!(entry.normal, Normal3::new(0.0, 0.0, -1.0));

        let past_entry = Ray::with_interval(ray.origin(), ray.direction(), 4.5, f64::INFINITY);
        let exit = sphere.intersect(&past_entry).unwrap();
        assert!((exit.distance - 6.0).abs() < 1e-9);
        // Normal is flipped to face the ray from inside.
        assert_eq!(exit.normal, Normal3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_miss() {
        let ray = Ray::new(Point3::new(0.0, 2.0, -5.0), Vector3::Z);
        assert!(unit_sphere().intersect(&ray).is_none());

        let behind = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::Z);
        assert!(unit_sphere().intersect(&behind).is_none());
    }

    #[test]
    fn test_ray_interval_is_respected() {
        let ray = Ray::with_interval(Point3::new(0.0, 0.0, -5.0), Vector3::Z, 0.0, 3.0);
        assert!(unit_sphere().intersect(&ray).is_none());
    }

    #[test]
    fn test_transformed_sphere() {
        let transform = Transformation::translate(Vector3::new(0.0, 0.0, 10.0))
            .mul(&Transformation::scale(2.0, 2.0, 2.0).unwrap());
        let sphere = Sphere::new(transform, Shader::default(), Arc::new(QuadraticSolver)).unwrap();
        let ray = Ray::new(Point3::ZERO, Vector3::Z);

        let hit = sphere.intersect(&ray).unwrap();
        assert!((hit.distance - 8.0).abs() < 1e-9);
        assert_eq!(hit.point, Point3::new(0.0, 0.0, 8.0));
        assert_eq!(hit.normal, Normal3::new(0.0, 0.0, -1.0));
        assert_eq!(sphere.bounding_box().min(), Point3::new(-2.0, -2.0, 8.0));
    }

    #[test]
    fn test_grazing_hit_on_large_sphere() {
        let radius = 1e4;
        let transform = Transformation::translate(Vector3::new(0.0, -radius, 0.0))
            .mul(&Transformation::scale(radius, radius, radius).unwrap());
        let sphere = Sphere::new(transform, Shader::default(), Arc::new(QuadraticSolver)).unwrap();

        // Passes 0.1 below the top of the sphere: a chord of half length
        // sqrt(R^2 - (R - 0.1)^2) centred on x = 0.
        let ray = Ray::new(Point3::new(-1000.0, -0.1, 0.0), Vector3::X);
        let half_chord = (radius * radius - (radius - 0.1) * (radius - 0.1)).sqrt();

        let hit = sphere.intersect(&ray).unwrap();
        assert!((hit.distance - (1000.0 - half_chord)).abs() < 1e-6, "distance {}", hit.distance);
        assert!((hit.point.x() + half_chord).abs() < 1e-6);
    }

    #[test]
    fn test_non_uniform_scale_keeps_normal_perpendicular() {
        let transform = Transformation::scale(4.0, 1.0, 1.0).unwrap();
        let sphere = Sphere::new(transform, Shader::default(), Arc::new(QuadraticSolver)).unwrap();
        let ray = Ray::new(Point3::new(2.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));

        let hit = sphere.intersect(&ray).unwrap();
        // Ellipse x^2/16 + y^2 = 1 at x = 2: slope normal is (x/16, y).
        let y = (1.0 - 4.0 / 16.0f64).sqrt();
        let expected = Vector3::new(2.0 / 16.0, y, 0.0).normalize().unwrap().as_normal();
        assert!((hit.distance - (5.0 - y)).abs() < 1e-9);
        assert_eq!(hit.normal, expected);
    }

    #[test]
    fn test_uv_mapping() {
        let ray = Ray::new(Point3::new(5.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0));
        let hit = unit_sphere().intersect(&ray).unwrap();

        // +X: phi = 0, theta = π/2
        assert!(hit.uv.x.abs() < 1e-9);
        assert!((hit.uv.y - 0.5).abs() < 1e-9);

        let top = Ray::new(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        let hit = unit_sphere().intersect(&top).unwrap();
        assert!(hit.uv.y.abs() < 1e-9);
    }

    #[test]
    fn test_partial_sphere_skips_cut_away_hit() {
        // Keep only the upper hemisphere.
        let sphere = unit_sphere().with_range(0.0, PI / 2.0, 0.0, TAU).unwrap();

        let down = Ray::new(Point3::new(0.0, 5.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        let hit = sphere.intersect(&down).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-9);

        // From below, the near (lower) hit is cut away; the far one is kept.
        let up = Ray::new(Point3::new(0.0, -5.0, 0.0), Vector3::Y);
        let hit = sphere.intersect(&up).unwrap();
        assert!((hit.distance - 6.0).abs() < 1e-9);

        let side = Ray::new(Point3::new(0.3, -5.0, 0.0), Vector3::Y);
        assert!(sphere.intersect(&side).is_some());

        let sideways_low = Ray::new(Point3::new(-5.0, -0.5, 0.0), Vector3::X);
        assert!(sphere.intersect(&sideways_low).is_none());
    }

    #[test]
    fn test_invalid_range() {
        assert!(matches!(
            unit_sphere().with_range(1.0, 0.5, 0.0, TAU),
            Err(ShapeError::InvalidRange(_))
        ));
        assert!(unit_sphere().with_range(0.0, PI, 0.0, 7.0).is_err());
    }

    #[test]
    fn test_rejects_wrong_solver_degree() {
        let result = Sphere::new(Transformation::IDENTITY, Shader::default(), Arc::new(CubicSolver));
        assert_eq!(
            result.unwrap_err(),
            ShapeError::SolverDegree { expected: 2, actual: 3 }
        );
    }
}
