use crate::{Interval, Point3, Vector3, EPSILON};

/// A ray with an origin, a direction and a valid parametric interval.
///
/// Only points `origin + t * direction` with `t_min <= t <= t_max` count as
/// hits. `t_min` defaults to [`EPSILON`] and `t_max` to infinity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Point3,
    direction: Vector3,
    t_min: f64,
    t_max: f64,
}

impl Ray {
    /// Create a ray with the default interval `[EPSILON, ∞)`.
    #[inline]
    pub fn new(origin: Point3, direction: Vector3) -> Self {
        Self::with_interval(origin, direction, EPSILON, f64::INFINITY)
    }

    /// Create a ray restricted to `[t_min, t_max]`.
    ///
    /// An inverted interval is collapsed to the empty interval at `t_min`,
    /// which no shape accepts.
    #[inline]
    pub fn with_interval(origin: Point3, direction: Vector3, t_min: f64, t_max: f64) -> Self {
        Self {
            origin,
            direction,
            t_min,
            t_max: t_max.max(t_min),
        }
    }

    #[inline]
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vector3 {
        self.direction
    }

    #[inline]
    pub fn t_min(&self) -> f64 {
        self.t_min
    }

    #[inline]
    pub fn t_max(&self) -> f64 {
        self.t_max
    }

    /// The valid parametric interval.
    #[inline]
    pub fn interval(&self) -> Interval {
        Interval::new(self.t_min, self.t_max)
    }

    /// Same ray, with `t_max` lowered to `t_max` if that is closer.
    #[inline]
    pub fn clipped(&self, t_max: f64) -> Ray {
        Self::with_interval(self.origin, self.direction, self.t_min, self.t_max.min(t_max))
    }

    /// Point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}
