use crate::{Interval, Point3, Ray};

/// Axis-aligned bounding box used to prune ray/shape tests.
///
/// Defined by three intervals (one per axis). [`BoundingBox::INFINITE`] is
/// hit by every ray and contains every point; unbounded shapes such as
/// planes report it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl BoundingBox {
    /// Contains nothing; the starting point for [`BoundingBox::including`].
    pub const EMPTY: BoundingBox = BoundingBox {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Contains everything.
    pub const INFINITE: BoundingBox = BoundingBox {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };

    /// Create a box from two opposite corners, in any order.
    pub fn from_points(a: Point3, b: Point3) -> Self {
        let mut bbox = Self {
            x: Interval::new(a.x().min(b.x()), a.x().max(b.x())),
            y: Interval::new(a.y().min(b.y()), a.y().max(b.y())),
            z: Interval::new(a.z().min(b.z()), a.z().max(b.z())),
        };
        bbox.pad_to_minimums();
        bbox
    }

    /// Grow the box to include `p`.
    pub fn including(&self, p: Point3) -> Self {
        Self {
            x: Interval::new(self.x.min.min(p.x()), self.x.max.max(p.x())),
            y: Interval::new(self.y.min.min(p.y()), self.y.max.max(p.y())),
            z: Interval::new(self.z.min.min(p.z()), self.z.max.max(p.z())),
        }
    }

    pub fn min(&self) -> Point3 {
        Point3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Point3 {
        Point3::new(self.x.max, self.y.max, self.z.max)
    }

    pub fn is_infinite(&self) -> bool {
        *self == Self::INFINITE
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn contains(&self, p: Point3) -> bool {
        self.x.contains(p.x()) && self.y.contains(p.y()) && self.z.contains(p.z())
    }

    /// Test if a ray intersects this box within the ray's valid interval.
    ///
    /// Uses the slab method. Touching a face counts as a hit so that the
    /// test never rejects a ray the exact shape test would accept.
    pub fn hit(&self, ray: &Ray) -> bool {
        if self.is_infinite() {
            return true;
        }

        let origin = ray.origin();
        let direction = ray.direction();
        let mut t = ray.interval();

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let inv_d = 1.0 / direction[axis];
            let mut t0 = (slab.min - origin[axis]) * inv_d;
            let mut t1 = (slab.max - origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            // NaN (origin on a slab face, parallel ray) leaves the bound alone.
            t.min = t0.max(t.min);
            t.max = t1.min(t.max);
            if t.max < t.min {
                return false;
            }
        }

        true
    }

    /// Pad intervals to avoid zero-width boxes (flat triangles, planes).
    fn pad_to_minimums(&mut self) {
        const MIN_WIDTH: f64 = 1e-4;
        for slab in [&mut self.x, &mut self.y, &mut self.z] {
            if slab.size() < MIN_WIDTH {
                *slab = slab.grow(MIN_WIDTH / 2.0);
            }
        }
    }
}
