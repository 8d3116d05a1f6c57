/// Closed range of ray parameters or coordinates, `lo..=hi`.
///
/// A range with `lo > hi` holds nothing. Rays carry one as their valid `t`
/// span and bounding boxes use one per axis as a slab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const EMPTY: Interval = Interval {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub const UNIVERSE: Interval = Interval {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Width of the range; negative when empty.
    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Both ends count.
    pub fn contains(&self, t: f64) -> bool {
        (self.min..=self.max).contains(&t)
    }

    /// Widen by `margin` at each end.
    pub fn grow(&self, margin: f64) -> Interval {
        Interval::new(self.min - margin, self.max + margin)
    }
}
