//! Render statistics.
//!
//! Ray counts are kept per tile by the worker that renders it and summed
//! after all tiles have joined, so no counter is ever shared between
//! threads.

use std::fmt;
use std::ops::AddAssign;
use std::time::Duration;

/// Rays traced, by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RayCounts {
    /// Primary rays from the camera
    pub eye: u64,
    /// Reflected rays
    pub secondary: u64,
    /// Occlusion tests towards lights
    pub shadow: u64,
    /// Rays dropped by the recursion limit
    pub cancelled: u64,
}

impl RayCounts {
    pub fn total(&self) -> u64 {
        self.eye + self.secondary + self.shadow
    }
}

impl AddAssign for RayCounts {
    fn add_assign(&mut self, other: RayCounts) {
        self.eye += other.eye;
        self.secondary += other.secondary;
        self.shadow += other.shadow;
        self.cancelled += other.cancelled;
    }
}

impl fmt::Display for RayCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "eye {}, secondary {}, shadow {}, cancelled {}",
            self.eye, self.secondary, self.shadow, self.cancelled
        )
    }
}

/// Summary of a finished render.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderStatistics {
    /// Time from submission of the first tile to completion of the last
    pub wall_time: Duration,
    /// Sum of the time each tile took
    pub worker_time: Duration,
    pub tiles: usize,
    pub counts: RayCounts,
}

impl fmt::Display for RenderStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tiles in {:.3}s wall / {:.3}s worker; rays: {}",
            self.tiles,
            self.wall_time.as_secs_f64(),
            self.worker_time.as_secs_f64(),
            self.counts
        )
    }
}
