//! Render configuration, assembled once and passed down by reference.

use serde::{Deserialize, Serialize};

use crate::tracer::MAX_DEPTH;
use crate::SamplerKind;

/// How tiles obtain their sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerLifecycle {
    /// One sampler, read by every tile.
    #[default]
    Shared,
    /// Each tile builds its own sampler, seeded from the tile index.
    PerTile,
}

/// Render settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Recursion limit for reflected rays
    pub max_depth: u32,
    /// Sub-pixel samples per pixel
    pub samples_per_pixel: usize,
    /// Lens rays per sub-pixel sample, for cameras with a lens
    pub lens_samples: usize,
    pub sampler: SamplerKind,
    /// Number of precomputed sample sets
    pub sampler_sets: usize,
    pub sampler_lifecycle: SamplerLifecycle,
    pub seed: u64,
    /// Worker threads; 0 uses the logical core count
    pub threads: usize,
    /// Rows of tiles; the grid has one column per worker thread
    pub slices_per_core: u32,
    /// Render tiles on a thread pool instead of the calling thread
    pub parallel: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            samples_per_pixel: 4,
            lens_samples: 1,
            sampler: SamplerKind::Stratified,
            sampler_sets: 83,
            sampler_lifecycle: SamplerLifecycle::Shared,
            seed: 0,
            threads: 0,
            slices_per_core: 8,
            parallel: true,
        }
    }
}

impl RenderSettings {
    /// Worker thread count, resolving 0 to the available parallelism.
    pub fn thread_count(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}
