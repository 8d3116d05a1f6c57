//! Sample point generators.
//!
//! A [`Sampler`] pre-generates a fixed number of sets of unit-square
//! samples at construction and derives disc and sphere samples from them.
//! Tables are never modified afterwards, so one sampler can be shared by
//! every worker thread. A pixel picks its set deterministically from its
//! coordinates, which keeps serial and parallel renders identical.

use std::f64::consts::{FRAC_PI_4, TAU};

use glam::DVec2;
use lumen_math::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Sample pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    /// Cell centres of a √n × √n grid.
    Regular,
    /// One random point per grid cell.
    #[default]
    Stratified,
    /// Halton sequence in bases 2 and 3.
    Halton,
    /// A single sample at (0.5, 0.5).
    Single,
}

#[derive(Debug, Clone)]
pub struct Sampler {
    kind: SamplerKind,
    seed: u64,
    square: Vec<Vec<DVec2>>,
    circle: Vec<Vec<DVec2>>,
    sphere: Vec<Vec<Vector3>>,
}

impl Sampler {
    /// Build `sets` sets of `samples` points each.
    ///
    /// Grid-based kinds need a square sample count; other counts are rounded
    /// down to the nearest square. [`SamplerKind::Single`] always produces one
    /// sample per set.
    pub fn new(kind: SamplerKind, samples: usize, sets: usize, seed: u64) -> Self {
        let sets = sets.max(1);
        let samples = samples.max(1);

        let square: Vec<Vec<DVec2>> = match kind {
            SamplerKind::Regular => {
                let grid = grid_size(samples);
                vec![regular(grid); sets]
            }
            SamplerKind::Stratified => {
                let grid = grid_size(samples);
                let mut rng = StdRng::seed_from_u64(seed);
                (0..sets).map(|_| stratified(grid, &mut rng)).collect()
            }
            SamplerKind::Halton => (0..sets).map(|set| halton(set, samples)).collect(),
            SamplerKind::Single => vec![vec![DVec2::splat(0.5)]; sets],
        };

        let circle = square
            .iter()
            .map(|set| set.iter().copied().map(concentric_disc).collect())
            .collect();
        let sphere = square
            .iter()
            .map(|set| set.iter().copied().map(unit_sphere).collect())
            .collect();

        Self {
            kind,
            seed,
            square,
            circle,
            sphere,
        }
    }

    /// A fresh sampler of the same shape with a different seed.
    pub fn reseeded(&self, seed: u64) -> Self {
        Self::new(self.kind, self.sample_count(), self.set_count(), seed)
    }

    pub fn kind(&self) -> SamplerKind {
        self.kind
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Samples per set.
    pub fn sample_count(&self) -> usize {
        self.square[0].len()
    }

    pub fn set_count(&self) -> usize {
        self.square.len()
    }

    /// Deterministic set index for a pixel.
    pub fn set_index(&self, x: u32, y: u32) -> usize {
        let h = (x as u64).wrapping_mul(73_856_093) ^ (y as u64).wrapping_mul(19_349_663);
        (h % self.set_count() as u64) as usize
    }

    /// Points in `[0, 1)²`.
    pub fn unit_square_samples(&self, set: usize) -> &[DVec2] {
        &self.square[set % self.square.len()]
    }

    /// Points in the unit disc, by concentric mapping.
    pub fn unit_circle_samples(&self, set: usize) -> &[DVec2] {
        &self.circle[set % self.circle.len()]
    }

    /// Points on the unit sphere.
    pub fn unit_sphere_samples(&self, set: usize) -> &[Vector3] {
        &self.sphere[set % self.sphere.len()]
    }

    /// Directions on the +Z hemisphere with density proportional to
    /// `cos^e(θ)`.
    pub fn unit_hemisphere_samples(&self, set: usize, cosine_power: f64) -> Vec<Vector3> {
        self.unit_square_samples(set)
            .iter()
            .map(|p| hemisphere(*p, cosine_power))
            .collect()
    }
}

fn grid_size(samples: usize) -> usize {
    let grid = ((samples as f64).sqrt().floor() as usize).max(1);
    if grid * grid != samples {
        log::warn!(
            "{} samples is not a square number, using {}",
            samples,
            grid * grid
        );
    }
    grid
}

fn regular(grid: usize) -> Vec<DVec2> {
    let step = 1.0 / grid as f64;
    (0..grid)
        .flat_map(|j| (0..grid).map(move |i| DVec2::new((i as f64 + 0.5) * step, (j as f64 + 0.5) * step)))
        .collect()
}

fn stratified(grid: usize, rng: &mut StdRng) -> Vec<DVec2> {
    let step = 1.0 / grid as f64;
    let mut samples = Vec::with_capacity(grid * grid);
    for j in 0..grid {
        for i in 0..grid {
            let jitter = DVec2::new(rng.gen::<f64>(), rng.gen::<f64>());
            samples.push(DVec2::new((i as f64 + jitter.x) * step, (j as f64 + jitter.y) * step));
        }
    }
    samples
}

/// Set `set` uses sequence indices `set * n + 1 ..= set * n + n`; index 0
/// is skipped because it maps to the origin in every base.
fn halton(set: usize, n: usize) -> Vec<DVec2> {
    (0..n)
        .map(|i| {
            let index = (set * n + i + 1) as u64;
            DVec2::new(radical_inverse(index, 2), radical_inverse(index, 3))
        })
        .collect()
}

fn radical_inverse(mut index: u64, base: u64) -> f64 {
    let inv_base = 1.0 / base as f64;
    let mut factor = inv_base;
    let mut result = 0.0;
    while index > 0 {
        result += (index % base) as f64 * factor;
        index /= base;
        factor *= inv_base;
    }
    result
}

/// Shirley-Chiu concentric mapping from the unit square to the unit disc.
fn concentric_disc(p: DVec2) -> DVec2 {
    let a = 2.0 * p.x - 1.0;
    let b = 2.0 * p.y - 1.0;
    if a == 0.0 && b == 0.0 {
        return DVec2::ZERO;
    }

    let (r, phi) = if a > -b {
        if a > b {
            (a, FRAC_PI_4 * (b / a))
        } else {
            (b, FRAC_PI_4 * (2.0 - a / b))
        }
    } else if a < b {
        (-a, FRAC_PI_4 * (4.0 + b / a))
    } else {
        (-b, FRAC_PI_4 * (6.0 - a / b))
    };

    let (sin, cos) = phi.sin_cos();
    DVec2::new(r * cos, r * sin)
}

fn unit_sphere(p: DVec2) -> Vector3 {
    let z = 1.0 - 2.0 * p.y;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let (sin, cos) = (TAU * p.x).sin_cos();
    Vector3::new(r * cos, r * sin, z)
}

fn hemisphere(p: DVec2, cosine_power: f64) -> Vector3 {
    let (sin_phi, cos_phi) = (TAU * p.x).sin_cos();
    let cos_theta = (1.0 - p.y).powf(1.0 / (cosine_power + 1.0));
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    Vector3::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_grid_is_centered() {
        let sampler = Sampler::new(SamplerKind::Regular, 4, 1, 0);
        let samples = sampler.unit_square_samples(0);

        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], DVec2::new(0.25, 0.25));
        assert_eq!(samples[3], DVec2::new(0.75, 0.75));
    }

    #[test]
    fn test_non_square_count_is_rounded_down() {
        let sampler = Sampler::new(SamplerKind::Regular, 10, 1, 0);
        assert_eq!(sampler.sample_count(), 9);
    }

    #[test]
    fn test_stratified_one_sample_per_cell() {
        let sampler = Sampler::new(SamplerKind::Stratified, 16, 3, 42);

        for set in 0..3 {
            let samples = sampler.unit_square_samples(set);
            let mut cells = vec![0; 16];
            for s in samples {
                assert!((0.0..1.0).contains(&s.x) && (0.0..1.0).contains(&s.y));
                cells[(s.y * 4.0) as usize * 4 + (s.x * 4.0) as usize] += 1;
            }
            assert!(cells.iter().all(|&c| c == 1));
        }
    }

    #[test]
    fn test_stratified_is_reproducible_per_seed() {
        let a = Sampler::new(SamplerKind::Stratified, 9, 2, 7);
        let b = Sampler::new(SamplerKind::Stratified, 9, 2, 7);
        let c = a.reseeded(8);

        assert_eq!(a.unit_square_samples(1), b.unit_square_samples(1));
        assert_ne!(a.unit_square_samples(0), c.unit_square_samples(0));
        assert_eq!(c.sample_count(), 9);
        assert_eq!(c.set_count(), 2);
    }

    #[test]
    fn test_halton_sequence() {
        let sampler = Sampler::new(SamplerKind::Halton, 3, 2, 0);
        let first = sampler.unit_square_samples(0);
        let close = |a: DVec2, b: DVec2| (a - b).length() < 1e-12;

        assert!(close(first[0], DVec2::new(0.5, 1.0 / 3.0)));
        assert!(close(first[1], DVec2::new(0.25, 2.0 / 3.0)));
        assert!(close(first[2], DVec2::new(0.75, 1.0 / 9.0)));

        // Set 1 continues the sequence at index 4.
        assert!(close(sampler.unit_square_samples(1)[0], DVec2::new(0.125, 4.0 / 9.0)));
    }

    #[test]
    fn test_single_sampler() {
        let sampler = Sampler::new(SamplerKind::Single, 16, 4, 0);

        assert_eq!(sampler.sample_count(), 1);
        assert_eq!(sampler.unit_square_samples(3), &[DVec2::splat(0.5)]);
        assert_eq!(sampler.unit_circle_samples(3), &[DVec2::ZERO]);
    }

    #[test]
    fn test_concentric_disc_corners_and_edges() {
        let right = concentric_disc(DVec2::new(1.0, 0.5));
        assert!((right - DVec2::new(1.0, 0.0)).length() < 1e-12);

        let top = concentric_disc(DVec2::new(0.5, 1.0));
        assert!((top - DVec2::new(0.0, 1.0)).length() < 1e-12);

        let left = concentric_disc(DVec2::new(0.0, 0.5));
        assert!((left - DVec2::new(-1.0, 0.0)).length() < 1e-12);

        let bottom = concentric_disc(DVec2::new(0.5, 0.0));
        assert!((bottom - DVec2::new(0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn test_circle_samples_inside_disc() {
        let sampler = Sampler::new(SamplerKind::Stratified, 64, 2, 3);

        for p in sampler.unit_circle_samples(1) {
            assert!(p.length() <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn test_sphere_and_hemisphere_samples() {
        let sampler = Sampler::new(SamplerKind::Halton, 32, 1, 0);

        for v in sampler.unit_sphere_samples(0) {
            assert!((v.length() - 1.0).abs() < 1e-12);
        }
        for v in sampler.unit_hemisphere_samples(0, 1.0) {
            assert!((v.length() - 1.0).abs() < 1e-12);
            assert!(v.z() >= 0.0);
        }
    }

    #[test]
    fn test_set_index_is_deterministic_and_in_range() {
        let sampler = Sampler::new(SamplerKind::Regular, 1, 7, 0);

        for y in 0..20 {
            for x in 0..20 {
                let set = sampler.set_index(x, y);
                assert!(set < 7);
                assert_eq!(set, sampler.set_index(x, y));
            }
        }
    }
}
