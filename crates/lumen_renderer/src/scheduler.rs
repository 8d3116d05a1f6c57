//! Tile-based rendering.
//!
//! The image is cut into a grid of render windows, `slices_per_core` rows
//! by one column per worker thread. Each window is rendered by a pure
//! function of (window, scene, camera, sampler) into its own pixel buffer,
//! so windows need no locking. The same routine runs on the calling thread
//! in serial mode and on a rayon pool in parallel mode; the results are
//! merged into the film after every window has finished.

use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::DVec2;
use rayon::prelude::*;
use thiserror::Error;

use crate::{
    Camera, Color, Film, RayCounts, RenderSettings, RenderStatistics, Sampler, SamplerLifecycle, Scene, Tracer,
};

/// Errors that abort a render.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("render cancelled")]
    Cancelled,

    #[error("failed to build worker pool: {0}")]
    PoolBuild(String),

    #[error("worker panicked while rendering window {window}")]
    WorkerPanicked { window: usize },

    #[error("scene has no camera {0}")]
    NoCamera(usize),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Cooperative cancellation flag, cheap to clone and share across threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A rectangular pixel region `[x_min, x_max) x [y_min, y_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderWindow {
    pub index: usize,
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl RenderWindow {
    pub fn width(&self) -> u32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min
    }

    pub fn pixel_count(&self) -> usize {
        crate::film::pixel_count(self.width(), self.height())
    }
}

/// Cut a `width` x `height` image into `slices_per_core` rows of
/// `core_count` columns. Windows are clipped to the image; windows that
/// fall entirely outside it are dropped.
pub fn partition(width: u32, height: u32, slices_per_core: u32, core_count: u32) -> Vec<RenderWindow> {
    let rows = slices_per_core.max(1);
    let cols = core_count.max(1);
    let tile_w = width.div_ceil(cols).max(1);
    let tile_h = height.div_ceil(rows).max(1);

    let mut windows = Vec::new();
    for row in 0..rows {
        let y_min = row * tile_h;
        let y_max = (y_min + tile_h).min(height);
        if y_min >= y_max {
            continue;
        }
        for col in 0..cols {
            let x_min = col * tile_w;
            let x_max = (x_min + tile_w).min(width);
            if x_min >= x_max {
                continue;
            }
            windows.push(RenderWindow {
                index: windows.len(),
                x_min,
                x_max,
                y_min,
                y_max,
            });
        }
    }
    windows
}

/// Result of rendering one window.
#[derive(Debug, Clone)]
pub struct TileResult {
    pub window: RenderWindow,
    /// Pixel colors in row-major order within the window
    pub pixels: Vec<Color>,
    pub counts: RayCounts,
    pub elapsed: Duration,
}

/// A finished render.
#[derive(Debug, Clone)]
pub struct Rendering {
    pub film: Film,
    pub statistics: RenderStatistics,
}

/// Everything a window render reads.
struct Frame<'a> {
    scene: &'a Scene,
    camera: &'a Camera,
    sampler: &'a Sampler,
    cancel: &'a CancelToken,
}

/// Drives the tile grid over a scene.
#[derive(Debug, Clone, Default)]
pub struct TileScheduler {
    settings: RenderSettings,
}

impl TileScheduler {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Render `scene` through `camera`.
    ///
    /// Returns [`RenderError::Cancelled`] if `cancel` fires before the last
    /// window completes; a partial film is never returned.
    pub fn render(&self, scene: &Scene, camera: &Camera, cancel: &CancelToken) -> RenderResult<Rendering> {
        let threads = self.settings.thread_count();
        let windows = partition(
            camera.width(),
            camera.height(),
            self.settings.slices_per_core,
            threads as u32,
        );
        let sampler = Sampler::new(
            self.settings.sampler,
            self.settings.samples_per_pixel,
            self.settings.sampler_sets,
            self.settings.seed,
        );
        let frame = Frame {
            scene,
            camera,
            sampler: &sampler,
            cancel,
        };

        log::info!(
            "Rendering {}x{}: {} windows, {} samples/pixel, {}",
            camera.width(),
            camera.height(),
            windows.len(),
            sampler.sample_count(),
            if self.settings.parallel {
                format!("{} threads", threads)
            } else {
                "serial".to_string()
            }
        );

        let start = Instant::now();
        let tiles = self.run_windows(&windows, threads, |window| self.render_window(window, &frame))?;
        let wall_time = start.elapsed();

        let mut film = Film::new(camera.width(), camera.height());
        let mut statistics = RenderStatistics {
            wall_time,
            tiles: tiles.len(),
            ..Default::default()
        };
        for tile in &tiles {
            merge_tile(&mut film, tile);
            statistics.worker_time += tile.elapsed;
            statistics.counts += tile.counts;
        }

        log::info!("Render complete: {}", statistics);
        Ok(Rendering { film, statistics })
    }

    /// Run `render` over every window, on a pool of `threads` workers or on
    /// the calling thread. A panic inside `render` becomes
    /// [`RenderError::WorkerPanicked`]. Tiles come back in window order.
    fn run_windows<F>(&self, windows: &[RenderWindow], threads: usize, render: F) -> RenderResult<Vec<TileResult>>
    where
        F: Fn(&RenderWindow) -> RenderResult<TileResult> + Sync,
    {
        let guarded = |window: &RenderWindow| {
            panic::catch_unwind(AssertUnwindSafe(|| render(window)))
                .unwrap_or(Err(RenderError::WorkerPanicked { window: window.index }))
        };

        if self.settings.parallel {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| RenderError::PoolBuild(e.to_string()))?;
            pool.install(|| windows.par_iter().map(guarded).collect())
        } else {
            windows.iter().map(guarded).collect()
        }
    }

    fn render_window(&self, window: &RenderWindow, frame: &Frame<'_>) -> RenderResult<TileResult> {
        if frame.cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }

        let start = Instant::now();
        let sampler = match self.settings.sampler_lifecycle {
            SamplerLifecycle::Shared => Cow::Borrowed(frame.sampler),
            SamplerLifecycle::PerTile => Cow::Owned(
                frame
                    .sampler
                    .reseeded(self.settings.seed.wrapping_add(window.index as u64 + 1)),
            ),
        };
        let tracer = Tracer::new(frame.scene, &sampler, self.settings.max_depth);
        let mut counts = RayCounts::default();
        let mut pixels = Vec::with_capacity(window.pixel_count());

        for y in window.y_min..window.y_max {
            for x in window.x_min..window.x_max {
                if frame.cancel.is_cancelled() {
                    return Err(RenderError::Cancelled);
                }
                pixels.push(self.render_pixel(x, y, frame.camera, &sampler, &tracer, &mut counts));
            }
        }

        let elapsed = start.elapsed();
        log::debug!(
            "Window {} [{}..{}, {}..{}] done in {:.1}ms",
            window.index,
            window.x_min,
            window.x_max,
            window.y_min,
            window.y_max,
            elapsed.as_secs_f64() * 1000.0
        );

        Ok(TileResult {
            window: *window,
            pixels,
            counts,
            elapsed,
        })
    }

    /// Average of all camera rays through pixel (x, y).
    fn render_pixel(
        &self,
        x: u32,
        y: u32,
        camera: &Camera,
        sampler: &Sampler,
        tracer: &Tracer<'_>,
        counts: &mut RayCounts,
    ) -> Color {
        let set = sampler.set_index(x, y);
        let squares = sampler.unit_square_samples(set);
        let lens = sampler.unit_circle_samples(set + 1);
        let lens_rays = if camera.has_lens() {
            self.settings.lens_samples.max(1)
        } else {
            1
        };

        let mut color = Color::ZERO;
        for (i, offset) in squares.iter().enumerate() {
            let raster = DVec2::new(x as f64 + offset.x, y as f64 + offset.y);
            for j in 0..lens_rays {
                let ray = camera.generate_ray(raster, lens[(i * lens_rays + j) % lens.len()]);
                color += tracer.trace_ray(&ray, 1, set, counts);
            }
        }

        color / (squares.len() * lens_rays) as f64
    }
}

fn merge_tile(film: &mut Film, tile: &TileResult) {
    let window = &tile.window;
    let width = window.width() as usize;
    for (i, color) in tile.pixels.iter().enumerate() {
        let x = window.x_min + (i % width) as u32;
        let y = window.y_min + (i / width) as u32;
        film.add_sample(x, y, *color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Light, Plane, Projection, Shader};
    use lumen_math::{Point3, Transformation, Vector3};

    fn covered(windows: &[RenderWindow], width: u32, height: u32) -> Vec<u32> {
        let mut hits = vec![0; crate::film::pixel_count(width, height)];
        for w in windows {
            for y in w.y_min..w.y_max {
                for x in w.x_min..w.x_max {
                    hits[y as usize * width as usize + x as usize] += 1;
                }
            }
        }
        hits
    }

    #[test]
    fn test_partition_exact_fit() {
        let windows = partition(128, 64, 4, 2);

        assert_eq!(windows.len(), 8);
        assert!(windows.iter().all(|w| w.width() == 64 && w.height() == 16));
        assert!(covered(&windows, 128, 64).iter().all(|&c| c == 1));
    }

    #[test]
    fn test_partition_clips_to_image() {
        let windows = partition(100, 37, 3, 4);

        let total: usize = windows.iter().map(|w| w.pixel_count()).sum();
        assert_eq!(total, 100 * 37);
        assert!(covered(&windows, 100, 37).iter().all(|&c| c == 1));
        assert!(windows.iter().all(|w| w.x_max <= 100 && w.y_max <= 37));
    }

    #[test]
    fn test_partition_small_image_drops_empty_windows() {
        let windows = partition(3, 2, 8, 16);

        assert_eq!(windows.len(), 6);
        for (i, w) in windows.iter().enumerate() {
            assert_eq!(w.index, i);
            assert_eq!(w.pixel_count(), 1);
        }
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let shared = token.clone();
        assert!(!token.is_cancelled());

        shared.cancel();
        assert!(token.is_cancelled());
    }

    fn lit_floor() -> (Scene, Camera) {
        let mut scene = Scene::new();
        scene.add_shape(Plane::new(Transformation::IDENTITY, Shader::default()).into());
        scene.add_light(Light::Point {
            position: Point3::new(0.0, 5.0, 0.0),
            color: Color::ONE,
            power: 25.0,
        });
        let camera = Camera::new(
            16,
            8,
            Point3::new(0.0, 2.0, -6.0),
            Point3::ZERO,
            Vector3::Y,
            Projection::pinhole(1.0),
        )
        .unwrap();
        (scene, camera)
    }

    #[test]
    fn test_cancelled_render_returns_no_film() {
        let (scene, camera) = lit_floor();
        let cancel = CancelToken::new();
        cancel.cancel();

        let scheduler = TileScheduler::new(RenderSettings {
            parallel: false,
            ..Default::default()
        });
        assert_eq!(
            scheduler.render(&scene, &camera, &cancel).unwrap_err(),
            RenderError::Cancelled
        );
    }

    #[test]
    fn test_render_statistics() {
        let (scene, camera) = lit_floor();
        let settings = RenderSettings {
            samples_per_pixel: 4,
            sampler: crate::SamplerKind::Regular,
            threads: 2,
            slices_per_core: 2,
            ..Default::default()
        };

        let rendering = TileScheduler::new(settings)
            .render(&scene, &camera, &CancelToken::new())
            .unwrap();

        let stats = rendering.statistics;
        assert_eq!(stats.tiles, 4);
        assert_eq!(stats.counts.eye, 16 * 8 * 4);
        assert_eq!(stats.counts.secondary, 0);
        assert!(stats.counts.shadow > 0);
        assert_eq!(rendering.film.width(), 16);

        // The floor fills the bottom row and is lit.
        assert!(rendering.film.pixel(8, 7).x > 0.0);
    }

    fn empty_tile(window: &RenderWindow) -> TileResult {
        TileResult {
            window: *window,
            pixels: vec![Color::ZERO; window.pixel_count()],
            counts: RayCounts::default(),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_worker_panic_becomes_error() {
        let windows = partition(8, 8, 2, 2);

        for parallel in [true, false] {
            let scheduler = TileScheduler::new(RenderSettings {
                parallel,
                threads: 2,
                ..Default::default()
            });
            let result = scheduler.run_windows(&windows, 2, |window| {
                if window.index == 1 {
                    panic!("shading blew up");
                }
                Ok(empty_tile(window))
            });

            assert_eq!(
                result.unwrap_err(),
                RenderError::WorkerPanicked { window: 1 },
                "parallel = {parallel}"
            );
        }
    }

    #[test]
    fn test_run_windows_keeps_window_order() {
        let windows = partition(8, 8, 2, 2);
        let scheduler = TileScheduler::new(RenderSettings {
            threads: 4,
            ..Default::default()
        });

        let tiles = scheduler.run_windows(&windows, 4, |window| Ok(empty_tile(window))).unwrap();

        let order: Vec<usize> = tiles.iter().map(|t| t.window.index).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }
}
