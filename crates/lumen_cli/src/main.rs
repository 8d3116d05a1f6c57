//! lumen: render JSON scene files from the command line.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lumen_renderer::{CancelToken, Projection, RenderSettings};
use lumen_scene::{load_scene, save_film, LoadedScene};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

#[derive(Parser)]
#[command(name = "lumen")]
#[command(version)]
#[command(about = "Whitted-style ray tracer")]
#[command(long_about = "
lumen renders JSON scene files with a recursive ray tracer.

Example usage:
  lumen render scenes/demo.json -o demo.png
  lumen render scenes/demo.json -o top.png --camera 1 --samples 4
  lumen info scenes/demo.json
")]
struct Cli {
    /// Set logging level (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a scene to an image file
    Render {
        /// Scene file (JSON)
        scene: PathBuf,
        /// Output image; the format follows the extension
        #[arg(short, long, default_value = "render.png")]
        output: PathBuf,
        /// Worker threads (0 = one per logical core)
        #[arg(short, long)]
        threads: Option<usize>,
        /// Render on the calling thread only
        #[arg(long)]
        serial: bool,
        /// Samples per pixel
        #[arg(short, long)]
        samples: Option<usize>,
        /// Index of the camera to render through
        #[arg(short, long, default_value_t = 0)]
        camera: usize,
    },

    /// Print a summary of a scene file
    Info {
        /// Scene file (JSON)
        scene: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::new();
    match cli.log_level {
        Some(level) => {
            logger.filter_level(level.into());
        }
        None => {
            logger.filter_level(log::LevelFilter::Info).parse_default_env();
        }
    }
    logger.init();

    match cli.command {
        Commands::Render {
            scene,
            output,
            threads,
            serial,
            samples,
            camera,
        } => {
            let loaded = load(&scene)?;
            let settings = apply_overrides(loaded.settings.clone(), threads, serial, samples);
            render(&loaded, &settings, camera, &output)?;
        }
        Commands::Info { scene } => {
            let loaded = load(&scene)?;
            print_info(&scene, &loaded);
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<LoadedScene> {
    load_scene(path).with_context(|| format!("Failed to load scene {}", path.display()))
}

fn apply_overrides(
    mut settings: RenderSettings,
    threads: Option<usize>,
    serial: bool,
    samples: Option<usize>,
) -> RenderSettings {
    if let Some(threads) = threads {
        settings.threads = threads;
    }
    if serial {
        settings.parallel = false;
    }
    if let Some(samples) = samples {
        settings.samples_per_pixel = samples.max(1);
    }
    settings
}

fn render(loaded: &LoadedScene, settings: &RenderSettings, camera: usize, output: &Path) -> Result<()> {
    let cameras = loaded.scene.cameras().len();
    if camera >= cameras {
        bail!("Camera {camera} does not exist; the scene has {cameras}");
    }

    let rendering = loaded
        .scene
        .render(camera, settings, &CancelToken::new())
        .context("Render failed")?;

    let stats = &rendering.statistics;
    println!("{stats}");
    println!(
        "{:.2} Mrays/s",
        stats.counts.total() as f64 / stats.wall_time.as_secs_f64().max(1e-9) / 1e6
    );

    save_film(&rendering.film, output).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Saved {}", output.display());
    Ok(())
}

fn print_info(path: &Path, loaded: &LoadedScene) {
    let scene = &loaded.scene;
    println!("{}", path.display());

    println!("  cameras: {}", scene.cameras().len());
    for (i, camera) in scene.cameras().iter().enumerate() {
        let kind = match camera.projection() {
            Projection::Perspective { fov, lens_radius, .. } if *lens_radius > 0.0 => {
                format!("perspective, fov {:.1}°, lens radius {lens_radius}", fov.to_degrees())
            }
            Projection::Perspective { fov, .. } => format!("perspective, fov {:.1}°", fov.to_degrees()),
            Projection::Orthographic { half_height } => format!("orthographic, half height {half_height}"),
        };
        println!("    [{i}] {}x{} {kind}", camera.width(), camera.height());
    }

    println!("  lights: {}", scene.lights().len());
    for (i, light) in scene.lights().iter().enumerate() {
        let delta = if light.is_delta() { "delta" } else { "extended" };
        println!("    [{i}] {} ({delta}), power {}", light.kind(), light.power());
    }

    let count = |kind: &str| scene.shapes().iter().filter(|s| s.kind() == kind).count();
    println!(
        "  shapes: {} ({} spheres, {} planes, {} triangles)",
        scene.shapes().len(),
        count("sphere"),
        count("plane"),
        count("triangle")
    );
    let reflective = scene
        .shapes()
        .iter()
        .filter(|s| s.shader().material.is_reflective())
        .count();
    println!("    reflective: {reflective}");

    let s = &loaded.settings;
    println!(
        "  settings: {} spp ({:?}), max depth {}, {}",
        s.samples_per_pixel,
        s.sampler,
        s.max_depth,
        if s.parallel {
            format!("{} threads", s.thread_count())
        } else {
            "serial".to_string()
        }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_arguments() {
        let cli = Cli::try_parse_from([
            "lumen", "render", "scene.json", "-o", "out.ppm", "--threads", "3", "--serial", "--samples", "9",
            "--log-level", "debug",
        ])
        .unwrap();

        assert!(matches!(cli.log_level, Some(LogLevel::Debug)));
        match cli.command {
            Commands::Render {
                scene,
                output,
                threads,
                serial,
                samples,
                camera,
            } => {
                assert_eq!(scene, PathBuf::from("scene.json"));
                assert_eq!(output, PathBuf::from("out.ppm"));
                assert_eq!(threads, Some(3));
                assert!(serial);
                assert_eq!(samples, Some(9));
                assert_eq!(camera, 0);
            }
            Commands::Info { .. } => panic!("expected render"),
        }
    }

    #[test]
    fn test_overrides_keep_scene_values_by_default() {
        let base = RenderSettings {
            samples_per_pixel: 16,
            threads: 2,
            ..Default::default()
        };

        assert_eq!(apply_overrides(base.clone(), None, false, None), base);

        let changed = apply_overrides(base, Some(8), true, Some(0));
        assert_eq!(changed.threads, 8);
        assert!(!changed.parallel);
        assert_eq!(changed.samples_per_pixel, 1);
    }
}
