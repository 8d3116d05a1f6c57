//! Scene files for the lumen renderer.
//!
//! A scene file is JSON: render settings plus lists of cameras, lights and
//! shapes. [`load_scene`] reads and validates one into a renderable
//! [`Scene`](lumen_renderer::Scene); [`save_film`] writes a finished film
//! to disk.
//!
//! ```ignore
//! let loaded = lumen_scene::load_scene("scenes/demo.json")?;
//! let rendering = loaded.scene.render(0, &loaded.settings, &CancelToken::new())?;
//! lumen_scene::save_film(&rendering.film, "demo.png")?;
//! ```

pub mod description;
mod loader;
mod output;

pub use description::SceneDescription;
pub use loader::{load_scene, parse_scene, LoadedScene, SceneError, SceneResult};
pub use output::{save_film, OutputError, OutputResult};
