//! Writing films to image files.

use std::path::Path;

use image::{ImageFormat, RgbImage};
use lumen_renderer::Film;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Film buffer does not match {width}x{height}")]
    Buffer { width: u32, height: u32 },
}

pub type OutputResult<T> = Result<T, OutputError>;

/// Convert a film to an 8-bit RGB image.
pub fn film_to_image(film: &Film) -> OutputResult<RgbImage> {
    let (width, height) = (film.width(), film.height());
    let rgb: Vec<u8> = film
        .to_rgba()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    RgbImage::from_raw(width, height, rgb).ok_or(OutputError::Buffer { width, height })
}

/// Save `film` to `path`. The format follows the file extension.
pub fn save_film<P: AsRef<Path>>(film: &Film, path: P) -> OutputResult<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    film_to_image(film)?.save_with_format(path, format)?;
    log::info!("Wrote {}x{} image to {}", film.width(), film.height(), path.display());
    Ok(())
}
