//! Film: the render output sink.

use crate::Color;

/// Accumulates color samples per pixel.
///
/// Each pixel keeps a running sum and a sample count; [`Film::pixel`]
/// returns the average. Pixels that received no sample read as black.
#[derive(Debug, Clone, PartialEq)]
pub struct Film {
    width: u32,
    height: u32,
    sums: Vec<Color>,
    weights: Vec<f64>,
}

impl Film {
    pub fn new(width: u32, height: u32) -> Self {
        let len = pixel_count(width, height);
        Self {
            width,
            height,
            sums: vec![Color::ZERO; len],
            weights: vec![0.0; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Add a sample at raster position (x, y).
    pub fn add_sample(&mut self, x: u32, y: u32, color: Color) {
        let i = self.index(x, y);
        self.sums[i] += color;
        self.weights[i] += 1.0;
    }

    /// Average color at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let i = self.index(x, y);
        if self.weights[i] > 0.0 {
            self.sums[i] / self.weights[i]
        } else {
            Color::ZERO
        }
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(pixel_count(self.width, self.height) * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                bytes.extend_from_slice(&color_to_rgba(self.pixel(x, y)));
            }
        }
        bytes
    }
}

/// Pixels in a `width` x `height` image, without `u32` overflow.
pub fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let r = (255.0 * linear_to_gamma(color.x).clamp(0.0, 1.0)) as u8;
    let g = (255.0 * linear_to_gamma(color.y).clamp(0.0, 1.0)) as u8;
    let b = (255.0 * linear_to_gamma(color.z).clamp(0.0, 1.0)) as u8;
    [r, g, b, 255]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_are_averaged() {
        let mut film = Film::new(4, 2);
        film.add_sample(3, 1, Color::new(1.0, 0.0, 0.0));
        film.add_sample(3, 1, Color::new(0.0, 0.0, 1.0));

        assert_eq!(film.pixel(3, 1), Color::new(0.5, 0.0, 0.5));
        assert_eq!(film.pixel(0, 0), Color::ZERO);
    }

    #[test]
    fn test_color_to_rgba_gamma_and_clamp() {
        assert_eq!(color_to_rgba(Color::new(0.25, 0.0, 4.0)), [127, 0, 255, 255]);
        assert_eq!(color_to_rgba(Color::new(-1.0, 1.0, 0.0)), [0, 255, 0, 255]);
    }

    #[test]
    fn test_to_rgba_is_row_major() {
        let mut film = Film::new(2, 2);
        film.add_sample(1, 0, Color::ONE);

        let bytes = film.to_rgba();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[4..8], &[255, 255, 255, 255]);
        assert_eq!(&bytes[8..12], &[0, 0, 0, 255]);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_pixel_count_does_not_wrap() {
        // 70000^2 is past u32::MAX.
        assert_eq!(pixel_count(70_000, 70_000), 4_900_000_000);
        assert_eq!(pixel_count(u32::MAX, 2), 2 * u32::MAX as usize);
    }

    #[test]
    fn test_tall_film_indexing() {
        let mut film = Film::new(1, 300);
        film.add_sample(0, 299, Color::ONE);

        assert_eq!(film.pixel(0, 299), Color::ONE);
        assert_eq!(film.to_rgba().len(), 1200);
    }
}
