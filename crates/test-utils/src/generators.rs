//! Synthetic RGBA rasters for tests.
//!
//! Rasters start fully transparent; tests paint the pixels they care about.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat};

/// A tightly packed RGBA8888 buffer under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RgbaImage {
    /// A fully transparent black image.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Every pixel set to `rgb` with alpha `a`.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3], a: u8) -> Self {
        let mut image = Self::transparent(width, height);
        for y in 0..height {
            for x in 0..width {
                image.set(x, y, rgb, a);
            }
        }
        image
    }

    /// Paint one pixel. Panics when out of bounds.
    pub fn set(&mut self, x: u32, y: u32, [r, g, b]: [u8; 3], a: u8) -> &mut Self {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.data[idx..idx + 4].copy_from_slice(&[r, g, b, a]);
        self
    }

    /// Builder form of [`RgbaImage::set`].
    pub fn with_pixel(mut self, x: u32, y: u32, rgb: [u8; 3], a: u8) -> Self {
        self.set(x, y, rgb, a);
        self
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Vec<u8> {
        let buffer = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .expect("buffer matches dimensions");
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(buffer)
            .write_to(&mut out, ImageOutputFormat::Png)
            .expect("PNG encoding failed");
        out.into_inner()
    }
}

/// A transparent square tile with a single opaque pixel.
pub fn single_pixel_tile(size: u32, x: u32, y: u32, rgb: [u8; 3]) -> RgbaImage {
    RgbaImage::transparent(size, size).with_pixel(x, y, rgb, 255)
}
