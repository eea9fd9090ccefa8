pub mod cache;
pub mod info;
pub mod store;

// Re-exports for convenience
pub use cache::{CachePolicy, CacheStrategy, TileCache, TileKey};
pub use info::{LevelInfo, TileSet};
pub use store::TileStore;

use crate::{core::geo::Point, rendering::context::Colour, Result};
use image::{Rgba, RgbaImage};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A decoded image shared between the caches and the layers that draw it
///
/// The key identifies the image to backends that upload pixels once and
/// reuse them (e.g. as GPU textures).
#[derive(Clone)]
pub struct ImageHandle {
    key: Arc<str>,
    pixels: Arc<RgbaImage>,
}

impl ImageHandle {
    pub fn new(key: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            key: Arc::from(key.into()),
            pixels: Arc::new(pixels),
        }
    }

    /// Decodes an image file, keyed by its path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let pixels = image::open(path)?.to_rgba8();
        Ok(Self::new(path.display().to_string(), pixels))
    }

    /// A solid image of the given size
    pub fn filled(key: impl Into<String>, width: u32, height: u32, colour: Colour) -> Self {
        Self::new(
            key,
            RgbaImage::from_pixel(width, height, Rgba(colour.to_array())),
        )
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Point {
        Point::new(f64::from(self.width()), f64::from(self.height()))
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("key", &self.key)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}
