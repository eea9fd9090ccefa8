//! # slipmap
//!
//! A tiled "slippy map" view and layer composition engine.
//!
//! The map is built from a pyramid of pre-rendered tile images on disk. On
//! top of the tiles the engine composites point, polygon, image and text
//! layers in Z-order, and turns pointer, wheel and keyboard input into pan,
//! zoom, point-select and box-select actions.
//!
//! The engine itself is backend-agnostic: painting goes through the
//! [`Canvas`] trait. With the `egui` feature a ready-made widget is provided
//! in [`ui::widget`].

pub mod core;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod tiles;
#[cfg(feature = "egui")]
pub mod ui;

use std::path::PathBuf;

// Re-export public API
pub use crate::core::{
    config::MapConfig,
    geo::{GeoExtent, GeoPoint, Point},
    map::Map,
    transform::CoordinateTransform,
    viewport::Viewport,
};

pub use layers::{
    base::{Layer, LayerData, LayerId, LayerOptions},
    hit_test::{nearest_point, points_in_box, BoxHit},
    manager::LayerStore,
};

pub use input::{events::InputEvent, handler::InputHandler};

pub use rendering::{
    context::{Canvas, Colour, DrawCommand, RenderContext},
    renderer::Renderer,
};

pub use tiles::{
    cache::{CachePolicy, TileCache},
    info::{LevelInfo, TileSet},
    store::TileStore,
    ImageHandle,
};

#[cfg(feature = "egui")]
pub use ui::widget::MapWidget;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, SlipError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum SlipError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("'{}' doesn't appear to be a tile directory", path.display())]
    MissingTileInfo { path: PathBuf },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown layer id: {0}")]
    UnknownLayer(LayerId),

    #[error("Level {0} is out of range or unavailable")]
    LevelOutOfRange(u8),
}

/// Error type alias for convenience
pub type Error = SlipError;
