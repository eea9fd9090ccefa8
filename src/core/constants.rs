//! Engine-wide constants for the tile directory layout and layer defaults.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

use crate::rendering::context::Colour;

/// Name of the descriptor file in the tile root and in every level directory.
pub const TILE_INFO_FILENAME: &str = "tile.info";

/// Optional placeholder image (under the tile root) used for absent tiles.
pub const MISSING_TILE_FILENAME: &str = "missing_tile.png";

/// Default tile image extension.
pub const DEFAULT_TILE_EXTENSION: &str = "png";

/// View size used until the first resize arrives.
pub const DEFAULT_VIEW_SIZE: (f64, f64) = (800.0, 600.0);

/// Default radius (pixels) of points in point layers.
pub const DEFAULT_POINT_SIZE: f32 = 3.0;

/// Default line width (pixels) of polygon layers.
pub const DEFAULT_POLYGON_SIZE: f32 = 1.0;

/// Default colour of point and polygon layers.
pub const DEFAULT_LAYER_COLOUR: Colour = Colour::red();

/// Default distance (pixels) between a text anchor and its label.
pub const DEFAULT_TEXT_OFFSET: f64 = 4.0;

/// Radius of the dot drawn at every text anchor.
pub const TEXT_ANCHOR_RADIUS: f32 = 2.0;

/// Default arrow-key pan distance in pixels.
pub const DEFAULT_KEY_PAN_STEP: f64 = 64.0;

/// Stroke width of the box-select rectangle.
pub const SELECTION_BOX_WIDTH: f32 = 1.0;
