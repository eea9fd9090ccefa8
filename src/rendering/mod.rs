pub mod context;
pub mod renderer;

// Re-export main types
pub use context::{Canvas, Colour, DrawCommand, RenderContext, ShapeStyle};
pub use renderer::{visible_tile_range, Renderer, TileRange};
