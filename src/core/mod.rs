pub mod config;
pub mod constants;
pub mod geo;
pub mod map;
pub mod transform;
pub mod viewport;

// Re-export the essential types
pub use config::{InteractionConfig, MapConfig, Modifier};
pub use geo::{GeoExtent, GeoPoint, Point};
pub use map::Map;
pub use transform::CoordinateTransform;
pub use viewport::Viewport;
