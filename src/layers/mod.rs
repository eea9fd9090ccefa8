pub mod base;
pub mod manager;
pub mod placement;
pub mod zorder;

// Re-export the essential types
pub use base::{
    BoxSelectCallback, ImageRecord, ImageSource, Layer, LayerData, LayerId, LayerKind,
    LayerOptions, PointRecord, PointSelectCallback, TextLabel,
};
pub use hit_test::{nearest_point, points_in_box, BoxHit, SelectablePoint};
pub use manager::{LayerStore, SelectButton};
pub use placement::{ImagePlacement, TextAttributes, TextPlacement};
pub use zorder::ZOrder;
