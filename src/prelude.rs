//! Prelude module for common slipmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use slipmap::prelude::*;`

pub use crate::core::{
    config::{InteractionConfig, MapConfig, Modifier},
    geo::{GeoExtent, GeoPoint, Point},
    map::Map,
    transform::CoordinateTransform,
    viewport::Viewport,
};

pub use crate::layers::{
    base::{
        BoxSelectCallback, ImageRecord, ImageSource, Layer, LayerData, LayerId, LayerKind,
        LayerOptions, PointRecord, PointSelectCallback, TextLabel,
    },
    hit_test::{nearest_point, points_in_box, BoxHit, SelectablePoint},
    manager::{LayerStore, SelectButton},
    placement::{ImagePlacement, TextAttributes, TextPlacement},
    zorder::ZOrder,
};

pub use crate::input::{
    events::{InputEvent, KeyCode, KeyModifiers, MouseButton},
    handler::{InputHandler, InteractionState},
};

pub use crate::rendering::{
    context::{Canvas, Colour, DrawCommand, RenderContext, ShapeStyle},
    renderer::{visible_tile_range, Renderer, TileRange},
};

pub use crate::tiles::{
    cache::{CachePolicy, CacheStrategy, TileCache, TileKey},
    info::{LevelInfo, TileSet},
    store::TileStore,
    ImageHandle,
};

#[cfg(feature = "egui")]
pub use crate::ui::widget::{MapWidget, MapWidgetConfig};

pub use crate::{Error as SlipError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
