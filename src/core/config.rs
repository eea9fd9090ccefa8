//! Configuration for a map view
//!
//! Everything has a default, so a config file only needs the keys it changes:
//!
//! ```json
//! {
//!     "tile_dir": "/data/tiles",
//!     "start_level": 2,
//!     "cache": { "kind": "lru", "capacity": 512 },
//!     "interaction": { "key_pan_step": 32.0 }
//! }
//! ```

use crate::{
    core::constants::{DEFAULT_KEY_PAN_STEP, DEFAULT_TILE_EXTENSION, DEFAULT_VIEW_SIZE},
    rendering::context::Colour,
    tiles::cache::CachePolicy,
    Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Keyboard modifier that switches a pointer gesture to its alternate action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    #[default]
    Shift,
    Ctrl,
    Alt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Held on pointer-down to start a box select instead of a drag
    pub select_modifier: Modifier,
    /// Held on double-click to zoom out instead of in
    pub zoom_out_modifier: Modifier,
    /// Pixels scrolled per arrow key press
    pub key_pan_step: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            select_modifier: Modifier::Shift,
            zoom_out_modifier: Modifier::Shift,
            key_pan_step: DEFAULT_KEY_PAN_STEP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub tile_dir: PathBuf,
    /// Level shown first; the coarsest allowed level if unset
    pub start_level: Option<u8>,
    pub min_level: Option<u8>,
    pub max_level: Option<u8>,
    pub view_size: (f64, f64),
    pub tile_extension: String,
    /// Placeholder for absent tiles, overriding `<tile_dir>/missing_tile.png`
    pub missing_tile: Option<PathBuf>,
    pub cache: CachePolicy,
    /// Fill behind the tiles; the tile set's sea colour if unset
    pub background: Option<Colour>,
    pub interaction: InteractionConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_dir: PathBuf::from("tiles"),
            start_level: None,
            min_level: None,
            max_level: None,
            view_size: DEFAULT_VIEW_SIZE,
            tile_extension: DEFAULT_TILE_EXTENSION.to_string(),
            missing_tile: None,
            cache: CachePolicy::default(),
            background: None,
            interaction: InteractionConfig::default(),
        }
    }
}

impl MapConfig {
    pub fn new(tile_dir: impl Into<PathBuf>) -> Self {
        Self {
            tile_dir: tile_dir.into(),
            ..Self::default()
        }
    }

    /// Reads a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&text)?;
        log::debug!("loaded map config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn with_start_level(mut self, level: u8) -> Self {
        self.start_level = Some(level);
        self
    }

    /// Restricts zooming to `[min, max]`, intersected with the available levels
    pub fn with_level_limits(mut self, min: u8, max: u8) -> Self {
        self.min_level = Some(min);
        self.max_level = Some(max);
        self
    }

    pub fn with_view_size(mut self, width: f64, height: f64) -> Self {
        self.view_size = (width, height);
        self
    }

    pub fn with_tile_extension(mut self, extension: impl Into<String>) -> Self {
        self.tile_extension = extension.into();
        self
    }

    pub fn with_missing_tile(mut self, path: impl Into<PathBuf>) -> Self {
        self.missing_tile = Some(path.into());
        self
    }

    pub fn with_cache(mut self, policy: CachePolicy) -> Self {
        self.cache = policy;
        self
    }

    pub fn with_background(mut self, colour: Colour) -> Self {
        self.background = Some(colour);
        self
    }

    pub fn with_interaction(mut self, interaction: InteractionConfig) -> Self {
        self.interaction = interaction;
        self
    }
}
