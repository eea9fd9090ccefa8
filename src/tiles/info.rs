//! Tile pyramid metadata read from the `tile.info` descriptors.
//!
//! Layout consumed here:
//!
//! ```text
//! <tile_root>/tile.info                      global descriptor
//! <tile_root>/<level:02>/tile.info           per-level descriptor
//! <tile_root>/<level:02>/tile_<x>_<y>.<ext>  tile images
//! ```

use crate::{
    core::{
        constants::TILE_INFO_FILENAME,
        geo::{GeoExtent, Point},
    },
    rendering::context::Colour,
    Result, SlipError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Contents of the root `tile.info`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootDescriptor {
    /// `[west, east, south, north]`, shared by every level
    pub extent: [f64; 4],
    /// `[width, height]` of every tile in pixels
    pub tile_size: [u32; 2],
    #[serde(default = "Colour::white")]
    pub sea_colour: Colour,
    #[serde(default = "Colour::white")]
    pub land_colour: Colour,
}

/// Contents of a level's `tile.info`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub tiles_x: u32,
    pub tiles_y: u32,
    pub ppd_x: f64,
    pub ppd_y: f64,
}

/// Immutable metadata for one zoom level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelInfo {
    pub level: u8,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tiles_x: u32,
    pub tiles_y: u32,
    /// Pixels per degree along x
    pub ppd_x: f64,
    /// Pixels per degree along y
    pub ppd_y: f64,
}

impl LevelInfo {
    pub fn new(level: u8, tile_size: (u32, u32), descriptor: LevelDescriptor) -> Self {
        Self {
            level,
            tile_width: tile_size.0,
            tile_height: tile_size.1,
            tiles_x: descriptor.tiles_x,
            tiles_y: descriptor.tiles_y,
            ppd_x: descriptor.ppd_x,
            ppd_y: descriptor.ppd_y,
        }
    }

    pub fn map_width(&self) -> f64 {
        f64::from(self.tiles_x) * f64::from(self.tile_width)
    }

    pub fn map_height(&self) -> f64 {
        f64::from(self.tiles_y) * f64::from(self.tile_height)
    }

    /// Full map size in pixels at this level
    pub fn map_size(&self) -> Point {
        Point::new(self.map_width(), self.map_height())
    }

    pub fn tile_size(&self) -> Point {
        Point::new(f64::from(self.tile_width), f64::from(self.tile_height))
    }

    /// Rejects descriptors the coordinate transform cannot work with.
    ///
    /// Checked once at load time so the per-call transforms never divide by zero.
    pub fn validate(&self) -> Result<()> {
        let ppd_ok = |v: f64| v.is_finite() && v > 0.0;
        if !ppd_ok(self.ppd_x) || !ppd_ok(self.ppd_y) {
            return Err(SlipError::Configuration(format!(
                "level {:02}: pixels-per-degree must be positive, got ({}, {})",
                self.level, self.ppd_x, self.ppd_y
            )));
        }
        if self.tiles_x == 0 || self.tiles_y == 0 {
            return Err(SlipError::Configuration(format!(
                "level {:02}: tile counts must be non-zero, got ({}, {})",
                self.level, self.tiles_x, self.tiles_y
            )));
        }
        Ok(())
    }
}

/// Per-level metadata of a tile pyramid plus its shared geographic extent
#[derive(Debug, Clone)]
pub struct TileSet {
    root: PathBuf,
    extent: GeoExtent,
    tile_width: u32,
    tile_height: u32,
    sea_colour: Colour,
    land_colour: Colour,
    levels: BTreeMap<u8, LevelInfo>,
}

impl TileSet {
    /// Reads the descriptors under `root`.
    ///
    /// Fails with [`SlipError::MissingTileInfo`] if the root descriptor is
    /// absent and with [`SlipError::Configuration`] if any descriptor is
    /// malformed. A level directory without a descriptor is skipped.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let info_path = root.join(TILE_INFO_FILENAME);
        let text = std::fs::read_to_string(&info_path).map_err(|e| {
            log::debug!("cannot read {}: {}", info_path.display(), e);
            SlipError::MissingTileInfo {
                path: root.to_path_buf(),
            }
        })?;
        let descriptor: RootDescriptor = serde_json::from_str(&text).map_err(|e| {
            SlipError::Configuration(format!("malformed {}: {}", info_path.display(), e))
        })?;

        let mut levels = Vec::new();
        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            let Some(level) = level_from_dir_name(&entry.file_name().to_string_lossy()) else {
                continue;
            };
            if !entry.path().is_dir() {
                continue;
            }

            let level_info_path = entry.path().join(TILE_INFO_FILENAME);
            let level_text = match std::fs::read_to_string(&level_info_path) {
                Ok(text) => text,
                Err(e) => {
                    log::warn!(
                        "level {:02} unavailable, cannot read {}: {}",
                        level,
                        level_info_path.display(),
                        e
                    );
                    continue;
                }
            };
            let level_descriptor: LevelDescriptor =
                serde_json::from_str(&level_text).map_err(|e| {
                    SlipError::Configuration(format!(
                        "malformed {}: {}",
                        level_info_path.display(),
                        e
                    ))
                })?;
            levels.push((level, level_descriptor));
        }

        let tile_set = Self::from_parts(root, descriptor, levels)?;
        log::info!(
            "loaded tile set {} with levels {:?}",
            root.display(),
            tile_set.levels().collect::<Vec<_>>()
        );
        Ok(tile_set)
    }

    /// Builds a tile set from already-decoded descriptors, validating them
    pub fn from_parts(
        root: impl Into<PathBuf>,
        descriptor: RootDescriptor,
        levels: impl IntoIterator<Item = (u8, LevelDescriptor)>,
    ) -> Result<Self> {
        let [west, east, south, north] = descriptor.extent;
        let extent = GeoExtent::new(west, east, south, north);
        if !extent.is_valid() {
            return Err(SlipError::Configuration(format!(
                "invalid geographic extent {:?}",
                descriptor.extent
            )));
        }
        let [tile_width, tile_height] = descriptor.tile_size;
        if tile_width == 0 || tile_height == 0 {
            return Err(SlipError::Configuration(format!(
                "invalid tile size {:?}",
                descriptor.tile_size
            )));
        }

        let mut level_map = BTreeMap::new();
        for (level, level_descriptor) in levels {
            let info = LevelInfo::new(level, (tile_width, tile_height), level_descriptor);
            info.validate()?;
            level_map.insert(level, info);
        }
        if level_map.is_empty() {
            return Err(SlipError::Configuration("no tile levels found".to_string()));
        }

        Ok(Self {
            root: root.into(),
            extent,
            tile_width,
            tile_height,
            sea_colour: descriptor.sea_colour,
            land_colour: descriptor.land_colour,
            levels: level_map,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Geographic extent covered by every level
    pub fn extent(&self) -> GeoExtent {
        self.extent
    }

    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    pub fn sea_colour(&self) -> Colour {
        self.sea_colour
    }

    pub fn land_colour(&self) -> Colour {
        self.land_colour
    }

    /// Available levels in ascending order
    pub fn levels(&self) -> impl Iterator<Item = u8> + '_ {
        self.levels.keys().copied()
    }

    pub fn level(&self, level: u8) -> Option<&LevelInfo> {
        self.levels.get(&level)
    }

    pub fn min_level(&self) -> u8 {
        self.levels.keys().next().copied().unwrap_or_default()
    }

    pub fn max_level(&self) -> u8 {
        self.levels.keys().next_back().copied().unwrap_or_default()
    }

    pub fn level_dir(&self, level: u8) -> PathBuf {
        self.root.join(format!("{:02}", level))
    }

    /// Canonical on-disk path of one tile image
    pub fn tile_path(&self, level: u8, tile_x: u32, tile_y: u32, extension: &str) -> PathBuf {
        self.level_dir(level)
            .join(format!("tile_{}_{}.{}", tile_x, tile_y, extension))
    }
}

/// Level directories are named with exactly two decimal digits
fn level_from_dir_name(name: &str) -> Option<u8> {
    if name.len() == 2 && name.bytes().all(|b| b.is_ascii_digit()) {
        name.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_descriptor() -> RootDescriptor {
        RootDescriptor {
            extent: [100.0, 160.0, -45.0, -5.0],
            tile_size: [256, 256],
            sea_colour: Colour::rgb(0, 0, 255),
            land_colour: Colour::rgb(0, 255, 0),
        }
    }

    #[test]
    fn test_level_dir_names() {
        assert_eq!(level_from_dir_name("00"), Some(0));
        assert_eq!(level_from_dir_name("07"), Some(7));
        assert_eq!(level_from_dir_name("7"), None);
        assert_eq!(level_from_dir_name("007"), None);
        assert_eq!(level_from_dir_name("a1"), None);
    }

    #[test]
    fn test_map_size_matches_tile_grid() {
        let info = LevelInfo::new(
            2,
            (256, 128),
            LevelDescriptor {
                tiles_x: 4,
                tiles_y: 3,
                ppd_x: 10.0,
                ppd_y: 10.0,
            },
        );

        assert_eq!(info.map_width(), 4.0 * 256.0);
        assert_eq!(info.map_height(), 3.0 * 128.0);
    }

    #[test]
    fn test_zero_ppd_is_configuration_error() {
        let result = TileSet::from_parts(
            "/tiles",
            root_descriptor(),
            [(
                1,
                LevelDescriptor {
                    tiles_x: 2,
                    tiles_y: 2,
                    ppd_x: 0.0,
                    ppd_y: 8.0,
                },
            )],
        );

        assert!(matches!(result, Err(SlipError::Configuration(_))));
    }

    #[test]
    fn test_levels_sorted_with_min_max() {
        let level = |n: u32| LevelDescriptor {
            tiles_x: n,
            tiles_y: n,
            ppd_x: n as f64,
            ppd_y: n as f64,
        };
        let tile_set =
            TileSet::from_parts("/tiles", root_descriptor(), [(3, level(4)), (1, level(1)), (2, level(2))])
                .unwrap();

        assert_eq!(tile_set.levels().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(tile_set.min_level(), 1);
        assert_eq!(tile_set.max_level(), 3);
        assert!(tile_set.level(4).is_none());
        assert_eq!(
            tile_set.tile_path(2, 3, 1, "png"),
            PathBuf::from("/tiles/02/tile_3_1.png")
        );
    }

    #[test]
    fn test_empty_level_set_rejected() {
        let result = TileSet::from_parts("/tiles", root_descriptor(), Vec::new());
        assert!(matches!(result, Err(SlipError::Configuration(_))));
    }
}
