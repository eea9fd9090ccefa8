use crate::{
    core::constants::{DEFAULT_TILE_EXTENSION, MISSING_TILE_FILENAME},
    tiles::{
        cache::{CachePolicy, TileCache, TileKey},
        info::{LevelInfo, TileSet},
        ImageHandle,
    },
    Result, SlipError,
};
use std::path::Path;

const MISSING_TILE_KEY: &str = "missing_tile";

/// Serves tile images for a tile pyramid on disk, through a [`TileCache`]
#[derive(Debug, Clone)]
pub struct TileStore {
    tile_set: TileSet,
    cache: TileCache,
    extension: String,
    missing_tile: ImageHandle,
}

impl TileStore {
    /// Opens the tile directory at `root` with an unbounded cache and `png` tiles
    pub fn load_levels(root: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(TileSet::load(root)?, CachePolicy::Unbounded))
    }

    /// Wraps already-loaded metadata
    ///
    /// The placeholder for absent tiles is `<root>/missing_tile.png` when it
    /// exists and decodes, otherwise a tile-sized block of the land colour.
    pub fn new(tile_set: TileSet, policy: CachePolicy) -> Self {
        let default_missing = tile_set.root().join(MISSING_TILE_FILENAME);
        let missing_tile = if default_missing.is_file() {
            match ImageHandle::open(&default_missing) {
                Ok(image) => image,
                Err(e) => {
                    log::warn!("cannot use {}: {}", default_missing.display(), e);
                    Self::generated_placeholder(&tile_set)
                }
            }
        } else {
            Self::generated_placeholder(&tile_set)
        };

        Self {
            tile_set,
            cache: TileCache::new(policy),
            extension: DEFAULT_TILE_EXTENSION.to_string(),
            missing_tile,
        }
    }

    fn generated_placeholder(tile_set: &TileSet) -> ImageHandle {
        let (width, height) = tile_set.tile_size();
        ImageHandle::filled(MISSING_TILE_KEY, width, height, tile_set.land_colour())
    }

    /// Sets the file extension of tile images
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Uses an explicit placeholder image for absent tiles
    pub fn with_missing_tile(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.missing_tile = ImageHandle::open(path)?;
        Ok(self)
    }

    pub fn tile_set(&self) -> &TileSet {
        &self.tile_set
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn missing_tile(&self) -> &ImageHandle {
        &self.missing_tile
    }

    pub fn levels(&self) -> impl Iterator<Item = u8> + '_ {
        self.tile_set.levels()
    }

    pub fn min_level(&self) -> u8 {
        self.tile_set.min_level()
    }

    pub fn max_level(&self) -> u8 {
        self.tile_set.max_level()
    }

    /// Metadata for `level`, or `None` if that level is not available
    pub fn select_level(&self, level: u8) -> Option<&LevelInfo> {
        self.tile_set.level(level)
    }

    /// Strict form of [`TileStore::select_level`]
    pub fn level_or_err(&self, level: u8) -> Result<&LevelInfo> {
        self.select_level(level)
            .ok_or(SlipError::LevelOutOfRange(level))
    }

    /// Image for the tile at `(tile_x, tile_y)` of `level`.
    ///
    /// Served from the cache when possible; otherwise the tile file is decoded
    /// and cached. Absent or undecodable tiles yield the placeholder image.
    pub fn get_tile(&self, level: u8, tile_x: u32, tile_y: u32) -> ImageHandle {
        let key = TileKey::new(level, tile_x, tile_y);
        if let Some(image) = self.cache.get(&key) {
            return image;
        }

        let in_grid = self
            .tile_set
            .level(level)
            .map(|info| tile_x < info.tiles_x && tile_y < info.tiles_y)
            .unwrap_or(false);
        if !in_grid {
            log::debug!("tile {:?} is outside the level grid", key);
            return self.missing_tile.clone();
        }

        let path = self.tile_set.tile_path(level, tile_x, tile_y, &self.extension);
        if !path.is_file() {
            log::warn!("missing tile {}", path.display());
            return self.missing_tile.clone();
        }

        match image::open(&path) {
            Ok(decoded) => {
                let image = ImageHandle::new(
                    format!("tile/{:02}/{}_{}", level, tile_x, tile_y),
                    decoded.to_rgba8(),
                );
                self.cache.insert(key, image.clone());
                image
            }
            Err(e) => {
                log::warn!("cannot decode tile {}: {}", path.display(), e);
                self.missing_tile.clone()
            }
        }
    }
}
