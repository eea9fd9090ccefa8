use crate::{
    core::{
        config::{InteractionConfig, MapConfig},
        geo::{GeoPoint, Point},
        transform::CoordinateTransform,
        viewport::Viewport,
    },
    layers::manager::LayerStore,
    rendering::context::Colour,
    tiles::{info::TileSet, store::TileStore},
    Result, SlipError,
};

/// Receives the geographic position under the pointer
pub type MousePositionCallback = Box<dyn FnMut(GeoPoint)>;

/// Receives the new level after every successful level change
pub type LevelChangeCallback = Box<dyn FnMut(u8)>;

/// A slippy map: tiles, the current view onto them, and the layers on top
///
/// All state changes go through `&mut self`, so a repaint always sees a
/// consistent level, offset and layer order.
pub struct Map {
    tiles: TileStore,
    viewport: Viewport,
    layers: LayerStore,
    min_level: u8,
    max_level: u8,
    background: Colour,
    interaction: InteractionConfig,
    mouse_position_callback: Option<MousePositionCallback>,
    level_change_callback: Option<LevelChangeCallback>,
    repaint: bool,
}

impl Map {
    /// Loads the tile directory named by `config` and opens the start level
    pub fn new(config: MapConfig) -> Result<Self> {
        let tile_set = TileSet::load(&config.tile_dir)?;
        let mut tiles = TileStore::new(tile_set, config.cache).with_extension(&config.tile_extension);
        if let Some(path) = &config.missing_tile {
            tiles = tiles.with_missing_tile(path)?;
        }
        Self::with_tile_store(tiles, &config)
    }

    /// Builds a map over an already opened tile store.
    ///
    /// `tile_dir`, `tile_extension`, `missing_tile` and `cache` in `config`
    /// are not used here.
    pub fn with_tile_store(tiles: TileStore, config: &MapConfig) -> Result<Self> {
        let min_level = config
            .min_level
            .map_or(tiles.min_level(), |level| level.max(tiles.min_level()));
        let max_level = config
            .max_level
            .map_or(tiles.max_level(), |level| level.min(tiles.max_level()));
        if min_level > max_level {
            return Err(SlipError::Configuration(format!(
                "no levels between {} and {} (tile set has {}..={})",
                min_level,
                max_level,
                tiles.min_level(),
                tiles.max_level()
            )));
        }

        let start_level = config.start_level.unwrap_or(min_level);
        if start_level < min_level || start_level > max_level {
            return Err(SlipError::Configuration(format!(
                "start level {} is outside {}..={}",
                start_level, min_level, max_level
            )));
        }
        let level = *tiles.select_level(start_level).ok_or_else(|| {
            SlipError::Configuration(format!("start level {} is not in the tile set", start_level))
        })?;

        let extent = tiles.tile_set().extent();
        let background = config
            .background
            .unwrap_or_else(|| tiles.tile_set().sea_colour());
        let viewport = Viewport::new(extent, level, Point::from(config.view_size));

        log::info!(
            "map opened at level {} (levels {}..={})",
            start_level,
            min_level,
            max_level
        );

        Ok(Self {
            tiles,
            viewport,
            layers: LayerStore::new(),
            min_level,
            max_level,
            background,
            interaction: config.interaction.clone(),
            mouse_position_callback: None,
            level_change_callback: None,
            repaint: true,
        })
    }

    pub fn tiles(&self) -> &TileStore {
        &self.tiles
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn layers(&self) -> &LayerStore {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerStore {
        &mut self.layers
    }

    pub fn background(&self) -> Colour {
        self.background
    }

    pub fn interaction(&self) -> &InteractionConfig {
        &self.interaction
    }

    pub fn level(&self) -> u8 {
        self.viewport.level_number()
    }

    pub fn min_level(&self) -> u8 {
        self.min_level
    }

    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    pub fn view_size(&self) -> Point {
        self.viewport.view_size()
    }

    /// Snapshot of the current view/geo conversion
    pub fn transform(&self) -> CoordinateTransform {
        self.viewport.transform()
    }

    pub fn resize(&mut self, view_size: Point) {
        if view_size != self.viewport.view_size() {
            self.viewport.resize(view_size);
            self.repaint = true;
        }
    }

    /// Switches to `level`, keeping the view centre.
    ///
    /// Returns `false` and leaves the map untouched if the level is outside
    /// the allowed range or missing from the tile set.
    pub fn set_level(&mut self, level: u8) -> bool {
        self.set_level_at(level, None)
    }

    /// Switches to `level`; the map point under `focus` becomes the view centre
    pub fn set_level_at(&mut self, level: u8, focus: Option<Point>) -> bool {
        if level < self.min_level || level > self.max_level {
            log::debug!(
                "level {} rejected, allowed {}..={}",
                level,
                self.min_level,
                self.max_level
            );
            return false;
        }
        let Some(info) = self.tiles.select_level(level).copied() else {
            log::debug!("level {} rejected, not in tile set", level);
            return false;
        };
        if level == self.level() {
            return true;
        }

        self.viewport.apply_level(info, focus);
        self.repaint = true;
        log::debug!("level changed to {}", level);

        if let Some(callback) = self.level_change_callback.as_mut() {
            callback(level);
        }
        true
    }

    pub fn zoom_in(&mut self, focus: Option<Point>) -> bool {
        match self.level().checked_add(1) {
            Some(level) => self.set_level_at(level, focus),
            None => false,
        }
    }

    pub fn zoom_out(&mut self, focus: Option<Point>) -> bool {
        match self.level().checked_sub(1) {
            Some(level) => self.set_level_at(level, focus),
            None => false,
        }
    }

    /// Scrolls the view; returns `true` if it moved
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        let moved = self.viewport.pan(dx, dy);
        if moved {
            self.repaint = true;
        }
        moved
    }

    /// Centres the view on `position` at the current level
    pub fn center_on(&mut self, position: GeoPoint) {
        self.viewport.center_on(position);
        self.repaint = true;
    }

    /// Same as [`Map::center_on`]
    pub fn goto_position(&mut self, position: GeoPoint) {
        self.center_on(position);
    }

    /// Switches level and centres on `position`; nothing happens if the level is rejected
    pub fn goto_level_and_position(&mut self, level: u8, position: GeoPoint) -> bool {
        if !self.set_level(level) {
            return false;
        }
        self.center_on(position);
        true
    }

    /// Shows an area of `size` degrees (width, height) centred on `position`.
    ///
    /// Picks the coarsest level at which the area covers at least half of
    /// the view's width or height, or the finest level if none does.
    pub fn zoom_to_area(&mut self, position: GeoPoint, size: (f64, f64)) -> bool {
        let (area_width, area_height) = size;
        let view = self.viewport.view_size();

        let candidates: Vec<_> = self
            .tiles
            .levels()
            .filter(|level| (self.min_level..=self.max_level).contains(level))
            .filter_map(|level| self.tiles.select_level(level).copied())
            .collect();
        let chosen = candidates
            .iter()
            .find(|info| {
                let view_width_deg = view.x / info.ppd_x;
                let view_height_deg = view.y / info.ppd_y;
                area_width >= view_width_deg / 2.0 || area_height >= view_height_deg / 2.0
            })
            .or(candidates.last());

        match chosen {
            Some(info) => self.goto_level_and_position(info.level, position),
            None => false,
        }
    }

    /// Whether `position` lies within the tile set's extent, edges included
    pub fn is_position_on_map(&self, position: GeoPoint) -> bool {
        self.tiles.tile_set().extent().contains(&position)
    }

    pub fn view_to_geo(&self, point: Point) -> GeoPoint {
        self.transform().view_to_geo(point)
    }

    pub fn geo_to_view(&self, position: GeoPoint) -> Point {
        self.transform().geo_to_view(position)
    }

    /// View position of `position`, or `None` when it is outside the view
    pub fn geo_to_view_masked(&self, position: GeoPoint) -> Option<Point> {
        self.transform().geo_to_view_masked(position)
    }

    pub fn view_to_map(&self, point: Point) -> Point {
        self.viewport.view_to_map(point)
    }

    pub fn on_mouse_position(&mut self, callback: impl FnMut(GeoPoint) + 'static) {
        self.mouse_position_callback = Some(Box::new(callback));
    }

    pub fn clear_mouse_position_callback(&mut self) {
        self.mouse_position_callback = None;
    }

    pub fn on_level_change(&mut self, callback: impl FnMut(u8) + 'static) {
        self.level_change_callback = Some(Box::new(callback));
    }

    pub fn clear_level_change_callback(&mut self) {
        self.level_change_callback = None;
    }

    /// Reports the geographic position under view pixel `point`
    pub fn notify_mouse_position(&mut self, point: Point) {
        let position = self.view_to_geo(point);
        if let Some(callback) = self.mouse_position_callback.as_mut() {
            callback(position);
        }
    }

    pub fn request_repaint(&mut self) {
        self.repaint = true;
    }

    pub fn needs_repaint(&self) -> bool {
        self.repaint || self.layers.needs_repaint()
    }

    /// Returns and resets the repaint request, including the layers'
    pub fn take_repaint(&mut self) -> bool {
        let layers = self.layers.take_repaint();
        std::mem::take(&mut self.repaint) || layers
    }

    /// Logs the view state
    pub fn log_state(&self) {
        let bounds = self.viewport.geo_bounds();
        let level = self.viewport.level();
        log::debug!(
            "level {} view lon {:.4}..{:.4} lat {:.4}..{:.4} ppd ({}, {}) offset {:?} view {:?}",
            level.level,
            bounds.west,
            bounds.east,
            bounds.south,
            bounds.north,
            level.ppd_x,
            level.ppd_y,
            self.viewport.offset(),
            self.viewport.view_size()
        );
    }
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("tiles", &self.tiles)
            .field("viewport", &self.viewport)
            .field("layers", &self.layers)
            .field("min_level", &self.min_level)
            .field("max_level", &self.max_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::cache::CachePolicy;
    use crate::tiles::info::{LevelDescriptor, RootDescriptor};
    use std::cell::RefCell;
    use std::rc::Rc;

    // Levels 1..=3, 256 px tiles, 2^n tiles across, ppd doubling per level
    fn tile_store() -> TileStore {
        let levels = (1u8..=3).map(|n| {
            let tiles = 1u32 << n;
            (
                n,
                LevelDescriptor {
                    tiles_x: tiles,
                    tiles_y: tiles,
                    ppd_x: f64::from(tiles) * 4.0,
                    ppd_y: f64::from(tiles) * 4.0,
                },
            )
        });
        let tile_set = TileSet::from_parts(
            "/nonexistent",
            RootDescriptor {
                extent: [100.0, 164.0, -64.0, 0.0],
                tile_size: [256, 256],
                sea_colour: Colour::blue(),
                land_colour: Colour::white(),
            },
            levels,
        )
        .unwrap();
        TileStore::new(tile_set, CachePolicy::Unbounded)
    }

    fn map(config: MapConfig) -> Map {
        Map::with_tile_store(tile_store(), &config).unwrap()
    }

    #[test]
    fn test_defaults_from_tile_set() {
        let map = map(MapConfig::default().with_view_size(400.0, 300.0));

        assert_eq!(map.level(), 1);
        assert_eq!((map.min_level(), map.max_level()), (1, 3));
        assert_eq!(map.background(), Colour::blue());
    }

    #[test]
    fn test_rejected_level_leaves_state() {
        let mut map = map(MapConfig::default().with_view_size(400.0, 300.0));
        assert!(map.set_level(2));
        let offset = map.viewport().offset();

        assert!(!map.set_level(5));
        assert_eq!(map.level(), 2);
        assert_eq!(map.viewport().offset(), offset);
    }

    #[test]
    fn test_level_limits_from_config() {
        let mut map = map(
            MapConfig::default()
                .with_level_limits(2, 9)
                .with_start_level(2),
        );
        assert_eq!((map.min_level(), map.max_level()), (2, 3));
        assert!(!map.zoom_out(None));
        assert!(map.zoom_in(None));
        assert!(!map.zoom_in(None));
        assert_eq!(map.level(), 3);
    }

    #[test]
    fn test_bad_start_level() {
        let result = Map::with_tile_store(tile_store(), &MapConfig::default().with_start_level(7));
        assert!(matches!(result, Err(SlipError::Configuration(_))));

        let result = Map::with_tile_store(tile_store(), &MapConfig::default().with_level_limits(3, 1));
        assert!(matches!(result, Err(SlipError::Configuration(_))));
    }

    #[test]
    fn test_level_change_callback() {
        let mut map = map(MapConfig::default());
        let levels = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&levels);
        map.on_level_change(move |level| sink.borrow_mut().push(level));

        map.zoom_in(None);
        map.zoom_in(None);
        map.zoom_in(None);
        map.set_level(1);

        assert_eq!(*levels.borrow(), vec![2, 3, 1]);
    }

    #[test]
    fn test_goto_level_and_position() {
        let mut map = map(MapConfig::default().with_view_size(200.0, 200.0));
        let target = GeoPoint::new(120.0, -20.0);

        assert!(map.goto_level_and_position(3, target));
        assert_eq!(map.level(), 3);
        let centre = map.view_to_geo(Point::new(100.0, 100.0));
        assert!((centre.lon - target.lon).abs() < 1e-9);
        assert!((centre.lat - target.lat).abs() < 1e-9);

        assert!(!map.goto_level_and_position(9, GeoPoint::new(150.0, -50.0)));
        assert_eq!(map.level(), 3);
    }

    #[test]
    fn test_zoom_to_area() {
        let mut map = map(MapConfig::default().with_view_size(200.0, 200.0));

        // Level 1 shows 25 degrees, level 2 12.5, level 3 6.25
        map.zoom_to_area(GeoPoint::new(130.0, -30.0), (7.0, 1.0));
        assert_eq!(map.level(), 2);

        map.zoom_to_area(GeoPoint::new(130.0, -30.0), (20.0, 20.0));
        assert_eq!(map.level(), 1);

        // Tiny areas use the finest level
        map.zoom_to_area(GeoPoint::new(130.0, -30.0), (0.01, 0.01));
        assert_eq!(map.level(), 3);
    }

    #[test]
    fn test_position_on_map() {
        let map = map(MapConfig::default());
        assert!(map.is_position_on_map(GeoPoint::new(100.0, 0.0)));
        assert!(map.is_position_on_map(GeoPoint::new(130.0, -30.0)));
        assert!(!map.is_position_on_map(GeoPoint::new(99.0, -30.0)));
    }

    #[test]
    fn test_repaint_flags_combine() {
        let mut map = map(MapConfig::default());
        assert!(map.take_repaint());
        assert!(!map.needs_repaint());

        map.layers_mut().request_repaint();
        assert!(map.needs_repaint());
        assert!(map.take_repaint());
        assert!(!map.take_repaint());
    }
}
