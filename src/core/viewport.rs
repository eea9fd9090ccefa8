use crate::core::geo::{GeoExtent, GeoPoint, Point};
use crate::core::transform::CoordinateTransform;
use crate::tiles::info::LevelInfo;

/// Manages the current view of the map: level, view size and scroll offset
///
/// `offset` is the position of the view's top-left corner in map pixels of
/// the current level. On each axis where the map is larger than the view the
/// offset stays within `[0, map - view]`; on an axis where it is not, the map
/// is centred and the offset is `(map - view) / 2`, which is zero or negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    level: LevelInfo,
    map_extent: GeoExtent,
    view_size: Point,
    map_size: Point,
    offset: Point,
    /// Cached geographic limits of the view
    geo_bounds: GeoExtent,
}

impl Viewport {
    /// Creates a viewport showing the middle of the map at `level`
    pub fn new(map_extent: GeoExtent, level: LevelInfo, view_size: Point) -> Self {
        let map_size = level.map_size();
        let view_size = sanitize_size(view_size);
        let mut viewport = Self {
            level,
            map_extent,
            view_size,
            map_size,
            offset: map_size.subtract(&view_size).half(),
            geo_bounds: map_extent,
        };
        viewport.clamp();
        viewport
    }

    pub fn level(&self) -> &LevelInfo {
        &self.level
    }

    pub fn level_number(&self) -> u8 {
        self.level.level
    }

    pub fn map_extent(&self) -> GeoExtent {
        self.map_extent
    }

    pub fn view_size(&self) -> Point {
        self.view_size
    }

    pub fn map_size(&self) -> Point {
        self.map_size
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Geographic limits of the visible area
    pub fn geo_bounds(&self) -> GeoExtent {
        self.geo_bounds
    }

    /// Centre of the view in view pixels
    pub fn view_centre(&self) -> Point {
        self.view_size.half()
    }

    /// Snapshot of the current view/geo conversion
    pub fn transform(&self) -> CoordinateTransform {
        CoordinateTransform::new(self.map_extent, &self.level, self.offset, self.view_size)
    }

    pub fn view_to_map(&self, point: Point) -> Point {
        point.add(&self.offset)
    }

    /// Changes the view size, keeping the offset within the map
    pub fn resize(&mut self, view_size: Point) {
        self.view_size = sanitize_size(view_size);
        self.clamp();
    }

    /// Scrolls the view by `(dx, dy)` pixels.
    ///
    /// Returns `true` if the offset changed. An axis on which the whole map
    /// fits in the view does not scroll.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        let before = self.offset;
        self.offset = self.offset.add(&Point::new(dx, dy));
        self.clamp();
        before != self.offset
    }

    /// Scrolls so that `position` is at the view centre, as far as the map allows
    pub fn center_on(&mut self, position: GeoPoint) {
        let map_point = self.transform().geo_to_map(position);
        self.offset = map_point.subtract(&self.view_centre());
        self.clamp();
    }

    /// Switches to another level.
    ///
    /// The map point under `focus` (view pixels, defaulting to the view
    /// centre) is scaled by the ratio of the two levels' pixels-per-degree and
    /// becomes the new view centre.
    pub fn apply_level(&mut self, level: LevelInfo, focus: Option<Point>) {
        let focus = focus.unwrap_or_else(|| self.view_centre());
        let map_point = self.view_to_map(focus);
        let ratio_x = level.ppd_x / self.level.ppd_x;
        let ratio_y = level.ppd_y / self.level.ppd_y;
        let scaled = Point::new(map_point.x * ratio_x, map_point.y * ratio_y);

        self.level = level;
        self.map_size = level.map_size();
        self.offset = scaled.subtract(&self.view_centre());
        self.clamp();
    }

    /// Re-applies the offset limits and refreshes the cached view bounds
    pub fn clamp(&mut self) {
        self.offset = Point::new(
            clamp_axis(self.offset.x, self.map_size.x, self.view_size.x),
            clamp_axis(self.offset.y, self.map_size.y, self.view_size.y),
        );
        self.recalc_bounds();
    }

    fn recalc_bounds(&mut self) {
        self.geo_bounds = self.transform().view_bounds();
    }
}

fn clamp_axis(offset: f64, map: f64, view: f64) -> f64 {
    if map > view {
        offset.clamp(0.0, map - view)
    } else {
        (map - view) / 2.0
    }
}

fn sanitize_size(size: Point) -> Point {
    let axis = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
    Point::new(axis(size.x), axis(size.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::info::LevelDescriptor;

    const EXTENT: GeoExtent = GeoExtent {
        west: 100.0,
        east: 164.0,
        south: -48.0,
        north: 0.0,
    };

    // 256 px tiles, 2^n tiles across, ppd doubling per level
    fn level(n: u8) -> LevelInfo {
        let tiles = 1u32 << n;
        LevelInfo::new(
            n,
            (256, 256),
            LevelDescriptor {
                tiles_x: tiles,
                tiles_y: tiles,
                ppd_x: f64::from(tiles) * 256.0 / 64.0,
                ppd_y: f64::from(tiles) * 256.0 / 48.0,
            },
        )
    }

    fn assert_clamped(viewport: &Viewport) {
        let map = viewport.map_size();
        let view = viewport.view_size();
        let offset = viewport.offset();
        for (o, m, v) in [(offset.x, map.x, view.x), (offset.y, map.y, view.y)] {
            if m > v {
                assert!(o >= 0.0 && o <= m - v, "offset {} outside [0, {}]", o, m - v);
            } else {
                assert_eq!(o, (m - v) / 2.0);
            }
        }
    }

    #[test]
    fn test_new_viewport_is_centred() {
        let viewport = Viewport::new(EXTENT, level(3), Point::new(800.0, 600.0));

        assert_eq!(viewport.map_size(), Point::new(2048.0, 2048.0));
        assert_eq!(viewport.offset(), Point::new(624.0, 724.0));
        let centre = viewport.geo_bounds().center();
        assert!((centre.lon - 132.0).abs() < 1e-9);
        assert!((centre.lat + 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_offset_invariant_across_pan_and_resize() {
        let mut viewport = Viewport::new(EXTENT, level(2), Point::new(500.0, 400.0));
        let steps = [
            (-900.0, 30.0, None),
            (2000.0, 2000.0, None),
            (-13.5, -7.25, Some(Point::new(1200.0, 300.0))),
            (400.0, -1000.0, Some(Point::new(300.0, 1500.0))),
            (-5.0, 5.0, Some(Point::new(1024.0, 1024.0))),
            (77.0, 77.0, Some(Point::new(640.0, 480.0))),
        ];

        for (dx, dy, resize) in steps {
            if let Some(size) = resize {
                viewport.resize(size);
                assert_clamped(&viewport);
            }
            viewport.pan(dx, dy);
            assert_clamped(&viewport);
        }
    }

    #[test]
    fn test_pan_is_noop_when_map_smaller_than_view() {
        let mut viewport = Viewport::new(EXTENT, level(1), Point::new(800.0, 600.0));
        let before = viewport.offset();
        assert_eq!(before, Point::new(-144.0, -44.0));

        assert!(!viewport.pan(50.0, 50.0));
        assert_eq!(viewport.offset(), before);
    }

    #[test]
    fn test_zoom_in_then_out_restores_offset() {
        let mut viewport = Viewport::new(EXTENT, level(3), Point::new(640.0, 480.0));
        viewport.pan(-300.0, 150.0);
        let before = viewport.offset();

        viewport.apply_level(level(4), None);
        assert_eq!(viewport.level_number(), 4);
        assert_eq!(viewport.offset(), before.add(&viewport.view_centre()).multiply(2.0).subtract(&viewport.view_centre()));

        viewport.apply_level(level(3), None);
        assert_eq!(viewport.offset(), before);
    }

    #[test]
    fn test_zoom_focus_becomes_centre() {
        let mut viewport = Viewport::new(EXTENT, level(3), Point::new(640.0, 480.0));
        let focus = Point::new(400.0, 300.0);
        let geo_at_focus = viewport.transform().view_to_geo(focus);

        viewport.apply_level(level(4), Some(focus));

        let centre = viewport.transform().view_to_geo(viewport.view_centre());
        assert!((centre.lon - geo_at_focus.lon).abs() < 1e-9);
        assert!((centre.lat - geo_at_focus.lat).abs() < 1e-9);
    }

    #[test]
    fn test_center_on() {
        let mut viewport = Viewport::new(EXTENT, level(3), Point::new(400.0, 400.0));
        viewport.center_on(GeoPoint::new(120.0, -10.0));

        let centre = viewport.geo_bounds().center();
        assert!((centre.lon - 120.0).abs() < 1e-9);
        assert!((centre.lat + 10.0).abs() < 1e-9);

        // A corner of the map cannot be centred; the view stops at the edge
        viewport.center_on(GeoPoint::new(100.0, 0.0));
        assert_eq!(viewport.offset(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_geo_bounds_follow_offset() {
        let mut viewport = Viewport::new(EXTENT, level(3), Point::new(640.0, 480.0));
        viewport.pan(-10_000.0, -10_000.0);

        let bounds = viewport.geo_bounds();
        assert_eq!(bounds.west, EXTENT.west);
        assert_eq!(bounds.north, EXTENT.north);
        assert!((bounds.east - (100.0 + 640.0 / 32.0)).abs() < 1e-9);
    }
}
