use crate::core::geo::{GeoExtent, GeoPoint, Point};
use crate::tiles::info::LevelInfo;

/// Converts between geographic coordinates and view pixels for one view state
///
/// A transform is a snapshot: it is built from the current viewport and does
/// not follow later pans or zooms. Pixels-per-degree values come from a
/// validated [`LevelInfo`], so they are always positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    map_extent: GeoExtent,
    offset: Point,
    ppd_x: f64,
    ppd_y: f64,
    view_size: Point,
    view_bounds: GeoExtent,
}

impl CoordinateTransform {
    pub fn new(map_extent: GeoExtent, level: &LevelInfo, offset: Point, view_size: Point) -> Self {
        let ppd_x = level.ppd_x;
        let ppd_y = level.ppd_y;

        let west = map_extent.west + offset.x / ppd_x;
        let east = west + view_size.x / ppd_x;
        let north = map_extent.north - offset.y / ppd_y;
        let south = north - view_size.y / ppd_y;

        Self {
            map_extent,
            offset,
            ppd_x,
            ppd_y,
            view_size,
            view_bounds: GeoExtent::new(west, east, south, north),
        }
    }

    /// Geographic limits of the visible area
    pub fn view_bounds(&self) -> GeoExtent {
        self.view_bounds
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn view_size(&self) -> Point {
        self.view_size
    }

    pub fn ppd(&self) -> (f64, f64) {
        (self.ppd_x, self.ppd_y)
    }

    /// Geographic position to view pixels
    pub fn geo_to_view(&self, point: GeoPoint) -> Point {
        Point::new(
            (point.lon - self.view_bounds.west) * self.ppd_x,
            (self.view_bounds.north - point.lat) * self.ppd_y,
        )
    }

    /// Like [`geo_to_view`](Self::geo_to_view) but `None` for points outside the view
    pub fn geo_to_view_masked(&self, point: GeoPoint) -> Option<Point> {
        if self.view_bounds.contains(&point) {
            Some(self.geo_to_view(point))
        } else {
            None
        }
    }

    /// View pixels to geographic position
    pub fn view_to_geo(&self, point: Point) -> GeoPoint {
        let map_point = self.view_to_map(point);
        GeoPoint::new(
            self.map_extent.west + map_point.x / self.ppd_x,
            self.map_extent.north - map_point.y / self.ppd_y,
        )
    }

    /// View pixels to map pixels (measured from the map's top-left corner)
    pub fn view_to_map(&self, point: Point) -> Point {
        point.add(&self.offset)
    }

    /// Geographic position to map pixels
    pub fn geo_to_map(&self, point: GeoPoint) -> Point {
        Point::new(
            (point.lon - self.map_extent.west) * self.ppd_x,
            (self.map_extent.north - point.lat) * self.ppd_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::info::LevelDescriptor;

    fn level(ppd: f64) -> LevelInfo {
        LevelInfo::new(
            1,
            (256, 256),
            LevelDescriptor {
                tiles_x: 8,
                tiles_y: 8,
                ppd_x: ppd,
                ppd_y: ppd,
            },
        )
    }

    fn transform(offset: Point) -> CoordinateTransform {
        CoordinateTransform::new(
            GeoExtent::new(100.0, 160.0, -45.0, -5.0),
            &level(32.0),
            offset,
            Point::new(640.0, 480.0),
        )
    }

    #[test]
    fn test_view_bounds() {
        let t = transform(Point::new(320.0, 64.0));
        let bounds = t.view_bounds();

        assert_eq!(bounds.west, 110.0);
        assert_eq!(bounds.east, 130.0);
        assert_eq!(bounds.north, -7.0);
        assert_eq!(bounds.south, -22.0);
    }

    #[test]
    fn test_geo_view_round_trip() {
        let t = transform(Point::new(320.0, 64.0));
        let samples = [
            GeoPoint::new(110.0, -7.0),
            GeoPoint::new(117.3, -12.25),
            GeoPoint::new(129.99, -21.9),
        ];

        for geo in samples {
            let back = t.view_to_geo(t.geo_to_view(geo));
            assert!((back.lon - geo.lon).abs() < 1e-9);
            assert!((back.lat - geo.lat).abs() < 1e-9);
        }
    }

    #[test]
    fn test_view_origin_is_view_north_west() {
        let t = transform(Point::new(320.0, 64.0));
        assert_eq!(t.view_to_geo(Point::new(0.0, 0.0)), GeoPoint::new(110.0, -7.0));
        assert_eq!(t.geo_to_view(GeoPoint::new(110.0, -7.0)), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_masked_conversion() {
        let t = transform(Point::new(320.0, 64.0));

        assert!(t.geo_to_view_masked(GeoPoint::new(120.0, -10.0)).is_some());
        // Edges are inside
        assert!(t.geo_to_view_masked(GeoPoint::new(110.0, -22.0)).is_some());
        assert!(t.geo_to_view_masked(GeoPoint::new(109.9, -10.0)).is_none());
        assert!(t.geo_to_view_masked(GeoPoint::new(120.0, -6.0)).is_none());
    }

    #[test]
    fn test_negative_offset_centres_small_map() {
        // A map narrower than the view has a negative offset
        let t = transform(Point::new(-100.0, -50.0));
        let map_origin = t.geo_to_view(GeoPoint::new(100.0, -5.0));

        assert_eq!(map_origin, Point::new(100.0, 50.0));
        assert_eq!(t.view_to_map(Point::new(100.0, 50.0)), Point::new(0.0, 0.0));
    }
}
