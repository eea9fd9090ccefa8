use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate as longitude and latitude in degrees
///
/// The engine only assumes a cartesian 2D system, so `lon` and `lat` are
/// plain x/y values measured in the units the tile pyramid was built in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    /// Creates a new geographical coordinate
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Squared euclidean distance to another point, in degrees squared
    pub fn distance_squared(&self, other: &GeoPoint) -> f64 {
        let dx = self.lon - other.lon;
        let dy = self.lat - other.lat;
        dx * dx + dy * dy
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self::new(lon, lat)
    }
}

/// Represents a point in view or map pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn half(&self) -> Point {
        self.multiply(0.5)
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// A geographical rectangle given by its four edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoExtent {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl GeoExtent {
    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self {
            west,
            east,
            south,
            north,
        }
    }

    /// Builds the extent spanned by two opposite corners given in any order
    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Self {
        Self::new(
            a.lon.min(b.lon),
            a.lon.max(b.lon),
            a.lat.min(b.lat),
            a.lat.max(b.lat),
        )
    }

    /// Checks if the extent contains a point, edges included
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.west <= point.lon
            && point.lon <= self.east
            && self.south <= point.lat
            && point.lat <= self.north
    }

    /// Gets the center point of the extent
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// The north-west corner, which is the origin of map pixel space
    pub fn north_west(&self) -> GeoPoint {
        GeoPoint::new(self.west, self.north)
    }

    /// Checks that every edge is finite and the extent is not inverted
    pub fn is_valid(&self) -> bool {
        [self.west, self.east, self.south, self.north]
            .iter()
            .all(|v| v.is_finite())
            && self.west < self.east
            && self.south < self.north
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_contains_is_inclusive() {
        let extent = GeoExtent::new(100.0, 160.0, -45.0, -5.0);

        assert!(extent.contains(&GeoPoint::new(100.0, -45.0)));
        assert!(extent.contains(&GeoPoint::new(160.0, -5.0)));
        assert!(extent.contains(&GeoPoint::new(130.0, -20.0)));
        assert!(!extent.contains(&GeoPoint::new(160.01, -20.0)));
        assert!(!extent.contains(&GeoPoint::new(130.0, -4.99)));
    }

    #[test]
    fn test_extent_from_corners_normalizes() {
        let a = GeoPoint::new(10.0, 0.0);
        let b = GeoPoint::new(0.0, 10.0);
        let extent = GeoExtent::from_corners(a, b);

        assert_eq!(extent, GeoExtent::new(0.0, 10.0, 0.0, 10.0));
        assert_eq!(extent, GeoExtent::from_corners(b, a));
    }

    #[test]
    fn test_extent_validity() {
        assert!(GeoExtent::new(0.0, 1.0, 0.0, 1.0).is_valid());
        assert!(!GeoExtent::new(1.0, 0.0, 0.0, 1.0).is_valid());
        assert!(!GeoExtent::new(0.0, f64::NAN, 0.0, 1.0).is_valid());
    }

    #[test]
    fn test_point_math() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(p.add(&Point::new(1.0, 1.0)), Point::new(4.0, 5.0));
        assert_eq!(p.subtract(&Point::new(1.0, 1.0)), Point::new(2.0, 3.0));
        assert_eq!(p.half(), Point::new(1.5, 2.0));
        assert_eq!(GeoPoint::new(0.0, 0.0).distance_squared(&GeoPoint::new(3.0, 4.0)), 25.0);
    }
}
