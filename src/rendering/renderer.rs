use crate::{
    core::{
        constants::{SELECTION_BOX_WIDTH, TEXT_ANCHOR_RADIUS},
        geo::{GeoPoint, Point},
        map::Map,
        transform::CoordinateTransform,
    },
    layers::{
        base::{ImageRecord, Layer, LayerData, PointRecord, TextLabel},
        placement::TextAttributes,
    },
    rendering::context::{Canvas, Colour, ShapeStyle},
    tiles::info::LevelInfo,
};

/// Half-open range of tile indices covering the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub start_x: u32,
    pub stop_x: u32,
    pub start_y: u32,
    pub stop_y: u32,
}

impl TileRange {
    pub fn is_empty(&self) -> bool {
        self.start_x >= self.stop_x || self.start_y >= self.stop_y
    }

    /// Number of tiles in the range
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            ((self.stop_x - self.start_x) * (self.stop_y - self.start_y)) as usize
        }
    }

    /// Tile indices in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> {
        let (start_x, stop_x) = (self.start_x, self.stop_x);
        (self.start_y..self.stop_y).flat_map(move |y| (start_x..stop_x).map(move |x| (x, y)))
    }
}

/// Tiles of `level` intersecting a view of `view_size` at map `offset`.
///
/// The stop indices round up so partially visible edge tiles are included.
pub fn visible_tile_range(level: &LevelInfo, offset: Point, view_size: Point) -> TileRange {
    let tile = level.tile_size();
    let axis = |off: f64, view: f64, size: f64, count: u32| {
        let start = (off / size).floor().max(0.0);
        let stop = ((off + view) / size).ceil().clamp(0.0, f64::from(count));
        (start.min(stop) as u32, stop as u32)
    };

    let (start_x, stop_x) = axis(offset.x, view_size.x, tile.x, level.tiles_x);
    let (start_y, stop_y) = axis(offset.y, view_size.y, tile.y, level.tiles_y);
    TileRange {
        start_x,
        stop_x,
        start_y,
        stop_y,
    }
}

/// Paints a [`Map`] onto a [`Canvas`]
///
/// Painting only reads the map; tiles fetched on the way land in the tile
/// cache.
pub struct Renderer;

impl Renderer {
    /// Paints the background, the visible tiles, every visible layer from
    /// back to front and finally the selection box, if any.
    pub fn paint<C: Canvas + ?Sized>(
        map: &Map,
        selection_box: Option<(Point, Point)>,
        canvas: &mut C,
    ) {
        canvas.clear(map.background());

        Self::paint_tiles(map, canvas);

        let transform = map.transform();
        for layer in map.layers().iter().filter(|layer| layer.is_visible()) {
            Self::paint_layer(layer, &transform, canvas);
        }

        if let Some((min, max)) = selection_box {
            canvas.draw_rect(
                min,
                max,
                &ShapeStyle::outline(Colour::black(), SELECTION_BOX_WIDTH),
            );
        }
    }

    /// Draws a filled highlight disc at `position`, if it is inside the view
    pub fn draw_selected_point<C: Canvas + ?Sized>(
        map: &Map,
        position: GeoPoint,
        colour: Colour,
        radius: f32,
        canvas: &mut C,
    ) -> bool {
        match map.geo_to_view_masked(position) {
            Some(centre) => {
                canvas.draw_circle(centre, radius, &ShapeStyle::solid(colour));
                true
            }
            None => false,
        }
    }

    fn paint_tiles<C: Canvas + ?Sized>(map: &Map, canvas: &mut C) {
        let viewport = map.viewport();
        let level = viewport.level();
        let offset = viewport.offset();
        let tile = level.tile_size();

        let range = visible_tile_range(level, offset, viewport.view_size());
        log::trace!("painting {} tiles of level {}", range.len(), level.level);

        for (x, y) in range.iter() {
            let image = map.tiles().get_tile(level.level, x, y);
            let origin = Point::new(
                f64::from(x) * tile.x - offset.x,
                f64::from(y) * tile.y - offset.y,
            );
            canvas.draw_image(&image, origin);
        }
    }

    fn paint_layer<C: Canvas + ?Sized>(
        layer: &Layer,
        transform: &CoordinateTransform,
        canvas: &mut C,
    ) {
        let place = |x: f64, y: f64| {
            if layer.is_map_relative() {
                transform.geo_to_view(GeoPoint::new(x, y))
            } else {
                Point::new(x, y)
            }
        };

        match layer.data() {
            LayerData::Points(points) => {
                paint_points(points, layer, place, |p| p.colour.unwrap_or(layer.colour()), canvas)
            }
            LayerData::MonoPoints(points) => {
                paint_points(points, layer, place, |_| layer.colour(), canvas)
            }
            LayerData::MonoPolygon(polygons) => {
                let style = ShapeStyle {
                    stroke: layer.colour(),
                    stroke_width: layer.size(),
                    fill: layer.is_filled().then(|| layer.colour()),
                };
                for polygon in polygons {
                    let points: Vec<Point> = polygon.iter().map(|&(x, y)| place(x, y)).collect();
                    canvas.draw_polygon(&points, &style);
                }
            }
            LayerData::Image(images) => {
                for record in images {
                    let origin = image_origin(record, layer.is_map_relative(), transform);
                    canvas.draw_image(&record.image, origin);
                }
            }
            LayerData::Text { labels, attributes } => {
                for label in labels {
                    paint_label(label, attributes, place(label.x, label.y), canvas);
                }
            }
        }
    }
}

fn paint_points<C: Canvas + ?Sized>(
    points: &[PointRecord],
    layer: &Layer,
    place: impl Fn(f64, f64) -> Point,
    colour_of: impl Fn(&PointRecord) -> Colour,
    canvas: &mut C,
) {
    for point in points {
        canvas.draw_circle(
            place(point.x, point.y),
            layer.size(),
            &ShapeStyle::solid(colour_of(point)),
        );
    }
}

fn image_origin(record: &ImageRecord, map_relative: bool, transform: &CoordinateTransform) -> Point {
    if map_relative {
        transform.geo_to_view(GeoPoint::new(record.x, record.y))
    } else {
        record.placement.origin(
            Point::new(record.x, record.y),
            record.image.size(),
            transform.view_size(),
        )
    }
}

fn paint_label<C: Canvas + ?Sized>(
    label: &TextLabel,
    layer_attributes: &TextAttributes,
    anchor: Point,
    canvas: &mut C,
) {
    let attributes = match &label.attributes {
        Some(own) => own.merged_over(layer_attributes),
        None => *layer_attributes,
    };
    let colour = attributes.colour();

    canvas.draw_circle(anchor, TEXT_ANCHOR_RADIUS, &ShapeStyle::solid(colour));

    let extent = canvas.text_extent(&label.text);
    let origin = attributes
        .placement()
        .origin(anchor, extent, attributes.offset());
    canvas.draw_text(&label.text, origin, colour);
}
