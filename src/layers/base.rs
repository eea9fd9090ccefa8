use crate::{
    core::{
        constants::{DEFAULT_LAYER_COLOUR, DEFAULT_POINT_SIZE, DEFAULT_POLYGON_SIZE},
        geo::GeoPoint,
    },
    layers::{
        hit_test::{BoxHit, SelectablePoint},
        manager::LayerStore,
        placement::{ImagePlacement, TextAttributes},
    },
    rendering::context::Colour,
    tiles::ImageHandle,
    Result,
};
use std::path::{Path, PathBuf};

/// Identifier handed out by [`LayerStore`]; never reused within a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u32);

impl LayerId {
    pub(crate) fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Points,
    MonoPoints,
    MonoPolygon,
    Image,
    Text,
}

impl LayerKind {
    /// Name given to layers of this kind when none is supplied
    pub fn default_name(&self) -> &'static str {
        match self {
            LayerKind::Points => "<point_layer>",
            LayerKind::MonoPoints => "<mono_point_layer>",
            LayerKind::MonoPolygon => "<mono_polygon_layer>",
            LayerKind::Image => "<image_layer>",
            LayerKind::Text => "<text_layer>",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Points => write!(f, "points"),
            LayerKind::MonoPoints => write!(f, "mono_points"),
            LayerKind::MonoPolygon => write!(f, "mono_polygon"),
            LayerKind::Image => write!(f, "image"),
            LayerKind::Text => write!(f, "text"),
        }
    }
}

/// One point of a point layer
///
/// `x`/`y` are longitude/latitude for map-relative layers and view pixels
/// for view-relative ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    /// Per-point colour; only used by [`LayerData::Points`]
    pub colour: Option<Colour>,
    pub id: Option<u64>,
}

impl PointRecord {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            colour: None,
            id: None,
        }
    }

    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = Some(colour);
        self
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for PointRecord {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<(f64, f64, Colour)> for PointRecord {
    fn from((x, y, colour): (f64, f64, Colour)) -> Self {
        Self::new(x, y).with_colour(colour)
    }
}

/// Where an image layer gets its pixels from
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Image(ImageHandle),
}

impl ImageSource {
    /// Decodes the file, or hands back an already loaded image
    pub fn load(self) -> Result<ImageHandle> {
        match self {
            ImageSource::Path(path) => ImageHandle::open(path),
            ImageSource::Image(image) => Ok(image),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        ImageSource::Path(PathBuf::from(path))
    }
}

impl From<ImageHandle> for ImageSource {
    fn from(image: ImageHandle) -> Self {
        ImageSource::Image(image)
    }
}

/// A loaded image of an image layer
///
/// Map-relative images have their top-left corner at `(x, y)` in
/// lon/lat. View-relative images treat `(x, y)` as a pixel margin for
/// `placement`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub x: f64,
    pub y: f64,
    pub image: ImageHandle,
    pub placement: ImagePlacement,
    pub id: Option<u64>,
}

/// One label of a text layer
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub x: f64,
    pub y: f64,
    pub text: String,
    /// Overrides merged over the layer's attributes
    pub attributes: Option<TextAttributes>,
    pub id: Option<u64>,
}

impl TextLabel {
    pub fn new(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            attributes: None,
            id: None,
        }
    }

    pub fn with_attributes(mut self, attributes: TextAttributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Records of a layer, one variant per render kind
#[derive(Debug, Clone, PartialEq)]
pub enum LayerData {
    /// Points with their own colours, falling back to the layer colour
    Points(Vec<PointRecord>),
    /// Points all drawn in the layer colour
    MonoPoints(Vec<PointRecord>),
    /// Polylines in the layer colour, already closed when requested
    MonoPolygon(Vec<Vec<(f64, f64)>>),
    Image(Vec<ImageRecord>),
    Text {
        labels: Vec<TextLabel>,
        attributes: TextAttributes,
    },
}

impl LayerData {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerData::Points(_) => LayerKind::Points,
            LayerData::MonoPoints(_) => LayerKind::MonoPoints,
            LayerData::MonoPolygon(_) => LayerKind::MonoPolygon,
            LayerData::Image(_) => LayerKind::Image,
            LayerData::Text { .. } => LayerKind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LayerData::Points(points) | LayerData::MonoPoints(points) => points.len(),
            LayerData::MonoPolygon(polygons) => polygons.len(),
            LayerData::Image(images) => images.len(),
            LayerData::Text { labels, .. } => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positions a selection gesture can pick
    ///
    /// Point records, image and text anchors carry their record id; polygon
    /// vertices carry the index of their polygon.
    pub fn selectable_points(&self) -> Vec<SelectablePoint> {
        match self {
            LayerData::Points(points) | LayerData::MonoPoints(points) => points
                .iter()
                .map(|p| SelectablePoint::new(p.position(), p.id))
                .collect(),
            LayerData::MonoPolygon(polygons) => polygons
                .iter()
                .enumerate()
                .flat_map(|(index, polygon)| {
                    polygon.iter().map(move |&(lon, lat)| {
                        SelectablePoint::new(GeoPoint::new(lon, lat), Some(index as u64))
                    })
                })
                .collect(),
            LayerData::Image(images) => images
                .iter()
                .map(|i| SelectablePoint::new(GeoPoint::new(i.x, i.y), i.id))
                .collect(),
            LayerData::Text { labels, .. } => labels
                .iter()
                .map(|l| SelectablePoint::new(GeoPoint::new(l.x, l.y), l.id))
                .collect(),
        }
    }
}

/// Style and placement options shared by every layer kind
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOptions {
    pub map_relative: bool,
    pub colour: Colour,
    /// Point radius or line width in pixels
    pub size: f32,
    pub visible: bool,
    pub filled: bool,
    pub name: Option<String>,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            map_relative: true,
            colour: DEFAULT_LAYER_COLOUR,
            size: DEFAULT_POINT_SIZE,
            visible: true,
            filled: false,
            name: None,
        }
    }
}

impl LayerOptions {
    /// Defaults for polygon layers: thinner lines
    pub fn polygon() -> Self {
        Self {
            size: DEFAULT_POLYGON_SIZE,
            ..Self::default()
        }
    }

    pub fn view_relative(mut self) -> Self {
        self.map_relative = false;
        self
    }

    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = colour;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn filled(mut self, filled: bool) -> Self {
        self.filled = filled;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Called on a point selection with the nearest point in range, or `None`.
/// Returns `true` if the map needs a repaint.
pub type PointSelectCallback = Box<dyn FnMut(&mut LayerStore, LayerId, Option<SelectablePoint>) -> bool>;

/// Called on a box selection with every point inside the box.
/// Returns `true` if the map needs a repaint.
pub type BoxSelectCallback = Box<dyn FnMut(&mut LayerStore, LayerId, &[BoxHit]) -> bool>;

/// A layer owned by a [`LayerStore`]
pub struct Layer {
    id: LayerId,
    name: String,
    data: LayerData,
    map_relative: bool,
    colour: Colour,
    size: f32,
    filled: bool,
    pub(crate) visible: bool,
    /// Selection distance in degrees, shared by left and right selection
    pub(crate) select_radius: Option<f64>,
    pub(crate) point_select: Option<PointSelectCallback>,
    pub(crate) right_point_select: Option<PointSelectCallback>,
    pub(crate) box_select: Option<BoxSelectCallback>,
    /// Bumped by every callback registration or removal
    pub(crate) callback_generation: u32,
}

impl Layer {
    pub(crate) fn new(id: LayerId, data: LayerData, options: LayerOptions) -> Self {
        let name = options
            .name
            .unwrap_or_else(|| data.kind().default_name().to_string());
        Self {
            id,
            name,
            data,
            map_relative: options.map_relative,
            colour: options.colour,
            size: options.size,
            filled: options.filled,
            visible: options.visible,
            select_radius: None,
            point_select: None,
            right_point_select: None,
            box_select: None,
            callback_generation: 0,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> LayerKind {
        self.data.kind()
    }

    pub fn data(&self) -> &LayerData {
        &self.data
    }

    pub fn is_map_relative(&self) -> bool {
        self.map_relative
    }

    pub fn colour(&self) -> Colour {
        self.colour
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn select_radius(&self) -> Option<f64> {
        self.select_radius
    }

    pub fn has_point_select_callback(&self) -> bool {
        self.point_select.is_some()
    }

    pub fn has_right_point_select_callback(&self) -> bool {
        self.right_point_select.is_some()
    }

    pub(crate) fn bump_callback_generation(&mut self) {
        self.callback_generation = self.callback_generation.wrapping_add(1);
    }

    pub fn has_box_select_callback(&self) -> bool {
        self.box_select.is_some()
    }

    /// Selectable positions, or nothing for view-relative layers
    pub fn selectable_points(&self) -> Vec<SelectablePoint> {
        if self.map_relative {
            self.data.selectable_points()
        } else {
            Vec::new()
        }
    }
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("records", &self.data.len())
            .field("map_relative", &self.map_relative)
            .field("visible", &self.visible)
            .field("colour", &self.colour)
            .field("size", &self.size)
            .finish()
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "layer {} '{}': {} x{}, map_relative={}, visible={}, colour={}, size={}",
            self.id,
            self.name,
            self.kind(),
            self.data.len(),
            self.map_relative,
            self.visible,
            self.colour,
            self.size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_defaults() {
        let layer = Layer::new(
            LayerId::new(1),
            LayerData::MonoPoints(vec![PointRecord::new(1.0, 2.0)]),
            LayerOptions::default(),
        );

        assert_eq!(layer.name(), "<mono_point_layer>");
        assert_eq!(layer.colour(), Colour::red());
        assert_eq!(layer.size(), DEFAULT_POINT_SIZE);
        assert!(layer.is_visible());
        assert!(layer.is_map_relative());
        assert!(!layer.has_point_select_callback());
    }

    #[test]
    fn test_selectable_points_per_kind() {
        let polygons = LayerData::MonoPolygon(vec![
            vec![(0.0, 0.0), (1.0, 0.0)],
            vec![(5.0, 5.0)],
        ]);
        let selectable = polygons.selectable_points();
        assert_eq!(selectable.len(), 3);
        assert_eq!(selectable[2].id, Some(1));

        let text = LayerData::Text {
            labels: vec![TextLabel::new(3.0, 4.0, "Perth").with_id(7)],
            attributes: TextAttributes::default(),
        };
        assert_eq!(
            text.selectable_points(),
            vec![SelectablePoint::new(GeoPoint::new(3.0, 4.0), Some(7))]
        );
    }

    #[test]
    fn test_view_relative_layer_not_selectable() {
        let layer = Layer::new(
            LayerId::new(2),
            LayerData::Points(vec![PointRecord::new(10.0, 10.0)]),
            LayerOptions::default().view_relative(),
        );
        assert!(layer.selectable_points().is_empty());
    }

    #[test]
    fn test_point_record_conversions() {
        let p: PointRecord = (1.0, 2.0, Colour::blue()).into();
        assert_eq!(p.colour, Some(Colour::blue()));
        assert_eq!(p.with_id(3).id, Some(3));
        assert_eq!(LayerId::new(12).to_string(), "12");
    }
}
