use crate::{
    core::geo::GeoPoint,
    layers::{
        base::{
            BoxSelectCallback, ImageRecord, ImageSource, Layer, LayerData, LayerId, LayerOptions,
            PointRecord, PointSelectCallback, TextLabel,
        },
        hit_test::{nearest_point, points_in_box, BoxHit, SelectablePoint},
        placement::{ImagePlacement, TextAttributes},
        zorder::ZOrder,
    },
    Result, SlipError,
};

use crate::prelude::HashMap;

/// Which pointer button made a point selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectButton {
    Left,
    Right,
}

/// Owns the map's layers and their back-to-front order
///
/// Layers are only reachable through their [`LayerId`]. Operations on an id
/// that is no longer present are logged and ignored.
pub struct LayerStore {
    layers: HashMap<LayerId, Layer>,
    z_order: ZOrder,
    next_id: u32,
    repaint: bool,
}

impl LayerStore {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            z_order: ZOrder::new(),
            next_id: 1,
            repaint: false,
        }
    }

    /// Adds a layer on top of all others
    pub fn add_layer(&mut self, data: LayerData, options: LayerOptions) -> LayerId {
        let id = LayerId::new(self.next_id);
        self.next_id += 1;

        let layer = Layer::new(id, data, options);
        log::debug!("adding {}", layer);
        self.layers.insert(id, layer);
        self.z_order.push(id);
        self.repaint = true;
        id
    }

    /// Points drawn with their own colour, or the layer colour when they have none
    pub fn add_point_layer<P: Into<PointRecord>>(
        &mut self,
        points: impl IntoIterator<Item = P>,
        options: LayerOptions,
    ) -> LayerId {
        let points = points.into_iter().map(Into::into).collect();
        self.add_layer(LayerData::Points(points), options)
    }

    /// Points all drawn in the layer colour
    pub fn add_mono_point_layer<P: Into<PointRecord>>(
        &mut self,
        points: impl IntoIterator<Item = P>,
        options: LayerOptions,
    ) -> LayerId {
        let points = points.into_iter().map(Into::into).collect();
        self.add_layer(LayerData::MonoPoints(points), options)
    }

    /// Polylines in the layer colour.
    ///
    /// With `closed` set, or a filled style, every polygon is closed by
    /// repeating its first vertex.
    pub fn add_mono_polygon_layer(
        &mut self,
        polygons: impl IntoIterator<Item = Vec<(f64, f64)>>,
        closed: bool,
        options: LayerOptions,
    ) -> LayerId {
        let close = closed || options.filled;
        let polygons = polygons
            .into_iter()
            .map(|mut polygon| {
                if close {
                    if let (Some(&first), Some(&last)) = (polygon.first(), polygon.last()) {
                        if polygon.len() > 1 && first != last {
                            polygon.push(first);
                        }
                    }
                }
                polygon
            })
            .collect();
        self.add_layer(LayerData::MonoPolygon(polygons), options)
    }

    /// Images given as `(x, y, source, placement)`.
    ///
    /// Every source is loaded before the layer is created, so a bad path
    /// leaves the store unchanged.
    pub fn add_image_layer<S: Into<ImageSource>>(
        &mut self,
        images: impl IntoIterator<Item = (f64, f64, S, ImagePlacement)>,
        options: LayerOptions,
    ) -> Result<LayerId> {
        let records = images
            .into_iter()
            .map(|(x, y, source, placement)| {
                Ok(ImageRecord {
                    x,
                    y,
                    image: source.into().load()?,
                    placement,
                    id: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.add_layer(LayerData::Image(records), options))
    }

    pub fn add_text_layer(
        &mut self,
        labels: impl IntoIterator<Item = TextLabel>,
        attributes: TextAttributes,
        options: LayerOptions,
    ) -> LayerId {
        let data = LayerData::Text {
            labels: labels.into_iter().collect(),
            attributes,
        };
        self.add_layer(data, options)
    }

    /// Removes a layer. `None` and ids already removed are ignored.
    pub fn delete_layer(&mut self, id: impl Into<Option<LayerId>>) {
        let Some(id) = id.into() else {
            return;
        };

        match self.layers.remove(&id) {
            Some(layer) => {
                self.z_order.remove(id);
                log::debug!("deleted {}", layer);
                if layer.visible {
                    self.repaint = true;
                }
            }
            None => log::warn!("delete_layer: no layer {}", id),
        }
    }

    pub fn show_layer(&mut self, id: LayerId) {
        self.set_visible(id, true);
    }

    pub fn hide_layer(&mut self, id: LayerId) {
        self.set_visible(id, false);
    }

    fn set_visible(&mut self, id: LayerId, visible: bool) {
        match self.layers.get_mut(&id) {
            Some(layer) => {
                if layer.visible != visible {
                    layer.visible = visible;
                    self.repaint = true;
                }
            }
            None => log::warn!("set_visible: no layer {}", id),
        }
    }

    pub fn to_back(&mut self, id: LayerId) {
        if self.z_order.to_back(id) {
            self.repaint = true;
        } else {
            log::warn!("to_back: no layer {}", id);
        }
    }

    pub fn to_front(&mut self, id: LayerId) {
        if self.z_order.to_front(id) {
            self.repaint = true;
        } else {
            log::warn!("to_front: no layer {}", id);
        }
    }

    /// Moves `id` so that it is drawn directly beneath `anchor`
    pub fn place_after(&mut self, id: LayerId, anchor: LayerId) {
        if self.z_order.place_after(id, anchor) {
            self.repaint = true;
        } else {
            log::warn!("place_after: cannot place layer {} under {}", id, anchor);
        }
    }

    /// Registers the left-click selection callback; `select_radius` is in degrees
    pub fn set_point_select_callback(
        &mut self,
        id: LayerId,
        select_radius: f64,
        callback: impl FnMut(&mut LayerStore, LayerId, Option<SelectablePoint>) -> bool + 'static,
    ) {
        if let Some(layer) = self.layer_mut_or_warn(id) {
            layer.select_radius = Some(select_radius);
            layer.point_select = Some(Box::new(callback));
            layer.bump_callback_generation();
        }
    }

    /// Registers the right-click selection callback; `select_radius` is in degrees
    pub fn set_right_point_select_callback(
        &mut self,
        id: LayerId,
        select_radius: f64,
        callback: impl FnMut(&mut LayerStore, LayerId, Option<SelectablePoint>) -> bool + 'static,
    ) {
        if let Some(layer) = self.layer_mut_or_warn(id) {
            layer.select_radius = Some(select_radius);
            layer.right_point_select = Some(Box::new(callback));
            layer.bump_callback_generation();
        }
    }

    pub fn set_box_select_callback(
        &mut self,
        id: LayerId,
        callback: impl FnMut(&mut LayerStore, LayerId, &[BoxHit]) -> bool + 'static,
    ) {
        if let Some(layer) = self.layer_mut_or_warn(id) {
            layer.box_select = Some(Box::new(callback));
            layer.bump_callback_generation();
        }
    }

    pub fn clear_point_select_callback(&mut self, id: LayerId) {
        if let Some(layer) = self.layer_mut_or_warn(id) {
            layer.point_select = None;
            layer.bump_callback_generation();
        }
    }

    pub fn clear_right_point_select_callback(&mut self, id: LayerId) {
        if let Some(layer) = self.layer_mut_or_warn(id) {
            layer.right_point_select = None;
            layer.bump_callback_generation();
        }
    }

    pub fn clear_box_select_callback(&mut self, id: LayerId) {
        if let Some(layer) = self.layer_mut_or_warn(id) {
            layer.box_select = None;
            layer.bump_callback_generation();
        }
    }

    fn layer_mut_or_warn(&mut self, id: LayerId) -> Option<&mut Layer> {
        let layer = self.layers.get_mut(&id);
        if layer.is_none() {
            log::warn!("no layer {}", id);
        }
        layer
    }

    /// Offers a click at `click` to every visible map-relative layer with a
    /// callback for `button`, bottom layer first.
    ///
    /// Each callback receives the nearest point within its layer's select
    /// radius, or `None`. Callbacks may add and delete layers; the layers
    /// visited are those present when the click happened. A callback that
    /// replaces or clears its own registration keeps the new state. Returns `true` if
    /// any callback asked for a repaint.
    pub fn select_point(&mut self, click: GeoPoint, button: SelectButton) -> bool {
        let mut repaint = false;

        for id in self.z_order.snapshot() {
            let Some(layer) = self.layers.get_mut(&id) else {
                continue;
            };
            if !layer.visible || !layer.is_map_relative() {
                continue;
            }
            let Some(mut callback) = point_slot(layer, button).take() else {
                continue;
            };

            let generation = layer.callback_generation;
            let radius = layer.select_radius.unwrap_or(0.0);
            let hit = nearest_point(&layer.selectable_points(), radius * radius, click);
            log::debug!("point select on layer {}: {:?}", id, hit);
            repaint |= callback(self, id, hit);

            if let Some(layer) = self.layers.get_mut(&id) {
                if layer.callback_generation == generation {
                    *point_slot(layer, button) = Some(callback);
                }
            }
        }

        if repaint {
            self.repaint = true;
        }
        repaint
    }

    /// Offers the box between two corners to every visible map-relative layer
    /// with a box-select callback, bottom layer first.
    ///
    /// Callbacks only run for layers with at least one point in the box.
    pub fn select_box(&mut self, corner1: GeoPoint, corner2: GeoPoint) -> bool {
        let mut repaint = false;

        for id in self.z_order.snapshot() {
            let Some(layer) = self.layers.get_mut(&id) else {
                continue;
            };
            if !layer.visible || !layer.is_map_relative() || layer.box_select.is_none() {
                continue;
            }

            let hits = points_in_box(&layer.selectable_points(), corner1, corner2);
            if hits.is_empty() {
                continue;
            }
            let Some(mut callback) = layer.box_select.take() else {
                continue;
            };
            let generation = layer.callback_generation;

            log::debug!("box select on layer {}: {} points", id, hits.len());
            repaint |= callback(self, id, &hits);

            if let Some(layer) = self.layers.get_mut(&id) {
                if layer.callback_generation == generation {
                    layer.box_select = Some(callback);
                }
            }
        }

        if repaint {
            self.repaint = true;
        }
        repaint
    }

    /// Current back-to-front order
    pub fn z_order(&self) -> &ZOrder {
        &self.z_order
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    /// Strict form of [`LayerStore::layer`]
    pub fn layer_or_err(&self, id: LayerId) -> Result<&Layer> {
        self.layer(id).ok_or(SlipError::UnknownLayer(id))
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    /// Layers in paint order, bottom first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Layer> + '_ {
        self.z_order.iter().filter_map(|id| self.layers.get(&id))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn needs_repaint(&self) -> bool {
        self.repaint
    }

    pub fn request_repaint(&mut self) {
        self.repaint = true;
    }

    /// Returns and resets the repaint request
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.repaint)
    }

    /// Logs one line per layer, bottom first
    pub fn log_layers(&self) {
        log::debug!("{} layers, z-order {:?}", self.len(), self.z_order.as_slice());
        for layer in self.iter() {
            log::debug!("  {}", layer);
        }
    }
}

fn point_slot(layer: &mut Layer, button: SelectButton) -> &mut Option<PointSelectCallback> {
    match button {
        SelectButton::Left => &mut layer.point_select,
        SelectButton::Right => &mut layer.right_point_select,
    }
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LayerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerStore")
            .field("z_order", &self.z_order)
            .field("next_id", &self.next_id)
            .finish()
    }
}
