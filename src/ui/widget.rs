use crate::{
    core::{geo::Point, map::Map},
    input::{
        events::{InputEvent, KeyCode, KeyModifiers, MouseButton},
        handler::{InputHandler, InteractionState},
    },
    rendering::{
        context::{Canvas, Colour, ShapeStyle},
        renderer::Renderer,
    },
    tiles::ImageHandle,
};
use egui::{
    Align2, Color32, ColorImage, CursorIcon, FontId, Painter, Pos2, Rect, Response, Sense, Shape,
    Stroke, TextureHandle, TextureOptions, Ui, Vec2,
};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Presentation settings of a [`MapWidget`]
#[derive(Debug, Clone)]
pub struct MapWidgetConfig {
    /// Fixed widget size; the available space is used otherwise
    pub preferred_size: Option<Vec2>,
    /// Number of tile and layer images kept as GPU textures
    pub texture_capacity: usize,
    pub font_size: f32,
    /// Scroll distance in points that makes one zoom step
    pub scroll_step: f32,
}

impl Default for MapWidgetConfig {
    fn default() -> Self {
        Self {
            preferred_size: None,
            texture_capacity: 256,
            font_size: 12.0,
            scroll_step: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapCursor {
    Default,
    Grabbing,
    Crosshair,
}

impl From<MapCursor> for CursorIcon {
    fn from(cursor: MapCursor) -> Self {
        match cursor {
            MapCursor::Default => CursorIcon::Default,
            MapCursor::Grabbing => CursorIcon::Grabbing,
            MapCursor::Crosshair => CursorIcon::Crosshair,
        }
    }
}

impl From<InteractionState> for MapCursor {
    fn from(state: InteractionState) -> Self {
        match state {
            InteractionState::Idle => MapCursor::Default,
            InteractionState::Dragging { .. } => MapCursor::Grabbing,
            InteractionState::BoxSelecting { .. } => MapCursor::Crosshair,
        }
    }
}

/// Collects wheel and trackpad deltas spread over several frames into
/// discrete zoom steps
#[derive(Debug, Clone, Copy, Default)]
struct ScrollAccumulator {
    pending: f32,
}

impl ScrollAccumulator {
    /// Adds `delta` and returns its direction once the total reaches `step`.
    /// The remainder is dropped, so one gesture zooms at most one level
    /// per crossing.
    fn feed(&mut self, delta: f32, step: f32) -> Option<f32> {
        if delta == 0.0 {
            return None;
        }
        if self.pending != 0.0 && self.pending.signum() != delta.signum() {
            self.pending = 0.0;
        }
        self.pending += delta;
        if self.pending.abs() >= step.max(f32::EPSILON) {
            let direction = self.pending.signum();
            self.pending = 0.0;
            Some(direction)
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.pending = 0.0;
    }
}

/// An egui widget showing a [`Map`]
///
/// The widget owns the map and its [`InputHandler`]; use [`MapWidget::map_mut`]
/// to add layers and register callbacks.
pub struct MapWidget {
    map: Map,
    input: InputHandler,
    config: MapWidgetConfig,
    textures: LruCache<String, TextureHandle>,
    scroll: ScrollAccumulator,
    hovered: bool,
    focused: bool,
}

impl MapWidget {
    pub fn new(map: Map) -> Self {
        Self::with_config(map, MapWidgetConfig::default())
    }

    pub fn with_config(map: Map, config: MapWidgetConfig) -> Self {
        let capacity = NonZeroUsize::new(config.texture_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            map,
            input: InputHandler::new(),
            config,
            textures: LruCache::new(capacity),
            scroll: ScrollAccumulator::default(),
            hovered: false,
            focused: true,
        }
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    pub fn input(&self) -> &InputHandler {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputHandler {
        &mut self.input
    }

    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let desired_size = self
            .config
            .preferred_size
            .unwrap_or_else(|| ui.available_size());
        let (rect, response) = ui.allocate_exact_size(desired_size, Sense::click_and_drag());

        let view_size = Point::new(f64::from(rect.width()), f64::from(rect.height()));
        if view_size != self.map.view_size() {
            self.input
                .handle(&mut self.map, InputEvent::Resize { size: view_size });
        }

        for event in self.collect_events(ui, rect, &response) {
            self.input.handle(&mut self.map, event);
        }

        let painter = ui.painter_at(rect);
        let mut canvas = EguiCanvas {
            ctx: ui.ctx(),
            painter: &painter,
            rect,
            font: FontId::proportional(self.config.font_size),
            textures: &mut self.textures,
        };
        Renderer::paint(&self.map, self.input.selection_box(), &mut canvas);

        if response.hovered() {
            let cursor: MapCursor = self.input.state().into();
            ui.ctx().set_cursor_icon(cursor.into());
        }

        if self.map.take_repaint() {
            ui.ctx().request_repaint();
        }

        response
    }

    /// Translates this frame's egui input into map events, in the order
    /// press, move, double-click, release.
    fn collect_events(&mut self, ui: &Ui, rect: Rect, response: &Response) -> Vec<InputEvent> {
        let local = |pos: Pos2| {
            Point::new(
                f64::from(pos.x - rect.min.x),
                f64::from(pos.y - rect.min.y),
            )
        };
        let hovered = response.hovered();
        let active = !self.input.is_idle();
        let scroll_step = self.config.scroll_step;
        let mut events = Vec::new();

        ui.input(|i| {
            let modifiers = KeyModifiers {
                shift: i.modifiers.shift,
                ctrl: i.modifiers.ctrl,
                alt: i.modifiers.alt,
                meta: i.modifiers.mac_cmd,
            };
            let pointer = i.pointer.latest_pos();

            if let Some(pos) = pointer {
                if hovered && i.pointer.primary_pressed() {
                    events.push(InputEvent::PointerDown {
                        position: local(pos),
                        button: MouseButton::Left,
                        modifiers,
                    });
                }
                if (hovered || active) && i.pointer.delta() != Vec2::ZERO {
                    events.push(InputEvent::PointerMove {
                        position: local(pos),
                    });
                }
                if response.double_clicked() {
                    events.push(InputEvent::DoubleClick {
                        position: local(pos),
                        modifiers,
                    });
                }
                if (hovered || active) && i.pointer.primary_released() {
                    events.push(InputEvent::PointerUp {
                        position: local(pos),
                        button: MouseButton::Left,
                    });
                }
                if hovered && i.pointer.secondary_released() {
                    events.push(InputEvent::PointerUp {
                        position: local(pos),
                        button: MouseButton::Right,
                    });
                }
                if hovered {
                    if let Some(direction) = self.scroll.feed(i.raw_scroll_delta.y, scroll_step) {
                        events.push(InputEvent::Scroll {
                            delta: f64::from(direction),
                            position: local(pos),
                        });
                    }
                }
            }

            if self.hovered && !hovered && !i.pointer.any_down() {
                events.push(InputEvent::PointerLeft);
            }
            if self.focused && !i.focused {
                events.push(InputEvent::FocusLost);
            }

            if hovered {
                for (key, code) in KEY_BINDINGS {
                    if i.key_pressed(key) {
                        events.push(InputEvent::KeyPress {
                            key: code,
                            modifiers,
                        });
                    }
                }
            }

            self.focused = i.focused;
        });
        if !hovered {
            self.scroll.reset();
        }
        self.hovered = hovered;

        events
    }
}

const KEY_BINDINGS: [(egui::Key, KeyCode); 7] = [
    (egui::Key::ArrowUp, KeyCode::ArrowUp),
    (egui::Key::ArrowDown, KeyCode::ArrowDown),
    (egui::Key::ArrowLeft, KeyCode::ArrowLeft),
    (egui::Key::ArrowRight, KeyCode::ArrowRight),
    (egui::Key::PageUp, KeyCode::PageUp),
    (egui::Key::PageDown, KeyCode::PageDown),
    (egui::Key::Escape, KeyCode::Escape),
];

fn to_color32(colour: Colour) -> Color32 {
    Color32::from_rgba_unmultiplied(colour.r, colour.g, colour.b, colour.a)
}

/// [`Canvas`] painting through an egui [`Painter`]
struct EguiCanvas<'a> {
    ctx: &'a egui::Context,
    painter: &'a Painter,
    rect: Rect,
    font: FontId,
    textures: &'a mut LruCache<String, TextureHandle>,
}

impl EguiCanvas<'_> {
    fn pos(&self, point: Point) -> Pos2 {
        Pos2::new(
            self.rect.min.x + point.x as f32,
            self.rect.min.y + point.y as f32,
        )
    }

    fn texture(&mut self, image: &ImageHandle) -> egui::TextureId {
        if let Some(texture) = self.textures.get(image.key()) {
            return texture.id();
        }

        let size = [image.width() as usize, image.height() as usize];
        let pixels = ColorImage::from_rgba_unmultiplied(size, image.pixels().as_raw());
        let texture = self
            .ctx
            .load_texture(image.key(), pixels, TextureOptions::default());
        let id = texture.id();
        log::trace!("uploaded texture {}", image.key());
        self.textures.put(image.key().to_string(), texture);
        id
    }
}

impl Canvas for EguiCanvas<'_> {
    fn size(&self) -> Point {
        Point::new(f64::from(self.rect.width()), f64::from(self.rect.height()))
    }

    fn clear(&mut self, colour: Colour) {
        self.painter.rect_filled(self.rect, 0.0, to_color32(colour));
    }

    fn draw_image(&mut self, image: &ImageHandle, origin: Point) {
        let texture = self.texture(image);
        let min = self.pos(origin);
        let rect = Rect::from_min_size(min, Vec2::new(image.width() as f32, image.height() as f32));
        self.painter.image(
            texture,
            rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );
    }

    fn draw_circle(&mut self, centre: Point, radius: f32, style: &ShapeStyle) {
        let centre = self.pos(centre);
        if let Some(fill) = style.fill {
            self.painter.circle_filled(centre, radius, to_color32(fill));
        }
        if style.stroke_width > 0.0 {
            self.painter.circle_stroke(
                centre,
                radius,
                Stroke::new(style.stroke_width, to_color32(style.stroke)),
            );
        }
    }

    fn draw_polygon(&mut self, points: &[Point], style: &ShapeStyle) {
        let points: Vec<Pos2> = points.iter().map(|&p| self.pos(p)).collect();
        let stroke = Stroke::new(style.stroke_width, to_color32(style.stroke));
        match style.fill {
            Some(fill) => {
                self.painter
                    .add(Shape::convex_polygon(points, to_color32(fill), stroke));
            }
            None => {
                self.painter.add(Shape::line(points, stroke));
            }
        }
    }

    fn draw_text(&mut self, text: &str, origin: Point, colour: Colour) {
        self.painter.text(
            self.pos(origin),
            Align2::LEFT_TOP,
            text,
            self.font.clone(),
            to_color32(colour),
        );
    }

    fn text_extent(&self, text: &str) -> Point {
        let galley = self
            .painter
            .layout_no_wrap(text.to_string(), self.font.clone(), Color32::BLACK);
        let size = galley.size();
        Point::new(f64::from(size.x), f64::from(size.y))
    }

    fn draw_rect(&mut self, min: Point, max: Point, style: &ShapeStyle) {
        let rect = Rect::from_two_pos(self.pos(min), self.pos(max));
        if let Some(fill) = style.fill {
            self.painter.rect_filled(rect, 0.0, to_color32(fill));
        }
        self.painter.rect_stroke(
            rect,
            0.0,
            Stroke::new(style.stroke_width, to_color32(style.stroke)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_follows_gesture() {
        assert_eq!(MapCursor::from(InteractionState::Idle), MapCursor::Default);
        assert_eq!(
            MapCursor::from(InteractionState::Dragging {
                last: Point::new(1.0, 2.0)
            }),
            MapCursor::Grabbing
        );
        assert_eq!(
            CursorIcon::from(MapCursor::Crosshair),
            CursorIcon::Crosshair
        );
    }

    #[test]
    fn test_colour_conversion() {
        assert_eq!(to_color32(Colour::red()), Color32::from_rgb(255, 0, 0));
        assert_eq!(
            to_color32(Colour::rgba(0, 0, 0, 0)),
            Color32::TRANSPARENT
        );
    }

    #[test]
    fn test_smooth_scroll_zooms_once_per_step() {
        let mut scroll = ScrollAccumulator::default();
        // A trackpad gesture spread over five frames
        let fired: Vec<f32> = [12.0, 15.0, 14.0, 11.0, 8.0]
            .iter()
            .filter_map(|&delta| scroll.feed(delta, 50.0))
            .collect();
        assert_eq!(fired, vec![1.0]);

        assert_eq!(scroll.feed(-60.0, 50.0), Some(-1.0));
        assert_eq!(scroll.feed(0.0, 50.0), None);
    }

    #[test]
    fn test_scroll_direction_change_discards_pending() {
        let mut scroll = ScrollAccumulator::default();
        assert_eq!(scroll.feed(40.0, 50.0), None);
        assert_eq!(scroll.feed(-20.0, 50.0), None);
        assert_eq!(scroll.feed(-30.0, 50.0), Some(-1.0));

        scroll.feed(40.0, 50.0);
        scroll.reset();
        assert_eq!(scroll.feed(20.0, 50.0), None);
    }

    #[test]
    fn test_key_bindings_cover_all_keys() {
        let codes: Vec<KeyCode> = KEY_BINDINGS.iter().map(|(_, code)| *code).collect();
        assert!(codes.contains(&KeyCode::Escape));
        assert_eq!(codes.len(), 7);
    }
}
