use crate::{
    core::{geo::Point, map::Map},
    input::events::{InputEvent, KeyCode, KeyModifiers, MouseButton},
    layers::manager::SelectButton,
};

/// What the primary pointer is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Panning; `last` is the previous pointer position
    Dragging { last: Point },
    /// Rubber-banding a selection box; the size may be negative
    BoxSelecting { anchor: Point, width: f64, height: f64 },
}

/// Turns pointer, wheel and keyboard input into pan, zoom and selection
/// actions on a [`Map`]
#[derive(Debug, Clone)]
pub struct InputHandler {
    pub enabled: bool,
    state: InteractionState,
    /// Set once a drag actually moved; the following release is not a click
    was_dragging: bool,
    /// Set by a double-click so its trailing release does not select
    ignore_next_up: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self {
            enabled: true,
            state: InteractionState::Idle,
            was_dragging: false,
            ignore_next_up: false,
        }
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    /// Normalized `(min, max)` corners of the box being selected, in view pixels
    pub fn selection_box(&self) -> Option<(Point, Point)> {
        match self.state {
            InteractionState::BoxSelecting {
                anchor,
                width,
                height,
            } => {
                let other = Point::new(anchor.x + width, anchor.y + height);
                Some((
                    Point::new(anchor.x.min(other.x), anchor.y.min(other.y)),
                    Point::new(anchor.x.max(other.x), anchor.y.max(other.y)),
                ))
            }
            _ => None,
        }
    }

    /// Abandons any gesture in progress without selecting anything.
    ///
    /// Returns `true` if a selection box was showing.
    pub fn cancel(&mut self) -> bool {
        let was_selecting = matches!(self.state, InteractionState::BoxSelecting { .. });
        self.state = InteractionState::Idle;
        self.was_dragging = false;
        self.ignore_next_up = false;
        if was_selecting {
            log::debug!("box select cancelled");
        }
        was_selecting
    }

    /// Applies one event to `map`; returns `true` if the map needs a repaint
    pub fn handle(&mut self, map: &mut Map, event: InputEvent) -> bool {
        if !self.enabled {
            return false;
        }

        match event {
            InputEvent::PointerDown {
                position,
                button: MouseButton::Left,
                modifiers,
            } => self.pointer_down(map, position, modifiers),
            InputEvent::PointerDown { .. } => false,
            InputEvent::PointerMove { position } => self.pointer_move(map, position),
            InputEvent::PointerUp {
                position,
                button: MouseButton::Left,
            } => self.pointer_up(map, position),
            InputEvent::PointerUp {
                position,
                button: MouseButton::Right,
            } => {
                if !in_view(map, position) {
                    return false;
                }
                let click = map.view_to_geo(position);
                map.layers_mut().select_point(click, SelectButton::Right)
            }
            InputEvent::PointerUp { .. } => false,
            InputEvent::DoubleClick {
                position,
                modifiers,
            } => self.double_click(map, position, modifiers),
            InputEvent::Scroll { delta, position } => {
                let zoomed = if delta > 0.0 {
                    map.zoom_in(None)
                } else if delta < 0.0 {
                    map.zoom_out(None)
                } else {
                    false
                };
                map.notify_mouse_position(position);
                zoomed
            }
            InputEvent::Resize { size } => {
                map.resize(size);
                true
            }
            InputEvent::PointerLeft | InputEvent::FocusLost => self.cancel(),
            InputEvent::KeyPress { key, .. } => self.key_press(map, key),
        }
    }

    fn pointer_down(&mut self, map: &mut Map, position: Point, modifiers: KeyModifiers) -> bool {
        self.was_dragging = false;
        if modifiers.is_held(map.interaction().select_modifier) {
            self.state = InteractionState::BoxSelecting {
                anchor: position,
                width: 0.0,
                height: 0.0,
            };
            true
        } else {
            self.state = InteractionState::Dragging { last: position };
            false
        }
    }

    fn pointer_move(&mut self, map: &mut Map, position: Point) -> bool {
        map.notify_mouse_position(position);

        match self.state {
            InteractionState::Dragging { last } => {
                let delta = last.subtract(&position);
                self.state = InteractionState::Dragging { last: position };
                if delta.is_zero() {
                    return false;
                }
                self.was_dragging = true;
                map.pan(delta.x, delta.y)
            }
            InteractionState::BoxSelecting { anchor, .. } => {
                self.state = InteractionState::BoxSelecting {
                    anchor,
                    width: position.x - anchor.x,
                    height: position.y - anchor.y,
                };
                true
            }
            InteractionState::Idle => false,
        }
    }

    fn pointer_up(&mut self, map: &mut Map, position: Point) -> bool {
        let state = std::mem::take(&mut self.state);
        let was_dragging = std::mem::take(&mut self.was_dragging);
        let box_visible = matches!(state, InteractionState::BoxSelecting { .. });

        if std::mem::take(&mut self.ignore_next_up) {
            return box_visible;
        }
        if !in_view(map, position) {
            log::debug!("pointer released outside the view, gesture dropped");
            return box_visible;
        }
        if was_dragging {
            return box_visible;
        }

        match state {
            InteractionState::BoxSelecting { anchor, .. } => {
                let corner1 = map.view_to_geo(anchor);
                let corner2 = map.view_to_geo(position);
                map.layers_mut().select_box(corner1, corner2);
                true
            }
            InteractionState::Dragging { .. } | InteractionState::Idle => {
                let click = map.view_to_geo(position);
                map.layers_mut().select_point(click, SelectButton::Left)
            }
        }
    }

    fn double_click(&mut self, map: &mut Map, position: Point, modifiers: KeyModifiers) -> bool {
        self.ignore_next_up = true;
        self.state = InteractionState::Idle;

        let zoomed = if modifiers.is_held(map.interaction().zoom_out_modifier) {
            map.zoom_out(Some(position))
        } else {
            map.zoom_in(Some(position))
        };
        map.notify_mouse_position(position);
        zoomed
    }

    fn key_press(&mut self, map: &mut Map, key: KeyCode) -> bool {
        let step = map.interaction().key_pan_step;
        match key {
            KeyCode::ArrowLeft => map.pan(-step, 0.0),
            KeyCode::ArrowRight => map.pan(step, 0.0),
            KeyCode::ArrowUp => map.pan(0.0, -step),
            KeyCode::ArrowDown => map.pan(0.0, step),
            KeyCode::PageUp => map.zoom_in(None),
            KeyCode::PageDown => map.zoom_out(None),
            KeyCode::Escape => self.cancel(),
        }
    }
}

fn in_view(map: &Map, position: Point) -> bool {
    let size = map.view_size();
    (0.0..=size.x).contains(&position.x) && (0.0..=size.y).contains(&position.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{config::MapConfig, geo::GeoPoint};
    use crate::layers::base::{LayerOptions, PointRecord};
    use crate::rendering::context::Colour;
    use crate::tiles::{
        cache::CachePolicy,
        info::{LevelDescriptor, RootDescriptor, TileSet},
        store::TileStore,
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    // 64 x 64 degree map, levels 1..=3 with ppd 8, 16, 32
    fn test_map() -> Map {
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
        let config = MapConfig::default()
            .with_view_size(400.0, 300.0)
            .with_start_level(2);
        Map::with_tile_store(TileStore::new(tile_set, CachePolicy::Unbounded), &config).unwrap()
    }

    fn down(x: f64, y: f64, modifiers: KeyModifiers) -> InputEvent {
        InputEvent::PointerDown {
            position: Point::new(x, y),
            button: MouseButton::Left,
            modifiers,
        }
    }

    fn moved(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerMove {
            position: Point::new(x, y),
        }
    }

    fn up(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerUp {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    // Records every point-select call on a layer at the centre of the view
    fn watch_clicks(map: &mut Map) -> Rc<RefCell<Vec<Option<u64>>>> {
        let centre = map.view_to_geo(Point::new(200.0, 150.0));
        let layers = map.layers_mut();
        let id = layers.add_mono_point_layer(
            vec![PointRecord::new(centre.lon, centre.lat).with_id(1)],
            LayerOptions::default(),
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        layers.set_point_select_callback(id, 1.0, move |_, _, hit| {
            sink.borrow_mut().push(hit.and_then(|h| h.id));
            false
        });
        seen
    }

    #[test]
    fn test_drag_pans_without_selecting() {
        let mut map = test_map();
        let clicks = watch_clicks(&mut map);
        let mut handler = InputHandler::new();
        let start = map.viewport().offset();

        handler.handle(&mut map, down(200.0, 150.0, KeyModifiers::none()));
        assert!(handler.handle(&mut map, moved(180.0, 140.0)));
        assert_eq!(map.viewport().offset(), start.add(&Point::new(20.0, 10.0)));

        handler.handle(&mut map, up(180.0, 140.0));
        assert!(handler.is_idle());
        assert!(clicks.borrow().is_empty());
    }

    #[test]
    fn test_click_selects() {
        let mut map = test_map();
        let clicks = watch_clicks(&mut map);
        let mut handler = InputHandler::new();

        handler.handle(&mut map, down(200.0, 150.0, KeyModifiers::none()));
        handler.handle(&mut map, up(200.0, 150.0));
        // Far from the point: deselect
        handler.handle(&mut map, down(10.0, 10.0, KeyModifiers::none()));
        handler.handle(&mut map, up(10.0, 10.0));

        assert_eq!(*clicks.borrow(), vec![Some(1), None]);
    }

    #[test]
    fn test_double_click_zooms_and_swallows_release() {
        let mut map = test_map();
        let clicks = watch_clicks(&mut map);
        let mut handler = InputHandler::new();

        handler.handle(&mut map, down(100.0, 100.0, KeyModifiers::none()));
        let focus_geo = map.view_to_geo(Point::new(100.0, 100.0));
        assert!(handler.handle(
            &mut map,
            InputEvent::DoubleClick {
                position: Point::new(100.0, 100.0),
                modifiers: KeyModifiers::none(),
            }
        ));
        handler.handle(&mut map, up(100.0, 100.0));

        assert_eq!(map.level(), 3);
        assert!(clicks.borrow().is_empty());
        let centre = map.view_to_geo(Point::new(200.0, 150.0));
        assert!((centre.lon - focus_geo.lon).abs() < 1e-9);

        handler.handle(
            &mut map,
            InputEvent::DoubleClick {
                position: Point::new(100.0, 100.0),
                modifiers: KeyModifiers::shift(),
            },
        );
        assert_eq!(map.level(), 2);
    }

    #[test]
    fn test_box_select() {
        let mut map = test_map();
        let id = map.layers_mut().add_mono_point_layer(
            vec![
                PointRecord::new(130.0, -30.0).with_id(1),
                PointRecord::new(160.0, -60.0).with_id(2),
            ],
            LayerOptions::default(),
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        map.layers_mut().set_box_select_callback(id, move |_, _, hits| {
            sink.borrow_mut().extend(hits.iter().filter_map(|h| h.id));
            true
        });

        let corner1 = map.geo_to_view(GeoPoint::new(135.0, -25.0));
        let corner2 = map.geo_to_view(GeoPoint::new(125.0, -35.0));
        let mut handler = InputHandler::new();
        let offset = map.viewport().offset();

        handler.handle(&mut map, down(corner1.x, corner1.y, KeyModifiers::shift()));
        handler.handle(&mut map, moved(corner2.x, corner2.y));
        let (min, max) = handler.selection_box().unwrap();
        assert_eq!(min, Point::new(corner2.x, corner1.y));
        assert_eq!(max, Point::new(corner1.x, corner2.y));

        assert!(handler.handle(&mut map, up(corner2.x, corner2.y)));
        assert_eq!(*seen.borrow(), vec![1]);
        // Box selecting never pans
        assert_eq!(map.viewport().offset(), offset);
        assert!(handler.selection_box().is_none());
    }

    #[test]
    fn test_leaving_view_cancels_gesture() {
        let mut map = test_map();
        let clicks = watch_clicks(&mut map);
        let mut handler = InputHandler::new();

        handler.handle(&mut map, down(50.0, 50.0, KeyModifiers::shift()));
        handler.handle(&mut map, moved(90.0, 90.0));
        assert!(handler.handle(&mut map, InputEvent::PointerLeft));
        assert!(handler.is_idle());

        // Release outside the view after a plain press selects nothing
        handler.handle(&mut map, down(200.0, 150.0, KeyModifiers::none()));
        handler.handle(&mut map, up(-5.0, 150.0));
        assert!(clicks.borrow().is_empty());
    }

    #[test]
    fn test_right_click_uses_right_callback() {
        let mut map = test_map();
        let left = watch_clicks(&mut map);
        let id = map.layers().z_order().as_slice()[0];
        let right = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&right);
        map.layers_mut().set_right_point_select_callback(id, 1.0, move |_, _, hit| {
            assert!(hit.is_some());
            *counter.borrow_mut() += 1;
            false
        });

        let mut handler = InputHandler::new();
        handler.handle(
            &mut map,
            InputEvent::PointerUp {
                position: Point::new(200.0, 150.0),
                button: MouseButton::Right,
            },
        );
        assert_eq!(*right.borrow(), 1);
        assert!(left.borrow().is_empty());
    }

    #[test]
    fn test_keyboard() {
        let mut map = test_map();
        let mut handler = InputHandler::new();
        let start = map.viewport().offset();
        let key = |key| InputEvent::KeyPress {
            key,
            modifiers: KeyModifiers::none(),
        };

        assert!(handler.handle(&mut map, key(KeyCode::ArrowRight)));
        assert_eq!(map.viewport().offset().x, start.x + 64.0);

        assert!(handler.handle(&mut map, key(KeyCode::PageUp)));
        assert_eq!(map.level(), 3);
        assert!(handler.handle(&mut map, key(KeyCode::PageDown)));
        assert_eq!(map.level(), 2);

        handler.handle(&mut map, down(10.0, 10.0, KeyModifiers::shift()));
        assert!(handler.handle(&mut map, key(KeyCode::Escape)));
        assert!(handler.is_idle());
    }

    #[test]
    fn test_wheel_zoom_keeps_centre() {
        let mut map = test_map();
        let mut handler = InputHandler::new();
        let centre = map.view_to_geo(Point::new(200.0, 150.0));

        let scroll = |delta| InputEvent::Scroll {
            delta,
            position: Point::new(10.0, 10.0),
        };
        assert!(handler.handle(&mut map, scroll(1.0)));
        assert_eq!(map.level(), 3);
        let after = map.view_to_geo(Point::new(200.0, 150.0));
        assert!((after.lon - centre.lon).abs() < 1e-9);
        assert!((after.lat - centre.lat).abs() < 1e-9);

        // Already at the finest level
        assert!(!handler.handle(&mut map, scroll(1.0)));
        assert!(handler.handle(&mut map, scroll(-1.0)));
        assert_eq!(map.level(), 2);
    }

    #[test]
    fn test_disabled_handler_ignores_input() {
        let mut map = test_map();
        let mut handler = InputHandler::new();
        handler.enabled = false;

        assert!(!handler.handle(&mut map, InputEvent::Scroll {
            delta: 1.0,
            position: Point::new(0.0, 0.0),
        }));
        assert_eq!(map.level(), 2);
    }
}
