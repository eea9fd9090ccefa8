use crate::{core::geo::Point, tiles::ImageHandle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An RGBA colour, written as `#rrggbb`, `#rrggbbaa` or a basic colour name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn red() -> Self {
        Self::rgb(255, 0, 0)
    }

    pub const fn blue() -> Self {
        Self::rgb(0, 0, 255)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::black()
    }
}

impl FromStr for Colour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            let channel = |i: usize| {
                hex.get(i..i + 2)
                    .and_then(|c| u8::from_str_radix(c, 16).ok())
                    .ok_or_else(|| format!("invalid colour '{}'", s))
            };
            return match hex.len() {
                6 => Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
                8 => Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
                _ => Err(format!("invalid colour '{}'", s)),
            };
        }

        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(Self::black()),
            "white" => Ok(Self::white()),
            "red" => Ok(Self::red()),
            "green" => Ok(Self::rgb(0, 255, 0)),
            "blue" => Ok(Self::blue()),
            "yellow" => Ok(Self::rgb(255, 255, 0)),
            "grey" | "gray" => Ok(Self::rgb(128, 128, 128)),
            _ => Err(format!("unknown colour '{}'", s)),
        }
    }
}

impl TryFrom<String> for Colour {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Colour> for String {
    fn from(colour: Colour) -> Self {
        colour.to_string()
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Stroke and optional fill used for circles, polygons and rectangles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub stroke: Colour,
    pub stroke_width: f32,
    pub fill: Option<Colour>,
}

impl ShapeStyle {
    /// Outline and fill in the same colour
    pub fn solid(colour: Colour) -> Self {
        Self {
            stroke: colour,
            stroke_width: 1.0,
            fill: Some(colour),
        }
    }

    /// Outline only
    pub fn outline(colour: Colour, width: f32) -> Self {
        Self {
            stroke: colour,
            stroke_width: width,
            fill: None,
        }
    }
}

/// A drawing surface the renderer paints onto
///
/// Coordinates are view pixels with the origin at the top-left of the view.
pub trait Canvas {
    /// Size of the surface in pixels
    fn size(&self) -> Point;

    /// Fills the whole surface
    fn clear(&mut self, colour: Colour);

    /// Draws an image with its top-left corner at `origin`
    fn draw_image(&mut self, image: &ImageHandle, origin: Point);

    fn draw_circle(&mut self, centre: Point, radius: f32, style: &ShapeStyle);

    /// Draws a polyline through `points`; a fill closes it implicitly
    fn draw_polygon(&mut self, points: &[Point], style: &ShapeStyle);

    /// Draws text with its top-left corner at `origin`
    fn draw_text(&mut self, text: &str, origin: Point, colour: Colour);

    /// Width and height the text would occupy
    fn text_extent(&self, text: &str) -> Point;

    fn draw_rect(&mut self, min: Point, max: Point, style: &ShapeStyle);
}

/// Commands that can be issued to the render context
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        colour: Colour,
    },
    Image {
        key: String,
        origin: Point,
    },
    Circle {
        centre: Point,
        radius: f32,
        style: ShapeStyle,
    },
    Polygon {
        points: Vec<Point>,
        style: ShapeStyle,
    },
    Text {
        text: String,
        origin: Point,
        colour: Colour,
    },
    Rect {
        min: Point,
        max: Point,
        style: ShapeStyle,
    },
}

/// Headless canvas that records every drawing primitive in a queue
///
/// Text uses fixed metrics of [`RenderContext::CHAR_WIDTH`] by
/// [`RenderContext::LINE_HEIGHT`] pixels per character.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    /// Drawing primitives queue, in paint order
    pub drawing_queue: Vec<DrawCommand>,
}

impl RenderContext {
    pub const CHAR_WIDTH: f64 = 7.0;
    pub const LINE_HEIGHT: f64 = 13.0;

    /// Create a new render context
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
        }
    }

    /// Get the drawing queue
    pub fn get_drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    /// Clear the drawing queue
    pub fn clear_queue(&mut self) {
        self.drawing_queue.clear();
    }

    /// Keys of all images drawn, in paint order
    pub fn image_keys(&self) -> Vec<&str> {
        self.drawing_queue
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Image { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RenderContext {
    fn size(&self) -> Point {
        Point::new(f64::from(self.width), f64::from(self.height))
    }

    fn clear(&mut self, colour: Colour) {
        self.drawing_queue.push(DrawCommand::Clear { colour });
    }

    fn draw_image(&mut self, image: &ImageHandle, origin: Point) {
        self.drawing_queue.push(DrawCommand::Image {
            key: image.key().to_string(),
            origin,
        });
    }

    fn draw_circle(&mut self, centre: Point, radius: f32, style: &ShapeStyle) {
        self.drawing_queue.push(DrawCommand::Circle {
            centre,
            radius,
            style: *style,
        });
    }

    fn draw_polygon(&mut self, points: &[Point], style: &ShapeStyle) {
        self.drawing_queue.push(DrawCommand::Polygon {
            points: points.to_vec(),
            style: *style,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Point, colour: Colour) {
        self.drawing_queue.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            colour,
        });
    }

    fn text_extent(&self, text: &str) -> Point {
        Point::new(
            text.chars().count() as f64 * Self::CHAR_WIDTH,
            Self::LINE_HEIGHT,
        )
    }

    fn draw_rect(&mut self, min: Point, max: Point, style: &ShapeStyle) {
        self.drawing_queue.push(DrawCommand::Rect {
            min,
            max,
            style: *style,
        });
    }
}
