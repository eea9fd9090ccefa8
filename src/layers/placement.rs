//! Anchor rules for view-relative images and text labels.

use crate::core::constants::DEFAULT_TEXT_OFFSET;
use crate::core::geo::Point;
use crate::rendering::context::Colour;
use std::str::FromStr;

/// Where a view-relative image sits in the view
///
/// The record's `(x, y)` is a margin in pixels measured from the chosen edge
/// or centre line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImagePlacement {
    Centre,
    North,
    South,
    East,
    West,
    NorthEast,
    #[default]
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ImagePlacement {
    /// Top-left corner of an image of `image_size` placed in a view of `view_size`
    pub fn origin(&self, margin: Point, image_size: Point, view_size: Point) -> Point {
        let (x, y) = (margin.x, margin.y);
        let centre_x = (view_size.x - image_size.x) / 2.0;
        let centre_y = (view_size.y - image_size.y) / 2.0;
        let right = view_size.x - image_size.x;
        let bottom = view_size.y - image_size.y;

        let (ix, iy) = match self {
            ImagePlacement::Centre => (centre_x + x, centre_y + y),
            ImagePlacement::North => (centre_x + x, y),
            ImagePlacement::South => (centre_x + x, bottom - y),
            ImagePlacement::East => (right - x, centre_y - y),
            ImagePlacement::West => (x, centre_y - y),
            ImagePlacement::NorthEast => (right - x, y),
            ImagePlacement::NorthWest => (x, y),
            ImagePlacement::SouthEast => (right - x, bottom - y),
            ImagePlacement::SouthWest => (x, bottom - y),
        };
        Point::new(ix, iy)
    }
}

impl FromStr for ImagePlacement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "cc" => Ok(ImagePlacement::Centre),
            "n" | "cn" => Ok(ImagePlacement::North),
            "s" | "cs" => Ok(ImagePlacement::South),
            "e" | "ce" => Ok(ImagePlacement::East),
            "w" | "cw" => Ok(ImagePlacement::West),
            "ne" => Ok(ImagePlacement::NorthEast),
            "nw" => Ok(ImagePlacement::NorthWest),
            "se" => Ok(ImagePlacement::SouthEast),
            "sw" => Ok(ImagePlacement::SouthWest),
            other => Err(format!("unknown image placement '{}'", other)),
        }
    }
}

/// Position of a text label relative to its anchor point
///
/// Parsed from a horizontal letter (`l`, `c`, `r`) and a vertical letter
/// (`t`, `m`, `b`) in either order, so `"lt"` and `"tl"` are the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextPlacement {
    LeftTop,
    CentreTop,
    RightTop,
    LeftMiddle,
    #[default]
    CentreMiddle,
    RightMiddle,
    LeftBottom,
    CentreBottom,
    RightBottom,
}

impl TextPlacement {
    /// Top-left corner for text of `extent` anchored at `anchor`
    pub fn origin(&self, anchor: Point, extent: Point, offset: f64) -> Point {
        let (w, h) = (extent.x, extent.y);
        let left = anchor.x + offset;
        let centre = anchor.x - w / 2.0;
        let right = anchor.x - w - offset;
        let top = anchor.y + offset;
        let middle = anchor.y - h / 2.0;
        let bottom = anchor.y - h - offset;

        let (x, y) = match self {
            TextPlacement::LeftTop => (left, top),
            TextPlacement::CentreTop => (centre, top),
            TextPlacement::RightTop => (right, top),
            TextPlacement::LeftMiddle => (left, middle),
            TextPlacement::CentreMiddle => (centre, middle),
            TextPlacement::RightMiddle => (right, middle),
            TextPlacement::LeftBottom => (left, bottom),
            TextPlacement::CentreBottom => (centre, bottom),
            TextPlacement::RightBottom => (right, bottom),
        };
        Point::new(x, y)
    }
}

impl FromStr for TextPlacement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        let placement = match code.as_str() {
            "lt" | "tl" => TextPlacement::LeftTop,
            "ct" | "tc" => TextPlacement::CentreTop,
            "rt" | "tr" => TextPlacement::RightTop,
            "lm" | "ml" => TextPlacement::LeftMiddle,
            "cm" | "mc" => TextPlacement::CentreMiddle,
            "rm" | "mr" => TextPlacement::RightMiddle,
            "lb" | "bl" => TextPlacement::LeftBottom,
            "cb" | "bc" => TextPlacement::CentreBottom,
            "rb" | "br" => TextPlacement::RightBottom,
            _ => return Err(format!("unknown text placement '{}'", s)),
        };
        Ok(placement)
    }
}

/// Text styling for a text layer or a single label
///
/// Unset fields fall back first to the layer's attributes, then to the
/// defaults: centred on the anchor, 4 px offset, no rotation, black.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextAttributes {
    pub placement: Option<TextPlacement>,
    pub offset: Option<f64>,
    /// Reserved; labels are always drawn horizontally
    pub angle: Option<f64>,
    pub colour: Option<Colour>,
}

impl TextAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placement(mut self, placement: TextPlacement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = Some(colour);
        self
    }

    /// These attributes with unset fields taken from `base`
    pub fn merged_over(&self, base: &TextAttributes) -> TextAttributes {
        TextAttributes {
            placement: self.placement.or(base.placement),
            offset: self.offset.or(base.offset),
            angle: self.angle.or(base.angle),
            colour: self.colour.or(base.colour),
        }
    }

    pub fn placement(&self) -> TextPlacement {
        self.placement.unwrap_or_default()
    }

    pub fn offset(&self) -> f64 {
        self.offset.unwrap_or(DEFAULT_TEXT_OFFSET)
    }

    pub fn angle(&self) -> f64 {
        self.angle.unwrap_or(0.0)
    }

    pub fn colour(&self) -> Colour {
        self.colour.unwrap_or_else(Colour::black)
    }
}
