mod pen;
mod text;

pub use crate::geometry::{Bounds, Color, Point};
pub use pen::StrokePath;
pub use text::{layout_text, MentionStyle, TextLayout, WordRun};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Select,
    Brush,
    Eraser,
    Text,
    Rectangle,
    Ellipse,
    MagicWand,
    Lasso,
}

impl ToolKind {
    /// One-shot tools that create a layer on pointer-down.
    pub const fn places_layer(self) -> bool {
        matches!(self, Self::Text | Self::Rectangle | Self::Ellipse)
    }

    /// Tool that is active once this tool has placed its layer.
    pub const fn after_placement(self) -> Self {
        if self.places_layer() {
            Self::Select
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BrushOptions {
    pub color: Color,
    pub size: u8,
}

impl Default for BrushOptions {
    fn default() -> Self {
        Self {
            color: Color::rgb(255, 0, 0),
            size: 10,
        }
    }
}

impl BrushOptions {
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_size(&mut self, size: u8) {
        self.size = clamp_u8_range(size, BRUSH_SIZE_MIN, BRUSH_SIZE_MAX);
    }

    pub fn width(&self) -> f32 {
        f32::from(clamp_u8_range(self.size, BRUSH_SIZE_MIN, BRUSH_SIZE_MAX))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    pub font_size: f32,
    pub mention: MentionStyle,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            font_size: 24.0,
            mention: MentionStyle::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShapeOptions {
    /// Edge length of a freshly placed shape.
    pub size: f32,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self { size: 100.0 }
    }
}

const BRUSH_SIZE_MIN: u8 = 1;
const BRUSH_SIZE_MAX: u8 = 50;

const fn clamp_u8_range(value: u8, min: u8, max: u8) -> u8 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
