//! Rasterizes a [`Document`] into straight-alpha RGBA.
//!
//! Layers draw in list order, then the ink buffer. The interactive scene adds
//! the in-progress stroke preview and selection chrome on top; the composite
//! used for export and isolation leaves both out.

mod error;
mod glyphs;
pub(crate) mod raster;
pub(crate) mod stroke;

pub use error::{RenderError, RenderResult};
pub use glyphs::{
    FontWeight, FontdueGlyphs, GlyphBitmap, GlyphError, GlyphProvider, HeuristicGlyphs,
};

use image::{Rgba, RgbaImage};
use serde::Deserialize;
use tiny_skia::{
    FillRule, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};

use crate::editor::layers::{ImageLayer, Layer, LayerKind, ShapeKind, ShapeLayer, TextLayer};
use crate::editor::tools::{layout_text, Bounds, Color, Point};
use crate::editor::Document;
use raster::{
    coverage_to_pixmap, new_pixmap, pixel_extent, pixmap_to_rgba_image, rgba_image_to_pixmap,
};
use stroke::{stroke_polyline, LineStyle};

const ERASER_PREVIEW: Color = Color::new(255, 255, 255, 128);
const LASSO_PREVIEW_WIDTH: f32 = 2.0;
const DELETE_BUTTON_FILL: Color = Color::rgb(255, 59, 48);
const DELETE_BUTTON_RADIUS: f32 = 8.0;

/// Center of the delete button drawn beside a selected text layer.
pub fn delete_button_center(bounds: Bounds) -> Point {
    Point::new(bounds.right() + 14.0, bounds.y - 4.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChromeStyle {
    pub accent: Color,
    pub line_width: f32,
    /// Edge length of the square corner handles.
    pub handle_size: f32,
    /// Distance from a corner within which a press grabs the handle.
    pub handle_tolerance: f32,
}

impl Default for ChromeStyle {
    fn default() -> Self {
        Self {
            accent: Color::rgb(0, 113, 227),
            line_width: 2.0,
            handle_size: 8.0,
            handle_tolerance: 10.0,
        }
    }
}

/// Path currently being drawn, shown until pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokePreview<'a> {
    Brush {
        points: &'a [Point],
        color: Color,
        width: f32,
    },
    Eraser {
        points: &'a [Point],
        width: f32,
    },
    Lasso {
        points: &'a [Point],
        color: Color,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Overlay<'a> {
    pub preview: Option<StrokePreview<'a>>,
    pub chrome: ChromeStyle,
}

/// Interactive view: composite plus stroke preview and selection chrome.
pub fn render_scene(
    document: &Document,
    overlay: &Overlay<'_>,
    glyphs: &dyn GlyphProvider,
) -> RenderResult<RgbaImage> {
    let mut pixmap = composite_pixmap(document, glyphs)?;

    if let Some(preview) = overlay.preview {
        draw_preview(&mut pixmap, preview);
    }
    if let Some(layer) = document.layers().selected_layer() {
        let bounds = layer.bounds(glyphs);
        // Text layers are not resizable; they get a delete button instead.
        let is_text = matches!(layer.kind, LayerKind::Text(_));
        draw_selection_chrome(&mut pixmap, bounds, &overlay.chrome, !is_text);
        if is_text {
            draw_delete_button(&mut pixmap, delete_button_center(bounds));
        }
    }

    pixmap_to_rgba_image(&pixmap)
}

/// Export surface: layers and ink only.
pub fn render_composite(
    document: &Document,
    glyphs: &dyn GlyphProvider,
) -> RenderResult<RgbaImage> {
    let pixmap = composite_pixmap(document, glyphs)?;
    pixmap_to_rgba_image(&pixmap)
}

fn composite_pixmap(document: &Document, glyphs: &dyn GlyphProvider) -> RenderResult<Pixmap> {
    let (width, height) = document.canvas_size();
    let mut pixmap = new_pixmap(width, height)?;

    for layer in document.layers().layers() {
        match &layer.kind {
            LayerKind::Image(image) => draw_image_layer(&mut pixmap, layer, image)?,
            LayerKind::Text(text) => draw_text_layer(&mut pixmap, layer, text, glyphs),
            LayerKind::Shape(shape) => draw_shape_layer(&mut pixmap, layer, shape),
        }
    }

    let ink = rgba_image_to_pixmap(document.ink())?;
    pixmap.draw_pixmap(
        0,
        0,
        ink.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(pixmap)
}

fn draw_image_layer(target: &mut Pixmap, layer: &Layer, image: &ImageLayer) -> RenderResult<()> {
    let frame_width = pixel_extent(layer.width);
    let frame_height = pixel_extent(layer.height);
    let mut framed = new_pixmap(frame_width, frame_height)?;

    let source = rgba_image_to_pixmap(&image.pixels)?;
    framed.draw_pixmap(
        0,
        0,
        source.as_ref(),
        &PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        },
        stretch(source.width(), source.height(), frame_width, frame_height),
        None,
    );

    let mask = rgba_image_to_pixmap(&image.mask)?;
    framed.draw_pixmap(
        0,
        0,
        mask.as_ref(),
        &PixmapPaint {
            blend_mode: tiny_skia::BlendMode::DestinationOut,
            quality: FilterQuality::Nearest,
            ..PixmapPaint::default()
        },
        stretch(mask.width(), mask.height(), frame_width, frame_height),
        None,
    );

    target.draw_pixmap(
        0,
        0,
        framed.as_ref(),
        &PixmapPaint::default(),
        Transform::from_translate(layer.x, layer.y),
        None,
    );
    Ok(())
}

fn stretch(from_width: u32, from_height: u32, to_width: u32, to_height: u32) -> Transform {
    if from_width == 0 || from_height == 0 {
        return Transform::identity();
    }
    Transform::from_scale(
        to_width as f32 / from_width as f32,
        to_height as f32 / from_height as f32,
    )
}

fn draw_text_layer(
    target: &mut Pixmap,
    layer: &Layer,
    text: &TextLayer,
    glyphs: &dyn GlyphProvider,
) {
    let layout = layout_text(&text.content, text.font_size, text.mention.sigil, glyphs);
    for run in &layout.runs {
        let color = if run.mention {
            text.mention.accent
        } else {
            text.color
        };
        let origin = Point::new(layer.x + run.x, layer.y);
        for glyph in glyphs.rasterize(&run.word, text.font_size, run.weight()) {
            let Some(bitmap) =
                coverage_to_pixmap(glyph.width, glyph.height, &glyph.coverage, Rgba(color.rgba()))
            else {
                continue;
            };
            target.draw_pixmap(
                (origin.x + glyph.left).round() as i32,
                (origin.y + glyph.top).round() as i32,
                bitmap.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
    }
}

fn draw_shape_layer(target: &mut Pixmap, layer: &Layer, shape: &ShapeLayer) {
    let Some(rect) = Rect::from_xywh(layer.x, layer.y, layer.width, layer.height) else {
        return;
    };
    let path = match shape.shape {
        ShapeKind::Rectangle => Some(PathBuilder::from_rect(rect)),
        ShapeKind::Ellipse => PathBuilder::from_oval(rect),
    };
    let Some(path) = path else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(shape.fill.to_skia());
    paint.anti_alias = true;
    target.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}

fn draw_preview(target: &mut Pixmap, preview: StrokePreview<'_>) {
    match preview {
        StrokePreview::Brush {
            points,
            color,
            width,
        } => stroke_polyline(target, points, LineStyle::solid(color, width)),
        StrokePreview::Eraser { points, width } => {
            stroke_polyline(target, points, LineStyle::solid(ERASER_PREVIEW, width));
        }
        StrokePreview::Lasso { points, color } => {
            let style = LineStyle {
                dashed: true,
                ..LineStyle::solid(color, LASSO_PREVIEW_WIDTH)
            };
            stroke_polyline(target, points, style);
        }
    }
}

fn draw_selection_chrome(
    target: &mut Pixmap,
    bounds: Bounds,
    chrome: &ChromeStyle,
    handles: bool,
) {
    let mut outline = Paint::default();
    outline.set_color(chrome.accent.to_skia());
    outline.anti_alias = true;
    let stroke = Stroke {
        width: chrome.line_width,
        ..Stroke::default()
    };

    if let Some(rect) = Rect::from_xywh(bounds.x, bounds.y, bounds.width, bounds.height) {
        let path = PathBuilder::from_rect(rect);
        target.stroke_path(&path, &outline, &stroke, Transform::identity(), None);
    }
    if !handles {
        return;
    }

    let mut fill = Paint::default();
    fill.set_color(Color::WHITE.to_skia());
    let half = chrome.handle_size / 2.0;
    let handle_stroke = Stroke {
        width: 1.0,
        ..Stroke::default()
    };
    for corner in bounds.corners() {
        let size = chrome.handle_size;
        let Some(rect) = Rect::from_xywh(corner.x - half, corner.y - half, size, size) else {
            continue;
        };
        let path = PathBuilder::from_rect(rect);
        target.fill_path(&path, &fill, FillRule::Winding, Transform::identity(), None);
        target.stroke_path(&path, &outline, &handle_stroke, Transform::identity(), None);
    }
}

fn draw_delete_button(target: &mut Pixmap, center: Point) {
    let Some(disc) = PathBuilder::from_circle(center.x, center.y, DELETE_BUTTON_RADIUS) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(DELETE_BUTTON_FILL.to_skia());
    paint.anti_alias = true;
    target.fill_path(&disc, &paint, FillRule::Winding, Transform::identity(), None);

    let arm = DELETE_BUTTON_RADIUS / 2.5;
    for (from, to) in [
        (Point::new(center.x - arm, center.y - arm), Point::new(center.x + arm, center.y + arm)),
        (Point::new(center.x - arm, center.y + arm), Point::new(center.x + arm, center.y - arm)),
    ] {
        stroke_polyline(target, &[from, to], LineStyle::solid(Color::WHITE, 1.5));
    }
}
