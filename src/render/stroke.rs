use image::RgbaImage;
use tiny_skia::{
    BlendMode, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, StrokeDash,
    Transform,
};

use super::error::RenderResult;
use super::raster::{pixmap_to_rgba_image, rgba_image_to_pixmap};
use crate::geometry::{Color, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LineStyle {
    pub color: Color,
    pub width: f32,
    pub blend: BlendMode,
    pub dashed: bool,
}

impl LineStyle {
    pub const fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            blend: BlendMode::SourceOver,
            dashed: false,
        }
    }

    pub const fn eraser(width: f32) -> Self {
        Self {
            color: Color::BLACK,
            width,
            blend: BlendMode::DestinationOut,
            dashed: false,
        }
    }
}

/// Strokes a round-capped polyline. A single point becomes a dot of the
/// stroke width.
pub(crate) fn stroke_polyline(pixmap: &mut Pixmap, points: &[Point], style: LineStyle) {
    let Some(first) = points.first() else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(style.color.to_skia());
    paint.anti_alias = true;
    paint.blend_mode = style.blend;

    if points.len() == 1 {
        let radius = (style.width / 2.0).max(0.5);
        if let Some(dot) = PathBuilder::from_circle(first.x, first.y, radius) {
            pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
        }
        return;
    }

    let mut builder = PathBuilder::new();
    builder.move_to(first.x, first.y);
    for point in &points[1..] {
        builder.line_to(point.x, point.y);
    }
    let Some(path) = builder.finish() else {
        return;
    };

    let stroke = Stroke {
        width: style.width.max(0.5),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        dash: if style.dashed {
            StrokeDash::new(vec![5.0, 5.0], 0.0)
        } else {
            None
        },
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Strokes into a straight-alpha buffer in place.
pub(crate) fn paint_polyline(
    target: &mut RgbaImage,
    points: &[Point],
    style: LineStyle,
) -> RenderResult<()> {
    if points.is_empty() {
        return Ok(());
    }
    let mut pixmap = rgba_image_to_pixmap(target)?;
    stroke_polyline(&mut pixmap, points, style);
    *target = pixmap_to_rgba_image(&pixmap)?;
    Ok(())
}
