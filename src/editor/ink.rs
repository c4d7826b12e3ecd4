use std::sync::Arc;

use image::RgbaImage;

use super::tools::{Color, Point};
use crate::render::stroke::{paint_polyline, LineStyle};
use crate::render::RenderResult;

/// Document-sized freehand layer that always draws above every layer.
#[derive(Debug, Clone, PartialEq)]
pub struct InkBuffer {
    pixels: Arc<RgbaImage>,
}

impl InkBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: Arc::new(RgbaImage::new(width, height)),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        Arc::make_mut(&mut self.pixels)
    }

    /// Shared handle for history snapshots.
    pub fn share(&self) -> Arc<RgbaImage> {
        Arc::clone(&self.pixels)
    }

    pub fn restore(&mut self, pixels: Arc<RgbaImage>) {
        self.pixels = pixels;
    }

    pub fn stroke(&mut self, points: &[Point], color: Color, width: f32) -> RenderResult<()> {
        paint_polyline(self.image_mut(), points, LineStyle::solid(color, width))
    }

    pub fn erase(&mut self, points: &[Point], width: f32) -> RenderResult<()> {
        paint_polyline(self.image_mut(), points, LineStyle::eraser(width))
    }

    pub fn clear(&mut self) {
        let (width, height) = self.pixels.dimensions();
        self.pixels = Arc::new(RgbaImage::new(width, height));
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|pixel| pixel.0[3] == 0)
    }
}
