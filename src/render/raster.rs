use image::{Rgba, RgbaImage};
use tiny_skia::{IntSize, Pixmap, PremultipliedColorU8};

use super::error::{RenderError, RenderResult};
use crate::geometry::Bounds;

pub(crate) fn new_pixmap(width: u32, height: u32) -> RenderResult<Pixmap> {
    Pixmap::new(width, height).ok_or(RenderError::SurfaceAllocation { width, height })
}

/// Straight-alpha RGBA to a premultiplied pixmap.
pub(crate) fn rgba_image_to_pixmap(image: &RgbaImage) -> RenderResult<Pixmap> {
    let (width, height) = image.dimensions();
    let size =
        IntSize::from_wh(width, height).ok_or(RenderError::SurfaceAllocation { width, height })?;

    let mut data = Vec::with_capacity(image.as_raw().len());
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        match a {
            0 => data.extend_from_slice(&[0, 0, 0, 0]),
            255 => data.extend_from_slice(&[r, g, b, 255]),
            _ => {
                let alpha = u16::from(a);
                let premultiply = |channel: u8| ((u16::from(channel) * alpha + 127) / 255) as u8;
                data.extend_from_slice(&[premultiply(r), premultiply(g), premultiply(b), a]);
            }
        }
    }

    Pixmap::from_vec(data, size).ok_or(RenderError::SurfaceAllocation { width, height })
}

pub(crate) fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RenderResult<RgbaImage> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        data.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    RgbaImage::from_raw(width, height, data).ok_or(RenderError::SurfaceAllocation { width, height })
}

/// Builds a premultiplied pixmap of `color` whose alpha follows `coverage`.
pub(crate) fn coverage_to_pixmap(
    width: u32,
    height: u32,
    coverage: &[u8],
    color: Rgba<u8>,
) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)?;
    let [r, g, b, a] = color.0;
    for (pixel, &cover) in pixmap.pixels_mut().iter_mut().zip(coverage) {
        let alpha = ((u16::from(cover) * u16::from(a) + 127) / 255) as u8;
        let premultiply = |channel: u8| ((u16::from(channel) * u16::from(alpha) + 127) / 255) as u8;
        if let Some(value) =
            PremultipliedColorU8::from_rgba(premultiply(r), premultiply(g), premultiply(b), alpha)
        {
            *pixel = value;
        }
    }
    Some(pixmap)
}

/// Clamps a floating region to integer pixel bounds inside the source.
pub(crate) fn bounded_region(
    region: Bounds,
    source_width: u32,
    source_height: u32,
) -> Option<(u32, u32, u32, u32)> {
    if region.width <= 0.0 || region.height <= 0.0 || source_width == 0 || source_height == 0 {
        return None;
    }

    let left = region.x.floor().max(0.0) as u32;
    let top = region.y.floor().max(0.0) as u32;
    if left >= source_width || top >= source_height {
        return None;
    }
    let right = (region.right().round().max(0.0) as u32).min(source_width);
    let bottom = (region.bottom().round().max(0.0) as u32).min(source_height);
    if right <= left || bottom <= top {
        return None;
    }

    Some((left, top, right - left, bottom - top))
}

/// Pixel size used when allocating a buffer for a floating extent.
pub(crate) fn pixel_extent(value: f32) -> u32 {
    if value.is_finite() {
        value.round().max(1.0) as u32
    } else {
        1
    }
}
