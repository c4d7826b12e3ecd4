//! Encoded image bytes in and out of the document.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use thiserror::Error;

use crate::editor::tools::{Bounds, Point, ToolKind};
use crate::editor::{Document, LayerError, LayerId, NewLayer};

/// Widest a dropped image may land.
pub const DROP_MAX_WIDTH: f32 = 300.0;
/// Widest an image chosen from the picker may land.
pub const PICKER_MAX_WIDTH: f32 = 400.0;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("image decode failed: {message}")]
    Decode { message: String },
    #[error("image encode failed: {message}")]
    Encode { message: String },
    #[error("document is busy")]
    Busy,
    #[error(transparent)]
    Layer(#[from] LayerError),
}

pub type AssetResult<T> = Result<T, AssetError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssetPlacement {
    /// Initial image: replaces every layer and fills the canvas.
    Background,
    /// Dropped onto the canvas at `at`.
    Drop { at: Point },
    /// Chosen from the host's asset picker; lands centered.
    Picker,
}

pub fn decode_image(bytes: &[u8]) -> AssetResult<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|err| AssetError::Decode {
            message: err.to_string(),
        })
}

pub fn encode_png(image: &RgbaImage) -> AssetResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|err| AssetError::Encode {
            message: err.to_string(),
        })?;
    Ok(bytes)
}

/// Caps the width at `max_width`, keeping the aspect ratio.
fn fit_width(width: f32, height: f32, max_width: f32) -> (f32, f32) {
    if width > max_width {
        (max_width, height * max_width / width)
    } else {
        (width, height)
    }
}

impl Document {
    pub fn insert_image(
        &mut self,
        bytes: &[u8],
        placement: AssetPlacement,
    ) -> AssetResult<LayerId> {
        if self.is_busy() {
            return Err(AssetError::Busy);
        }
        let mut document = self.busy_guard();
        let pixels = decode_image(bytes).map_err(|err| {
            tracing::warn!(%err, ?placement, "dropping undecodable image");
            err
        })?;

        let (canvas_width, canvas_height) = document.canvas_size();
        let (canvas_width, canvas_height) = (canvas_width as f32, canvas_height as f32);
        let (natural_width, natural_height) = (pixels.width() as f32, pixels.height() as f32);

        let frame = match placement {
            AssetPlacement::Background => Bounds::new(0.0, 0.0, canvas_width, canvas_height),
            AssetPlacement::Drop { at } => {
                let (width, height) = fit_width(natural_width, natural_height, DROP_MAX_WIDTH);
                Bounds::new(at.x - width / 2.0, at.y - height / 2.0, width, height)
            }
            AssetPlacement::Picker => {
                let (width, height) = fit_width(natural_width, natural_height, PICKER_MAX_WIDTH);
                Bounds::new(
                    (canvas_width - width) / 2.0,
                    (canvas_height - height) / 2.0,
                    width,
                    height,
                )
            }
        };

        if placement == AssetPlacement::Background {
            document.layers_mut().clear();
        }
        let id = document.layers_mut().add_layer(NewLayer::image(pixels, frame));
        match placement {
            AssetPlacement::Background => {}
            AssetPlacement::Drop { .. } => document.layers_mut().select(Some(id))?,
            AssetPlacement::Picker => {
                document.layers_mut().select(Some(id))?;
                document.set_tool(ToolKind::Select);
            }
        }
        tracing::info!(%id, ?placement, ?frame, "inserted image");
        document.commit();
        Ok(id)
    }
}
