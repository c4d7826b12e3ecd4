//! Background removal through an external matting service.
//!
//! Work is split so the service call can run off the document's thread:
//! `begin_*` snapshots the input and marks the document busy,
//! [`MattingJob::run`] talks to the service, and
//! [`Document::complete_matting`] applies the result as one commit.

use std::sync::Arc;

use image::imageops;
use thiserror::Error;

use crate::assets::{decode_image, encode_png, AssetError};
use crate::editor::layers::empty_mask;
use crate::editor::tools::Bounds;
use crate::editor::{Document, LayerError, LayerId, LayerPatch, NewLayer};
use crate::render::raster::bounded_region;
use crate::render::{render_composite, GlyphProvider, RenderError};

/// Lasso boxes smaller than this on either side are ignored.
pub const MIN_ISOLATION_EDGE: f32 = 5.0;

/// Progress callback: stage key, completed units, total units.
pub type ProgressFn<'a> = &'a (dyn Fn(&str, u64, u64) + Sync);

#[derive(Debug, Error)]
pub enum MattingError {
    #[error("matting service unavailable: {message}")]
    Unavailable { message: String },
    #[error("background removal failed: {message}")]
    Failed { message: String },
}

pub type MattingResult<T> = Result<T, MattingError>;

pub struct MattingRequest<'a> {
    /// PNG-encoded input.
    pub image_png: &'a [u8],
    pub progress: Option<ProgressFn<'a>>,
}

/// Encoded image in, encoded image with a transparent background out.
pub trait MattingService {
    fn remove_background(&self, request: MattingRequest<'_>) -> MattingResult<Vec<u8>>;
}

#[derive(Debug, Error)]
pub enum IsolationError {
    #[error("another matting request is still running")]
    Busy,
    #[error("{0} is not an image layer")]
    NotImage(LayerId),
    #[error(transparent)]
    Layer(#[from] LayerError),
    #[error("failed to render composite: {0}")]
    Render(#[from] RenderError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Matting(#[from] MattingError),
}

pub type IsolationResult<T> = Result<T, IsolationError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MattingTarget {
    /// Cut-out becomes a new layer covering this box.
    Isolation(Bounds),
    /// Cut-out replaces this layer's pixels.
    BackgroundRemoval(LayerId),
}

/// Pending service call. Owns its input so it can move to a worker thread.
#[derive(Debug, Clone)]
pub struct MattingJob {
    target: MattingTarget,
    image_png: Vec<u8>,
}

impl MattingJob {
    pub fn target(&self) -> MattingTarget {
        self.target
    }

    pub fn image_png(&self) -> &[u8] {
        &self.image_png
    }

    pub fn run(
        &self,
        service: &dyn MattingService,
        progress: Option<ProgressFn<'_>>,
    ) -> MattingResult<Vec<u8>> {
        tracing::info!(job = ?self.target, bytes = self.image_png.len(), "matting started");
        service.remove_background(MattingRequest {
            image_png: &self.image_png,
            progress,
        })
    }
}

impl Document {
    /// Crops the flattened composite to `region` and prepares a matting job.
    /// Returns `Ok(None)` for boxes below [`MIN_ISOLATION_EDGE`].
    pub fn begin_isolation(
        &mut self,
        region: Bounds,
        glyphs: &dyn GlyphProvider,
    ) -> IsolationResult<Option<MattingJob>> {
        if self.is_busy() {
            return Err(IsolationError::Busy);
        }
        if region.width < MIN_ISOLATION_EDGE || region.height < MIN_ISOLATION_EDGE {
            tracing::debug!(?region, "lasso box too small; ignoring");
            return Ok(None);
        }

        let composite = render_composite(self, glyphs)?;
        let Some((left, top, width, height)) =
            bounded_region(region, composite.width(), composite.height())
        else {
            tracing::debug!(?region, "lasso box outside canvas; ignoring");
            return Ok(None);
        };
        let crop = imageops::crop_imm(&composite, left, top, width, height).to_image();
        let image_png = encode_png(&crop)?;
        // The cutout lands where the crop came from, not on the raw lasso box.
        let placed = Bounds::new(left as f32, top as f32, width as f32, height as f32);

        self.set_busy(true);
        Ok(Some(MattingJob {
            target: MattingTarget::Isolation(placed),
            image_png,
        }))
    }

    pub fn begin_background_removal(&mut self, id: LayerId) -> IsolationResult<MattingJob> {
        if self.is_busy() {
            return Err(IsolationError::Busy);
        }
        let layer = self.layers().get(id).ok_or(LayerError::NotFound(id))?;
        let image = layer.as_image().ok_or(IsolationError::NotImage(id))?;
        let image_png = encode_png(&image.pixels)?;

        self.set_busy(true);
        Ok(MattingJob {
            target: MattingTarget::BackgroundRemoval(id),
            image_png,
        })
    }

    /// Applies a finished job. The busy flag is cleared whatever the outcome;
    /// on failure the scene is left as it was.
    pub fn complete_matting(
        &mut self,
        job: MattingJob,
        result: MattingResult<Vec<u8>>,
    ) -> IsolationResult<LayerId> {
        self.set_busy(false);
        let applied = result
            .map_err(IsolationError::from)
            .and_then(|bytes| Ok(decode_image(&bytes)?))
            .and_then(|pixels| self.apply_cutout(job.target, pixels));

        match &applied {
            Ok(id) => tracing::info!(%id, job = ?job.target, "matting applied"),
            Err(err) => tracing::warn!(%err, job = ?job.target, "matting failed"),
        }
        applied
    }

    fn apply_cutout(
        &mut self,
        target: MattingTarget,
        pixels: image::RgbaImage,
    ) -> IsolationResult<LayerId> {
        let id = match target {
            MattingTarget::Isolation(region) => {
                let id = self.layers_mut().add_layer(NewLayer::image(pixels, region));
                self.layers_mut().select(Some(id))?;
                id
            }
            MattingTarget::BackgroundRemoval(id) => {
                let layer = self.layers().get(id).ok_or(LayerError::NotFound(id))?;
                if !layer.is_image() {
                    return Err(IsolationError::NotImage(id));
                }
                let mask = Arc::new(empty_mask(layer.width, layer.height));
                self.layers_mut().update_layer(
                    id,
                    LayerPatch {
                        pixels: Some(Arc::new(pixels)),
                        ..LayerPatch::default()
                    },
                )?;
                let image = self
                    .layers_mut()
                    .get_mut(id)
                    .and_then(|layer| layer.as_image_mut());
                if let Some(image) = image {
                    image.mask = mask;
                }
                id
            }
        };
        self.commit();
        Ok(id)
    }
}
