use thiserror::Error;

use crate::editor::LayerError;
use crate::render::RenderError;

pub type InteractionResult<T> = std::result::Result<T, InteractionError>;

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error(transparent)]
    Layer(#[from] LayerError),

    #[error("failed to paint stroke: {0}")]
    Paint(#[from] RenderError),
}
