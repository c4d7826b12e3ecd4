use std::path::PathBuf;

use thiserror::Error;

use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::editor::LayerError;
use crate::matting::{IsolationError, MattingError};
use crate::render::{GlyphError, RenderError};
use crate::state::InteractionError;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Interaction(#[from] InteractionError),
    #[error(transparent)]
    Isolation(#[from] IsolationError),
    #[error(transparent)]
    Matting(#[from] MattingError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Layer(#[from] LayerError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Glyph(#[from] GlyphError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read font {}: {source}", path.display())]
    FontRead {
        path: PathBuf,
        source: std::io::Error,
    },
}
