use thiserror::Error;

pub type RenderResult<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("failed to allocate {width}x{height} render surface")]
    SurfaceAllocation { width: u32, height: u32 },
}
