pub mod assets;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod masking;
pub mod matting;
pub mod render;
pub mod session;
pub mod state;

pub use error::{AppError, AppResult};
pub use session::{EditorSession, ExportSink};
