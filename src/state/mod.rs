pub mod error;
pub mod event;
pub mod machine;
pub mod model;

pub use error::{InteractionError, InteractionResult};
pub use event::PointerOutcome;
pub use machine::{InteractionMachine, TextPrompt};
pub use model::{CursorHint, Interaction, PaintTarget, ResizeHandle};
