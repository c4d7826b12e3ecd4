use crate::editor::tools::Bounds;
use crate::editor::LayerId;

/// What a pointer event did to the document, and any follow-up work the
/// host has to start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerOutcome {
    /// Nothing changed.
    None,
    /// Scene changed but nothing was committed yet.
    Preview,
    /// A history entry was recorded.
    Committed,
    /// A text or shape layer was created, selected and committed.
    Placed(LayerId),
    /// Magic wand hit an image layer; its background should be removed.
    BackgroundRemoval(LayerId),
    /// Lasso closed around this box; the region should be isolated.
    Isolation(Bounds),
}

impl PointerOutcome {
    pub const fn committed(self) -> bool {
        matches!(self, Self::Committed | Self::Placed(_))
    }
}
