use crate::editor::tools::{Bounds, Point, StrokePath, ToolKind};
use crate::editor::{LayerId, MIN_LAYER_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    /// Same order as [`Bounds::corners`].
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Applies a pointer delta to `origin`. Each dimension is floored at
    /// [`MIN_LAYER_SIZE`] and the edge opposite the handle never moves.
    pub fn resize(self, origin: Bounds, delta_x: f32, delta_y: f32) -> Bounds {
        let grows_left = matches!(self, Self::TopLeft | Self::BottomLeft);
        let grows_up = matches!(self, Self::TopLeft | Self::TopRight);

        let width = if grows_left {
            origin.width - delta_x
        } else {
            origin.width + delta_x
        }
        .max(MIN_LAYER_SIZE);
        let height = if grows_up {
            origin.height - delta_y
        } else {
            origin.height + delta_y
        }
        .max(MIN_LAYER_SIZE);

        let x = if grows_left {
            origin.right() - width
        } else {
            origin.x
        };
        let y = if grows_up {
            origin.bottom() - height
        } else {
            origin.y
        };
        Bounds::new(x, y, width, height)
    }
}

/// Where eraser stamps land for the current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintTarget {
    Ink,
    LayerMask(LayerId),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging {
        layer: LayerId,
        last: Point,
        origin: Bounds,
    },
    Resizing {
        layer: LayerId,
        handle: ResizeHandle,
        start: Point,
        origin: Bounds,
    },
    Painting {
        tool: ToolKind,
        path: StrokePath,
        target: PaintTarget,
    },
}

impl Interaction {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "dragging",
            Self::Resizing { .. } => "resizing",
            Self::Painting { .. } => "painting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Move,
    Crosshair,
    Resize(ResizeHandle),
}
