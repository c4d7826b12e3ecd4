//! Document model: layers, freehand ink, tool options and undo history.

pub mod history;
mod ink;
pub mod layers;
pub mod tools;

use std::ops::{Deref, DerefMut};

use image::RgbaImage;

use crate::config::EditorConfig;
use crate::render::ChromeStyle;

pub use history::{History, HistoryAction, HistorySnapshot};
pub use ink::InkBuffer;
pub use layers::{
    ImageLayer, Layer, LayerError, LayerId, LayerKind, LayerPatch, LayerResult, LayerStore,
    NewLayer, ShapeKind, ShapeLayer, TextLayer, MIN_LAYER_SIZE,
};
pub use tools::{BrushOptions, ShapeOptions, TextOptions, ToolKind};

/// Single owned editing session state. Every mutation that should be
/// undoable ends with [`Document::commit`].
#[derive(Debug, Clone)]
pub struct Document {
    canvas_width: u32,
    canvas_height: u32,
    layers: LayerStore,
    ink: InkBuffer,
    history: History,
    tool: ToolKind,
    brush: BrushOptions,
    text: TextOptions,
    shape: ShapeOptions,
    chrome: ChromeStyle,
    busy: bool,
    revision: u64,
}

impl Document {
    pub fn new(config: &EditorConfig) -> Self {
        let canvas_width = config.canvas_width.max(1);
        let canvas_height = config.canvas_height.max(1);
        let mut brush = config.brush;
        brush.set_size(brush.size);

        let mut document = Self {
            canvas_width,
            canvas_height,
            layers: LayerStore::new(),
            ink: InkBuffer::new(canvas_width, canvas_height),
            history: History::new(config.history_limit),
            tool: ToolKind::Select,
            brush,
            text: config.text,
            shape: config.shape,
            chrome: config.chrome,
            busy: false,
            revision: 0,
        };
        document.history.push(document.snapshot());
        document
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    pub fn layers(&self) -> &LayerStore {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerStore {
        &mut self.layers
    }

    pub fn ink(&self) -> &RgbaImage {
        self.ink.image()
    }

    pub fn ink_mut(&mut self) -> &mut RgbaImage {
        self.ink.image_mut()
    }

    pub fn ink_buffer_mut(&mut self) -> &mut InkBuffer {
        &mut self.ink
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.tool != tool {
            tracing::debug!(from = ?self.tool, to = ?tool, "switch tool");
            self.tool = tool;
        }
    }

    pub fn brush(&self) -> &BrushOptions {
        &self.brush
    }

    pub fn brush_mut(&mut self) -> &mut BrushOptions {
        &mut self.brush
    }

    pub fn text_options(&self) -> &TextOptions {
        &self.text
    }

    pub fn text_options_mut(&mut self) -> &mut TextOptions {
        &mut self.text
    }

    pub fn shape_options(&self) -> &ShapeOptions {
        &self.shape
    }

    pub fn chrome(&self) -> &ChromeStyle {
        &self.chrome
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Marks the document busy until the returned guard drops.
    pub(crate) fn busy_guard(&mut self) -> BusyGuard<'_> {
        self.busy = true;
        BusyGuard { document: self }
    }

    /// Bumped on every commit, undo and redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            layers: self.layers.layers().to_vec(),
            ink: self.ink.share(),
        }
    }

    /// Records the current layers and ink as a new history entry.
    pub fn commit(&mut self) {
        let snapshot = self.snapshot();
        self.history.push(snapshot);
        self.revision += 1;
        tracing::info!(
            revision = self.revision,
            layers = self.layers.len(),
            cursor = ?self.history.cursor(),
            "committed document"
        );
    }

    pub fn undo(&mut self) -> bool {
        self.apply_history(HistoryAction::Undo)
    }

    pub fn redo(&mut self) -> bool {
        self.apply_history(HistoryAction::Redo)
    }

    pub fn apply_history(&mut self, action: HistoryAction) -> bool {
        let snapshot = match action {
            HistoryAction::Undo => self.history.undo(),
            HistoryAction::Redo => self.history.redo(),
        }
        .cloned();

        let Some(snapshot) = snapshot else {
            tracing::debug!("{}", action.empty_message());
            return false;
        };
        self.layers.replace_layers(snapshot.layers);
        self.ink.restore(snapshot.ink);
        self.revision += 1;
        tracing::info!(cursor = ?self.history.cursor(), "{}", action.applied_message());
        true
    }

    /// Removes the selected layer, or wipes the ink buffer when nothing is
    /// selected.
    pub fn delete_selection(&mut self) {
        match self.layers.selected() {
            Some(id) => {
                self.layers.remove_layer(id);
            }
            None => self.ink.clear(),
        }
        self.commit();
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.ink.clear();
        self.commit();
    }
}

/// Clears the busy flag on drop.
pub(crate) struct BusyGuard<'a> {
    document: &'a mut Document,
}

impl Deref for BusyGuard<'_> {
    type Target = Document;

    fn deref(&self) -> &Self::Target {
        self.document
    }
}

impl DerefMut for BusyGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.document
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.document.busy = false;
    }
}
