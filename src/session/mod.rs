//! Host-facing editor: routes input to the document and pushes a fresh
//! composite to the export sink after every committed change.

use std::path::Path;

use image::RgbaImage;

use crate::assets::AssetPlacement;
use crate::config::{EditorConfig, FontPaths};
use crate::editor::tools::Point;
use crate::editor::{Document, HistoryAction, LayerId};
use crate::error::{AppError, AppResult};
use crate::input::{
    resolve_shortcut, InputContext, ShortcutAction, ShortcutKey, ShortcutModifiers,
};
use crate::matting::{MattingJob, MattingResult, MattingService};
use crate::render::{
    render_composite, render_scene, FontdueGlyphs, GlyphProvider, HeuristicGlyphs, RenderResult,
};
use crate::state::{CursorHint, InteractionMachine, PointerOutcome, TextPrompt};

/// Receives the flattened composite whenever the document changes.
pub trait ExportSink {
    fn export(&mut self, composite: &RgbaImage);
}

impl<F> ExportSink for F
where
    F: FnMut(&RgbaImage),
{
    fn export(&mut self, composite: &RgbaImage) {
        self(composite)
    }
}

pub struct EditorSession {
    document: Document,
    machine: InteractionMachine,
    glyphs: Box<dyn GlyphProvider>,
    sink: Option<Box<dyn ExportSink>>,
    exported_revision: u64,
    status: Option<String>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("document", &self.document)
            .field("machine", &self.machine)
            .field("has_sink", &self.sink.is_some())
            .field("exported_revision", &self.exported_revision)
            .finish()
    }
}

impl EditorSession {
    pub fn new(config: &EditorConfig, glyphs: Box<dyn GlyphProvider>) -> Self {
        let document = Document::new(config);
        let exported_revision = document.revision();
        Self {
            document,
            machine: InteractionMachine::new(),
            glyphs,
            sink: None,
            exported_revision,
            status: None,
        }
    }

    /// Builds a session with the configured fonts, falling back to a system
    /// face and then to placeholder glyphs when they cannot be loaded.
    pub fn from_config(config: &EditorConfig) -> Self {
        let glyphs = match load_glyphs(&config.fonts) {
            Ok(glyphs) => glyphs,
            Err(err) => {
                tracing::warn!(%err, "configured fonts failed to load");
                system_glyphs()
            }
        };
        Self::new(config, glyphs)
    }

    pub fn with_export_sink(mut self, sink: impl ExportSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn machine(&self) -> &InteractionMachine {
        &self.machine
    }

    /// Last user-facing message (history move, matting failure).
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.document.is_busy()
    }

    pub fn scene(&self) -> RenderResult<RgbaImage> {
        let overlay = self.machine.overlay(&self.document);
        render_scene(&self.document, &overlay, self.glyphs.as_ref())
    }

    pub fn composite(&self) -> RenderResult<RgbaImage> {
        render_composite(&self.document, self.glyphs.as_ref())
    }

    pub fn cursor_at(&self, at: Point) -> CursorHint {
        self.machine.cursor_at(&self.document, at, self.glyphs.as_ref())
    }

    /// Returns a matting job when the press asks for background removal.
    pub fn pointer_down(
        &mut self,
        at: Point,
        prompt: &mut dyn TextPrompt,
    ) -> AppResult<Option<MattingJob>> {
        let outcome =
            self.machine
                .pointer_down(&mut self.document, at, self.glyphs.as_ref(), prompt)?;
        self.follow_up(outcome)
    }

    pub fn pointer_move(&mut self, at: Point) -> AppResult<()> {
        self.machine.pointer_move(&mut self.document, at)?;
        Ok(())
    }

    /// Returns a matting job when a lasso closed around a region.
    pub fn pointer_up(&mut self) -> AppResult<Option<MattingJob>> {
        let outcome = self.machine.pointer_up(&mut self.document)?;
        self.follow_up(outcome)
    }

    fn follow_up(&mut self, outcome: PointerOutcome) -> AppResult<Option<MattingJob>> {
        let job = match outcome {
            PointerOutcome::BackgroundRemoval(id) => {
                Some(self.document.begin_background_removal(id)?)
            }
            PointerOutcome::Isolation(region) => {
                self.document.begin_isolation(region, self.glyphs.as_ref())?
            }
            PointerOutcome::None
            | PointerOutcome::Preview
            | PointerOutcome::Committed
            | PointerOutcome::Placed(_) => None,
        };
        self.sync_export()?;
        Ok(job)
    }

    /// Applies a job's result. Failures are also kept as the status message.
    pub fn finish_matting(
        &mut self,
        job: MattingJob,
        result: MattingResult<Vec<u8>>,
    ) -> AppResult<LayerId> {
        match self.document.complete_matting(job, result) {
            Ok(id) => {
                self.status = None;
                self.sync_export()?;
                Ok(id)
            }
            Err(err) => {
                self.status = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Runs `job` on the calling thread and applies the result.
    pub fn run_matting(
        &mut self,
        job: MattingJob,
        service: &dyn MattingService,
    ) -> AppResult<LayerId> {
        let result = job.run(service, None);
        self.finish_matting(job, result)
    }

    pub fn insert_image(&mut self, bytes: &[u8], placement: AssetPlacement) -> AppResult<LayerId> {
        let id = self.document.insert_image(bytes, placement)?;
        self.sync_export()?;
        Ok(id)
    }

    /// Returns `true` when the key mapped to an editor action.
    pub fn key_pressed(
        &mut self,
        key: ShortcutKey,
        modifiers: ShortcutModifiers,
        context: InputContext,
    ) -> AppResult<bool> {
        let Some(action) = resolve_shortcut(key, modifiers, context) else {
            return Ok(false);
        };
        tracing::debug!(?action, "shortcut");
        match action {
            ShortcutAction::Undo => self.apply_history(HistoryAction::Undo),
            ShortcutAction::Redo => self.apply_history(HistoryAction::Redo),
            ShortcutAction::DeleteSelection => {
                self.machine.cancel();
                self.document.delete_selection();
            }
            ShortcutAction::SelectTool(tool) => {
                self.machine.cancel();
                self.document.set_tool(tool);
            }
        }
        self.sync_export()?;
        Ok(true)
    }

    fn apply_history(&mut self, action: HistoryAction) {
        self.machine.cancel();
        let message = if self.document.apply_history(action) {
            action.applied_message()
        } else {
            action.empty_message()
        };
        self.status = Some(message.to_string());
    }

    fn sync_export(&mut self) -> AppResult<()> {
        let revision = self.document.revision();
        if revision == self.exported_revision {
            return Ok(());
        }
        if let Some(sink) = self.sink.as_mut() {
            let composite = render_composite(&self.document, self.glyphs.as_ref())?;
            sink.export(&composite);
            tracing::debug!(revision, "exported composite");
        }
        self.exported_revision = revision;
        Ok(())
    }
}

/// Glyphs from the configured font files, or from [`system_glyphs`] when no
/// regular face is configured.
pub fn load_glyphs(fonts: &FontPaths) -> AppResult<Box<dyn GlyphProvider>> {
    let Some(regular_path) = fonts.regular.as_deref() else {
        return Ok(system_glyphs());
    };
    let regular = read_font(regular_path)?;
    let bold = fonts.bold.as_deref().map(read_font).transpose()?;
    let glyphs = FontdueGlyphs::from_bytes(&regular, bold.as_deref())?;
    tracing::info!(regular = %regular_path.display(), "loaded fonts");
    Ok(Box::new(glyphs))
}

/// An installed sans-serif face, or placeholder boxes when none is found.
pub fn system_glyphs() -> Box<dyn GlyphProvider> {
    match FontdueGlyphs::from_system_fonts() {
        Ok(glyphs) => Box::new(glyphs),
        Err(err) => {
            tracing::warn!(%err, "no font available; text renders as placeholder boxes");
            Box::new(HeuristicGlyphs::default())
        }
    }
}

fn read_font(path: &Path) -> AppResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| AppError::FontRead {
        path: path.to_path_buf(),
        source,
    })
}
