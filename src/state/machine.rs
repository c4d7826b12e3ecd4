use super::error::InteractionResult;
use super::event::PointerOutcome;
use super::model::{CursorHint, Interaction, PaintTarget, ResizeHandle};
use crate::editor::tools::{Bounds, Color, Point, StrokePath, ToolKind};
use crate::editor::{Document, Layer, LayerError, LayerId, LayerKind, NewLayer, ShapeKind};
use crate::render::stroke::{paint_polyline, LineStyle};
use crate::render::{delete_button_center, GlyphProvider, Overlay, StrokePreview};

/// Supplies text for a new text layer. `None` or an empty string cancels
/// placement.
pub trait TextPrompt {
    fn request_text(&mut self, at: Point) -> Option<String>;
}

impl<F> TextPrompt for F
where
    F: FnMut(Point) -> Option<String>,
{
    fn request_text(&mut self, at: Point) -> Option<String> {
        self(at)
    }
}

/// Pointer gesture state. Only pointer-up, placement and the text delete
/// button record history; moves mutate the document live.
#[derive(Debug, Default)]
pub struct InteractionMachine {
    state: Interaction,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Interaction {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, Interaction::Idle)
    }

    /// Drops an in-progress gesture without committing it.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            tracing::debug!(from = self.state.name(), "cancel gesture");
            self.state = Interaction::Idle;
        }
    }

    pub fn pointer_down(
        &mut self,
        document: &mut Document,
        at: Point,
        glyphs: &dyn GlyphProvider,
        prompt: &mut dyn TextPrompt,
    ) -> InteractionResult<PointerOutcome> {
        if !self.is_idle() {
            tracing::warn!(state = self.state.name(), "pointer down during gesture; resetting");
            self.state = Interaction::Idle;
        }

        let tolerance = document.chrome().handle_tolerance;
        let selected = document.layers().selected_layer().map(|layer| {
            let is_text = matches!(layer.kind, LayerKind::Text(_));
            (layer.id, layer.bounds(glyphs), layer.frame(), is_text)
        });
        if let Some((id, bounds, frame, is_text)) = selected {
            if is_text {
                if distance(delete_button_center(bounds), at) <= tolerance {
                    tracing::info!(%id, "delete button pressed");
                    document.layers_mut().remove_layer(id);
                    document.commit();
                    return Ok(PointerOutcome::Committed);
                }
            } else if let Some(handle) = handle_at(bounds, at, tolerance) {
                tracing::debug!(%id, ?handle, "start resize");
                self.state = Interaction::Resizing {
                    layer: id,
                    handle,
                    start: at,
                    origin: frame,
                };
                return Ok(PointerOutcome::None);
            }
        }

        match document.tool() {
            ToolKind::Select => self.begin_select(document, at, glyphs),
            tool @ (ToolKind::Brush | ToolKind::Eraser | ToolKind::Lasso) => {
                self.begin_painting(document, tool, at)
            }
            ToolKind::Text => place_text(document, at, prompt),
            ToolKind::Rectangle => place_shape(document, ShapeKind::Rectangle, at),
            ToolKind::Ellipse => place_shape(document, ShapeKind::Ellipse, at),
            ToolKind::MagicWand => {
                let Some(id) = document.layers().top_layer_at(at, glyphs, Layer::is_image) else {
                    return Ok(PointerOutcome::None);
                };
                document.layers_mut().select(Some(id))?;
                Ok(PointerOutcome::BackgroundRemoval(id))
            }
        }
    }

    fn begin_select(
        &mut self,
        document: &mut Document,
        at: Point,
        glyphs: &dyn GlyphProvider,
    ) -> InteractionResult<PointerOutcome> {
        let hit = document.layers().top_layer_at(at, glyphs, |_| true);
        let changed = document.layers().selected() != hit;
        document.layers_mut().select(hit)?;

        if let Some(layer) = hit.and_then(|id| document.layers().get(id)) {
            self.state = Interaction::Dragging {
                layer: layer.id,
                last: at,
                origin: layer.frame(),
            };
        }
        Ok(if changed {
            PointerOutcome::Preview
        } else {
            PointerOutcome::None
        })
    }

    fn begin_painting(
        &mut self,
        document: &mut Document,
        tool: ToolKind,
        at: Point,
    ) -> InteractionResult<PointerOutcome> {
        let target = match (tool, document.layers().selected_layer()) {
            (ToolKind::Eraser, Some(layer)) if layer.is_image() => PaintTarget::LayerMask(layer.id),
            _ => PaintTarget::Ink,
        };
        if tool == ToolKind::Eraser {
            erase(document, target, &[at])?;
        }
        tracing::debug!(?tool, ?target, "start painting");
        self.state = Interaction::Painting {
            tool,
            path: StrokePath::new(at),
            target,
        };
        Ok(PointerOutcome::Preview)
    }

    pub fn pointer_move(
        &mut self,
        document: &mut Document,
        at: Point,
    ) -> InteractionResult<PointerOutcome> {
        let result = self.apply_move(document, at);
        if result.is_err() {
            self.state = Interaction::Idle;
        }
        result
    }

    fn apply_move(
        &mut self,
        document: &mut Document,
        at: Point,
    ) -> InteractionResult<PointerOutcome> {
        match &mut self.state {
            Interaction::Idle => Ok(PointerOutcome::None),
            Interaction::Dragging { layer, last, .. } => {
                document
                    .layers_mut()
                    .move_by(*layer, at.x - last.x, at.y - last.y)?;
                *last = at;
                Ok(PointerOutcome::Preview)
            }
            Interaction::Resizing {
                layer,
                handle,
                start,
                origin,
            } => {
                let frame = handle.resize(*origin, at.x - start.x, at.y - start.y);
                document.layers_mut().set_frame(*layer, frame)?;
                Ok(PointerOutcome::Preview)
            }
            Interaction::Painting { tool, path, target } => {
                let previous = path.last().unwrap_or(at);
                path.append_point(at);
                if *tool == ToolKind::Eraser {
                    erase(document, *target, &[previous, at])?;
                }
                Ok(PointerOutcome::Preview)
            }
        }
    }

    pub fn pointer_up(&mut self, document: &mut Document) -> InteractionResult<PointerOutcome> {
        match std::mem::take(&mut self.state) {
            Interaction::Idle => Ok(PointerOutcome::None),
            Interaction::Dragging { layer, origin, .. }
            | Interaction::Resizing { layer, origin, .. } => {
                let moved = document
                    .layers()
                    .get(layer)
                    .is_some_and(|current| current.frame() != origin);
                if !moved {
                    return Ok(PointerOutcome::None);
                }
                document.commit();
                Ok(PointerOutcome::Committed)
            }
            Interaction::Painting { tool, path, .. } => match tool {
                ToolKind::Brush => {
                    let brush = *document.brush();
                    document
                        .ink_buffer_mut()
                        .stroke(path.points(), brush.color, brush.width())?;
                    document.commit();
                    Ok(PointerOutcome::Committed)
                }
                ToolKind::Eraser => {
                    document.commit();
                    Ok(PointerOutcome::Committed)
                }
                ToolKind::Lasso if path.len() > 2 => Ok(path
                    .bounds()
                    .map_or(PointerOutcome::None, PointerOutcome::Isolation)),
                _ => Ok(PointerOutcome::None),
            },
        }
    }

    pub fn cursor_at(
        &self,
        document: &Document,
        at: Point,
        glyphs: &dyn GlyphProvider,
    ) -> CursorHint {
        match &self.state {
            Interaction::Dragging { .. } => return CursorHint::Move,
            Interaction::Resizing { handle, .. } => return CursorHint::Resize(*handle),
            Interaction::Painting { .. } => return CursorHint::Crosshair,
            Interaction::Idle => {}
        }
        if document.tool() != ToolKind::Select {
            return CursorHint::Crosshair;
        }

        match document.layers().selected_layer() {
            Some(layer) => {
                let bounds = layer.bounds(glyphs);
                let resizable = !matches!(layer.kind, LayerKind::Text(_));
                match handle_at(bounds, at, document.chrome().handle_tolerance) {
                    Some(handle) if resizable => CursorHint::Resize(handle),
                    _ if bounds.contains(at) => CursorHint::Move,
                    _ => CursorHint::Default,
                }
            }
            None => match document.layers().top_layer_at(at, glyphs, |_| true) {
                Some(_) => CursorHint::Move,
                None => CursorHint::Default,
            },
        }
    }

    /// Preview of the path being drawn, for [`crate::render::render_scene`].
    pub fn overlay<'a>(&'a self, document: &Document) -> Overlay<'a> {
        let preview = match &self.state {
            Interaction::Painting { tool, path, .. } => {
                let brush = document.brush();
                match tool {
                    ToolKind::Brush => Some(StrokePreview::Brush {
                        points: path.points(),
                        color: brush.color,
                        width: brush.width(),
                    }),
                    ToolKind::Eraser => Some(StrokePreview::Eraser {
                        points: path.points(),
                        width: brush.width(),
                    }),
                    ToolKind::Lasso => Some(StrokePreview::Lasso {
                        points: path.points(),
                        color: document.text_options().mention.accent,
                    }),
                    _ => None,
                }
            }
            _ => None,
        };
        Overlay {
            preview,
            chrome: *document.chrome(),
        }
    }
}

impl std::fmt::Display for InteractionMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interaction::{}", self.state.name())
    }
}

fn distance(a: Point, b: Point) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

fn handle_at(bounds: Bounds, at: Point, tolerance: f32) -> Option<ResizeHandle> {
    ResizeHandle::ALL
        .into_iter()
        .zip(bounds.corners())
        .find(|(_, corner)| {
            (at.x - corner.x).abs() <= tolerance && (at.y - corner.y).abs() <= tolerance
        })
        .map(|(handle, _)| handle)
}

fn place_text(
    document: &mut Document,
    at: Point,
    prompt: &mut dyn TextPrompt,
) -> InteractionResult<PointerOutcome> {
    let Some(content) = prompt.request_text(at).filter(|text| !text.is_empty()) else {
        tracing::debug!("text placement cancelled");
        return Ok(PointerOutcome::None);
    };
    let options = *document.text_options();
    let layer = NewLayer::text(at, content, options.font_size, document.brush().color)
        .with_mention(options.mention);
    Ok(PointerOutcome::Placed(place(document, ToolKind::Text, layer)?))
}

fn place_shape(
    document: &mut Document,
    shape: ShapeKind,
    at: Point,
) -> InteractionResult<PointerOutcome> {
    let size = document.shape_options().size;
    let frame = Bounds::new(at.x - size / 2.0, at.y - size / 2.0, size, size);
    let tool = match shape {
        ShapeKind::Rectangle => ToolKind::Rectangle,
        ShapeKind::Ellipse => ToolKind::Ellipse,
    };
    let layer = NewLayer::shape(shape, frame, document.brush().color);
    Ok(PointerOutcome::Placed(place(document, tool, layer)?))
}

fn place(document: &mut Document, tool: ToolKind, layer: NewLayer) -> InteractionResult<LayerId> {
    let id = document.layers_mut().add_layer(layer);
    document.layers_mut().select(Some(id))?;
    document.set_tool(tool.after_placement());
    document.commit();
    Ok(id)
}

/// Erases `points` from the ink buffer, or hides them in a layer mask.
/// Mask coordinates are layer-local, scaled to the mask's own resolution.
fn erase(document: &mut Document, target: PaintTarget, points: &[Point]) -> InteractionResult<()> {
    let width = document.brush().width();
    match target {
        PaintTarget::Ink => document.ink_buffer_mut().erase(points, width)?,
        PaintTarget::LayerMask(id) => {
            let layer = document
                .layers_mut()
                .get_mut(id)
                .ok_or(LayerError::NotFound(id))?;
            let frame = layer.frame();
            let Some(image) = layer.as_image_mut() else {
                return Ok(());
            };
            let mask = image.mask_mut();
            let scale_x = mask.width() as f32 / frame.width.max(1.0);
            let scale_y = mask.height() as f32 / frame.height.max(1.0);
            let local: Vec<Point> = points
                .iter()
                .map(|point| {
                    Point::new((point.x - frame.x) * scale_x, (point.y - frame.y) * scale_y)
                })
                .collect();
            let style = LineStyle::solid(Color::WHITE, width * (scale_x + scale_y) / 2.0);
            paint_polyline(mask, &local, style)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::editor::tools::MentionStyle;
    use crate::render::HeuristicGlyphs;
    use image::{Rgba, RgbaImage};

    fn document() -> Document {
        Document::new(&EditorConfig::default())
    }

    fn no_text(_: Point) -> Option<String> {
        None
    }

    fn down(
        machine: &mut InteractionMachine,
        doc: &mut Document,
        x: f32,
        y: f32,
    ) -> PointerOutcome {
        machine
            .pointer_down(doc, Point::new(x, y), &HeuristicGlyphs::default(), &mut no_text)
            .expect("pointer down")
    }

    fn add_rect(doc: &mut Document, frame: Bounds) -> LayerId {
        let id = doc
            .layers_mut()
            .add_layer(NewLayer::shape(ShapeKind::Rectangle, frame, Color::rgb(0, 0, 255)));
        doc.commit();
        id
    }

    #[test]
    fn select_tool_hit_selects_and_drags() {
        let mut doc = document();
        let id = add_rect(&mut doc, Bounds::new(100.0, 100.0, 50.0, 50.0));
        let mut machine = InteractionMachine::new();
        let entries = doc.history().len();

        assert_eq!(down(&mut machine, &mut doc, 120.0, 120.0), PointerOutcome::Preview);
        assert_eq!(doc.layers().selected(), Some(id));
        machine
            .pointer_move(&mut doc, Point::new(130.0, 125.0))
            .expect("move");
        machine
            .pointer_move(&mut doc, Point::new(140.0, 130.0))
            .expect("move");
        assert_eq!(doc.history().len(), entries);

        assert_eq!(
            machine.pointer_up(&mut doc).expect("up"),
            PointerOutcome::Committed
        );
        let layer = doc.layers().get(id).expect("layer exists");
        assert_eq!((layer.x, layer.y), (120.0, 110.0));
        assert_eq!(doc.history().len(), entries + 1);
        assert!(machine.is_idle());
    }

    #[test]
    fn click_without_movement_does_not_commit() {
        let mut doc = document();
        add_rect(&mut doc, Bounds::new(100.0, 100.0, 50.0, 50.0));
        let mut machine = InteractionMachine::new();
        let entries = doc.history().len();

        down(&mut machine, &mut doc, 120.0, 120.0);
        assert_eq!(machine.pointer_up(&mut doc).expect("up"), PointerOutcome::None);
        assert_eq!(doc.history().len(), entries);
    }

    #[test]
    fn select_tool_miss_clears_selection() {
        let mut doc = document();
        let id = add_rect(&mut doc, Bounds::new(100.0, 100.0, 50.0, 50.0));
        doc.layers_mut().select(Some(id)).expect("layer exists");
        let mut machine = InteractionMachine::new();

        down(&mut machine, &mut doc, 400.0, 400.0);
        assert_eq!(doc.layers().selected(), None);
        assert!(machine.is_idle());
    }

    #[test]
    fn corner_press_on_selected_layer_resizes_with_floor() {
        let mut doc = document();
        let id = add_rect(&mut doc, Bounds::new(100.0, 100.0, 50.0, 50.0));
        doc.layers_mut().select(Some(id)).expect("layer exists");
        doc.set_tool(ToolKind::Brush);
        let mut machine = InteractionMachine::new();

        down(&mut machine, &mut doc, 148.0, 152.0);
        assert!(matches!(
            machine.state(),
            Interaction::Resizing {
                handle: ResizeHandle::BottomRight,
                ..
            }
        ));
        machine
            .pointer_move(&mut doc, Point::new(60.0, 60.0))
            .expect("move");
        let layer = doc.layers().get(id).expect("layer exists");
        assert_eq!(layer.frame(), Bounds::new(100.0, 100.0, 10.0, 10.0));
        assert_eq!(
            machine.pointer_up(&mut doc).expect("up"),
            PointerOutcome::Committed
        );
    }

    #[test]
    fn shape_tool_places_centered_square_and_reverts() {
        let mut doc = document();
        doc.set_tool(ToolKind::Ellipse);
        let mut machine = InteractionMachine::new();
        let entries = doc.history().len();

        let PointerOutcome::Placed(id) = down(&mut machine, &mut doc, 200.0, 150.0) else {
            panic!("ellipse tool should place a layer");
        };
        let layer = doc.layers().get(id).expect("layer exists");
        assert_eq!(layer.frame(), Bounds::new(150.0, 100.0, 100.0, 100.0));
        assert_eq!(doc.layers().selected(), Some(id));
        assert_eq!(doc.tool(), ToolKind::Select);
        assert_eq!(doc.history().len(), entries + 1);
        let LayerKind::Shape(shape) = &layer.kind else {
            panic!("expected shape layer");
        };
        assert_eq!(shape.shape, ShapeKind::Ellipse);
        assert_eq!(shape.fill, Color::rgb(255, 0, 0));
    }

    #[test]
    fn text_tool_uses_prompt_and_brush_color() {
        let mut doc = document();
        doc.set_tool(ToolKind::Text);
        let mut machine = InteractionMachine::new();
        let mut prompt = |_: Point| Some("hello @mia".to_string());

        let outcome = machine
            .pointer_down(
                &mut doc,
                Point::new(40.0, 60.0),
                &HeuristicGlyphs::default(),
                &mut prompt,
            )
            .expect("pointer down");
        let PointerOutcome::Placed(id) = outcome else {
            panic!("text tool should place a layer");
        };
        let layer = doc.layers().get(id).expect("layer exists");
        assert_eq!((layer.x, layer.y), (40.0, 60.0));
        let LayerKind::Text(text) = &layer.kind else {
            panic!("expected text layer");
        };
        assert_eq!(text.content, "hello @mia");
        assert_eq!(text.font_size, 24.0);
        assert_eq!(doc.tool(), ToolKind::Select);
    }

    #[test]
    fn cancelled_text_prompt_keeps_tool() {
        let mut doc = document();
        doc.set_tool(ToolKind::Text);
        let mut machine = InteractionMachine::new();
        let mut prompt = |_: Point| Some(String::new());

        let outcome = machine
            .pointer_down(
                &mut doc,
                Point::new(40.0, 60.0),
                &HeuristicGlyphs::default(),
                &mut prompt,
            )
            .expect("pointer down");
        assert_eq!(outcome, PointerOutcome::None);
        assert!(doc.layers().is_empty());
        assert_eq!(doc.tool(), ToolKind::Text);
    }

    #[test]
    fn text_delete_button_removes_selected_text() {
        let glyphs = HeuristicGlyphs::default();
        let mut doc = document();
        let id = doc.layers_mut().add_layer(NewLayer::text(
            Point::new(100.0, 100.0),
            "hi",
            20.0,
            Color::WHITE,
        ));
        doc.layers_mut().select(Some(id)).expect("layer exists");
        let bounds = doc.layers().get(id).expect("layer exists").bounds(&glyphs);
        let button = delete_button_center(bounds);
        let mut machine = InteractionMachine::new();

        let outcome = down(&mut machine, &mut doc, button.x + 3.0, button.y);
        assert_eq!(outcome, PointerOutcome::Committed);
        assert!(doc.layers().is_empty());
        assert_eq!(doc.layers().selected(), None);
    }

    #[test]
    fn brush_stroke_commits_into_ink_on_release() {
        let mut doc = document();
        doc.set_tool(ToolKind::Brush);
        let mut machine = InteractionMachine::new();
        let entries = doc.history().len();

        down(&mut machine, &mut doc, 10.0, 10.0);
        machine
            .pointer_move(&mut doc, Point::new(60.0, 10.0))
            .expect("move");
        assert!(doc.ink().pixels().all(|pixel| pixel.0[3] == 0));
        assert!(machine.overlay(&doc).preview.is_some());

        assert_eq!(
            machine.pointer_up(&mut doc).expect("up"),
            PointerOutcome::Committed
        );
        assert_eq!(*doc.ink().get_pixel(30, 10), Rgba([255, 0, 0, 255]));
        assert_eq!(doc.history().len(), entries + 1);
        assert!(machine.overlay(&doc).preview.is_none());
    }

    #[test]
    fn eraser_without_selection_clears_ink_live() {
        let mut doc = document();
        doc.ink_buffer_mut()
            .stroke(
                &[Point::new(0.0, 20.0), Point::new(100.0, 20.0)],
                Color::BLACK,
                10.0,
            )
            .expect("stroke");
        doc.commit();
        doc.set_tool(ToolKind::Eraser);
        let mut machine = InteractionMachine::new();

        down(&mut machine, &mut doc, 20.0, 20.0);
        machine
            .pointer_move(&mut doc, Point::new(60.0, 20.0))
            .expect("move");
        assert_eq!(doc.ink().get_pixel(40, 20).0[3], 0);
        assert_eq!(doc.ink().get_pixel(90, 20).0[3], 255);
        assert_eq!(
            machine.pointer_up(&mut doc).expect("up"),
            PointerOutcome::Committed
        );
    }

    #[test]
    fn eraser_with_selected_image_paints_its_mask() {
        let mut doc = document();
        let id = doc.layers_mut().add_layer(NewLayer::image(
            RgbaImage::from_pixel(100, 100, Rgba([0, 255, 0, 255])),
            Bounds::new(200.0, 100.0, 100.0, 100.0),
        ));
        doc.layers_mut().select(Some(id)).expect("layer exists");
        doc.set_tool(ToolKind::Eraser);
        let mut machine = InteractionMachine::new();

        down(&mut machine, &mut doc, 250.0, 150.0);
        machine
            .pointer_move(&mut doc, Point::new(260.0, 150.0))
            .expect("move");
        machine.pointer_up(&mut doc).expect("up");

        let layer = doc.layers().get(id).expect("layer exists");
        let mask = &layer.as_image().expect("image layer").mask;
        assert!(mask.get_pixel(55, 50).0[3] > 0);
        assert_eq!(mask.get_pixel(5, 5).0[3], 0);
        assert!(doc.ink().pixels().all(|pixel| pixel.0[3] == 0));
    }

    #[test]
    fn lasso_reports_isolation_box_without_committing() {
        let mut doc = document();
        doc.set_tool(ToolKind::Lasso);
        let mut machine = InteractionMachine::new();
        let entries = doc.history().len();

        down(&mut machine, &mut doc, 120.0, 140.0);
        for (x, y) in [(100.0, 250.0), (300.0, 100.0)] {
            machine
                .pointer_move(&mut doc, Point::new(x, y))
                .expect("move");
        }
        let outcome = machine.pointer_up(&mut doc).expect("up");
        assert_eq!(
            outcome,
            PointerOutcome::Isolation(Bounds::new(100.0, 100.0, 200.0, 150.0))
        );
        assert_eq!(doc.history().len(), entries);
    }

    #[test]
    fn configured_mention_style_reaches_text_and_lasso_preview() {
        let mut doc = document();
        let mention = MentionStyle {
            sigil: '#',
            accent: Color::rgb(10, 20, 30),
        };
        doc.text_options_mut().mention = mention;
        doc.set_tool(ToolKind::Text);
        let mut machine = InteractionMachine::new();
        let mut prompt = |_: Point| Some("ship #now".to_string());
        let outcome = machine
            .pointer_down(
                &mut doc,
                Point::new(40.0, 60.0),
                &HeuristicGlyphs::default(),
                &mut prompt,
            )
            .expect("pointer down");
        let PointerOutcome::Placed(id) = outcome else {
            panic!("text tool should place a layer");
        };
        let Some(LayerKind::Text(text)) = doc.layers().get(id).map(|layer| &layer.kind) else {
            panic!("expected text layer");
        };
        assert_eq!(text.mention, mention);

        doc.set_tool(ToolKind::Lasso);
        down(&mut machine, &mut doc, 10.0, 10.0);
        let Some(StrokePreview::Lasso { color, .. }) = machine.overlay(&doc).preview else {
            panic!("lasso should preview its path");
        };
        assert_eq!(color, mention.accent);
    }

    #[test]
    fn short_lasso_is_ignored() {
        let mut doc = document();
        doc.set_tool(ToolKind::Lasso);
        let mut machine = InteractionMachine::new();

        down(&mut machine, &mut doc, 10.0, 10.0);
        machine
            .pointer_move(&mut doc, Point::new(50.0, 50.0))
            .expect("move");
        assert_eq!(machine.pointer_up(&mut doc).expect("up"), PointerOutcome::None);
    }

    #[test]
    fn magic_wand_only_targets_image_layers() {
        let mut doc = document();
        let image = doc.layers_mut().add_layer(NewLayer::image(
            RgbaImage::new(10, 10),
            Bounds::new(0.0, 0.0, 100.0, 100.0),
        ));
        add_rect(&mut doc, Bounds::new(0.0, 0.0, 50.0, 50.0));
        doc.set_tool(ToolKind::MagicWand);
        let mut machine = InteractionMachine::new();

        assert_eq!(
            down(&mut machine, &mut doc, 20.0, 20.0),
            PointerOutcome::BackgroundRemoval(image)
        );
        assert_eq!(doc.layers().selected(), Some(image));
        assert_eq!(down(&mut machine, &mut doc, 400.0, 400.0), PointerOutcome::None);
    }

    #[test]
    fn cursor_reflects_tool_and_hover_target() {
        let glyphs = HeuristicGlyphs::default();
        let mut doc = document();
        let id = add_rect(&mut doc, Bounds::new(100.0, 100.0, 50.0, 50.0));
        let machine = InteractionMachine::new();

        assert_eq!(
            machine.cursor_at(&doc, Point::new(120.0, 120.0), &glyphs),
            CursorHint::Move
        );
        assert_eq!(
            machine.cursor_at(&doc, Point::new(10.0, 10.0), &glyphs),
            CursorHint::Default
        );
        doc.layers_mut().select(Some(id)).expect("layer exists");
        assert_eq!(
            machine.cursor_at(&doc, Point::new(102.0, 98.0), &glyphs),
            CursorHint::Resize(ResizeHandle::TopLeft)
        );
        doc.set_tool(ToolKind::Brush);
        assert_eq!(
            machine.cursor_at(&doc, Point::new(120.0, 120.0), &glyphs),
            CursorHint::Crosshair
        );
    }

    #[test]
    fn dragging_removed_layer_resets_to_idle() {
        let mut doc = document();
        let id = add_rect(&mut doc, Bounds::new(100.0, 100.0, 50.0, 50.0));
        let mut machine = InteractionMachine::new();
        down(&mut machine, &mut doc, 120.0, 120.0);
        doc.layers_mut().remove_layer(id);

        let err = machine
            .pointer_move(&mut doc, Point::new(130.0, 130.0))
            .expect_err("layer is gone");
        assert!(matches!(
            err,
            crate::state::InteractionError::Layer(LayerError::NotFound(_))
        ));
        assert!(machine.is_idle());
    }
}
