use std::sync::Arc;

use image::RgbaImage;
use thiserror::Error;

use super::tools::{layout_text, Bounds, Color, MentionStyle, Point};
use crate::render::raster::pixel_extent;
use crate::render::GlyphProvider;

/// Smallest width or height a resize gesture may produce.
pub const MIN_LAYER_SIZE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageLayer {
    pub pixels: Arc<RgbaImage>,
    /// Non-transparent pixels hide the matching layer pixels. Allocated once
    /// with the layer and stretched to the current frame when composited.
    pub mask: Arc<RgbaImage>,
}

impl ImageLayer {
    /// Wraps decoded pixels with an empty mask sized to the layer frame.
    pub fn new(pixels: RgbaImage, width: f32, height: f32) -> Self {
        Self::from_shared(Arc::new(pixels), width, height)
    }

    pub fn from_shared(pixels: Arc<RgbaImage>, width: f32, height: f32) -> Self {
        Self {
            pixels,
            mask: Arc::new(empty_mask(width, height)),
        }
    }

    pub fn mask_mut(&mut self) -> &mut RgbaImage {
        Arc::make_mut(&mut self.mask)
    }
}

pub(crate) fn empty_mask(width: f32, height: f32) -> RgbaImage {
    RgbaImage::new(pixel_extent(width), pixel_extent(height))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLayer {
    pub content: String,
    pub font_size: f32,
    pub color: Color,
    /// Captured from the text options when the layer is placed.
    pub mention: MentionStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeLayer {
    pub shape: ShapeKind,
    pub fill: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    Image(ImageLayer),
    Text(TextLayer),
    Shape(ShapeLayer),
}

impl LayerKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Text(_) => "text",
            Self::Shape(_) => "shape",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub x: f32,
    pub y: f32,
    /// Ignored for text layers, whose extent is measured from content.
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    pub scale: f32,
    pub kind: LayerKind,
}

impl Layer {
    pub fn frame(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    /// Box used for hit-testing and selection chrome.
    pub fn bounds(&self, glyphs: &dyn GlyphProvider) -> Bounds {
        match &self.kind {
            LayerKind::Text(text) => {
                let layout =
                    layout_text(&text.content, text.font_size, text.mention.sigil, glyphs);
                Bounds::new(self.x, self.y, layout.width, layout.height)
            }
            LayerKind::Image(_) | LayerKind::Shape(_) => self.frame(),
        }
    }

    pub fn as_image(&self) -> Option<&ImageLayer> {
        match &self.kind {
            LayerKind::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut ImageLayer> {
        match &mut self.kind {
            LayerKind::Image(image) => Some(image),
            _ => None,
        }
    }

    pub const fn is_image(&self) -> bool {
        matches!(self.kind, LayerKind::Image(_))
    }

    fn set_frame(&mut self, frame: Bounds) {
        self.x = frame.x;
        self.y = frame.y;
        self.width = frame.width;
        self.height = frame.height;
    }
}

/// Everything needed to append a layer; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLayer {
    pub frame: Bounds,
    pub kind: LayerKind,
}

impl NewLayer {
    pub fn image(pixels: RgbaImage, frame: Bounds) -> Self {
        Self {
            frame,
            kind: LayerKind::Image(ImageLayer::new(pixels, frame.width, frame.height)),
        }
    }

    pub fn text(anchor: Point, content: impl Into<String>, font_size: f32, color: Color) -> Self {
        Self {
            frame: Bounds::new(anchor.x, anchor.y, 0.0, 0.0),
            kind: LayerKind::Text(TextLayer {
                content: content.into(),
                font_size,
                color,
                mention: MentionStyle::default(),
            }),
        }
    }

    /// Overrides the mention style of a text layer; other kinds are unchanged.
    pub fn with_mention(mut self, mention: MentionStyle) -> Self {
        if let LayerKind::Text(text) = &mut self.kind {
            text.mention = mention;
        }
        self
    }

    pub fn shape(shape: ShapeKind, frame: Bounds, fill: Color) -> Self {
        Self {
            frame,
            kind: LayerKind::Shape(ShapeLayer { shape, fill }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub rotation: Option<f32>,
    pub scale: Option<f32>,
    pub content: Option<String>,
    pub font_size: Option<f32>,
    pub color: Option<Color>,
    pub pixels: Option<Arc<RgbaImage>>,
}

impl LayerPatch {
    pub fn frame(frame: Bounds) -> Self {
        Self {
            x: Some(frame.x),
            y: Some(frame.y),
            width: Some(frame.width),
            height: Some(frame.height),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayerError {
    #[error("{0} does not exist")]
    NotFound(LayerId),
    #[error("cannot apply {field} to {kind} {id}")]
    KindMismatch {
        id: LayerId,
        kind: &'static str,
        field: &'static str,
    },
}

pub type LayerResult<T> = std::result::Result<T, LayerError>;

/// Ordered scene graph: later layers draw on top of earlier ones.
#[derive(Debug, Clone)]
pub struct LayerStore {
    layers: Vec<Layer>,
    selected: Option<LayerId>,
    next_id: u64,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStore {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            selected: None,
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.id == id)
    }

    pub fn add_layer(&mut self, layer: NewLayer) -> LayerId {
        let id = self.allocate_id();
        let NewLayer { frame, kind } = layer;
        tracing::debug!(%id, kind = kind.name(), ?frame, "add layer");
        self.layers.push(Layer {
            id,
            x: frame.x,
            y: frame.y,
            width: frame.width,
            height: frame.height,
            rotation: 0.0,
            scale: 1.0,
            kind,
        });
        id
    }

    pub fn update_layer(&mut self, id: LayerId, patch: LayerPatch) -> LayerResult<()> {
        let layer = self.get_mut(id).ok_or(LayerError::NotFound(id))?;
        let kind = layer.kind.name();
        let mismatch = |field| LayerError::KindMismatch { id, kind, field };

        match &layer.kind {
            LayerKind::Text(_) if patch.pixels.is_some() => return Err(mismatch("pixels")),
            LayerKind::Shape(_) if patch.pixels.is_some() => return Err(mismatch("pixels")),
            LayerKind::Shape(_) if patch.content.is_some() => return Err(mismatch("content")),
            LayerKind::Shape(_) if patch.font_size.is_some() => {
                return Err(mismatch("font_size"))
            }
            LayerKind::Image(_) if patch.content.is_some() => return Err(mismatch("content")),
            LayerKind::Image(_) if patch.font_size.is_some() => {
                return Err(mismatch("font_size"))
            }
            LayerKind::Image(_) if patch.color.is_some() => return Err(mismatch("color")),
            _ => {}
        }

        let LayerPatch {
            x,
            y,
            width,
            height,
            rotation,
            scale,
            content,
            font_size,
            color,
            pixels,
        } = patch;
        layer.x = x.unwrap_or(layer.x);
        layer.y = y.unwrap_or(layer.y);
        layer.width = width.unwrap_or(layer.width);
        layer.height = height.unwrap_or(layer.height);
        layer.rotation = rotation.unwrap_or(layer.rotation);
        layer.scale = scale.unwrap_or(layer.scale);

        match &mut layer.kind {
            LayerKind::Image(image) => {
                if let Some(pixels) = pixels {
                    image.pixels = pixels;
                }
            }
            LayerKind::Text(text) => {
                if let Some(content) = content {
                    text.content = content;
                }
                text.font_size = font_size.unwrap_or(text.font_size);
                text.color = color.unwrap_or(text.color);
            }
            LayerKind::Shape(shape) => {
                shape.fill = color.unwrap_or(shape.fill);
            }
        }
        Ok(())
    }

    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.layers.iter().position(|layer| layer.id == id)?;
        let layer = self.layers.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::debug!(%id, "removed layer");
        Some(layer)
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.selected = None;
    }

    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn select(&mut self, id: Option<LayerId>) -> LayerResult<()> {
        if let Some(id) = id {
            if self.get(id).is_none() {
                return Err(LayerError::NotFound(id));
            }
        }
        self.selected = id;
        Ok(())
    }

    /// Installs a restored layer list, keeping ids monotonic and dropping a
    /// selection that no longer resolves.
    pub fn replace_layers(&mut self, layers: Vec<Layer>) {
        let highest = layers.iter().map(|layer| layer.id.0).max().unwrap_or(0);
        self.next_id = self.next_id.max(highest.saturating_add(1));
        self.layers = layers;
        if let Some(selected) = self.selected {
            if self.get(selected).is_none() {
                self.selected = None;
            }
        }
    }

    pub fn move_by(&mut self, id: LayerId, delta_x: f32, delta_y: f32) -> LayerResult<()> {
        let layer = self.get_mut(id).ok_or(LayerError::NotFound(id))?;
        layer.x += delta_x;
        layer.y += delta_y;
        Ok(())
    }

    pub fn set_frame(&mut self, id: LayerId, frame: Bounds) -> LayerResult<()> {
        let layer = self.get_mut(id).ok_or(LayerError::NotFound(id))?;
        layer.set_frame(frame);
        Ok(())
    }

    /// Topmost layer whose bounds contain `point` and that passes `filter`.
    pub fn top_layer_at(
        &self,
        point: Point,
        glyphs: &dyn GlyphProvider,
        filter: impl Fn(&Layer) -> bool,
    ) -> Option<LayerId> {
        self.layers
            .iter()
            .rev()
            .filter(|layer| filter(layer))
            .find(|layer| layer.bounds(glyphs).contains(point))
            .map(|layer| layer.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeuristicGlyphs;

    fn shape(x: f32, y: f32) -> NewLayer {
        NewLayer::shape(
            ShapeKind::Rectangle,
            Bounds::new(x, y, 50.0, 50.0),
            Color::rgb(0, 0, 255),
        )
    }

    #[test]
    fn add_layer_appends_with_unique_ids() {
        let mut store = LayerStore::new();
        let first = store.add_layer(shape(0.0, 0.0));
        let second = store.add_layer(shape(10.0, 10.0));

        assert_ne!(first, second);
        assert_eq!(store.layers()[0].id, first);
        assert_eq!(store.layers()[1].id, second);
        assert_eq!(store.layers()[1].scale, 1.0);
    }

    #[test]
    fn image_layer_mask_matches_frame_size() {
        let mut store = LayerStore::new();
        let id = store.add_layer(NewLayer::image(
            RgbaImage::new(400, 300),
            Bounds::new(0.0, 0.0, 200.0, 150.5),
        ));
        let image = store.get(id).and_then(Layer::as_image).expect("image layer");
        assert_eq!(image.mask.dimensions(), (200, 151));
        assert!(image.mask.pixels().all(|pixel| pixel.0[3] == 0));
    }

    #[test]
    fn remove_selected_layer_clears_selection() {
        let mut store = LayerStore::new();
        let keep = store.add_layer(shape(0.0, 0.0));
        let doomed = store.add_layer(shape(10.0, 10.0));
        store.select(Some(doomed)).expect("layer exists");

        assert!(store.remove_layer(doomed).is_some());
        assert_eq!(store.selected(), None);
        assert!(store.get(keep).is_some());
        assert!(store.remove_layer(doomed).is_none());
    }

    #[test]
    fn select_rejects_dead_ids() {
        let mut store = LayerStore::new();
        let err = store
            .select(Some(LayerId(42)))
            .expect_err("unknown id should be refused");
        assert_eq!(err, LayerError::NotFound(LayerId(42)));
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn selection_stays_valid_across_add_remove_sequences() {
        let mut store = LayerStore::new();
        let mut ids = Vec::new();
        for step in 0..24_u32 {
            if step % 3 == 2 {
                let victim = ids.remove((step as usize * 7) % ids.len());
                store.remove_layer(victim);
            } else {
                let id = store.add_layer(shape(step as f32, 0.0));
                ids.push(id);
                if step % 2 == 0 {
                    store.select(Some(id)).expect("fresh layer exists");
                }
            }
            if let Some(selected) = store.selected() {
                assert!(store.get(selected).is_some(), "dangling selection at step {step}");
            }
        }
    }

    #[test]
    fn update_layer_patches_geometry_and_payload() {
        let mut store = LayerStore::new();
        let id = store.add_layer(NewLayer::text(
            Point::new(5.0, 5.0),
            "hello",
            24.0,
            Color::WHITE,
        ));
        store
            .update_layer(
                id,
                LayerPatch {
                    x: Some(40.0),
                    content: Some("bye @ana".to_string()),
                    ..LayerPatch::default()
                },
            )
            .expect("text patch should apply");

        let layer = store.get(id).expect("layer exists");
        assert_eq!(layer.x, 40.0);
        assert_eq!(layer.y, 5.0);
        let LayerKind::Text(text) = &layer.kind else {
            panic!("expected text layer");
        };
        assert_eq!(text.content, "bye @ana");
    }

    #[test]
    fn update_layer_rejects_kind_mismatch() {
        let mut store = LayerStore::new();
        let id = store.add_layer(shape(0.0, 0.0));
        let err = store
            .update_layer(
                id,
                LayerPatch {
                    content: Some("nope".to_string()),
                    ..LayerPatch::default()
                },
            )
            .expect_err("shapes have no text content");
        assert!(matches!(err, LayerError::KindMismatch { field: "content", .. }));
    }

    #[test]
    fn replace_layers_drops_dangling_selection_and_keeps_ids_monotonic() {
        let mut store = LayerStore::new();
        let first = store.add_layer(shape(0.0, 0.0));
        let snapshot = store.layers().to_vec();
        let second = store.add_layer(shape(5.0, 5.0));
        store.select(Some(second)).expect("layer exists");

        store.replace_layers(snapshot);
        assert_eq!(store.selected(), None);
        let third = store.add_layer(shape(9.0, 9.0));
        assert!(third > second);
        assert!(store.get(first).is_some());
    }

    #[test]
    fn top_layer_at_prefers_last_added() {
        let glyphs = HeuristicGlyphs::default();
        let mut store = LayerStore::new();
        let bottom = store.add_layer(shape(0.0, 0.0));
        let top = store.add_layer(shape(25.0, 25.0));

        assert_eq!(
            store.top_layer_at(Point::new(30.0, 30.0), &glyphs, |_| true),
            Some(top)
        );
        assert_eq!(
            store.top_layer_at(Point::new(5.0, 5.0), &glyphs, |_| true),
            Some(bottom)
        );
        assert_eq!(
            store.top_layer_at(Point::new(30.0, 30.0), &glyphs, Layer::is_image),
            None
        );
        assert_eq!(
            store.top_layer_at(Point::new(300.0, 300.0), &glyphs, |_| true),
            None
        );
    }

    #[test]
    fn text_bounds_follow_measured_words() {
        let glyphs = HeuristicGlyphs::default();
        let mut store = LayerStore::new();
        let id = store.add_layer(NewLayer::text(
            Point::new(10.0, 20.0),
            "ab cd",
            10.0,
            Color::WHITE,
        ));
        let bounds = store.get(id).expect("layer exists").bounds(&glyphs);
        assert_eq!(bounds.x, 10.0);
        assert_eq!(bounds.height, 10.0);
        assert!((bounds.width - 6.0 * 5.5).abs() < 1e-4);
    }
}
