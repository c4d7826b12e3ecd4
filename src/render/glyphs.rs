use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Coverage bitmap for one glyph, offset from the run's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBitmap {
    pub left: f32,
    pub top: f32,
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum GlyphError {
    #[error("failed to parse font: {0}")]
    InvalidFont(&'static str),
    #[error("no usable system font found")]
    NoSystemFont,
}

/// Families tried, in order, when no font file is configured.
const SYSTEM_FAMILIES: [fontdb::Family<'static>; 6] = [
    fontdb::Family::SansSerif,
    fontdb::Family::Name("DejaVu Sans"),
    fontdb::Family::Name("Liberation Sans"),
    fontdb::Family::Name("Noto Sans"),
    fontdb::Family::Name("Arial"),
    fontdb::Family::Name("Helvetica"),
];

/// Measures and rasterizes short runs of text for text layers.
pub trait GlyphProvider {
    /// Horizontal advance of `text` at `size` pixels.
    fn advance(&self, text: &str, size: f32, weight: FontWeight) -> f32;

    /// Glyph coverage for `text`, laid out from a top-left origin.
    fn rasterize(&self, text: &str, size: f32, weight: FontWeight) -> Vec<GlyphBitmap>;
}

/// Fixed-ratio metrics with solid placeholder boxes instead of glyph shapes.
/// Last resort when neither a configured nor a system font is available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicGlyphs {
    pub regular_advance: f32,
    pub bold_advance: f32,
}

impl Default for HeuristicGlyphs {
    fn default() -> Self {
        Self {
            regular_advance: 0.55,
            bold_advance: 0.6,
        }
    }
}

impl GlyphProvider for HeuristicGlyphs {
    fn advance(&self, text: &str, size: f32, weight: FontWeight) -> f32 {
        let ratio = match weight {
            FontWeight::Regular => self.regular_advance,
            FontWeight::Bold => self.bold_advance,
        };
        text.chars().count() as f32 * size * ratio
    }

    fn rasterize(&self, text: &str, size: f32, weight: FontWeight) -> Vec<GlyphBitmap> {
        let advance = self.advance("x", size, weight);
        let width = (advance * 0.8).round().max(1.0) as u32;
        let height = (size * 0.7).round().max(1.0) as u32;

        text.chars()
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace())
            .map(|(index, _)| GlyphBitmap {
                left: index as f32 * advance + advance * 0.1,
                top: size * 0.2,
                width,
                height,
                coverage: vec![u8::MAX; (width * height) as usize],
            })
            .collect()
    }
}

pub struct FontdueGlyphs {
    regular: fontdue::Font,
    bold: Option<fontdue::Font>,
}

impl std::fmt::Debug for FontdueGlyphs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontdueGlyphs")
            .field("has_bold", &self.bold.is_some())
            .finish()
    }
}

fn parse_face(bytes: &[u8], index: u32) -> Result<fontdue::Font, GlyphError> {
    let settings = fontdue::FontSettings {
        collection_index: index,
        ..fontdue::FontSettings::default()
    };
    fontdue::Font::from_bytes(bytes, settings).map_err(GlyphError::InvalidFont)
}

impl FontdueGlyphs {
    /// Bold runs reuse the regular face when no bold face is supplied.
    pub fn from_bytes(regular: &[u8], bold: Option<&[u8]>) -> Result<Self, GlyphError> {
        Ok(Self {
            regular: parse_face(regular, 0)?,
            bold: bold.map(|bytes| parse_face(bytes, 0)).transpose()?,
        })
    }

    /// Picks a sans-serif face (and its bold sibling when present) from the
    /// fonts installed on this machine.
    pub fn from_system_fonts() -> Result<Self, GlyphError> {
        use fontdb::{Database, Query, Style, Weight};

        let mut db = Database::new();
        db.load_system_fonts();

        let query = |weight| Query {
            families: &SYSTEM_FAMILIES,
            weight,
            style: Style::Normal,
            ..Query::default()
        };
        let regular_id = db
            .query(&query(Weight::NORMAL))
            .or_else(|| {
                db.faces()
                    .find(|face| face.style == Style::Normal && face.weight == Weight::NORMAL)
                    .map(|face| face.id)
            })
            .ok_or(GlyphError::NoSystemFont)?;
        let regular = db
            .with_face_data(regular_id, parse_face)
            .ok_or(GlyphError::NoSystemFont)??;

        let bold = db
            .query(&query(Weight::BOLD))
            .filter(|id| *id != regular_id)
            .and_then(|id| db.with_face_data(id, parse_face))
            .and_then(Result::ok);

        if let Some(face) = db.face(regular_id) {
            tracing::info!(
                family = face.families.first().map(|(name, _)| name.as_str()),
                has_bold = bold.is_some(),
                "using system font"
            );
        }
        Ok(Self { regular, bold })
    }

    fn face(&self, weight: FontWeight) -> &fontdue::Font {
        match weight {
            FontWeight::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            FontWeight::Regular => &self.regular,
        }
    }
}

impl GlyphProvider for FontdueGlyphs {
    fn advance(&self, text: &str, size: f32, weight: FontWeight) -> f32 {
        let face = self.face(weight);
        text.chars()
            .map(|c| face.metrics(c, size).advance_width)
            .sum()
    }

    fn rasterize(&self, text: &str, size: f32, weight: FontWeight) -> Vec<GlyphBitmap> {
        let face = self.face(weight);
        let ascent = face
            .horizontal_line_metrics(size)
            .map(|metrics| metrics.ascent)
            .unwrap_or(size * 0.8);

        let mut pen_x = 0.0;
        let mut glyphs = Vec::new();
        for c in text.chars() {
            let (metrics, coverage) = face.rasterize(c, size);
            if metrics.width > 0 && metrics.height > 0 {
                glyphs.push(GlyphBitmap {
                    left: pen_x + metrics.xmin as f32,
                    top: ascent - (metrics.height as f32 + metrics.ymin as f32),
                    width: metrics.width as u32,
                    height: metrics.height as u32,
                    coverage,
                });
            }
            pen_x += metrics.advance_width;
        }
        glyphs
    }
}
