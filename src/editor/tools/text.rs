use serde::Deserialize;

use super::Color;
use crate::render::{FontWeight, GlyphProvider};

/// How mention words are recognized and colored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MentionStyle {
    /// Words starting with this character render as mentions.
    pub sigil: char,
    pub accent: Color,
}

impl Default for MentionStyle {
    fn default() -> Self {
        Self {
            sigil: '@',
            accent: Color::rgb(255, 152, 43),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordRun {
    pub word: String,
    /// Offset from the layer anchor.
    pub x: f32,
    pub advance: f32,
    pub mention: bool,
}

impl WordRun {
    pub const fn weight(&self) -> FontWeight {
        if self.mention {
            FontWeight::Bold
        } else {
            FontWeight::Regular
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayout {
    pub runs: Vec<WordRun>,
    pub width: f32,
    pub height: f32,
}

/// Lays words out left to right on one line. Each word is measured with its
/// trailing space so mentions can switch weight without breaking the flow.
pub fn layout_text(
    content: &str,
    font_size: f32,
    sigil: char,
    glyphs: &dyn GlyphProvider,
) -> TextLayout {
    let mut runs = Vec::new();
    let mut pen_x = 0.0;
    for word in content.split(' ') {
        let mention = word.starts_with(sigil);
        let weight = if mention {
            FontWeight::Bold
        } else {
            FontWeight::Regular
        };
        let advance = glyphs.advance(&format!("{word} "), font_size, weight);
        runs.push(WordRun {
            word: word.to_string(),
            x: pen_x,
            advance,
            mention,
        });
        pen_x += advance;
    }

    TextLayout {
        runs,
        width: pen_x,
        height: font_size,
    }
}
