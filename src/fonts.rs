//! Font registry and text measurement using `ttf-parser`.
//!
//! Both backends measure text through the same registry so that word-wrap
//! decisions come out identical no matter which backend paints. When no real
//! font bytes are registered for the active face, a Helvetica-like average
//! advance heuristic keeps measurement deterministic.

use std::collections::HashMap;

use crate::error::SlateError;

/// 1 pt = 1/72 inch; document units are mm.
pub const PT_TO_MM: f32 = 0.352778;
/// Inverse of [`PT_TO_MM`].
pub const MM_TO_PT: f32 = 72.0 / 25.4;

/// A registered font face.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes (kept alive for ttf-parser's zero-copy API; empty for
    /// builtin faces measured heuristically).
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
}

/// Lookup key: family name plus the style flags parsed from an `""`/`"B"`/
/// `"I"`/`"BI"` style string.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub fn new(family: &str, style: &str) -> Self {
        let upper = style.to_ascii_uppercase();
        Self {
            family: family.to_string(),
            bold: upper.contains('B'),
            italic: upper.contains('I'),
        }
    }
}

/// Registry of loaded faces shared by the layout engine's measurement path.
pub struct FontManager {
    fonts: HashMap<FontKey, FontData>,
}

impl FontManager {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
        }
    }

    /// Register a TTF/OTF face from raw bytes.
    pub fn register(&mut self, family: &str, style: &str, bytes: Vec<u8>) -> Result<(), SlateError> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| SlateError::Font(format!("failed to parse font '{family}': {e}")))?;

        let data = FontData {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
            bytes,
        };
        self.fonts.insert(FontKey::new(family, style), data);
        Ok(())
    }

    /// Font bytes for embedding, `None` for heuristic/builtin faces.
    pub fn font_bytes(&self, key: &FontKey) -> Option<&[u8]> {
        self.fonts
            .get(key)
            .filter(|d| !d.bytes.is_empty())
            .map(|d| d.bytes.as_slice())
    }

    /// Measure a string at `font_size` points, result in points.
    ///
    /// With real font bytes we sum glyph advances; otherwise the average
    /// character width heuristic (0.5 × size, bold ~10 % wider) applies.
    pub fn text_width_pt(&self, text: &str, key: &FontKey, font_size: f32) -> f32 {
        let Some(data) = self.fonts.get(key).filter(|d| !d.bytes.is_empty()) else {
            let avg = if key.bold { 0.55 } else { 0.5 };
            return text.chars().count() as f32 * font_size * avg;
        };

        if let Ok(face) = ttf_parser::Face::parse(&data.bytes, 0) {
            let scale = font_size / data.units_per_em;
            let mut width = 0.0f32;
            for ch in text.chars() {
                match face.glyph_index(ch) {
                    Some(gid) => {
                        width += face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale;
                    }
                    // Missing glyph
                    None => width += font_size * 0.5,
                }
            }
            width
        } else {
            text.chars().count() as f32 * font_size * 0.5
        }
    }

    /// Measure a string at `font_size` points, result in document units (mm).
    pub fn text_width_mm(&self, text: &str, key: &FontKey, font_size: f32) -> f32 {
        self.text_width_pt(text, key, font_size) * PT_TO_MM
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}
