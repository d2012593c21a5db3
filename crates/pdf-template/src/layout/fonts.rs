//! Font handling for the layout scanner: string decoding and glyph advances.

use super::resources::{dict_integer, extract_number, resolve, resolve_dict};
use crate::constants::{GLYPH_SPACE_UNITS, HELVETICA_CHAR_WIDTH_RATIO};
use lopdf::{Dictionary, Document, Object};

/// Glyph advance table for one font resource
#[derive(Debug, Clone)]
pub(crate) struct FontMetrics {
    first_char: u32,
    /// Advances in text space units per unit of font size
    widths: Vec<f32>,
    missing_width: f32,
    two_byte: bool,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            first_char: 0,
            widths: Vec::new(),
            missing_width: HELVETICA_CHAR_WIDTH_RATIO,
            two_byte: false,
        }
    }
}

impl FontMetrics {
    pub(crate) fn from_dict(doc: &Document, font: &Dictionary) -> Self {
        let two_byte = matches!(font.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Type0");

        if two_byte {
            // Composite fonts: only the descendant default width is honoured
            let default_width = font
                .get(b"DescendantFonts")
                .ok()
                .and_then(|obj| resolve(doc, obj))
                .and_then(|obj| obj.as_array().ok())
                .and_then(|fonts| fonts.first())
                .and_then(|obj| resolve_dict(doc, obj))
                .and_then(|desc| dict_integer(doc, desc, b"DW"))
                .map(|dw| dw as f32 / GLYPH_SPACE_UNITS)
                .unwrap_or(1.0);
            return Self {
                missing_width: default_width,
                two_byte,
                ..Self::default()
            };
        }

        let first_char = dict_integer(doc, font, b"FirstChar").unwrap_or(0).max(0) as u32;
        let widths = font
            .get(b"Widths")
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| {
                        resolve(doc, w)
                            .and_then(extract_number)
                            .unwrap_or(0.0)
                            / GLYPH_SPACE_UNITS
                    })
                    .collect()
            })
            .unwrap_or_default();
        let missing_width = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|obj| resolve_dict(doc, obj))
            .and_then(|desc| desc.get(b"MissingWidth").ok())
            .and_then(extract_number)
            .filter(|w| *w > 0.0)
            .map(|w| w / GLYPH_SPACE_UNITS)
            .unwrap_or(HELVETICA_CHAR_WIDTH_RATIO);

        Self {
            first_char,
            widths,
            missing_width,
            two_byte,
        }
    }

    /// Character codes in a shown string
    pub(crate) fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|pair| pair.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32))
                .collect()
        } else {
            bytes.iter().map(|b| *b as u32).collect()
        }
    }

    /// Advance of one code, per unit of font size
    pub(crate) fn width(&self, code: u32) -> f32 {
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(self.missing_width)
    }

    /// Word spacing applies to the single-byte code 32 only
    pub(crate) fn is_word_space(&self, code: u32) -> bool {
        !self.two_byte && code == 32
    }
}

/// Decode a shown string to Unicode using the font's encoding, falling back
/// to a plain byte decoder.
pub(crate) fn decode_string(doc: &Document, font: Option<&Dictionary>, bytes: &[u8]) -> String {
    if let Some(font) = font {
        if let Ok(encoding) = font.get_font_encoding(doc) {
            if let Ok(text) = Document::decode_text(&encoding, bytes) {
                return text;
            }
        }
    }
    decode_text_simple(bytes)
}

/// UTF-16BE when the string carries a byte order mark, Latin-1 otherwise
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}
