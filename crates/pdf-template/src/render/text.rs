//! Fitting replacement text into a block's box
//!
//! Output text is set in Helvetica with a fixed size. Widths are estimated
//! with an average character width.

use crate::constants::{FONT_ASCENT_RATIO, FONT_DESCENT_RATIO, HELVETICA_CHAR_WIDTH_RATIO};
use crate::types::Rect;

/// Slack for comparisons against box edges computed in floating point
const FIT_TOLERANCE_PT: f32 = 0.01;

/// One output line and its baseline origin
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// Lines that fit the box, plus how many had to be dropped
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayout {
    pub lines: Vec<PlacedLine>,
    pub dropped: usize,
}

/// Estimated advance of `text` set at `font_size`
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * HELVETICA_CHAR_WIDTH_RATIO
}

/// Break `text` into lines no wider than `max_width`.
///
/// Explicit newlines always break. Words are kept whole: a word wider than
/// the box gets a line of its own. Blank input lines are preserved.
pub fn wrap_lines(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", current, word);
            if text_width(&candidate, font_size) <= max_width + FIT_TOLERANCE_PT {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        lines.push(current);
    }

    lines
}

/// Position wrapped lines top-down inside `rect`.
///
/// The first baseline sits one ascent below the top edge, so text of the
/// output size lands where the template had it. The first line is always
/// kept; later lines whose descent would cross the bottom edge are dropped.
pub fn layout_text(text: &str, rect: &Rect, font_size: f32, line_height: f32) -> TextLayout {
    let wrapped = wrap_lines(text, rect.width(), font_size);
    let first_baseline = rect.y1 - font_size * FONT_ASCENT_RATIO;
    let descent = font_size * FONT_DESCENT_RATIO;

    let mut layout = TextLayout::default();
    for (i, line) in wrapped.into_iter().enumerate() {
        let baseline = first_baseline - i as f32 * line_height;
        if i > 0 && baseline - descent < rect.y0 - FIT_TOLERANCE_PT {
            layout.dropped += 1;
            continue;
        }
        layout.lines.push(PlacedLine {
            x: rect.x0,
            y: baseline,
            text: line,
        });
    }
    layout
}

/// Encode text for a simple font with `/WinAnsiEncoding`.
///
/// Characters outside the encoding become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            _ => win_ansi_high(c).unwrap_or(b'?'),
        })
        .collect()
}

/// Codes 0x80..=0x9F, where WinAnsi departs from Latin-1
fn win_ansi_high(c: char) -> Option<u8> {
    let code = match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(code)
}
