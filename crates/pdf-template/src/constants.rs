//! Shared constants for template filling
//!
//! This module centralizes magic numbers used by the layout scanner and
//! the page reconstructor.

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Font Metrics
// =============================================================================

/// Approximate character width ratio for Helvetica
pub const HELVETICA_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Ascent above the baseline as a fraction of the font size
pub const FONT_ASCENT_RATIO: f32 = 0.8;

/// Descent below the baseline as a fraction of the font size
pub const FONT_DESCENT_RATIO: f32 = 0.2;

/// Glyph widths in font dictionaries are given in thousandths of a unit
pub const GLYPH_SPACE_UNITS: f32 = 1000.0;

// =============================================================================
// Text Layout
// =============================================================================

/// Default font size used when rendering substituted text (points)
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Default line height as a multiple of font size
pub const DEFAULT_LINE_SPACING: f32 = 1.2;

/// Negative TJ adjustment (thousandths of an em) treated as a word gap
pub const TJ_WORD_GAP_THRESHOLD: f32 = 200.0;

/// Horizontal gap between text runs, as a fraction of font size, that
/// inserts a space
pub const RUN_GAP_RATIO: f32 = 0.2;

/// Baseline shift, as a fraction of font size, that starts a new line
pub const LINE_BREAK_RATIO: f32 = 0.5;

/// Deepest chain of nested Form XObjects that is interpreted
pub const MAX_FORM_DEPTH: usize = 16;

/// Resource name of the font used for rendered text
pub const OUTPUT_FONT_NAME: &str = "F1";

// =============================================================================
// Images
// =============================================================================

/// Default JPEG quality for re-encoded replacement images
pub const DEFAULT_JPEG_QUALITY: u8 = 90;
