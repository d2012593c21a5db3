//! Layout data types
//!
//! These types describe what the scanner found on a page: where text
//! blocks sit, and where each embedded image is drawn.

use crate::types::Rect;
use lopdf::{ObjectId, Stream};

/// A contiguous run of text with its bounding box.
///
/// One block is produced per `BT … ET` text object. Lines inside a block are
/// joined with `\n`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub rect: Rect,
    pub text: String,
}

/// An embedded raster image referenced by a page
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    /// Zero-based index of the page that references the image
    pub page_index: usize,
    /// Position in the page's own image list
    pub ordinal: usize,
    /// Resource name under the page's `/XObject` dictionary
    pub name: String,
    /// Cross-reference handle of the image stream
    pub object_id: ObjectId,
    /// Pixel width from the image dictionary
    pub width: u32,
    /// Pixel height from the image dictionary
    pub height: u32,
    /// Where the page content draws the image, if it draws it at all
    pub rect: Option<Rect>,
}

/// An image embedded in the content stream with `BI … ID … EI`
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    /// Position among the page's inline images
    pub ordinal: usize,
    pub rect: Option<Rect>,
    /// Image parameters as written (abbreviated keys) and the raw data
    pub stream: Stream,
}

/// A Form XObject whose content could not be interpreted
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedForm {
    pub name: String,
    pub reason: String,
}

/// Everything the scanner knows about one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Zero-based page index
    pub index: usize,
    pub page_id: ObjectId,
    /// MediaBox as `(x0, y0, x1, y1)`
    pub media_box: Rect,
    /// `/Rotate` value, when the page sets one
    pub rotate: Option<i64>,
    pub blocks: Vec<TextBlock>,
    pub images: Vec<ImageRef>,
    pub inline_images: Vec<InlineImage>,
    /// Forms left out of the scan; their content is missing from `blocks`
    pub skipped_forms: Vec<SkippedForm>,
}

impl PageLayout {
    pub fn width(&self) -> f32 {
        self.media_box.width()
    }

    pub fn height(&self) -> f32 {
        self.media_box.height()
    }
}
