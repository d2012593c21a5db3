//! Page layout scanning
//!
//! This module turns page content streams into geometry:
//! - Text blocks with bounding boxes and decoded text
//! - Placement rectangles of embedded images, including those drawn by forms
//! - Inline images and the Form XObjects that had to be left out
//! - Page geometry (MediaBox, rotation)

mod fonts;
mod matrix;
pub(crate) mod resources;
mod scan;
mod types;

pub use matrix::Matrix;
pub use scan::{scan_document, scan_page};
pub(crate) use scan::is_image;
pub use types::*;
