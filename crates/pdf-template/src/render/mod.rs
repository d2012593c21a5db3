//! PDF writing for reconstructed pages
//!
//! - Copying image XObjects into the output document, and turning inline
//!   images into XObjects
//! - Building output pages and the page tree
//! - Wrapping and encoding replacement text

mod page;
mod text;
mod xobject;

pub use page::{OutputDocument, PageBuilder};
pub use text::{PlacedLine, TextLayout, encode_win_ansi, layout_text, text_width, wrap_lines};
pub use xobject::{CopyCache, copy_image_xobject, copy_object_deep, inline_image_xobject};
