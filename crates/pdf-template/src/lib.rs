mod constants;
pub mod layout;
mod markers;
mod options;
mod raster;
pub mod render;
mod source;
mod stats;
pub mod template;
mod types;

pub use markers::{Markers, ReplacementTable, find_markers, substitute};
pub use options::*;
pub use raster::{ExtractedImage, ImageFormat, extract_image};
pub use source::{ImageDecision, ImageSource, KeepImages, ValueMap, ValueSource};
pub use stats::{TemplateStatistics, inspect};
pub use template::{
    RunReport, SubstitutionTable, collect, extract, fill_document, load_pdf, reconstruct,
    replace, run, save_pdf,
};
pub use types::*;
