//! The fill pipeline
//!
//! load → scan and extract → collect values → replace images →
//! reconstruct pages → save. Only unreadable input, I/O failures and bad
//! options stop a run; everything else becomes a [`Warning`] in the
//! [`RunReport`].

mod collect;
mod extract;
mod io;
mod reconstruct;
mod replace;

pub use collect::collect;
pub use extract::{extract, extract_from_layouts};
pub use io::{load_pdf, save_pdf, write_pdf};
pub use reconstruct::reconstruct;
pub use replace::{SubstitutionTable, replace};

use crate::layout::scan_document;
use crate::markers::Markers;
use crate::options::TemplateOptions;
use crate::source::{ImageSource, ValueSource};
use crate::types::*;
use lopdf::Document;
use std::path::Path;

/// Outcome of a fill run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Markers found in the template, first-seen order
    pub markers: Markers,
    pub substitutions: SubstitutionTable,
    /// Every skipped or degraded item
    pub warnings: Vec<Warning>,
}

impl RunReport {
    /// Number of images that were actually replaced
    pub fn replaced_images(&self) -> usize {
        self.substitutions.values().filter(|p| p.is_some()).count()
    }
}

/// Fill the template at `input` and write the result to `output`.
pub async fn run(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    values: &mut dyn ValueSource,
    images: &mut dyn ImageSource,
    options: &TemplateOptions,
) -> Result<RunReport> {
    options.validate()?;

    let mut doc = load_pdf(input).await?;
    let (filled, report) = fill_document(&mut doc, values, images, options)?;
    drop(doc);
    save_pdf(filled, output).await?;

    Ok(report)
}

/// In-memory part of [`run`].
///
/// `doc` receives the image substitutions; the returned document is the
/// filled output.
pub fn fill_document(
    doc: &mut Document,
    values: &mut dyn ValueSource,
    images: &mut dyn ImageSource,
    options: &TemplateOptions,
) -> Result<(Document, RunReport)> {
    options.validate()?;

    let layouts = scan_document(doc)?;
    let (markers, image_refs) = extract_from_layouts(&layouts);
    let table = collect(&markers, values);
    let (substitutions, mut warnings) = replace(doc, &image_refs, images, options);
    let (filled, reconstruct_warnings) = reconstruct(doc, &layouts, &table, &markers, options)?;
    warnings.extend(reconstruct_warnings);

    Ok((
        filled,
        RunReport {
            markers,
            substitutions,
            warnings,
        },
    ))
}
