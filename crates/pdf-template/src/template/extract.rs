//! Placeholder and image discovery

use crate::layout::{ImageRef, PageLayout, scan_document};
use crate::markers::Markers;
use crate::types::Result;
use lopdf::Document;

/// Find every marker and every embedded image of a template.
///
/// Markers come back deduplicated in first-seen order (pages, then text
/// blocks). Images come back in page order and, within a page, in the
/// order of the page's image resources. The document is not modified.
pub fn extract(doc: &Document) -> Result<(Markers, Vec<ImageRef>)> {
    let layouts = scan_document(doc)?;
    Ok(extract_from_layouts(&layouts))
}

/// [`extract`] over pages that were already scanned
pub fn extract_from_layouts(layouts: &[PageLayout]) -> (Markers, Vec<ImageRef>) {
    let mut markers = Markers::new();
    let mut images = Vec::new();

    for layout in layouts {
        for block in &layout.blocks {
            markers.scan(&block.text);
        }
        images.extend(layout.images.iter().cloned());
    }

    log::info!(
        "Found {} marker(s) and {} image(s) on {} page(s)",
        markers.len(),
        images.len(),
        layouts.len()
    );
    (markers, images)
}
