use crate::layout::scan_document;
use crate::template::extract_from_layouts;
use crate::types::*;
use lopdf::Document;

/// What a template contains, for `pdft inspect`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemplateStatistics {
    pub pages: usize,
    pub text_blocks: usize,
    /// Distinct marker names, first-seen order
    pub markers: Vec<String>,
    /// Images listed in page resources, counted once per page
    pub images: usize,
    /// Images the page content actually draws
    pub placed_images: usize,
}

/// Inspect a template without modifying it
pub fn inspect(doc: &Document) -> Result<TemplateStatistics> {
    let layouts = scan_document(doc)?;
    let (markers, images) = extract_from_layouts(&layouts);

    Ok(TemplateStatistics {
        pages: layouts.len(),
        text_blocks: layouts.iter().map(|page| page.blocks.len()).sum(),
        markers: markers.as_slice().to_vec(),
        images: images.len(),
        placed_images: images.iter().filter(|image| image.rect.is_some()).count(),
    })
}
