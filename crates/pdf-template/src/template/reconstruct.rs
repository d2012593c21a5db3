//! Rebuilding pages with substituted text
//!
//! The output document is built from scratch. Each page keeps the input's
//! geometry, gets its images (XObject and inline) copied at their original
//! rectangles, and gets every text block re-set with markers replaced.

use crate::layout::{ImageRef, InlineImage, PageLayout};
use crate::markers::{Markers, ReplacementTable, substitute};
use crate::options::TemplateOptions;
use crate::raster::check_image_data;
use crate::render::{
    CopyCache, OutputDocument, PageBuilder, copy_image_xobject, inline_image_xobject, layout_text,
};
use crate::types::{ItemError, Rect, Result, Subject, Warning, push_warning};
use lopdf::{Document, ObjectId};

/// Build the filled document.
///
/// `layouts` must come from scanning `input`. Images are read from `input`
/// as it is now, so substitutions made beforehand show up in the output.
/// Page count and page dimensions match the input.
pub fn reconstruct(
    input: &Document,
    layouts: &[PageLayout],
    table: &ReplacementTable,
    markers: &Markers,
    options: &TemplateOptions,
) -> Result<(Document, Vec<Warning>)> {
    let mut output = OutputDocument::new();
    let mut cache = CopyCache::new();
    let mut warnings = Vec::new();
    let font_size = options.font_size_pt;
    let line_height = options.line_height_pt();

    for layout in layouts {
        let mut page = PageBuilder::new(layout.media_box, layout.rotate);

        for image in &layout.images {
            match copy_image(&mut output, input, image, &mut cache) {
                Ok((xobject_id, rect)) => page.draw_image(xobject_id, &rect),
                Err(error) => push_warning(
                    &mut warnings,
                    Warning {
                        page: layout.index,
                        subject: Subject::Image {
                            ordinal: image.ordinal,
                            name: image.name.clone(),
                        },
                        error,
                    },
                ),
            }
        }

        for inline in &layout.inline_images {
            match place_inline_image(&mut output, inline) {
                Ok((xobject_id, rect)) => page.draw_image(xobject_id, &rect),
                Err(error) => push_warning(
                    &mut warnings,
                    Warning {
                        page: layout.index,
                        subject: Subject::InlineImage {
                            ordinal: inline.ordinal,
                        },
                        error,
                    },
                ),
            }
        }

        for form in &layout.skipped_forms {
            push_warning(
                &mut warnings,
                Warning {
                    page: layout.index,
                    subject: Subject::Form {
                        name: form.name.clone(),
                    },
                    error: ItemError::FormContent(form.reason.clone()),
                },
            );
        }

        for (ordinal, block) in layout.blocks.iter().enumerate() {
            let subject = Subject::TextBlock { ordinal };
            if block.rect.is_degenerate() {
                push_warning(
                    &mut warnings,
                    Warning {
                        page: layout.index,
                        subject,
                        error: ItemError::DegenerateGeometry(block.rect),
                    },
                );
                continue;
            }

            let text = substitute(&block.text, markers, table);
            let placed = layout_text(&text, &block.rect, font_size, line_height);
            page.draw_text(&placed.lines, font_size);
            if placed.dropped > 0 {
                push_warning(
                    &mut warnings,
                    Warning {
                        page: layout.index,
                        subject,
                        error: ItemError::TextOverflow {
                            dropped: placed.dropped,
                        },
                    },
                );
            }
        }

        output.add_page(page)?;
    }

    log::info!(
        "Reconstructed {} page(s), {} warning(s)",
        output.page_count(),
        warnings.len()
    );
    Ok((output.finish(), warnings))
}

/// Copy one image into the output, returning the copy and where to draw it.
///
/// The stream is copied as stored, so any image the input can show
/// survives, including ones the replacer could not decode.
fn copy_image(
    output: &mut OutputDocument,
    input: &Document,
    image: &ImageRef,
    cache: &mut CopyCache,
) -> std::result::Result<(ObjectId, Rect), ItemError> {
    check_image_data(input, image.object_id)?;
    let rect = image.rect.ok_or(ItemError::PlacementLookup)?;
    if rect.is_degenerate() {
        return Err(ItemError::DegenerateGeometry(rect));
    }
    let xobject_id = copy_image_xobject(output.document_mut(), input, image.object_id, cache)
        .map_err(|e| ItemError::Extraction(e.to_string()))?;
    Ok((xobject_id, rect))
}

fn place_inline_image(
    output: &mut OutputDocument,
    inline: &InlineImage,
) -> std::result::Result<(ObjectId, Rect), ItemError> {
    let rect = inline.rect.ok_or(ItemError::PlacementLookup)?;
    if rect.is_degenerate() {
        return Err(ItemError::DegenerateGeometry(rect));
    }
    let stream = inline_image_xobject(&inline.stream)?;
    Ok((output.document_mut().add_object(stream), rect))
}
