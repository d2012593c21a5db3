//! Swapping embedded images for user-supplied raster files

use crate::layout::ImageRef;
use crate::options::TemplateOptions;
use crate::raster::{encode_replacement, extract_image};
use crate::source::{ImageDecision, ImageSource};
use crate::types::{ItemError, Subject, Warning, push_warning};
use lopdf::{Document, Object};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// `(page index, image ordinal)` → replacement file, `None` when the
/// original was kept
pub type SubstitutionTable = BTreeMap<(usize, usize), Option<PathBuf>>;

/// Offer each image to `source` and overwrite the ones it replaces.
///
/// A replacement is resized to the original's pixel dimensions and
/// written over the original image stream, so every placement of that
/// image shows the new picture at the old rectangle. Failures leave the
/// original untouched and are reported as warnings.
pub fn replace(
    doc: &mut Document,
    images: &[ImageRef],
    source: &mut dyn ImageSource,
    options: &TemplateOptions,
) -> (SubstitutionTable, Vec<Warning>) {
    let mut substitutions = SubstitutionTable::new();
    let mut warnings = Vec::new();

    for image in images {
        let key = (image.page_index, image.ordinal);
        let path = match source.decide(image.ordinal, image) {
            ImageDecision::Keep => {
                substitutions.insert(key, None);
                continue;
            }
            ImageDecision::Replace(path) => path,
        };

        match replace_one(doc, image, &path, options) {
            Ok(()) => {
                log::info!(
                    "Replaced image {} on page {} with {}",
                    image.ordinal + 1,
                    image.page_index + 1,
                    path.display()
                );
                substitutions.insert(key, Some(path));
            }
            Err(error) => {
                push_warning(
                    &mut warnings,
                    Warning {
                        page: image.page_index,
                        subject: Subject::Image {
                            ordinal: image.ordinal,
                            name: image.name.clone(),
                        },
                        error,
                    },
                );
                substitutions.insert(key, None);
            }
        }
    }

    (substitutions, warnings)
}

fn replace_one(
    doc: &mut Document,
    image: &ImageRef,
    path: &std::path::Path,
    options: &TemplateOptions,
) -> Result<(), ItemError> {
    let original = extract_image(doc, image.object_id)?;
    if image.rect.is_none() {
        return Err(ItemError::PlacementLookup);
    }
    let stream = encode_replacement(path, image.width, image.height, original.format, options)?;
    doc.objects.insert(image.object_id, Object::Stream(stream));
    Ok(())
}
