//! Page dictionary lookups: inherited attributes, resources, numbers.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::Rect;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Guards against cyclic `/Parent` chains in malformed page trees
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Extract numeric value from a PDF object
pub(crate) fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Follow a reference to the object it points at
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

pub(crate) fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Look up a page attribute, walking up the page tree for inheritable keys
pub(crate) fn inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value);
        }
        let parent = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Page MediaBox, falling back to US Letter when missing or malformed
pub(crate) fn page_media_box(doc: &Document, page_id: ObjectId) -> Rect {
    let values: Option<Vec<f32>> = inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| obj.as_array().ok())
        .map(|arr| {
            arr.iter()
                .filter_map(|item| resolve(doc, item).and_then(extract_number))
                .collect()
        });

    match values.as_deref() {
        Some([x0, y0, x1, y1]) => {
            Rect::new(x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1))
        }
        _ => {
            log::debug!("Page {:?} has no usable MediaBox, using US Letter", page_id);
            Rect::new(0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1)
        }
    }
}

pub(crate) fn page_rotate(doc: &Document, page_id: ObjectId) -> Option<i64> {
    inherited(doc, page_id, b"Rotate").and_then(|obj| obj.as_i64().ok())
}

pub(crate) fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    inherited(doc, page_id, b"Resources").and_then(|obj| resolve_dict(doc, obj))
}

/// Names listed under a key that may hold a single name or an array of names
/// (e.g. `/Filter`)
pub(crate) fn name_list(doc: &Document, dict: &Dictionary, key: &[u8]) -> Vec<Vec<u8>> {
    match dict.get(key).ok().and_then(|obj| resolve(doc, obj)) {
        Some(Object::Name(name)) => vec![name.clone()],
        Some(Object::Array(items)) => items
            .iter()
            .filter_map(|item| match resolve(doc, item) {
                Some(Object::Name(name)) => Some(name.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Integer entry of a dictionary, following references
pub(crate) fn dict_integer(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<i64> {
    dict.get(key)
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_i64().ok())
}
