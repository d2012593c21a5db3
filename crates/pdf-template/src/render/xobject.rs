//! Copying image XObjects from the template into the output document

use crate::types::{ItemError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Source object id → id of its copy in the output document
pub type CopyCache = HashMap<ObjectId, ObjectId>;

/// Copy an image XObject (and everything it references, such as an
/// `/SMask` or an indexed palette) into `output`.
///
/// Stream bytes are copied verbatim, so the encoded image data in the output
/// is identical to the input's. An image shared by several pages is copied
/// once.
pub fn copy_image_xobject(
    output: &mut Document,
    source: &Document,
    object_id: ObjectId,
    cache: &mut CopyCache,
) -> Result<ObjectId> {
    copy_reference(output, source, object_id, cache)
}

fn copy_reference(
    output: &mut Document,
    source: &Document,
    id: ObjectId,
    cache: &mut CopyCache,
) -> Result<ObjectId> {
    if let Some(&new_id) = cache.get(&id) {
        return Ok(new_id);
    }

    // Reserve the id first so reference cycles terminate
    let new_id = output.new_object_id();
    cache.insert(id, new_id);

    let referenced = source.get_object(id)?;
    let copied = copy_object_deep(output, source, referenced, cache)?;
    output.objects.insert(new_id, copied);
    Ok(new_id)
}

/// Deep copy an object from source to output document, following references.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut CopyCache,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => Ok(Object::Reference(copy_reference(
            output, source, *id, cache,
        )?)),
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut CopyCache,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        // Back-references into the page tree would drag the whole source along
        if key.as_slice() == b"Parent" {
            continue;
        }
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

/// Turn an inline image into a standalone image XObject.
///
/// Abbreviated keys and device color space names are spelled out; the
/// sample data is kept as is.
pub fn inline_image_xobject(inline: &Stream) -> std::result::Result<Stream, ItemError> {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));

    for (key, value) in inline.dict.iter() {
        let key = inline_key(key);
        let value = if key == b"ColorSpace" {
            inline_color_space(value)?
        } else {
            value.clone()
        };
        dict.set(key.to_vec(), value);
    }

    for required in [&b"Width"[..], &b"Height"[..]] {
        if dict.get(required).is_err() {
            return Err(ItemError::Extraction(format!(
                "inline image has no /{}",
                String::from_utf8_lossy(required)
            )));
        }
    }

    Ok(Stream::new(dict, inline.content.clone()).with_compression(false))
}

fn inline_key(key: &[u8]) -> &[u8] {
    match key {
        b"W" => &b"Width"[..],
        b"H" => &b"Height"[..],
        b"CS" => &b"ColorSpace"[..],
        b"BPC" => &b"BitsPerComponent"[..],
        b"D" => &b"Decode"[..],
        b"DP" => &b"DecodeParms"[..],
        b"F" => &b"Filter"[..],
        b"IM" => &b"ImageMask"[..],
        b"I" => &b"Interpolate"[..],
        other => other,
    }
}

fn inline_color_space(value: &Object) -> std::result::Result<Object, ItemError> {
    let full: &[u8] = match value {
        Object::Name(name) => match name.as_slice() {
            b"G" | b"Gray" | b"DeviceGray" => &b"DeviceGray"[..],
            b"RGB" | b"DeviceRGB" => &b"DeviceRGB"[..],
            b"CMYK" | b"DeviceCMYK" => &b"DeviceCMYK"[..],
            other => {
                return Err(ItemError::Extraction(format!(
                    "unsupported inline image color space /{}",
                    String::from_utf8_lossy(other)
                )));
            }
        },
        _ => {
            return Err(ItemError::Extraction(
                "inline image color space is not a name".to_string(),
            ));
        }
    };
    Ok(Object::Name(full.to_vec()))
}
