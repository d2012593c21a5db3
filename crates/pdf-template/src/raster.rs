//! Embedded image extraction and replacement encoding
//!
//! Images never touch the filesystem: extracted data and replacements are
//! kept in memory buffers.

use crate::layout::is_image;
use crate::layout::resources::{dict_integer, name_list, resolve, resolve_dict};
use crate::options::TemplateOptions;
use crate::types::ItemError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, ImageReader, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Cursor;
use std::path::Path;

type ItemResult<T> = std::result::Result<T, ItemError>;

/// Encoding of extracted image bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// DCT-encoded data, passed through untouched
    Jpeg,
    /// JPEG 2000 data, passed through untouched
    Jpx,
    /// Raw samples re-encoded as PNG
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Jpx => "jpx",
            ImageFormat::Png => "png",
        }
    }
}

/// Encoded bytes of an embedded image
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

// =============================================================================
// Extraction
// =============================================================================

/// Extract an embedded image by its cross-reference handle.
///
/// JPEG and JPEG 2000 streams are returned as stored. Other images are
/// decoded to samples and re-encoded as PNG. Supported layouts are 8-bit
/// gray, RGB and CMYK (16-bit samples are reduced to 8), 1-bit gray, and
/// palette images over those spaces.
pub fn extract_image(doc: &Document, object_id: ObjectId) -> ItemResult<ExtractedImage> {
    let stream = image_stream(doc, object_id)?;

    let filters = name_list(doc, &stream.dict, b"Filter");
    let passthrough = match filters.as_slice() {
        [only] if only == b"DCTDecode" => Some(ImageFormat::Jpeg),
        [only] if only == b"JPXDecode" => Some(ImageFormat::Jpx),
        _ => None,
    };
    if let Some(format) = passthrough {
        return Ok(ExtractedImage {
            bytes: stream.content.clone(),
            format,
        });
    }

    if let Some(unsupported) = filters.iter().find(|f| is_image_codec(f)) {
        return Err(ItemError::Extraction(format!(
            "unsupported image filter chain ending in /{}",
            String::from_utf8_lossy(unsupported)
        )));
    }

    let samples = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .map_err(|e| ItemError::Extraction(format!("cannot decompress samples: {}", e)))?
    };

    let decoded = decode_samples(doc, &stream.dict, samples)?;
    let mut bytes = Vec::new();
    decoded.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;

    Ok(ExtractedImage {
        bytes,
        format: ImageFormat::Png,
    })
}

/// Check that an image XObject can be carried over as stored: the handle
/// resolves to an image stream and its data covers the declared size.
///
/// Only the generic stream filters are undone, so palettes, spot colors,
/// 16-bit samples and fax or JBIG2 data all pass.
pub(crate) fn check_image_data(doc: &Document, object_id: ObjectId) -> ItemResult<()> {
    let stream = image_stream(doc, object_id)?;

    let filters = name_list(doc, &stream.dict, b"Filter");
    if filters.iter().any(|f| is_image_codec(f)) {
        if stream.content.is_empty() {
            return Err(ItemError::Extraction("image stream is empty".to_string()));
        }
        return Ok(());
    }

    let data_len = if filters.is_empty() {
        stream.content.len()
    } else {
        stream
            .decompressed_content()
            .map_err(|e| ItemError::Extraction(format!("cannot decompress samples: {}", e)))?
            .len()
    };

    let Some(model) = color_model(doc, &stream.dict) else {
        log::debug!(
            "Image {:?} has a color space of unknown width, not checking its size",
            object_id
        );
        return Ok(());
    };
    let (width, height) = image_dimensions(doc, &stream.dict)?;
    let bits = bits_per_component(doc, &stream.dict);
    let expected = row_stride(width, model.samples_per_pixel(), bits)
        .and_then(|stride| stride.checked_mul(height as usize))
        .ok_or_else(too_large)?;
    if data_len < expected {
        return Err(truncated());
    }
    Ok(())
}

fn image_stream(doc: &Document, object_id: ObjectId) -> ItemResult<&Stream> {
    let stream = doc
        .get_object(object_id)
        .and_then(Object::as_stream)
        .map_err(|e| ItemError::Extraction(format!("object {:?}: {}", object_id, e)))?;

    if !is_image(&stream.dict) {
        return Err(ItemError::Extraction(format!(
            "object {:?} is not an image XObject",
            object_id
        )));
    }
    Ok(stream)
}

fn is_image_codec(filter: &[u8]) -> bool {
    matches!(
        filter,
        b"DCTDecode" | b"JPXDecode" | b"JBIG2Decode" | b"CCITTFaxDecode"
    )
}

fn truncated() -> ItemError {
    ItemError::Extraction("image data is shorter than its dimensions".to_string())
}

fn too_large() -> ItemError {
    ItemError::Extraction("image dimensions are too large".to_string())
}

// =============================================================================
// Color Spaces
// =============================================================================

/// How samples map to colors
#[derive(Debug, Clone, PartialEq)]
enum ColorModel {
    /// Gray, RGB or CMYK family with this many components
    Components(usize),
    /// Separation, DeviceN or Lab: the sample count is known, the colors
    /// are not converted
    Special(usize),
    /// One palette index per pixel, each entry `base` bytes wide
    Indexed { base: usize, palette: Vec<u8> },
}

impl ColorModel {
    fn samples_per_pixel(&self) -> usize {
        match self {
            ColorModel::Components(n) | ColorModel::Special(n) => *n,
            ColorModel::Indexed { .. } => 1,
        }
    }
}

fn color_model(doc: &Document, dict: &Dictionary) -> Option<ColorModel> {
    if matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true))) {
        return Some(ColorModel::Components(1));
    }

    let space = dict.get(b"ColorSpace").ok().and_then(|obj| resolve(doc, obj))?;
    if let Object::Array(items) = space {
        let indexed = matches!(
            items.first().and_then(|obj| resolve(doc, obj)),
            Some(Object::Name(n)) if n == b"Indexed" || n == b"I"
        );
        if indexed {
            let base = match items.get(1).and_then(|obj| resolve(doc, obj)) {
                Some(base) => space_model(doc, base)?,
                None => return None,
            };
            let ColorModel::Components(base) = base else {
                return Some(ColorModel::Special(1));
            };
            let palette = match items.get(3).and_then(|obj| resolve(doc, obj))? {
                Object::String(bytes, _) => bytes.clone(),
                Object::Stream(stream) => stream.get_plain_content().ok()?,
                _ => return None,
            };
            return Some(ColorModel::Indexed { base, palette });
        }
    }
    space_model(doc, space)
}

/// Model of a non-indexed color space
fn space_model(doc: &Document, space: &Object) -> Option<ColorModel> {
    match space {
        Object::Name(name) => components_for_family(name).map(ColorModel::Components),
        Object::Array(items) => {
            let family = match items.first().and_then(|obj| resolve(doc, obj)) {
                Some(Object::Name(name)) => name,
                _ => return None,
            };
            match family.as_slice() {
                b"ICCBased" => items
                    .get(1)
                    .and_then(|obj| resolve_dict(doc, obj))
                    .and_then(|icc| dict_integer(doc, icc, b"N"))
                    .and_then(|n| usize::try_from(n).ok())
                    .map(ColorModel::Components),
                b"Separation" => Some(ColorModel::Special(1)),
                b"DeviceN" => items
                    .get(1)
                    .and_then(|obj| resolve(doc, obj))
                    .and_then(|obj| obj.as_array().ok())
                    .map(|names| ColorModel::Special(names.len())),
                b"Lab" => Some(ColorModel::Special(3)),
                other => components_for_family(other).map(ColorModel::Components),
            }
        }
        _ => None,
    }
}

fn components_for_family(name: &[u8]) -> Option<usize> {
    match name {
        b"DeviceGray" | b"CalGray" | b"G" => Some(1),
        b"DeviceRGB" | b"CalRGB" | b"RGB" => Some(3),
        b"DeviceCMYK" | b"CMYK" => Some(4),
        _ => None,
    }
}

// =============================================================================
// Sample Decoding
// =============================================================================

fn image_dimensions(doc: &Document, dict: &Dictionary) -> ItemResult<(u32, u32)> {
    let width = dict_integer(doc, dict, b"Width").unwrap_or(0);
    let height = dict_integer(doc, dict, b"Height").unwrap_or(0);
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(ItemError::Extraction(format!(
            "invalid image dimensions {}x{}",
            width, height
        ))),
    }
}

fn bits_per_component(doc: &Document, dict: &Dictionary) -> i64 {
    if matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true))) {
        1
    } else {
        dict_integer(doc, dict, b"BitsPerComponent").unwrap_or(8)
    }
}

/// Bytes per row of `width` pixels with `samples` samples of `bits` each
fn row_stride(width: u32, samples: usize, bits: i64) -> Option<usize> {
    let bits = usize::try_from(bits).ok()?;
    (width as usize)
        .checked_mul(samples)?
        .checked_mul(bits)
        .map(|total| total.div_ceil(8))
}

fn decode_samples(doc: &Document, dict: &Dictionary, samples: Vec<u8>) -> ItemResult<DynamicImage> {
    let (width, height) = image_dimensions(doc, dict)?;
    let mut bits = bits_per_component(doc, dict);
    let model = color_model(doc, dict)
        .ok_or_else(|| ItemError::Extraction("unsupported color space".to_string()))?;
    let pixels = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(too_large)?;

    let (components, mut samples) = match model {
        ColorModel::Components(n) => (n, samples),
        ColorModel::Special(_) => {
            return Err(ItemError::Extraction("unsupported color space".to_string()));
        }
        ColorModel::Indexed { base, palette } => {
            let expanded = expand_indexed(&samples, width, height, bits, base, &palette)?;
            bits = 8;
            (base, expanded)
        }
    };
    if bits == 16 {
        // Keep the high byte of each big-endian sample
        samples = samples.chunks_exact(2).map(|pair| pair[0]).collect();
        bits = 8;
    }

    let take = |n: usize| -> ItemResult<Vec<u8>> {
        let len = pixels.checked_mul(n).ok_or_else(too_large)?;
        samples.get(..len).map(<[u8]>::to_vec).ok_or_else(truncated)
    };

    match (components, bits) {
        (1, 8) => GrayImage::from_raw(width, height, take(1)?)
            .map(DynamicImage::ImageLuma8)
            .ok_or_else(truncated),
        (1, 1) => {
            let stride = (width as usize).div_ceil(8);
            let len = stride.checked_mul(height as usize).ok_or_else(too_large)?;
            let rows = samples.get(..len).ok_or_else(truncated)?;
            let data = rows
                .chunks(stride)
                .flat_map(|row| {
                    (0..width as usize).map(move |x| {
                        if row[x / 8] & (0x80 >> (x % 8)) != 0 { 255 } else { 0 }
                    })
                })
                .collect();
            GrayImage::from_raw(width, height, data)
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(truncated)
        }
        (3, 8) => RgbImage::from_raw(width, height, take(3)?)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(truncated),
        (4, 8) => {
            let data = take(4)?
                .chunks_exact(4)
                .flat_map(|cmyk| {
                    let k = 255 - cmyk[3] as u16;
                    [0, 1, 2].map(|i| ((255 - cmyk[i] as u16) * k / 255) as u8)
                })
                .collect();
            RgbImage::from_raw(width, height, data)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(truncated)
        }
        (components, bits) => Err(ItemError::Extraction(format!(
            "unsupported sample layout: {} component(s) at {} bit(s)",
            components, bits
        ))),
    }
}

/// Replace palette indices by their palette entries
fn expand_indexed(
    samples: &[u8],
    width: u32,
    height: u32,
    bits: i64,
    base: usize,
    palette: &[u8],
) -> ItemResult<Vec<u8>> {
    let depth: usize = match bits {
        1 | 2 | 4 | 8 => bits as usize,
        _ => {
            return Err(ItemError::Extraction(format!(
                "unsupported palette index depth {}",
                bits
            )));
        }
    };
    let stride = row_stride(width, 1, bits).ok_or_else(too_large)?;
    let len = stride.checked_mul(height as usize).ok_or_else(too_large)?;
    let rows = samples.get(..len).ok_or_else(truncated)?;
    let mask = ((1u16 << depth) - 1) as u8;

    let mut expanded = Vec::with_capacity(rows.len() * 8 / depth * base);
    for row in rows.chunks(stride) {
        for x in 0..width as usize {
            let bit = x * depth;
            let index = (row[bit / 8] >> (8 - depth - bit % 8)) & mask;
            let start = index as usize * base;
            let color = palette.get(start..start + base).ok_or_else(|| {
                ItemError::Extraction(format!("palette index {} out of range", index))
            })?;
            expanded.extend_from_slice(color);
        }
    }
    Ok(expanded)
}

// =============================================================================
// Replacement
// =============================================================================

/// Build a new image XObject stream from a raster file.
///
/// The image is resized to exactly `width`×`height` pixels without aspect
/// correction. JPEG originals are replaced by JPEG data, everything else by
/// Flate-compressed 8-bit RGB samples.
pub(crate) fn encode_replacement(
    path: &Path,
    width: u32,
    height: u32,
    original: ImageFormat,
    options: &TemplateOptions,
) -> ItemResult<Stream> {
    if !path.exists() {
        return Err(ItemError::MissingResource(path.to_path_buf()));
    }

    let decoded = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(image::ImageError::IoError)?
        .decode()?;
    let resized = decoded
        .resize_exact(width.max(1), height.max(1), options.resize_filter.into())
        .to_rgb8();

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(resized.width() as i64));
    dict.set("Height", Object::Integer(resized.height() as i64));
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));

    if original == ImageFormat::Jpeg {
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, options.jpeg_quality).encode_image(&resized)?;
        dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
        return Ok(Stream::new(dict, bytes).with_compression(false));
    }

    let mut stream = Stream::new(dict, resized.into_raw());
    if let Err(e) = stream.compress() {
        log::debug!("Keeping replacement samples uncompressed: {}", e);
    }
    Ok(stream)
}
