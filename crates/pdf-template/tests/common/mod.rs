//! In-memory template PDFs for the integration tests

#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::path::{Path, PathBuf};

/// One template page: raw content stream plus image resources
pub struct TestPage {
    pub content: String,
    pub images: Vec<(&'static str, ObjectId)>,
    pub media_box: (i64, i64),
}

impl TestPage {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            images: Vec::new(),
            media_box: (612, 792),
        }
    }

    pub fn with_image(mut self, name: &'static str, id: ObjectId) -> Self {
        self.images.push((name, id));
        self
    }

    pub fn with_media_box(mut self, width: i64, height: i64) -> Self {
        self.media_box = (width, height);
        self
    }
}

/// A document whose pages share one Helvetica font named `/F1`
pub fn create_test_pdf(doc: &mut Document, pages: Vec<TestPage>) {
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for page in pages {
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            page.content.into_bytes(),
        ));

        let mut xobjects = Dictionary::new();
        for (name, id) in &page.images {
            xobjects.set(*name, Object::Reference(*id));
        }

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(page.media_box.0),
                    Object::Integer(page.media_box.1),
                ]),
            ),
            (
                "Resources",
                Object::Dictionary(dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                    "XObject" => xobjects,
                }),
            ),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
        ])),
    );

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);
}

/// Build a document from page descriptions that need no images
pub fn text_pdf<S: AsRef<str>>(contents: &[S]) -> Document {
    let mut doc = Document::with_version("1.7");
    create_test_pdf(
        &mut doc,
        contents.iter().map(|c| TestPage::new(c.as_ref())).collect(),
    );
    doc
}

/// Content that shows `text` at `(x, y)` in 12pt
pub fn show_text(x: f32, y: f32, text: &str) -> String {
    format!("BT /F1 12 Tf {} {} Td ({}) Tj ET\n", x, y, text)
}

/// Content that draws image `name` into the given rectangle
pub fn draw_image(name: &str, x: f32, y: f32, width: f32, height: f32) -> String {
    format!("q {} 0 0 {} {} {} cm /{} Do Q\n", width, height, x, y, name)
}

/// Add an uncompressed 8-bit RGB image filled with one color
pub fn add_rgb_image(doc: &mut Document, width: u32, height: u32, color: [u8; 3]) -> ObjectId {
    let samples: Vec<u8> = (0..width * height).flat_map(|_| color).collect();
    doc.add_object(
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
            },
            samples,
        )
        .with_compression(false),
    )
}

/// Add a DCT-encoded image filled with one color
pub fn add_jpeg_image(doc: &mut Document, width: u32, height: u32, color: [u8; 3]) -> ObjectId {
    let image = RgbImage::from_pixel(width, height, Rgb(color));
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 90)
        .encode_image(&image)
        .unwrap();
    doc.add_object(
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
                "Filter" => "DCTDecode",
            },
            bytes,
        )
        .with_compression(false),
    )
}

/// Add an image XObject whose data cannot be decoded
pub fn add_broken_image(doc: &mut Document) -> ObjectId {
    doc.add_object(
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 4i64,
                "Height" => 4i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
            },
            vec![1, 2, 3],
        )
        .with_compression(false),
    )
}

/// Resources for a Form XObject: its own `/F1` font plus the given images
pub fn form_resources(doc: &mut Document, images: &[(&str, ObjectId)]) -> Dictionary {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let mut xobjects = Dictionary::new();
    for (name, id) in images {
        xobjects.set(*name, Object::Reference(*id));
    }
    dictionary! {
        "Font" => dictionary! { "F1" => font_id },
        "XObject" => xobjects,
    }
}

/// Form XObject dictionary with an optional `/Matrix`
pub fn form_dict(resources: Option<Dictionary>, matrix: Option<[f32; 6]>) -> Dictionary {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ],
    };
    if let Some(resources) = resources {
        dict.set("Resources", resources);
    }
    if let Some(matrix) = matrix {
        dict.set(
            "Matrix",
            matrix.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
        );
    }
    dict
}

/// Add a Form XObject drawing `content`
pub fn add_form(
    doc: &mut Document,
    content: &str,
    resources: Option<Dictionary>,
    matrix: Option<[f32; 6]>,
) -> ObjectId {
    doc.add_object(Stream::new(
        form_dict(resources, matrix),
        content.as_bytes().to_vec(),
    ))
}

/// Content drawing a 1×1 gray inline image into the given square
pub fn inline_gray_image(x: f32, y: f32, size: f32) -> String {
    format!(
        "q {} 0 0 {} {} {} cm BI /W 1 /H 1 /CS /DeviceGray /BPC 8 ID A EI Q\n",
        size, size, x, y
    )
}

/// Add a 2×1 palette image: index 0 is red, index 1 is blue
pub fn add_palette_image(doc: &mut Document) -> ObjectId {
    doc.add_object(
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2i64,
                "Height" => 1i64,
                "ColorSpace" => vec![
                    Object::Name(b"Indexed".to_vec()),
                    Object::Name(b"DeviceRGB".to_vec()),
                    Object::Integer(1),
                    Object::String(
                        vec![0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF],
                        lopdf::StringFormat::Hexadecimal,
                    ),
                ],
                "BitsPerComponent" => 8i64,
            },
            vec![0, 1],
        )
        .with_compression(false),
    )
}

/// Write a solid-color PNG file
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, Rgb(color))
        .save(&path)
        .unwrap();
    path
}

/// Text of every block, page by page
pub fn page_texts(doc: &Document) -> Vec<Vec<String>> {
    pdf_template::layout::scan_document(doc)
        .unwrap()
        .into_iter()
        .map(|page| page.blocks.into_iter().map(|block| block.text).collect())
        .collect()
}

/// Image streams drawn on a page, by resource name
pub fn page_image_streams(doc: &Document, page_index: usize) -> Vec<Stream> {
    let layouts = pdf_template::layout::scan_document(doc).unwrap();
    layouts[page_index]
        .images
        .iter()
        .map(|image| {
            doc.get_object(image.object_id)
                .unwrap()
                .as_stream()
                .unwrap()
                .clone()
        })
        .collect()
}

/// Round trip through bytes, as a saved file would be read back
pub fn reload(doc: &mut Document) -> Document {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    Document::load_mem(&bytes).unwrap()
}
