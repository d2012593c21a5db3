//! Output document assembly
//!
//! Pages are built one at a time with [`PageBuilder`] and appended to an
//! [`OutputDocument`], which writes the page tree and catalog on
//! [`OutputDocument::finish`].

use crate::constants::OUTPUT_FONT_NAME;
use crate::render::text::{PlacedLine, encode_win_ansi};
use crate::types::{Rect, Result, TemplateError};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// A document under construction
pub struct OutputDocument {
    doc: Document,
    pages_id: ObjectId,
    page_refs: Vec<Object>,
    font_id: Option<ObjectId>,
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputDocument {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_refs: Vec::new(),
            font_id: None,
        }
    }

    /// The document objects are copied into
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Shared Helvetica font, created on first use
    fn font(&mut self) -> ObjectId {
        if let Some(id) = self.font_id {
            return id;
        }
        let mut font_dict = Dictionary::new();
        font_dict.set("Type", Object::Name(b"Font".to_vec()));
        font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        font_dict.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
        font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        let id = self.doc.add_object(font_dict);
        self.font_id = Some(id);
        id
    }

    /// Append a finished page
    pub fn add_page(&mut self, page: PageBuilder) -> Result<ObjectId> {
        let mut resources = Dictionary::new();
        if !page.xobjects.is_empty() {
            resources.set("XObject", Object::Dictionary(page.xobjects));
        }
        if page.uses_font {
            let mut fonts = Dictionary::new();
            fonts.set(OUTPUT_FONT_NAME, Object::Reference(self.font()));
            resources.set("Font", Object::Dictionary(fonts));
        }

        let content = Content {
            operations: page.operations,
        }
        .encode()
        .map_err(|e| TemplateError::Encode(format!("content stream: {}", e)))?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(self.pages_id));
        page_dict.set("MediaBox", rect_array(&page.media_box));
        if let Some(rotate) = page.rotate {
            page_dict.set("Rotate", Object::Integer(rotate));
        }
        page_dict.set("Resources", Object::Dictionary(resources));
        page_dict.set("Contents", Object::Reference(content_id));

        let page_id = self.doc.add_object(page_dict);
        self.page_refs.push(Object::Reference(page_id));
        Ok(page_id)
    }

    /// Write the page tree and catalog and hand the document over
    pub fn finish(mut self) -> Document {
        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(self.page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.doc.trailer.set("Root", catalog_id);
        self.doc
    }
}

/// Content and resources of one output page
pub struct PageBuilder {
    media_box: Rect,
    rotate: Option<i64>,
    operations: Vec<Operation>,
    xobjects: Dictionary,
    image_count: usize,
    uses_font: bool,
}

impl PageBuilder {
    pub fn new(media_box: Rect, rotate: Option<i64>) -> Self {
        Self {
            media_box,
            rotate,
            operations: Vec::new(),
            xobjects: Dictionary::new(),
            image_count: 0,
            uses_font: false,
        }
    }

    /// Draw an image XObject of the output document scaled to fill `rect`
    pub fn draw_image(&mut self, xobject_id: ObjectId, rect: &Rect) {
        let name = format!("Im{}", self.image_count);
        self.image_count += 1;
        self.xobjects
            .set(name.as_bytes(), Object::Reference(xobject_id));

        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(rect.width()),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(rect.height()),
                    Object::Real(rect.x0),
                    Object::Real(rect.y0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Set the lines of one text block as a single text object
    pub fn draw_text(&mut self, lines: &[PlacedLine], font_size: f32) {
        let visible: Vec<&PlacedLine> = lines.iter().filter(|line| !line.text.is_empty()).collect();
        if visible.is_empty() {
            return;
        }
        self.uses_font = true;

        self.operations.push(Operation::new("BT", vec![]));
        self.operations.push(Operation::new(
            "Tf",
            vec![
                Object::Name(OUTPUT_FONT_NAME.as_bytes().to_vec()),
                Object::Real(font_size),
            ],
        ));
        for line in visible {
            self.operations.extend([
                Operation::new(
                    "Tm",
                    vec![
                        Object::Integer(1),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(1),
                        Object::Real(line.x),
                        Object::Real(line.y),
                    ],
                ),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        encode_win_ansi(&line.text),
                        StringFormat::Literal,
                    )],
                ),
            ]);
        }
        self.operations.push(Operation::new("ET", vec![]));
    }
}

fn rect_array(rect: &Rect) -> Object {
    Object::Array(vec![
        Object::Real(rect.x0),
        Object::Real(rect.y0),
        Object::Real(rect.x1),
        Object::Real(rect.y1),
    ])
}
