//! Page content interpretation
//!
//! Walks a page's content stream keeping track of the graphics state stack,
//! the current transformation matrix and the text state. Form XObjects are
//! entered with their own matrix and resources. The result is the page's
//! text blocks with their bounding boxes, the rectangle each image XObject
//! is drawn into, and the inline images with their rectangles.

use super::fonts::{FontMetrics, decode_string};
use super::matrix::Matrix;
use super::resources::{
    dict_integer, extract_number, page_media_box, page_resources, page_rotate, resolve,
    resolve_dict,
};
use super::types::{ImageRef, InlineImage, PageLayout, SkippedForm, TextBlock};
use crate::constants::{
    DEFAULT_FONT_SIZE, FONT_ASCENT_RATIO, FONT_DESCENT_RATIO, GLYPH_SPACE_UNITS, LINE_BREAK_RATIO,
    MAX_FORM_DEPTH, RUN_GAP_RATIO, TJ_WORD_GAP_THRESHOLD,
};
use crate::types::{Rect, Result, TemplateError};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Public API
// =============================================================================

/// Scan every page of a document, in page order.
pub fn scan_document(doc: &Document) -> Result<Vec<PageLayout>> {
    doc.get_pages()
        .into_values()
        .enumerate()
        .map(|(index, page_id)| scan_page(doc, index, page_id))
        .collect()
}

/// Scan one page.
///
/// Fails only when the page content cannot be parsed. lopdf rejects inline
/// images that use a filter or an abbreviated color space name such as
/// `/G`, so pages containing those fail here with
/// [`TemplateError::PageContent`].
///
/// Images listed in the page resources but never drawn get a `None`
/// placement. Images only drawn from inside a Form XObject are appended
/// after the page's own, in drawing order.
pub fn scan_page(doc: &Document, index: usize, page_id: ObjectId) -> Result<PageLayout> {
    let media_box = page_media_box(doc, page_id);
    let rotate = page_rotate(doc, page_id);
    let xobjects = page_resources(doc, page_id)
        .and_then(|res| res.get(b"XObject").ok())
        .and_then(|obj| resolve_dict(doc, obj));

    let data = doc.get_page_content(page_id)?;
    let content = Content::decode(&data).map_err(|e| TemplateError::PageContent {
        page: index + 1,
        reason: e.to_string(),
    })?;

    let frame = ResourceFrame {
        fonts: doc.get_page_fonts(page_id).unwrap_or_default(),
        xobjects,
        metrics: HashMap::new(),
    };
    let mut scanner = Scanner::new(doc, frame);
    for operation in &content.operations {
        scanner.apply(operation);
    }
    let found = scanner.finish();

    let mut listed = xobjects
        .map(|dict| image_xobjects(doc, dict))
        .unwrap_or_default();
    for (name, object_id) in &found.drawn {
        if listed.iter().any(|x| x.object_id == *object_id) {
            continue;
        }
        if let Some(xobject) = image_xobject(doc, name, *object_id) {
            listed.push(xobject);
        }
    }

    let images = listed
        .into_iter()
        .enumerate()
        .map(|(ordinal, xobject)| ImageRef {
            page_index: index,
            ordinal,
            rect: found.placements.get(&xobject.object_id).copied(),
            name: xobject.name,
            object_id: xobject.object_id,
            width: xobject.width,
            height: xobject.height,
        })
        .collect();

    log::debug!(
        "Scanned page {}: {} text block(s), {} inline image(s)",
        index + 1,
        found.blocks.len(),
        found.inline_images.len()
    );

    Ok(PageLayout {
        index,
        page_id,
        media_box,
        rotate,
        blocks: found.blocks,
        images,
        inline_images: found.inline_images,
        skipped_forms: found.skipped_forms,
    })
}

// =============================================================================
// Image XObject Listing
// =============================================================================

/// An image XObject from a resource dictionary
struct ImageXObject {
    name: String,
    object_id: ObjectId,
    width: u32,
    height: u32,
}

/// Image XObjects in resource order, deduplicated by object id
fn image_xobjects(doc: &Document, xobjects: &Dictionary) -> Vec<ImageXObject> {
    let mut found: Vec<ImageXObject> = Vec::new();
    for (name, obj) in xobjects.iter() {
        let Object::Reference(id) = obj else {
            log::debug!(
                "XObject /{} is not an indirect object, ignoring",
                String::from_utf8_lossy(name)
            );
            continue;
        };
        if found.iter().any(|x| x.object_id == *id) {
            continue;
        }
        if let Some(xobject) = image_xobject(doc, name, *id) {
            found.push(xobject);
        }
    }
    found
}

fn image_xobject(doc: &Document, name: &[u8], object_id: ObjectId) -> Option<ImageXObject> {
    let stream = doc.get_object(object_id).and_then(Object::as_stream).ok()?;
    if !is_image(&stream.dict) {
        return None;
    }
    let dimension = |key: &[u8]| {
        dict_integer(doc, &stream.dict, key)
            .and_then(|value| u32::try_from(value).ok())
            .unwrap_or(0)
    };
    Some(ImageXObject {
        name: String::from_utf8_lossy(name).into_owned(),
        object_id,
        width: dimension(b"Width"),
        height: dimension(b"Height"),
    })
}

pub(crate) fn is_image(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Image")
}

fn is_form(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Form")
}

// =============================================================================
// Interpreter State
// =============================================================================

#[derive(Debug, Clone)]
struct TextState {
    font: Option<Vec<u8>>,
    size: f32,
    char_spacing: f32,
    word_spacing: f32,
    scaling: f32,
    leading: f32,
    rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            size: DEFAULT_FONT_SIZE,
            char_spacing: 0.0,
            word_spacing: 0.0,
            scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

/// Fonts and XObjects visible to the content being interpreted
struct ResourceFrame<'a> {
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    xobjects: Option<&'a Dictionary>,
    metrics: HashMap<Vec<u8>, FontMetrics>,
}

impl<'a> ResourceFrame<'a> {
    fn from_resources(doc: &'a Document, resources: &'a Dictionary) -> Self {
        let fonts = resources
            .get(b"Font")
            .ok()
            .and_then(|obj| resolve_dict(doc, obj))
            .map(|fonts| {
                fonts
                    .iter()
                    .filter_map(|(name, font)| resolve_dict(doc, font).map(|d| (name.clone(), d)))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            fonts,
            xobjects: resources
                .get(b"XObject")
                .ok()
                .and_then(|obj| resolve_dict(doc, obj)),
            metrics: HashMap::new(),
        }
    }

    /// Forms without `/Resources` use their parent's
    fn inherit(&self) -> Self {
        Self {
            fonts: self.fonts.clone(),
            xobjects: self.xobjects,
            metrics: HashMap::new(),
        }
    }
}

/// End point of the last shown run, in user space
#[derive(Debug, Clone, Copy)]
struct RunEnd {
    x: f32,
    y: f32,
    size: f32,
}

/// Accumulates the text of one `BT … ET` object
#[derive(Debug, Default)]
struct BlockBuilder {
    text: String,
    rect: Option<Rect>,
    last: Option<RunEnd>,
}

impl BlockBuilder {
    fn push_run(&mut self, text: &str, start: (f32, f32), end: RunEnd, rect: Rect) {
        if let Some(last) = self.last {
            let size = end.size.max(last.size);
            if (start.1 - last.y).abs() > LINE_BREAK_RATIO * size {
                self.text.push('\n');
            } else if start.0 - last.x > RUN_GAP_RATIO * size {
                self.push_space();
            }
        }
        self.text.push_str(text);
        self.rect = Some(match self.rect {
            Some(existing) => existing.union(&rect),
            None => rect,
        });
        self.last = Some(end);
    }

    fn push_space(&mut self) {
        if !self.text.is_empty() && !self.text.ends_with(char::is_whitespace) {
            self.text.push(' ');
        }
    }

    fn finish(self) -> Option<TextBlock> {
        if self.text.trim().is_empty() {
            return None;
        }
        Some(TextBlock {
            rect: self.rect?,
            text: self.text,
        })
    }
}

/// What the interpreter collected from one page
struct Found {
    blocks: Vec<TextBlock>,
    placements: HashMap<ObjectId, Rect>,
    /// Image XObjects in drawing order, with the name they were drawn by
    drawn: Vec<(Vec<u8>, ObjectId)>,
    inline_images: Vec<InlineImage>,
    skipped_forms: Vec<SkippedForm>,
}

struct Scanner<'a> {
    doc: &'a Document,
    resources: ResourceFrame<'a>,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    /// Text matrix
    tm: Matrix,
    /// Text line matrix
    tlm: Matrix,
    block: Option<BlockBuilder>,
    /// Forms currently being interpreted, outermost first
    forms: Vec<ObjectId>,
    found: Found,
}

impl<'a> Scanner<'a> {
    fn new(doc: &'a Document, resources: ResourceFrame<'a>) -> Self {
        Self {
            doc,
            resources,
            state: GraphicsState::default(),
            stack: Vec::new(),
            tm: Matrix::identity(),
            tlm: Matrix::identity(),
            block: None,
            forms: Vec::new(),
            found: Found {
                blocks: Vec::new(),
                placements: HashMap::new(),
                drawn: Vec::new(),
                inline_images: Vec::new(),
                skipped_forms: Vec::new(),
            },
        }
    }

    fn finish(mut self) -> Found {
        self.end_block();
        self.found
    }

    fn apply(&mut self, op: &Operation) {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => self.stack.push(self.state.clone()),
            "Q" => match self.stack.pop() {
                Some(state) => self.state = state,
                None => log::debug!("Unbalanced Q operator ignored"),
            },
            "cm" => {
                if let Some(m) = matrix_operands(operands) {
                    self.state.ctm = m.then(&self.state.ctm);
                }
            }
            "BT" => {
                self.end_block();
                self.block = Some(BlockBuilder::default());
                self.tm = Matrix::identity();
                self.tlm = Matrix::identity();
            }
            "ET" => self.end_block(),
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.state.text.font = Some(name.clone());
                }
                if let Some(size) = number(operands, 1) {
                    self.state.text.size = size;
                }
            }
            "Tc" => set_number(&mut self.state.text.char_spacing, operands, 0),
            "Tw" => set_number(&mut self.state.text.word_spacing, operands, 0),
            "TL" => set_number(&mut self.state.text.leading, operands, 0),
            "Ts" => set_number(&mut self.state.text.rise, operands, 0),
            "Tz" => {
                if let Some(percent) = number(operands, 0) {
                    self.state.text.scaling = percent / 100.0;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (number(operands, 0), number(operands, 1)) {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (number(operands, 0), number(operands, 1)) {
                    self.state.text.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "T*" => self.next_line(),
            "Tm" => {
                if let Some(m) = matrix_operands(operands) {
                    self.tlm = m;
                    self.tm = m;
                }
            }
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show_text(bytes);
                }
            }
            "'" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show_text(bytes);
                }
            }
            "\"" => {
                set_number(&mut self.state.text.word_spacing, operands, 0);
                set_number(&mut self.state.text.char_spacing, operands, 1);
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show_text(bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show_text(bytes),
                            other => {
                                if let Some(adjustment) = extract_number(other) {
                                    self.adjust(adjustment);
                                }
                            }
                        }
                    }
                }
            }
            "Do" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.draw_xobject(name);
                }
            }
            // lopdf hands over `BI … ID … EI` as one operation
            "BI" => {
                if let Some(Object::Stream(stream)) = operands.first() {
                    self.record_inline_image(stream);
                }
            }
            _ => {}
        }
    }

    fn end_block(&mut self) {
        if let Some(block) = self.block.take().and_then(BlockBuilder::finish) {
            self.found.blocks.push(block);
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translation(tx, ty).then(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = self.state.text.leading;
        self.move_line(0.0, -leading);
    }

    /// TJ positioning: thousandths of a unit of text space, subtracted
    fn adjust(&mut self, amount: f32) {
        let text = &self.state.text;
        let tx = -amount / GLYPH_SPACE_UNITS * text.size * text.scaling;
        self.tm = Matrix::translation(tx, 0.0).then(&self.tm);
        if -amount > TJ_WORD_GAP_THRESHOLD {
            if let Some(block) = self.block.as_mut() {
                block.push_space();
            }
        }
    }

    fn show_text(&mut self, bytes: &[u8]) {
        let doc = self.doc;
        let font_name = self.state.text.font.clone().unwrap_or_default();
        let font = self.resources.fonts.get(&font_name).copied();
        let text = decode_string(doc, font, bytes);

        let metrics = self
            .resources
            .metrics
            .entry(font_name)
            .or_insert_with(|| font.map(|f| FontMetrics::from_dict(doc, f)).unwrap_or_default());

        let ts = &self.state.text;
        let advance: f32 = metrics
            .codes(bytes)
            .into_iter()
            .map(|code| {
                let mut tx = metrics.width(code) * ts.size + ts.char_spacing;
                if metrics.is_word_space(code) {
                    tx += ts.word_spacing;
                }
                tx * ts.scaling
            })
            .sum();

        let trm = self.tm.then(&self.state.ctm);
        let low = ts.rise - FONT_DESCENT_RATIO * ts.size;
        let high = ts.rise + FONT_ASCENT_RATIO * ts.size;
        let corners = [
            trm.apply(0.0, low),
            trm.apply(advance, low),
            trm.apply(0.0, high),
            trm.apply(advance, high),
        ];
        let start = trm.apply(0.0, ts.rise);
        let (end_x, end_y) = trm.apply(advance, ts.rise);
        let end = RunEnd {
            x: end_x,
            y: end_y,
            size: ts.size * trm.vertical_scale(),
        };

        if let Some(rect) = Rect::from_points(&corners) {
            if !text.is_empty() {
                self.block
                    .get_or_insert_with(BlockBuilder::default)
                    .push_run(&text, start, end, rect);
            }
        }

        self.tm = Matrix::translation(advance, 0.0).then(&self.tm);
    }

    /// Image of the unit square under the CTM
    fn unit_square(&self) -> Option<Rect> {
        let ctm = self.state.ctm;
        Rect::from_points(&[
            ctm.apply(0.0, 0.0),
            ctm.apply(1.0, 0.0),
            ctm.apply(0.0, 1.0),
            ctm.apply(1.0, 1.0),
        ])
    }

    fn draw_xobject(&mut self, name: &[u8]) {
        let doc = self.doc;
        let Some(object_id) = self
            .resources
            .xobjects
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|obj| obj.as_reference().ok())
        else {
            log::debug!(
                "XObject /{} not found in the current resources",
                String::from_utf8_lossy(name)
            );
            return;
        };
        let Ok(stream) = doc.get_object(object_id).and_then(Object::as_stream) else {
            return;
        };

        if is_image(&stream.dict) {
            // The first draw of an image decides its placement
            if !self.found.placements.contains_key(&object_id) {
                if let Some(rect) = self.unit_square() {
                    self.found.placements.insert(object_id, rect);
                }
                self.found.drawn.push((name.to_vec(), object_id));
            }
        } else if is_form(&stream.dict) {
            self.enter_form(name, object_id, stream);
        }
    }

    fn enter_form(&mut self, name: &[u8], object_id: ObjectId, form: &'a Stream) {
        let doc = self.doc;
        let skip = |reason: String| SkippedForm {
            name: String::from_utf8_lossy(name).into_owned(),
            reason,
        };

        if self.forms.contains(&object_id) {
            self.found
                .skipped_forms
                .push(skip("form draws itself".to_string()));
            return;
        }
        if self.forms.len() >= MAX_FORM_DEPTH {
            self.found.skipped_forms.push(skip(format!(
                "forms nested more than {} deep",
                MAX_FORM_DEPTH
            )));
            return;
        }
        let content = match form
            .get_plain_content()
            .and_then(|data| Content::decode(&data))
        {
            Ok(content) => content,
            Err(e) => {
                self.found
                    .skipped_forms
                    .push(skip(format!("content could not be parsed: {}", e)));
                return;
            }
        };

        let frame = match form
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|obj| resolve_dict(doc, obj))
        {
            Some(resources) => ResourceFrame::from_resources(doc, resources),
            None => self.resources.inherit(),
        };
        let matrix = form
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok())
            .and_then(|items| matrix_operands(items))
            .unwrap_or_default();

        // A form runs with its own graphics and text state
        self.end_block();
        let outer_resources = std::mem::replace(&mut self.resources, frame);
        let outer_stack = std::mem::take(&mut self.stack);
        let outer_state = self.state.clone();
        let outer_text = (self.tm, self.tlm);
        self.state.ctm = matrix.then(&self.state.ctm);
        self.forms.push(object_id);

        for operation in &content.operations {
            self.apply(operation);
        }
        self.end_block();

        self.forms.pop();
        self.resources = outer_resources;
        self.stack = outer_stack;
        self.state = outer_state;
        (self.tm, self.tlm) = outer_text;
    }

    fn record_inline_image(&mut self, stream: &Stream) {
        let ordinal = self.found.inline_images.len();
        let rect = self.unit_square();
        self.found.inline_images.push(InlineImage {
            ordinal,
            rect,
            stream: stream.clone(),
        });
    }
}

// =============================================================================
// Operand Helpers
// =============================================================================

fn number(operands: &[Object], index: usize) -> Option<f32> {
    operands.get(index).and_then(extract_number)
}

fn set_number(target: &mut f32, operands: &[Object], index: usize) {
    if let Some(value) = number(operands, index) {
        *target = value;
    }
}

fn matrix_operands(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        log::debug!("Matrix operator with {} operand(s) ignored", operands.len());
        return None;
    }
    Some(Matrix::new(
        number(operands, 0)?,
        number(operands, 1)?,
        number(operands, 2)?,
        number(operands, 3)?,
        number(operands, 4)?,
        number(operands, 5)?,
    ))
}
