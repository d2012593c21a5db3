use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a template run.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("PDF decode error: {0}")]
    Decode(#[from] lopdf::Error),
    #[error("Page {page} content could not be parsed: {reason}")]
    PageContent { page: usize, reason: String },
    #[error("PDF encode error: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, TemplateError>;

/// Errors scoped to a single image or text block.
///
/// These never abort a run. They are logged and collected as [`Warning`]s
/// and the item they concern is skipped.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("could not extract image data: {0}")]
    Extraction(String),
    #[error("could not locate the image placement on the page")]
    PlacementLookup,
    #[error("degenerate bounds {0}")]
    DegenerateGeometry(Rect),
    #[error("replacement image not found: {}", .0.display())]
    MissingResource(PathBuf),
    #[error("image codec error: {0}")]
    ImageCodec(#[from] image::ImageError),
    #[error("form content left out: {0}")]
    FormContent(String),
    #[error("text does not fit its box, {dropped} line(s) dropped")]
    TextOverflow { dropped: usize },
}

/// Axis-aligned rectangle in PDF user space (origin bottom-left, y up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest rectangle containing all the given points
    pub fn from_points(points: &[(f32, f32)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut rect = Rect::new(first.0, first.1, first.0, first.1);
        for &(x, y) in rest {
            rect.x0 = rect.x0.min(x);
            rect.y0 = rect.y0.min(y);
            rect.x1 = rect.x1.max(x);
            rect.y1 = rect.y1.max(y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// True when the rectangle cannot be rendered: a non-finite coordinate,
    /// or zero/negative width or height.
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite());
        !finite || self.width() <= 0.0 || self.height() <= 0.0
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.x0, self.y0, self.x1, self.y1
        )
    }
}

/// What a [`Warning`] is about
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    /// Image by its discovery ordinal on the page and its resource name
    Image { ordinal: usize, name: String },
    /// Image written inline in the content stream
    InlineImage { ordinal: usize },
    /// Form XObject by its resource name
    Form { name: String },
    /// Text block by its position on the page
    TextBlock { ordinal: usize },
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Image { ordinal, name } => write!(f, "image {} (/{})", ordinal + 1, name),
            Subject::InlineImage { ordinal } => write!(f, "inline image {}", ordinal + 1),
            Subject::Form { name } => write!(f, "form /{}", name),
            Subject::TextBlock { ordinal } => write!(f, "text block {}", ordinal + 1),
        }
    }
}

/// A skipped or degraded item, reported to the user at the end of a run
#[derive(Debug)]
pub struct Warning {
    /// Zero-based page index
    pub page: usize,
    pub subject: Subject,
    pub error: ItemError,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}, {}: {}", self.page + 1, self.subject, self.error)
    }
}

/// Log a warning and keep it for the run report.
pub(crate) fn push_warning(warnings: &mut Vec<Warning>, warning: Warning) {
    log::warn!("Skipping {warning}");
    warnings.push(warning);
}
