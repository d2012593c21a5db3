//! Where replacement values and images come from
//!
//! The pipeline never prompts by itself. Callers inject a [`ValueSource`] and
//! an [`ImageSource`]; the CLI wires them to the terminal, tests and batch
//! runs use closures, [`ValueMap`] and [`KeepImages`].

use crate::layout::ImageRef;
use std::collections::HashMap;
use std::path::PathBuf;

/// Supplies one replacement string per marker
pub trait ValueSource {
    /// `None` and empty strings both mean "delete the marker text"
    fn value_for(&mut self, marker: &str) -> Option<String>;
}

impl<F> ValueSource for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn value_for(&mut self, marker: &str) -> Option<String> {
        self(marker)
    }
}

/// What to do with one embedded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageDecision {
    Keep,
    Replace(PathBuf),
}

/// Decides, image by image, whether to swap in a new raster file
pub trait ImageSource {
    /// `ordinal` is the image's zero-based position on its page
    fn decide(&mut self, ordinal: usize, image: &ImageRef) -> ImageDecision;
}

impl<F> ImageSource for F
where
    F: FnMut(usize, &ImageRef) -> ImageDecision,
{
    fn decide(&mut self, ordinal: usize, image: &ImageRef) -> ImageDecision {
        self(ordinal, image)
    }
}

/// Keeps every original image
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepImages;

impl ImageSource for KeepImages {
    fn decide(&mut self, _ordinal: usize, _image: &ImageRef) -> ImageDecision {
        ImageDecision::Keep
    }
}

/// Values read from a flat JSON object, e.g. `{"name": "Alice"}`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ValueMap {
    values: HashMap<String, String>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, marker: impl Into<String>, value: impl Into<String>) {
        self.values.insert(marker.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Load values from a JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> crate::types::Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&contents).map_err(|e| {
            crate::types::TemplateError::Config(format!("Failed to parse values: {}", e))
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (marker, value) in iter {
            map.insert(marker, value);
        }
        map
    }
}

impl ValueSource for ValueMap {
    fn value_for(&mut self, marker: &str) -> Option<String> {
        let value = self.values.get(marker).cloned();
        if value.is_none() {
            log::debug!("No value given for marker {{{}}}", marker);
        }
        value
    }
}
