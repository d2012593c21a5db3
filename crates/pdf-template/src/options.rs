use crate::constants::{DEFAULT_FONT_SIZE, DEFAULT_JPEG_QUALITY, DEFAULT_LINE_SPACING};
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Resampling filter used when resizing replacement images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    /// Highest quality, slowest
    #[default]
    Lanczos3,
}

impl From<ResizeFilter> for image::imageops::FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => Self::Nearest,
            ResizeFilter::Triangle => Self::Triangle,
            ResizeFilter::CatmullRom => Self::CatmullRom,
            ResizeFilter::Gaussian => Self::Gaussian,
            ResizeFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

/// Template filling configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TemplateOptions {
    // Text rendering
    pub font_size_pt: f32,
    pub line_spacing: f32,

    // Image replacement
    pub resize_filter: ResizeFilter,
    pub jpeg_quality: u8,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            font_size_pt: DEFAULT_FONT_SIZE,
            line_spacing: DEFAULT_LINE_SPACING,
            resize_filter: ResizeFilter::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl TemplateOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| TemplateError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| TemplateError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if !self.font_size_pt.is_finite() || self.font_size_pt <= 0.0 {
            return Err(TemplateError::Config(format!(
                "Font size must be a positive number, got {}",
                self.font_size_pt
            )));
        }

        if !self.line_spacing.is_finite() || self.line_spacing <= 0.0 {
            return Err(TemplateError::Config(format!(
                "Line spacing must be a positive number, got {}",
                self.line_spacing
            )));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(TemplateError::Config(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }

        Ok(())
    }

    /// Distance between consecutive baselines in points
    pub fn line_height_pt(&self) -> f32 {
        self.font_size_pt * self.line_spacing
    }
}
