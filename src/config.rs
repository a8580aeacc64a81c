//! Configuration types for report generation.
//!
//! Every knob lives in [`ReportConfig`], built via its
//! [`ReportConfigBuilder`]. A config is immutable once built and cheap to
//! clone, so the server shares one instance across all requests.

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hard cap on the number of coordinates used from any source.
pub const MAX_COORDINATES: usize = 10;

/// Configuration for report generation.
///
/// # Example
/// ```rust
/// use edgequake_report::ReportConfig;
///
/// let config = ReportConfig::builder()
///     .dpi(150)
///     .chart_size(800, 600)
///     .build()
///     .unwrap();
/// assert_eq!(config.chart_width, 800);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rendering DPI for PDF pages. Range: 72–400. Default: 150.
    pub dpi: u32,

    /// Upper bound on pixels (width × height) of one rendered page.
    /// Default: 40 000 000.
    ///
    /// A page whose projected bitmap exceeds this is reported as
    /// [`ReportError::ResourceExhausted`] before pdfium allocates anything.
    pub max_page_pixels: u64,

    /// Largest PDF accepted, in bytes. Default: 64 MiB.
    pub max_document_bytes: usize,

    /// Chart canvas width in pixels. Default: 640.
    pub chart_width: u32,

    /// Chart canvas height in pixels. Default: 480.
    pub chart_height: u32,

    /// Display width of every embedded image in the report, in inches. Default: 6.0.
    pub image_width_inches: f64,

    /// Description used when the request carries none.
    pub default_description: String,

    /// Explicit pdfium library file or directory. `None` binds the system library.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            max_page_pixels: 40_000_000,
            max_document_bytes: 64 * 1024 * 1024,
            chart_width: 640,
            chart_height: 480,
            image_width_inches: 6.0,
            default_description: "Description of the work".to_string(),
            pdfium_lib_path: None,
        }
    }
}

impl ReportConfig {
    /// Create a new builder for `ReportConfig`.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder {
            config: Self::default(),
        }
    }

    /// Scale factor from PDF points (1/72 in) to pixels at the configured DPI.
    pub fn render_scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// Builder for [`ReportConfig`].
#[derive(Debug)]
pub struct ReportConfigBuilder {
    config: ReportConfig,
}

impl ReportConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_page_pixels(mut self, px: u64) -> Self {
        self.config.max_page_pixels = px;
        self
    }

    pub fn max_document_bytes(mut self, bytes: usize) -> Self {
        self.config.max_document_bytes = bytes;
        self
    }

    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.config.chart_width = width;
        self.config.chart_height = height;
        self
    }

    pub fn image_width_inches(mut self, inches: f64) -> Self {
        self.config.image_width_inches = inches;
        self
    }

    pub fn default_description(mut self, text: impl Into<String>) -> Self {
        self.config.default_description = text.into();
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReportConfig, ReportError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(invalid(format!("DPI must be 72–400, got {}", c.dpi)));
        }
        if c.chart_width < 100 || c.chart_height < 100 {
            return Err(invalid(format!(
                "Chart must be at least 100×100 px, got {}×{}",
                c.chart_width, c.chart_height
            )));
        }
        if c.max_page_pixels == 0 || c.max_document_bytes == 0 {
            return Err(invalid("Size limits must be positive".to_string()));
        }
        if !(c.image_width_inches.is_finite() && c.image_width_inches > 0.0) {
            return Err(invalid(format!(
                "Image width must be a positive number of inches, got {}",
                c.image_width_inches
            )));
        }
        Ok(self.config)
    }
}

fn invalid(msg: String) -> ReportError {
    ReportError::InvalidConfig(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ReportConfig::default();
        assert_eq!(c.dpi, 150);
        assert_eq!((c.chart_width, c.chart_height), (640, 480));
        assert_eq!(c.image_width_inches, 6.0);
        assert!(c.pdfium_lib_path.is_none());
        assert!((c.render_scale() - 150.0 / 72.0).abs() < 1e-6);
    }

    #[test]
    fn dpi_is_clamped() {
        let c = ReportConfig::builder().dpi(1000).build().unwrap();
        assert_eq!(c.dpi, 400);
        let c = ReportConfig::builder().dpi(10).build().unwrap();
        assert_eq!(c.dpi, 72);
    }

    #[test]
    fn tiny_chart_is_rejected() {
        let err = ReportConfig::builder().chart_size(50, 480).build().unwrap_err();
        assert!(err.to_string().contains("100×100"), "got: {err}");
    }

    #[test]
    fn zero_limits_are_rejected() {
        assert!(ReportConfig::builder().max_document_bytes(0).build().is_err());
        assert!(ReportConfig::builder().image_width_inches(-1.0).build().is_err());
    }
}
