//! # edgequake-report
//!
//! Build a `.docx` report from a handful of (x, y) coordinates and an
//! optional PDF: a description section, a trend chart of the coordinates,
//! and one image per PDF page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! request
//!  │
//!  ├─ 1. Coordinates  JSON text or first sheet of an .xlsx (max 10 points)
//!  ├─ 2. Rasterize    PDF pages → PNG via pdfium (150 DPI, fail-fast)
//!  ├─ 3. Chart        scatter + sorted line + least-squares trend (plotters)
//!  └─ 4. Assemble     WordprocessingML package (zip)
//! ```
//!
//! The whole pipeline is synchronous and holds no state between requests;
//! [`generate_report`] runs it on tokio's blocking pool.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_report::{generate_report, ReportConfig, ReportRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = ReportRequest {
//!         description: Some("Lab 3 measurements".into()),
//!         coordinates: Some("[[0, 0], [1, 2.1], [2, 3.9]]".into()),
//!         document: Some(std::fs::read("appendix.pdf")?),
//!         ..Default::default()
//!     };
//!     let report = generate_report(request, &ReportConfig::default()).await?;
//!     std::fs::write("generated_document.docx", &report.docx)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `report-server` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when embedding only the library or the router:
//! ```toml
//! edgequake-report = { version = "0.1", default-features = false }
//! ```
//!
//! ## PDFium
//!
//! PDF pages are rendered with the PDFium shared library. Point
//! `PDFIUM_LIB_PATH` (or [`ReportConfig::pdfium_lib_path`]) at the library
//! file or its directory, or install it on the system library path. Reports
//! without a PDF never touch PDFium.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ReportConfig, ReportConfigBuilder, MAX_COORDINATES};
pub use error::{ErrorCategory, ReportError};
pub use generate::{
    generate_report, generate_report_blocking, generate_to_file, CoordinateSource, ReportRequest,
};
pub use output::{GeneratedReport, ReportStats};
pub use pipeline::assemble::{DOCX_CONTENT_TYPE, REPORT_FILENAME};
pub use pipeline::coords::{Coordinate, CoordinateSequence};
pub use pipeline::render::RenderedPage;
pub use pipeline::trend::TrendLine;
pub use server::{router, serve, ServerConfig};
