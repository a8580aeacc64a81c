//! Pipeline stages for report generation.
//!
//! Each submodule implements one step and returns an explicit
//! `Result<_, ReportError>`; the orchestrator in [`crate::generate`] only
//! sequences them.
//!
//! ## Data Flow
//!
//! ```text
//! coords | spreadsheet ──▶ trend ──▶ chart ──┐
//!                                            ├──▶ assemble
//! render ──▶ encode ─────────────────────────┘
//! (pdfium)   (png)                           (docx)
//! ```
//!
//! 1. [`coords`] / [`spreadsheet`]: extract at most ten (x, y) points
//! 2. [`trend`]: least-squares fit and the x-sorted view
//! 3. [`chart`]: draw the chart into a per-call buffer
//! 4. [`render`]: rasterise PDF pages via pdfium
//! 5. [`encode`]: PNG-encode chart and page rasters
//! 6. [`assemble`]: write the WordprocessingML package

pub mod assemble;
pub mod chart;
pub mod coords;
pub mod encode;
pub mod render;
pub mod spreadsheet;
pub mod trend;
