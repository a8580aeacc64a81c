//! Report generation entry points.
//!
//! [`generate_report_blocking`] runs the whole pipeline on the calling
//! thread; [`generate_report`] moves it onto tokio's blocking pool so the
//! async runtime never stalls on pdfium or chart rasterisation.
//!
//! Stages run strictly in order and any failure aborts the request:
//!
//! ```text
//! coordinates ──▶ rasterize (optional) ──▶ chart ──▶ assemble
//! (json/xlsx)      (pdfium → png)          (plotters)  (docx)
//! ```

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::output::{GeneratedReport, ReportStats};
use crate::pipeline::assemble::{assemble_report, EmbeddedImage};
use crate::pipeline::{chart, coords, render, spreadsheet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Inputs of one Generate Report request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Free text for the Description section.
    pub description: Option<String>,

    /// JSON array of `[x, y]` pairs.
    pub coordinates: Option<String>,

    /// Raw `.xlsx` bytes.
    #[serde(skip)]
    pub spreadsheet: Option<Vec<u8>>,

    /// Raw PDF bytes.
    #[serde(skip)]
    pub document: Option<Vec<u8>>,
}

impl ReportRequest {
    /// Pick the coordinate source. A spreadsheet wins over JSON; blank JSON
    /// counts as absent.
    pub fn coordinate_source(&self) -> Option<CoordinateSource<'_>> {
        if let Some(bytes) = self.spreadsheet.as_deref() {
            return Some(CoordinateSource::Spreadsheet(bytes));
        }
        self.coordinates
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(CoordinateSource::Json)
    }
}

/// Where a request's coordinates come from.
#[derive(Debug, Clone, Copy)]
pub enum CoordinateSource<'a> {
    Spreadsheet(&'a [u8]),
    Json(&'a str),
}

impl CoordinateSource<'_> {
    pub fn extract(self) -> Result<coords::CoordinateSequence, ReportError> {
        match self {
            Self::Spreadsheet(bytes) => spreadsheet::parse_coordinates_xlsx(bytes),
            Self::Json(text) => coords::parse_coordinates_json(text),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Spreadsheet(_) => "spreadsheet",
            Self::Json(_) => "json",
        }
    }
}

/// Generate a report on tokio's blocking pool.
pub async fn generate_report(
    request: ReportRequest,
    config: &ReportConfig,
) -> Result<GeneratedReport, ReportError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || generate_report_blocking(&request, &config))
        .await
        .map_err(|e| ReportError::Internal(format!("Report task panicked: {e}")))?
}

/// Generate a report on the current thread.
///
/// # Errors
/// Any [`ReportError`]; no document bytes are produced on failure.
pub fn generate_report_blocking(
    request: &ReportRequest,
    config: &ReportConfig,
) -> Result<GeneratedReport, ReportError> {
    let total_start = Instant::now();

    // ── Step 1: Coordinates ──────────────────────────────────────────────
    let source = request.coordinate_source().ok_or_else(|| {
        ReportError::invalid_coordinates("Either coordinates or a spreadsheet must be provided")
    })?;
    let extract_start = Instant::now();
    let coordinates = source.extract()?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    info!(
        "Extracted {} coordinates from {} in {}ms",
        coordinates.len(),
        source.label(),
        extract_duration_ms
    );

    // ── Step 2: Document pages ───────────────────────────────────────────
    let rasterize_start = Instant::now();
    let pages = match request.document.as_deref() {
        Some(bytes) => render::rasterize_pdf(bytes, config)?,
        None => Vec::new(),
    };
    let rasterize_duration_ms = rasterize_start.elapsed().as_millis() as u64;
    if request.document.is_some() {
        info!("Rendered {} pages in {}ms", pages.len(), rasterize_duration_ms);
    }

    // ── Step 3: Chart ────────────────────────────────────────────────────
    let chart_start = Instant::now();
    let chart = chart::render_chart(&coordinates, config)?;
    let chart_duration_ms = chart_start.elapsed().as_millis() as u64;
    match chart.trend {
        Some(t) => info!("Chart rendered in {}ms ({})", chart_duration_ms, t.annotation()),
        None => info!("Chart rendered in {}ms (no trend line)", chart_duration_ms),
    }

    // ── Step 4: Assemble ─────────────────────────────────────────────────
    let assemble_start = Instant::now();
    let description = request
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(&config.default_description);
    let page_images: Vec<EmbeddedImage<'_>> = pages
        .iter()
        .map(|p| EmbeddedImage {
            png: &p.png,
            width: p.width,
            height: p.height,
        })
        .collect();
    let docx = assemble_report(
        description,
        EmbeddedImage {
            png: &chart.png,
            width: chart.width,
            height: chart.height,
        },
        &page_images,
        config.image_width_inches,
    )?;
    let assemble_duration_ms = assemble_start.elapsed().as_millis() as u64;

    let stats = ReportStats {
        extract_duration_ms,
        rasterize_duration_ms,
        chart_duration_ms,
        assemble_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Report complete: {} bytes, {} pages, {}ms total",
        docx.len(),
        pages.len(),
        stats.total_duration_ms
    );

    Ok(GeneratedReport {
        docx,
        coordinates,
        trend: chart.trend,
        page_count: pages.len(),
        stats,
    })
}

/// Generate a report and write it to `output_path`.
///
/// Uses atomic write (temp file + rename) so a failed run never leaves a
/// partial `.docx` behind.
pub async fn generate_to_file(
    request: ReportRequest,
    output_path: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<GeneratedReport, ReportError> {
    let report = generate_report(request, config).await?;
    let path = output_path.as_ref();
    let write_err = |e: std::io::Error| ReportError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("docx.tmp");
    tokio::fs::write(&tmp_path, &report.docx)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    Ok(report)
}
