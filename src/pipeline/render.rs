//! PDF rasterisation: render every page to PNG via pdfium.
//!
//! The pdfium handle is bound per call and dropped on every exit path, so no
//! engine state outlives a request. Callers run this on a blocking thread;
//! pdfium is CPU-bound and not async-safe.
//!
//! ## Failure classification
//!
//! Open failures are classified from pdfium's structured `FPDF_ERR_*` codes
//! rather than from message text:
//!
//! | pdfium code            | result                                          |
//! |------------------------|-------------------------------------------------|
//! | `PASSWORD`, `SECURITY` | [`ReportError::EncryptedDocument`]              |
//! | `FORMAT`               | malformed: "corrupted internal structure" when the bytes look like a PDF whose cross-reference table is missing, otherwise "corrupt or invalid format" |
//! | anything else          | malformed, with pdfium's diagnostic             |
//!
//! A best-effort message check for "password"/"encrypt" remains for errors
//! pdfium does not tag with a code.

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::pipeline::encode::encode_png;
use pdfium_render::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How far back from the end of the file to look for a cross-reference marker.
const XREF_TAIL_BYTES: usize = 2048;

/// One rasterised page of the uploaded document.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    /// 1-based page index in source order.
    pub page_number: usize,
    pub width: u32,
    pub height: u32,
    /// PNG-encoded raster.
    #[serde(skip)]
    pub png: Vec<u8>,
}

// ── Engine binding ──────────────────────────────────────────────────────────

/// Bind to a pdfium library.
///
/// Resolution order: `config.pdfium_lib_path`, then `PDFIUM_LIB_PATH`, then the
/// system library search path. A directory is resolved to the platform's
/// library file name inside it.
pub fn bind_pdfium(config: &ReportConfig) -> Result<Pdfium, ReportError> {
    let explicit = config
        .pdfium_lib_path
        .clone()
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match explicit {
        Some(path) => {
            let lib = library_file(&path);
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib)
                .map_err(|e| ReportError::PdfiumBindingFailed(format!("{}: {e}", lib.display())))?
        }
        None => Pdfium::bind_to_system_library()
            .map_err(|e| ReportError::PdfiumBindingFailed(e.to_string()))?,
    };
    Ok(Pdfium::new(bindings))
}

fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

// ── Rasterisation ───────────────────────────────────────────────────────────

/// Rasterise every page of a PDF, in page order.
///
/// Fail-fast: the first page that fails aborts the whole call and no pages
/// are returned.
///
/// # Errors
/// * [`ReportError::MalformedDocument`] for empty, unopenable or unrenderable input
/// * [`ReportError::EncryptedDocument`] when the PDF needs a password
/// * [`ReportError::ResourceExhausted`] when the file or a page is too large
/// * [`ReportError::PdfiumBindingFailed`] when no pdfium library can be loaded
pub fn rasterize_pdf(bytes: &[u8], config: &ReportConfig) -> Result<Vec<RenderedPage>, ReportError> {
    check_document_size(bytes, config)?;
    let pdfium = bind_pdfium(config)?;
    rasterize_with(&pdfium, bytes, config)
}

/// Same as [`rasterize_pdf`] with an already-bound engine.
pub fn rasterize_with(
    pdfium: &Pdfium,
    bytes: &[u8],
    config: &ReportConfig,
) -> Result<Vec<RenderedPage>, ReportError> {
    check_document_size(bytes, config)?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| classify_open_error(&e, bytes))?;

    let pages = document.pages();
    let total = pages.len() as usize;
    info!("PDF loaded: {} pages", total);

    let scale = config.render_scale();
    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);

    let mut results = Vec::with_capacity(total);
    for (idx, page) in pages.iter().enumerate() {
        let page_number = idx + 1;

        let (width_pt, height_pt) = (page.width().value, page.height().value);
        if !fits_pixel_budget(width_pt, height_pt, scale, config.max_page_pixels) {
            return Err(page_exhausted(page_number));
        }

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| classify_render_error(&e, page_number))?;
        let image = bitmap.as_image();
        let png = encode_png(&image)?;

        debug!(
            "Rendered page {} → {}x{} px, {} bytes PNG",
            page_number,
            image.width(),
            image.height(),
            png.len()
        );
        results.push(RenderedPage {
            page_number,
            width: image.width(),
            height: image.height(),
            png,
        });
    }

    Ok(results)
}

fn check_document_size(bytes: &[u8], config: &ReportConfig) -> Result<(), ReportError> {
    if bytes.is_empty() {
        return Err(ReportError::malformed("Invalid PDF: document is empty"));
    }
    if bytes.len() > config.max_document_bytes {
        return Err(ReportError::exhausted(format!(
            "Not enough memory to process PDF ({} bytes, limit {}). Try reducing file size.",
            bytes.len(),
            config.max_document_bytes
        )));
    }
    Ok(())
}

/// Bitmap size in pixels for a page of `width_pt × height_pt` points at `scale`.
fn projected_size(width_pt: f32, height_pt: f32, scale: f32) -> (u64, u64) {
    let px = |pt: f32| (f64::from(pt) * f64::from(scale)).ceil().max(0.0) as u64;
    (px(width_pt), px(height_pt))
}

fn fits_pixel_budget(width_pt: f32, height_pt: f32, scale: f32, max_pixels: u64) -> bool {
    let (w, h) = projected_size(width_pt, height_pt, scale);
    w.saturating_mul(h) <= max_pixels
}

fn page_exhausted(page_number: usize) -> ReportError {
    ReportError::exhausted(format!(
        "Not enough memory to render page {page_number}. Try reducing image resolution or file size."
    ))
}

// ── Classification ──────────────────────────────────────────────────────────

/// Map a pdfium open failure onto the report error taxonomy.
pub(crate) fn classify_open_error(err: &PdfiumError, bytes: &[u8]) -> ReportError {
    match err {
        PdfiumError::PdfiumLibraryInternalError(
            PdfiumInternalError::PasswordError | PdfiumInternalError::SecurityError,
        ) => ReportError::EncryptedDocument,
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FormatError) => {
            if looks_like_pdf(bytes) && !has_xref_marker(bytes) {
                ReportError::malformed("Invalid PDF: corrupted internal structure")
            } else {
                ReportError::malformed("Invalid PDF: corrupt or invalid format")
            }
        }
        other => {
            let detail = format!("{other:?}");
            let lower = detail.to_lowercase();
            if lower.contains("password") || lower.contains("encrypt") {
                ReportError::EncryptedDocument
            } else {
                ReportError::malformed(format!("Invalid PDF: {detail}"))
            }
        }
    }
}

/// Map a per-page render failure. pdfium reports a failed bitmap allocation
/// as an untagged internal error.
pub(crate) fn classify_render_error(err: &PdfiumError, page_number: usize) -> ReportError {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::Unknown) => {
            page_exhausted(page_number)
        }
        other => ReportError::malformed(format!("Failed to render page {page_number}: {other:?}")),
    }
}

fn looks_like_pdf(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    contains(head, b"%PDF-")
}

fn has_xref_marker(bytes: &[u8]) -> bool {
    let tail = &bytes[bytes.len().saturating_sub(XREF_TAIL_BYTES)..];
    contains(tail, b"startxref") || contains(tail, b"xref")
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
