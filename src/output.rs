//! Output types returned by report generation.

use crate::pipeline::coords::CoordinateSequence;
use crate::pipeline::trend::TrendLine;
use serde::Serialize;

/// A finished report plus what went into it.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedReport {
    /// The `.docx` package.
    #[serde(skip)]
    pub docx: Vec<u8>,

    /// Coordinates the chart was drawn from.
    pub coordinates: CoordinateSequence,

    /// Least-squares fit shown on the chart, if one was drawn.
    pub trend: Option<TrendLine>,

    /// Number of document pages embedded (0 when no document was supplied).
    pub page_count: usize,

    pub stats: ReportStats,
}

/// Per-stage wall-clock timings, in milliseconds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportStats {
    pub extract_duration_ms: u64,
    pub rasterize_duration_ms: u64,
    pub chart_duration_ms: u64,
    pub assemble_duration_ms: u64,
    pub total_duration_ms: u64,
}
