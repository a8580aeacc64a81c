//! Coordinate extraction from a structured-text (JSON) payload.
//!
//! The payload is expected to be a JSON array of two-element arrays:
//! `[[x1, y1], [x2, y2], ...]`. Entries that are not well-formed pairs are
//! skipped rather than failing the whole payload; only the first
//! [`MAX_COORDINATES`] valid pairs are kept.

use crate::config::MAX_COORDINATES;
use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// A single `(x, y)` point. Both components are finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ordered list of 1 to [`MAX_COORDINATES`] points, in source order.
///
/// Source order is never changed; x-sorted views are derived on demand
/// (see [`crate::pipeline::trend::sorted_by_x`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateSequence {
    points: Vec<Coordinate>,
    skipped: usize,
}

impl CoordinateSequence {
    /// Build a sequence from already-validated points.
    ///
    /// Fails when `points` is empty; truncates to [`MAX_COORDINATES`].
    pub fn new(mut points: Vec<Coordinate>) -> Result<Self, ReportError> {
        if points.is_empty() {
            return Err(ReportError::invalid_coordinates("Coordinate list is empty"));
        }
        points.truncate(MAX_COORDINATES);
        Ok(Self { points, skipped: 0 })
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: a sequence holds at least one point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of malformed entries dropped while parsing the source.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.x)
    }

    pub fn ys(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.y)
    }

    pub(crate) fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }
}

/// Parse coordinates from a JSON payload.
///
/// # Errors
/// [`ReportError::InvalidCoordinateInput`] when the payload is not JSON, is
/// not an array, or holds no usable pair.
pub fn parse_coordinates_json(payload: &str) -> Result<CoordinateSequence, ReportError> {
    let data: Value = serde_json::from_str(payload)
        .map_err(|e| ReportError::invalid_coordinates(format!("Invalid coordinates: {e}")))?;

    let Value::Array(entries) = data else {
        return Err(ReportError::invalid_coordinates(
            "Invalid coordinates: JSON must be a list of coordinates",
        ));
    };

    let mut points = Vec::with_capacity(entries.len().min(MAX_COORDINATES));
    let mut skipped = 0usize;
    for entry in &entries {
        match pair_from_value(entry) {
            Some(point) => points.push(point),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {} malformed coordinate entries", skipped);
    }
    if points.is_empty() {
        return Err(ReportError::invalid_coordinates(
            "Invalid coordinates: coordinate list is empty",
        ));
    }

    let seq = CoordinateSequence::new(points)?.with_skipped(skipped);
    debug!("Parsed {} coordinates from JSON", seq.len());
    Ok(seq)
}

fn pair_from_value(entry: &Value) -> Option<Coordinate> {
    match entry.as_array()?.as_slice() {
        [x, y] => Some(Coordinate::new(coerce_f64(x)?, coerce_f64(y)?)),
        _ => None,
    }
}

/// Coerce a JSON scalar to a finite `f64`.
///
/// Numbers pass through, booleans become 1/0, and numeric strings are parsed
/// after trimming.
pub(crate) fn coerce_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => parse_number(s)?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Parse a trimmed numeric string to a finite `f64`.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
