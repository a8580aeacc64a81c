//! Coordinate extraction from an `.xlsx` upload.
//!
//! Row 1 of the first worksheet is a header. Data is read from row 2
//! onward, x from column A and y from column B, until ten coordinates have
//! been collected. Rows where either cell is empty are skipped.
//!
//! Cells are addressed by absolute position: calamine trims a sheet's range
//! to its first non-empty cell, so `Range::rows()` alone would misalign a
//! sheet whose header row is blank.

use crate::config::MAX_COORDINATES;
use crate::error::ReportError;
use crate::pipeline::coords::{parse_number, Coordinate, CoordinateSequence};
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::io::Cursor;
use tracing::debug;

/// Zero-based index of the first data row (row 2 in the sheet).
const FIRST_DATA_ROW: u32 = 1;

/// Parse coordinates from the raw bytes of an `.xlsx` workbook.
///
/// # Errors
/// [`ReportError::InvalidCoordinateInput`] when the bytes are not a readable
/// workbook, a non-empty cell is not numeric, or no coordinate was found.
pub fn parse_coordinates_xlsx(bytes: &[u8]) -> Result<CoordinateSequence, ReportError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| ReportError::invalid_coordinates(format!("Spreadsheet error: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            ReportError::invalid_coordinates("Spreadsheet error: workbook has no worksheets")
        })?
        .map_err(|e| ReportError::invalid_coordinates(format!("Spreadsheet error: {e}")))?;

    let mut points = Vec::with_capacity(MAX_COORDINATES);
    if let Some((last_row, _)) = range.end() {
        for row in FIRST_DATA_ROW..=last_row {
            let x = range.get_value((row, 0));
            let y = range.get_value((row, 1));
            let (Some(x), Some(y)) = (non_null(x), non_null(y)) else {
                continue;
            };
            let excel_row = row + 1;
            points.push(Coordinate::new(cell_f64(x, excel_row)?, cell_f64(y, excel_row)?));
            if points.len() >= MAX_COORDINATES {
                break;
            }
        }
    }

    if points.is_empty() {
        return Err(ReportError::invalid_coordinates(
            "Spreadsheet error: spreadsheet contains no coordinates",
        ));
    }

    debug!("Parsed {} coordinates from spreadsheet", points.len());
    CoordinateSequence::new(points)
}

fn non_null(cell: Option<&Data>) -> Option<&Data> {
    cell.filter(|c| !matches!(c, Data::Empty))
}

fn cell_f64(cell: &Data, excel_row: u32) -> Result<f64, ReportError> {
    let value = match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f).filter(|f| f.is_finite()),
        Data::Bool(b) => Some(f64::from(u8::from(*b))),
        Data::String(s) => parse_number(s),
        _ => None,
    };
    value.ok_or_else(|| {
        ReportError::invalid_coordinates(format!(
            "Spreadsheet error: row {excel_row} has a non-numeric value: {cell}"
        ))
    })
}
