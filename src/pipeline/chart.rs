//! Trend chart rendering with plotters.
//!
//! Each call draws into its own in-memory RGB buffer, encodes it to PNG and
//! drops the buffer before returning. The only process-wide plotters state
//! is the bundled font, registered once on first use.
//!
//! Layers, bottom to top:
//! 1. scatter of the points in source order
//! 2. solid line through the x-sorted copy
//! 3. dashed least-squares trend over the sorted x values, with its equation
//!    in the top-left corner of the plotting area (two or more points, and a
//!    non-degenerate fit)

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::pipeline::coords::{Coordinate, CoordinateSequence};
use crate::pipeline::encode::encode_rgb_png;
use crate::pipeline::trend::{sorted_by_x, TrendLine};
use once_cell::sync::OnceCell;
use plotters::prelude::*;
use plotters::style::FontStyle;
use tracing::debug;

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static FONT_REGISTERED: OnceCell<()> = OnceCell::new();

const POINT_COLOR: RGBColor = RGBColor(31, 119, 180);
const TREND_COLOR: RGBColor = RGBColor(255, 127, 14);
const GRID_COLOR: RGBColor = RGBColor(220, 220, 220);

/// A rendered chart plus the fit it shows.
#[derive(Debug, Clone)]
pub struct ChartImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub trend: Option<TrendLine>,
}

fn ensure_font() -> Result<(), ReportError> {
    FONT_REGISTERED
        .get_or_try_init(|| {
            plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES)
                .map_err(|_| ReportError::Internal("Bundled chart font is invalid".into()))
        })
        .map(|_| ())
}

/// Render the trend chart for `coords` at the configured canvas size.
pub fn render_chart(coords: &CoordinateSequence, config: &ReportConfig) -> Result<ChartImage, ReportError> {
    ensure_font()?;

    let (width, height) = (config.chart_width, config.chart_height);
    let sorted = sorted_by_x(coords.points());
    let trend = TrendLine::of(coords).filter(|t| sorted.iter().all(|p| t.eval(p.x).is_finite()));

    let x_range = padded_range(coords.xs()).ok_or_else(|| span_too_wide("x"))?;
    let fit_ys = trend
        .iter()
        .flat_map(|t| sorted.iter().map(move |p| t.eval(p.x)));
    let y_range = padded_range(coords.ys().chain(fit_ys)).ok_or_else(|| span_too_wide("y"))?;

    let mut buf = vec![0u8; width as usize * height as usize * 3];
    draw(&mut buf, (width, height), coords, &sorted, trend, x_range, y_range)
        .map_err(|e| ReportError::Internal(format!("Chart rendering failed: {e}")))?;

    let png = encode_rgb_png(width, height, buf)?;
    debug!(
        "Rendered chart: {} points, trend={}, {} bytes PNG",
        coords.len(),
        trend.is_some(),
        png.len()
    );

    Ok(ChartImage {
        png,
        width,
        height,
        trend,
    })
}

fn draw(
    buf: &mut [u8],
    size: (u32, u32),
    coords: &CoordinateSequence,
    sorted: &[Coordinate],
    trend: Option<TrendLine>,
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::with_buffer(buf, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;

    chart
        .configure_mesh()
        .x_desc("X")
        .y_desc("Y")
        .light_line_style(ShapeStyle::from(&GRID_COLOR).stroke_width(1))
        .bold_line_style(ShapeStyle::from(&GRID_COLOR.mix(0.8)).stroke_width(1))
        .label_style((FONT_FAMILY, 14))
        .axis_desc_style((FONT_FAMILY, 16))
        .draw()?;

    chart.draw_series(
        coords
            .points()
            .iter()
            .map(|p| Circle::new((p.x, p.y), 4, POINT_COLOR.filled())),
    )?;

    chart.draw_series(LineSeries::new(
        sorted.iter().map(|p| (p.x, p.y)),
        ShapeStyle::from(&POINT_COLOR).stroke_width(2),
    ))?;

    if let Some(t) = trend {
        chart.draw_series(DashedLineSeries::new(
            sorted.iter().map(|p| (p.x, t.eval(p.x))),
            8,
            5,
            ShapeStyle::from(&TREND_COLOR).stroke_width(1),
        ))?;

        let area = chart.plotting_area().strip_coord_spec();
        let (w, h) = area.dim_in_pixel();
        let anchor = ((f64::from(w) * 0.02) as i32, (f64::from(h) * 0.02) as i32);
        area.draw(&Text::new(
            t.annotation(),
            anchor,
            (FONT_FAMILY, 15).into_font().color(&BLACK),
        ))?;
    }

    root.present()?;
    Ok(())
}

/// Min/max of `values` padded by 5 % each side. A flat range widens by ±1,
/// or by a few ulps of its magnitude when that is larger.
///
/// Padding is dropped when it would push a bound or the axis width past
/// `f64::MAX`. `None` when even the unpadded width is not representable.
fn padded_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return Some((-1.0, 1.0));
    }
    let span = hi - lo;
    if !span.is_finite() {
        return None;
    }
    if span <= f64::EPSILON * lo.abs().max(hi.abs()).max(1.0) {
        let pad = (lo.abs().max(hi.abs()) * f64::EPSILON * 64.0).max(1.0);
        return Some(((lo - pad).max(-f64::MAX), (hi + pad).min(f64::MAX)));
    }
    let pad = span * 0.05;
    let (plo, phi) = (lo - pad, hi + pad);
    if plo.is_finite() && phi.is_finite() && (phi - plo).is_finite() {
        Some((plo, phi))
    } else {
        Some((lo, hi))
    }
}

fn span_too_wide(axis: &str) -> ReportError {
    ReportError::invalid_coordinates(format!(
        "Invalid coordinates: {axis} values span too wide a range to chart"
    ))
}
