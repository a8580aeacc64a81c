//! Ordinary least-squares linear fit over a coordinate sequence.

use crate::pipeline::coords::{Coordinate, CoordinateSequence};
use serde::{Deserialize, Serialize};

/// `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// Fit a degree-1 polynomial over the points in their original order.
    ///
    /// Returns `None` for fewer than two points, when every x is identical,
    /// or when the coefficients come out non-finite. Callers draw no trend
    /// line in that case.
    pub fn fit(points: &[Coordinate]) -> Option<Self> {
        let first_x = points.first()?.x;
        if points.iter().all(|p| p.x == first_x) {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;

        // Centered sums keep the fit stable when x values are large.
        let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), p| {
            let dx = p.x - mean_x;
            (sxx + dx * dx, sxy + dx * (p.y - mean_y))
        });

        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        (slope.is_finite() && intercept.is_finite()).then_some(Self { slope, intercept })
    }

    pub fn of(seq: &CoordinateSequence) -> Option<Self> {
        Self::fit(seq.points())
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Chart label, e.g. `Trend: y=0.123x+4.560`.
    ///
    /// The `+` is literal, so a negative intercept renders as `+-1.000`.
    pub fn annotation(&self) -> String {
        format!("Trend: y={:.3}x+{:.3}", self.slope, self.intercept)
    }
}

/// Copy of the points sorted ascending by x. Stable: ties keep source order.
pub fn sorted_by_x(points: &[Coordinate]) -> Vec<Coordinate> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));
    sorted
}
