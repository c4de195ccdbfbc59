//! Least-squares trend projection over the trailing months of a series.
//!
//! The fit is deliberately transparent: a closed-form ordinary least squares
//! slope over at most [`WINDOW_SIZE`] equally spaced samples. Projections are
//! anchored on the most recent observation rather than on the fitted line.

use std::fmt;

use serde::Serialize;

use crate::error::{AnalyticsError, Result};

/// Maximum number of trailing samples used for the fit.
pub const WINDOW_SIZE: usize = 6;

/// Slope, as a fraction of the latest value, above which a trend is "rapid".
pub const RAPID_SLOPE_RATIO: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    RapidlyRising,
    Rising,
    Stable,
    Declining,
    RapidlyDeclining,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::RapidlyRising => "Rapidly Rising",
            TrendDirection::Rising => "Rising",
            TrendDirection::Stable => "Stable",
            TrendDirection::Declining => "Declining",
            TrendDirection::RapidlyDeclining => "Rapidly Declining",
        }
    }

    pub fn is_rising(&self) -> bool {
        matches!(self, TrendDirection::Rising | TrendDirection::RapidlyRising)
    }

    /// Classifies `slope` relative to the latest observed value. Rapid bounds
    /// are checked before the plain sign checks.
    pub fn classify(slope: f64, current: f64) -> Self {
        if slope > RAPID_SLOPE_RATIO * current {
            TrendDirection::RapidlyRising
        } else if slope > 0.0 {
            TrendDirection::Rising
        } else if slope < -RAPID_SLOPE_RATIO * current {
            TrendDirection::RapidlyDeclining
        } else if slope < 0.0 {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionResult {
    pub slope: f64,
    pub projected_value: u64,
    pub trend_direction: TrendDirection,
    pub projected_growth: i64,
}

impl ProjectionResult {
    /// Result for series too short to fit.
    pub fn degenerate() -> Self {
        Self {
            slope: 0.0,
            projected_value: 0,
            trend_direction: TrendDirection::Stable,
            projected_growth: 0,
        }
    }
}

/// Projects `series` forward by `horizon` months.
///
/// Samples are treated as one per month with no gaps; x-coordinates are the
/// window positions `0..w`, not real dates. Never fails: fewer than two
/// samples yield [`ProjectionResult::degenerate`].
pub fn project(series: &[f64], horizon: u32) -> ProjectionResult {
    if series.len() < 2 {
        return ProjectionResult::degenerate();
    }

    let window_size = series.len().min(WINDOW_SIZE);
    let window = &series[series.len() - window_size..];

    let slope = match least_squares_slope(window) {
        Some(slope) => slope,
        None => return ProjectionResult::degenerate(),
    };

    let anchor = window[window_size - 1];
    let projected_growth = round_half_up(slope * f64::from(horizon));
    // f64::max discards NaN, so a NaN projection clamps to zero.
    let projected_value = round_half_up((anchor + projected_growth).max(0.0));

    ProjectionResult {
        slope,
        projected_value: projected_value as u64,
        trend_direction: TrendDirection::classify(slope, anchor),
        projected_growth: projected_growth as i64,
    }
}

/// Rounds halves toward positive infinity, so `-2.5` becomes `-2`.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Rejects negative or non-finite monthly totals.
pub fn check_series(series: &[f64]) -> Result<()> {
    match series
        .iter()
        .position(|value| !value.is_finite() || *value < 0.0)
    {
        Some(index) => Err(AnalyticsError::InvalidSample {
            index,
            value: series[index],
        }),
        None => Ok(()),
    }
}

/// Closed-form OLS slope over `0..len` x-coordinates. `None` when the
/// denominator vanishes (fewer than two samples).
fn least_squares_slope(window: &[f64]) -> Option<f64> {
    let n = window.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);

    for (i, &y) in window.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }

    Some((n * sum_xy - sum_x * sum_y) / denominator)
}
