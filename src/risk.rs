use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::error::{AnalyticsError, Result};
use crate::models::LocationRisk;
use crate::monthly::LocationSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }

    /// Tier for a 0-100 location volatility score.
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            RiskLevel::Critical
        } else if score >= 50.0 {
            RiskLevel::High
        } else if score >= 30.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a projected volume onto a capacity tier. Boundaries belong to the
/// lower tier: a ratio of exactly 1.2 is `High`.
///
/// A zero, negative or non-finite threshold is rejected instead of being
/// allowed to divide into `Critical`.
pub fn classify(volume: f64, capacity_threshold: f64) -> Result<RiskLevel> {
    if !capacity_threshold.is_finite() || capacity_threshold <= 0.0 {
        warn!(capacity_threshold, "rejecting non-positive capacity threshold");
        return Err(AnalyticsError::InvalidThreshold(capacity_threshold));
    }

    let ratio = volume / capacity_threshold;
    let level = if ratio > 1.2 {
        RiskLevel::Critical
    } else if ratio > 1.0 {
        RiskLevel::High
    } else if ratio > 0.8 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    Ok(level)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationScore {
    pub volatility: f64,
    pub spike_count: usize,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

/// Scores one location's monthly totals for volatility risk.
pub fn score_location(values: &[f64]) -> LocationScore {
    let (volatility, spike_count, risk_score) = match values {
        [] => (0.0, 0, 0.0),
        [single] => (0.0, 0, sparse_score(*single)),
        _ => {
            let volatility = coefficient_of_variation(values);
            let spike_count = count_spikes(values);
            let short_history = if values.len() < 3 { 20.0 } else { 0.0 };
            let score = (volatility * 0.4 + spike_count as f64 * 15.0 + short_history).min(100.0);
            (volatility, spike_count, score)
        }
    };

    LocationScore {
        volatility,
        spike_count,
        risk_score,
        risk_level: RiskLevel::from_score(risk_score),
    }
}

/// Heuristic for locations with a single month of data.
fn sparse_score(total: f64) -> f64 {
    if total < 10.0 {
        80.0
    } else if total > 1000.0 {
        60.0
    } else {
        20.0
    }
}

/// Population standard deviation over mean, as a percentage.
fn coefficient_of_variation(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean * 100.0
}

/// Month-over-month moves of more than 100% from a non-zero base.
fn count_spikes(values: &[f64]) -> usize {
    values
        .windows(2)
        .filter(|pair| pair[0] > 0.0 && ((pair[1] - pair[0]) / pair[0]).abs() > 1.0)
        .count()
}

/// Scores every location and returns them riskiest first.
pub fn rank_locations<'a, I>(locations: I) -> Vec<LocationRisk>
where
    I: IntoIterator<Item = (&'a str, &'a LocationSeries)>,
{
    let mut ranked: Vec<LocationRisk> = locations
        .into_iter()
        .map(|(pincode, location)| {
            let values = location.series.values();
            LocationRisk {
                pincode: pincode.to_string(),
                district: location.district.clone(),
                state: location.state.clone(),
                months: values.len(),
                total: values.iter().sum(),
                score: score_location(&values),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .risk_score
            .partial_cmp(&a.score.risk_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monthly::{MonthKey, MonthlySeries};

    fn location(district: &str, values: &[f64]) -> LocationSeries {
        let mut month = MonthKey::new(2025, 6);
        let mut points = Vec::new();
        for value in values {
            points.push((month, *value));
            month = month.next();
        }
        LocationSeries {
            state: "Tamil Nadu".to_string(),
            district: district.to_string(),
            series: MonthlySeries::from_points(points),
        }
    }

    #[test]
    fn capacity_tiers_use_strict_bounds() {
        assert_eq!(classify(1000.0, 1000.0).unwrap(), RiskLevel::Medium);
        assert_eq!(classify(1201.0, 1000.0).unwrap(), RiskLevel::Critical);
        assert_eq!(classify(1200.0, 1000.0).unwrap(), RiskLevel::High);
        assert_eq!(classify(1001.0, 1000.0).unwrap(), RiskLevel::High);
        assert_eq!(classify(800.0, 1000.0).unwrap(), RiskLevel::Low);
        assert_eq!(classify(801.0, 1000.0).unwrap(), RiskLevel::Medium);
        assert_eq!(classify(0.0, 30000.0).unwrap(), RiskLevel::Low);
    }

    #[test]
    fn rejects_unusable_thresholds() {
        for threshold in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                classify(100.0, threshold),
                Err(AnalyticsError::InvalidThreshold(_))
            ));
        }
    }

    #[test]
    fn levels_are_ordered() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::Medium > RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(70.0), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(49.9), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(29.0), RiskLevel::Low);
    }

    #[test]
    fn single_month_uses_sparse_heuristics() {
        assert_eq!(score_location(&[4.0]).risk_score, 80.0);
        assert_eq!(score_location(&[4.0]).risk_level, RiskLevel::Critical);
        assert_eq!(score_location(&[5000.0]).risk_level, RiskLevel::High);
        assert_eq!(score_location(&[200.0]).risk_level, RiskLevel::Low);
        assert_eq!(score_location(&[]).risk_score, 0.0);
    }

    #[test]
    fn steady_location_scores_low() {
        let score = score_location(&[100.0, 100.0, 100.0, 100.0]);
        assert_eq!(score.volatility, 0.0);
        assert_eq!(score.spike_count, 0);
        assert_eq!(score.risk_level, RiskLevel::Low);
    }

    #[test]
    fn spikes_and_short_history_accumulate() {
        // 10 -> 30 is a 200% move; mean 20, stddev 10, volatility 50%
        let score = score_location(&[10.0, 30.0]);
        assert_eq!(score.spike_count, 1);
        assert!((score.volatility - 50.0).abs() < 1e-9);
        assert!((score.risk_score - (20.0 + 15.0 + 20.0)).abs() < 1e-9);
        assert_eq!(score.risk_level, RiskLevel::High);
    }

    #[test]
    fn spikes_from_zero_base_are_ignored() {
        assert_eq!(count_spikes(&[0.0, 500.0, 520.0]), 0);
    }

    #[test]
    fn ranks_riskiest_first() {
        let steady = location("Chennai", &[100.0, 102.0, 98.0, 101.0]);
        let erratic = location("Vellore", &[10.0, 90.0, 5.0, 120.0]);
        let ranked = rank_locations([("600001", &steady), ("632001", &erratic)]);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].pincode, "632001");
        assert_eq!(ranked[0].district, "Vellore");
        assert_eq!(ranked[0].state, "Tamil Nadu");
        assert_eq!(ranked[1].district, "Chennai");
        assert_eq!(ranked[0].months, 4);
        assert_eq!(ranked[0].total, 225.0);
        assert!(ranked[0].score.risk_score > ranked[1].score.risk_score);
    }
}
