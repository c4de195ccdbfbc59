use serde::Serialize;

use crate::dataset::DatasetKind;
use crate::error::{AnalyticsError, Result};

pub const DEFAULT_HORIZON_MONTHS: u32 = 3;
pub const DEFAULT_TOP_LOCATIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    pub horizon: u32,
    pub capacity_threshold: f64,
    pub fill_gaps: bool,
    pub top_locations: usize,
}

impl AnalysisConfig {
    pub fn for_dataset(kind: DatasetKind) -> Self {
        Self {
            horizon: DEFAULT_HORIZON_MONTHS,
            capacity_threshold: kind.default_capacity(),
            fill_gaps: false,
            top_locations: DEFAULT_TOP_LOCATIONS,
        }
    }

    pub fn with_horizon(mut self, horizon: Option<u32>) -> Self {
        if let Some(horizon) = horizon {
            self.horizon = horizon;
        }
        self
    }

    pub fn with_capacity_threshold(mut self, threshold: Option<f64>) -> Self {
        if let Some(threshold) = threshold {
            self.capacity_threshold = threshold;
        }
        self
    }

    pub fn with_fill_gaps(mut self, fill_gaps: bool) -> Self {
        self.fill_gaps = fill_gaps;
        self
    }

    pub fn with_top_locations(mut self, top_locations: usize) -> Self {
        self.top_locations = top_locations;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(AnalyticsError::InvalidHorizon);
        }
        if !self.capacity_threshold.is_finite() || self.capacity_threshold <= 0.0 {
            return Err(AnalyticsError::InvalidThreshold(self.capacity_threshold));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_defaults_apply_until_overridden() {
        let config = AnalysisConfig::for_dataset(DatasetKind::Biometric);
        assert_eq!(config.horizon, 3);
        assert_eq!(config.capacity_threshold, 30_000.0);

        let config = config
            .with_horizon(Some(6))
            .with_capacity_threshold(None)
            .with_fill_gaps(true);
        assert_eq!(config.horizon, 6);
        assert_eq!(config.capacity_threshold, 30_000.0);
        assert!(config.fill_gaps);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_horizon_and_threshold() {
        let config = AnalysisConfig::for_dataset(DatasetKind::Enrolment);
        assert!(matches!(
            config.clone().with_horizon(Some(0)).validate(),
            Err(AnalyticsError::InvalidHorizon)
        ));
        assert!(matches!(
            config.with_capacity_threshold(Some(0.0)).validate(),
            Err(AnalyticsError::InvalidThreshold(_))
        ));
    }
}
