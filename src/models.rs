use chrono::NaiveDate;
use serde::Serialize;

use crate::dataset::DatasetKind;
use crate::monthly::MonthKey;
use crate::risk::{LocationScore, RiskLevel};
use crate::trend::ProjectionResult;

/// One row of a snapshot, reduced to the volume column(s) of its dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub date: NaiveDate,
    pub state: String,
    pub district: String,
    pub pincode: String,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthAnomaly {
    pub month: MonthKey,
    pub total: f64,
    pub mom_change: f64,
    pub z_score: f64,
    pub rolling_avg: f64,
    pub is_anomaly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRisk {
    pub pincode: String,
    pub district: String,
    pub state: String,
    pub months: usize,
    pub total: f64,
    #[serde(flatten)]
    pub score: LocationScore,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub dataset: DatasetKind,
    pub record_count: usize,
    pub horizon_months: u32,
    pub capacity_threshold: f64,
    pub projection: ProjectionResult,
    pub risk_level: RiskLevel,
    pub months: Vec<MonthAnomaly>,
    pub missing_months: Vec<MonthKey>,
    pub gaps_filled: bool,
    pub top_locations: Vec<LocationRisk>,
}

impl AnalysisReport {
    pub fn anomaly_count(&self) -> usize {
        self.months.iter().filter(|m| m.is_anomaly).count()
    }
}
