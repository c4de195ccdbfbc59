use tracing::{info, warn};

use crate::anomaly;
use crate::config::AnalysisConfig;
use crate::dataset::DatasetKind;
use crate::error::Result;
use crate::models::{AnalysisReport, UsageRecord};
use crate::monthly::{self, MonthlySeries};
use crate::risk;
use crate::trend;

/// Runs the whole pipeline over a loaded snapshot: monthly totals, projection,
/// capacity risk, anomaly flags and location ranking.
pub fn analyze(
    kind: DatasetKind,
    records: &[UsageRecord],
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    config.validate()?;

    let mut series = MonthlySeries::from_records(records);
    let missing_months = series.missing_months();
    if !missing_months.is_empty() {
        if config.fill_gaps {
            series.fill_gaps();
        } else {
            warn!(
                dataset = kind.as_str(),
                missing = missing_months.len(),
                "monthly series has gaps; projection assumes consecutive months"
            );
        }
    }

    let projection = trend::project(&series.values(), config.horizon);
    let risk_level = risk::classify(projection.projected_value as f64, config.capacity_threshold)?;

    let locations = monthly::by_location(records);
    let mut top_locations =
        risk::rank_locations(locations.iter().map(|(pincode, s)| (pincode.as_str(), s)));
    top_locations.truncate(config.top_locations);

    info!(
        dataset = kind.as_str(),
        months = series.len(),
        direction = projection.trend_direction.as_str(),
        projected = projection.projected_value,
        risk = risk_level.as_str(),
        "projection complete"
    );

    Ok(AnalysisReport {
        dataset: kind,
        record_count: records.len(),
        horizon_months: config.horizon,
        capacity_threshold: config.capacity_threshold,
        projection,
        risk_level,
        months: anomaly::detect(&series),
        missing_months,
        gaps_filled: config.fill_gaps,
        top_locations,
    })
}
