use std::fmt::Write;

use crate::dataset::DatasetKind;
use crate::models::AnalysisReport;
use crate::trend::{round_half_up, ProjectionResult};

/// One-line operational reading of a projection for the given dataset.
pub fn impact_statement(kind: DatasetKind, projection: &ProjectionResult) -> String {
    match kind {
        DatasetKind::Enrolment => format!(
            "If current enrolment trends continue, an estimated {} additional residents will seek enrolment next period, lengthening queues at high-traffic centres.",
            projection.projected_growth
        ),
        DatasetKind::Demographic => format!(
            "If demographic update trends continue at this rate ({:+}/mo), data validation load will rise and may affect authentication latency.",
            round_half_up(projection.slope) as i64
        ),
        DatasetKind::Biometric => format!(
            "If biometric authentication trends continue ({}), expect {} attempts next period; higher volume raises the chance of authentication failures.",
            projection.trend_direction, projection.projected_value
        ),
    }
}

pub fn build_report(report: &AnalysisReport) -> String {
    let kind = report.dataset;
    let mut output = String::new();
    let projection = &report.projection;

    let _ = writeln!(output, "# {} Trend Report", title_case(kind.as_str()));
    let _ = writeln!(
        output,
        "Generated from {} records ({} months, {}-month horizon)",
        report.record_count,
        report.months.len(),
        report.horizon_months
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Projection");

    if report.months.len() < 2 {
        let _ = writeln!(output, "Not enough monthly data to fit a trend.");
    } else {
        let _ = writeln!(output, "- Trend: {} ({:+.1}/month)", projection.trend_direction, projection.slope);
        let _ = writeln!(
            output,
            "- Projected {}: {} ({:+} over {} months)",
            kind.volume_label(),
            projection.projected_value,
            projection.projected_growth,
            report.horizon_months
        );
    }
    let _ = writeln!(
        output,
        "- Capacity risk: {} (threshold {:.0})",
        report.risk_level, report.capacity_threshold
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "{}", impact_statement(kind, projection));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Totals");

    if report.months.is_empty() {
        let _ = writeln!(output, "No records in this snapshot.");
    } else {
        let _ = writeln!(output, "| Month | Total | MoM % | z | 3-mo avg | Flag |");
        let _ = writeln!(output, "|---|---:|---:|---:|---:|---|");
        for month in &report.months {
            let _ = writeln!(
                output,
                "| {} | {:.0} | {:+.1} | {:.2} | {:.0} | {} |",
                month.month,
                month.total,
                month.mom_change,
                month.z_score,
                month.rolling_avg,
                if month.is_anomaly { "anomaly" } else { "" }
            );
        }
    }

    if !report.missing_months.is_empty() {
        let months: Vec<String> = report.missing_months.iter().map(|m| m.to_string()).collect();
        let _ = writeln!(output);
        let _ = writeln!(output, "## Data Gaps");
        let _ = writeln!(
            output,
            "No rows for {}{}.",
            months.join(", "),
            if report.gaps_filled { " (counted as zero)" } else { "" }
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Locations");

    if report.top_locations.is_empty() {
        let _ = writeln!(output, "No locations in this snapshot.");
    } else {
        for location in &report.top_locations {
            let _ = writeln!(
                output,
                "- {} ({}, {}) [{}] score {:.1}: {:.0} across {} months, volatility {:.1}%, {} spikes",
                location.pincode,
                location.district,
                location.state,
                location.score.risk_level,
                location.score.risk_score,
                location.total,
                location.months,
                location.score.volatility,
                location.score.spike_count
            );
        }
    }

    output
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
