use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use uidai_trend_watch::analysis;
use uidai_trend_watch::config::AnalysisConfig;
use uidai_trend_watch::dataset::{self, DatasetKind};
use uidai_trend_watch::report;
use uidai_trend_watch::risk;
use uidai_trend_watch::trend;

#[derive(Parser)]
#[command(name = "trend-watch")]
#[command(about = "Monthly trend projection and capacity risk for UIDAI activity snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SnapshotArgs {
    #[arg(long, value_enum)]
    dataset: DatasetKind,
    #[arg(long)]
    csv: PathBuf,
    /// Months to project forward
    #[arg(long, env = "TREND_WATCH_HORIZON")]
    horizon: Option<u32>,
    /// Monthly volume treated as full capacity (defaults per dataset)
    #[arg(long, env = "TREND_WATCH_CAPACITY")]
    threshold: Option<f64>,
    /// Count months with no rows as zero instead of skipping them
    #[arg(long)]
    fill_gaps: bool,
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

impl SnapshotArgs {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig::for_dataset(self.dataset)
            .with_horizon(self.horizon)
            .with_capacity_threshold(self.threshold)
            .with_fill_gaps(self.fill_gaps)
            .with_top_locations(self.limit)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Project an explicit series of monthly totals
    Project {
        #[arg(long, value_delimiter = ',', required = true)]
        values: Vec<f64>,
        #[arg(long, env = "TREND_WATCH_HORIZON", default_value_t = 3)]
        horizon: u32,
        #[arg(long, env = "TREND_WATCH_CAPACITY")]
        threshold: Option<f64>,
    },
    /// Analyze a CSV snapshot and print a summary
    Analyze {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Emit the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a markdown report for a CSV snapshot
    Report {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uidai_trend_watch=info,trend_watch=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Project {
            values,
            horizon,
            threshold,
        } => {
            trend::check_series(&values).context("invalid --values")?;
            let projection = trend::project(&values, horizon);
            println!(
                "Trend {} (slope {:.2}/month): projected {} ({:+}) in {} months.",
                projection.trend_direction,
                projection.slope,
                projection.projected_value,
                projection.projected_growth,
                horizon
            );
            if let Some(threshold) = threshold {
                let level = risk::classify(projection.projected_value as f64, threshold)
                    .context("cannot classify capacity risk")?;
                println!("Capacity risk: {level} (threshold {threshold}).");
            }
        }
        Commands::Analyze { snapshot, json } => {
            let records = dataset::load_csv(&snapshot.csv, snapshot.dataset)
                .with_context(|| format!("failed to load {}", snapshot.csv.display()))?;
            let analysis = analysis::analyze(snapshot.dataset, &records, &snapshot.config())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
                return Ok(());
            }

            let projection = &analysis.projection;
            println!(
                "{} months of {} data: {} (slope {:.1}/month).",
                analysis.months.len(),
                snapshot.dataset,
                projection.trend_direction,
                projection.slope
            );
            println!(
                "Projected {} in {} months: {} ({:+}), capacity risk {}.",
                snapshot.dataset.volume_label(),
                analysis.horizon_months,
                projection.projected_value,
                projection.projected_growth,
                analysis.risk_level
            );
            println!("{} anomalous months.", analysis.anomaly_count());
            println!("{}", report::impact_statement(snapshot.dataset, projection));

            if !analysis.top_locations.is_empty() {
                println!("Highest risk locations:");
                for location in &analysis.top_locations {
                    println!(
                        "- {} ({}, {}) [{}] score {:.1} across {} months",
                        location.pincode,
                        location.district,
                        location.state,
                        location.score.risk_level,
                        location.score.risk_score,
                        location.months
                    );
                }
            }
        }
        Commands::Report { snapshot, out } => {
            let records = dataset::load_csv(&snapshot.csv, snapshot.dataset)
                .with_context(|| format!("failed to load {}", snapshot.csv.display()))?;
            let analysis = analysis::analyze(snapshot.dataset, &records, &snapshot.config())?;
            let report = report::build_report(&analysis);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
