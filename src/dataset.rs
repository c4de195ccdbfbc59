//! Per-dataset CSV schemas.
//!
//! Each snapshot kind names the columns it needs up front; a missing column
//! is an error rather than a silent zero.

use std::fmt;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use clap::ValueEnum;
use csv::StringRecord;
use serde::Serialize;
use tracing::debug;

use crate::error::{AnalyticsError, Result};
use crate::models::UsageRecord;

const DATE_FORMATS: [&str; 2] = ["%d-%m-%Y", "%Y-%m-%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Enrolment,
    Demographic,
    Biometric,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Enrolment => "enrolment",
            DatasetKind::Demographic => "demographic",
            DatasetKind::Biometric => "biometric",
        }
    }

    /// Columns summed into a row's volume.
    pub fn volume_columns(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Enrolment => &["age_0_5", "age_5_17", "age_18_greater"],
            DatasetKind::Demographic => &["total_updates"],
            DatasetKind::Biometric => &["bio_age_5_17", "bio_age_17_"],
        }
    }

    /// Monthly volume treated as full operating capacity.
    pub fn default_capacity(&self) -> f64 {
        match self {
            DatasetKind::Enrolment => 2_000.0,
            DatasetKind::Demographic => 15_000.0,
            DatasetKind::Biometric => 30_000.0,
        }
    }

    pub fn volume_label(&self) -> &'static str {
        match self {
            DatasetKind::Enrolment => "enrolments",
            DatasetKind::Demographic => "demographic updates",
            DatasetKind::Biometric => "biometric attempts",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Columns {
    date: usize,
    state: usize,
    district: usize,
    pincode: usize,
    volume: Vec<(&'static str, usize)>,
}

impl Columns {
    fn resolve(headers: &StringRecord, kind: DatasetKind) -> Result<Self> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|header| header.trim() == column)
                .ok_or(AnalyticsError::MissingColumn {
                    dataset: kind.as_str(),
                    column,
                })
        };

        let mut volume = Vec::new();
        for &column in kind.volume_columns() {
            volume.push((column, find(column)?));
        }

        Ok(Self {
            date: find("date")?,
            state: find("state")?,
            district: find("district")?,
            pincode: find("pincode")?,
            volume,
        })
    }
}

pub fn load_csv(path: &Path, kind: DatasetKind) -> Result<Vec<UsageRecord>> {
    let file = std::fs::File::open(path)?;
    read_records(file, kind)
}

/// Parses a snapshot. Rows without a date or pincode are skipped.
pub fn read_records<R: Read>(reader: R, kind: DatasetKind) -> Result<Vec<UsageRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = Columns::resolve(reader.headers()?, kind)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let raw = result?;
        // header is line 1
        let row = idx + 2;
        let field = |index: usize| raw.get(index).map(str::trim).unwrap_or("");

        let date = field(columns.date);
        let pincode = field(columns.pincode);
        if date.is_empty() || pincode.is_empty() {
            skipped += 1;
            continue;
        }

        let mut volume = 0.0;
        for &(column, index) in &columns.volume {
            volume += parse_volume(field(index), row, column)?;
        }

        records.push(UsageRecord {
            date: parse_date(date, row)?,
            state: field(columns.state).to_string(),
            district: field(columns.district).to_string(),
            pincode: pincode.to_string(),
            volume,
        });
    }

    if skipped > 0 {
        debug!(dataset = kind.as_str(), skipped, "skipped rows without date or pincode");
    }

    Ok(records)
}

fn parse_date(value: &str, row: usize) -> Result<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .ok_or_else(|| AnalyticsError::InvalidDate {
            row,
            value: value.to_string(),
        })
}

fn parse_volume(value: &str, row: usize, column: &'static str) -> Result<f64> {
    if value.is_empty() {
        return Ok(0.0);
    }
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(AnalyticsError::InvalidNumber {
            row,
            column,
            value: value.to_string(),
        }),
    }
}
