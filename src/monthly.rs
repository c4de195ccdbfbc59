//! Calendar-month aggregation of snapshot rows.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

use crate::models::UsageRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Monthly totals in chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySeries {
    totals: BTreeMap<MonthKey, f64>,
}

impl MonthlySeries {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a UsageRecord>,
    {
        Self::from_points(
            records
                .into_iter()
                .map(|record| (MonthKey::from_date(record.date), record.volume)),
        )
    }

    /// Sums `(month, volume)` points; repeated months accumulate.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (MonthKey, f64)>,
    {
        let mut totals = BTreeMap::new();
        for (month, volume) in points {
            *totals.entry(month).or_insert(0.0) += volume;
        }
        Self { totals }
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn months(&self) -> impl Iterator<Item = (MonthKey, f64)> + '_ {
        self.totals.iter().map(|(month, total)| (*month, *total))
    }

    pub fn values(&self) -> Vec<f64> {
        self.totals.values().copied().collect()
    }

    /// Months between the first and last present month that have no rows.
    pub fn missing_months(&self) -> Vec<MonthKey> {
        let (first, last) = match (self.totals.keys().next(), self.totals.keys().next_back()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Vec::new(),
        };

        let mut missing = Vec::new();
        let mut month = first;
        while month < last {
            if !self.totals.contains_key(&month) {
                missing.push(month);
            }
            month = month.next();
        }
        missing
    }

    /// Inserts zero totals for missing months so the series is gap-free.
    pub fn fill_gaps(&mut self) {
        for month in self.missing_months() {
            self.totals.insert(month, 0.0);
        }
    }
}

/// One pincode's monthly totals, labelled with the state and district of its
/// first row.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSeries {
    pub state: String,
    pub district: String,
    pub series: MonthlySeries,
}

/// Groups records per pincode into their own monthly series.
pub fn by_location<'a, I>(records: I) -> BTreeMap<String, LocationSeries>
where
    I: IntoIterator<Item = &'a UsageRecord>,
{
    let mut grouped: BTreeMap<String, (&'a UsageRecord, Vec<(MonthKey, f64)>)> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.pincode.clone())
            .or_insert_with(|| (record, Vec::new()))
            .1
            .push((MonthKey::from_date(record.date), record.volume));
    }

    grouped
        .into_iter()
        .map(|(pincode, (first, points))| {
            let location = LocationSeries {
                state: first.state.clone(),
                district: first.district.clone(),
                series: MonthlySeries::from_points(points),
            };
            (pincode, location)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: (i32, u32, u32), pincode: &str, volume: f64) -> UsageRecord {
        UsageRecord {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            state: "Tamil Nadu".to_string(),
            district: "Chennai".to_string(),
            pincode: pincode.to_string(),
            volume,
        }
    }

    #[test]
    fn month_keys_roll_over_years() {
        assert_eq!(MonthKey::new(2025, 12).next(), MonthKey::new(2026, 1));
        assert_eq!(MonthKey::new(2025, 6).next(), MonthKey::new(2025, 7));
        assert_eq!(MonthKey::new(2026, 1).to_string(), "2026-01");
        assert!(MonthKey::new(2025, 12) < MonthKey::new(2026, 1));
    }

    #[test]
    fn sums_records_per_month_in_order() {
        let records = vec![
            record((2026, 1, 3), "600001", 5.0),
            record((2025, 11, 20), "600001", 7.0),
            record((2026, 1, 28), "600002", 4.0),
            record((2025, 12, 1), "600002", 1.0),
        ];
        let series = MonthlySeries::from_records(&records);

        assert_eq!(series.len(), 3);
        assert_eq!(series.values(), vec![7.0, 1.0, 9.0]);
        assert!(series.missing_months().is_empty());
    }

    #[test]
    fn reports_and_fills_gaps() {
        let records = vec![
            record((2025, 10, 1), "600001", 3.0),
            record((2026, 1, 1), "600001", 6.0),
        ];
        let mut series = MonthlySeries::from_records(&records);

        assert_eq!(
            series.missing_months(),
            vec![MonthKey::new(2025, 11), MonthKey::new(2025, 12)]
        );

        series.fill_gaps();
        assert_eq!(series.values(), vec![3.0, 0.0, 0.0, 6.0]);
        assert!(series.missing_months().is_empty());
    }

    #[test]
    fn empty_series_has_no_gaps() {
        let series = MonthlySeries::default();
        assert!(series.is_empty());
        assert!(series.missing_months().is_empty());
    }

    #[test]
    fn groups_by_pincode() {
        let mut madurai = record((2025, 11, 2), "625001", 2.0);
        madurai.district = "Madurai".to_string();
        let records = vec![
            madurai,
            record((2025, 11, 9), "600001", 1.0),
            record((2025, 12, 9), "600001", 8.0),
            record((2025, 11, 30), "625001", 2.5),
        ];
        let grouped = by_location(&records);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["600001"].series.values(), vec![1.0, 8.0]);
        assert_eq!(grouped["600001"].district, "Chennai");
        assert_eq!(grouped["625001"].series.values(), vec![4.5]);
        assert_eq!(grouped["625001"].district, "Madurai");
        assert_eq!(grouped["625001"].state, "Tamil Nadu");
    }
}
