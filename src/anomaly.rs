use crate::models::MonthAnomaly;
use crate::monthly::MonthlySeries;

pub const Z_SCORE_LIMIT: f64 = 2.0;
pub const MOM_CHANGE_LIMIT: f64 = 50.0;
const ROLLING_WINDOW: usize = 3;

/// Flags months whose total sits more than two standard deviations from the
/// mean, or that moved more than 50% from the previous month.
pub fn detect(series: &MonthlySeries) -> Vec<MonthAnomaly> {
    let months: Vec<_> = series.months().collect();
    if months.is_empty() {
        return Vec::new();
    }

    let n = months.len() as f64;
    let mean = months.iter().map(|(_, total)| total).sum::<f64>() / n;
    let std_dev = (months
        .iter()
        .map(|(_, total)| (total - mean).powi(2))
        .sum::<f64>()
        / n)
        .sqrt();

    months
        .iter()
        .enumerate()
        .map(|(idx, &(month, total))| {
            let previous = if idx > 0 { months[idx - 1].1 } else { total };
            let mom_change = if previous > 0.0 {
                (total - previous) / previous * 100.0
            } else {
                0.0
            };
            let z_score = if std_dev > 0.0 {
                (total - mean) / std_dev
            } else {
                0.0
            };

            let start = (idx + 1).saturating_sub(ROLLING_WINDOW);
            let window = &months[start..=idx];
            let rolling_avg = window.iter().map(|(_, t)| t).sum::<f64>() / window.len() as f64;

            MonthAnomaly {
                month,
                total,
                mom_change,
                z_score,
                rolling_avg,
                is_anomaly: z_score.abs() > Z_SCORE_LIMIT || mom_change.abs() > MOM_CHANGE_LIMIT,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monthly::MonthKey;

    fn series(values: &[f64]) -> MonthlySeries {
        let mut month = MonthKey::new(2025, 6);
        let mut points = Vec::new();
        for value in values {
            points.push((month, *value));
            month = month.next();
        }
        MonthlySeries::from_points(points)
    }

    #[test]
    fn empty_series_has_no_rows() {
        assert!(detect(&MonthlySeries::default()).is_empty());
    }

    #[test]
    fn first_month_has_no_change() {
        let rows = detect(&series(&[100.0, 120.0]));
        assert_eq!(rows[0].mom_change, 0.0);
        assert!((rows[1].mom_change - 20.0).abs() < 1e-9);
        assert_eq!(rows[1].month, MonthKey::new(2025, 7));
    }

    #[test]
    fn flat_series_is_quiet() {
        let rows = detect(&series(&[40.0; 5]));
        assert!(rows.iter().all(|row| !row.is_anomaly && row.z_score == 0.0));
        assert!(rows.iter().all(|row| row.rolling_avg == 40.0));
    }

    #[test]
    fn large_jump_is_flagged() {
        let rows = detect(&series(&[100.0, 105.0, 98.0, 210.0, 101.0]));
        assert!(!rows[1].is_anomaly);
        assert!(rows[3].is_anomaly);
        // 210 -> 101 is a 52% drop
        assert!(rows[4].is_anomaly);
    }

    #[test]
    fn outlier_is_flagged_by_z_score() {
        let mut values = vec![100.0; 9];
        values.push(130.0);
        let rows = detect(&series(&values));
        // 30% move, but three standard deviations from the mean
        assert!(rows[9].mom_change.abs() < MOM_CHANGE_LIMIT);
        assert!(rows[9].z_score > Z_SCORE_LIMIT);
        assert!(rows[9].is_anomaly);
    }

    #[test]
    fn rolling_average_uses_trailing_three_months() {
        let rows = detect(&series(&[3.0, 6.0, 9.0, 12.0]));
        assert_eq!(rows[0].rolling_avg, 3.0);
        assert_eq!(rows[1].rolling_avg, 4.5);
        assert_eq!(rows[3].rolling_avg, 9.0);
    }

    #[test]
    fn change_from_zero_month_is_not_a_spike() {
        let rows = detect(&series(&[0.0, 500.0]));
        assert_eq!(rows[1].mom_change, 0.0);
    }
}
