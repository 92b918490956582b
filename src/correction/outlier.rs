//! Modified z-score outlier removal for temperature-like variable pairs.
//!
//! Days are pooled by calendar month across the whole record, so a July
//! observation is judged against every July on file. The statistic is the
//! median/MAD-based modified z-score, robust to the skew a failing sensor
//! introduces.

use crate::stats::{nan_mad, nan_median};
use crate::types::interval::CorrectionInterval;
use crate::types::series::TimeSeries;
use crate::types::variable::Variable;
use log::info;
use serde::{Deserialize, Serialize};

/// Consistency constant relating MAD to the standard deviation of a
/// normal sample.
const MAD_SCALE: f64 = 0.6745;

/// Removal threshold on the absolute modified z-score.
const Z_LIMIT: f64 = 3.5;

/// Points removed per variable of the corrected pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub removed: Vec<(Variable, usize)>,
}

impl OutlierReport {
    pub fn total_removed(&self) -> usize {
        self.removed.iter().map(|(_, n)| n).sum()
    }
}

/// Nulls every value whose modified z-score exceeds 3.5 within its
/// calendar-month group, for both variables of the pair.
///
/// A month with zero MAD produces NaN z-scores for its median-valued days
/// (0/0); the comparison treats those as "no outlier detectable" rather
/// than raising, so a degenerate constant month is left alone.
pub fn correct_pair(
    series: &mut TimeSeries,
    interval: CorrectionInterval,
    primary: Variable,
    secondary: Variable,
) -> OutlierReport {
    let removed = [primary, secondary]
        .into_iter()
        .map(|variable| (variable, correct_variable(series, interval, variable)))
        .collect();
    let report = OutlierReport { removed };
    info!(
        "modified z-score pass on {}/{} removed {} points",
        primary,
        secondary,
        report.total_removed()
    );
    report
}

fn correct_variable(
    series: &mut TimeSeries,
    interval: CorrectionInterval,
    variable: Variable,
) -> usize {
    let months = series.months();
    let mut values = series.values(variable);
    let mut removed = 0usize;

    for month in 1..=12u32 {
        let group: Vec<f64> = interval
            .indices()
            .filter(|&i| months[i] == month)
            .map(|i| values[i])
            .collect();
        if group.is_empty() {
            continue;
        }
        let median = nan_median(&group);
        let mad = nan_mad(&group);

        for i in interval.indices().filter(|&i| months[i] == month) {
            let z = MAD_SCALE * (values[i] - median) / mad;
            // NaN (missing value, or 0/0 on a constant month) fails the
            // comparison and is left in place
            if z.abs() > Z_LIMIT {
                values[i] = f64::NAN;
                removed += 1;
            }
        }
    }

    series.apply_values(variable, &values);
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::daily_record::DailyRecord;
    use chrono::NaiveDate;

    fn series_with_tmax(values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let records = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut rec =
                    DailyRecord::empty(start + chrono::Days::new(i as u64));
                rec.tmax = v.is_finite().then_some(v);
                rec.tmin = Some(0.0);
                rec
            })
            .collect();
        TimeSeries::from_records(records).unwrap()
    }

    #[test]
    fn removes_obvious_spike() {
        let mut values = vec![10.0; 30];
        values[7] = 11.0;
        values[12] = 9.0;
        values[20] = 60.0; // sensor spike
        let mut series = series_with_tmax(&values);
        let interval = CorrectionInterval::full(series.len()).unwrap();
        let report = correct_pair(&mut series, interval, Variable::TMax, Variable::TMin);

        assert_eq!(series.get(20).unwrap().tmax, None);
        assert_eq!(
            report.removed,
            vec![(Variable::TMax, 1), (Variable::TMin, 0)]
        );
    }

    #[test]
    fn retained_values_satisfy_z_bound() {
        let mut values: Vec<f64> = (0..60).map(|i| 8.0 + (i % 11) as f64).collect();
        values[5] = 95.0;
        values[33] = -70.0;
        let mut series = series_with_tmax(&values);
        let interval = CorrectionInterval::full(series.len()).unwrap();
        correct_pair(&mut series, interval, Variable::TMax, Variable::TMin);

        let months = series.months();
        let retained = series.values(Variable::TMax);
        for month in 1..=12u32 {
            let group: Vec<f64> = (0..retained.len())
                .filter(|&i| months[i] == month)
                .map(|i| retained[i])
                .collect();
            if group.iter().all(|v| v.is_nan()) {
                continue;
            }
            let median = nan_median(&group);
            let mad = nan_mad(&group);
            for &v in group.iter().filter(|v| v.is_finite()) {
                let z = MAD_SCALE * (v - median) / mad;
                assert!(!(z.abs() > Z_LIMIT), "retained value {v} has |z| > 3.5");
            }
        }
    }

    #[test]
    fn constant_month_is_left_alone() {
        let mut series = series_with_tmax(&vec![21.0; 28]);
        let interval = CorrectionInterval::full(series.len()).unwrap();
        let report = correct_pair(&mut series, interval, Variable::TMax, Variable::TMin);
        assert_eq!(report.total_removed(), 0);
        assert!(series.values(Variable::TMax).iter().all(|&v| v == 21.0));
    }

    #[test]
    fn only_touches_the_interval() {
        let mut values = vec![10.0; 40];
        values[2] = 70.0;
        values[30] = 70.0;
        let mut series = series_with_tmax(&values);
        let interval = CorrectionInterval::clamped(20, 40, series.len()).unwrap();
        correct_pair(&mut series, interval, Variable::TMax, Variable::TMin);

        assert_eq!(series.get(2).unwrap().tmax, Some(70.0));
        assert_eq!(series.get(30).unwrap().tmax, None);
    }
}
