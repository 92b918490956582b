//! Year-based percentile drift correction for relative humidity.
//!
//! A healthy RH sensor saturates to ~100% on the wettest days of most
//! years; a top-percentile mean that sits persistently below that level
//! indicates drift. Each calendar year inside the correction interval gets
//! its own multiplicative factor, applied to both extremes because they
//! come off the same physical sensor.

use crate::stats::nan_mean;
use crate::types::interval::CorrectionInterval;
use crate::types::series::TimeSeries;
use crate::types::variable::Variable;
use log::{info, warn};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Recommended top share of days used per year, in percent.
pub const DEFAULT_PERCENTILE: f64 = 1.0;

/// Per-year factors and post-correction cleanup counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumidityDriftReport {
    /// `(year, factor)`; `None` when the year had no usable RHmax days.
    pub factors: Vec<(i32, Option<f64>)>,
    pub corrected: usize,
    pub clipped_high: usize,
    pub clipped_low: usize,
    pub inconsistent_nulled: usize,
}

/// Applies the yearly top-percentile correction to `rhmax`/`rhmin` inside
/// the interval.
///
/// `percent` is the top-X share of valid days per year (1.0 = top 1%);
/// each year's sample size is `max(1, floor(valid / (100 / percent)))`.
pub fn correct_humidity_drift(
    series: &mut TimeSeries,
    interval: CorrectionInterval,
    percent: f64,
) -> HumidityDriftReport {
    let years = series.years();
    let mut rhmax = series.values(Variable::RhMax);
    let mut rhmin = series.values(Variable::RhMin);

    let mut report = HumidityDriftReport {
        factors: Vec::new(),
        corrected: 0,
        clipped_high: 0,
        clipped_low: 0,
        inconsistent_nulled: 0,
    };

    let mut interval_years: Vec<i32> = interval.indices().map(|i| years[i]).collect();
    interval_years.dedup();

    for year in interval_years {
        let indices: Vec<usize> = interval
            .indices()
            .filter(|&i| years[i] == year)
            .collect();
        let factor = yearly_factor(&indices, &rhmax, percent);
        report.factors.push((year, factor));

        let Some(factor) = factor else {
            warn!("no valid rhmax days in {year}; year left uncorrected");
            continue;
        };
        info!("rh drift factor for {year}: {factor:.4}");

        for &i in &indices {
            let mut touched = false;
            if rhmax[i].is_finite() {
                rhmax[i] *= factor;
                touched = true;
            }
            if rhmin[i].is_finite() {
                rhmin[i] *= factor;
                touched = true;
            }
            if touched {
                report.corrected += 1;
            }

            for value in [&mut rhmax[i], &mut rhmin[i]] {
                if !value.is_finite() {
                    continue;
                }
                if *value > 100.0 {
                    *value = 100.0;
                    report.clipped_high += 1;
                } else if *value <= 0.0 {
                    *value = 1.0;
                    report.clipped_low += 1;
                }
            }

            // an extreme pair in the wrong order cannot be trusted at all
            if rhmax[i].is_finite() && rhmin[i].is_finite() && rhmax[i] < rhmin[i] {
                rhmax[i] = f64::NAN;
                rhmin[i] = f64::NAN;
                report.inconsistent_nulled += 1;
            }
        }
    }

    series.apply_values(Variable::RhMax, &rhmax);
    series.apply_values(Variable::RhMin, &rhmin);
    report
}

/// `100 / mean(top sample-size RHmax values)` for one year's day indices,
/// or `None` when the year has no valid days.
fn yearly_factor(indices: &[usize], rhmax: &[f64], percent: f64) -> Option<f64> {
    let mut valid: Vec<f64> = indices
        .iter()
        .map(|&i| rhmax[i])
        .filter(|v| v.is_finite())
        .collect();
    if valid.is_empty() {
        return None;
    }
    valid.sort_unstable_by_key(|&v| std::cmp::Reverse(OrderedFloat(v)));
    let sample_size = ((valid.len() as f64 / (100.0 / percent)).floor() as usize).max(1);
    let top_mean = nan_mean(&valid[..sample_size.min(valid.len())]);
    Some(100.0 / top_mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::daily_record::DailyRecord;
    use chrono::NaiveDate;

    fn rh_series(years: &[(i32, f64)]) -> TimeSeries {
        // one full year of constant rhmax per entry, rhmin at half
        let mut records = Vec::new();
        for &(year, rhmax) in years {
            let mut date = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
            let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap();
            while date <= end {
                let mut rec = DailyRecord::empty(date);
                rec.rhmax = Some(rhmax);
                rec.rhmin = Some(rhmax / 2.0);
                records.push(rec);
                date = date.succ_opt().unwrap();
            }
        }
        TimeSeries::from_records(records).unwrap()
    }

    #[test]
    fn factor_restores_saturation() {
        // constant 90% peaks: factor must be exactly 100/90
        let mut series = rh_series(&[(2015, 90.0)]);
        let interval = CorrectionInterval::full(series.len()).unwrap();
        let report = correct_humidity_drift(&mut series, interval, DEFAULT_PERCENTILE);

        assert_eq!(report.factors.len(), 1);
        let factor = report.factors[0].1.unwrap();
        assert!((factor - 100.0 / 90.0).abs() < 1e-12);
        let rec = series.get(100).unwrap();
        assert!((rec.rhmax.unwrap() - 100.0).abs() < 1e-9);
        assert!((rec.rhmin.unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn sample_size_is_top_percent_of_valid_days() {
        // 365 valid days at 1% -> floor(365/100) = 3 top days
        let mut series = rh_series(&[(2015, 80.0)]);
        {
            let records = series.records_mut();
            records[10].rhmax = Some(96.0);
            records[50].rhmax = Some(94.0);
            records[200].rhmax = Some(92.0);
        }
        let interval = CorrectionInterval::full(series.len()).unwrap();
        let report = correct_humidity_drift(&mut series, interval, 1.0);
        let factor = report.factors[0].1.unwrap();
        assert!((factor - 100.0 / 94.0).abs() < 1e-12);
    }

    #[test]
    fn values_are_clipped_and_counted() {
        let mut series = rh_series(&[(2015, 90.0)]);
        {
            // one day already near saturation: factor pushes it past 100
            series.records_mut()[30].rhmax = Some(99.0);
        }
        let interval = CorrectionInterval::full(series.len()).unwrap();
        let report = correct_humidity_drift(&mut series, interval, 1.0);

        assert!(report.clipped_high > 0);
        let rhmax = series.values(Variable::RhMax);
        let rhmin = series.values(Variable::RhMin);
        for (&max, &min) in rhmax.iter().zip(&rhmin) {
            if max.is_finite() {
                assert!((0.0..=100.0).contains(&max));
            }
            if max.is_finite() && min.is_finite() {
                assert!(max >= min);
            }
        }
    }

    #[test]
    fn inverted_extremes_are_nulled_in_pairs() {
        let mut series = rh_series(&[(2015, 90.0)]);
        {
            let records = series.records_mut();
            // rhmin above rhmax: an internally inconsistent reading
            records[60].rhmax = Some(40.0);
            records[60].rhmin = Some(85.0);
        }
        let interval = CorrectionInterval::full(series.len()).unwrap();
        let report = correct_humidity_drift(&mut series, interval, 1.0);

        assert_eq!(report.inconsistent_nulled, 1);
        assert_eq!(series.get(60).unwrap().rhmax, None);
        assert_eq!(series.get(60).unwrap().rhmin, None);
    }

    #[test]
    fn each_year_gets_its_own_factor() {
        let mut series = rh_series(&[(2015, 90.0), (2016, 95.0)]);
        let interval = CorrectionInterval::full(series.len()).unwrap();
        let report = correct_humidity_drift(&mut series, interval, 1.0);
        assert_eq!(report.factors.len(), 2);
        let f2015 = report.factors[0].1.unwrap();
        let f2016 = report.factors[1].1.unwrap();
        assert!((f2015 - 100.0 / 90.0).abs() < 1e-12);
        assert!((f2016 - 100.0 / 95.0).abs() < 1e-12);
    }
}
