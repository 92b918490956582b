//! Ad-hoc operator edits: additive and multiplicative adjustments and
//! outright nulling over a correction interval.

use crate::types::interval::CorrectionInterval;
use crate::types::series::TimeSeries;
use crate::types::variable::Variable;
use log::info;
use serde::{Deserialize, Serialize};

/// Days actually touched by a manual edit (missing days don't count).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualEditReport {
    pub affected: usize,
}

/// Adds `offset` to every present value of `variable` in the interval.
pub fn apply_additive(
    series: &mut TimeSeries,
    interval: CorrectionInterval,
    variable: Variable,
    offset: f64,
) -> ManualEditReport {
    transform(series, interval, variable, "additive", |v| v + offset)
}

/// Multiplies every present value of `variable` in the interval by
/// `factor`.
pub fn apply_multiplicative(
    series: &mut TimeSeries,
    interval: CorrectionInterval,
    variable: Variable,
    factor: f64,
) -> ManualEditReport {
    transform(series, interval, variable, "multiplicative", |v| v * factor)
}

/// Nulls every present value of `variable` in the interval.
pub fn apply_null_out(
    series: &mut TimeSeries,
    interval: CorrectionInterval,
    variable: Variable,
) -> ManualEditReport {
    transform(series, interval, variable, "null-out", |_| f64::NAN)
}

fn transform(
    series: &mut TimeSeries,
    interval: CorrectionInterval,
    variable: Variable,
    label: &str,
    op: impl Fn(f64) -> f64,
) -> ManualEditReport {
    let mut values = series.values(variable);
    let mut affected = 0usize;
    for i in interval.indices() {
        if values[i].is_finite() {
            values[i] = op(values[i]);
            affected += 1;
        }
    }
    series.apply_values(variable, &values);
    info!("{label} edit on {variable} touched {affected} days in {interval}");
    ManualEditReport { affected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::daily_record::DailyRecord;
    use chrono::NaiveDate;

    fn ws_series(values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let records = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut rec = DailyRecord::empty(start + chrono::Days::new(i as u64));
                rec.ws = v.is_finite().then_some(v);
                rec
            })
            .collect();
        TimeSeries::from_records(records).unwrap()
    }

    #[test]
    fn additive_edit_skips_missing_days() {
        let mut series = ws_series(&[2.0, f64::NAN, 3.0]);
        let interval = CorrectionInterval::full(series.len()).unwrap();
        let report = apply_additive(&mut series, interval, Variable::Ws, 0.5);
        assert_eq!(report.affected, 2);
        assert_eq!(series.get(0).unwrap().ws, Some(2.5));
        assert_eq!(series.get(1).unwrap().ws, None);
    }

    #[test]
    fn multiplicative_edit_respects_interval() {
        let mut series = ws_series(&[2.0, 2.0, 2.0, 2.0]);
        let interval = CorrectionInterval::clamped(1, 3, series.len()).unwrap();
        apply_multiplicative(&mut series, interval, Variable::Ws, 2.0);
        assert_eq!(series.values(Variable::Ws), vec![2.0, 4.0, 4.0, 2.0]);
    }

    #[test]
    fn null_out_clears_values() {
        let mut series = ws_series(&[2.0, 3.0]);
        let interval = CorrectionInterval::full(series.len()).unwrap();
        let report = apply_null_out(&mut series, interval, Variable::Ws);
        assert_eq!(report.affected, 2);
        assert!(series.get(0).unwrap().ws.is_none());
        assert!(series.get(1).unwrap().ws.is_none());
    }
}
