use crate::types::climatology::MonthlyClimatology;
use crate::types::daily_record::DailyRecord;
use crate::types::variable::Variable;
use chrono::{Datelike, NaiveDate};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("a time series needs at least one record")]
    Empty,

    #[error("duplicate record for {0}")]
    DuplicateDate(NaiveDate),
}

/// A calendar-complete sequence of daily records.
///
/// Invariant: dates are strictly increasing with no gaps. Construction
/// sorts the input and reindexes it, inserting all-missing placeholder
/// records for absent days; gaps are filled, never dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    records: Vec<DailyRecord>,
}

impl TimeSeries {
    /// Builds a gap-reindexed series from ingested records.
    pub fn from_records(mut records: Vec<DailyRecord>) -> Result<Self, SeriesError> {
        if records.is_empty() {
            return Err(SeriesError::Empty);
        }
        records.sort_by_key(|r| r.date);
        for pair in records.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(SeriesError::DuplicateDate(pair[0].date));
            }
        }

        let start = records[0].date;
        let end = records[records.len() - 1].date;
        let capacity = (end - start).num_days() as usize + 1;
        let mut reindexed = Vec::with_capacity(capacity);
        let mut source = records.into_iter().peekable();
        let mut date = start;
        while date <= end {
            match source.peek() {
                Some(next) if next.date == date => {
                    reindexed.push(source.next().unwrap());
                }
                _ => reindexed.push(DailyRecord::empty(date)),
            }
            date = date.succ_opt().expect("calendar overflow");
        }
        Ok(TimeSeries { records: reindexed })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [DailyRecord] {
        &mut self.records
    }

    pub fn get(&self, index: usize) -> Option<&DailyRecord> {
        self.records.get(index)
    }

    pub fn start_date(&self) -> NaiveDate {
        self.records[0].date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.records[self.records.len() - 1].date
    }

    /// Calendar month (1-12) per record.
    pub fn months(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.date.month()).collect()
    }

    /// Calendar year per record.
    pub fn years(&self) -> Vec<i32> {
        self.records.iter().map(|r| r.date.year()).collect()
    }

    /// Column view of a variable, missing values coded as `NAN`. This is
    /// the representation the correction kernels work on.
    pub fn values(&self, variable: Variable) -> Vec<f64> {
        self.records
            .iter()
            .map(|r| r.get(variable).unwrap_or(f64::NAN))
            .collect()
    }

    /// Writes a NaN-coded column back: finite entries become `Some`,
    /// everything else `None`. A day keeps its fill marker (a corrected
    /// derived value is still derived); nulled days carry no marker.
    pub(crate) fn apply_values(&mut self, variable: Variable, values: &[f64]) {
        debug_assert_eq!(values.len(), self.records.len());
        for (record, &value) in self.records.iter_mut().zip(values) {
            let value = value.is_finite().then_some(value);
            let was_filled = record.filled.contains(variable.flag());
            record.set(variable, value, was_filled);
        }
    }

    /// Daily `tmax - tmin`, NaN where either is missing.
    pub fn delta_t(&self) -> Vec<f64> {
        self.records
            .iter()
            .map(|r| match (r.tmax, r.tmin) {
                (Some(tmax), Some(tmin)) => tmax - tmin,
                _ => f64::NAN,
            })
            .collect()
    }

    /// Daily dew-point depression `tmin - tdew`, NaN where either is
    /// missing.
    pub fn dew_point_depression(&self) -> Vec<f64> {
        self.records
            .iter()
            .map(|r| match (r.tmin, r.tdew) {
                (Some(tmin), Some(tdew)) => tmin - tdew,
                _ => f64::NAN,
            })
            .collect()
    }

    /// Monthly climatology of an arbitrary daily column.
    pub fn monthly_mean(&self, values: &[f64]) -> MonthlyClimatology {
        MonthlyClimatology::compute(&self.months(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::field_set::FieldSet;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, tmax: f64) -> DailyRecord {
        let mut rec = DailyRecord::empty(date);
        rec.tmax = Some(tmax);
        rec
    }

    #[test]
    fn reindexes_calendar_gaps() {
        let series = TimeSeries::from_records(vec![
            record(day(2021, 3, 1), 10.0),
            record(day(2021, 3, 4), 13.0),
        ])
        .unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.get(1).unwrap().date, day(2021, 3, 2));
        assert_eq!(series.get(1).unwrap().tmax, None);
        assert_eq!(series.get(3).unwrap().tmax, Some(13.0));
    }

    #[test]
    fn sorts_out_of_order_input() {
        let series = TimeSeries::from_records(vec![
            record(day(2021, 3, 2), 11.0),
            record(day(2021, 3, 1), 10.0),
        ])
        .unwrap();
        assert_eq!(series.start_date(), day(2021, 3, 1));
        assert_eq!(series.values(Variable::TMax), vec![10.0, 11.0]);
    }

    #[test]
    fn rejects_duplicates_and_empty_input() {
        assert!(matches!(
            TimeSeries::from_records(vec![
                record(day(2021, 3, 1), 10.0),
                record(day(2021, 3, 1), 12.0),
            ]),
            Err(SeriesError::DuplicateDate(_))
        ));
        assert!(matches!(
            TimeSeries::from_records(vec![]),
            Err(SeriesError::Empty)
        ));
    }

    #[test]
    fn column_roundtrip_translates_nan() {
        let mut series = TimeSeries::from_records(vec![
            record(day(2021, 3, 1), 10.0),
            record(day(2021, 3, 2), 11.0),
        ])
        .unwrap();
        series.apply_values(Variable::TMax, &[f64::NAN, 12.5]);
        assert_eq!(series.get(0).unwrap().tmax, None);
        assert_eq!(series.get(1).unwrap().tmax, Some(12.5));
        assert_eq!(series.get(1).unwrap().filled, FieldSet::NONE);
    }

    #[test]
    fn corrections_preserve_fill_markers() {
        let mut series = TimeSeries::from_records(vec![
            record(day(2021, 3, 1), 10.0),
            record(day(2021, 3, 2), 11.0),
        ])
        .unwrap();
        series.records_mut()[0].set(Variable::TMax, Some(10.0), true);

        series.apply_values(Variable::TMax, &[12.0, 13.0]);
        assert!(series.get(0).unwrap().filled.contains(FieldSet::TMAX));
        assert!(!series.get(1).unwrap().filled.contains(FieldSet::TMAX));

        // nulling drops the marker with the value
        series.apply_values(Variable::TMax, &[f64::NAN, 13.0]);
        assert!(!series.get(0).unwrap().filled.contains(FieldSet::TMAX));
    }
}
