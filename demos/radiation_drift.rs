//! Demonstrates the periodic ratio correction on a drifted pyranometer
//! record with a handful of spurious spikes.

use agweather_qc::{
    correct_radiation_drift, CorrectionInterval, DailyRecord, RadiationDriftParams, TimeSeries,
    Variable,
};
use chrono::NaiveDate;

fn main() {
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    let records = (0..240usize)
        .map(|i| {
            let mut rec = DailyRecord::empty(start + chrono::Days::new(i as u64));
            let rso = 280.0 + 40.0 * (i as f64 / 240.0 * std::f64::consts::PI).sin();
            // sensor reads ~18% low; three datalogger spikes
            let rs = if i % 80 == 40 { rso * 1.8 } else { rso * 0.82 };
            rec.rs = Some(rs);
            rec.rso = Some(rso);
            rec
        })
        .collect();
    let mut series = TimeSeries::from_records(records).unwrap();

    let interval = CorrectionInterval::full(series.len()).unwrap();
    let report = correct_radiation_drift(&mut series, interval, RadiationDriftParams::default());

    println!("period factors: {:?}", report.period_factors);
    println!(
        "corrected {} days, excluded {} spurious points, clipped {}",
        report.corrected, report.excluded_spurious, report.clipped
    );
    let mean_ratio = series
        .values(Variable::Rs)
        .iter()
        .zip(series.values(Variable::Rso))
        .filter(|(rs, _)| rs.is_finite())
        .map(|(rs, rso)| rs / rso)
        .sum::<f64>()
        / series.len() as f64;
    println!("mean rs/rso after correction: {mean_ratio:.3}");
}
