use agweather_qc::{
    correct_radiation_drift, optimize_model, CorrectionInterval, DailyRecord, OptimizerMode,
    RadiationDriftParams, TimeSeries,
};
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn ten_year_series() -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
    let records = (0..3653usize)
        .map(|i| {
            let date = start + chrono::Days::new(i as u64);
            let season = (i as f64 / 365.25 * std::f64::consts::TAU).sin();
            let tmax = 20.0 + 10.0 * season;
            let mut rec = DailyRecord::empty(date);
            rec.tmax = Some(tmax);
            rec.tmin = Some(tmax - 11.0 - 2.0 * season);
            rec.rs = Some(240.0 + 40.0 * season + (i % 7) as f64);
            rec.rso = Some(300.0 + 50.0 * season);
            rec
        })
        .collect();
    TimeSeries::from_records(records).unwrap()
}

fn bench_radiation_drift(c: &mut Criterion) {
    let series = ten_year_series();
    c.bench_function("radiation_drift_10y", |b| {
        b.iter(|| {
            let mut working = series.clone();
            let interval = CorrectionInterval::full(working.len()).unwrap();
            black_box(correct_radiation_drift(
                &mut working,
                interval,
                RadiationDriftParams::default(),
            ))
        })
    });
}

fn bench_monte_carlo(c: &mut Criterion) {
    let series = ten_year_series();
    let climatology = series.monthly_mean(&series.delta_t());
    c.bench_function("monte_carlo_1000_samples", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(1);
            black_box(optimize_model(
                &series,
                &climatology,
                OptimizerMode::Correction,
                &mut rng,
            ))
        })
    });
}

criterion_group!(benches, bench_radiation_drift, bench_monte_carlo);
criterion_main!(benches);
