//! Runs a full scripted correction session over a synthetic five-year
//! record: a yearly-percentile humidity correction followed by a periodic
//! ratio radiation correction, with simple stand-ins for the external
//! physical formulas.

use agweather_qc::{
    ConfirmOutcome, CorrectionMethod, DailyRecord, DecisionPort, EtFormulas, FieldSet, PreviewDiff,
    QcSession, RadiationDriftParams, ReferenceEtInput, ReviewPort, SiteConfig, TimeSeries,
    Variable,
};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;

struct DemoFormulas;

impl EtFormulas for DemoFormulas {
    fn extraterrestrial_radiation(&self, _latitude_rad: f64, _day_of_year: u32) -> f64 {
        35.0
    }

    fn clear_sky_radiation(
        &self,
        _ra: f64,
        _ea: f64,
        _pressure_kpa: f64,
        _day_of_year: u32,
        _latitude_rad: f64,
    ) -> f64 {
        300.0
    }

    fn reference_et(&self, input: &ReferenceEtInput) -> (f64, f64) {
        let eto = 0.1 * input.rs_mj_m2 + 0.05 * (input.tmax - input.tmin);
        (eto, 1.2 * eto)
    }
}

struct ScriptedOperator {
    variables: VecDeque<Option<Variable>>,
    methods: VecDeque<CorrectionMethod>,
}

impl DecisionPort for ScriptedOperator {
    fn select_variable(&mut self, available: &[Variable]) -> Option<Variable> {
        let choice = self.variables.pop_front().flatten();
        println!("available: {available:?} -> choosing {choice:?}");
        choice
    }

    fn select_interval(&mut self, series_len: usize) -> (usize, usize) {
        (0, series_len)
    }

    fn select_method(&mut self, _variable: Variable) -> CorrectionMethod {
        self.methods.pop_front().expect("script exhausted")
    }
}

struct AlwaysCommit;

impl ReviewPort for AlwaysCommit {
    fn review(&mut self, preview: &PreviewDiff) -> ConfirmOutcome {
        let changed = preview
            .delta
            .iter()
            .filter(|d| d.is_finite() && **d != 0.0)
            .count();
        println!(
            "preview on {}: {changed} days changed in {}",
            preview.variable, preview.interval
        );
        ConfirmOutcome::CommitAndStop
    }
}

fn synthetic_series() -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let records = (0..1826usize)
        .map(|i| {
            let date = start + chrono::Days::new(i as u64);
            let season = (i as f64 / 365.25 * std::f64::consts::TAU).sin();
            let tmax = 22.0 + 8.0 * season;
            let mut rec = DailyRecord::empty(date);
            rec.tmax = Some(tmax);
            rec.tmin = Some(tmax - 12.0);
            rec.rhmax = Some(86.0); // drifted: never reaches saturation
            rec.rhmin = Some(44.0);
            rec.ws = Some(2.1);
            rec.precip = Some(0.0);
            // pyranometer reading low, with a 10-day spike in year three
            rec.rs = Some(if (800..810).contains(&i) { 480.0 } else { 234.0 });
            rec
        })
        .collect();
    TimeSeries::from_records(records).unwrap()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let provided = FieldSet::TMAX
        | FieldSet::TMIN
        | FieldSet::RH_EXTREMES
        | FieldSet::RS
        | FieldSet::WS
        | FieldSet::PRECIP;
    let site = SiteConfig::builder()
        .latitude_deg(46.2)
        .elevation_m(350.0)
        .wind_height_m(2.0)
        .build()?;

    let mut rng = StdRng::seed_from_u64(2015);
    let mut session = QcSession::builder()
        .series(synthetic_series())
        .provided(provided)
        .site(site)
        .formulas(&DemoFormulas)
        .rng(&mut rng)
        .build()?;

    let mut operator = ScriptedOperator {
        variables: VecDeque::from([Some(Variable::RhMax), Some(Variable::Rs), None]),
        methods: VecDeque::from([
            CorrectionMethod::YearlyPercentile { percent: 1.0 },
            CorrectionMethod::PeriodicRatio(RadiationDriftParams::default()),
        ]),
    };
    let summary = session.run(&mut operator, &mut AlwaysCommit, &DemoFormulas, &mut rng)?;

    println!("session finished: {summary:?}");
    let missing_et = session
        .committed()
        .records()
        .iter()
        .filter(|r| r.eto.is_none())
        .count();
    println!("days without reference ET after the session: {missing_et}");
    Ok(())
}
