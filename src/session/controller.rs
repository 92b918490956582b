//! The interactive correct -> preview -> commit -> recompute loop.
//!
//! Three snapshots with value semantics: `backup` (pre-session state),
//! `committed` (the working series), and a per-iteration `candidate`
//! cloned from `committed`. Only a commit promotes candidate to
//! committed; other components never see an unconfirmed candidate.

use crate::correction::humidity::correct_humidity_drift;
use crate::correction::manual::{apply_additive, apply_multiplicative, apply_null_out};
use crate::correction::outlier::correct_pair;
use crate::correction::radiation::correct_radiation_drift;
use crate::error::QcError;
use crate::optimize::{fill_missing_rs, optimize_model, OptimizedModel, OptimizerMode};
use crate::physics::{atmospheric_pressure_kpa, EtFormulas, ReferenceEtInput, RS_W_M2_TO_MJ_M2};
use crate::reconcile::{reconcile, Reconciliation};
use crate::session::error::SessionError;
use crate::session::ports::{ConfirmOutcome, DecisionPort, PreviewDiff, ReviewPort};
use crate::session::state::{CorrectionMethod, SessionState};
use crate::types::field_set::FieldSet;
use crate::types::interval::CorrectionInterval;
use crate::types::series::TimeSeries;
use crate::types::site::SiteConfig;
use crate::types::variable::Variable;
use bon::bon;
use chrono::Datelike;
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What a finished session did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub iterations: usize,
    pub aborted: bool,
    pub history: Vec<(Variable, CorrectionMethod)>,
}

/// The three aligned products the external output layer persists.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutput {
    pub corrected: TimeSeries,
    /// Per variable: corrected minus pre-session value, NaN where either
    /// side is missing.
    pub deltas: Vec<(Variable, Vec<f64>)>,
    /// Per day: which fields hold derived or imputed values.
    pub fill_markers: Vec<FieldSet>,
}

/// Orchestrates a correction session over one station's record.
pub struct QcSession {
    site: SiteConfig,
    provided: FieldSet,
    backup: TimeSeries,
    committed: TimeSeries,
    reconciliation: Reconciliation,
    model: Option<OptimizedModel>,
    state: SessionState,
    iterations: usize,
    history: Vec<(Variable, CorrectionMethod)>,
}

#[bon]
impl QcSession {
    /// Builds a session: reconciles humidity, derives clear-sky radiation
    /// and reference ET, fits the radiation model in inspection mode, and
    /// takes the backup snapshot that "restart" and "abort" return to.
    #[builder]
    pub fn new<R: Rng>(
        series: TimeSeries,
        provided: FieldSet,
        site: SiteConfig,
        formulas: &dyn EtFormulas,
        rng: &mut R,
    ) -> Result<Self, QcError> {
        let mut committed = series;
        let reconciliation = reconcile(&mut committed, provided)?;
        let mut session = QcSession {
            site,
            provided,
            backup: committed.clone(),
            committed,
            reconciliation,
            model: None,
            state: SessionState::SelectVariable,
            iterations: 0,
            history: Vec::new(),
        };
        session.refresh_rso(formulas);
        if provided.contains(FieldSet::RS) {
            session.model = Some(optimize_model(
                &session.committed,
                &session.reconciliation.delta_t,
                OptimizerMode::Inspection,
                rng,
            )?);
        }
        session.refresh_reference_et(formulas);
        session.backup = session.committed.clone();
        Ok(session)
    }
}

impl QcSession {
    /// Runs the interactive loop to completion.
    pub fn run<R: Rng>(
        &mut self,
        decisions: &mut dyn DecisionPort,
        review: &mut dyn ReviewPort,
        formulas: &dyn EtFormulas,
        rng: &mut R,
    ) -> Result<SessionSummary, QcError> {
        let mut aborted = false;

        'session: loop {
            self.state = SessionState::SelectVariable;
            let available = self.available_variables();
            let Some(variable) = decisions.select_variable(&available) else {
                break 'session;
            };
            if !available.contains(&variable) {
                return Err(SessionError::VariableUnavailable(variable).into());
            }

            loop {
                self.state = SessionState::SelectInterval;
                let (start, end) = decisions.select_interval(self.committed.len());
                let interval = CorrectionInterval::clamped(start, end, self.committed.len())
                    .map_err(SessionError::from)?;

                self.state = SessionState::SelectMethod;
                let method = decisions.select_method(variable);

                self.state = SessionState::Preview;
                let mut candidate = self.committed.clone();
                apply_method(&mut candidate, variable, interval, method)?;
                let preview = PreviewDiff::compute(&self.committed, &candidate, variable, interval);

                self.state = SessionState::ConfirmIteration;
                match review.review(&preview) {
                    ConfirmOutcome::CommitAndLoop => {
                        self.commit(candidate, variable, method, formulas, rng)?;
                    }
                    ConfirmOutcome::CommitAndStop => {
                        self.commit(candidate, variable, method, formulas, rng)?;
                        break;
                    }
                    ConfirmOutcome::Restart => {
                        info!("operator restart: reverting to the session backup");
                        self.restore_backup(formulas, rng)?;
                    }
                    ConfirmOutcome::Abort => {
                        info!("operator abort: restoring the original series");
                        self.restore_backup(formulas, rng)?;
                        aborted = true;
                        break 'session;
                    }
                }
            }
        }

        self.state = SessionState::Done;
        Ok(SessionSummary {
            iterations: self.iterations,
            aborted,
            history: self.history.clone(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn committed(&self) -> &TimeSeries {
        &self.committed
    }

    pub fn backup(&self) -> &TimeSeries {
        &self.backup
    }

    pub fn reconciliation(&self) -> &Reconciliation {
        &self.reconciliation
    }

    pub fn model(&self) -> Option<&OptimizedModel> {
        self.model.as_ref()
    }

    /// Corrected series, per-variable deltas against the pre-session
    /// state, and per-day fill markers, aligned for the output layer.
    pub fn output(&self) -> SessionOutput {
        let deltas = ALL_VARIABLES
            .iter()
            .map(|&variable| {
                let before = self.backup.values(variable);
                let after = self.committed.values(variable);
                let delta = before.iter().zip(&after).map(|(b, a)| a - b).collect();
                (variable, delta)
            })
            .collect();
        SessionOutput {
            corrected: self.committed.clone(),
            deltas,
            fill_markers: self.committed.records().iter().map(|r| r.filled).collect(),
        }
    }

    /// Correction targets: provided variables plus the humidity quantities
    /// the reconciler derives.
    fn available_variables(&self) -> Vec<Variable> {
        ALL_VARIABLES
            .iter()
            .copied()
            .filter(|v| v.is_correctable())
            .filter(|v| {
                self.provided.contains(v.flag())
                    || matches!(v, Variable::TDew | Variable::Ea)
            })
            .collect()
    }

    fn commit<R: Rng>(
        &mut self,
        candidate: TimeSeries,
        variable: Variable,
        method: CorrectionMethod,
        formulas: &dyn EtFormulas,
        rng: &mut R,
    ) -> Result<(), QcError> {
        self.committed = candidate;
        self.iterations += 1;
        self.history.push((variable, method));
        info!("iteration {} committed on {variable}", self.iterations);
        self.recompute_after(variable, formulas, rng)
    }

    /// Dependency-aware recompute: temperature and humidity edits re-run
    /// the reconciler (they are upstream of the compiled vapor pressure,
    /// and through it of clear-sky radiation); anything upstream of rso
    /// re-fits the radiation model at the full sample budget; every edit
    /// except precipitation refreshes reference ET.
    fn recompute_after<R: Rng>(
        &mut self,
        variable: Variable,
        formulas: &dyn EtFormulas,
        rng: &mut R,
    ) -> Result<(), QcError> {
        let upstream_of_rso =
            variable.is_temperature() || variable.is_humidity() || variable.is_radiation();

        if variable.is_temperature() || variable.is_humidity() {
            self.reconciliation = reconcile(&mut self.committed, self.provided)?;
        }
        if upstream_of_rso {
            self.refresh_rso(formulas);
            if self.provided.contains(FieldSet::RS) {
                let model = optimize_model(
                    &self.committed,
                    &self.reconciliation.delta_t,
                    OptimizerMode::Correction,
                    rng,
                )?;
                fill_missing_rs(&mut self.committed, &model);
                self.model = Some(model);
            }
        }
        if variable != Variable::Precip {
            self.refresh_reference_et(formulas);
        }
        Ok(())
    }

    /// Full derivation pass used at construction and when restoring the
    /// backup.
    fn derive_all<R: Rng>(
        &mut self,
        formulas: &dyn EtFormulas,
        mode: OptimizerMode,
        rng: &mut R,
    ) -> Result<(), QcError> {
        self.reconciliation = reconcile(&mut self.committed, self.provided)?;
        self.refresh_rso(formulas);
        if self.provided.contains(FieldSet::RS) {
            self.model = Some(optimize_model(
                &self.committed,
                &self.reconciliation.delta_t,
                mode,
                rng,
            )?);
        }
        self.refresh_reference_et(formulas);
        Ok(())
    }

    fn restore_backup<R: Rng>(
        &mut self,
        formulas: &dyn EtFormulas,
        rng: &mut R,
    ) -> Result<(), QcError> {
        self.committed = self.backup.clone();
        self.iterations = 0;
        self.history.clear();
        self.derive_all(formulas, OptimizerMode::Inspection, rng)
    }

    fn refresh_rso(&mut self, formulas: &dyn EtFormulas) {
        let pressure = atmospheric_pressure_kpa(self.site.elevation_m());
        let latitude = self.site.latitude_rad();
        let compiled = &self.reconciliation.compiled_ea;
        for (i, record) in self.committed.records_mut().iter_mut().enumerate() {
            let day_of_year = record.date.ordinal();
            let rso = compiled.value(i).map(|ea| {
                let ra = formulas.extraterrestrial_radiation(latitude, day_of_year);
                formulas.clear_sky_radiation(ra, ea, pressure, day_of_year, latitude)
            });
            record.set(Variable::Rso, rso, true);
        }
    }

    fn refresh_reference_et(&mut self, formulas: &dyn EtFormulas) {
        let wind_height_m = self.site.wind_height_m();
        let elevation_m = self.site.elevation_m();
        let latitude_rad = self.site.latitude_rad();
        let compiled = &self.reconciliation.compiled_ea;
        for (i, record) in self.committed.records_mut().iter_mut().enumerate() {
            let (eto, etr) = match (
                record.tmin,
                record.tmax,
                compiled.value(i),
                record.rs,
                record.ws,
            ) {
                (Some(tmin), Some(tmax), Some(ea), Some(rs), Some(ws)) => {
                    let (eto, etr) = formulas.reference_et(&ReferenceEtInput {
                        tmin,
                        tmax,
                        ea,
                        rs_mj_m2: rs * RS_W_M2_TO_MJ_M2,
                        wind_speed: ws,
                        wind_height_m,
                        elevation_m,
                        latitude_rad,
                        day_of_year: record.date.ordinal(),
                    });
                    (Some(eto), Some(etr))
                }
                _ => (None, None),
            };
            record.set(Variable::Eto, eto, true);
            record.set(Variable::Etr, etr, true);
        }
    }
}

const ALL_VARIABLES: [Variable; 14] = [
    Variable::TMax,
    Variable::TMin,
    Variable::TAvg,
    Variable::TDew,
    Variable::Ea,
    Variable::RhMax,
    Variable::RhMin,
    Variable::RhAvg,
    Variable::Rs,
    Variable::Rso,
    Variable::Ws,
    Variable::Precip,
    Variable::Eto,
    Variable::Etr,
];

/// Applies a correction method to the candidate, enforcing the
/// method/variable pairing.
fn apply_method(
    candidate: &mut TimeSeries,
    variable: Variable,
    interval: CorrectionInterval,
    method: CorrectionMethod,
) -> Result<(), SessionError> {
    match method {
        CorrectionMethod::Additive(offset) => {
            apply_additive(candidate, interval, variable, offset);
        }
        CorrectionMethod::Multiplicative(factor) => {
            apply_multiplicative(candidate, interval, variable, factor);
        }
        CorrectionMethod::NullOut => {
            apply_null_out(candidate, interval, variable);
        }
        CorrectionMethod::ModifiedZScore { secondary } => {
            if !variable.is_temperature() || !secondary.is_temperature() {
                return Err(SessionError::MethodMismatch { variable, method });
            }
            correct_pair(candidate, interval, variable, secondary);
        }
        CorrectionMethod::YearlyPercentile { percent } => {
            if variable != Variable::RhMax {
                return Err(SessionError::MethodMismatch { variable, method });
            }
            correct_humidity_drift(candidate, interval, percent);
        }
        CorrectionMethod::PeriodicRatio(params) => {
            if variable != Variable::Rs {
                return Err(SessionError::MethodMismatch { variable, method });
            }
            correct_radiation_drift(candidate, interval, params);
        }
    }
    Ok(())
}
