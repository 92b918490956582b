//! Variable reconciliation: derives whichever of the humidity quantities
//! (vapor pressure, dew point) the station did not report, maintains the
//! temperature secondaries and their monthly climatologies, and assembles
//! the compiled vapor-pressure series used downstream for clear-sky
//! radiation and reference ET.

pub mod error;
pub mod vapor;

use crate::types::climatology::MonthlyClimatology;
use crate::types::field_set::FieldSet;
use crate::types::series::TimeSeries;
use crate::types::variable::Variable;
use chrono::Datelike;
use error::ReconcileError;
use log::debug;
use serde::{Deserialize, Serialize};
use vapor::{ea_from_rh_avg, ea_from_rh_extremes, es, tdew_from_ea};

/// The best humidity source the station provides, in strict priority
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HumiditySource {
    VaporPressure,
    DewPoint,
    RhExtremes,
    RhAverage,
}

/// Per-day origin of a compiled vapor-pressure value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EaSource {
    Provided,
    FromDewPoint,
    FromRhExtremes,
    FromRhAverage,
    FromK0Fallback,
    Missing,
}

/// Vapor pressure assembled per day from every available source by
/// priority, with a climatological dew-point fallback.
///
/// Distinct from the series' own `ea` column: a day here is missing only
/// when every source in the cascade is missing, which in practice means
/// only where `tmin` itself is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledVaporPressure {
    values: Vec<Option<f64>>,
    sources: Vec<EaSource>,
}

impl CompiledVaporPressure {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn source(&self, index: usize) -> EaSource {
        self.sources.get(index).copied().unwrap_or(EaSource::Missing)
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

/// Everything the reconciler derives in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub source: HumiditySource,
    pub compiled_ea: CompiledVaporPressure,
    pub delta_t: MonthlyClimatology,
    pub k0: MonthlyClimatology,
}

/// Picks the humidity source from the provided-variable set.
pub fn resolve_humidity_source(provided: FieldSet) -> Result<HumiditySource, ReconcileError> {
    if provided.contains(FieldSet::EA) {
        Ok(HumiditySource::VaporPressure)
    } else if provided.contains(FieldSet::TDEW) {
        Ok(HumiditySource::DewPoint)
    } else if provided.contains(FieldSet::RH_EXTREMES) {
        Ok(HumiditySource::RhExtremes)
    } else if provided.contains(FieldSet::RHAVG) {
        Ok(HumiditySource::RhAverage)
    } else {
        Err(ReconcileError::NoHumiditySource)
    }
}

/// Runs the full reconciliation: fills derived `ea`/`tdew` from the
/// resolved source, refreshes the delta-t and dew-point-depression (k0)
/// climatologies, and compiles the cascade vapor pressure.
///
/// Re-running on an unchanged series is idempotent; derived days are
/// recomputed from scratch, so nothing stale survives an upstream edit.
pub fn reconcile(
    series: &mut TimeSeries,
    provided: FieldSet,
) -> Result<Reconciliation, ReconcileError> {
    let source = resolve_humidity_source(provided)?;
    derive_humidity(series, provided, source);

    let delta_t = series.monthly_mean(&series.delta_t());
    let k0 = series.monthly_mean(&series.dew_point_depression());
    let compiled_ea = compile_vapor_pressure(series, provided, &k0);

    debug!(
        "reconciled humidity from {:?}: {} of {} compiled ea days missing",
        source,
        compiled_ea.missing_count(),
        compiled_ea.len()
    );

    Ok(Reconciliation {
        source,
        compiled_ea,
        delta_t,
        k0,
    })
}

/// Fills `ea` and `tdew` from the resolved source. Observed values are
/// never touched; derived days are rewritten on every pass, including back
/// to missing when their input is missing.
fn derive_humidity(series: &mut TimeSeries, provided: FieldSet, source: HumiditySource) {
    let tdew_provided = provided.contains(FieldSet::TDEW);
    for record in series.records_mut() {
        let derived_ea = match source {
            HumiditySource::VaporPressure => None, // ea is the observation
            HumiditySource::DewPoint => {
                if record.is_observed(Variable::TDew) {
                    record.tdew.map(es)
                } else {
                    None
                }
            }
            HumiditySource::RhExtremes => {
                match (record.tmin, record.tmax, record.rhmax, record.rhmin) {
                    (Some(tmin), Some(tmax), Some(rhmax), Some(rhmin)) => {
                        Some(ea_from_rh_extremes(tmin, tmax, rhmax, rhmin))
                    }
                    _ => None,
                }
            }
            HumiditySource::RhAverage => match (record.tavg, record.rhavg) {
                (Some(tavg), Some(rhavg)) => Some(ea_from_rh_avg(tavg, rhavg)),
                _ => None,
            },
        };
        if source != HumiditySource::VaporPressure {
            record.set(Variable::Ea, derived_ea, true);
        }

        // dew point: keep an observation, otherwise derive from whatever ea
        // the day now carries
        if !(tdew_provided && record.is_observed(Variable::TDew)) {
            let derived_tdew = record
                .ea
                .filter(|&ea| ea > 0.0)
                .map(tdew_from_ea);
            record.set(Variable::TDew, derived_tdew, true);
        }
    }
}

/// Evaluates every humidity source per day and picks by strict priority,
/// reconstructing a dew point from `tmin - k0(month)` when nothing was
/// provided for the day.
fn compile_vapor_pressure(
    series: &TimeSeries,
    provided: FieldSet,
    k0: &MonthlyClimatology,
) -> CompiledVaporPressure {
    let mut values = Vec::with_capacity(series.len());
    let mut sources = Vec::with_capacity(series.len());

    for record in series.records() {
        let (value, source) = if provided.contains(FieldSet::EA)
            && record.is_observed(Variable::Ea)
        {
            (record.ea, EaSource::Provided)
        } else if provided.contains(FieldSet::TDEW) && record.is_observed(Variable::TDew) {
            (record.tdew.map(es), EaSource::FromDewPoint)
        } else if provided.contains(FieldSet::RH_EXTREMES)
            && record.tmin.is_some()
            && record.tmax.is_some()
            && record.rhmax.is_some()
            && record.rhmin.is_some()
        {
            (
                Some(ea_from_rh_extremes(
                    record.tmin.unwrap(),
                    record.tmax.unwrap(),
                    record.rhmax.unwrap(),
                    record.rhmin.unwrap(),
                )),
                EaSource::FromRhExtremes,
            )
        } else if provided.contains(FieldSet::RHAVG)
            && record.tavg.is_some()
            && record.rhavg.is_some()
        {
            (
                Some(ea_from_rh_avg(record.tavg.unwrap(), record.rhavg.unwrap())),
                EaSource::FromRhAverage,
            )
        } else if let (Some(tmin), Some(depression)) =
            (record.tmin, k0.get(record.date.month()))
        {
            (Some(es(tmin - depression)), EaSource::FromK0Fallback)
        } else {
            (None, EaSource::Missing)
        };

        sources.push(if value.is_some() { source } else { EaSource::Missing });
        values.push(value);
    }

    CompiledVaporPressure { values, sources }
}
