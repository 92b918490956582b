//! Empirical clear-sky-ratio radiation model and its Monte Carlo
//! coefficient search.
//!
//! The Thornton-Running model estimates solar radiation from clear-sky
//! radiation and the daily temperature range. The optimizer samples
//! coefficient triples uniformly around the published defaults and keeps
//! the minimum-RMSE triple; the fitted model is then good enough to fill
//! days whose observed radiation is missing or was discarded by QC.

use crate::types::climatology::MonthlyClimatology;
use crate::types::series::TimeSeries;
use crate::types::variable::Variable;
use chrono::Datelike;
use log::{debug, info};
use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Published Thornton-Running defaults.
pub const B0_DEFAULT: f64 = 0.031;
pub const B1_DEFAULT: f64 = 0.201;
pub const B2_DEFAULT: f64 = -0.185;

/// Samples are drawn uniformly within this share around each default.
const SAMPLING_HALF_WIDTH: f64 = 0.5;

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error(
        "Monte Carlo search failed to beat the default coefficients \
         (default RMSE {default_rmse:.4}, best sampled RMSE {best_rmse:.4}); \
         the radiation record or model is suspect"
    )]
    ConvergenceFailure { default_rmse: f64, best_rmse: f64 },

    #[error("no days with both observed and modeled radiation; nothing to fit")]
    NoObservations,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThorntonRunningCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
}

impl Default for ThorntonRunningCoefficients {
    fn default() -> Self {
        ThorntonRunningCoefficients {
            b0: B0_DEFAULT,
            b1: B1_DEFAULT,
            b2: B2_DEFAULT,
        }
    }
}

impl ThorntonRunningCoefficients {
    /// Whether every coefficient lies inside the sampling neighborhood of
    /// the defaults.
    pub fn within_sampling_bounds(&self) -> bool {
        let inside = |value: f64, default: f64| {
            let (lo, hi) = sampling_range(default);
            (lo..=hi).contains(&value)
        };
        inside(self.b0, B0_DEFAULT) && inside(self.b1, B1_DEFAULT) && inside(self.b2, B2_DEFAULT)
    }
}

/// Sample budget per search mode.
///
/// Inspection is a quick look whose failure to beat the defaults just
/// means the search was too coarse; correction mode runs enough samples
/// that losing to the defaults indicates a data or modeling problem and is
/// treated as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizerMode {
    Inspection,
    Correction,
}

impl OptimizerMode {
    pub fn samples(self) -> usize {
        match self {
            OptimizerMode::Inspection => 50,
            OptimizerMode::Correction => 1000,
        }
    }
}

/// A fitted model: winning coefficients, their RMSE against observed rs,
/// and the modeled daily series.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedModel {
    pub coefficients: ThorntonRunningCoefficients,
    pub rmse: f64,
    pub modeled_rs: Vec<f64>,
}

/// Daily Thornton-Running estimate:
/// `rso * (1 - 0.9 * exp(-b(month) * delta_t^1.5))` with
/// `b(m) = b0 + b1 * exp(b2 * monthly_delta_t(m))`.
pub fn thornton_running_rs(
    series: &TimeSeries,
    delta_t_climatology: &MonthlyClimatology,
    coefficients: &ThorntonRunningCoefficients,
) -> Vec<f64> {
    let delta_t = series.delta_t();
    series
        .records()
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let (Some(rso), Some(monthly_dt)) =
                (record.rso, delta_t_climatology.get(record.date.month()))
            else {
                return f64::NAN;
            };
            let b = coefficients.b0 + coefficients.b1 * (coefficients.b2 * monthly_dt).exp();
            rso * (1.0 - 0.9 * (-b * delta_t[i].powf(1.5)).exp())
        })
        .collect()
}

/// Runs the Monte Carlo search and returns the winning model.
pub fn optimize_model<R: Rng>(
    series: &TimeSeries,
    delta_t_climatology: &MonthlyClimatology,
    mode: OptimizerMode,
    rng: &mut R,
) -> Result<OptimizedModel, OptimizeError> {
    let observed = series.values(Variable::Rs);
    let defaults = ThorntonRunningCoefficients::default();
    let default_rs = thornton_running_rs(series, delta_t_climatology, &defaults);
    let default_rmse = rmse(&observed, &default_rs).ok_or(OptimizeError::NoObservations)?;

    let mut best: Option<(f64, ThorntonRunningCoefficients)> = None;
    for _ in 0..mode.samples() {
        let candidate = ThorntonRunningCoefficients {
            b0: sample(rng, B0_DEFAULT),
            b1: sample(rng, B1_DEFAULT),
            b2: sample(rng, B2_DEFAULT),
        };
        let modeled = thornton_running_rs(series, delta_t_climatology, &candidate);
        let Some(error) = rmse(&observed, &modeled) else {
            continue;
        };
        if best
            .as_ref()
            .map_or(true, |(best_error, _)| OrderedFloat(error) < OrderedFloat(*best_error))
        {
            best = Some((error, candidate));
        }
    }
    let (best_rmse, best_coefficients) = best.ok_or(OptimizeError::NoObservations)?;
    debug!("optimizer: default RMSE {default_rmse:.4}, best sampled RMSE {best_rmse:.4}");

    if default_rmse < best_rmse {
        return match mode {
            // too coarse a search to trust; stay with the defaults
            OptimizerMode::Inspection => Ok(OptimizedModel {
                coefficients: defaults,
                rmse: default_rmse,
                modeled_rs: default_rs,
            }),
            OptimizerMode::Correction => Err(OptimizeError::ConvergenceFailure {
                default_rmse,
                best_rmse,
            }),
        };
    }

    info!(
        "thornton-running fit: b0 {:.4}, b1 {:.4}, b2 {:.4}, RMSE {best_rmse:.4}",
        best_coefficients.b0, best_coefficients.b1, best_coefficients.b2
    );
    Ok(OptimizedModel {
        coefficients: best_coefficients,
        rmse: best_rmse,
        modeled_rs: thornton_running_rs(series, delta_t_climatology, &best_coefficients),
    })
}

/// Fills days with missing observed rs from the fitted model, marking them
/// as imputed. Returns the number of days filled.
pub fn fill_missing_rs(series: &mut TimeSeries, model: &OptimizedModel) -> usize {
    let mut filled = 0usize;
    for (record, &modeled) in series.records_mut().iter_mut().zip(&model.modeled_rs) {
        if record.rs.is_none() && modeled.is_finite() {
            record.set(Variable::Rs, Some(modeled), true);
            filled += 1;
        }
    }
    if filled > 0 {
        info!("filled {filled} missing rs days from the fitted model");
    }
    filled
}

fn sample<R: Rng>(rng: &mut R, default: f64) -> f64 {
    let (lo, hi) = sampling_range(default);
    rng.gen_range(lo..hi)
}

fn sampling_range(default: f64) -> (f64, f64) {
    let a = default * (1.0 - SAMPLING_HALF_WIDTH);
    let b = default * (1.0 + SAMPLING_HALF_WIDTH);
    (a.min(b), a.max(b))
}

/// Root-mean-square error over days where both series are finite; `None`
/// when no day qualifies.
fn rmse(observed: &[f64], modeled: &[f64]) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for (&obs, &model) in observed.iter().zip(modeled) {
        if obs.is_finite() && model.is_finite() {
            sum += (obs - model) * (obs - model);
            count += 1;
        }
    }
    (count > 0).then(|| (sum / count as f64).sqrt())
}
