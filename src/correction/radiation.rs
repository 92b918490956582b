//! Period-based ratio correction for solar radiation.
//!
//! The observed/clear-sky ratio of the sunniest days in each period tells
//! how far the pyranometer has drifted: on a clean day rs should sit just
//! under rso. Each period's factor comes from the K largest ratios, after
//! iteratively throwing out single-day spikes (sensor or datalogger
//! faults) that would otherwise drag the factor.

use crate::stats::nan_mean;
use crate::types::interval::CorrectionInterval;
use crate::types::series::TimeSeries;
use crate::types::variable::Variable;
use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::ops::Range;

/// Factors outside this band are too large to be a credible sensor drift.
const FACTOR_CREDIBLE_MIN: f64 = 0.5;
const FACTOR_CREDIBLE_MAX: f64 = 1.5;

/// Factors inside this band mean the sensor is healthy; data is left
/// untouched.
const FACTOR_DEAD_BAND_MIN: f64 = 0.97;
const FACTOR_DEAD_BAND_MAX: f64 = 1.03;

/// Relative factor jump, when dropping the largest ratio, that marks the
/// dropped point as unduly influential.
const SPURIOUS_RELATIVE_JUMP: f64 = 0.02;

/// Absolute rs excess over rso [W/m2] that marks a point as spurious on
/// its own.
const SPURIOUS_ABSOLUTE_EXCESS: f64 = 75.0;

/// Spurious points are rewritten to this multiple of clear-sky.
const SPURIOUS_REWRITE_FACTOR: f64 = 1.05;

/// Corrected rs above this multiple of rso gets clipped back to rso.
const CLIP_TRIGGER_FACTOR: f64 = 1.03;

/// Tuning for the periodic ratio correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadiationDriftParams {
    /// Length of each correction period in days.
    pub period_days: usize,
    /// Number of largest-ratio days the factor is computed from.
    pub sample_size: usize,
}

impl Default for RadiationDriftParams {
    fn default() -> Self {
        RadiationDriftParams {
            period_days: 60,
            sample_size: 6,
        }
    }
}

/// Outcome counters, independently testable and reported to the operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadiationDriftReport {
    /// Points excluded as sensor spikes and rewritten to rso * 1.05.
    pub excluded_spurious: usize,
    /// Points nulled because their period's factor fell outside [0.5, 1.5].
    pub removed_out_of_range: usize,
    /// Points nulled in periods with fewer than K usable ratios.
    pub removed_insufficient: usize,
    /// Points clipped back to rso after correction.
    pub clipped: usize,
    /// Points in healthy periods (factor within [0.97, 1.03]), untouched.
    pub unchanged: usize,
    /// Points multiplied by their period's factor.
    pub corrected: usize,
    /// One factor per period, `None` when the period had insufficient data.
    pub period_factors: Vec<Option<f64>>,
}

/// Runs the periodic ratio correction over the interval, mutating `rs` in
/// place.
pub fn correct_radiation_drift(
    series: &mut TimeSeries,
    interval: CorrectionInterval,
    params: RadiationDriftParams,
) -> RadiationDriftReport {
    let mut rs = series.values(Variable::Rs);
    let rso = series.values(Variable::Rso);
    let mut excluded = vec![false; series.len()];
    let mut report = RadiationDriftReport::default();

    let mut period_start = interval.start();
    while period_start < interval.end() {
        let period_end = (period_start + params.period_days).min(interval.end());
        let factor = correct_period(
            &mut rs,
            &rso,
            period_start..period_end,
            params.sample_size,
            &mut excluded,
            &mut report,
        );
        report.period_factors.push(factor);
        period_start = period_end;
    }

    // radiation cannot exceed clear-sky by more than a small margin for
    // long; spurious rewrites keep their rso * 1.05 value
    for i in interval.indices() {
        if excluded[i] {
            continue;
        }
        if rs[i].is_finite() && rso[i].is_finite() && rs[i] > rso[i] * CLIP_TRIGGER_FACTOR {
            rs[i] = rso[i];
            report.clipped += 1;
        }
    }

    series.apply_values(Variable::Rs, &rs);
    info!(
        "radiation drift pass: {} corrected, {} unchanged, {} spurious, \
         {} removed (factor), {} removed (insufficient), {} clipped",
        report.corrected,
        report.unchanged,
        report.excluded_spurious,
        report.removed_out_of_range,
        report.removed_insufficient,
        report.clipped
    );
    report
}

fn correct_period(
    rs: &mut [f64],
    rso: &[f64],
    period: Range<usize>,
    k: usize,
    excluded: &mut [bool],
    report: &mut RadiationDriftReport,
) -> Option<f64> {
    // rank usable days by rs/rso, largest first; ties keep day order
    let mut ranked: Vec<usize> = period
        .clone()
        .filter(|&i| rs[i].is_finite() && rso[i].is_finite() && rso[i] > 0.0)
        .collect();
    ranked.sort_by_key(|&i| Reverse(OrderedFloat(rs[i] / rso[i])));

    if ranked.len() < k {
        for i in period {
            if rs[i].is_finite() {
                report.removed_insufficient += 1;
            }
            rs[i] = f64::NAN;
        }
        warn!(
            "period with {} usable ratios (< {}), all rs nulled",
            ranked.len(),
            k
        );
        return None;
    }

    let mut offset = 0;
    let factor = loop {
        let current_cf = window_factor(rs, rso, &ranked[offset..offset + k]);
        if offset + k >= ranked.len() {
            break current_cf;
        }
        // test whether the current largest-ratio day is unduly influential:
        // shift the window past it and see how far the factor moves
        let new_cf = window_factor(rs, rso, &ranked[offset + 1..offset + 1 + k]);
        let candidate = ranked[offset];
        let jump = (new_cf - current_cf) / current_cf;
        let spurious = (jump >= SPURIOUS_RELATIVE_JUMP && rs[candidate] > rso[candidate])
            || rs[candidate] - rso[candidate] >= SPURIOUS_ABSOLUTE_EXCESS;
        if !spurious {
            break current_cf;
        }
        debug!(
            "spurious rs point at index {candidate}: rs {} vs rso {}",
            rs[candidate], rso[candidate]
        );
        rs[candidate] = rso[candidate] * SPURIOUS_REWRITE_FACTOR;
        excluded[candidate] = true;
        report.excluded_spurious += 1;
        offset += 1;
    };

    if !(FACTOR_CREDIBLE_MIN..=FACTOR_CREDIBLE_MAX).contains(&factor) {
        // too large a correction to be credible; the period cannot be
        // salvaged
        for i in period {
            if !excluded[i] {
                if rs[i].is_finite() {
                    report.removed_out_of_range += 1;
                }
                rs[i] = f64::NAN;
            }
        }
        warn!("period factor {factor:.3} outside credible bounds, period discarded");
    } else if (FACTOR_DEAD_BAND_MIN..=FACTOR_DEAD_BAND_MAX).contains(&factor) {
        report.unchanged += period.filter(|&i| !excluded[i] && rs[i].is_finite()).count();
    } else {
        for i in period {
            if !excluded[i] && rs[i].is_finite() {
                rs[i] *= factor;
                report.corrected += 1;
            }
        }
    }
    Some(factor)
}

/// `mean(rso) / mean(rs)` over the given day indices.
fn window_factor(rs: &[f64], rso: &[f64], window: &[usize]) -> f64 {
    let rs_values: Vec<f64> = window.iter().map(|&i| rs[i]).collect();
    let rso_values: Vec<f64> = window.iter().map(|&i| rso[i]).collect();
    nan_mean(&rso_values) / nan_mean(&rs_values)
}
