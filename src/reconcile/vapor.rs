//! Saturation vapor pressure relations used by the humidity cascade.

/// Saturation vapor pressure at air temperature `t` [C], in kPa.
pub fn es(t: f64) -> f64 {
    0.6108 * (17.27 * t / (t + 237.3)).exp()
}

/// Dew point temperature [C] from actual vapor pressure `ea` [kPa].
///
/// Inverse of `es`; only defined for positive `ea`.
pub fn tdew_from_ea(ea: f64) -> f64 {
    let ln_ea = ea.ln();
    (116.91 + 237.3 * ln_ea) / (16.78 - ln_ea)
}

/// Actual vapor pressure [kPa] from the relative-humidity extremes.
///
/// The two weighted terms are combined as a symmetric mean,
/// `(es(tmin) * rhmax/100 + es(tmax) * rhmin/100) / 2`.
pub fn ea_from_rh_extremes(tmin: f64, tmax: f64, rhmax: f64, rhmin: f64) -> f64 {
    (es(tmin) * rhmax / 100.0 + es(tmax) * rhmin / 100.0) / 2.0
}

/// Actual vapor pressure [kPa] from average temperature and humidity.
pub fn ea_from_rh_avg(tavg: f64, rhavg: f64) -> f64 {
    es(tavg) * rhavg / 100.0
}
