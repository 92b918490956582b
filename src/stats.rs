//! NaN-aware statistics primitives shared by the correctors.
//!
//! Missing observations travel through the correction kernels as `f64::NAN`,
//! so every helper here skips non-finite entries instead of poisoning the
//! aggregate.

/// Mean of the finite entries of `values`. `NAN` when none are finite.
pub(crate) fn nan_mean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &v in values {
        if v.is_finite() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Median of the finite entries of `values`. `NAN` when none are finite.
pub(crate) fn nan_median(values: &[f64]) -> f64 {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    finite.sort_unstable_by(f64::total_cmp);
    let mid = finite.len() / 2;
    if finite.len() % 2 == 0 {
        (finite[mid - 1] + finite[mid]) / 2.0
    } else {
        finite[mid]
    }
}

/// Median absolute deviation around the median of the finite entries.
///
/// A constant sample yields `0.0`; an all-missing sample yields `NAN`. The
/// caller decides what a zero MAD means (see the outlier corrector).
pub(crate) fn nan_mad(values: &[f64]) -> f64 {
    let median = nan_median(values);
    if median.is_nan() {
        return f64::NAN;
    }
    let deviations: Vec<f64> = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|v| (v - median).abs())
        .collect();
    nan_median(&deviations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_skips_nan() {
        assert_eq!(nan_mean(&[1.0, f64::NAN, 3.0]), 2.0);
    }

    #[test]
    fn mean_of_all_missing_is_nan() {
        assert!(nan_mean(&[f64::NAN, f64::NAN]).is_nan());
        assert!(nan_mean(&[]).is_nan());
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(nan_median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(nan_median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
    }

    #[test]
    fn median_skips_nan() {
        assert_eq!(nan_median(&[f64::NAN, 5.0, 1.0, f64::NAN, 3.0]), 3.0);
    }

    #[test]
    fn mad_of_constant_sample_is_zero() {
        assert_eq!(nan_mad(&[2.0, 2.0, 2.0]), 0.0);
    }

    #[test]
    fn mad_known_value() {
        // median = 3, |x - 3| = [2, 1, 0, 1, 2], MAD = 1
        assert_eq!(nan_mad(&[1.0, 2.0, 3.0, 4.0, 5.0]), 1.0);
    }
}
