use crate::correction::radiation::RadiationDriftParams;
use crate::types::variable::Variable;
use serde::{Deserialize, Serialize};

/// Where the interactive correction loop currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    SelectVariable,
    SelectInterval,
    SelectMethod,
    Preview,
    ConfirmIteration,
    Done,
}

/// The correction applied to a candidate series in one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CorrectionMethod {
    /// Add a constant offset to every present value in the interval.
    Additive(f64),
    /// Scale every present value in the interval.
    Multiplicative(f64),
    /// Null every present value in the interval.
    NullOut,
    /// Modified z-score outlier removal on the selected variable and a
    /// paired second one (tmax with tmin, tmin with tdew).
    ModifiedZScore { secondary: Variable },
    /// Yearly top-percentile drift correction for the RH extremes.
    YearlyPercentile { percent: f64 },
    /// Period-based ratio correction for solar radiation.
    PeriodicRatio(RadiationDriftParams),
}
