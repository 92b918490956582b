//! Injected operator-facing ports. The engine never talks to a terminal
//! or a plot window itself; tests drive these with scripted mocks.

use crate::session::state::CorrectionMethod;
use crate::types::interval::CorrectionInterval;
use crate::types::series::TimeSeries;
use crate::types::variable::Variable;

/// How the operator resolves a previewed iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Promote the candidate and pick another interval on the same
    /// variable.
    CommitAndLoop,
    /// Promote the candidate and return to variable selection.
    CommitAndStop,
    /// Discard the candidate and every prior iteration; back to the
    /// session backup.
    Restart,
    /// Discard everything and end the session.
    Abort,
}

/// Before/after views handed to the preview collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewDiff {
    pub variable: Variable,
    pub interval: CorrectionInterval,
    pub before: Vec<f64>,
    pub after: Vec<f64>,
    /// `after - before`, NaN where either side is missing.
    pub delta: Vec<f64>,
    /// `delta / before * 100`, NaN where undefined.
    pub percent_delta: Vec<f64>,
}

impl PreviewDiff {
    pub(crate) fn compute(
        committed: &TimeSeries,
        candidate: &TimeSeries,
        variable: Variable,
        interval: CorrectionInterval,
    ) -> Self {
        let before = committed.values(variable);
        let after = candidate.values(variable);
        let delta: Vec<f64> = before.iter().zip(&after).map(|(b, a)| a - b).collect();
        let percent_delta = before
            .iter()
            .zip(&delta)
            .map(|(b, d)| d / b * 100.0)
            .collect();
        PreviewDiff {
            variable,
            interval,
            before,
            after,
            delta,
            percent_delta,
        }
    }
}

/// Operator choices driving the state machine.
pub trait DecisionPort {
    /// Picks the next variable to work on; `None` ends the session.
    fn select_variable(&mut self, available: &[Variable]) -> Option<Variable>;

    /// Picks a `[start, end)` index range; it will be clamped to the
    /// series bounds.
    fn select_interval(&mut self, series_len: usize) -> (usize, usize);

    /// Picks the correction to apply to the chosen variable.
    fn select_method(&mut self, variable: Variable) -> CorrectionMethod;
}

/// The preview/confirm collaborator: shown the diff, returns the
/// operator's verdict.
pub trait ReviewPort {
    fn review(&mut self, preview: &PreviewDiff) -> ConfirmOutcome;
}
