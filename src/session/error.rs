use crate::session::state::CorrectionMethod;
use crate::types::interval::IntervalError;
use crate::types::site::ConfigError;
use crate::types::variable::Variable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Interval(#[from] IntervalError),

    #[error("variable {0} is neither provided nor derivable for this station")]
    VariableUnavailable(Variable),

    #[error("correction method {method:?} does not apply to variable {variable}")]
    MethodMismatch {
        variable: Variable,
        method: CorrectionMethod,
    },
}
