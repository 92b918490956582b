//! Quality control and drift correction for daily agricultural weather
//! station records.
//!
//! The crate ingests a gap-reindexed daily series (parsing and unit
//! conversion happen upstream), reconciles humidity and temperature
//! secondaries, and drives an interactive correct -> preview -> commit ->
//! recompute loop over statistical drift and outlier correctors, keeping
//! every derived quantity (vapor pressure, clear-sky radiation, reference
//! ET) consistent after each commit.

mod correction;
mod error;
mod optimize;
mod physics;
mod reconcile;
mod session;
mod stats;
mod types;

pub use error::QcError;

pub use types::climatology::MonthlyClimatology;
pub use types::daily_record::DailyRecord;
pub use types::field_set::FieldSet;
pub use types::interval::{CorrectionInterval, IntervalError};
pub use types::series::{SeriesError, TimeSeries};
pub use types::site::{ConfigError, SiteConfig};
pub use types::variable::Variable;

pub use reconcile::error::ReconcileError;
pub use reconcile::vapor::*;
pub use reconcile::{
    reconcile, resolve_humidity_source, CompiledVaporPressure, EaSource, HumiditySource,
    Reconciliation,
};

pub use correction::humidity::*;
pub use correction::manual::*;
pub use correction::outlier::*;
pub use correction::radiation::*;

pub use optimize::{
    fill_missing_rs, optimize_model, thornton_running_rs, OptimizeError, OptimizedModel,
    OptimizerMode, ThorntonRunningCoefficients,
};

pub use physics::{
    atmospheric_pressure_kpa, EtFormulas, ReferenceEtInput, RS_W_M2_TO_MJ_M2,
};

pub use session::controller::{QcSession, SessionOutput, SessionSummary};
pub use session::error::SessionError;
pub use session::ports::{ConfirmOutcome, DecisionPort, PreviewDiff, ReviewPort};
pub use session::state::{CorrectionMethod, SessionState};
