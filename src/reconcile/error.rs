use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(
        "no humidity source provided (none of ea, tdew, rhmax/rhmin, rhavg); \
         reference ET cannot be computed from this record"
    )]
    NoHumiditySource,
}
