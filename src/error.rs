use crate::optimize::OptimizeError;
use crate::reconcile::error::ReconcileError;
use crate::session::error::SessionError;
use crate::types::series::SeriesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QcError {
    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Optimize(#[from] OptimizeError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
