//! Top-level error type for `fps_core`
use crate::league::SnapshotError;
use crate::sim::SimError;
use thiserror::Error;

/// Top-level error type for `fps_core`
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("simulation error: {0}")]
    Sim(#[from] SimError),
}

impl CoreError {
    /// Cooperative cancellation is a distinct status, not a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Sim(SimError::Cancelled))
    }
}
