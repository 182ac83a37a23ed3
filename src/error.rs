//! Error taxonomy for the optimization core.
//!
//! Three layers: [`ComputeError`] for pure optimizer math, [`StoreError`]
//! for persistence, and [`OptimizeError`] for the orchestration surface
//! that wraps both.

use thiserror::Error;
use uuid::Uuid;

use crate::types::{OptimizationKind, RecommendationStatus};

/// Failures inside a pure optimizer computation.
#[derive(Debug, Error)]
pub enum ComputeError {
    /// The snapshot variant does not match the optimizer that received it.
    #[error("snapshot does not match optimizer, expected {expected}")]
    SnapshotMismatch { expected: OptimizationKind },

    /// A required input is absent and has no documented fallback.
    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    /// Field allocation was asked to run over an empty well list.
    #[error("no gas lift wells available for allocation")]
    NoWells,
}

/// Failures in a persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage failure: {0}")]
    Storage(String),

    #[error("serialization failure: {0}")]
    Serialization(String),
}

/// Failures surfaced by the orchestration and lifecycle layers.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// A lifecycle action that the current status does not allow.
    #[error("invalid transition from {current} to {attempted}")]
    InvalidState {
        current: RecommendationStatus,
        attempted: RecommendationStatus,
    },

    /// The asset exists but has no artificial lift method configured.
    #[error("asset {id} has no artificial lift configured")]
    NoLift { id: Uuid },

    /// An optimizer run failed; the run record carries the same message.
    #[error("{kind} computation failed for asset {asset_id}: {message}")]
    ComputationFailure {
        kind: OptimizationKind,
        asset_id: Uuid,
        message: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_part() {
        let e = ComputeError::SnapshotMismatch {
            expected: OptimizationKind::EspFrequency,
        };
        assert!(e.to_string().contains("ESP_FREQUENCY"));

        let e = OptimizeError::InvalidState {
            current: RecommendationStatus::Executed,
            attempted: RecommendationStatus::Approved,
        };
        assert!(e.to_string().contains("EXECUTED"));
        assert!(e.to_string().contains("APPROVED"));
    }
}
