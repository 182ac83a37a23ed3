//! Per-equipment optimizers.
//!
//! Each optimizer is a pure, deterministic function of one equipment
//! snapshot and the loaded configuration: no I/O, no clocks, no randomness.
//! The same snapshot and config always produce the same outcome.
//!
//! Recommendations never leave the configured operating envelope, and a
//! projected value that would cross a bound is clamped with the binding
//! constraint recorded on the outcome.

pub mod esp;
pub mod gas_lift;
pub mod pcp;
pub mod rod_pump;

pub use esp::EspFrequencyOptimizer;
pub use gas_lift::{allocate_field_gas, GasLiftOptimizer};
pub use pcp::PcpSpeedOptimizer;
pub use rod_pump::RodPumpOptimizer;

use crate::config::OptimizerConfig;
use crate::error::ComputeError;
use crate::types::{EquipmentSnapshot, OptimizationKind, OptimizationOutcome};

/// A single-asset optimizer.
pub trait Optimizer: Send + Sync {
    /// The algorithm this optimizer implements.
    fn kind(&self) -> OptimizationKind;

    /// Compute the recommended operating point for one snapshot.
    ///
    /// # Errors
    ///
    /// [`ComputeError::SnapshotMismatch`] when handed a snapshot for a
    /// different lift type.
    fn optimize(
        &self,
        snapshot: &EquipmentSnapshot,
        config: &OptimizerConfig,
    ) -> Result<OptimizationOutcome, ComputeError>;
}

/// Look up the optimizer for a given algorithm.
pub fn optimizer_for(kind: OptimizationKind) -> Box<dyn Optimizer> {
    match kind {
        OptimizationKind::EspFrequency => Box::new(EspFrequencyOptimizer),
        OptimizationKind::PcpSpeed => Box::new(PcpSpeedOptimizer),
        OptimizationKind::RodPump => Box::new(RodPumpOptimizer),
        OptimizationKind::GasLiftAllocation => Box::new(GasLiftOptimizer),
    }
}

/// Clamp a confidence score into the accepted band.
pub(crate) fn clamp_confidence(raw: f64) -> f64 {
    raw.clamp(crate::config::defaults::CONFIDENCE_FLOOR, 1.0)
}
