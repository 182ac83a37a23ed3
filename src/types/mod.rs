//! Core domain types: snapshots in, outcomes and recommendations out.

pub mod allocation;
pub mod outcome;
pub mod recommendation;
pub mod result;
pub mod snapshot;

pub use allocation::{FieldAllocationResult, WellAllocation};
pub use outcome::{
    CounterbalanceAdjustment, EspOutcome, GasLiftOutcome, LimitingConstraint, OptimizationOutcome,
    PcpOutcome, RodPumpOutcome,
};
pub use recommendation::{Recommendation, RecommendationStatus};
pub use result::{AssetType, OptimizationKind, OptimizationResult, RunStatus};
pub use snapshot::{
    EquipmentSnapshot, EspSnapshot, GasLiftWellSnapshot, PcpSnapshot, RodPumpSnapshot,
};
