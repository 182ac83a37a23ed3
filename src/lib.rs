//! Liftopt: Artificial-Lift Production Optimization
//!
//! Advisory optimization core for artificially lifted oil wells. Computes
//! bounded setpoint recommendations per lift method and routes them through
//! an operator approval workflow; it never actuates equipment.
//!
//! ## Architecture
//!
//! - **Optimizers**: Pure per-equipment algorithms (ESP frequency, PCP speed,
//!   rod pump speed, gas lift marginal rates) plus the field-level gas
//!   allocator
//! - **Orchestrator**: Runs optimizers against live attributes, persists run
//!   records, files recommendations
//! - **Recommend**: Recommendation factory and approval lifecycle with
//!   automatic expiry
//! - **Stores**: Async persistence seams with in-memory implementations

pub mod config;
pub mod error;
pub mod optimizers;
pub mod orchestrator;
pub mod recommend;
pub mod stores;
pub mod types;
pub mod util;

// Re-export configuration
pub use config::OptimizerConfig;

// Re-export commonly used types
pub use types::{
    EquipmentSnapshot, EspSnapshot, FieldAllocationResult, GasLiftWellSnapshot,
    LimitingConstraint, OptimizationKind, OptimizationOutcome, OptimizationResult, PcpSnapshot,
    Recommendation, RecommendationStatus, RodPumpSnapshot, RunStatus, WellAllocation,
};

// Re-export optimizers
pub use optimizers::{
    allocate_field_gas, EspFrequencyOptimizer, GasLiftOptimizer, Optimizer, PcpSpeedOptimizer,
    RodPumpOptimizer,
};

// Re-export orchestration and lifecycle
pub use orchestrator::{BatchSummary, OptimizationService};
pub use recommend::LifecycleManager;

// Re-export store seams
pub use stores::{
    AssetInfo, AttributeMap, AttributeStore, EquipmentDirectory, LiftKind, Page, PageRequest,
    RecommendationStore, ResultStore,
};

// Re-export errors
pub use error::{ComputeError, OptimizeError, StoreError};
