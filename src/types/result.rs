//! Optimization run records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The four optimization algorithms this core runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizationKind {
    EspFrequency,
    PcpSpeed,
    RodPump,
    GasLiftAllocation,
}

impl OptimizationKind {
    /// Human-readable algorithm name stored on run records.
    pub fn algorithm(self) -> &'static str {
        match self {
            Self::EspFrequency => "ESP Frequency Optimization",
            Self::PcpSpeed => "PCP Speed Optimization",
            Self::RodPump => "Rod Pump Optimization",
            Self::GasLiftAllocation => "Gas Lift Allocation Optimization",
        }
    }
}

impl std::fmt::Display for OptimizationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::EspFrequency => "ESP_FREQUENCY",
            Self::PcpSpeed => "PCP_SPEED",
            Self::RodPump => "ROD_PUMP",
            Self::GasLiftAllocation => "GAS_LIFT_ALLOCATION",
        };
        write!(f, "{tag}")
    }
}

/// Lifecycle of a single optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// Whether a record targets a single well or a whole field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Well,
    Field,
}

/// Persistent record of one optimization run.
///
/// Created in `Running` state before the optimizer executes, then finalized
/// to `Completed` or `Failed`. Failed runs keep the error message; completed
/// runs carry the recommended value and the structured output payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub asset_id: Uuid,
    pub asset_type: AssetType,
    pub kind: OptimizationKind,
    pub run_status: RunStatus,
    pub algorithm: String,
    pub algorithm_version: String,
    /// Recommended value of the primary operating variable, when completed
    pub optimal_value: Option<f64>,
    /// Unit of `optimal_value`
    pub optimal_unit: Option<String>,
    /// Structured outputs of the run (projections, constraints, confidence)
    pub output: Option<serde_json::Value>,
    pub converged: bool,
    pub computation_time_ms: u64,
    /// Fraction of inputs read from live attributes rather than fallbacks
    pub data_quality_score: Option<f64>,
    pub error_message: Option<String>,
    /// Who or what started the run ("scheduler", a user name, ...)
    pub triggered_by: String,
    /// Run creation time (epoch milliseconds)
    pub timestamp_ms: i64,
}
