//! Operator-facing recommendations and their lifecycle states.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::{AssetType, OptimizationKind};

/// Recommendation lifecycle state.
///
/// ```text
/// Pending ──> Approved ──> Executed
///    │           │    └──> Failed ──> Cancelled
///    │           └──> Cancelled
///    ├──> Rejected
///    ├──> Cancelled
///    └──> Expired
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationStatus {
    Pending,
    Approved,
    Rejected,
    Executed,
    Failed,
    Cancelled,
    Expired,
}

impl RecommendationStatus {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Executed | Self::Rejected | Self::Cancelled | Self::Expired
        )
    }

    /// Whether the transition `self -> next` is allowed.
    pub fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Pending => matches!(
                next,
                Self::Approved | Self::Rejected | Self::Cancelled | Self::Expired
            ),
            Self::Approved => matches!(next, Self::Executed | Self::Failed | Self::Cancelled),
            Self::Failed => matches!(next, Self::Cancelled),
            Self::Executed | Self::Rejected | Self::Cancelled | Self::Expired => false,
        }
    }
}

impl std::fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Executed => "EXECUTED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        };
        write!(f, "{tag}")
    }
}

/// A single actionable recommendation presented to operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub asset_id: Uuid,
    pub asset_type: AssetType,
    pub asset_name: String,
    pub kind: OptimizationKind,
    /// 1 (highest) through 4, from the expected production gain
    pub priority: u8,
    pub title: String,
    pub description: String,
    pub current_value: f64,
    pub recommended_value: f64,
    pub unit: String,
    pub expected_production_increase_bpd: f64,
    pub expected_production_increase_pct: f64,
    pub efficiency_improvement_pct: f64,
    /// Clamped to [0.5, 1.0] at creation
    pub confidence: f64,
    pub status: RecommendationStatus,
    /// Run record that produced this recommendation
    pub optimization_result_id: Option<Uuid>,
    pub created_by: String,
    pub approved_by: Option<String>,
    pub executed_by: Option<String>,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    /// Epoch milliseconds
    pub created_at_ms: i64,
    pub approved_at_ms: Option<i64>,
    pub executed_at_ms: Option<i64>,
    /// When a still-pending recommendation goes stale (epoch ms)
    pub expiry_at_ms: Option<i64>,
}
