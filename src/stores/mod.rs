//! Persistence seams.
//!
//! The optimization core talks to the surrounding platform through four
//! narrow async traits: the equipment directory, the attribute store, and
//! the two record stores. Production deployments back these with the
//! platform's database; tests and single-node setups use the in-memory
//! implementations in [`memory`].

pub mod memory;

pub use memory::{
    InMemoryAttributeStore, InMemoryDirectory, InMemoryRecommendationStore, InMemoryResultStore,
};

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{
    AssetType, OptimizationKind, OptimizationResult, Recommendation, RecommendationStatus,
    RunStatus,
};

// ============================================================================
// Directory types
// ============================================================================

/// Lift method installed on a well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiftKind {
    Esp,
    Pcp,
    RodPump,
    GasLift,
}

impl LiftKind {
    /// The optimization algorithm that serves this lift method.
    pub fn optimization_kind(self) -> OptimizationKind {
        match self {
            Self::Esp => OptimizationKind::EspFrequency,
            Self::Pcp => OptimizationKind::PcpSpeed,
            Self::RodPump => OptimizationKind::RodPump,
            Self::GasLift => OptimizationKind::GasLiftAllocation,
        }
    }
}

/// A well or field known to the equipment directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub asset_type: AssetType,
    /// Present on wells, absent on fields
    pub lift_kind: Option<LiftKind>,
    /// The field a well belongs to, when assigned
    pub field_id: Option<Uuid>,
}

// ============================================================================
// Attributes
// ============================================================================

/// Latest operating attributes for one asset, keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeMap(HashMap<String, Value>);

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Numeric attribute, accepting both JSON numbers and numeric strings
    /// (telemetry gateways deliver both).
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Numeric attribute with a documented fallback.
    pub fn f64_or(&self, key: &str, fallback: f64) -> f64 {
        self.get_f64(key).unwrap_or(fallback)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Lay `other`'s attributes over this map, overwriting shared keys.
    /// Equipment-asset readings take precedence over well-level ones.
    pub fn overlay(&mut self, other: AttributeMap) {
        self.0.extend(other.0);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Paging
// ============================================================================

/// Offset/limit paging for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

// ============================================================================
// Store traits
// ============================================================================

/// Asset lookup: which wells exist, what lift they run, which field owns them.
#[async_trait]
pub trait EquipmentDirectory: Send + Sync {
    async fn get_asset(&self, id: Uuid) -> Result<Option<AssetInfo>, StoreError>;

    /// All wells of one lift kind in a tenant.
    async fn wells_of_kind(
        &self,
        tenant_id: Uuid,
        kind: LiftKind,
    ) -> Result<Vec<AssetInfo>, StoreError>;

    /// All wells assigned to a field.
    async fn wells_in_field(&self, field_id: Uuid) -> Result<Vec<AssetInfo>, StoreError>;
}

/// Latest-value attribute access for one asset.
#[async_trait]
pub trait AttributeStore: Send + Sync {
    async fn attributes(&self, asset_id: Uuid) -> Result<AttributeMap, StoreError>;

    async fn write_attributes(
        &self,
        asset_id: Uuid,
        attributes: AttributeMap,
    ) -> Result<(), StoreError>;
}

/// Optimization run records.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn create(&self, result: OptimizationResult) -> Result<(), StoreError>;

    /// Overwrite the stored record (used to finalize a running record).
    async fn update(&self, result: OptimizationResult) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<OptimizationResult>, StoreError>;

    /// Most recent record for an asset, any algorithm.
    async fn latest_for_asset(
        &self,
        asset_id: Uuid,
    ) -> Result<Option<OptimizationResult>, StoreError>;

    /// Most recent record for an asset and algorithm.
    async fn latest_for_asset_of_kind(
        &self,
        asset_id: Uuid,
        kind: OptimizationKind,
    ) -> Result<Option<OptimizationResult>, StoreError>;

    /// Newest-first page of a tenant's records, optionally one algorithm.
    async fn list_for_tenant(
        &self,
        tenant_id: Uuid,
        kind: Option<OptimizationKind>,
        page: PageRequest,
    ) -> Result<Page<OptimizationResult>, StoreError>;

    /// Records in a closed time window, newest first.
    async fn list_in_range(
        &self,
        tenant_id: Uuid,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<OptimizationResult>, StoreError>;

    async fn count_with_status(
        &self,
        tenant_id: Uuid,
        status: RunStatus,
    ) -> Result<usize, StoreError>;
}

/// Recommendation records and lifecycle queries.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn create(&self, rec: Recommendation) -> Result<(), StoreError>;

    async fn update(&self, rec: Recommendation) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Recommendation>, StoreError>;

    /// Newest-first page of a tenant's recommendations, optionally one status.
    async fn list_for_tenant(
        &self,
        tenant_id: Uuid,
        status: Option<RecommendationStatus>,
        page: PageRequest,
    ) -> Result<Page<Recommendation>, StoreError>;

    /// Pending recommendations for one asset, highest priority first.
    async fn pending_for_asset(&self, asset_id: Uuid) -> Result<Vec<Recommendation>, StoreError>;

    async fn count_with_status(
        &self,
        tenant_id: Uuid,
        status: RecommendationStatus,
    ) -> Result<usize, StoreError>;

    /// Share of decided recommendations that were accepted, in [0, 1].
    /// Accepted means approved or executed; decided adds rejected.
    async fn acceptance_rate(&self, tenant_id: Uuid) -> Result<f64, StoreError>;

    /// Expire every pending recommendation whose expiry time has passed.
    /// The check-and-set is atomic with respect to concurrent lifecycle
    /// actions; returns the number of recommendations expired.
    async fn expire_overdue(&self, now_ms: i64) -> Result<usize, StoreError>;
}
