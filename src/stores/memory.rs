//! In-memory store implementations.
//!
//! HashMaps behind `std::sync::RwLock`. Locks are held only for the map
//! operation itself, never across an await point, so the blocking is
//! negligible under the async traits.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{
    OptimizationKind, OptimizationResult, Recommendation, RecommendationStatus, RunStatus,
};

use super::{
    AssetInfo, AttributeMap, AttributeStore, EquipmentDirectory, LiftKind, Page, PageRequest,
    RecommendationStore, ResultStore,
};

fn poisoned() -> StoreError {
    StoreError::Storage("store lock poisoned".into())
}

// ============================================================================
// Directory
// ============================================================================

#[derive(Default)]
pub struct InMemoryDirectory {
    assets: RwLock<HashMap<Uuid, AssetInfo>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset, replacing any previous entry with the same id.
    pub fn insert(&self, asset: AssetInfo) -> Result<(), StoreError> {
        self.assets
            .write()
            .map_err(|_| poisoned())?
            .insert(asset.id, asset);
        Ok(())
    }
}

#[async_trait]
impl EquipmentDirectory for InMemoryDirectory {
    async fn get_asset(&self, id: Uuid) -> Result<Option<AssetInfo>, StoreError> {
        Ok(self.assets.read().map_err(|_| poisoned())?.get(&id).cloned())
    }

    async fn wells_of_kind(
        &self,
        tenant_id: Uuid,
        kind: LiftKind,
    ) -> Result<Vec<AssetInfo>, StoreError> {
        let assets = self.assets.read().map_err(|_| poisoned())?;
        let mut wells: Vec<AssetInfo> = assets
            .values()
            .filter(|a| a.tenant_id == tenant_id && a.lift_kind == Some(kind))
            .cloned()
            .collect();
        wells.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(wells)
    }

    async fn wells_in_field(&self, field_id: Uuid) -> Result<Vec<AssetInfo>, StoreError> {
        let assets = self.assets.read().map_err(|_| poisoned())?;
        let mut wells: Vec<AssetInfo> = assets
            .values()
            .filter(|a| a.field_id == Some(field_id))
            .cloned()
            .collect();
        wells.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(wells)
    }
}

// ============================================================================
// Attributes
// ============================================================================

#[derive(Default)]
pub struct InMemoryAttributeStore {
    attributes: RwLock<HashMap<Uuid, AttributeMap>>,
}

impl InMemoryAttributeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttributeStore for InMemoryAttributeStore {
    async fn attributes(&self, asset_id: Uuid) -> Result<AttributeMap, StoreError> {
        Ok(self
            .attributes
            .read()
            .map_err(|_| poisoned())?
            .get(&asset_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn write_attributes(
        &self,
        asset_id: Uuid,
        attributes: AttributeMap,
    ) -> Result<(), StoreError> {
        self.attributes
            .write()
            .map_err(|_| poisoned())?
            .insert(asset_id, attributes);
        Ok(())
    }
}

// ============================================================================
// Results
// ============================================================================

#[derive(Default)]
pub struct InMemoryResultStore {
    results: RwLock<HashMap<Uuid, OptimizationResult>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn create(&self, result: OptimizationResult) -> Result<(), StoreError> {
        self.results
            .write()
            .map_err(|_| poisoned())?
            .insert(result.id, result);
        Ok(())
    }

    async fn update(&self, result: OptimizationResult) -> Result<(), StoreError> {
        self.results
            .write()
            .map_err(|_| poisoned())?
            .insert(result.id, result);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<OptimizationResult>, StoreError> {
        Ok(self.results.read().map_err(|_| poisoned())?.get(&id).cloned())
    }

    async fn latest_for_asset(
        &self,
        asset_id: Uuid,
    ) -> Result<Option<OptimizationResult>, StoreError> {
        let results = self.results.read().map_err(|_| poisoned())?;
        Ok(results
            .values()
            .filter(|r| r.asset_id == asset_id)
            .max_by_key(|r| r.timestamp_ms)
            .cloned())
    }

    async fn latest_for_asset_of_kind(
        &self,
        asset_id: Uuid,
        kind: OptimizationKind,
    ) -> Result<Option<OptimizationResult>, StoreError> {
        let results = self.results.read().map_err(|_| poisoned())?;
        Ok(results
            .values()
            .filter(|r| r.asset_id == asset_id && r.kind == kind)
            .max_by_key(|r| r.timestamp_ms)
            .cloned())
    }

    async fn list_for_tenant(
        &self,
        tenant_id: Uuid,
        kind: Option<OptimizationKind>,
        page: PageRequest,
    ) -> Result<Page<OptimizationResult>, StoreError> {
        let results = self.results.read().map_err(|_| poisoned())?;
        let mut matching: Vec<OptimizationResult> = results
            .values()
            .filter(|r| r.tenant_id == tenant_id && kind.is_none_or(|k| r.kind == k))
            .cloned()
            .collect();
        matching.sort_by_key(|r| std::cmp::Reverse(r.timestamp_ms));
        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect();
        Ok(Page { items, total })
    }

    async fn list_in_range(
        &self,
        tenant_id: Uuid,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<OptimizationResult>, StoreError> {
        let results = self.results.read().map_err(|_| poisoned())?;
        let mut matching: Vec<OptimizationResult> = results
            .values()
            .filter(|r| {
                r.tenant_id == tenant_id && r.timestamp_ms >= from_ms && r.timestamp_ms <= to_ms
            })
            .cloned()
            .collect();
        matching.sort_by_key(|r| std::cmp::Reverse(r.timestamp_ms));
        Ok(matching)
    }

    async fn count_with_status(
        &self,
        tenant_id: Uuid,
        status: RunStatus,
    ) -> Result<usize, StoreError> {
        let results = self.results.read().map_err(|_| poisoned())?;
        Ok(results
            .values()
            .filter(|r| r.tenant_id == tenant_id && r.run_status == status)
            .count())
    }
}

// ============================================================================
// Recommendations
// ============================================================================

#[derive(Default)]
pub struct InMemoryRecommendationStore {
    recommendations: RwLock<HashMap<Uuid, Recommendation>>,
}

impl InMemoryRecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecommendationStore for InMemoryRecommendationStore {
    async fn create(&self, rec: Recommendation) -> Result<(), StoreError> {
        self.recommendations
            .write()
            .map_err(|_| poisoned())?
            .insert(rec.id, rec);
        Ok(())
    }

    async fn update(&self, rec: Recommendation) -> Result<(), StoreError> {
        self.recommendations
            .write()
            .map_err(|_| poisoned())?
            .insert(rec.id, rec);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Recommendation>, StoreError> {
        Ok(self
            .recommendations
            .read()
            .map_err(|_| poisoned())?
            .get(&id)
            .cloned())
    }

    async fn list_for_tenant(
        &self,
        tenant_id: Uuid,
        status: Option<RecommendationStatus>,
        page: PageRequest,
    ) -> Result<Page<Recommendation>, StoreError> {
        let recs = self.recommendations.read().map_err(|_| poisoned())?;
        let mut matching: Vec<Recommendation> = recs
            .values()
            .filter(|r| r.tenant_id == tenant_id && status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        matching.sort_by_key(|r| std::cmp::Reverse(r.created_at_ms));
        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect();
        Ok(Page { items, total })
    }

    async fn pending_for_asset(&self, asset_id: Uuid) -> Result<Vec<Recommendation>, StoreError> {
        let recs = self.recommendations.read().map_err(|_| poisoned())?;
        let mut matching: Vec<Recommendation> = recs
            .values()
            .filter(|r| r.asset_id == asset_id && r.status == RecommendationStatus::Pending)
            .cloned()
            .collect();
        matching.sort_by_key(|r| (r.priority, std::cmp::Reverse(r.created_at_ms)));
        Ok(matching)
    }

    async fn count_with_status(
        &self,
        tenant_id: Uuid,
        status: RecommendationStatus,
    ) -> Result<usize, StoreError> {
        let recs = self.recommendations.read().map_err(|_| poisoned())?;
        Ok(recs
            .values()
            .filter(|r| r.tenant_id == tenant_id && r.status == status)
            .count())
    }

    async fn acceptance_rate(&self, tenant_id: Uuid) -> Result<f64, StoreError> {
        let recs = self.recommendations.read().map_err(|_| poisoned())?;
        let mut accepted = 0usize;
        let mut decided = 0usize;
        for r in recs.values().filter(|r| r.tenant_id == tenant_id) {
            match r.status {
                RecommendationStatus::Approved | RecommendationStatus::Executed => {
                    accepted += 1;
                    decided += 1;
                }
                RecommendationStatus::Rejected => decided += 1,
                _ => {}
            }
        }
        if decided == 0 {
            return Ok(0.0);
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = accepted as f64 / decided as f64;
        Ok(rate)
    }

    async fn expire_overdue(&self, now_ms: i64) -> Result<usize, StoreError> {
        // Single write lock covers the whole sweep, so a recommendation
        // approved concurrently is either approved before the sweep sees it
        // or expired before the approval sees it, never both.
        let mut recs = self.recommendations.write().map_err(|_| poisoned())?;
        let mut expired = 0usize;
        for rec in recs.values_mut() {
            if rec.status == RecommendationStatus::Pending
                && rec.expiry_at_ms.is_some_and(|t| t < now_ms)
            {
                rec.status = RecommendationStatus::Expired;
                expired += 1;
            }
        }
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetType;

    fn make_result(tenant: Uuid, asset: Uuid, kind: OptimizationKind, ts: i64) -> OptimizationResult {
        OptimizationResult {
            id: Uuid::new_v4(),
            tenant_id: tenant,
            asset_id: asset,
            asset_type: AssetType::Well,
            kind,
            run_status: RunStatus::Completed,
            algorithm: kind.algorithm().to_owned(),
            algorithm_version: "1.0".into(),
            optimal_value: Some(49.0),
            optimal_unit: Some("Hz".into()),
            output: None,
            converged: true,
            computation_time_ms: 3,
            data_quality_score: Some(1.0),
            error_message: None,
            triggered_by: "test".into(),
            timestamp_ms: ts,
        }
    }

    fn make_rec(tenant: Uuid, asset: Uuid, priority: u8, expiry: Option<i64>) -> Recommendation {
        Recommendation {
            id: Uuid::new_v4(),
            tenant_id: tenant,
            asset_id: asset,
            asset_type: AssetType::Well,
            asset_name: "W-1".into(),
            kind: OptimizationKind::EspFrequency,
            priority,
            title: "t".into(),
            description: "d".into(),
            current_value: 48.0,
            recommended_value: 49.0,
            unit: "Hz".into(),
            expected_production_increase_bpd: 10.0,
            expected_production_increase_pct: 2.0,
            efficiency_improvement_pct: 0.5,
            confidence: 0.85,
            status: RecommendationStatus::Pending,
            optimization_result_id: None,
            created_by: "system".into(),
            approved_by: None,
            executed_by: None,
            rejection_reason: None,
            notes: None,
            created_at_ms: 1_000,
            approved_at_ms: None,
            executed_at_ms: None,
            expiry_at_ms: expiry,
        }
    }

    #[tokio::test]
    async fn latest_result_queries_pick_newest() {
        let store = InMemoryResultStore::new();
        let tenant = Uuid::new_v4();
        let asset = Uuid::new_v4();
        store
            .create(make_result(tenant, asset, OptimizationKind::EspFrequency, 100))
            .await
            .unwrap();
        store
            .create(make_result(tenant, asset, OptimizationKind::EspFrequency, 300))
            .await
            .unwrap();
        store
            .create(make_result(tenant, asset, OptimizationKind::RodPump, 200))
            .await
            .unwrap();

        let latest = store.latest_for_asset(asset).await.unwrap().unwrap();
        assert_eq!(latest.timestamp_ms, 300);

        let latest_rod = store
            .latest_for_asset_of_kind(asset, OptimizationKind::RodPump)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest_rod.timestamp_ms, 200);
    }

    #[tokio::test]
    async fn tenant_listing_pages_and_filters() {
        let store = InMemoryResultStore::new();
        let tenant = Uuid::new_v4();
        for ts in 0..5 {
            store
                .create(make_result(
                    tenant,
                    Uuid::new_v4(),
                    OptimizationKind::PcpSpeed,
                    ts,
                ))
                .await
                .unwrap();
        }
        store
            .create(make_result(
                tenant,
                Uuid::new_v4(),
                OptimizationKind::RodPump,
                99,
            ))
            .await
            .unwrap();

        let page = store
            .list_for_tenant(
                tenant,
                Some(OptimizationKind::PcpSpeed),
                PageRequest { offset: 0, limit: 2 },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].timestamp_ms, 4);
    }

    #[tokio::test]
    async fn pending_for_asset_sorted_by_priority() {
        let store = InMemoryRecommendationStore::new();
        let tenant = Uuid::new_v4();
        let asset = Uuid::new_v4();
        store.create(make_rec(tenant, asset, 3, None)).await.unwrap();
        store.create(make_rec(tenant, asset, 1, None)).await.unwrap();
        store.create(make_rec(tenant, asset, 2, None)).await.unwrap();

        let pending = store.pending_for_asset(asset).await.unwrap();
        let priorities: Vec<u8> = pending.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn expire_overdue_touches_only_overdue_pending() {
        let store = InMemoryRecommendationStore::new();
        let tenant = Uuid::new_v4();
        let asset = Uuid::new_v4();
        let overdue = make_rec(tenant, asset, 1, Some(500));
        let fresh = make_rec(tenant, asset, 1, Some(5_000));
        let mut approved = make_rec(tenant, asset, 1, Some(500));
        approved.status = RecommendationStatus::Approved;
        let overdue_id = overdue.id;
        let fresh_id = fresh.id;
        let approved_id = approved.id;
        store.create(overdue).await.unwrap();
        store.create(fresh).await.unwrap();
        store.create(approved).await.unwrap();

        let expired = store.expire_overdue(1_000).await.unwrap();
        assert_eq!(expired, 1);
        assert_eq!(
            store.get(overdue_id).await.unwrap().unwrap().status,
            RecommendationStatus::Expired
        );
        assert_eq!(
            store.get(fresh_id).await.unwrap().unwrap().status,
            RecommendationStatus::Pending
        );
        assert_eq!(
            store.get(approved_id).await.unwrap().unwrap().status,
            RecommendationStatus::Approved
        );
    }

    #[tokio::test]
    async fn acceptance_rate_counts_decided_only() {
        let store = InMemoryRecommendationStore::new();
        let tenant = Uuid::new_v4();
        let asset = Uuid::new_v4();
        let mut approved = make_rec(tenant, asset, 1, None);
        approved.status = RecommendationStatus::Approved;
        let mut rejected = make_rec(tenant, asset, 1, None);
        rejected.status = RecommendationStatus::Rejected;
        let pending = make_rec(tenant, asset, 1, None);
        store.create(approved).await.unwrap();
        store.create(rejected).await.unwrap();
        store.create(pending).await.unwrap();

        let rate = store.acceptance_rate(tenant).await.unwrap();
        assert!((rate - 0.5).abs() < 1e-9);

        let empty_tenant = store.acceptance_rate(Uuid::new_v4()).await.unwrap();
        assert_eq!(empty_tenant, 0.0);
    }
}
