//! Recommendation lifecycle.
//!
//! Every action validates the transition against the state machine in
//! [`RecommendationStatus`] before touching the store, so a terminal
//! recommendation can never be revived. The expiry sweep delegates to the
//! store's bulk conditional update, which is atomic with respect to
//! concurrent approvals.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{defaults, OptimizerConfig};
use crate::error::OptimizeError;
use crate::stores::RecommendationStore;
use crate::types::{Recommendation, RecommendationStatus};

pub struct LifecycleManager {
    store: Arc<dyn RecommendationStore>,
    config: OptimizerConfig,
}

impl LifecycleManager {
    pub fn new(store: Arc<dyn RecommendationStore>, config: OptimizerConfig) -> Self {
        Self { store, config }
    }

    async fn load(&self, id: Uuid) -> Result<Recommendation, OptimizeError> {
        self.store
            .get(id)
            .await?
            .ok_or(OptimizeError::NotFound {
                entity: "recommendation",
                id,
            })
    }

    fn check(
        rec: &Recommendation,
        next: RecommendationStatus,
    ) -> Result<(), OptimizeError> {
        if rec.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(OptimizeError::InvalidState {
                current: rec.status,
                attempted: next,
            })
        }
    }

    /// Approve a pending recommendation.
    pub async fn approve(&self, id: Uuid, user: &str) -> Result<Recommendation, OptimizeError> {
        let mut rec = self.load(id).await?;
        Self::check(&rec, RecommendationStatus::Approved)?;
        rec.status = RecommendationStatus::Approved;
        rec.approved_by = Some(user.to_owned());
        rec.approved_at_ms = Some(Utc::now().timestamp_millis());
        self.store.update(rec.clone()).await?;
        info!(recommendation_id = %id, user, "recommendation approved");
        Ok(rec)
    }

    /// Reject a pending recommendation with a reason.
    pub async fn reject(
        &self,
        id: Uuid,
        user: &str,
        reason: &str,
    ) -> Result<Recommendation, OptimizeError> {
        let mut rec = self.load(id).await?;
        Self::check(&rec, RecommendationStatus::Rejected)?;
        rec.status = RecommendationStatus::Rejected;
        rec.approved_by = Some(user.to_owned());
        rec.rejection_reason = Some(reason.to_owned());
        self.store.update(rec.clone()).await?;
        info!(recommendation_id = %id, user, reason, "recommendation rejected");
        Ok(rec)
    }

    /// Mark an approved recommendation as executed in the field.
    pub async fn execute(&self, id: Uuid, user: &str) -> Result<Recommendation, OptimizeError> {
        let mut rec = self.load(id).await?;
        Self::check(&rec, RecommendationStatus::Executed)?;
        rec.status = RecommendationStatus::Executed;
        rec.executed_by = Some(user.to_owned());
        rec.executed_at_ms = Some(Utc::now().timestamp_millis());
        self.store.update(rec.clone()).await?;
        info!(recommendation_id = %id, user, "recommendation executed");
        Ok(rec)
    }

    /// Record that an approved recommendation could not be applied.
    ///
    /// Failed recommendations stay visible for review and can only be
    /// cancelled afterwards.
    pub async fn fail(&self, id: Uuid, note: &str) -> Result<Recommendation, OptimizeError> {
        let mut rec = self.load(id).await?;
        Self::check(&rec, RecommendationStatus::Failed)?;
        rec.status = RecommendationStatus::Failed;
        rec.notes = Some(note.to_owned());
        self.store.update(rec.clone()).await?;
        warn!(recommendation_id = %id, note, "recommendation execution failed");
        Ok(rec)
    }

    /// Cancel any non-terminal recommendation.
    pub async fn cancel(
        &self,
        id: Uuid,
        note: Option<&str>,
    ) -> Result<Recommendation, OptimizeError> {
        let mut rec = self.load(id).await?;
        Self::check(&rec, RecommendationStatus::Cancelled)?;
        rec.status = RecommendationStatus::Cancelled;
        if let Some(note) = note {
            rec.notes = Some(note.to_owned());
        }
        self.store.update(rec.clone()).await?;
        info!(recommendation_id = %id, "recommendation cancelled");
        Ok(rec)
    }

    /// Expire every pending recommendation whose expiry time has passed.
    pub async fn expire_overdue(&self) -> Result<usize, OptimizeError> {
        let expired = self
            .store
            .expire_overdue(Utc::now().timestamp_millis())
            .await?;
        if expired > 0 {
            info!(expired, "expired overdue recommendations");
        }
        Ok(expired)
    }

    /// Start the periodic expiry sweep. Does nothing when auto expiry is
    /// disabled in configuration.
    pub fn spawn_expiry_sweep(self: &Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.recommendation.auto_expiry {
            return None;
        }
        let manager = Arc::clone(self);
        Some(tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(defaults::EXPIRY_SWEEP_INTERVAL_SECS));
            loop {
                interval.tick().await;
                if let Err(e) = manager.expire_overdue().await {
                    warn!(error = %e, "expiry sweep failed");
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::InMemoryRecommendationStore;
    use crate::types::{AssetType, OptimizationKind};

    fn make_rec(expiry_at_ms: Option<i64>) -> Recommendation {
        Recommendation {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            asset_id: Uuid::new_v4(),
            asset_type: AssetType::Well,
            asset_name: "W-1".into(),
            kind: OptimizationKind::EspFrequency,
            priority: 2,
            title: "Increase ESP frequency from 48.0 to 49.5 Hz".into(),
            description: "test".into(),
            current_value: 48.0,
            recommended_value: 49.5,
            unit: "Hz".into(),
            expected_production_increase_bpd: 16.0,
            expected_production_increase_pct: 3.1,
            efficiency_improvement_pct: 0.4,
            confidence: 0.85,
            status: RecommendationStatus::Pending,
            optimization_result_id: None,
            created_by: "liftopt".into(),
            approved_by: None,
            executed_by: None,
            rejection_reason: None,
            notes: None,
            created_at_ms: 0,
            approved_at_ms: None,
            executed_at_ms: None,
            expiry_at_ms,
        }
    }

    async fn setup() -> (Arc<InMemoryRecommendationStore>, LifecycleManager) {
        let store = Arc::new(InMemoryRecommendationStore::new());
        let manager = LifecycleManager::new(store.clone(), OptimizerConfig::default());
        (store, manager)
    }

    #[tokio::test]
    async fn approve_then_execute_full_path() {
        let (store, manager) = setup().await;
        let rec = make_rec(None);
        let id = rec.id;
        store.create(rec).await.unwrap();

        let approved = manager.approve(id, "j.ops").await.unwrap();
        assert_eq!(approved.status, RecommendationStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("j.ops"));
        assert!(approved.approved_at_ms.is_some());

        let executed = manager.execute(id, "k.field").await.unwrap();
        assert_eq!(executed.status, RecommendationStatus::Executed);
        assert_eq!(executed.executed_by.as_deref(), Some("k.field"));
    }

    #[tokio::test]
    async fn reject_records_the_reason() {
        let (store, manager) = setup().await;
        let rec = make_rec(None);
        let id = rec.id;
        store.create(rec).await.unwrap();

        let rejected = manager.reject(id, "j.ops", "well on test").await.unwrap();
        assert_eq!(rejected.status, RecommendationStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("well on test"));

        // Rejected is terminal
        let err = manager.approve(id, "j.ops").await.unwrap_err();
        assert!(matches!(err, OptimizeError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn execute_requires_prior_approval() {
        let (store, manager) = setup().await;
        let rec = make_rec(None);
        let id = rec.id;
        store.create(rec).await.unwrap();

        let err = manager.execute(id, "k.field").await.unwrap_err();
        assert!(matches!(
            err,
            OptimizeError::InvalidState {
                current: RecommendationStatus::Pending,
                attempted: RecommendationStatus::Executed,
            }
        ));
    }

    #[tokio::test]
    async fn failed_execution_can_only_be_cancelled() {
        let (store, manager) = setup().await;
        let rec = make_rec(None);
        let id = rec.id;
        store.create(rec).await.unwrap();

        manager.approve(id, "j.ops").await.unwrap();
        let failed = manager.fail(id, "VSD comms timeout").await.unwrap();
        assert_eq!(failed.status, RecommendationStatus::Failed);

        let err = manager.execute(id, "k.field").await.unwrap_err();
        assert!(matches!(err, OptimizeError::InvalidState { .. }));

        let cancelled = manager.cancel(id, Some("superseded")).await.unwrap();
        assert_eq!(cancelled.status, RecommendationStatus::Cancelled);
    }

    #[tokio::test]
    async fn expired_recommendation_cannot_be_approved() {
        let (store, manager) = setup().await;
        let rec = make_rec(Some(1)); // already overdue
        let id = rec.id;
        store.create(rec).await.unwrap();

        let expired = manager.expire_overdue().await.unwrap();
        assert_eq!(expired, 1);

        let err = manager.approve(id, "j.ops").await.unwrap_err();
        assert!(matches!(
            err,
            OptimizeError::InvalidState {
                current: RecommendationStatus::Expired,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (_store, manager) = setup().await;
        let err = manager.approve(Uuid::new_v4(), "j.ops").await.unwrap_err();
        assert!(matches!(err, OptimizeError::NotFound { .. }));
    }
}
