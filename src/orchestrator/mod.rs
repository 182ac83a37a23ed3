//! Run orchestration.
//!
//! [`OptimizationService`] owns a run from snapshot to recommendation:
//! resolve the asset, read its attributes, open a `Running` record, execute
//! the optimizer, finalize the record, and file a recommendation when the
//! outcome is significant. A failed computation finalizes the record as
//! `Failed` with the error message and never leaves a dangling `Running`
//! row.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{defaults::attr_fallback, OptimizerConfig};
use crate::error::{ComputeError, OptimizeError};
use crate::optimizers::{allocate_field_gas, optimizer_for};
use crate::recommend::factory;
use crate::stores::{
    AssetInfo, AttributeMap, AttributeStore, EquipmentDirectory, LiftKind, Page, PageRequest,
    RecommendationStore, ResultStore,
};
use crate::types::{
    AssetType, EquipmentSnapshot, EspSnapshot, FieldAllocationResult, GasLiftWellSnapshot,
    OptimizationKind, OptimizationResult, PcpSnapshot, Recommendation, RodPumpSnapshot, RunStatus,
};

const ALGORITHM_VERSION: &str = "1.0.0";
const ASSET_CACHE_TTL: Duration = Duration::from_secs(300);

/// Outcome of a batch run over every well of one lift kind.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub recommendations_created: usize,
    /// Finalized run records of the wells that completed
    pub results: Vec<OptimizationResult>,
}

/// Reads attributes with documented fallbacks while tracking how many came
/// from live data, for the run's data quality score.
struct AttrReader<'a> {
    map: &'a AttributeMap,
    live: usize,
    total: usize,
}

impl<'a> AttrReader<'a> {
    fn new(map: &'a AttributeMap) -> Self {
        Self {
            map,
            live: 0,
            total: 0,
        }
    }

    fn num(&mut self, key: &str, fallback: f64) -> f64 {
        self.total += 1;
        match self.map.get_f64(key) {
            Some(v) => {
                self.live += 1;
                v
            }
            None => fallback,
        }
    }

    fn opt(&mut self, key: &str) -> Option<f64> {
        self.map.get_f64(key)
    }

    fn quality(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let q = self.live as f64 / self.total as f64;
        q
    }
}

pub struct OptimizationService {
    directory: Arc<dyn EquipmentDirectory>,
    attributes: Arc<dyn AttributeStore>,
    results: Arc<dyn ResultStore>,
    recommendations: Arc<dyn RecommendationStore>,
    config: OptimizerConfig,
    asset_cache: crate::util::TtlCache<Uuid, AssetInfo>,
}

impl OptimizationService {
    pub fn new(
        directory: Arc<dyn EquipmentDirectory>,
        attributes: Arc<dyn AttributeStore>,
        results: Arc<dyn ResultStore>,
        recommendations: Arc<dyn RecommendationStore>,
        config: OptimizerConfig,
    ) -> Self {
        Self {
            directory,
            attributes,
            results,
            recommendations,
            config,
            asset_cache: crate::util::TtlCache::new(ASSET_CACHE_TTL),
        }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Asset lookup through the TTL cache; directory data changes rarely
    /// relative to run frequency.
    async fn resolve_asset(&self, id: Uuid) -> Result<AssetInfo, OptimizeError> {
        if let Some(asset) = self.asset_cache.get(&id) {
            return Ok(asset);
        }
        let asset = self
            .directory
            .get_asset(id)
            .await?
            .ok_or(OptimizeError::NotFound { entity: "asset", id })?;
        self.asset_cache.insert(id, asset.clone());
        Ok(asset)
    }

    // ========================================================================
    // Snapshot assembly
    // ========================================================================

    fn build_snapshot(
        asset: &AssetInfo,
        kind: LiftKind,
        attrs: &AttributeMap,
    ) -> (EquipmentSnapshot, f64) {
        let mut reader = AttrReader::new(attrs);
        let snapshot = match kind {
            LiftKind::Esp => EquipmentSnapshot::Esp(EspSnapshot {
                frequency_hz: reader.num("frequency", attr_fallback::ESP_FREQUENCY_HZ),
                motor_load_pct: reader.num("motor_load", attr_fallback::ESP_MOTOR_LOAD_PCT),
                motor_temp_f: reader.num("motor_temperature", attr_fallback::ESP_MOTOR_TEMP_F),
                intake_pressure_psi: reader.num("pip", attr_fallback::ESP_INTAKE_PRESSURE_PSI),
                discharge_pressure_psi: reader
                    .num("discharge_pressure", attr_fallback::ESP_DISCHARGE_PRESSURE_PSI),
                production_bpd: reader
                    .num("current_production_bpd", attr_fallback::ESP_PRODUCTION_BPD),
                power_kw: reader.num("power_kw", attr_fallback::ESP_POWER_KW),
            }),
            LiftKind::Pcp => EquipmentSnapshot::Pcp(PcpSnapshot {
                rpm: reader.num("rpm", attr_fallback::PCP_RPM),
                torque_pct: reader.num("torque", attr_fallback::PCP_TORQUE_PCT),
                drive_load_pct: reader.num("drive_load", attr_fallback::PCP_DRIVE_LOAD_PCT),
                rod_load_lbs: reader.num("rod_load", attr_fallback::PCP_ROD_LOAD_LBS),
                intake_pressure_psi: reader.num("pip", attr_fallback::PCP_INTAKE_PRESSURE_PSI),
                production_bpd: reader
                    .num("current_production_bpd", attr_fallback::PCP_PRODUCTION_BPD),
                power_kw: reader.num("power_kw", attr_fallback::PCP_POWER_KW),
                fluid_viscosity_cp: reader.num("fluid_viscosity", attr_fallback::PCP_VISCOSITY_CP),
                pump_efficiency_pct: reader
                    .num("pump_efficiency", attr_fallback::PCP_PUMP_EFFICIENCY_PCT),
            }),
            LiftKind::RodPump => EquipmentSnapshot::RodPump(RodPumpSnapshot {
                spm: reader.num("spm", attr_fallback::ROD_PUMP_SPM),
                stroke_length_in: reader
                    .num("stroke_length", attr_fallback::ROD_PUMP_STROKE_LENGTH_IN),
                fillage_pct: reader.num("fillage", attr_fallback::ROD_PUMP_FILLAGE_PCT),
                peak_load_lbs: reader.num("peak_load", attr_fallback::ROD_PUMP_PEAK_LOAD_LBS),
                min_load_lbs: reader.num("min_load", attr_fallback::ROD_PUMP_MIN_LOAD_LBS),
                counterbalance_pct: reader
                    .num("counterbalance", attr_fallback::ROD_PUMP_COUNTERBALANCE_PCT),
                production_bpd: reader
                    .num("current_production_bpd", attr_fallback::ROD_PUMP_PRODUCTION_BPD),
                power_kw: reader.num("power_kw", attr_fallback::ROD_PUMP_POWER_KW),
                pump_efficiency_pct: reader
                    .num("pump_efficiency", attr_fallback::ROD_PUMP_PUMP_EFFICIENCY_PCT),
                rod_stress_psi: reader.num("rod_stress", attr_fallback::ROD_PUMP_ROD_STRESS_PSI),
                pump_diameter_in: reader
                    .num("pump_diameter", attr_fallback::ROD_PUMP_PUMP_DIAMETER_IN),
            }),
            LiftKind::GasLift => {
                EquipmentSnapshot::GasLift(Self::gas_lift_snapshot(asset, &mut reader))
            }
        };
        (snapshot, reader.quality())
    }

    fn gas_lift_snapshot(asset: &AssetInfo, reader: &mut AttrReader<'_>) -> GasLiftWellSnapshot {
        GasLiftWellSnapshot {
            well_id: asset.id,
            well_name: asset.name.clone(),
            gas_injection_mscfd: reader.num(
                "gas_injection_rate",
                attr_fallback::GAS_LIFT_INJECTION_RATE_MSCFD,
            ),
            production_bpd: reader
                .num("current_production_bpd", attr_fallback::GAS_LIFT_PRODUCTION_BPD),
            gas_oil_ratio: reader.num("gor", attr_fallback::GAS_LIFT_GOR_SCF_BBL),
            min_gas_mscfd: reader.opt("min_gas_rate"),
            max_gas_mscfd: reader.opt("max_gas_rate"),
        }
    }

    // ========================================================================
    // Run records
    // ========================================================================

    fn open_record(
        asset: &AssetInfo,
        asset_type: AssetType,
        kind: OptimizationKind,
        triggered_by: &str,
    ) -> OptimizationResult {
        OptimizationResult {
            id: Uuid::new_v4(),
            tenant_id: asset.tenant_id,
            asset_id: asset.id,
            asset_type,
            kind,
            run_status: RunStatus::Running,
            algorithm: kind.algorithm().to_owned(),
            algorithm_version: ALGORITHM_VERSION.to_owned(),
            optimal_value: None,
            optimal_unit: None,
            output: None,
            converged: false,
            computation_time_ms: 0,
            data_quality_score: None,
            error_message: None,
            triggered_by: triggered_by.to_owned(),
            timestamp_ms: Utc::now().timestamp_millis(),
        }
    }

    async fn finalize_failure(
        &self,
        mut record: OptimizationResult,
        elapsed_ms: u64,
        error: &ComputeError,
    ) -> Result<OptimizeError, OptimizeError> {
        record.run_status = RunStatus::Failed;
        record.computation_time_ms = elapsed_ms;
        record.error_message = Some(error.to_string());
        let failure = OptimizeError::ComputationFailure {
            kind: record.kind,
            asset_id: record.asset_id,
            message: error.to_string(),
        };
        self.results.update(record).await?;
        Ok(failure)
    }

    // ========================================================================
    // Single-well runs
    // ========================================================================

    /// Run the optimizer matching a well's lift method.
    ///
    /// When an equipment asset (drive, VSD, pump controller) is supplied,
    /// its attributes take precedence over the well's. Returns the finalized
    /// run record. A significant outcome also files a pending recommendation
    /// against the well.
    pub async fn optimize_well(
        &self,
        asset_id: Uuid,
        equipment_id: Option<Uuid>,
        triggered_by: &str,
    ) -> Result<OptimizationResult, OptimizeError> {
        let asset = self.resolve_asset(asset_id).await?;
        let lift = asset
            .lift_kind
            .ok_or(OptimizeError::NoLift { id: asset_id })?;
        let kind = lift.optimization_kind();

        let mut attrs = self.attributes.attributes(asset_id).await?;
        if let Some(equipment_id) = equipment_id {
            attrs.overlay(self.attributes.attributes(equipment_id).await?);
        }
        let (snapshot, quality) = Self::build_snapshot(&asset, lift, &attrs);

        let mut record = Self::open_record(&asset, AssetType::Well, kind, triggered_by);
        record.data_quality_score = Some(quality);
        self.results.create(record.clone()).await?;

        let started = Instant::now();
        let outcome = optimizer_for(kind).optimize(&snapshot, &self.config);
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let outcome = match outcome {
            Ok(o) => o,
            Err(e) => {
                warn!(asset_id = %asset_id, %kind, error = %e, "optimization failed");
                return Err(self.finalize_failure(record, elapsed_ms, &e).await?);
            }
        };

        record.run_status = RunStatus::Completed;
        record.converged = true;
        record.computation_time_ms = elapsed_ms;
        record.optimal_value = Some(outcome.optimal_value());
        record.optimal_unit = Some(outcome.unit().to_owned());
        record.output = Some(outcome.output_payload());
        self.results.update(record.clone()).await?;

        info!(
            asset_id = %asset_id,
            %kind,
            optimal_value = outcome.optimal_value(),
            significant = outcome.is_significant(),
            "optimization completed"
        );

        if let Some(rec) = factory::from_outcome(
            &asset,
            &outcome,
            Some(record.id),
            &self.config,
            Utc::now().timestamp_millis(),
        ) {
            info!(asset_id = %asset_id, recommendation_id = %rec.id, priority = rec.priority, "recommendation created");
            self.recommendations.create(rec).await?;
        }

        Ok(record)
    }

    /// Run every well of one lift kind in a tenant, sequentially.
    ///
    /// Returns the finalized run records of the completed wells alongside
    /// the counts. One well's failure is logged and counted, never aborts
    /// the batch.
    pub async fn optimize_all_of_kind(
        &self,
        tenant_id: Uuid,
        lift: LiftKind,
        triggered_by: &str,
    ) -> Result<BatchSummary, OptimizeError> {
        let wells = self.directory.wells_of_kind(tenant_id, lift).await?;
        let mut summary = BatchSummary {
            attempted: wells.len(),
            ..BatchSummary::default()
        };
        for well in wells {
            match self.optimize_well(well.id, None, triggered_by).await {
                Ok(record) => {
                    summary.succeeded += 1;
                    let pending = self.recommendations.pending_for_asset(well.id).await?;
                    if pending
                        .iter()
                        .any(|r| r.optimization_result_id == Some(record.id))
                    {
                        summary.recommendations_created += 1;
                    }
                    summary.results.push(record);
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(well_id = %well.id, error = %e, "skipping failed well in batch");
                }
            }
        }
        info!(
            tenant_id = %tenant_id,
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "batch optimization finished"
        );
        Ok(summary)
    }

    // ========================================================================
    // Field gas lift allocation
    // ========================================================================

    /// Allocate a field's gas budget across its gas-lifted wells and file
    /// per-well recommendations for the meaningful changes.
    pub async fn optimize_field_gas_allocation(
        &self,
        field_id: Uuid,
        available_gas_mscfd: f64,
        triggered_by: &str,
    ) -> Result<FieldAllocationResult, OptimizeError> {
        let field = self.resolve_asset(field_id).await?;
        let members = self.directory.wells_in_field(field_id).await?;

        let mut snapshots = Vec::new();
        for member in members
            .iter()
            .filter(|m| m.lift_kind == Some(LiftKind::GasLift))
        {
            let attrs = self.attributes.attributes(member.id).await?;
            let mut reader = AttrReader::new(&attrs);
            snapshots.push(Self::gas_lift_snapshot(member, &mut reader));
        }

        let mut record = Self::open_record(
            &field,
            AssetType::Field,
            OptimizationKind::GasLiftAllocation,
            triggered_by,
        );
        self.results.create(record.clone()).await?;

        let started = Instant::now();
        let allocation = allocate_field_gas(
            field_id,
            &field.name,
            &snapshots,
            available_gas_mscfd,
            &self.config,
            Utc::now().timestamp_millis(),
        );
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let allocation = match allocation {
            Ok(a) => a,
            Err(e) => {
                warn!(field_id = %field_id, error = %e, "field allocation failed");
                return Err(self.finalize_failure(record, elapsed_ms, &e).await?);
            }
        };

        record.run_status = RunStatus::Completed;
        record.converged = true;
        record.computation_time_ms = elapsed_ms;
        record.optimal_value = Some(allocation.optimized_total_gas_mscfd);
        record.optimal_unit = Some("MSCF/day".to_owned());
        record.output = serde_json::to_value(&allocation).ok();
        self.results.update(record.clone()).await?;

        let recs = factory::from_allocation(
            field.tenant_id,
            &allocation,
            Some(record.id),
            &self.config,
            Utc::now().timestamp_millis(),
        );
        info!(
            field_id = %field_id,
            wells = allocation.allocations.len(),
            recommendations = recs.len(),
            production_increase_bpd = allocation.production_increase_bpd,
            "field allocation completed"
        );
        for rec in recs {
            self.recommendations.create(rec).await?;
        }

        Ok(allocation)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn result(&self, id: Uuid) -> Result<Option<OptimizationResult>, OptimizeError> {
        Ok(self.results.get(id).await?)
    }

    pub async fn latest_result(
        &self,
        asset_id: Uuid,
    ) -> Result<Option<OptimizationResult>, OptimizeError> {
        Ok(self.results.latest_for_asset(asset_id).await?)
    }

    pub async fn latest_result_of_kind(
        &self,
        asset_id: Uuid,
        kind: OptimizationKind,
    ) -> Result<Option<OptimizationResult>, OptimizeError> {
        Ok(self.results.latest_for_asset_of_kind(asset_id, kind).await?)
    }

    pub async fn results_for_tenant(
        &self,
        tenant_id: Uuid,
        kind: Option<OptimizationKind>,
        page: PageRequest,
    ) -> Result<Page<OptimizationResult>, OptimizeError> {
        Ok(self.results.list_for_tenant(tenant_id, kind, page).await?)
    }

    pub async fn pending_recommendations(
        &self,
        asset_id: Uuid,
    ) -> Result<Vec<Recommendation>, OptimizeError> {
        Ok(self.recommendations.pending_for_asset(asset_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::stores::{
        InMemoryAttributeStore, InMemoryDirectory, InMemoryRecommendationStore, InMemoryResultStore,
    };
    use async_trait::async_trait;

    struct Fixture {
        directory: Arc<InMemoryDirectory>,
        attributes: Arc<InMemoryAttributeStore>,
        recommendations: Arc<InMemoryRecommendationStore>,
        service: OptimizationService,
        tenant: Uuid,
    }

    fn make_fixture() -> Fixture {
        let directory = Arc::new(InMemoryDirectory::new());
        let attributes = Arc::new(InMemoryAttributeStore::new());
        let results = Arc::new(InMemoryResultStore::new());
        let recommendations = Arc::new(InMemoryRecommendationStore::new());
        let service = OptimizationService::new(
            directory.clone(),
            attributes.clone(),
            results,
            recommendations.clone(),
            OptimizerConfig::default(),
        );
        Fixture {
            directory,
            attributes,
            recommendations,
            service,
            tenant: Uuid::new_v4(),
        }
    }

    fn well(tenant: Uuid, name: &str, lift: LiftKind, field: Option<Uuid>) -> AssetInfo {
        AssetInfo {
            id: Uuid::new_v4(),
            tenant_id: tenant,
            name: name.into(),
            asset_type: AssetType::Well,
            lift_kind: Some(lift),
            field_id: field,
        }
    }

    async fn seed_esp_well(fx: &Fixture, motor_load: f64) -> Uuid {
        let w = well(fx.tenant, "ESP-1", LiftKind::Esp, None);
        let id = w.id;
        fx.directory.insert(w).unwrap();
        let mut attrs = AttributeMap::new();
        attrs.set("frequency", 48.0);
        attrs.set("motor_load", motor_load);
        attrs.set("motor_temperature", 230.0);
        attrs.set("pip", 220.0);
        attrs.set("discharge_pressure", 1_480.0);
        attrs.set("current_production_bpd", 520.0);
        attrs.set("power_kw", 110.0);
        fx.attributes.write_attributes(id, attrs).await.unwrap();
        id
    }

    #[tokio::test]
    async fn esp_run_completes_and_files_recommendation() {
        let fx = make_fixture();
        let id = seed_esp_well(&fx, 60.0).await;

        let record = fx.service.optimize_well(id, None, "scheduler").await.unwrap();
        assert_eq!(record.run_status, RunStatus::Completed);
        assert!(record.converged);
        assert_eq!(record.optimal_unit.as_deref(), Some("Hz"));
        assert_eq!(record.data_quality_score, Some(1.0));
        let output = record.output.unwrap();
        assert!(output.get("recommendedFrequency").is_some());

        let pending = fx.service.pending_recommendations(id).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].optimization_result_id, Some(record.id));
        assert_eq!(pending[0].asset_name, "ESP-1");
    }

    #[tokio::test]
    async fn insignificant_run_files_no_recommendation() {
        let fx = make_fixture();
        let id = seed_esp_well(&fx, 70.0).await; // 0.5 Hz step, below threshold

        let record = fx.service.optimize_well(id, None, "scheduler").await.unwrap();
        assert_eq!(record.run_status, RunStatus::Completed);
        assert!(fx.service.pending_recommendations(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_attributes_use_fallbacks_and_lower_quality() {
        let fx = make_fixture();
        let w = well(fx.tenant, "ESP-2", LiftKind::Esp, None);
        let id = w.id;
        fx.directory.insert(w).unwrap();
        let mut attrs = AttributeMap::new();
        attrs.set("frequency", 45.0);
        fx.attributes.write_attributes(id, attrs).await.unwrap();

        let record = fx.service.optimize_well(id, None, "scheduler").await.unwrap();
        assert_eq!(record.run_status, RunStatus::Completed);
        let quality = record.data_quality_score.unwrap();
        assert!(quality > 0.0 && quality < 1.0);
    }

    #[tokio::test]
    async fn unknown_asset_is_not_found() {
        let fx = make_fixture();
        let err = fx
            .service
            .optimize_well(Uuid::new_v4(), None, "scheduler")
            .await
            .unwrap_err();
        assert!(matches!(err, OptimizeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn asset_without_lift_is_rejected() {
        let fx = make_fixture();
        let field = AssetInfo {
            id: Uuid::new_v4(),
            tenant_id: fx.tenant,
            name: "FIELD-A".into(),
            asset_type: AssetType::Field,
            lift_kind: None,
            field_id: None,
        };
        let id = field.id;
        fx.directory.insert(field).unwrap();
        let err = fx.service.optimize_well(id, None, "scheduler").await.unwrap_err();
        assert!(matches!(err, OptimizeError::NoLift { .. }));
    }

    struct FailingAttributeStore {
        poison_asset: Uuid,
        inner: InMemoryAttributeStore,
    }

    #[async_trait]
    impl AttributeStore for FailingAttributeStore {
        async fn attributes(&self, asset_id: Uuid) -> Result<AttributeMap, StoreError> {
            if asset_id == self.poison_asset {
                return Err(StoreError::Storage("attribute backend offline".into()));
            }
            self.inner.attributes(asset_id).await
        }

        async fn write_attributes(
            &self,
            asset_id: Uuid,
            attributes: AttributeMap,
        ) -> Result<(), StoreError> {
            self.inner.write_attributes(asset_id, attributes).await
        }
    }

    #[tokio::test]
    async fn batch_isolates_per_well_failures() {
        let directory = Arc::new(InMemoryDirectory::new());
        let results = Arc::new(InMemoryResultStore::new());
        let recommendations = Arc::new(InMemoryRecommendationStore::new());
        let tenant = Uuid::new_v4();

        let healthy = well(tenant, "RP-1", LiftKind::RodPump, None);
        let broken = well(tenant, "RP-2", LiftKind::RodPump, None);
        let healthy_id = healthy.id;
        let broken_id = broken.id;
        directory.insert(healthy).unwrap();
        directory.insert(broken).unwrap();

        let attributes = Arc::new(FailingAttributeStore {
            poison_asset: broken_id,
            inner: InMemoryAttributeStore::new(),
        });
        let mut attrs = AttributeMap::new();
        attrs.set("spm", 9.0);
        attrs.set("fillage", 70.0);
        attributes.write_attributes(healthy_id, attrs).await.unwrap();

        let service = OptimizationService::new(
            directory,
            attributes,
            results,
            recommendations,
            OptimizerConfig::default(),
        );

        let summary = service
            .optimize_all_of_kind(tenant, LiftKind::RodPump, "scheduler")
            .await
            .unwrap();
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        // The finalized records of the surviving wells ride along
        assert_eq!(summary.results.len(), 1);
        assert_eq!(summary.results[0].asset_id, healthy_id);
        assert_eq!(summary.results[0].run_status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn equipment_attributes_take_precedence_over_well() {
        let fx = make_fixture();
        let id = seed_esp_well(&fx, 60.0).await;
        let vsd_id = Uuid::new_v4();
        let mut attrs = AttributeMap::new();
        attrs.set("motor_load", 70.0);
        fx.attributes.write_attributes(vsd_id, attrs).await.unwrap();

        let record = fx
            .service
            .optimize_well(id, Some(vsd_id), "scheduler")
            .await
            .unwrap();
        // The VSD load reading replaces the well's 60%; keys the VSD does
        // not report, like frequency, still come from the well
        let optimal = record.optimal_value.unwrap();
        assert!((optimal - 48.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn field_allocation_runs_and_files_per_well_recommendations() {
        let fx = make_fixture();
        let field = AssetInfo {
            id: Uuid::new_v4(),
            tenant_id: fx.tenant,
            name: "FIELD-A".into(),
            asset_type: AssetType::Field,
            lift_kind: None,
            field_id: None,
        };
        let field_id = field.id;
        fx.directory.insert(field).unwrap();

        for (name, gas, production) in
            [("GL-1", 200.0, 700.0), ("GL-2", 900.0, 300.0), ("GL-3", 400.0, 450.0)]
        {
            let w = well(fx.tenant, name, LiftKind::GasLift, Some(field_id));
            let id = w.id;
            fx.directory.insert(w).unwrap();
            let mut attrs = AttributeMap::new();
            attrs.set("gas_injection_rate", gas);
            attrs.set("current_production_bpd", production);
            attrs.set("gor", 900.0);
            fx.attributes.write_attributes(id, attrs).await.unwrap();
        }
        // A non-gas-lift well in the field is ignored by the allocator
        fx.directory
            .insert(well(fx.tenant, "ESP-9", LiftKind::Esp, Some(field_id)))
            .unwrap();

        let allocation = fx
            .service
            .optimize_field_gas_allocation(field_id, 3_000.0, "scheduler")
            .await
            .unwrap();
        assert_eq!(allocation.allocations.len(), 3);
        assert_eq!(allocation.field_name, "FIELD-A");
        assert!(allocation.optimized_total_gas_mscfd <= 3_000.0 + 1e-9);

        let record = fx
            .service
            .latest_result_of_kind(field_id, OptimizationKind::GasLiftAllocation)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.run_status, RunStatus::Completed);
        assert_eq!(record.asset_type, AssetType::Field);

        // Per-well recommendations reference the field run record
        let page = fx
            .recommendations
            .list_for_tenant(fx.tenant, None, PageRequest::default())
            .await
            .unwrap();
        assert!(!page.items.is_empty());
        for rec in &page.items {
            assert_eq!(rec.kind, OptimizationKind::GasLiftAllocation);
            assert_eq!(rec.optimization_result_id, Some(record.id));
        }
    }

    #[tokio::test]
    async fn field_with_no_gas_lift_wells_fails_and_finalizes_record() {
        let fx = make_fixture();
        let field = AssetInfo {
            id: Uuid::new_v4(),
            tenant_id: fx.tenant,
            name: "FIELD-B".into(),
            asset_type: AssetType::Field,
            lift_kind: None,
            field_id: None,
        };
        let field_id = field.id;
        fx.directory.insert(field).unwrap();

        let err = fx
            .service
            .optimize_field_gas_allocation(field_id, 1_000.0, "scheduler")
            .await
            .unwrap_err();
        assert!(matches!(err, OptimizeError::ComputationFailure { .. }));

        let record = fx.service.latest_result(field_id).await.unwrap().unwrap();
        assert_eq!(record.run_status, RunStatus::Failed);
        assert!(record.error_message.is_some());
    }
}
