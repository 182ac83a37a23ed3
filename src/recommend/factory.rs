//! Recommendation factory.
//!
//! Turns optimizer outcomes into recommendations: only significant outcomes
//! produce one, priority follows the expected production gain, confidence is
//! clamped into [0.5, 1.0] at creation, and expiry is stamped when auto
//! expiry is on.

use uuid::Uuid;

use crate::config::OptimizerConfig;
use crate::stores::AssetInfo;
use crate::types::{
    AssetType, FieldAllocationResult, OptimizationKind, OptimizationOutcome, Recommendation,
    RecommendationStatus, WellAllocation,
};

const CREATED_BY: &str = "liftopt";

/// Priority from the relative production gain. Used by the single-well
/// equipment optimizers.
fn equipment_priority(increase_pct: f64) -> u8 {
    if increase_pct >= 10.0 {
        1
    } else if increase_pct >= 5.0 {
        2
    } else if increase_pct >= 2.0 {
        3
    } else {
        4
    }
}

/// Priority from the absolute production gain in BPD. Used for gas lift
/// allocation rows, where per-well percentages understate field impact.
fn gas_lift_priority(increase_bpd: f64) -> u8 {
    let abs = increase_bpd.abs();
    if abs >= 50.0 {
        1
    } else if abs >= 25.0 {
        2
    } else if abs >= 10.0 {
        3
    } else {
        4
    }
}

fn expiry_at(config: &OptimizerConfig, now_ms: i64) -> Option<i64> {
    config.recommendation.auto_expiry.then(|| {
        let hours = i64::try_from(config.recommendation.expiry_hours).unwrap_or(i64::MAX / 3_600_000);
        now_ms.saturating_add(hours * 3_600_000)
    })
}

fn direction(current: f64, recommended: f64) -> &'static str {
    if recommended > current {
        "Increase"
    } else {
        "Decrease"
    }
}

fn title_for(outcome: &OptimizationOutcome) -> String {
    let dir = direction(outcome.current_value(), outcome.optimal_value());
    match outcome {
        OptimizationOutcome::Esp(o) => format!(
            "{dir} ESP frequency from {:.1} to {:.1} Hz",
            o.current_frequency_hz, o.optimal_frequency_hz
        ),
        OptimizationOutcome::Pcp(o) => format!(
            "{dir} PCP speed from {:.0} to {:.0} RPM",
            o.current_rpm, o.optimal_rpm
        ),
        OptimizationOutcome::RodPump(o) => {
            if (o.optimal_spm - o.current_spm).abs() < f64::EPSILON {
                // Counterbalance-only recommendation
                o.counterbalance.as_ref().map_or_else(
                    || "Adjust rod pump operation".to_owned(),
                    |cb| {
                        format!(
                            "{} counterbalance from {:.0}% to {:.0}%",
                            cb.direction(),
                            cb.current_pct,
                            cb.recommended_pct
                        )
                    },
                )
            } else {
                format!(
                    "{dir} pumping speed from {:.1} to {:.1} SPM",
                    o.current_spm, o.optimal_spm
                )
            }
        }
        OptimizationOutcome::GasLift(_) => "Gas lift adjustment".to_owned(),
    }
}

fn description_for(outcome: &OptimizationOutcome) -> String {
    let increase = outcome.expected_production_increase_bpd();
    let mut text = match outcome {
        OptimizationOutcome::Esp(o) => format!(
            "Expected production change {:+.1} BPD at {:.1} Hz with motor load {:.0}% and temperature {:.0}°F.",
            increase, o.optimal_frequency_hz, o.expected_motor_load_pct, o.expected_motor_temp_f
        ),
        OptimizationOutcome::Pcp(o) => format!(
            "Expected production change {:+.1} BPD at {:.0} RPM with drive torque {:.0}%. Optimal efficiency point is {:.0} RPM for the current fluid.",
            increase, o.optimal_rpm, o.expected_torque_pct, o.oep_rpm
        ),
        OptimizationOutcome::RodPump(o) => {
            let mut text = format!(
                "{} Expected fillage {:.0}% and production change {:+.1} BPD at {:.1} SPM.",
                o.card_analysis, o.expected_fillage_pct, increase, o.optimal_spm
            );
            if let Some(cb) = &o.counterbalance {
                text.push_str(&format!(
                    " {} counterbalance to {:.0}% to reduce gearbox loading.",
                    cb.direction(),
                    cb.recommended_pct
                ));
            }
            text
        }
        OptimizationOutcome::GasLift(o) => format!(
            "Marginal oil rate {:.3} BPD per MSCF/day at the current injection point.",
            o.marginal_oil_rate
        ),
    };
    if let Some(constraint) = match outcome {
        OptimizationOutcome::Esp(o) => o.limiting_constraint,
        OptimizationOutcome::Pcp(o) => o.limiting_constraint,
        OptimizationOutcome::RodPump(o) => o.limiting_constraint,
        OptimizationOutcome::GasLift(_) => None,
    } {
        text.push_str(&format!(" Limited by {constraint}."));
    }
    text
}

/// Build a recommendation from a single-well optimizer outcome.
///
/// Returns `None` when the outcome is not significant.
pub fn from_outcome(
    asset: &AssetInfo,
    outcome: &OptimizationOutcome,
    result_id: Option<Uuid>,
    config: &OptimizerConfig,
    now_ms: i64,
) -> Option<Recommendation> {
    if !outcome.is_significant() {
        return None;
    }
    let increase_pct = outcome.expected_production_increase_pct();
    Some(Recommendation {
        id: Uuid::new_v4(),
        tenant_id: asset.tenant_id,
        asset_id: asset.id,
        asset_type: AssetType::Well,
        asset_name: asset.name.clone(),
        kind: outcome.kind(),
        priority: equipment_priority(increase_pct),
        title: title_for(outcome),
        description: description_for(outcome),
        current_value: outcome.current_value(),
        recommended_value: outcome.optimal_value(),
        unit: outcome.unit().to_owned(),
        expected_production_increase_bpd: outcome.expected_production_increase_bpd(),
        expected_production_increase_pct: increase_pct,
        efficiency_improvement_pct: outcome.efficiency_improvement(),
        confidence: crate::optimizers::clamp_confidence(outcome.confidence()),
        status: RecommendationStatus::Pending,
        optimization_result_id: result_id,
        created_by: CREATED_BY.to_owned(),
        approved_by: None,
        executed_by: None,
        rejection_reason: None,
        notes: None,
        created_at_ms: now_ms,
        approved_at_ms: None,
        executed_at_ms: None,
        expiry_at_ms: expiry_at(config, now_ms),
    })
}

fn allocation_recommendation(
    tenant_id: Uuid,
    alloc: &WellAllocation,
    field_confidence: f64,
    result_id: Option<Uuid>,
    config: &OptimizerConfig,
    now_ms: i64,
) -> Recommendation {
    let dir = direction(alloc.current_gas_mscfd, alloc.recommended_gas_mscfd);
    Recommendation {
        id: Uuid::new_v4(),
        tenant_id,
        asset_id: alloc.well_id,
        asset_type: AssetType::Well,
        asset_name: alloc.well_name.clone(),
        kind: OptimizationKind::GasLiftAllocation,
        priority: gas_lift_priority(alloc.production_increase_bpd),
        title: format!(
            "{dir} gas injection from {:.0} to {:.0} MSCF/day",
            alloc.current_gas_mscfd, alloc.recommended_gas_mscfd
        ),
        description: format!(
            "Field allocation ranks this well #{} by marginal response ({:.3} BPD per MSCF/day). Expected production change {:+.1} BPD.",
            alloc.priority_rank, alloc.marginal_oil_rate, alloc.production_increase_bpd
        ),
        current_value: alloc.current_gas_mscfd,
        recommended_value: alloc.recommended_gas_mscfd,
        unit: "MSCF/day".to_owned(),
        expected_production_increase_bpd: alloc.production_increase_bpd,
        expected_production_increase_pct: crate::types::outcome::percent_change(
            alloc.current_production_bpd,
            alloc.expected_production_bpd,
        ),
        efficiency_improvement_pct: 0.0,
        confidence: crate::optimizers::clamp_confidence(field_confidence),
        status: RecommendationStatus::Pending,
        optimization_result_id: result_id,
        created_by: CREATED_BY.to_owned(),
        approved_by: None,
        executed_by: None,
        rejection_reason: None,
        notes: None,
        created_at_ms: now_ms,
        approved_at_ms: None,
        executed_at_ms: None,
        expiry_at_ms: expiry_at(config, now_ms),
    }
}

/// Build per-well recommendations from a field allocation result.
///
/// Wells whose relative gas change is below the configured threshold are
/// skipped, so a near-no-op reshuffle does not page anyone.
pub fn from_allocation(
    tenant_id: Uuid,
    allocation: &FieldAllocationResult,
    result_id: Option<Uuid>,
    config: &OptimizerConfig,
    now_ms: i64,
) -> Vec<Recommendation> {
    allocation
        .allocations
        .iter()
        .filter(|a| a.gas_change_pct() >= config.gas_lift.min_change_pct)
        .map(|a| {
            allocation_recommendation(
                tenant_id,
                a,
                allocation.confidence,
                result_id,
                config,
                now_ms,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizers::{allocate_field_gas, Optimizer};
    use crate::types::{EquipmentSnapshot, EspSnapshot, GasLiftWellSnapshot};

    fn make_asset() -> AssetInfo {
        AssetInfo {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "WELL-7".into(),
            asset_type: AssetType::Well,
            lift_kind: Some(crate::stores::LiftKind::Esp),
            field_id: None,
        }
    }

    fn esp_outcome(motor_load_pct: f64) -> OptimizationOutcome {
        let snap = EquipmentSnapshot::Esp(EspSnapshot {
            frequency_hz: 48.0,
            motor_load_pct,
            motor_temp_f: 230.0,
            intake_pressure_psi: 220.0,
            discharge_pressure_psi: 1_480.0,
            production_bpd: 520.0,
            power_kw: 110.0,
        });
        crate::optimizers::EspFrequencyOptimizer
            .optimize(&snap, &OptimizerConfig::default())
            .unwrap()
    }

    #[test]
    fn significant_outcome_becomes_pending_recommendation() {
        let config = OptimizerConfig::default();
        let asset = make_asset();
        let outcome = esp_outcome(60.0);
        let rec = from_outcome(&asset, &outcome, None, &config, 1_000).unwrap();
        assert_eq!(rec.status, RecommendationStatus::Pending);
        assert_eq!(rec.asset_name, "WELL-7");
        assert_eq!(rec.unit, "Hz");
        assert!(rec.title.contains("Increase ESP frequency"));
        assert!(rec.confidence >= 0.5 && rec.confidence <= 1.0);
        // 24h expiry from creation
        assert_eq!(rec.expiry_at_ms, Some(1_000 + 24 * 3_600_000));
    }

    #[test]
    fn insignificant_outcome_produces_nothing() {
        let config = OptimizerConfig::default();
        let outcome = esp_outcome(70.0); // 0.5 Hz step, below threshold
        assert!(from_outcome(&make_asset(), &outcome, None, &config, 0).is_none());
    }

    #[test]
    fn auto_expiry_off_leaves_no_expiry_stamp() {
        let mut config = OptimizerConfig::default();
        config.recommendation.auto_expiry = false;
        let rec = from_outcome(&make_asset(), &esp_outcome(60.0), None, &config, 0).unwrap();
        assert_eq!(rec.expiry_at_ms, None);
    }

    #[test]
    fn equipment_priority_bands() {
        assert_eq!(equipment_priority(12.0), 1);
        assert_eq!(equipment_priority(7.0), 2);
        assert_eq!(equipment_priority(3.0), 3);
        assert_eq!(equipment_priority(1.0), 4);
    }

    #[test]
    fn gas_lift_priority_uses_absolute_bpd() {
        assert_eq!(gas_lift_priority(60.0), 1);
        assert_eq!(gas_lift_priority(-30.0), 2);
        assert_eq!(gas_lift_priority(15.0), 3);
        assert_eq!(gas_lift_priority(2.0), 4);
    }

    #[test]
    fn allocation_skips_sub_threshold_changes() {
        let config = OptimizerConfig::default();
        let tenant = Uuid::new_v4();
        let wells = vec![
            GasLiftWellSnapshot {
                well_id: Uuid::new_v4(),
                well_name: "GL-1".into(),
                gas_injection_mscfd: 200.0,
                production_bpd: 700.0,
                gas_oil_ratio: 850.0,
                min_gas_mscfd: None,
                max_gas_mscfd: None,
            },
            GasLiftWellSnapshot {
                well_id: Uuid::new_v4(),
                well_name: "GL-2".into(),
                gas_injection_mscfd: 1_000.0,
                production_bpd: 250.0,
                gas_oil_ratio: 1_200.0,
                min_gas_mscfd: None,
                max_gas_mscfd: None,
            },
        ];
        let allocation =
            allocate_field_gas(Uuid::new_v4(), "F-1", &wells, 2_000.0, &config, 0).unwrap();
        let recs = from_allocation(tenant, &allocation, None, &config, 0);
        // Every emitted recommendation crosses the 5% change threshold
        for rec in &recs {
            let change_pct = (rec.recommended_value - rec.current_value).abs()
                / rec.current_value.max(1e-9)
                * 100.0;
            assert!(change_pct >= config.gas_lift.min_change_pct);
            assert_eq!(rec.kind, OptimizationKind::GasLiftAllocation);
            assert_eq!(rec.tenant_id, tenant);
        }
    }
}
