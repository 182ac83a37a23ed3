//! Gas lift marginal-rate estimation and field allocation.
//!
//! Per well: a declining-returns marginal oil rate (incremental BPD per
//! incremental MSCF/day). Field-wide: a two-phase greedy allocator that
//! first secures every well's minimum injection, then hands out fixed
//! increments to the best marginal responder with remaining headroom.

use uuid::Uuid;

use crate::config::OptimizerConfig;
use crate::error::ComputeError;
use crate::types::{
    EquipmentSnapshot, FieldAllocationResult, GasLiftOutcome, GasLiftWellSnapshot,
    OptimizationKind, OptimizationOutcome, WellAllocation,
};

pub struct GasLiftOptimizer;

impl super::Optimizer for GasLiftOptimizer {
    fn kind(&self) -> OptimizationKind {
        OptimizationKind::GasLiftAllocation
    }

    fn optimize(
        &self,
        snapshot: &EquipmentSnapshot,
        config: &OptimizerConfig,
    ) -> Result<OptimizationOutcome, ComputeError> {
        let EquipmentSnapshot::GasLift(snap) = snapshot else {
            return Err(ComputeError::SnapshotMismatch {
                expected: OptimizationKind::GasLiftAllocation,
            });
        };
        Ok(OptimizationOutcome::GasLift(estimate(snap, config)))
    }
}

/// Per-well minimum after the global floor.
fn effective_min(well: &GasLiftWellSnapshot, config: &OptimizerConfig) -> f64 {
    let global = config.gas_lift.min_gas_per_well_mscfd;
    well.min_gas_mscfd.map_or(global, |m| m.max(global))
}

/// Per-well maximum after the global cap.
fn effective_max(well: &GasLiftWellSnapshot, config: &OptimizerConfig) -> f64 {
    let global = config.gas_lift.max_gas_per_well_mscfd;
    well.max_gas_mscfd.map_or(global, |m| m.min(global))
}

/// Marginal oil rate at the well's current injection point.
///
/// Declining returns: the closer injection sits to the well's maximum, the
/// less each additional MSCF/day of gas buys.
fn estimate(well: &GasLiftWellSnapshot, config: &OptimizerConfig) -> GasLiftOutcome {
    let max_gas = effective_max(well, config);
    let base_rate = well.production_bpd / well.gas_injection_mscfd.max(1.0);
    let depletion = 1.0 - 0.3 * (well.gas_injection_mscfd / max_gas).clamp(0.0, 1.0);
    GasLiftOutcome {
        well_id: well.well_id,
        well_name: well.well_name.clone(),
        current_gas_mscfd: well.gas_injection_mscfd,
        current_production_bpd: well.production_bpd,
        marginal_oil_rate: base_rate * 0.5 * depletion,
        gas_oil_ratio: well.gas_oil_ratio,
        min_gas_mscfd: effective_min(well, config),
        max_gas_mscfd: max_gas,
        confidence: 0.8,
    }
}

/// Allocate a field's gas budget across its lifted wells.
///
/// Phase 1 gives every well its effective minimum while the budget lasts;
/// the first well the budget cannot fully cover takes the remainder, and
/// wells ranked below it get nothing. Phase 2 repeatedly hands one
/// increment to the best-ranked well still under its maximum. Budget
/// smaller than one increment at the end of phase 2 is left unallocated.
///
/// # Errors
///
/// [`ComputeError::NoWells`] when `wells` is empty.
pub fn allocate_field_gas(
    field_id: Uuid,
    field_name: &str,
    wells: &[GasLiftWellSnapshot],
    available_gas_mscfd: f64,
    config: &OptimizerConfig,
    timestamp_ms: i64,
) -> Result<FieldAllocationResult, ComputeError> {
    if wells.is_empty() {
        return Err(ComputeError::NoWells);
    }
    let cfg = &config.gas_lift;
    let budget = available_gas_mscfd.min(cfg.max_total_gas_mscfd);

    // Rank wells by marginal response, best first. Stable sort keeps input
    // order on ties so the allocation is deterministic.
    let mut estimates: Vec<GasLiftOutcome> =
        wells.iter().map(|w| estimate(w, config)).collect();
    estimates.sort_by(|a, b| {
        b.marginal_oil_rate
            .partial_cmp(&a.marginal_oil_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Phase 1: secure minimums in rank order. The first well the budget
    // cannot cover takes whatever remains; wells after it get nothing.
    let mut allocated: Vec<f64> = Vec::with_capacity(estimates.len());
    let mut remaining = budget;
    for est in &estimates {
        if remaining >= est.min_gas_mscfd {
            allocated.push(est.min_gas_mscfd);
            remaining -= est.min_gas_mscfd;
        } else {
            allocated.push(remaining.max(0.0));
            remaining = 0.0;
        }
    }

    // Phase 2: greedy increments to the best well with headroom
    let increment = cfg.increment_mscfd;
    while remaining >= increment {
        let Some(idx) = estimates
            .iter()
            .enumerate()
            .position(|(i, est)| allocated[i] + increment <= est.max_gas_mscfd)
        else {
            break;
        };
        allocated[idx] += increment;
        remaining -= increment;
    }

    let mut allocations: Vec<WellAllocation> = Vec::with_capacity(estimates.len());
    for (rank, (est, alloc)) in estimates.iter().zip(&allocated).enumerate() {
        let gas_change = alloc - est.current_gas_mscfd;
        let expected_production =
            (est.current_production_bpd + gas_change * est.marginal_oil_rate).max(0.0);
        allocations.push(WellAllocation {
            well_id: est.well_id,
            well_name: est.well_name.clone(),
            current_gas_mscfd: est.current_gas_mscfd,
            recommended_gas_mscfd: *alloc,
            gas_change_mscfd: gas_change,
            current_production_bpd: est.current_production_bpd,
            expected_production_bpd: expected_production,
            production_increase_bpd: expected_production - est.current_production_bpd,
            marginal_oil_rate: est.marginal_oil_rate,
            gas_oil_ratio: est.gas_oil_ratio,
            priority_rank: rank + 1,
            at_minimum: *alloc <= est.min_gas_mscfd,
            at_maximum: *alloc >= est.max_gas_mscfd,
        });
    }

    let current_total_gas: f64 = allocations.iter().map(|a| a.current_gas_mscfd).sum();
    let optimized_total_gas: f64 = allocations.iter().map(|a| a.recommended_gas_mscfd).sum();
    let current_production: f64 = allocations.iter().map(|a| a.current_production_bpd).sum();
    let expected_production: f64 = allocations.iter().map(|a| a.expected_production_bpd).sum();
    let increase = expected_production - current_production;
    let increase_pct = crate::types::outcome::percent_change(current_production, expected_production);

    let current_per_gas = if current_total_gas > 0.0 {
        current_production / current_total_gas
    } else {
        0.0
    };
    let optimized_per_gas = if optimized_total_gas > 0.0 {
        expected_production / optimized_total_gas
    } else {
        0.0
    };
    let efficiency_improvement_pct =
        crate::types::outcome::percent_change(current_per_gas, optimized_per_gas);

    let mut confidence = 0.8;
    if wells.len() < 5 {
        confidence -= 0.1;
    }
    let best = estimates
        .first()
        .map_or(0.0, |e| e.marginal_oil_rate);
    let worst = estimates
        .last()
        .map_or(0.0, |e| e.marginal_oil_rate);
    if best > 0.0 && (best - worst) / best > 0.5 {
        // A wide marginal-rate spread means the simple response model is
        // extrapolating further for some wells.
        confidence -= 0.05;
    }
    let confidence = super::clamp_confidence(confidence);

    Ok(FieldAllocationResult {
        field_id,
        field_name: field_name.to_owned(),
        total_available_gas_mscfd: budget,
        current_total_gas_mscfd: current_total_gas,
        optimized_total_gas_mscfd: optimized_total_gas,
        current_total_production_bpd: current_production,
        expected_total_production_bpd: expected_production,
        production_increase_bpd: increase,
        production_increase_pct: increase_pct,
        efficiency_improvement_pct,
        allocations,
        confidence,
        timestamp_ms,
    })
}
