//! Rod pump (beam pump) optimization.
//!
//! Matches pumping speed to pump fillage: a pump that is not filling is
//! outrunning inflow and should slow down, a full pump with load headroom
//! can speed up. Counterbalance is checked independently of the speed
//! branch.

use std::f64::consts::PI;

use crate::config::{defaults, OptimizerConfig};
use crate::error::ComputeError;
use crate::types::{
    CounterbalanceAdjustment, EquipmentSnapshot, LimitingConstraint, OptimizationKind,
    OptimizationOutcome, RodPumpOutcome, RodPumpSnapshot,
};

pub struct RodPumpOptimizer;

impl super::Optimizer for RodPumpOptimizer {
    fn kind(&self) -> OptimizationKind {
        OptimizationKind::RodPump
    }

    fn optimize(
        &self,
        snapshot: &EquipmentSnapshot,
        config: &OptimizerConfig,
    ) -> Result<OptimizationOutcome, ComputeError> {
        let EquipmentSnapshot::RodPump(snap) = snapshot else {
            return Err(ComputeError::SnapshotMismatch {
                expected: OptimizationKind::RodPump,
            });
        };
        Ok(OptimizationOutcome::RodPump(compute(snap, config)))
    }
}

/// Pump displacement in barrels per stroke for a plunger of diameter `d`
/// inches and stroke `s` inches.
fn displacement_bbl(diameter_in: f64, stroke_in: f64) -> f64 {
    PI * diameter_in * diameter_in * stroke_in / (4.0 * defaults::DISPLACEMENT_BBL_DIVISOR)
}

fn card_analysis(fillage_pct: f64, config: &OptimizerConfig) -> String {
    let cfg = &config.rod_pump;
    if fillage_pct < cfg.min_fillage_pct {
        format!(
            "Severe incomplete fillage ({fillage_pct:.0}%): pump is outrunning well inflow, fluid pound likely"
        )
    } else if fillage_pct < cfg.target_fillage_pct {
        format!(
            "Incomplete fillage ({fillage_pct:.0}%): pump speed exceeds inflow, reduce speed to improve fillage"
        )
    } else if fillage_pct > 95.0 {
        format!("Full pump ({fillage_pct:.0}%): well can likely support a higher pumping speed")
    } else {
        format!("Good fillage ({fillage_pct:.0}%): pump speed is well matched to inflow")
    }
}

#[allow(clippy::too_many_lines)]
fn compute(snap: &RodPumpSnapshot, config: &OptimizerConfig) -> RodPumpOutcome {
    let cfg = &config.rod_pump;
    let current = snap.spm;

    let displacement = displacement_bbl(snap.pump_diameter_in, snap.stroke_length_in);
    let theoretical = displacement * current * defaults::MINUTES_PER_DAY;
    let volumetric_eff = if theoretical > 0.0 {
        snap.production_bpd / theoretical * 100.0
    } else {
        0.0
    };

    let mut constraint = None;
    let mut optimal = current;

    if snap.fillage_pct < cfg.target_fillage_pct {
        // Half the proportional deficit per run, so fillage converges over
        // a few cycles instead of overshooting.
        let reduction = current * (1.0 - snap.fillage_pct / cfg.target_fillage_pct) * 0.5;
        optimal = (current - reduction).max(cfg.min_spm);
        if optimal <= cfg.min_spm {
            constraint = Some(LimitingConstraint::MinSpm);
        }
    } else if snap.fillage_pct > 95.0
        && snap.peak_load_lbs < 0.85 * cfg.max_peak_load_lbs
        && snap.rod_stress_psi < 0.85 * cfg.max_rod_stress_psi
    {
        optimal = (current + 1.0).min(cfg.max_spm);
        if optimal >= cfg.max_spm {
            constraint = Some(LimitingConstraint::MaxSpm);
        }
    }

    // Load limits tighten whatever the fillage branch decided; both can fire
    // on the same run
    if snap.rod_stress_psi > 0.9 * cfg.max_rod_stress_psi {
        optimal = (optimal - 1.0).max(cfg.min_spm);
        constraint = Some(LimitingConstraint::RodStress);
    }
    if snap.peak_load_lbs > 0.9 * cfg.max_peak_load_lbs {
        optimal = (optimal - 0.5).max(cfg.min_spm);
        constraint = Some(LimitingConstraint::PeakLoad);
    }

    let counterbalance = (snap.counterbalance_pct < cfg.counterbalance_low_pct
        || snap.counterbalance_pct > cfg.counterbalance_high_pct)
        .then(|| CounterbalanceAdjustment {
            current_pct: snap.counterbalance_pct,
            recommended_pct: (cfg.counterbalance_low_pct + cfg.counterbalance_high_pct) / 2.0,
        });

    let ratio = if current > 0.0 { optimal / current } else { 1.0 };
    let expected_fillage = if ratio < 1.0 {
        (snap.fillage_pct / ratio).min(100.0)
    } else {
        (snap.fillage_pct / ratio).max(cfg.min_fillage_pct)
    };
    let new_theoretical = displacement * optimal * defaults::MINUTES_PER_DAY;
    let expected_production = new_theoretical * expected_fillage / 100.0;
    let expected_peak = snap.peak_load_lbs * ratio * ratio;
    let expected_stress = snap.rod_stress_psi * ratio * ratio;
    let expected_power = snap.power_kw * ratio;
    let expected_eff =
        (snap.pump_efficiency_pct + (expected_fillage - snap.fillage_pct) / 10.0).min(95.0);

    let optimal_fillage_spm = current * snap.fillage_pct / cfg.target_fillage_pct;

    let mut confidence = 0.85;
    if snap.fillage_pct < 30.0 {
        confidence -= 0.15;
    }
    if snap.peak_load_lbs > 0.85 * cfg.max_peak_load_lbs {
        confidence -= 0.1;
    }
    if snap.rod_stress_psi > 0.85 * cfg.max_rod_stress_psi {
        confidence -= 0.1;
    }
    let confidence = super::clamp_confidence(confidence);

    let change = (optimal - current).abs();
    let significant = change >= cfg.min_spm_change || counterbalance.is_some();
    let not_significant_reason = (!significant).then(|| {
        format!(
            "speed change {change:.2} SPM is below the {:.2} SPM threshold and counterbalance is in band",
            cfg.min_spm_change
        )
    });

    RodPumpOutcome {
        current_spm: current,
        optimal_spm: optimal,
        stroke_length_in: snap.stroke_length_in,
        current_fillage_pct: snap.fillage_pct,
        expected_fillage_pct: expected_fillage,
        current_production_bpd: snap.production_bpd,
        expected_production_bpd: expected_production,
        expected_peak_load_lbs: expected_peak,
        expected_rod_stress_psi: expected_stress,
        expected_power_kw: expected_power,
        current_efficiency_pct: snap.pump_efficiency_pct,
        expected_efficiency_pct: expected_eff,
        pump_displacement_bbl: displacement,
        theoretical_capacity_bpd: theoretical,
        volumetric_efficiency_pct: volumetric_eff,
        optimal_fillage_spm,
        counterbalance,
        card_analysis: card_analysis(snap.fillage_pct, config),
        limiting_constraint: constraint,
        confidence,
        significant,
        not_significant_reason,
    }
}
