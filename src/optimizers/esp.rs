//! ESP frequency optimization.
//!
//! Walks the VSD frequency toward the target motor load while keeping the
//! motor inside its thermal envelope. Affinity-law projections: production
//! scales linearly with frequency, load with the square, power with the cube.

use crate::config::{defaults, OptimizerConfig};
use crate::error::ComputeError;
use crate::types::{
    EquipmentSnapshot, EspOutcome, EspSnapshot, LimitingConstraint, OptimizationKind,
    OptimizationOutcome,
};

pub struct EspFrequencyOptimizer;

impl super::Optimizer for EspFrequencyOptimizer {
    fn kind(&self) -> OptimizationKind {
        OptimizationKind::EspFrequency
    }

    fn optimize(
        &self,
        snapshot: &EquipmentSnapshot,
        config: &OptimizerConfig,
    ) -> Result<OptimizationOutcome, ComputeError> {
        let EquipmentSnapshot::Esp(snap) = snapshot else {
            return Err(ComputeError::SnapshotMismatch {
                expected: OptimizationKind::EspFrequency,
            });
        };
        Ok(OptimizationOutcome::Esp(compute(snap, config)))
    }
}

fn compute(snap: &EspSnapshot, config: &OptimizerConfig) -> EspOutcome {
    let cfg = &config.esp;
    let current = snap.frequency_hz;

    let mut constraint = None;
    let mut optimal = current;

    if snap.motor_load_pct < cfg.target_motor_load_pct
        && snap.motor_temp_f < 0.9 * cfg.max_motor_temp_f
    {
        // Headroom on both load and temperature: walk toward target load.
        // 0.1 Hz per % of load margin keeps steps small enough to observe
        // the thermal response before the next run.
        let step = (cfg.target_motor_load_pct - snap.motor_load_pct) * 0.1;
        optimal = current + step;
        if optimal >= cfg.max_frequency_hz {
            optimal = cfg.max_frequency_hz;
            constraint = Some(LimitingConstraint::MaxFrequency);
        }
    } else if snap.motor_load_pct > 85.0 || snap.motor_temp_f > 0.95 * cfg.max_motor_temp_f {
        if snap.motor_temp_f > 0.95 * cfg.max_motor_temp_f {
            optimal = current - 2.0;
            constraint = Some(LimitingConstraint::MotorTemperature);
        } else {
            optimal = current - 1.0;
            constraint = Some(LimitingConstraint::MotorLoad);
        }
        if optimal <= cfg.min_frequency_hz {
            optimal = cfg.min_frequency_hz;
            constraint = Some(LimitingConstraint::MinFrequency);
        }
    }

    // Affinity-law projections at the recommended frequency
    let ratio = if current > 0.0 { optimal / current } else { 1.0 };
    let expected_production = snap.production_bpd * ratio;
    let expected_load = snap.motor_load_pct * ratio * ratio;
    let expected_temp = snap.motor_temp_f + 0.5 * (expected_load - snap.motor_load_pct);
    let expected_power = snap.power_kw * ratio.powi(3);

    let current_eff = operating_efficiency(snap.production_bpd, snap.power_kw, snap.motor_temp_f, snap.motor_load_pct);
    let expected_eff = operating_efficiency(expected_production, expected_power, expected_temp, expected_load);

    let bep = defaults::ESP_BEP_FREQUENCY_HZ;
    let distance_from_bep_pct = (optimal - bep).abs() / bep * 100.0;

    let mut confidence = 0.85;
    if snap.motor_temp_f > 0.9 * cfg.max_motor_temp_f {
        confidence -= 0.1;
    }
    if snap.motor_load_pct > 85.0 {
        confidence -= 0.05;
    }
    if constraint.is_some_and(LimitingConstraint::is_temperature) {
        confidence -= 0.1;
    }
    let confidence = super::clamp_confidence(confidence);

    let change = (optimal - current).abs();
    let significant = change >= cfg.min_frequency_change_hz;
    let not_significant_reason = (!significant).then(|| {
        format!(
            "frequency change {change:.2} Hz is below the {:.2} Hz threshold",
            cfg.min_frequency_change_hz
        )
    });

    EspOutcome {
        current_frequency_hz: current,
        optimal_frequency_hz: optimal,
        current_production_bpd: snap.production_bpd,
        expected_production_bpd: expected_production,
        expected_motor_load_pct: expected_load,
        expected_motor_temp_f: expected_temp,
        expected_power_kw: expected_power,
        operating_efficiency: current_eff,
        efficiency_improvement: expected_eff - current_eff,
        bep_frequency_hz: bep,
        distance_from_bep_pct,
        limiting_constraint: constraint,
        confidence,
        significant,
        not_significant_reason,
    }
}

/// Production per unit power, penalised for hot or off-band operation.
fn operating_efficiency(production_bpd: f64, power_kw: f64, temp_f: f64, load_pct: f64) -> f64 {
    if power_kw <= 0.0 {
        return 0.0;
    }
    let mut eff = production_bpd / power_kw;
    if temp_f > 270.0 {
        eff *= 0.9;
    }
    if !(50.0..=85.0).contains(&load_pct) {
        eff *= 0.95;
    }
    eff
}
