//! PCP speed optimization.
//!
//! Seeks the drive speed that closes the torque margin without crossing the
//! torque or rod-load envelope, and never overshoots the viscosity-derived
//! optimal efficiency point (OEP) from below.

use crate::config::OptimizerConfig;
use crate::error::ComputeError;
use crate::types::{
    EquipmentSnapshot, LimitingConstraint, OptimizationKind, OptimizationOutcome, PcpOutcome,
    PcpSnapshot,
};

pub struct PcpSpeedOptimizer;

impl super::Optimizer for PcpSpeedOptimizer {
    fn kind(&self) -> OptimizationKind {
        OptimizationKind::PcpSpeed
    }

    fn optimize(
        &self,
        snapshot: &EquipmentSnapshot,
        config: &OptimizerConfig,
    ) -> Result<OptimizationOutcome, ComputeError> {
        let EquipmentSnapshot::Pcp(snap) = snapshot else {
            return Err(ComputeError::SnapshotMismatch {
                expected: OptimizationKind::PcpSpeed,
            });
        };
        Ok(OptimizationOutcome::Pcp(compute(snap, config)))
    }
}

/// Optimal efficiency point: viscous fluids shift it down, capped at a 30%
/// reduction from the 250 RPM baseline.
fn optimal_efficiency_rpm(viscosity_cp: f64) -> f64 {
    250.0 * (1.0 - (viscosity_cp / 1_000.0).min(0.3))
}

/// Hydraulic efficiency model: distance from OEP costs up to 15 points,
/// viscosity up to 5, floored at 50.
fn efficiency_at(rpm: f64, oep: f64, viscosity_cp: f64) -> f64 {
    let dist = if oep > 0.0 { (rpm - oep).abs() / oep } else { 0.0 };
    let eff = 80.0 - (dist * 15.0).min(15.0) - (viscosity_cp / 500.0).min(5.0);
    eff.max(50.0)
}

fn compute(snap: &PcpSnapshot, config: &OptimizerConfig) -> PcpOutcome {
    let cfg = &config.pcp;
    let current = snap.rpm;
    let oep = optimal_efficiency_rpm(snap.fluid_viscosity_cp);

    let mut constraint = None;
    let mut optimal = current;

    if snap.torque_pct > 0.9 * cfg.max_torque_pct {
        optimal = current - 20.0;
        constraint = Some(LimitingConstraint::Torque);
    } else if snap.rod_load_lbs > 0.9 * cfg.max_rod_load_lbs {
        optimal = current - 15.0;
        constraint = Some(LimitingConstraint::RodLoad);
    } else if snap.torque_pct < cfg.target_torque_pct
        && snap.rod_load_lbs < 0.85 * cfg.max_rod_load_lbs
    {
        let step = (cfg.target_torque_pct - snap.torque_pct) * 1.5;
        optimal = (current + step).min(cfg.max_rpm);
        // Speeding up past the OEP loses more to slip than it gains
        if current < oep && optimal > oep {
            optimal = oep;
        }
        // Tag the ceiling only if it still binds after the OEP cap
        if optimal >= cfg.max_rpm {
            constraint = Some(LimitingConstraint::MaxRpm);
        }
    }

    if optimal <= cfg.min_rpm {
        optimal = cfg.min_rpm;
        constraint = Some(LimitingConstraint::MinRpm);
    }

    let ratio = if current > 0.0 { optimal / current } else { 1.0 };
    let expected_production = snap.production_bpd * ratio;
    let expected_torque = snap.torque_pct * ratio;
    let expected_drive_load = snap.drive_load_pct * ratio;
    let expected_power = snap.power_kw * ratio * ratio;

    let current_eff = efficiency_at(current, oep, snap.fluid_viscosity_cp);
    let expected_eff = efficiency_at(optimal, oep, snap.fluid_viscosity_cp);
    let distance_from_oep_pct = if oep > 0.0 {
        (optimal - oep).abs() / oep * 100.0
    } else {
        0.0
    };

    let speed_fraction = optimal / cfg.max_rpm;
    let rod_wear_factor = speed_fraction * speed_fraction;
    let stator_wear_factor = speed_fraction * (200.0 / snap.fluid_viscosity_cp.max(1.0)).min(1.0);

    let mut confidence = 0.85;
    if snap.torque_pct > 0.85 * cfg.max_torque_pct {
        confidence -= 0.1;
    }
    if snap.rod_load_lbs > 0.85 * cfg.max_rod_load_lbs {
        confidence -= 0.1;
    }
    if matches!(
        constraint,
        Some(LimitingConstraint::Torque | LimitingConstraint::RodLoad)
    ) {
        confidence -= 0.05;
    }
    let confidence = super::clamp_confidence(confidence);

    let change = (optimal - current).abs();
    let significant = change >= cfg.min_rpm_change;
    let not_significant_reason = (!significant).then(|| {
        format!(
            "speed change {change:.1} RPM is below the {:.1} RPM threshold",
            cfg.min_rpm_change
        )
    });

    PcpOutcome {
        current_rpm: current,
        optimal_rpm: optimal,
        current_production_bpd: snap.production_bpd,
        expected_production_bpd: expected_production,
        expected_torque_pct: expected_torque,
        expected_drive_load_pct: expected_drive_load,
        expected_power_kw: expected_power,
        current_efficiency_pct: current_eff,
        expected_efficiency_pct: expected_eff,
        oep_rpm: oep,
        distance_from_oep_pct,
        rod_wear_factor,
        stator_wear_factor,
        limiting_constraint: constraint,
        confidence,
        significant,
        not_significant_reason,
    }
}

#[cfg(test)]
mod tests {
    use super::super::Optimizer;
    use super::*;

    fn make_snapshot() -> PcpSnapshot {
        PcpSnapshot {
            rpm: 180.0,
            torque_pct: 55.0,
            drive_load_pct: 60.0,
            rod_load_lbs: 7_500.0,
            intake_pressure_psi: 160.0,
            production_bpd: 320.0,
            power_kw: 45.0,
            fluid_viscosity_cp: 120.0,
            pump_efficiency_pct: 74.0,
        }
    }

    fn run(snap: PcpSnapshot) -> PcpOutcome {
        let outcome = PcpSpeedOptimizer
            .optimize(&EquipmentSnapshot::Pcp(snap), &OptimizerConfig::default())
            .unwrap();
        match outcome {
            OptimizationOutcome::Pcp(o) => o,
            other => panic!("wrong outcome variant: {other:?}"),
        }
    }

    #[test]
    fn torque_margin_drives_speedup() {
        let o = run(make_snapshot());
        // (70 - 55) * 1.5 = 22.5, but capped at the OEP for 120 cP
        let oep = 250.0 * (1.0 - 0.12);
        assert!(o.optimal_rpm > 180.0);
        assert!(o.optimal_rpm <= oep + 1e-9);
        assert!(o.significant);
    }

    #[test]
    fn speedup_never_overshoots_oep_from_below() {
        let mut snap = make_snapshot();
        snap.rpm = 215.0;
        snap.torque_pct = 50.0; // step = 30 RPM, would land past the 220 RPM OEP
        let o = run(snap);
        assert!((o.optimal_rpm - 220.0).abs() < 1e-9);
    }

    #[test]
    fn oep_cap_below_the_ceiling_drops_the_max_rpm_tag() {
        let mut config = OptimizerConfig::default();
        config.pcp.max_rpm = 225.0;
        let mut snap = make_snapshot();
        snap.rpm = 200.0;
        snap.torque_pct = 50.0; // step = 30, clamps at 225, then OEP pulls to 220
        let outcome = PcpSpeedOptimizer
            .optimize(&EquipmentSnapshot::Pcp(snap), &config)
            .unwrap();
        let OptimizationOutcome::Pcp(o) = outcome else {
            panic!("wrong outcome variant");
        };
        assert!((o.optimal_rpm - 220.0).abs() < 1e-9);
        assert!(o.limiting_constraint.is_none());
    }

    #[test]
    fn high_torque_backs_off_twenty_rpm() {
        let mut snap = make_snapshot();
        snap.torque_pct = 82.0; // above 0.9 * 90
        let o = run(snap);
        assert!((o.optimal_rpm - 160.0).abs() < 1e-9);
        assert_eq!(o.limiting_constraint, Some(LimitingConstraint::Torque));
        assert!(o.confidence < 0.85);
    }

    #[test]
    fn high_rod_load_backs_off_fifteen_rpm() {
        let mut snap = make_snapshot();
        snap.rod_load_lbs = 14_000.0; // above 0.9 * 15_000
        let o = run(snap);
        assert!((o.optimal_rpm - 165.0).abs() < 1e-9);
        assert_eq!(o.limiting_constraint, Some(LimitingConstraint::RodLoad));
    }

    #[test]
    fn slowdown_clamps_at_min_rpm() {
        let mut snap = make_snapshot();
        snap.rpm = 60.0;
        snap.torque_pct = 85.0;
        let o = run(snap);
        assert_eq!(o.optimal_rpm, 50.0);
        assert_eq!(o.limiting_constraint, Some(LimitingConstraint::MinRpm));
    }

    #[test]
    fn small_change_is_not_significant() {
        let mut snap = make_snapshot();
        snap.torque_pct = 68.0; // step = 3 RPM, below the 5 RPM threshold
        let o = run(snap);
        assert!(!o.significant);
        assert!(o.not_significant_reason.is_some());
    }

    #[test]
    fn projections_scale_with_speed_ratio() {
        let o = run(make_snapshot());
        let r = o.optimal_rpm / 180.0;
        assert!((o.expected_production_bpd - 320.0 * r).abs() < 1e-6);
        assert!((o.expected_torque_pct - 55.0 * r).abs() < 1e-6);
        assert!((o.expected_power_kw - 45.0 * r * r).abs() < 1e-6);
    }

    #[test]
    fn wear_factors_in_unit_range() {
        let o = run(make_snapshot());
        assert!(o.rod_wear_factor > 0.0 && o.rod_wear_factor <= 1.0);
        assert!(o.stator_wear_factor > 0.0 && o.stator_wear_factor <= 1.0);
    }

    #[test]
    fn viscous_fluid_lowers_the_oep() {
        let thin = optimal_efficiency_rpm(50.0);
        let thick = optimal_efficiency_rpm(600.0);
        assert!(thick < thin);
        // Reduction capped at 30%
        assert_eq!(optimal_efficiency_rpm(5_000.0), 175.0);
    }

    #[test]
    fn efficiency_floored_at_fifty() {
        assert!(efficiency_at(500.0, 175.0, 4_000.0) >= 50.0);
    }
}
