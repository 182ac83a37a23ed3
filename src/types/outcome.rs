//! Optimizer outcomes.
//!
//! Each optimizer variant produces its own outcome struct; the tagged union
//! [`OptimizationOutcome`] keeps orchestration uniform. All outcomes carry a
//! recommended operating point inside the constraint bounds, projections at
//! that point, a confidence score in [0.5, 1.0] and a significance verdict.

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::result::OptimizationKind;

/// The constraint that capped or drove a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LimitingConstraint {
    MaxFrequency,
    MinFrequency,
    MotorTemperature,
    MotorLoad,
    MaxRpm,
    MinRpm,
    Torque,
    RodLoad,
    MaxSpm,
    MinSpm,
    RodStress,
    PeakLoad,
}

impl LimitingConstraint {
    /// Whether this constraint is temperature-driven (reduces confidence).
    pub fn is_temperature(self) -> bool {
        matches!(self, Self::MotorTemperature)
    }
}

impl std::fmt::Display for LimitingConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::MaxFrequency => "MAX_FREQUENCY",
            Self::MinFrequency => "MIN_FREQUENCY",
            Self::MotorTemperature => "MOTOR_TEMPERATURE",
            Self::MotorLoad => "MOTOR_LOAD",
            Self::MaxRpm => "MAX_RPM",
            Self::MinRpm => "MIN_RPM",
            Self::Torque => "TORQUE",
            Self::RodLoad => "ROD_LOAD",
            Self::MaxSpm => "MAX_SPM",
            Self::MinSpm => "MIN_SPM",
            Self::RodStress => "ROD_STRESS",
            Self::PeakLoad => "PEAK_LOAD",
        };
        write!(f, "{tag}")
    }
}

/// ESP frequency optimization outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EspOutcome {
    pub current_frequency_hz: f64,
    pub optimal_frequency_hz: f64,
    pub current_production_bpd: f64,
    pub expected_production_bpd: f64,
    pub expected_motor_load_pct: f64,
    pub expected_motor_temp_f: f64,
    pub expected_power_kw: f64,
    /// Production per unit power at current conditions, penalty-adjusted
    pub operating_efficiency: f64,
    /// Efficiency at the recommended point minus current efficiency
    pub efficiency_improvement: f64,
    /// Typical best-efficiency-point frequency (Hz)
    pub bep_frequency_hz: f64,
    /// Distance of the recommendation from BEP (% of BEP)
    pub distance_from_bep_pct: f64,
    pub limiting_constraint: Option<LimitingConstraint>,
    pub confidence: f64,
    pub significant: bool,
    pub not_significant_reason: Option<String>,
}

/// PCP speed optimization outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcpOutcome {
    pub current_rpm: f64,
    pub optimal_rpm: f64,
    pub current_production_bpd: f64,
    pub expected_production_bpd: f64,
    pub expected_torque_pct: f64,
    pub expected_drive_load_pct: f64,
    pub expected_power_kw: f64,
    pub current_efficiency_pct: f64,
    pub expected_efficiency_pct: f64,
    /// Viscosity-derived optimal efficiency point (RPM)
    pub oep_rpm: f64,
    /// Distance of the recommendation from OEP (% of OEP)
    pub distance_from_oep_pct: f64,
    /// Rod wear factor at the recommended speed, `(rpm/max_rpm)²`
    pub rod_wear_factor: f64,
    /// Stator wear factor at the recommended speed
    pub stator_wear_factor: f64,
    pub limiting_constraint: Option<LimitingConstraint>,
    pub confidence: f64,
    pub significant: bool,
    pub not_significant_reason: Option<String>,
}

/// A counterbalance adjustment toward the configured band midpoint.
///
/// Independent of the SPM branch — can make a rod pump result significant
/// on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterbalanceAdjustment {
    pub current_pct: f64,
    pub recommended_pct: f64,
}

impl CounterbalanceAdjustment {
    /// "Increase" or "Decrease" for operator-facing text.
    pub fn direction(&self) -> &'static str {
        if self.recommended_pct > self.current_pct {
            "Increase"
        } else {
            "Decrease"
        }
    }
}

/// Rod pump optimization outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RodPumpOutcome {
    pub current_spm: f64,
    pub optimal_spm: f64,
    pub stroke_length_in: f64,
    pub current_fillage_pct: f64,
    pub expected_fillage_pct: f64,
    pub current_production_bpd: f64,
    pub expected_production_bpd: f64,
    pub expected_peak_load_lbs: f64,
    pub expected_rod_stress_psi: f64,
    pub expected_power_kw: f64,
    pub current_efficiency_pct: f64,
    pub expected_efficiency_pct: f64,
    /// Pump displacement (bbl per stroke)
    pub pump_displacement_bbl: f64,
    /// Theoretical daily capacity at current SPM (BPD)
    pub theoretical_capacity_bpd: f64,
    /// Actual production as % of theoretical capacity
    pub volumetric_efficiency_pct: f64,
    /// Speed at which the pump would reach target fillage (SPM)
    pub optimal_fillage_spm: f64,
    /// Counterbalance adjustment, when the current value is outside the band
    pub counterbalance: Option<CounterbalanceAdjustment>,
    /// Operator-facing summary of the pump card reading
    pub card_analysis: String,
    pub limiting_constraint: Option<LimitingConstraint>,
    pub confidence: f64,
    pub significant: bool,
    pub not_significant_reason: Option<String>,
}

/// Per-well gas lift marginal-rate estimate.
///
/// Not directly significant — the field allocation pass decides which wells
/// get recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasLiftOutcome {
    pub well_id: Uuid,
    pub well_name: String,
    pub current_gas_mscfd: f64,
    pub current_production_bpd: f64,
    /// Incremental BPD per incremental MSCF/day of injection
    pub marginal_oil_rate: f64,
    pub gas_oil_ratio: f64,
    /// Effective per-well minimum after global caps (MSCF/day)
    pub min_gas_mscfd: f64,
    /// Effective per-well maximum after global caps (MSCF/day)
    pub max_gas_mscfd: f64,
    pub confidence: f64,
}

/// Tagged union over the four optimizer outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizationOutcome {
    Esp(EspOutcome),
    Pcp(PcpOutcome),
    RodPump(RodPumpOutcome),
    GasLift(GasLiftOutcome),
}

impl OptimizationOutcome {
    pub fn kind(&self) -> OptimizationKind {
        match self {
            Self::Esp(_) => OptimizationKind::EspFrequency,
            Self::Pcp(_) => OptimizationKind::PcpSpeed,
            Self::RodPump(_) => OptimizationKind::RodPump,
            Self::GasLift(_) => OptimizationKind::GasLiftAllocation,
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Self::Esp(o) => o.confidence,
            Self::Pcp(o) => o.confidence,
            Self::RodPump(o) => o.confidence,
            Self::GasLift(o) => o.confidence,
        }
    }

    /// Whether this outcome warrants a recommendation on its own.
    pub fn is_significant(&self) -> bool {
        match self {
            Self::Esp(o) => o.significant,
            Self::Pcp(o) => o.significant,
            Self::RodPump(o) => o.significant,
            // Per-well estimates feed the field allocator; significance is
            // decided there per allocation row.
            Self::GasLift(_) => false,
        }
    }

    /// Current value of the primary operating variable.
    pub fn current_value(&self) -> f64 {
        match self {
            Self::Esp(o) => o.current_frequency_hz,
            Self::Pcp(o) => o.current_rpm,
            Self::RodPump(o) => o.current_spm,
            Self::GasLift(o) => o.current_gas_mscfd,
        }
    }

    /// Recommended value of the primary operating variable.
    pub fn optimal_value(&self) -> f64 {
        match self {
            Self::Esp(o) => o.optimal_frequency_hz,
            Self::Pcp(o) => o.optimal_rpm,
            Self::RodPump(o) => o.optimal_spm,
            Self::GasLift(o) => o.marginal_oil_rate,
        }
    }

    /// Unit of the primary operating variable.
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Esp(_) => "Hz",
            Self::Pcp(_) => "RPM",
            Self::RodPump(_) => "SPM",
            Self::GasLift(_) => "BPD/MSCFD",
        }
    }

    /// Expected absolute production change (BPD).
    pub fn expected_production_increase_bpd(&self) -> f64 {
        match self {
            Self::Esp(o) => o.expected_production_bpd - o.current_production_bpd,
            Self::Pcp(o) => o.expected_production_bpd - o.current_production_bpd,
            Self::RodPump(o) => o.expected_production_bpd - o.current_production_bpd,
            Self::GasLift(_) => 0.0,
        }
    }

    /// Expected production change relative to current (%).
    pub fn expected_production_increase_pct(&self) -> f64 {
        let current = match self {
            Self::Esp(o) => o.current_production_bpd,
            Self::Pcp(o) => o.current_production_bpd,
            Self::RodPump(o) => o.current_production_bpd,
            Self::GasLift(_) => return 0.0,
        };
        percent_change(current, current + self.expected_production_increase_bpd())
    }

    /// Expected efficiency improvement at the recommended point.
    pub fn efficiency_improvement(&self) -> f64 {
        match self {
            Self::Esp(o) => o.efficiency_improvement,
            Self::Pcp(o) => o.expected_efficiency_pct - o.current_efficiency_pct,
            Self::RodPump(o) => o.expected_efficiency_pct - o.current_efficiency_pct,
            Self::GasLift(_) => 0.0,
        }
    }

    /// Structured key/value payload persisted on the run record.
    pub fn output_payload(&self) -> serde_json::Value {
        match self {
            Self::Esp(o) => {
                let mut payload = json!({
                    "currentFrequency": round2(o.current_frequency_hz),
                    "recommendedFrequency": round2(o.optimal_frequency_hz),
                    "frequencyChange": round2(o.optimal_frequency_hz - o.current_frequency_hz),
                    "expectedMotorLoad": round2(o.expected_motor_load_pct),
                    "expectedMotorTemperature": round2(o.expected_motor_temp_f),
                    "expectedProductionIncrease": round2(self.expected_production_increase_bpd()),
                    "expectedProductionIncreasePercent": round2(self.expected_production_increase_pct()),
                    "expectedEfficiencyImprovement": round2(o.efficiency_improvement),
                    "bepFrequency": round2(o.bep_frequency_hz),
                    "distanceFromBep": round2(o.distance_from_bep_pct),
                    "confidence": o.confidence,
                    "isSignificant": o.significant,
                });
                attach_constraint(&mut payload, o.limiting_constraint);
                payload
            }
            Self::Pcp(o) => {
                let mut payload = json!({
                    "currentRpm": round2(o.current_rpm),
                    "recommendedRpm": round2(o.optimal_rpm),
                    "rpmChange": round2(o.optimal_rpm - o.current_rpm),
                    "expectedTorque": round2(o.expected_torque_pct),
                    "expectedProductionIncrease": round2(self.expected_production_increase_bpd()),
                    "expectedProductionIncreasePercent": round2(self.expected_production_increase_pct()),
                    "expectedEfficiencyImprovement": round2(self.efficiency_improvement()),
                    "oepRpm": round2(o.oep_rpm),
                    "rodWearFactor": round3(o.rod_wear_factor),
                    "statorWearFactor": round3(o.stator_wear_factor),
                    "confidence": o.confidence,
                    "isSignificant": o.significant,
                });
                attach_constraint(&mut payload, o.limiting_constraint);
                payload
            }
            Self::RodPump(o) => {
                let mut payload = json!({
                    "currentSpm": round2(o.current_spm),
                    "recommendedSpm": round2(o.optimal_spm),
                    "spmChange": round2(o.optimal_spm - o.current_spm),
                    "currentFillage": round2(o.current_fillage_pct),
                    "expectedFillage": round2(o.expected_fillage_pct),
                    "expectedPeakLoad": o.expected_peak_load_lbs.round(),
                    "expectedRodStress": o.expected_rod_stress_psi.round(),
                    "expectedProductionIncrease": round2(self.expected_production_increase_bpd()),
                    "expectedProductionIncreasePercent": round2(self.expected_production_increase_pct()),
                    "theoreticalCapacity": round2(o.theoretical_capacity_bpd),
                    "volumetricEfficiency": round2(o.volumetric_efficiency_pct),
                    "cardAnalysis": o.card_analysis,
                    "confidence": o.confidence,
                    "isSignificant": o.significant,
                });
                attach_constraint(&mut payload, o.limiting_constraint);
                if let (Some(cb), Some(map)) = (&o.counterbalance, payload.as_object_mut()) {
                    map.insert(
                        "counterbalanceRecommendation".into(),
                        json!({
                            "currentPercent": cb.current_pct,
                            "recommendedPercent": cb.recommended_pct,
                        }),
                    );
                }
                payload
            }
            Self::GasLift(o) => json!({
                "wellName": o.well_name,
                "currentGasRate": round2(o.current_gas_mscfd),
                "currentProduction": round2(o.current_production_bpd),
                "marginalOilRate": round4(o.marginal_oil_rate),
                "gasOilRatio": round2(o.gas_oil_ratio),
                "confidence": o.confidence,
            }),
        }
    }
}

fn attach_constraint(payload: &mut serde_json::Value, constraint: Option<LimitingConstraint>) {
    if let (Some(c), Some(map)) = (constraint, payload.as_object_mut()) {
        map.insert("limitingConstraint".into(), json!(c.to_string()));
    }
}

/// Percent change from `current` to `expected`, zero-safe.
pub fn percent_change(current: f64, expected: f64) -> f64 {
    if current == 0.0 {
        0.0
    } else {
        (expected - current) / current * 100.0
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub(crate) fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

pub(crate) fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiting_constraint_tags() {
        assert_eq!(LimitingConstraint::MaxFrequency.to_string(), "MAX_FREQUENCY");
        assert_eq!(LimitingConstraint::RodStress.to_string(), "ROD_STRESS");
        assert!(LimitingConstraint::MotorTemperature.is_temperature());
        assert!(!LimitingConstraint::MotorLoad.is_temperature());
    }

    #[test]
    fn percent_change_zero_safe() {
        assert_eq!(percent_change(0.0, 100.0), 0.0);
        assert!((percent_change(100.0, 110.0) - 10.0).abs() < 1e-9);
        assert!((percent_change(200.0, 150.0) + 25.0).abs() < 1e-9);
    }
}
