//! System-wide default constants.
//!
//! Centralises the tuning values and attribute fallbacks used across the
//! optimizers. Grouped by subsystem for easy discovery.

// ============================================================================
// ESP Frequency Optimizer
// ============================================================================

/// Minimum variable-speed-drive frequency (Hz).
pub const ESP_MIN_FREQUENCY_HZ: f64 = 30.0;

/// Maximum variable-speed-drive frequency (Hz).
pub const ESP_MAX_FREQUENCY_HZ: f64 = 60.0;

/// Target motor load (% of nameplate).
pub const ESP_TARGET_MOTOR_LOAD_PCT: f64 = 75.0;

/// Maximum motor winding temperature (°F).
pub const ESP_MAX_MOTOR_TEMP_F: f64 = 280.0;

/// Minimum frequency change worth recommending (Hz).
pub const ESP_MIN_FREQUENCY_CHANGE_HZ: f64 = 1.0;

/// Typical best-efficiency-point frequency for an ESP (Hz).
pub const ESP_BEP_FREQUENCY_HZ: f64 = 55.0;

// ============================================================================
// PCP Speed Optimizer
// ============================================================================

/// Minimum drive speed (RPM).
pub const PCP_MIN_RPM: f64 = 50.0;

/// Maximum drive speed (RPM).
pub const PCP_MAX_RPM: f64 = 500.0;

/// Target drive torque (% of rated).
pub const PCP_TARGET_TORQUE_PCT: f64 = 70.0;

/// Maximum drive torque (% of rated).
pub const PCP_MAX_TORQUE_PCT: f64 = 90.0;

/// Maximum rod string load (lbs).
pub const PCP_MAX_ROD_LOAD_LBS: f64 = 15_000.0;

/// Minimum RPM change worth recommending.
pub const PCP_MIN_RPM_CHANGE: f64 = 5.0;

// ============================================================================
// Rod Pump Optimizer
// ============================================================================

/// Minimum pumping speed (strokes per minute).
pub const ROD_PUMP_MIN_SPM: f64 = 3.0;

/// Maximum pumping speed (strokes per minute).
pub const ROD_PUMP_MAX_SPM: f64 = 15.0;

/// Target pump fillage (%).
pub const ROD_PUMP_TARGET_FILLAGE_PCT: f64 = 85.0;

/// Minimum acceptable fillage (%), lower bound on fillage projections.
pub const ROD_PUMP_MIN_FILLAGE_PCT: f64 = 50.0;

/// Maximum peak polished rod load (lbs).
pub const ROD_PUMP_MAX_PEAK_LOAD_LBS: f64 = 25_000.0;

/// Maximum rod stress (psi).
pub const ROD_PUMP_MAX_ROD_STRESS_PSI: f64 = 30_000.0;

/// Optimal counterbalance band lower bound (%).
pub const ROD_PUMP_COUNTERBALANCE_LOW_PCT: f64 = 45.0;

/// Optimal counterbalance band upper bound (%).
pub const ROD_PUMP_COUNTERBALANCE_HIGH_PCT: f64 = 55.0;

/// Minimum SPM change worth recommending.
pub const ROD_PUMP_MIN_SPM_CHANGE: f64 = 0.5;

/// Strokes-to-daily-volume factor (minutes per day).
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Pump displacement conversion: `π·D²·S / (4·9702)` gives bbl per stroke
/// with D and S in inches.
pub const DISPLACEMENT_BBL_DIVISOR: f64 = 9702.0;

// ============================================================================
// Gas Lift Field Allocator
// ============================================================================

/// Cap on the total field injection budget (MSCF/day).
pub const GAS_LIFT_MAX_TOTAL_GAS_MSCFD: f64 = 10_000.0;

/// Global minimum injection per well (MSCF/day).
pub const GAS_LIFT_MIN_GAS_PER_WELL_MSCFD: f64 = 50.0;

/// Global maximum injection per well (MSCF/day).
pub const GAS_LIFT_MAX_GAS_PER_WELL_MSCFD: f64 = 2_000.0;

/// Greedy growth-phase increment (MSCF/day). Remaining budget smaller than
/// one increment at the end of the growth phase is left unallocated.
pub const GAS_LIFT_INCREMENT_MSCFD: f64 = 50.0;

/// Minimum relative gas-rate change for a per-well recommendation (%).
pub const GAS_LIFT_MIN_CHANGE_PCT: f64 = 5.0;

// ============================================================================
// Recommendations
// ============================================================================

/// Hours after which a pending recommendation expires.
pub const RECOMMENDATION_EXPIRY_HOURS: u64 = 24;

/// Interval between expiry sweeps (seconds).
pub const EXPIRY_SWEEP_INTERVAL_SECS: u64 = 3_600;

/// Floor applied to every confidence score.
pub const CONFIDENCE_FLOOR: f64 = 0.5;

// ============================================================================
// Attribute snapshot fallbacks
// ============================================================================
//
// Used when an operating attribute is absent from the attribute store.
// A missing value is a configuration gap, not an error: the documented
// fallback substitutes and the run proceeds.

pub mod attr_fallback {
    pub const ESP_FREQUENCY_HZ: f64 = 50.0;
    pub const ESP_MOTOR_LOAD_PCT: f64 = 70.0;
    pub const ESP_MOTOR_TEMP_F: f64 = 250.0;
    pub const ESP_INTAKE_PRESSURE_PSI: f64 = 200.0;
    pub const ESP_DISCHARGE_PRESSURE_PSI: f64 = 1_500.0;
    pub const ESP_PRODUCTION_BPD: f64 = 500.0;
    pub const ESP_POWER_KW: f64 = 100.0;

    pub const PCP_RPM: f64 = 200.0;
    pub const PCP_TORQUE_PCT: f64 = 60.0;
    pub const PCP_DRIVE_LOAD_PCT: f64 = 65.0;
    pub const PCP_ROD_LOAD_LBS: f64 = 8_000.0;
    pub const PCP_INTAKE_PRESSURE_PSI: f64 = 150.0;
    pub const PCP_PRODUCTION_BPD: f64 = 300.0;
    pub const PCP_POWER_KW: f64 = 50.0;
    pub const PCP_VISCOSITY_CP: f64 = 100.0;
    pub const PCP_PUMP_EFFICIENCY_PCT: f64 = 75.0;

    pub const ROD_PUMP_SPM: f64 = 8.0;
    pub const ROD_PUMP_STROKE_LENGTH_IN: f64 = 86.0;
    pub const ROD_PUMP_FILLAGE_PCT: f64 = 75.0;
    pub const ROD_PUMP_PEAK_LOAD_LBS: f64 = 15_000.0;
    pub const ROD_PUMP_MIN_LOAD_LBS: f64 = 3_000.0;
    pub const ROD_PUMP_COUNTERBALANCE_PCT: f64 = 50.0;
    pub const ROD_PUMP_PRODUCTION_BPD: f64 = 100.0;
    pub const ROD_PUMP_POWER_KW: f64 = 20.0;
    pub const ROD_PUMP_PUMP_EFFICIENCY_PCT: f64 = 70.0;
    pub const ROD_PUMP_ROD_STRESS_PSI: f64 = 20_000.0;
    pub const ROD_PUMP_PUMP_DIAMETER_IN: f64 = 2.25;

    pub const GAS_LIFT_INJECTION_RATE_MSCFD: f64 = 500.0;
    pub const GAS_LIFT_PRODUCTION_BPD: f64 = 200.0;
    pub const GAS_LIFT_GOR_SCF_BBL: f64 = 1_000.0;
}
