//! Equipment operating snapshots.
//!
//! Read-only inputs to the optimizers: one struct per lift type plus the
//! tagged union the optimizer trait consumes. Snapshots are owned by the
//! surrounding system — this core never mutates them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current readings for an electric submersible pump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EspSnapshot {
    /// VSD output frequency (Hz)
    pub frequency_hz: f64,
    /// Motor load (% of nameplate)
    pub motor_load_pct: f64,
    /// Motor winding temperature (°F)
    pub motor_temp_f: f64,
    /// Pump intake pressure (psi)
    pub intake_pressure_psi: f64,
    /// Pump discharge pressure (psi)
    pub discharge_pressure_psi: f64,
    /// Liquid production rate (BPD)
    pub production_bpd: f64,
    /// Electrical power draw (kW)
    pub power_kw: f64,
}

/// Current readings for a progressive cavity pump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcpSnapshot {
    /// Drive speed (RPM)
    pub rpm: f64,
    /// Drive torque (% of rated)
    pub torque_pct: f64,
    /// Drive load (%)
    pub drive_load_pct: f64,
    /// Rod string load (lbs)
    pub rod_load_lbs: f64,
    /// Pump intake pressure (psi)
    pub intake_pressure_psi: f64,
    /// Liquid production rate (BPD)
    pub production_bpd: f64,
    /// Electrical power draw (kW)
    pub power_kw: f64,
    /// Produced fluid viscosity (cP)
    pub fluid_viscosity_cp: f64,
    /// Reported pump efficiency (%)
    pub pump_efficiency_pct: f64,
}

/// Current readings for a sucker-rod (beam) pump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RodPumpSnapshot {
    /// Pumping speed (strokes per minute)
    pub spm: f64,
    /// Surface stroke length (inches)
    pub stroke_length_in: f64,
    /// Pump fillage (% of stroke volume filled with fluid)
    pub fillage_pct: f64,
    /// Peak polished rod load (lbs)
    pub peak_load_lbs: f64,
    /// Minimum polished rod load (lbs)
    pub min_load_lbs: f64,
    /// Counterbalance effect (%)
    pub counterbalance_pct: f64,
    /// Liquid production rate (BPD)
    pub production_bpd: f64,
    /// Electrical power draw (kW)
    pub power_kw: f64,
    /// Reported pump efficiency (%)
    pub pump_efficiency_pct: f64,
    /// Rod stress (psi)
    pub rod_stress_psi: f64,
    /// Pump plunger diameter (inches)
    pub pump_diameter_in: f64,
}

/// Current readings for one gas-lifted well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasLiftWellSnapshot {
    /// Well asset id
    pub well_id: Uuid,
    /// Well display name
    pub well_name: String,
    /// Current gas injection rate (MSCF/day)
    pub gas_injection_mscfd: f64,
    /// Liquid production rate (BPD)
    pub production_bpd: f64,
    /// Produced gas-oil ratio (SCF/bbl)
    pub gas_oil_ratio: f64,
    /// Per-well minimum injection (MSCF/day), if configured on the well
    pub min_gas_mscfd: Option<f64>,
    /// Per-well maximum injection (MSCF/day), if configured on the well
    pub max_gas_mscfd: Option<f64>,
}

/// Tagged union over the four lift types, consumed by the optimizer trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "lift_type", rename_all = "snake_case")]
pub enum EquipmentSnapshot {
    Esp(EspSnapshot),
    Pcp(PcpSnapshot),
    RodPump(RodPumpSnapshot),
    GasLift(GasLiftWellSnapshot),
}
