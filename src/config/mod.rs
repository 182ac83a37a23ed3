//! Optimizer configuration.
//!
//! Every constraint the optimizers consult is an operator-tunable TOML value
//! with a built-in default, so an absent file (or an absent key) never blocks
//! a run. The loaded value is immutable and shared read-only across all
//! optimizer invocations — there is no process-wide mutable state.
//!
//! ## Loading order
//!
//! 1. `LIFTOPT_CONFIG` environment variable (path to TOML file)
//! 2. `liftopt.toml` in the current working directory
//! 3. Built-in defaults

pub mod defaults;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Root configuration for the optimization core.
///
/// Load with [`OptimizerConfig::load`], or use `OptimizerConfig::default()`
/// in tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// ESP frequency optimizer constraints
    #[serde(default)]
    pub esp: EspConfig,

    /// PCP speed optimizer constraints
    #[serde(default)]
    pub pcp: PcpConfig,

    /// Rod pump optimizer constraints
    #[serde(default)]
    pub rod_pump: RodPumpConfig,

    /// Gas lift field allocator constraints
    #[serde(default)]
    pub gas_lift: GasLiftConfig,

    /// Recommendation lifecycle settings
    #[serde(default)]
    pub recommendation: RecommendationConfig,
}

impl OptimizerConfig {
    /// Load configuration from the standard search path.
    ///
    /// Parse failures fall back to defaults with a warning — a malformed
    /// config file must not take the optimization core down.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("LIFTOPT_CONFIG") {
            return Self::load_from(Path::new(&path));
        }
        let cwd_path = PathBuf::from("liftopt.toml");
        if cwd_path.exists() {
            return Self::load_from(&cwd_path);
        }
        info!("no config file found, using built-in defaults");
        Self::default()
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Self {
        match Self::read(path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded optimizer config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{e:#}"), "config load failed, using defaults");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }
}

/// ESP frequency optimizer constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EspConfig {
    /// Minimum VSD frequency (Hz)
    pub min_frequency_hz: f64,
    /// Maximum VSD frequency (Hz)
    pub max_frequency_hz: f64,
    /// Target motor load (% of nameplate)
    pub target_motor_load_pct: f64,
    /// Maximum motor temperature (°F)
    pub max_motor_temp_f: f64,
    /// Minimum frequency change worth recommending (Hz)
    pub min_frequency_change_hz: f64,
}

impl Default for EspConfig {
    fn default() -> Self {
        Self {
            min_frequency_hz: defaults::ESP_MIN_FREQUENCY_HZ,
            max_frequency_hz: defaults::ESP_MAX_FREQUENCY_HZ,
            target_motor_load_pct: defaults::ESP_TARGET_MOTOR_LOAD_PCT,
            max_motor_temp_f: defaults::ESP_MAX_MOTOR_TEMP_F,
            min_frequency_change_hz: defaults::ESP_MIN_FREQUENCY_CHANGE_HZ,
        }
    }
}

/// PCP speed optimizer constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PcpConfig {
    /// Minimum drive speed (RPM)
    pub min_rpm: f64,
    /// Maximum drive speed (RPM)
    pub max_rpm: f64,
    /// Target drive torque (% of rated)
    pub target_torque_pct: f64,
    /// Maximum drive torque (% of rated)
    pub max_torque_pct: f64,
    /// Maximum rod string load (lbs)
    pub max_rod_load_lbs: f64,
    /// Minimum RPM change worth recommending
    pub min_rpm_change: f64,
}

impl Default for PcpConfig {
    fn default() -> Self {
        Self {
            min_rpm: defaults::PCP_MIN_RPM,
            max_rpm: defaults::PCP_MAX_RPM,
            target_torque_pct: defaults::PCP_TARGET_TORQUE_PCT,
            max_torque_pct: defaults::PCP_MAX_TORQUE_PCT,
            max_rod_load_lbs: defaults::PCP_MAX_ROD_LOAD_LBS,
            min_rpm_change: defaults::PCP_MIN_RPM_CHANGE,
        }
    }
}

/// Rod pump optimizer constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RodPumpConfig {
    /// Minimum pumping speed (SPM)
    pub min_spm: f64,
    /// Maximum pumping speed (SPM)
    pub max_spm: f64,
    /// Target pump fillage (%)
    pub target_fillage_pct: f64,
    /// Minimum acceptable fillage (%)
    pub min_fillage_pct: f64,
    /// Maximum peak polished rod load (lbs)
    pub max_peak_load_lbs: f64,
    /// Maximum rod stress (psi)
    pub max_rod_stress_psi: f64,
    /// Optimal counterbalance band lower bound (%)
    pub counterbalance_low_pct: f64,
    /// Optimal counterbalance band upper bound (%)
    pub counterbalance_high_pct: f64,
    /// Minimum SPM change worth recommending
    pub min_spm_change: f64,
}

impl Default for RodPumpConfig {
    fn default() -> Self {
        Self {
            min_spm: defaults::ROD_PUMP_MIN_SPM,
            max_spm: defaults::ROD_PUMP_MAX_SPM,
            target_fillage_pct: defaults::ROD_PUMP_TARGET_FILLAGE_PCT,
            min_fillage_pct: defaults::ROD_PUMP_MIN_FILLAGE_PCT,
            max_peak_load_lbs: defaults::ROD_PUMP_MAX_PEAK_LOAD_LBS,
            max_rod_stress_psi: defaults::ROD_PUMP_MAX_ROD_STRESS_PSI,
            counterbalance_low_pct: defaults::ROD_PUMP_COUNTERBALANCE_LOW_PCT,
            counterbalance_high_pct: defaults::ROD_PUMP_COUNTERBALANCE_HIGH_PCT,
            min_spm_change: defaults::ROD_PUMP_MIN_SPM_CHANGE,
        }
    }
}

/// Gas lift field allocator constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GasLiftConfig {
    /// Cap on the total field injection budget (MSCF/day)
    pub max_total_gas_mscfd: f64,
    /// Global minimum injection per well (MSCF/day)
    pub min_gas_per_well_mscfd: f64,
    /// Global maximum injection per well (MSCF/day)
    pub max_gas_per_well_mscfd: f64,
    /// Greedy growth-phase increment (MSCF/day)
    pub increment_mscfd: f64,
    /// Minimum relative gas-rate change for a per-well recommendation (%)
    pub min_change_pct: f64,
}

impl Default for GasLiftConfig {
    fn default() -> Self {
        Self {
            max_total_gas_mscfd: defaults::GAS_LIFT_MAX_TOTAL_GAS_MSCFD,
            min_gas_per_well_mscfd: defaults::GAS_LIFT_MIN_GAS_PER_WELL_MSCFD,
            max_gas_per_well_mscfd: defaults::GAS_LIFT_MAX_GAS_PER_WELL_MSCFD,
            increment_mscfd: defaults::GAS_LIFT_INCREMENT_MSCFD,
            min_change_pct: defaults::GAS_LIFT_MIN_CHANGE_PCT,
        }
    }
}

/// Recommendation lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Whether pending recommendations expire automatically
    pub auto_expiry: bool,
    /// Hours after which a pending recommendation expires
    pub expiry_hours: u64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            auto_expiry: true,
            expiry_hours: defaults::RECOMMENDATION_EXPIRY_HOURS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = OptimizerConfig::default();
        assert_eq!(config.esp.max_frequency_hz, 60.0);
        assert_eq!(config.esp.min_frequency_change_hz, 1.0);
        assert_eq!(config.pcp.max_rpm, 500.0);
        assert_eq!(config.rod_pump.target_fillage_pct, 85.0);
        assert_eq!(config.gas_lift.increment_mscfd, 50.0);
        assert!(config.recommendation.auto_expiry);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let toml_str = r#"
[esp]
max_frequency_hz = 65.0

[gas_lift]
max_total_gas_mscfd = 5000.0
"#;
        let config: OptimizerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.esp.max_frequency_hz, 65.0);
        // Untouched keys keep their defaults
        assert_eq!(config.esp.min_frequency_hz, 30.0);
        assert_eq!(config.gas_lift.max_total_gas_mscfd, 5000.0);
        assert_eq!(config.gas_lift.min_gas_per_well_mscfd, 50.0);
        assert_eq!(config.rod_pump.max_spm, 15.0);
    }
}
