//! Field-level gas lift allocation results.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One well's share of the field injection budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellAllocation {
    pub well_id: Uuid,
    pub well_name: String,
    /// Current injection rate (MSCF/day)
    pub current_gas_mscfd: f64,
    /// Allocated injection rate (MSCF/day)
    pub recommended_gas_mscfd: f64,
    /// `recommended - current` (MSCF/day)
    pub gas_change_mscfd: f64,
    pub current_production_bpd: f64,
    pub expected_production_bpd: f64,
    /// `expected - current` (BPD), floored at zero in projections
    pub production_increase_bpd: f64,
    /// Incremental BPD per incremental MSCF/day at current conditions
    pub marginal_oil_rate: f64,
    pub gas_oil_ratio: f64,
    /// 1 = best marginal responder
    pub priority_rank: usize,
    /// Allocation at or below the well's effective minimum
    pub at_minimum: bool,
    /// Allocation at or above the well's effective maximum
    pub at_maximum: bool,
}

impl WellAllocation {
    /// Relative gas-rate change (%). A well currently at zero injection is
    /// treated as a 100% change when gas is added.
    pub fn gas_change_pct(&self) -> f64 {
        if self.current_gas_mscfd == 0.0 {
            if self.gas_change_mscfd == 0.0 {
                0.0
            } else {
                100.0
            }
        } else {
            (self.gas_change_mscfd / self.current_gas_mscfd).abs() * 100.0
        }
    }
}

/// Result of one field-wide gas lift allocation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAllocationResult {
    pub field_id: Uuid,
    pub field_name: String,
    /// Budget after the configured cap (MSCF/day)
    pub total_available_gas_mscfd: f64,
    pub current_total_gas_mscfd: f64,
    pub optimized_total_gas_mscfd: f64,
    pub current_total_production_bpd: f64,
    pub expected_total_production_bpd: f64,
    pub production_increase_bpd: f64,
    pub production_increase_pct: f64,
    /// Field-wide production-per-gas improvement (%)
    pub efficiency_improvement_pct: f64,
    /// One entry per well, sorted by priority rank
    pub allocations: Vec<WellAllocation>,
    pub confidence: f64,
    pub timestamp_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_allocation(current: f64, change: f64) -> WellAllocation {
        WellAllocation {
            well_id: Uuid::new_v4(),
            well_name: "W-1".into(),
            current_gas_mscfd: current,
            recommended_gas_mscfd: current + change,
            gas_change_mscfd: change,
            current_production_bpd: 200.0,
            expected_production_bpd: 210.0,
            production_increase_bpd: 10.0,
            marginal_oil_rate: 0.2,
            gas_oil_ratio: 800.0,
            priority_rank: 1,
            at_minimum: false,
            at_maximum: false,
        }
    }

    #[test]
    fn gas_change_pct_handles_zero_baseline() {
        assert_eq!(make_allocation(0.0, 150.0).gas_change_pct(), 100.0);
        assert_eq!(make_allocation(0.0, 0.0).gas_change_pct(), 0.0);
        let a = make_allocation(500.0, -50.0);
        assert!((a.gas_change_pct() - 10.0).abs() < 1e-9);
    }
}
