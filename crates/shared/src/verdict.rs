//! Mapping of check results to the pass/warn/fail signal shown to the operator.

use crate::domain::{CgResult, DrcResult, Verdict};

pub const CG_GREEN_BELOW_MM: f64 = 1.0;
pub const CG_YELLOW_BELOW_MM: f64 = 5.0;

/// Each band is closed below and open above: 1.0 is yellow, 5.0 is red.
pub fn cg_verdict(delta_mm: f64) -> Verdict {
    if delta_mm < CG_GREEN_BELOW_MM {
        Verdict::Green
    } else if delta_mm < CG_YELLOW_BELOW_MM {
        Verdict::Yellow
    } else {
        Verdict::Red
    }
}

/// Any violation is a warning; DRC never fails a turn outright.
pub fn drc_verdict(result: &DrcResult) -> Verdict {
    if result.violations.is_empty() {
        Verdict::Green
    } else {
        Verdict::Yellow
    }
}

/// Distance in millimetres of a mass centre given in metres from the origin.
pub fn mass_center_delta_mm(center_m: [f64; 3]) -> f64 {
    let [x, y, z] = center_m.map(|axis| axis * 1000.0);
    (x * x + y * y + z * z).sqrt()
}

impl CgResult {
    pub fn from_delta(delta_mm: f64) -> Self {
        let delta_mm = delta_mm.abs();
        Self {
            ok: delta_mm < CG_GREEN_BELOW_MM,
            delta_mm,
            verdict: cg_verdict(delta_mm),
        }
    }
}
