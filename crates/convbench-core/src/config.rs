use serde::{Deserialize, Serialize};

/// Tuning for the source-side unit-count heuristic.
///
/// Source documents carry no reliable pagination without a full layout
/// pass, so the expected unit count is estimated from content volume. The
/// defaults (one unit per 500 extracted characters, ±1 tolerance) are
/// rough proxies; calibrate them against real documents rather than
/// trusting them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Characters of extracted text per estimated unit.
    pub chars_per_unit: usize,
    /// Maximum |expected - actual| for the unit-count check to pass.
    pub unit_tolerance: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            chars_per_unit: 500,
            unit_tolerance: 1,
        }
    }
}
