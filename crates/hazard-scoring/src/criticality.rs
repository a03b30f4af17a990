//! Hazard-type criticality index lookup

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index for hazard types missing from the table
pub const DEFAULT_CRITICALITY: u8 = 30;

/// Static domain-importance weights per hazard type (0-100)
///
/// Lookups ignore ASCII case, so "pollution" and "Pollution" share a weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticalityTable {
    pub weights: BTreeMap<String, u8>,
    pub default_index: u8,
}

impl Default for CriticalityTable {
    fn default() -> Self {
        let weights = [("Pollution", 90), ("Cyclone", 40), ("Weather", 50), ("Illegal", 80)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        Self {
            weights,
            default_index: DEFAULT_CRITICALITY,
        }
    }
}

impl CriticalityTable {
    pub fn estimate(&self, hazard_type: &str) -> u8 {
        let hazard_type = hazard_type.trim();
        self.weights
            .get(hazard_type)
            .or_else(|| {
                self.weights
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(hazard_type))
                    .map(|(_, v)| v)
            })
            .copied()
            .unwrap_or(self.default_index)
            .min(100)
    }
}
