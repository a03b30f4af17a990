//! Optional cross-source deduplication
//!
//! Off by default: two sources reporting the same event produce two alerts
//! unless a caller opts in. Alerts sharing a hazard type, rounded coordinates
//! and creation-time bucket collapse to the first one seen.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use crate::model::Alert;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Decimal places kept when rounding coordinates (default 1 ≈ 11 km)
    pub coord_decimals: u32,
    /// Width of the creation-time bucket in minutes
    pub time_bucket_minutes: i64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            coord_decimals: 1,
            time_bucket_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupKey {
    hazard_type: String,
    lat: i64,
    lon: i64,
    bucket: i64,
}

impl DedupConfig {
    fn key(&self, alert: &Alert) -> DedupKey {
        let scale = 10f64.powi(self.coord_decimals as i32);
        let bucket_secs = self.time_bucket_minutes.max(1) * 60;

        DedupKey {
            hazard_type: alert.hazard_type.trim().to_ascii_lowercase(),
            lat: (alert.lat * scale).round() as i64,
            lon: (alert.lon * scale).round() as i64,
            bucket: alert.created_at.timestamp().div_euclid(bucket_secs),
        }
    }
}

/// Drop later alerts whose dedup key was already seen, preserving order
pub fn deduplicate(alerts: Vec<Alert>, config: &DedupConfig) -> Vec<Alert> {
    let before = alerts.len();
    let mut seen: HashSet<DedupKey> = HashSet::with_capacity(before);

    let unique: Vec<Alert> = alerts
        .into_iter()
        .filter(|a| seen.insert(config.key(a)))
        .collect();

    info!(
        "Deduplicated: {} merged, {} unique alerts",
        before - unique.len(),
        unique.len()
    );

    unique
}
