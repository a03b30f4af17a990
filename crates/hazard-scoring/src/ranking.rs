//! Alert priority ranking
//!
//! Implements the 3-factor priority model:
//! Priority(a) = w_S·S + P(d) + w_C·C
//!
//! Proximity dominates by design of the weights: a nearby Low alert can
//! outrank a distant High one.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::criticality::CriticalityTable;
use crate::geo::haversine_km;
use crate::model::{Alert, RankedAlert, SeverityClass};

/// Scoring weights (9 decimal precision)
pub const W_SEVERITY: f64 = 0.300000000;
pub const W_CRITICALITY: f64 = 0.100000000;

/// Proximity score at zero distance
pub const PROXIMITY_MAX: f64 = 60.000000000;

/// Distance at which the proximity score reaches zero (km)
pub const PROXIMITY_HORIZON_KM: f64 = 500.000000000;

/// Severity weights on the 0-100 scale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityWeights {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            high: 100.000000000,
            medium: 60.000000000,
            low: 20.000000000,
        }
    }
}

impl SeverityWeights {
    pub fn weight(&self, class: SeverityClass) -> f64 {
        match class {
            SeverityClass::High => self.high,
            SeverityClass::Medium => self.medium,
            SeverityClass::Low => self.low,
        }
    }
}

/// Ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Multiplier on the severity weight (S)
    pub w_severity: f64,
    /// Multiplier on the criticality index (C)
    pub w_criticality: f64,
    /// Proximity score at 0 km
    pub proximity_max: f64,
    /// Distance where proximity decays to 0
    pub proximity_horizon_km: f64,
    pub severity_weights: SeverityWeights,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            w_severity: W_SEVERITY,
            w_criticality: W_CRITICALITY,
            proximity_max: PROXIMITY_MAX,
            proximity_horizon_km: PROXIMITY_HORIZON_KM,
            severity_weights: SeverityWeights::default(),
        }
    }
}

/// Stateless ranking over an injected criticality table
#[derive(Debug, Clone, Default)]
pub struct RankingEngine {
    config: RankingConfig,
    criticality: CriticalityTable,
}

impl RankingEngine {
    pub fn new(config: RankingConfig, criticality: CriticalityTable) -> Self {
        Self { config, criticality }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Linear proximity decay, clamped at zero
    pub fn proximity_score(&self, distance_km: f64) -> f64 {
        (self.config.proximity_max * (1.000000000 - distance_km / self.config.proximity_horizon_km))
            .max(0.000000000)
    }

    /// Score a single alert relative to the user location
    pub fn score(&self, alert: Alert, user_lat: f64, user_lon: f64) -> RankedAlert {
        let distance_km = haversine_km(user_lat, user_lon, alert.lat, alert.lon);
        let proximity = self.proximity_score(distance_km);
        let severity = self.config.severity_weights.weight(alert.severity);
        let criticality_index = self.criticality.estimate(&alert.hazard_type);

        let priority_score = self.config.w_severity * severity
            + proximity
            + self.config.w_criticality * criticality_index as f64;

        debug!(
            "Scored {}: {:.2} (dist={:.1}km, prox={:.2}, sev={:.0}, crit={})",
            alert.id, priority_score, distance_km, proximity, severity, criticality_index
        );

        RankedAlert {
            alert,
            distance_km,
            criticality_index,
            priority_score,
        }
    }

    /// Score, radius-filter and sort alerts by priority descending
    ///
    /// The sort is stable, so equal scores keep their input order.
    pub fn rank(
        &self,
        alerts: Vec<Alert>,
        user_lat: f64,
        user_lon: f64,
        radius_km: f64,
    ) -> Vec<RankedAlert> {
        let total = alerts.len();

        let mut ranked: Vec<RankedAlert> = alerts
            .into_iter()
            .map(|a| self.score(a, user_lat, user_lon))
            .filter(|r| r.distance_km <= radius_km)
            .collect();

        ranked.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));

        debug!(
            "Ranked {} of {} alerts within {:.1}km",
            ranked.len(),
            total,
            radius_km
        );

        ranked
    }
}

/// Order alerts by severity class only (High, Medium, Low), stable within a class
///
/// Used when no user location is available.
pub fn sort_by_severity(mut alerts: Vec<Alert>) -> Vec<Alert> {
    alerts.sort_by_key(|a| a.severity.rank());
    alerts
}

/// Export a ranked feed to GeoJSON
pub fn to_geojson(ranked: &[RankedAlert]) -> serde_json::Value {
    let features: Vec<serde_json::Value> = ranked
        .iter()
        .map(|r| {
            serde_json::json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [r.alert.lon, r.alert.lat]
                },
                "properties": {
                    "id": r.alert.id,
                    "location": r.alert.location,
                    "title": r.alert.title,
                    "severity": r.alert.severity,
                    "hazard_type": r.alert.hazard_type,
                    "source": r.alert.source,
                    "distance_km": r.distance_km,
                    "criticality_index": r.criticality_index,
                    "priority_score": r.priority_score
                }
            })
        })
        .collect();

    serde_json::json!({
        "type": "FeatureCollection",
        "features": features
    })
}
