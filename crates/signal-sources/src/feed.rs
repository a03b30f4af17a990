//! Feed orchestration: ranked by location, or severity-only without one

use hazard_scoring::ranking::sort_by_severity;
use hazard_scoring::{Alert, RankedAlert, RankingEngine};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::info;

use crate::aggregator::Aggregator;

/// Default search radius in km
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedQuery {
    /// (lat, lon) of the user; `None` selects the severity-only fallback
    pub location: Option<(f64, f64)>,
    pub radius_km: f64,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            location: None,
            radius_km: DEFAULT_RADIUS_KM,
        }
    }
}

impl FeedQuery {
    pub fn near(lat: f64, lon: f64, radius_km: f64) -> Self {
        Self {
            location: Some((lat, lon)),
            radius_km,
        }
    }
}

/// Feed result in either mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "alerts", rename_all = "snake_case")]
pub enum Feed {
    /// Priority order, radius-filtered
    Ranked(Vec<RankedAlert>),
    /// High, then Medium, then Low; no distance or criticality computed
    SeverityOnly(Vec<Alert>),
}

impl Feed {
    pub fn len(&self) -> usize {
        match self {
            Self::Ranked(a) => a.len(),
            Self::SeverityOnly(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct HazardFeed {
    aggregator: Aggregator,
    engine: RankingEngine,
}

impl HazardFeed {
    pub fn new(aggregator: Aggregator, engine: RankingEngine) -> Self {
        Self { aggregator, engine }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub async fn build(&self, query: &FeedQuery) -> Feed {
        match query.location {
            Some((lat, lon)) => {
                let alerts = self.aggregator.aggregate(lat, lon).await;
                self.ranked(alerts, lat, lon, query.radius_km)
            }
            None => self.severity_only(),
        }
    }

    /// Build the feed, discarding adapter results that miss `deadline`
    pub async fn build_until(&self, query: &FeedQuery, deadline: Instant) -> Feed {
        match query.location {
            Some((lat, lon)) => {
                let alerts = self.aggregator.aggregate_until(lat, lon, deadline).await;
                self.ranked(alerts, lat, lon, query.radius_km)
            }
            None => self.severity_only(),
        }
    }

    fn ranked(&self, alerts: Vec<Alert>, lat: f64, lon: f64, radius_km: f64) -> Feed {
        let ranked = self.engine.rank(alerts, lat, lon, radius_km);
        info!("Ranked feed: {} alerts within {:.1}km", ranked.len(), radius_km);
        Feed::Ranked(ranked)
    }

    // adapters need a query point, so only persisted alerts are available
    fn severity_only(&self) -> Feed {
        let alerts = sort_by_severity(self.aggregator.persisted_alerts());
        info!("Severity-only feed: {} alerts", alerts.len());
        Feed::SeverityOnly(alerts)
    }
}
