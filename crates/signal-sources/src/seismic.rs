//! Earthquake signals from the USGS real-time GeoJSON feed
//!
//! Events within the search radius are graded by magnitude:
//! - > 6.0 → High
//! - > 4.5 → Medium
//! - otherwise Low
//!
//! An event above magnitude 6.5 that is also within 200 km of the query
//! point is reported as a "Tsunami" hazard instead of "Earthquake".

use async_trait::async_trait;
use hazard_scoring::{haversine_km, RawSignal, SeverityClass};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::{get_body, http_client, SourceAdapter};
use crate::Result;

pub const SOURCE_NAME: &str = "USGS Real-time Feed";

/// Seismic adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeismicConfig {
    /// M2.5+ events over the past day
    pub feed_url: String,
    /// HTTP timeout in seconds
    pub timeout_sec: u64,
    /// Ignore events farther than this from the query point (km)
    pub search_radius_km: f64,
    /// Keep at most this many events, nearest first
    pub max_results: usize,
    pub high_magnitude: f64,
    pub medium_magnitude: f64,
    pub tsunami_magnitude: f64,
    pub tsunami_radius_km: f64,
}

impl Default for SeismicConfig {
    fn default() -> Self {
        Self {
            feed_url: "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/2.5_day.geojson"
                .to_string(),
            timeout_sec: 5,
            search_radius_km: 1000.0,
            max_results: 5,
            high_magnitude: 6.0,
            medium_magnitude: 4.5,
            tsunami_magnitude: 6.5,
            tsunami_radius_km: 200.0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UsgsFeed {
    #[serde(default)]
    features: Vec<UsgsFeature>,
}

#[derive(Debug, Deserialize)]
struct UsgsFeature {
    properties: UsgsProperties,
    geometry: Option<UsgsGeometry>,
}

#[derive(Debug, Deserialize)]
struct UsgsProperties {
    mag: Option<f64>,
    place: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsgsGeometry {
    /// lon, lat, depth
    coordinates: Vec<f64>,
}

pub struct SeismicAdapter {
    config: SeismicConfig,
    client: reqwest::Client,
}

impl SeismicAdapter {
    pub fn usgs() -> Result<Self> {
        Self::new(SeismicConfig::default())
    }

    pub fn new(config: SeismicConfig) -> Result<Self> {
        let client = http_client(config.timeout_sec)?;
        Ok(Self { config, client })
    }
}

/// Grade a single event relative to the query point
pub fn quake_signal(
    magnitude: f64,
    place: &str,
    quake_lat: f64,
    quake_lon: f64,
    distance_km: f64,
    config: &SeismicConfig,
) -> RawSignal {
    let severity = if magnitude > config.high_magnitude {
        SeverityClass::High
    } else if magnitude > config.medium_magnitude {
        SeverityClass::Medium
    } else {
        SeverityClass::Low
    };

    let hazard = if magnitude > config.tsunami_magnitude && distance_km < config.tsunami_radius_km {
        "Tsunami"
    } else {
        "Earthquake"
    };

    RawSignal {
        title: format!("Earthquake - Magnitude {:.1}", magnitude),
        message: format!("Detected {}. Distance: {}km.", place, distance_km as i64),
        severity,
        hazard_type: hazard.to_string(),
        source_name: SOURCE_NAME.to_string(),
        place: Some(place.to_string()),
        lat: Some(quake_lat),
        lon: Some(quake_lon),
    }
}

/// Parse a USGS GeoJSON body into signals near the query point
pub fn parse_feed(body: &str, lat: f64, lon: f64, config: &SeismicConfig) -> Result<Vec<RawSignal>> {
    let feed: UsgsFeed = serde_json::from_str(body)?;
    let total = feed.features.len();

    let mut nearby: Vec<(f64, RawSignal)> = feed
        .features
        .into_iter()
        .filter_map(|f| {
            let coords = f.geometry?.coordinates;
            if coords.len() < 2 {
                return None;
            }
            let (quake_lon, quake_lat) = (coords[0], coords[1]);
            let distance = haversine_km(lat, lon, quake_lat, quake_lon);
            if !(distance < config.search_radius_km) {
                return None;
            }
            let magnitude = f.properties.mag.unwrap_or(0.0);
            let place = f.properties.place.unwrap_or_else(|| "Unknown".to_string());
            Some((distance, quake_signal(magnitude, &place, quake_lat, quake_lon, distance, config)))
        })
        .collect();

    nearby.sort_by(|a, b| a.0.total_cmp(&b.0));
    nearby.truncate(config.max_results);

    debug!(
        "USGS feed: {} events, {} within {:.0}km",
        total,
        nearby.len(),
        config.search_radius_km
    );

    Ok(nearby.into_iter().map(|(_, s)| s).collect())
}

#[async_trait]
impl SourceAdapter for SeismicAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn try_fetch(&self, lat: f64, lon: f64) -> Result<Vec<RawSignal>> {
        let body = get_body(&self.client, &self.config.feed_url, SOURCE_NAME).await?;
        parse_feed(&body, lat, lon, &self.config)
    }
}
