//! Sea-state signals from the Open-Meteo Marine API
//!
//! Current significant wave height at the query point:
//! - ≥ 4.0 m → High / "Storm"
//! - ≥ 2.5 m → Medium / "Weather"
//!
//! Inland points have no marine data; the API reports a null wave height
//! and the adapter produces no signal.

use async_trait::async_trait;
use hazard_scoring::{RawSignal, SeverityClass};
use serde::{Deserialize, Serialize};

use crate::adapter::{get_body, http_client, SourceAdapter};
use crate::{Result, SourceError};

pub const SOURCE_NAME: &str = "Open-Meteo Marine API";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarineConfig {
    pub base_url: String,
    pub timeout_sec: u64,
    /// Wave height (m) for a high surf warning
    pub high_surf_m: f64,
    /// Wave height (m) for a rough sea advisory
    pub rough_sea_m: f64,
}

impl Default for MarineConfig {
    fn default() -> Self {
        Self {
            base_url: "https://marine-api.open-meteo.com/v1/marine".to_string(),
            timeout_sec: 5,
            high_surf_m: 4.0,
            rough_sea_m: 2.5,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MarineResponse {
    current: Option<MarineCurrent>,
}

#[derive(Debug, Deserialize)]
struct MarineCurrent {
    wave_height: Option<f64>,
}

pub struct MarineAdapter {
    config: MarineConfig,
    client: reqwest::Client,
}

impl MarineAdapter {
    pub fn open_meteo() -> Result<Self> {
        Self::new(MarineConfig::default())
    }

    pub fn new(config: MarineConfig) -> Result<Self> {
        let client = http_client(config.timeout_sec)?;
        Ok(Self { config, client })
    }

    fn url(&self, lat: f64, lon: f64) -> String {
        format!(
            "{}?latitude={:.6}&longitude={:.6}&current=wave_height",
            self.config.base_url, lat, lon
        )
    }
}

/// Wave height in metres, `None` when the point has no sea state
pub fn parse_wave_height(body: &str) -> Result<Option<f64>> {
    let data: MarineResponse = serde_json::from_str(body)?;
    let current = data
        .current
        .ok_or_else(|| SourceError::Malformed(SOURCE_NAME.to_string(), "missing current block".into()))?;
    Ok(current.wave_height.filter(|h| h.is_finite()))
}

pub fn wave_signal(height_m: f64, config: &MarineConfig) -> Option<RawSignal> {
    let (title, message, severity, hazard) = if height_m >= config.high_surf_m {
        (
            "High Surf Warning",
            format!("Waves of {:.1} m offshore. Stay off beaches and jetties.", height_m),
            SeverityClass::High,
            "Storm",
        )
    } else if height_m >= config.rough_sea_m {
        (
            "Rough Sea Advisory",
            format!("Waves of {:.1} m offshore. Small craft should remain in harbour.", height_m),
            SeverityClass::Medium,
            "Weather",
        )
    } else {
        return None;
    };

    Some(RawSignal {
        title: title.to_string(),
        message,
        severity,
        hazard_type: hazard.to_string(),
        source_name: SOURCE_NAME.to_string(),
        place: None,
        lat: None,
        lon: None,
    })
}

#[async_trait]
impl SourceAdapter for MarineAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn try_fetch(&self, lat: f64, lon: f64) -> Result<Vec<RawSignal>> {
        let body = get_body(&self.client, &self.url(lat, lon), SOURCE_NAME).await?;
        let signals = parse_wave_height(&body)?
            .and_then(|h| wave_signal(h, &self.config))
            .into_iter()
            .collect();
        Ok(signals)
    }
}
