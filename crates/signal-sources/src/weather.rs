//! Wind hazard signals from Open-Meteo (free, no API key)
//!
//! Current 10 m wind speed at the query point is bucketed:
//! - ≥ 60 km/h → High / "Cyclone"
//! - ≥ 40 km/h → Medium / "Weather"
//! - below 40 km/h → no signal

use async_trait::async_trait;
use hazard_scoring::{RawSignal, SeverityClass};
use serde::{Deserialize, Serialize};

use crate::adapter::{get_body, http_client, SourceAdapter};
use crate::{Result, SourceError};

pub const SOURCE_NAME: &str = "Open-Meteo Weather API";

/// Weather adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub base_url: String,
    /// HTTP timeout in seconds
    pub timeout_sec: u64,
    /// Wind speed (km/h) at or above which a gale warning is raised
    pub gale_kmh: f64,
    /// Wind speed (km/h) at or above which an advisory is raised
    pub advisory_kmh: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            timeout_sec: 5,
            gale_kmh: 60.0,
            advisory_kmh: 40.0,
        }
    }
}

/// Open-Meteo response structure
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    current_weather: Option<OpenMeteoCurrentWeather>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrentWeather {
    /// km/h
    windspeed: Option<f64>,
}

pub struct WeatherAdapter {
    config: WeatherConfig,
    client: reqwest::Client,
}

impl WeatherAdapter {
    pub fn open_meteo() -> Result<Self> {
        Self::new(WeatherConfig::default())
    }

    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = http_client(config.timeout_sec)?;
        Ok(Self { config, client })
    }

    fn url(&self, lat: f64, lon: f64) -> String {
        format!(
            "{}?latitude={:.6}&longitude={:.6}&current_weather=true&timezone=auto",
            self.config.base_url, lat, lon
        )
    }
}

/// Extract the current wind speed (km/h) from an Open-Meteo body
pub fn parse_wind_speed(body: &str) -> Result<f64> {
    let data: OpenMeteoResponse = serde_json::from_str(body)?;
    data.current_weather
        .and_then(|c| c.windspeed)
        .filter(|w| w.is_finite())
        .ok_or_else(|| SourceError::Malformed(SOURCE_NAME.to_string(), "missing current_weather.windspeed".into()))
}

/// Apply wind thresholds; `None` below the advisory threshold
pub fn wind_signal(wind_kmh: f64, config: &WeatherConfig) -> Option<RawSignal> {
    let (title, message, severity, hazard) = if wind_kmh >= config.gale_kmh {
        (
            "Severe Gale Warning",
            format!("Dangerous wind speeds of {:.1} km/h detected. Avoid coastal areas.", wind_kmh),
            SeverityClass::High,
            "Cyclone",
        )
    } else if wind_kmh >= config.advisory_kmh {
        (
            "Strong Wind Advisory",
            format!("High winds of {:.1} km/h. Small vessels should stay in port.", wind_kmh),
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
impl SourceAdapter for WeatherAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn try_fetch(&self, lat: f64, lon: f64) -> Result<Vec<RawSignal>> {
        let body = get_body(&self.client, &self.url(lat, lon), SOURCE_NAME).await?;
        let wind_kmh = parse_wind_speed(&body)?;
        Ok(wind_signal(wind_kmh, &self.config).into_iter().collect())
    }
}
