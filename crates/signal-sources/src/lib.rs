//! Signal Sources
//!
//! Live hazard feeds and persisted alerts merged into one alert set:
//!
//! - Source adapters (Open-Meteo weather, USGS seismic, Open-Meteo marine),
//!   each independently failable and bounded by a timeout
//! - Persisted-store reader (in-memory and JSON file implementations)
//! - Aggregator fanning out over adapters and joining their results
//! - Feed orchestrator choosing between ranked and severity-only output
//!
//! A failing or slow source never fails the feed; it contributes nothing.

use std::time::Duration;
use thiserror::Error;

pub mod adapter;
pub mod aggregator;
pub mod feed;
pub mod marine;
pub mod seismic;
pub mod store;
pub mod weather;

pub use adapter::SourceAdapter;
pub use aggregator::{Aggregator, AggregatorConfig};
pub use feed::{Feed, FeedQuery, HazardFeed};
pub use marine::{MarineAdapter, MarineConfig};
pub use seismic::{SeismicAdapter, SeismicConfig};
pub use store::{AlertStore, InMemoryStore, JsonFileStore};
pub use weather::{WeatherAdapter, WeatherConfig};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{provider} returned status: {status}")]
    Status { provider: String, status: u16 },
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Malformed response from {0}: {1}")]
    Malformed(String, String),
    #[error("{0} timed out after {1:?}")]
    Timeout(String, Duration),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store error: {0}")]
    Store(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, SourceError>;
