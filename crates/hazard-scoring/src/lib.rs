//! Hazard Scoring Core
//!
//! Classifies free-text incident reports and aid requests, estimates hazard
//! criticality, and ranks unified alerts for a query location.
//!
//! # Priority Model (3-Factor)
//!
//! ```text
//! Priority(a) = 0.3·S + P(d) + 0.1·C
//! P(d)        = max(0, 60·(1 − d/500))
//! ```
//!
//! | Factor | Range  | Description |
//! |--------|--------|-------------|
//! | S      | 20-100 | Severity weight (High 100, Medium 60, Low 20) |
//! | P(d)   | 0-60   | Proximity, linear decay to zero at 500 km |
//! | C      | 0-100  | Criticality index of the hazard type |
//!
//! Everything here is deterministic and free of shared mutable state. The
//! heuristic tables (keywords, criticality weights) are loaded once through
//! [`HeuristicConfig`] and injected into [`TextClassifier`] and
//! [`RankingEngine`].

use thiserror::Error;

pub mod aid;
pub mod classifier;
pub mod config;
pub mod criticality;
pub mod dedup;
pub mod geo;
pub mod model;
pub mod ranking;
pub mod reports;
pub mod trends;

pub use classifier::{HazardKeywords, TextClassifier, UrgencyTier, UrgencyTiers};
pub use config::HeuristicConfig;
pub use criticality::CriticalityTable;
pub use dedup::DedupConfig;
pub use geo::haversine_km;
pub use model::{
    AidRequest, AidStatus, Alert, IncidentReport, RankedAlert, RawSignal, ReportStatus,
    SeverityClass, UrgencyClass,
};
pub use ranking::{RankingConfig, RankingEngine};

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
