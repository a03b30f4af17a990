//! Heuristic tables loaded once at process start

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

use crate::classifier::{HazardKeywords, TextClassifier, UrgencyTiers};
use crate::criticality::CriticalityTable;
use crate::ranking::{RankingConfig, RankingEngine};
use crate::Result;

/// Keyword tiers, urgency tiers and criticality weights
///
/// Every section falls back to its built-in default, so a file only needs
/// the tables it overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub hazard_keywords: HazardKeywords,
    pub urgency_tiers: UrgencyTiers,
    pub criticality: CriticalityTable,
}

impl HeuristicConfig {
    /// Load heuristic tables from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading heuristic tables from {:?}", path);

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: HeuristicConfig = serde_json::from_reader(reader)?;

        info!(
            "Loaded {} urgency tiers, {} criticality weights",
            config.urgency_tiers.tiers.len(),
            config.criticality.weights.len()
        );

        Ok(config)
    }

    pub fn classifier(&self) -> TextClassifier {
        TextClassifier::new(self.hazard_keywords.clone(), self.urgency_tiers.clone())
    }

    pub fn ranking_engine(&self, ranking: RankingConfig) -> RankingEngine {
        RankingEngine::new(ranking, self.criticality.clone())
    }
}
