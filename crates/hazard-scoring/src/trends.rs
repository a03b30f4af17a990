//! Hazard category distribution for dashboard charts

use serde::{Deserialize, Serialize};

use crate::model::Alert;

/// Alert counts grouped into chart categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardDistribution {
    pub flood: usize,
    pub pollution: usize,
    pub erosion: usize,
    pub other: usize,
}

impl HazardDistribution {
    pub fn from_alerts<'a>(alerts: impl IntoIterator<Item = &'a Alert>) -> Self {
        let mut dist = Self::default();
        for alert in alerts {
            match alert.hazard_type.trim().to_ascii_lowercase().as_str() {
                // storm-driven risk is charted with flooding
                "weather" | "storm" | "cyclone" | "flood" => dist.flood += 1,
                "pollution" | "oil spill" => dist.pollution += 1,
                "erosion" => dist.erosion += 1,
                _ => dist.other += 1,
            }
        }
        dist
    }

    /// Counts in chart order: Flood, Pollution, Erosion, Other
    pub fn as_array(&self) -> [usize; 4] {
        [self.flood, self.pollution, self.erosion, self.other]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SeverityClass;
    use chrono::Utc;

    fn alert(hazard: &str) -> Alert {
        Alert {
            id: hazard.to_string(),
            location: String::new(),
            lat: 0.0,
            lon: 0.0,
            title: String::new(),
            message: String::new(),
            severity: SeverityClass::Low,
            hazard_type: hazard.to_string(),
            source: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_distribution() {
        let alerts: Vec<Alert> = ["Cyclone", "Weather", "Oil Spill", "Pollution", "Erosion", "Tsunami", "Storm"]
            .iter()
            .map(|h| alert(h))
            .collect();

        let dist = HazardDistribution::from_alerts(&alerts);
        assert_eq!(dist.as_array(), [3, 2, 1, 1]);
    }
}
