//! Keyword-tier text classification for incident reports and aid requests
//!
//! Matching is case-insensitive substring containment. Keyword tables are
//! lowercased once when the classifier is built.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::UrgencyClass;

/// Upper bound of a hazard severity score
pub const MAX_SEVERITY_SCORE: u32 = 100;

/// Points added per extra keyword match inside an urgency band
const URGENCY_STEP: u32 = 5;

/// Hazard keyword tiers for incident report scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardKeywords {
    /// Life-threatening terms
    pub tier1: Vec<String>,
    /// Significant threat terms
    pub tier2: Vec<String>,
    /// Minor or environmental terms
    pub tier3: Vec<String>,
    /// Coastal-proximity terms that earn the context bonus next to a threat term
    pub coastal: Vec<String>,
    pub tier1_points: u32,
    pub tier2_points: u32,
    pub tier3_points: u32,
    pub coastal_bonus: u32,
}

impl Default for HazardKeywords {
    /// "beach" is a coastal context term here, not a tier-3 threat, so a report
    /// mentioning only the beach scores 0.
    fn default() -> Self {
        Self {
            tier1: words(&[
                "tsunami", "cyclone", "flood", "drowning", "sos", "emergency", "earthquake",
            ]),
            tier2: words(&[
                "storm", "oil spill", "pollution", "hazard", "blocked", "bridge collapse",
            ]),
            tier3: words(&["algal bloom", "waste", "trash", "erosion", "tide"]),
            coastal: words(&["beach", "shore"]),
            tier1_points: 40,
            tier2_points: 20,
            tier3_points: 10,
            coastal_bonus: 5,
        }
    }
}

/// One keyword tier of the aid urgency scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgencyTier {
    pub class: UrgencyClass,
    pub keywords: Vec<String>,
}

/// Ordered urgency tiers; the first tier with any match decides the class
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyTiers {
    pub tiers: Vec<UrgencyTier>,
    /// Class assigned when no tier matches
    pub fallback: UrgencyClass,
}

impl Default for UrgencyTiers {
    fn default() -> Self {
        Self {
            tiers: vec![
                UrgencyTier {
                    class: UrgencyClass::High,
                    keywords: words(&[
                        "rescue", "trapped", "bleeding", "medical", "drowning", "ambulance",
                        "stuck", "baby", "elderly",
                    ]),
                },
                UrgencyTier {
                    class: UrgencyClass::Medium,
                    keywords: words(&[
                        "food", "water", "shelter", "medicine", "pregnant", "fever",
                        "electricity",
                    ]),
                },
            ],
            fallback: UrgencyClass::Low,
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn lowercased(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn count_matches(haystack: &str, keywords: &[String]) -> u32 {
    keywords.iter().filter(|kw| haystack.contains(kw.as_str())).count() as u32
}

/// Rule-based classifier over injected keyword tables
#[derive(Debug, Clone)]
pub struct TextClassifier {
    hazard: HazardKeywords,
    urgency: UrgencyTiers,
}

impl Default for TextClassifier {
    fn default() -> Self {
        Self::new(HazardKeywords::default(), UrgencyTiers::default())
    }
}

impl TextClassifier {
    pub fn new(hazard: HazardKeywords, urgency: UrgencyTiers) -> Self {
        let hazard = HazardKeywords {
            tier1: lowercased(&hazard.tier1),
            tier2: lowercased(&hazard.tier2),
            tier3: lowercased(&hazard.tier3),
            coastal: lowercased(&hazard.coastal),
            ..hazard
        };
        let urgency = UrgencyTiers {
            tiers: urgency
                .tiers
                .into_iter()
                .map(|t| UrgencyTier {
                    class: t.class,
                    keywords: lowercased(&t.keywords),
                })
                .collect(),
            fallback: urgency.fallback,
        };
        Self { hazard, urgency }
    }

    /// Score free text 0-100 from the hazard keyword tiers
    ///
    /// Every keyword match adds its tier's points independently. The coastal
    /// bonus applies once when a coastal term appears alongside any tier term.
    pub fn classify_hazard_severity(&self, text: &str) -> u8 {
        let haystack = text.to_lowercase();
        let kw = &self.hazard;

        let t1 = count_matches(&haystack, &kw.tier1);
        let t2 = count_matches(&haystack, &kw.tier2);
        let t3 = count_matches(&haystack, &kw.tier3);

        let mut score = t1.saturating_mul(kw.tier1_points)
            .saturating_add(t2.saturating_mul(kw.tier2_points))
            .saturating_add(t3.saturating_mul(kw.tier3_points));

        let threat = t1 + t2 + t3 > 0;
        if threat && count_matches(&haystack, &kw.coastal) > 0 {
            score = score.saturating_add(kw.coastal_bonus);
        }

        debug!("Hazard severity: t1={} t2={} t3={} raw={}", t1, t2, t3, score);

        score.min(MAX_SEVERITY_SCORE) as u8
    }

    /// Assign an urgency class and in-band score to an aid request
    ///
    /// Tiers are scanned in order and the scan stops at the first tier with
    /// any match. The score starts at the bottom of the class band and rises
    /// by a fixed step per additional match in the deciding tier.
    pub fn classify_aid_urgency(&self, needs: &str, description: &str) -> (UrgencyClass, u8) {
        let combined = format!("{} {}", needs, description).to_lowercase();

        for tier in &self.urgency.tiers {
            let matches = count_matches(&combined, &tier.keywords);
            if matches > 0 {
                return (tier.class, band_score(tier.class, matches));
            }
        }

        let (low, _) = self.urgency.fallback.band();
        (self.urgency.fallback, low)
    }
}

fn band_score(class: UrgencyClass, matches: u32) -> u8 {
    let (low, high) = class.band();
    let bumped = low as u32 + URGENCY_STEP * matches.saturating_sub(1);
    bumped.min(high as u32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tier_points_accumulate() {
        let c = TextClassifier::default();
        assert_eq!(c.classify_hazard_severity("Tsunami warning"), 40);
        assert_eq!(c.classify_hazard_severity("storm over the bay"), 20);
        assert_eq!(c.classify_hazard_severity("plastic trash pile"), 10);
        // tsunami + flood + storm
        assert_eq!(c.classify_hazard_severity("TSUNAMI and flood after the storm"), 100);
        assert_eq!(c.classify_hazard_severity("flood, storm, erosion"), 70);
    }

    #[test]
    fn test_overlapping_matches_count_separately() {
        let c = TextClassifier::default();
        // sos and emergency both hit tier 1
        assert_eq!(c.classify_hazard_severity("SOS emergency"), 80);
    }

    #[test]
    fn test_coastal_bonus_needs_threat_term() {
        let c = TextClassifier::default();
        assert_eq!(c.classify_hazard_severity("lovely day at the beach"), 0);
        assert_eq!(c.classify_hazard_severity("erosion along the shore"), 15);
        // bonus applies once even with both coastal terms
        assert_eq!(c.classify_hazard_severity("waste on beach and shore"), 15);
    }

    #[test]
    fn test_empty_and_unmatched_text() {
        let c = TextClassifier::default();
        assert_eq!(c.classify_hazard_severity(""), 0);
        assert_eq!(c.classify_hazard_severity("routine patrol, nothing to report"), 0);
    }

    #[test]
    fn test_clamped_to_100() {
        let c = TextClassifier::default();
        let text = "tsunami cyclone flood drowning sos emergency earthquake storm";
        assert_eq!(c.classify_hazard_severity(text), 100);
    }

    #[test]
    fn test_aid_urgency_high() {
        let c = TextClassifier::default();
        let (class, score) = c.classify_aid_urgency("rescue trapped", "");
        assert_eq!(class, UrgencyClass::High);
        assert!((80..=100).contains(&score), "score {}", score);
    }

    #[test]
    fn test_aid_urgency_medium() {
        let c = TextClassifier::default();
        let (class, score) = c.classify_aid_urgency("need food and water", "");
        assert_eq!(class, UrgencyClass::Medium);
        assert!((40..=79).contains(&score), "score {}", score);
    }

    #[test]
    fn test_aid_urgency_low() {
        let c = TextClassifier::default();
        let (class, score) = c.classify_aid_urgency("beach cleanup", "");
        assert_eq!(class, UrgencyClass::Low);
        assert!(score <= 39, "score {}", score);

        assert_eq!(c.classify_aid_urgency("", ""), (UrgencyClass::Low, 0));
    }

    #[test]
    fn test_first_matching_tier_wins() {
        let c = TextClassifier::default();
        let (class, _) = c.classify_aid_urgency("Food", "we are trapped and need food and water");
        assert_eq!(class, UrgencyClass::High);
    }

    #[test]
    fn test_aid_urgency_reproducible() {
        let c = TextClassifier::default();
        let a = c.classify_aid_urgency("Medical", "elderly man bleeding");
        let b = c.classify_aid_urgency("Medical", "elderly man bleeding");
        assert_eq!(a, b);
        // medical + elderly + bleeding
        assert_eq!(a, (UrgencyClass::High, 90));
    }

    #[test]
    fn test_custom_tables_are_lowercased() {
        let hazard = HazardKeywords {
            tier1: vec!["Rip Current".to_string()],
            ..HazardKeywords::default()
        };
        let c = TextClassifier::new(hazard, UrgencyTiers::default());
        assert_eq!(c.classify_hazard_severity("strong RIP CURRENT today"), 40);
    }

    proptest! {
        #[test]
        fn prop_score_in_range(text in ".{0,200}") {
            let c = TextClassifier::default();
            prop_assert!(c.classify_hazard_severity(&text) <= 100);
        }

        #[test]
        fn prop_adding_tier1_keyword_never_decreases(
            text in "[a-z ]{0,80}",
            idx in 0usize..7,
        ) {
            let c = TextClassifier::default();
            let keyword = &HazardKeywords::default().tier1[idx];
            let before = c.classify_hazard_severity(&text);
            let after = c.classify_hazard_severity(&format!("{} {}", text, keyword));
            prop_assert!(after >= before, "{} -> {}", before, after);
        }

        #[test]
        fn prop_aid_score_stays_in_band(needs in "[a-z ]{0,40}", desc in "[a-z ]{0,80}") {
            let c = TextClassifier::default();
            let (class, score) = c.classify_aid_urgency(&needs, &desc);
            let (low, high) = class.band();
            prop_assert!(score >= low && score <= high);
        }
    }
}
