//! Alert, report and aid request value types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::classifier::TextClassifier;

/// Threat magnitude bucket
///
/// Deserialization is lenient: any unrecognized label becomes `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum SeverityClass {
    High,
    Medium,
    Low,
}

impl SeverityClass {
    /// Position in the severity-only ordering (High first)
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Normalize a free-form label, defaulting to `Low`
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" | "critical" | "severe" => Self::High,
            "medium" | "moderate" => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl From<String> for SeverityClass {
    fn from(label: String) -> Self {
        Self::parse_lenient(&label)
    }
}

impl From<&str> for SeverityClass {
    fn from(label: &str) -> Self {
        Self::parse_lenient(label)
    }
}

impl fmt::Display for SeverityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source-agnostic hazard observation produced by a feed adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSignal {
    pub title: String,
    pub message: String,
    pub severity: SeverityClass,
    pub hazard_type: String,
    pub source_name: String,
    /// Human-readable place, when the provider supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

/// Unified alert the ranking engine operates on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub location: String,
    pub lat: f64,
    pub lon: f64,
    pub title: String,
    pub message: String,
    pub severity: SeverityClass,
    pub hazard_type: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Build an alert from a live signal
    ///
    /// Signals without coordinates describe the queried point itself (e.g.
    /// current wind at that location), so they inherit the query coordinates.
    pub fn from_signal(signal: RawSignal, query_lat: f64, query_lon: f64) -> Self {
        let lat = signal.lat.unwrap_or(query_lat);
        let lon = signal.lon.unwrap_or(query_lon);
        let location = signal
            .place
            .unwrap_or_else(|| format!("{:.4},{:.4}", lat, lon));

        Self {
            id: format!("live-{}", Uuid::new_v4().simple()),
            location,
            lat,
            lon,
            title: signal.title,
            message: signal.message,
            severity: signal.severity,
            hazard_type: signal.hazard_type,
            source: signal.source_name,
            created_at: Utc::now(),
        }
    }
}

/// Alert with the derived ranking fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAlert {
    #[serde(flatten)]
    pub alert: Alert,
    pub distance_km: f64,
    pub criticality_index: u8,
    pub priority_score: f64,
}

/// Community report moderation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportStatus {
    #[default]
    Open,
    Resolved,
    Dismissed,
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "resolved" => Ok(Self::Resolved),
            "dismissed" => Ok(Self::Dismissed),
            other => Err(format!("unknown report status: {}", other)),
        }
    }
}

/// Community incident report
///
/// The severity score is fixed when the report is created; re-scoring means
/// creating a new report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    pub id: String,
    pub text: String,
    pub location: String,
    severity_score: u8,
    #[serde(default)]
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

impl IncidentReport {
    pub fn new(
        caption: &str,
        description: &str,
        location: impl Into<String>,
        classifier: &TextClassifier,
    ) -> Self {
        let text = format!("{} {}", caption, description).trim().to_string();
        let severity_score = classifier.classify_hazard_severity(&text);
        let hex = Uuid::new_v4().simple().to_string();

        Self {
            id: format!("rpt-{}", &hex[..8]),
            text,
            location: location.into(),
            severity_score,
            status: ReportStatus::Open,
            created_at: Utc::now(),
        }
    }

    /// Rebuild a persisted report, scoring the text when no score was stored
    pub fn restore(
        id: impl Into<String>,
        text: impl Into<String>,
        location: impl Into<String>,
        severity_score: Option<u8>,
        created_at: DateTime<Utc>,
        classifier: &TextClassifier,
    ) -> Self {
        let text = text.into();
        let severity_score = severity_score
            .map(|s| s.min(100))
            .unwrap_or_else(|| classifier.classify_hazard_severity(&text));

        Self {
            id: id.into(),
            text,
            location: location.into(),
            severity_score,
            status: ReportStatus::Open,
            created_at,
        }
    }

    pub fn severity_score(&self) -> u8 {
        self.severity_score
    }
}

/// Urgency bucket for aid requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrgencyClass {
    High,
    Medium,
    Low,
}

impl UrgencyClass {
    /// Queue position (High first)
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    /// Inclusive score band for this class
    pub fn band(&self) -> (u8, u8) {
        match self {
            Self::High => (80, 100),
            Self::Medium => (40, 79),
            Self::Low => (0, 39),
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Aid request handling state; any status may follow any other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AidStatus {
    #[default]
    Pending,
    #[serde(alias = "In Progress")]
    InProgress,
    Resolved,
    Dismissed,
}

impl AidStatus {
    /// Whether the request still belongs in the working queue
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

impl FromStr for AidStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "pending" => Ok(Self::Pending),
            "inprogress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "dismissed" => Ok(Self::Dismissed),
            other => Err(format!("unknown aid status: {}", other)),
        }
    }
}

/// Humanitarian aid request
///
/// Urgency class and score are assigned by the classifier at creation and
/// have no setters. Only `status` changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AidRequest {
    pub id: String,
    pub needs: String,
    pub description: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub location: String,
    urgency_class: UrgencyClass,
    urgency_score: u8,
    #[serde(default)]
    pub status: AidStatus,
    pub created_at: DateTime<Utc>,
}

impl AidRequest {
    pub fn new(
        needs: impl Into<String>,
        description: impl Into<String>,
        classifier: &TextClassifier,
    ) -> Self {
        let needs = needs.into();
        let description = description.into();
        let (urgency_class, urgency_score) = classifier.classify_aid_urgency(&needs, &description);
        let hex = Uuid::new_v4().simple().to_string();

        Self {
            id: format!("aid-{}", &hex[..8]),
            needs,
            description,
            contact: String::new(),
            location: String::new(),
            urgency_class,
            urgency_score,
            status: AidStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Rebuild a persisted request
    ///
    /// A stored class is kept and its score clamped into the class band (the
    /// band floor when no score was stored). Without a class, urgency is
    /// derived from the text.
    pub fn restore(
        id: impl Into<String>,
        needs: impl Into<String>,
        description: impl Into<String>,
        stored: Option<(UrgencyClass, Option<u8>)>,
        created_at: DateTime<Utc>,
        classifier: &TextClassifier,
    ) -> Self {
        let needs = needs.into();
        let description = description.into();
        let (urgency_class, urgency_score) = match stored {
            Some((class, score)) => {
                let (lo, hi) = class.band();
                (class, score.unwrap_or(lo).clamp(lo, hi))
            }
            None => classifier.classify_aid_urgency(&needs, &description),
        };

        Self {
            id: id.into(),
            needs,
            description,
            contact: String::new(),
            location: String::new(),
            urgency_class,
            urgency_score,
            status: AidStatus::Pending,
            created_at,
        }
    }

    pub fn with_contact(mut self, contact: impl Into<String>, location: impl Into<String>) -> Self {
        self.contact = contact.into();
        self.location = location.into();
        self
    }

    pub fn urgency_class(&self) -> UrgencyClass {
        self.urgency_class
    }

    pub fn urgency_score(&self) -> u8 {
        self.urgency_score
    }

    pub fn set_status(&mut self, status: AidStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(lat: Option<f64>, lon: Option<f64>, place: Option<&str>) -> RawSignal {
        RawSignal {
            title: "Strong Wind Advisory".to_string(),
            message: "High winds".to_string(),
            severity: SeverityClass::Medium,
            hazard_type: "Weather".to_string(),
            source_name: "Open-Meteo Weather API".to_string(),
            place: place.map(str::to_string),
            lat,
            lon,
        }
    }

    #[test]
    fn test_severity_normalizes_unknown_labels() {
        assert_eq!(SeverityClass::from("HIGH"), SeverityClass::High);
        assert_eq!(SeverityClass::from(" medium "), SeverityClass::Medium);
        assert_eq!(SeverityClass::from("extreme-ish"), SeverityClass::Low);
        assert_eq!(SeverityClass::from(""), SeverityClass::Low);

        let parsed: SeverityClass = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(parsed, SeverityClass::Low);
        assert_eq!(serde_json::to_string(&SeverityClass::High).unwrap(), "\"High\"");
    }

    #[test]
    fn test_alert_from_signal_inherits_query_point() {
        let alert = Alert::from_signal(signal(None, None, None), 19.076, 72.8777);
        assert_eq!(alert.lat, 19.076);
        assert_eq!(alert.lon, 72.8777);
        assert_eq!(alert.location, "19.0760,72.8777");
        assert!(alert.id.starts_with("live-"));
    }

    #[test]
    fn test_alert_from_signal_keeps_own_coordinates() {
        let alert = Alert::from_signal(signal(Some(10.0), Some(20.0), Some("Off coast")), 0.0, 0.0);
        assert_eq!((alert.lat, alert.lon), (10.0, 20.0));
        assert_eq!(alert.location, "Off coast");
        assert_eq!(alert.source, "Open-Meteo Weather API");
    }

    #[test]
    fn test_aid_status_parsing() {
        assert_eq!("In Progress".parse::<AidStatus>(), Ok(AidStatus::InProgress));
        assert_eq!("in_progress".parse::<AidStatus>(), Ok(AidStatus::InProgress));
        assert_eq!("Resolved".parse::<AidStatus>(), Ok(AidStatus::Resolved));
        assert!("closed".parse::<AidStatus>().is_err());

        let parsed: AidStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(parsed, AidStatus::InProgress);
    }

    #[test]
    fn test_aid_status_any_transition() {
        let classifier = TextClassifier::default();
        let mut req = AidRequest::new("Rescue", "family trapped on roof", &classifier);
        assert_eq!(req.status, AidStatus::Pending);

        for status in [
            AidStatus::Resolved,
            AidStatus::Pending,
            AidStatus::Dismissed,
            AidStatus::InProgress,
            AidStatus::InProgress,
        ] {
            req.set_status(status);
            assert_eq!(req.status, status);
        }
        assert_eq!(req.urgency_class(), UrgencyClass::High);
    }

    #[test]
    fn test_aid_restore() {
        let classifier = TextClassifier::default();
        let at = Utc::now();

        let kept = AidRequest::restore("a1", "Food", "", Some((UrgencyClass::High, Some(30))), at, &classifier);
        assert_eq!(kept.urgency_class(), UrgencyClass::High);
        assert_eq!(kept.urgency_score(), 80);

        let floor = AidRequest::restore("a2", "Food", "", Some((UrgencyClass::Medium, None)), at, &classifier);
        assert_eq!(floor.urgency_score(), 40);

        let derived = AidRequest::restore("a3", "Rescue", "child trapped", None, at, &classifier);
        assert_eq!(derived.urgency_class(), UrgencyClass::High);
        assert_eq!(derived.id, "a3");
        assert_eq!(derived.created_at, at);
    }

    #[test]
    fn test_report_restore() {
        let classifier = TextClassifier::default();
        let stored = IncidentReport::restore("r1", "whatever", "Goa", Some(120), Utc::now(), &classifier);
        assert_eq!(stored.severity_score(), 100);

        let scored = IncidentReport::restore("r2", "tsunami warning", "Goa", None, Utc::now(), &classifier);
        assert_eq!(scored.severity_score(), 40);
    }

    #[test]
    fn test_report_scored_once() {
        let classifier = TextClassifier::default();
        let report = IncidentReport::new("Oil spill", "spotted near the shore", "Juhu", &classifier);
        assert!(report.id.starts_with("rpt-"));
        assert_eq!(report.id.len(), 12);
        assert_eq!(report.text, "Oil spill spotted near the shore");
        // oil spill (20) + coastal bonus (5)
        assert_eq!(report.severity_score(), 25);
        assert_eq!(report.status, ReportStatus::Open);
    }
}
