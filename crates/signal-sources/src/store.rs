//! Persisted alert, aid request and report readers

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use hazard_scoring::{
    AidRequest, AidStatus, Alert, IncidentReport, ReportStatus, SeverityClass, TextClassifier,
    UrgencyClass,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{info, warn};

use crate::{Result, SourceError};

/// Read side of the persisted store
///
/// Calls are synchronous; concurrency control belongs to the implementation.
pub trait AlertStore: Send + Sync {
    fn list_alerts(&self) -> Result<Vec<Alert>>;

    /// Aid requests, optionally restricted to a single status
    fn list_aid_requests(&self, status: Option<AidStatus>) -> Result<Vec<AidRequest>>;

    fn list_reports(&self) -> Result<Vec<IncidentReport>>;
}

fn poisoned<T>(_: T) -> SourceError {
    SourceError::Store("store lock poisoned".to_string())
}

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    alerts: RwLock<Vec<Alert>>,
    aid_requests: RwLock<Vec<AidRequest>>,
    reports: RwLock<Vec<IncidentReport>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alerts(alerts: Vec<Alert>) -> Self {
        Self {
            alerts: RwLock::new(alerts),
            ..Self::default()
        }
    }

    pub fn insert_alert(&self, alert: Alert) -> Result<()> {
        self.alerts.write().map_err(poisoned)?.push(alert);
        Ok(())
    }

    pub fn insert_aid_request(&self, request: AidRequest) -> Result<()> {
        self.aid_requests.write().map_err(poisoned)?.push(request);
        Ok(())
    }

    pub fn insert_report(&self, report: IncidentReport) -> Result<()> {
        self.reports.write().map_err(poisoned)?.push(report);
        Ok(())
    }

    pub fn update_aid_status(&self, id: &str, status: AidStatus) -> Result<()> {
        let mut requests = self.aid_requests.write().map_err(poisoned)?;
        let request = requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| SourceError::NotFound(format!("aid request {}", id)))?;
        request.set_status(status);
        Ok(())
    }

    pub fn update_report_status(&self, id: &str, status: ReportStatus) -> Result<()> {
        let mut reports = self.reports.write().map_err(poisoned)?;
        let report = reports
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| SourceError::NotFound(format!("report {}", id)))?;
        report.status = status;
        Ok(())
    }
}

impl AlertStore for InMemoryStore {
    fn list_alerts(&self) -> Result<Vec<Alert>> {
        Ok(self.alerts.read().map_err(poisoned)?.clone())
    }

    fn list_aid_requests(&self, status: Option<AidStatus>) -> Result<Vec<AidRequest>> {
        let requests = self.aid_requests.read().map_err(poisoned)?;
        Ok(requests
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect())
    }

    fn list_reports(&self) -> Result<Vec<IncidentReport>> {
        Ok(self.reports.read().map_err(poisoned)?.clone())
    }
}

/// Validate latitude is in valid range
fn is_valid_latitude(lat: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && lat.is_finite()
}

/// Validate longitude is in valid range
fn is_valid_longitude(lon: f64) -> bool {
    (-180.0..=180.0).contains(&lon) && lon.is_finite()
}

/// Stored ids may be numeric (database exports) or strings
fn id_string(id: Option<Value>, fallback: impl FnOnce() -> String) -> String {
    match id {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => fallback(),
    }
}

fn score_u8(score: Option<f64>) -> Option<u8> {
    score
        .filter(|s| s.is_finite())
        .map(|s| s.round().clamp(0.0, 100.0) as u8)
}

/// RFC 3339, or a naive ISO timestamp taken as UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Unparseable timestamps become `None` instead of failing the row
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Convert rows one by one; a row of the wrong shape is skipped, not fatal
fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>, kind: &str) -> (Vec<(usize, T)>, usize) {
    let mut decoded = Vec::with_capacity(rows.len());
    let mut malformed = 0;

    for (i, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<T>(row) {
            Ok(r) => decoded.push((i, r)),
            Err(e) => {
                warn!("{} row {} skipped: {}", kind, i, e);
                malformed += 1;
            }
        }
    }

    (decoded, malformed)
}

#[derive(Debug, Deserialize)]
struct RawAlert {
    id: Option<Value>,
    location: Option<String>,
    #[serde(alias = "latitude")]
    lat: Option<f64>,
    #[serde(alias = "longitude", alias = "lng")]
    lon: Option<f64>,
    title: Option<String>,
    message: Option<String>,
    severity: Option<String>,
    #[serde(alias = "alert_type", alias = "type")]
    hazard_type: Option<String>,
    source: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawAidRequest {
    id: Option<Value>,
    needs: Option<String>,
    description: Option<String>,
    contact: Option<String>,
    location: Option<String>,
    #[serde(alias = "urgency_class")]
    urgency: Option<String>,
    urgency_score: Option<f64>,
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawReport {
    id: Option<Value>,
    text: Option<String>,
    caption: Option<String>,
    description: Option<String>,
    location: Option<String>,
    severity_score: Option<f64>,
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created_at: Option<DateTime<Utc>>,
}

/// On-disk document: `{"alerts": [...], "aid_requests": [...], "reports": [...]}`
#[derive(Debug, Default, Deserialize)]
struct StoreFile {
    #[serde(default)]
    alerts: Vec<Value>,
    #[serde(default, alias = "aid")]
    aid_requests: Vec<Value>,
    #[serde(default, alias = "posts")]
    reports: Vec<Value>,
}

/// Read-only store backed by a JSON export
///
/// The file is re-read on every call, so an export replaced on disk is
/// picked up by the next request. Rows that cannot be used are skipped and
/// counted in the log.
pub struct JsonFileStore {
    path: PathBuf,
    classifier: TextClassifier,
}

impl JsonFileStore {
    /// The classifier fills in urgency and severity for rows stored without them
    pub fn new(path: impl AsRef<Path>, classifier: TextClassifier) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            classifier,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoreFile> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl AlertStore for JsonFileStore {
    fn list_alerts(&self) -> Result<Vec<Alert>> {
        let raw = self.read()?.alerts;
        let total = raw.len();
        let (rows, malformed) = decode_rows::<RawAlert>(raw, "alert");
        let mut skipped = 0;

        let alerts: Vec<Alert> = rows
            .into_iter()
            .filter_map(|(i, row)| {
                let (lat, lon) = match (row.lat, row.lon) {
                    (Some(lat), Some(lon)) if is_valid_latitude(lat) && is_valid_longitude(lon) => {
                        (lat, lon)
                    }
                    _ => {
                        skipped += 1;
                        return None;
                    }
                };

                Some(Alert {
                    id: id_string(row.id, || format!("alert-{}", i)),
                    location: row.location.unwrap_or_else(|| format!("{:.4},{:.4}", lat, lon)),
                    lat,
                    lon,
                    title: row.title.unwrap_or_default(),
                    message: row.message.unwrap_or_default(),
                    severity: row
                        .severity
                        .as_deref()
                        .map(SeverityClass::parse_lenient)
                        .unwrap_or(SeverityClass::Low),
                    hazard_type: row.hazard_type.unwrap_or_else(|| "Unknown".to_string()),
                    source: row.source.unwrap_or_else(|| "Authority".to_string()),
                    created_at: row.created_at.unwrap_or_default(),
                })
            })
            .collect();

        info!(
            "Loaded {}/{} alerts from {:?} ({} malformed, {} skipped for missing coords)",
            alerts.len(),
            total,
            self.path,
            malformed,
            skipped
        );
        Ok(alerts)
    }

    fn list_aid_requests(&self, status: Option<AidStatus>) -> Result<Vec<AidRequest>> {
        let (rows, malformed) = decode_rows::<RawAidRequest>(self.read()?.aid_requests, "aid");
        let mut skipped = malformed;
        let mut requests = Vec::with_capacity(rows.len());

        for (i, row) in rows {
            let needs = row.needs.unwrap_or_default();
            let description = row.description.unwrap_or_default();
            if needs.trim().is_empty() && description.trim().is_empty() {
                skipped += 1;
                continue;
            }

            let row_status = match row.status.as_deref().map(str::parse::<AidStatus>) {
                None => AidStatus::Pending,
                Some(Ok(s)) => s,
                Some(Err(e)) => {
                    warn!("aid row {}: {}, treating as Pending", i, e);
                    AidStatus::Pending
                }
            };
            if status.is_some_and(|s| s != row_status) {
                continue;
            }

            // an unrecognized class is re-derived from the text
            let stored = row
                .urgency
                .as_deref()
                .and_then(UrgencyClass::parse)
                .map(|class| (class, score_u8(row.urgency_score)));

            let mut request = AidRequest::restore(
                id_string(row.id, || format!("aid-{}", i)),
                needs,
                description,
                stored,
                row.created_at.unwrap_or_default(),
                &self.classifier,
            )
            .with_contact(row.contact.unwrap_or_default(), row.location.unwrap_or_default());
            request.set_status(row_status);
            requests.push(request);
        }

        info!(
            "Loaded {} aid requests from {:?} ({} skipped as malformed or without text)",
            requests.len(),
            self.path,
            skipped
        );
        Ok(requests)
    }

    fn list_reports(&self) -> Result<Vec<IncidentReport>> {
        let (rows, malformed) = decode_rows::<RawReport>(self.read()?.reports, "report");
        let mut skipped = malformed;
        let mut reports = Vec::with_capacity(rows.len());

        for (i, row) in rows {
            let text = match row.text {
                Some(t) => t.trim().to_string(),
                None => format!(
                    "{} {}",
                    row.caption.unwrap_or_default(),
                    row.description.unwrap_or_default()
                )
                .trim()
                .to_string(),
            };
            if text.is_empty() {
                skipped += 1;
                continue;
            }

            let mut report = IncidentReport::restore(
                id_string(row.id, || format!("rpt-{}", i)),
                text,
                row.location.unwrap_or_default(),
                score_u8(row.severity_score),
                row.created_at.unwrap_or_default(),
                &self.classifier,
            );
            report.status = row
                .status
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default();
            reports.push(report);
        }

        info!(
            "Loaded {} reports from {:?} ({} skipped as malformed or without text)",
            reports.len(),
            self.path,
            skipped
        );
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn store_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", json).unwrap();
        file
    }

    fn alert(id: &str, severity: SeverityClass) -> Alert {
        Alert {
            id: id.to_string(),
            location: "Juhu".to_string(),
            lat: 19.1,
            lon: 72.8,
            title: "t".to_string(),
            message: "m".to_string(),
            severity,
            hazard_type: "Pollution".to_string(),
            source: "Authority".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_in_memory_aid_filter_and_update() {
        let classifier = TextClassifier::default();
        let store = InMemoryStore::new();
        let first = AidRequest::new("Food", "for 20 people", &classifier);
        let second = AidRequest::new("Rescue", "trapped", &classifier);
        let first_id = first.id.clone();
        store.insert_aid_request(first).unwrap();
        store.insert_aid_request(second).unwrap();

        store.update_aid_status(&first_id, AidStatus::Resolved).unwrap();

        assert_eq!(store.list_aid_requests(None).unwrap().len(), 2);
        let pending = store.list_aid_requests(Some(AidStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].needs, "Rescue");

        assert!(matches!(
            store.update_aid_status("aid-missing", AidStatus::Resolved),
            Err(SourceError::NotFound(_))
        ));
    }

    #[test]
    fn test_in_memory_reports() {
        let classifier = TextClassifier::default();
        let store = InMemoryStore::with_alerts(vec![alert("a1", SeverityClass::High)]);
        let report = IncidentReport::new("Erosion", "at the beach", "Goa", &classifier);
        let id = report.id.clone();
        store.insert_report(report).unwrap();
        store.update_report_status(&id, ReportStatus::Dismissed).unwrap();

        assert_eq!(store.list_alerts().unwrap().len(), 1);
        assert_eq!(store.list_reports().unwrap()[0].status, ReportStatus::Dismissed);
        assert!(store.update_report_status("nope", ReportStatus::Open).is_err());
    }

    #[test]
    fn test_json_alerts() {
        let file = store_file(
            r#"{"alerts": [
                {"id": 7, "location": "Juhu Beach", "lat": 19.09, "lon": 72.82, "title": "Oil sheen",
                 "message": "Avoid swimming", "severity": "high", "alert_type": "Pollution",
                 "source": "Coast Guard", "created_at": "2024-07-01T06:00:00Z"},
                {"id": "a-2", "latitude": 15.5, "longitude": 73.8, "severity": "whatever", "type": "Erosion"},
                {"id": "a-3", "location": "Nowhere", "severity": "High"},
                {"id": "a-4", "lat": 95.0, "lon": 10.0}
            ]}"#,
        );
        let store = JsonFileStore::new(file.path(), TextClassifier::default());
        let alerts = store.list_alerts().unwrap();

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].id, "7");
        assert_eq!(alerts[0].severity, SeverityClass::High);
        assert_eq!(alerts[0].hazard_type, "Pollution");
        assert_eq!(alerts[1].severity, SeverityClass::Low);
        assert_eq!(alerts[1].hazard_type, "Erosion");
        assert_eq!(alerts[1].location, "15.5000,73.8000");
    }

    #[test]
    fn test_json_aid_requests() {
        let file = store_file(
            r#"{"aid_requests": [
                {"id": 1, "needs": "Food", "description": "family of five", "urgency": "High",
                 "urgency_score": 20, "status": "In Progress"},
                {"id": 2, "needs": "Medical", "description": "elderly man bleeding", "status": "Resolved"},
                {"id": 3, "needs": "Water", "description": "", "urgency": "extreme"},
                {"id": 4, "needs": "", "description": "  "}
            ]}"#,
        );
        let store = JsonFileStore::new(file.path(), TextClassifier::default());

        let all = store.list_aid_requests(None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].urgency_class(), UrgencyClass::High);
        assert_eq!(all[0].urgency_score(), 80);
        assert_eq!(all[0].status, AidStatus::InProgress);
        assert_eq!(all[1].urgency_class(), UrgencyClass::High);
        // unrecognized urgency label, re-derived from "water"
        assert_eq!(all[2].urgency_class(), UrgencyClass::Medium);

        let resolved = store.list_aid_requests(Some(AidStatus::Resolved)).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "2");
    }

    #[test]
    fn test_json_reports() {
        let file = store_file(
            r#"{"posts": [
                {"id": "p_1a2b3c4d", "caption": "Flood", "description": "water entering homes near the shore",
                 "location": "Chennai", "created_at": "2024-07-01T06:00:00Z"},
                {"id": "p_2", "text": "Trash pile", "severity_score": 10, "status": "Resolved"},
                {"id": "p_3", "caption": "", "description": ""}
            ]}"#,
        );
        let store = JsonFileStore::new(file.path(), TextClassifier::default());
        let reports = store.list_reports().unwrap();

        assert_eq!(reports.len(), 2);
        // flood (40) + coastal bonus (5)
        assert_eq!(reports[0].severity_score(), 45);
        assert_eq!(reports[0].status, ReportStatus::Open);
        assert_eq!(reports[1].severity_score(), 10);
        assert_eq!(reports[1].status, ReportStatus::Resolved);
    }

    #[test]
    fn test_json_bad_row_does_not_poison_file() {
        let file = store_file(
            r#"{"alerts": [
                {"id": 1, "lat": 19.09, "lon": 72.82, "severity": "High", "alert_type": "Pollution"},
                {"id": 2, "lat": "19.1", "lon": 72.82, "severity": "High"}
            ],
            "aid_requests": [
                {"id": 3, "needs": "Rescue", "description": "trapped"},
                {"id": 4, "needs": ["Food"], "description": 12}
            ],
            "reports": [
                {"id": "p_1", "text": "Oil spill"},
                {"id": "p_2", "text": "Trash", "severity_score": "high"}
            ]}"#,
        );
        let store = JsonFileStore::new(file.path(), TextClassifier::default());

        let alerts = store.list_alerts().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, "1");
        assert_eq!(store.list_aid_requests(None).unwrap().len(), 1);
        assert_eq!(store.list_reports().unwrap().len(), 1);
    }

    #[test]
    fn test_json_naive_timestamps() {
        let file = store_file(
            r#"{"alerts": [
                {"id": 1, "lat": 19.09, "lon": 72.82, "created_at": "2024-07-01T06:15:00.123456"},
                {"id": 2, "lat": 19.09, "lon": 72.82, "created_at": "2024-07-01 06:15:00"},
                {"id": 3, "lat": 19.09, "lon": 72.82, "created_at": "2024-07-01T06:15:00+05:30"},
                {"id": 4, "lat": 19.09, "lon": 72.82, "created_at": "last tuesday"}
            ]}"#,
        );
        let store = JsonFileStore::new(file.path(), TextClassifier::default());
        let alerts = store.list_alerts().unwrap();

        assert_eq!(alerts.len(), 4);
        let expected = Utc.with_ymd_and_hms(2024, 7, 1, 6, 15, 0).unwrap();
        assert_eq!(alerts[0].created_at.timestamp(), expected.timestamp());
        assert_eq!(alerts[0].created_at.timestamp_subsec_micros(), 123456);
        assert_eq!(alerts[1].created_at, expected);
        assert_eq!(alerts[2].created_at, Utc.with_ymd_and_hms(2024, 7, 1, 0, 45, 0).unwrap());
        assert_eq!(alerts[3].created_at, DateTime::<Utc>::default());
    }

    #[test]
    fn test_json_missing_file_is_error() {
        let store = JsonFileStore::new("/nonexistent/store.json", TextClassifier::default());
        assert!(matches!(store.list_alerts(), Err(SourceError::Io(_))));
    }

    #[test]
    fn test_json_empty_document() {
        let file = store_file("{}");
        let store = JsonFileStore::new(file.path(), TextClassifier::default());
        assert!(store.list_alerts().unwrap().is_empty());
        assert!(store.list_reports().unwrap().is_empty());
    }
}
