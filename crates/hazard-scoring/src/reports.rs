//! Community report triage

use crate::model::{IncidentReport, ReportStatus};

/// Open reports ordered by severity score, newest first on ties
pub fn prioritize_open(reports: Vec<IncidentReport>) -> Vec<IncidentReport> {
    let mut open: Vec<IncidentReport> = reports
        .into_iter()
        .filter(|r| r.status == ReportStatus::Open)
        .collect();

    open.sort_by(|a, b| {
        b.severity_score()
            .cmp(&a.severity_score())
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    open
}
