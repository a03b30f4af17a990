//! Aid request queue ordering

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::model::{AidRequest, UrgencyClass};

/// Which slice of the aid queue to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AidView {
    /// Pending and in-progress requests only
    #[default]
    Active,
    /// Every request, for history and audit
    All,
}

/// Urgency class first (High, Medium, Low), newest first within a class
fn queue_order(a: &AidRequest, b: &AidRequest) -> Ordering {
    a.urgency_class()
        .rank()
        .cmp(&b.urgency_class().rank())
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Order aid requests for responders
pub fn prioritize(mut requests: Vec<AidRequest>) -> Vec<AidRequest> {
    requests.sort_by(queue_order);
    requests
}

/// Filter to the requested view, then prioritize
pub fn prioritized_view(requests: Vec<AidRequest>, view: AidView) -> Vec<AidRequest> {
    let total = requests.len();
    let selected: Vec<AidRequest> = match view {
        AidView::Active => requests.into_iter().filter(|r| r.status.is_active()).collect(),
        AidView::All => requests,
    };
    debug!("Aid view {:?}: {} of {} requests", view, selected.len(), total);
    prioritize(selected)
}

/// Per-class counts of a request set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AidQueueSummary {
    pub total: usize,
    pub active: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl AidQueueSummary {
    pub fn from_requests(requests: &[AidRequest]) -> Self {
        let mut summary = Self {
            total: requests.len(),
            ..Self::default()
        };
        for r in requests {
            if r.status.is_active() {
                summary.active += 1;
            }
            match r.urgency_class() {
                UrgencyClass::High => summary.high += 1,
                UrgencyClass::Medium => summary.medium += 1,
                UrgencyClass::Low => summary.low += 1,
            }
        }
        summary
    }
}
