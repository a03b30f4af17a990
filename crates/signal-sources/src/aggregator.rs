//! Alert aggregation across the persisted store and live adapters
//!
//! Adapter fetches run concurrently and independently. Each is bounded by
//! the per-adapter timeout (and by the request deadline, when one is
//! given); a late or failing adapter contributes nothing. Output order is
//! persisted alerts first, then each adapter's signals in registration
//! order, which is the emission order the ranking tie-break preserves.

use futures::future::join_all;
use hazard_scoring::dedup::deduplicate;
use hazard_scoring::{Alert, DedupConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::adapter::SourceAdapter;
use crate::store::AlertStore;

/// Default per-adapter budget
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub adapter_timeout: Duration,
    /// Cross-source dedup stage; `None` keeps every alert
    pub dedup: Option<DedupConfig>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
            dedup: None,
        }
    }
}

pub struct Aggregator {
    store: Arc<dyn AlertStore>,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(store: Arc<dyn AlertStore>, config: AggregatorConfig) -> Self {
        Self {
            store,
            adapters: Vec::new(),
            config,
        }
    }

    /// Register an adapter; registration order is emission order
    pub fn with_adapter(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    pub fn adapter_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Persisted alerts; a failed read is logged and yields nothing
    pub fn persisted_alerts(&self) -> Vec<Alert> {
        match self.store.list_alerts() {
            Ok(alerts) => alerts,
            Err(e) => {
                warn!("Source unavailable: persisted store: {}", e);
                Vec::new()
            }
        }
    }

    /// Unified alert set for a query point
    pub async fn aggregate(&self, lat: f64, lon: f64) -> Vec<Alert> {
        self.collect(lat, lon, None).await
    }

    /// Like [`aggregate`](Self::aggregate), but no adapter may run past `deadline`
    pub async fn aggregate_until(&self, lat: f64, lon: f64, deadline: Instant) -> Vec<Alert> {
        self.collect(lat, lon, Some(deadline)).await
    }

    async fn collect(&self, lat: f64, lon: f64, deadline: Option<Instant>) -> Vec<Alert> {
        let now = Instant::now();
        let fetches = self.adapters.iter().map(|adapter| {
            let budget = match deadline {
                Some(d) => self.config.adapter_timeout.min(d.saturating_duration_since(now)),
                None => self.config.adapter_timeout,
            };
            debug!("Fetching {} (budget {:?})", adapter.name(), budget);
            adapter.fetch(lat, lon, budget)
        });

        // join_all keeps registration order; dropping it drops every fetch
        let (mut alerts, per_adapter) = tokio::join!(
            async { self.persisted_alerts() },
            join_all(fetches)
        );
        let persisted = alerts.len();

        alerts.extend(
            per_adapter
                .into_iter()
                .flatten()
                .map(|signal| Alert::from_signal(signal, lat, lon)),
        );

        info!(
            "Aggregated {} alerts ({} persisted, {} live from {} sources)",
            alerts.len(),
            persisted,
            alerts.len() - persisted,
            self.adapters.len()
        );

        match &self.config.dedup {
            Some(dedup) => deduplicate(alerts, dedup),
            None => alerts,
        }
    }
}
