//! Uniform source adapter interface

use async_trait::async_trait;
use hazard_scoring::RawSignal;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{Result, SourceError};

/// One external hazard signal provider
///
/// Implementors only write `try_fetch`. Callers use `fetch`, which bounds
/// the call by a timeout and turns every failure into an empty list.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Provider name used in logs and as the alert source
    fn name(&self) -> &str;

    /// Fetch and normalize signals near a point, surfacing failures
    async fn try_fetch(&self, lat: f64, lon: f64) -> Result<Vec<RawSignal>>;

    /// Fetch signals, returning an empty list on failure or timeout
    async fn fetch(&self, lat: f64, lon: f64, timeout: Duration) -> Vec<RawSignal> {
        let outcome = match tokio::time::timeout(timeout, self.try_fetch(lat, lon)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(self.name().to_string(), timeout)),
        };

        match outcome {
            Ok(signals) => {
                debug!("{} produced {} signals", self.name(), signals.len());
                signals
            }
            Err(e) => {
                warn!("Source unavailable: {}: {}", self.name(), e);
                Vec::new()
            }
        }
    }
}

/// Build the shared HTTP client for an adapter
pub(crate) fn http_client(timeout_sec: u64) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_sec))
        .build()?;
    Ok(client)
}

/// GET a URL and return the body, mapping non-2xx statuses to errors
pub(crate) async fn get_body(client: &reqwest::Client, url: &str, provider: &str) -> Result<String> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(SourceError::Status {
            provider: provider.to_string(),
            status: response.status().as_u16(),
        });
    }

    Ok(response.text().await?)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use hazard_scoring::SeverityClass;

    /// Scripted adapter for aggregator tests
    pub struct MockAdapter {
        pub name: String,
        pub delay: Duration,
        pub fail: bool,
        pub signals: Vec<RawSignal>,
    }

    impl MockAdapter {
        pub fn ok(name: &str, signals: Vec<RawSignal>) -> Self {
            Self {
                name: name.to_string(),
                delay: Duration::ZERO,
                fail: false,
                signals,
            }
        }

        pub fn failing(name: &str) -> Self {
            Self {
                fail: true,
                ..Self::ok(name, Vec::new())
            }
        }

        pub fn slow(name: &str, delay: Duration, signals: Vec<RawSignal>) -> Self {
            Self {
                delay,
                ..Self::ok(name, signals)
            }
        }
    }

    #[async_trait]
    impl SourceAdapter for MockAdapter {
        fn name(&self) -> &str {
            &self.name
        }

        async fn try_fetch(&self, _lat: f64, _lon: f64) -> Result<Vec<RawSignal>> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(SourceError::Malformed(self.name.clone(), "scripted failure".into()));
            }
            Ok(self.signals.clone())
        }
    }

    pub fn signal(title: &str, severity: SeverityClass, hazard: &str, at: Option<(f64, f64)>) -> RawSignal {
        RawSignal {
            title: title.to_string(),
            message: format!("{} detected", hazard),
            severity,
            hazard_type: hazard.to_string(),
            source_name: "mock".to_string(),
            place: None,
            lat: at.map(|p| p.0),
            lon: at.map(|p| p.1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use hazard_scoring::SeverityClass;

    #[tokio::test]
    async fn test_fetch_passes_signals_through() {
        let adapter = MockAdapter::ok("ok", vec![signal("Gale", SeverityClass::High, "Cyclone", None)]);
        let signals = adapter.fetch(0.0, 0.0, Duration::from_secs(1)).await;
        assert_eq!(signals.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_swallows_failure() {
        let adapter = MockAdapter::failing("broken");
        assert!(adapter.try_fetch(0.0, 0.0).await.is_err());
        assert!(adapter.fetch(0.0, 0.0, Duration::from_secs(1)).await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let adapter = MockAdapter::slow(
            "slow",
            Duration::from_secs(10),
            vec![signal("Late", SeverityClass::High, "Cyclone", None)],
        );
        let started = std::time::Instant::now();
        let signals = adapter.fetch(0.0, 0.0, Duration::from_millis(50)).await;
        assert!(signals.is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
