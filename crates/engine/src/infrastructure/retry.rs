//! Resilient atlas client wrapper with exponential backoff retry.
//!
//! Wraps any AtlasPort implementation with retry logic to handle transient
//! failures in the map service.

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use questweave_domain::entities::{Poi, Region};
use questweave_domain::ids::RegionId;

use crate::infrastructure::ports::{AtlasError, AtlasPort};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries, just the initial attempt)
    pub max_retries: u32,
    /// Base delay in milliseconds before first retry
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,
    /// Jitter factor (0.0-1.0) for randomizing delays to prevent thundering herd
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
            jitter_factor: 0.2,
        }
    }
}

/// Wrapper that adds retry logic to any atlas client
pub struct ResilientAtlasClient {
    inner: Arc<dyn AtlasPort>,
    config: RetryConfig,
}

impl ResilientAtlasClient {
    pub fn new(inner: Arc<dyn AtlasPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Calculate delay for a given attempt number using exponential backoff with jitter
    fn calculate_delay(&self, attempt: u32) -> u64 {
        let base = self.config.base_delay_ms;
        let exponential = base.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exponential.min(self.config.max_delay_ms);

        let jitter_range = (capped as f64 * self.config.jitter_factor) as i64;
        if jitter_range > 0 {
            let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
            (capped as i64 + jitter).max(0) as u64
        } else {
            capped
        }
    }

    async fn execute_with_retry<T, F, Fut>(
        &self,
        operation_name: &str,
        operation: F,
    ) -> Result<T, AtlasError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, AtlasError>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(
                            attempt = attempt + 1,
                            operation = operation_name,
                            "Atlas request succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(e) => {
                    let retryable = e.is_retryable();

                    if attempt < self.config.max_retries && retryable {
                        let delay = self.calculate_delay(attempt + 1);
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_retries = self.config.max_retries,
                            delay_ms = delay,
                            error = %e,
                            operation = operation_name,
                            "Atlas request failed, retrying..."
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    } else if !retryable {
                        tracing::error!(
                            error = %e,
                            operation = operation_name,
                            "Atlas request failed with non-retryable error"
                        );
                        return Err(e);
                    }

                    last_error = Some(e);
                }
            }
        }

        let error =
            last_error.unwrap_or_else(|| AtlasError::RequestFailed("Unknown error".to_string()));
        tracing::error!(
            attempts = self.config.max_retries + 1,
            error = %error,
            operation = operation_name,
            "Atlas request failed after all retry attempts"
        );
        Err(error)
    }
}

#[async_trait]
impl AtlasPort for ResilientAtlasClient {
    async fn fetch_region(&self, id: RegionId) -> Result<Region, AtlasError> {
        let inner = Arc::clone(&self.inner);
        self.execute_with_retry("fetch_region", || {
            let inner = Arc::clone(&inner);
            async move { inner.fetch_region(id).await }
        })
        .await
    }

    async fn fetch_pois(&self, region_id: RegionId) -> Result<Vec<Poi>, AtlasError> {
        let inner = Arc::clone(&self.inner);
        self.execute_with_retry("fetch_pois", || {
            let inner = Arc::clone(&inner);
            async move { inner.fetch_pois(region_id).await }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Atlas double that fails a configured number of times before succeeding.
    struct FlakyAtlas {
        failures_before_success: u32,
        calls: AtomicU32,
        permanent: bool,
    }

    impl FlakyAtlas {
        fn failing(n: u32) -> Self {
            Self {
                failures_before_success: n,
                calls: AtomicU32::new(0),
                permanent: false,
            }
        }

        fn not_found() -> Self {
            Self {
                failures_before_success: u32::MAX,
                calls: AtomicU32::new(0),
                permanent: true,
            }
        }
    }

    #[async_trait]
    impl AtlasPort for FlakyAtlas {
        async fn fetch_region(&self, id: RegionId) -> Result<Region, AtlasError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.permanent {
                return Err(AtlasError::RegionNotFound(id));
            }
            if call < self.failures_before_success {
                return Err(AtlasError::RequestFailed("connection reset".to_string()));
            }
            Ok(Region::new(
                "Mistwood",
                questweave_domain::entities::Coordinates::default(),
            ))
        }

        async fn fetch_pois(&self, _region_id: RegionId) -> Result<Vec<Poi>, AtlasError> {
            Ok(Vec::new())
        }
    }

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            base_delay_ms: 1,
            max_delay_ms: 2,
            jitter_factor: 0.0,
        }
    }

    #[tokio::test]
    async fn retries_transient_failures() {
        let flaky = Arc::new(FlakyAtlas::failing(2));
        let client = ResilientAtlasClient::new(flaky.clone(), fast_config());

        let region = client.fetch_region(RegionId::new()).await.expect("recovers");
        assert_eq!(region.name, "Mistwood");
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let flaky = Arc::new(FlakyAtlas::failing(10));
        let client = ResilientAtlasClient::new(flaky.clone(), fast_config());

        let result = client.fetch_region(RegionId::new()).await;
        assert!(matches!(result, Err(AtlasError::RequestFailed(_))));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let atlas = Arc::new(FlakyAtlas::not_found());
        let client = ResilientAtlasClient::new(atlas.clone(), fast_config());

        let result = client.fetch_region(RegionId::new()).await;
        assert!(matches!(result, Err(AtlasError::RegionNotFound(_))));
        assert_eq!(atlas.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn delay_grows_exponentially_and_caps() {
        let client = ResilientAtlasClient::new(
            Arc::new(FlakyAtlas::failing(0)),
            RetryConfig {
                max_retries: 5,
                base_delay_ms: 100,
                max_delay_ms: 300,
                jitter_factor: 0.0,
            },
        );
        assert_eq!(client.calculate_delay(1), 100);
        assert_eq!(client.calculate_delay(2), 200);
        assert_eq!(client.calculate_delay(3), 300);
        assert_eq!(client.calculate_delay(4), 300);
    }
}
