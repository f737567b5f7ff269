//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions in the engine. Ports exist for:
//! - The atlas service (could swap the HTTP map service for a local store)
//! - Clock/Random (for testing)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use questweave_domain::entities::{Poi, Region};
use questweave_domain::ids::RegionId;

#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("Atlas request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid atlas response: {0}")]
    InvalidResponse(String),
    #[error("Region not found: {0}")]
    RegionNotFound(RegionId),
}

impl AtlasError {
    /// Whether retrying the request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            // Auth errors and bad requests won't improve on retry
            Self::RequestFailed(msg) => {
                !msg.contains("401") && !msg.contains("403") && !msg.contains("400")
            }
            // A malformed body may have been a truncated read
            Self::InvalidResponse(_) => true,
            Self::RegionNotFound(_) => false,
        }
    }
}

/// Access to the campaign atlas: regions and their points of interest.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AtlasPort: Send + Sync {
    async fn fetch_region(&self, id: RegionId) -> Result<Region, AtlasError>;
    async fn fetch_pois(&self, region_id: RegionId) -> Result<Vec<Poi>, AtlasError>;
}

/// Clock abstraction (for testing).
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_not_retryable() {
        assert!(!AtlasError::RequestFailed("401 Unauthorized".into()).is_retryable());
        assert!(AtlasError::RequestFailed("connection reset".into()).is_retryable());
        assert!(!AtlasError::RegionNotFound(RegionId::new()).is_retryable());
    }
}
