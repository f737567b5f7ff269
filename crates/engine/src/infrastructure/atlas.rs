//! HTTP client for the campaign atlas service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use questweave_domain::entities::{Coordinates, MapBounds, Poi, PoiKind, Region};
use questweave_domain::ids::{PoiId, RegionId};

use crate::infrastructure::ports::{AtlasError, AtlasPort};

/// Default atlas base URL.
pub const DEFAULT_ATLAS_BASE_URL: &str = "http://localhost:4800";

/// Client for the atlas's REST API.
#[derive(Clone)]
pub struct AtlasClient {
    client: Client,
    base_url: String,
}

impl AtlasClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, 10)
    }

    /// Create client with custom timeout (for testing).
    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create client from the `ATLAS_BASE_URL` environment variable,
    /// falling back to the default if not set.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("ATLAS_BASE_URL").unwrap_or_else(|_| DEFAULT_ATLAS_BASE_URL.to_string());
        Self::new(&base_url)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: String,
        region_id: RegionId,
    ) -> Result<T, AtlasError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AtlasError::RequestFailed(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AtlasError::RegionNotFound(region_id));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AtlasError::RequestFailed(format!("{}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AtlasError::InvalidResponse(e.to_string()))
    }
}

impl Default for AtlasClient {
    fn default() -> Self {
        Self::new(DEFAULT_ATLAS_BASE_URL)
    }
}

#[async_trait]
impl AtlasPort for AtlasClient {
    async fn fetch_region(&self, id: RegionId) -> Result<Region, AtlasError> {
        let dto: RegionDto = self
            .get_json(format!("{}/regions/{}", self.base_url, id), id)
            .await?;
        Ok(dto.into_region())
    }

    async fn fetch_pois(&self, region_id: RegionId) -> Result<Vec<Poi>, AtlasError> {
        let dtos: Vec<PoiDto> = self
            .get_json(
                format!("{}/regions/{}/pois", self.base_url, region_id),
                region_id,
            )
            .await?;
        Ok(dtos.into_iter().map(|d| d.into_poi(region_id)).collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionDto {
    id: Uuid,
    name: String,
    #[serde(default)]
    description: String,
    x: i32,
    y: i32,
    #[serde(default)]
    danger_level: Option<u32>,
    #[serde(default)]
    bounds: Option<BoundsDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoundsDto {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoiDto {
    id: Uuid,
    name: String,
    kind: PoiKind,
    x: i32,
    y: i32,
}

impl RegionDto {
    fn into_region(self) -> Region {
        Region {
            id: RegionId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            coordinates: Coordinates::new(self.x, self.y),
            bounds: self
                .bounds
                .map(|b| MapBounds::new(b.x, b.y, b.width, b.height)),
            danger_level: self.danger_level.unwrap_or(1).clamp(1, 5),
        }
    }
}

impl PoiDto {
    fn into_poi(self, region_id: RegionId) -> Poi {
        Poi {
            id: PoiId::from_uuid(self.id),
            region_id,
            name: self.name,
            kind: self.kind,
            coordinates: Coordinates::new(self.x, self.y),
        }
    }
}
