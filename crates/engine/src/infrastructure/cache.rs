//! TTL-based caching for atlas data.
//!
//! Region and POI lookups go to the atlas service; results are held in a
//! thread-safe cache with time-to-live expiration so repeated quest
//! generation in the same region does not hammer the map service.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use questweave_domain::entities::{Poi, Region};
use questweave_domain::ids::RegionId;

use crate::infrastructure::ports::{AtlasError, AtlasPort};

/// A thread-safe cache with time-to-live expiration.
///
/// Entries are considered expired after the configured TTL, but are not
/// removed until `cleanup_expired()` is called.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, TtlEntry<V>>>,
    ttl: Duration,
}

struct TtlEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Create a new cache with the specified TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Insert a value, replacing any existing entry and resetting the TTL.
    pub async fn insert(&self, key: K, value: V) {
        let entry = TtlEntry {
            value,
            inserted_at: Instant::now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Insert a value with an explicit timestamp (tests only).
    #[cfg(test)]
    pub async fn insert_at(&self, key: K, value: V, inserted_at: Instant) {
        let entry = TtlEntry { value, inserted_at };
        self.entries.write().await.insert(key, entry);
    }

    /// Get a value if it exists and hasn't expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let guard = self.entries.read().await;
        guard.get(key).and_then(|entry| {
            if entry.inserted_at.elapsed() < self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    /// Remove and return a value if it exists (regardless of expiration).
    pub async fn remove(&self, key: &K) -> Option<V> {
        self.entries.write().await.remove(key).map(|e| e.value)
    }

    /// Remove all expired entries and return the count of removed entries.
    pub async fn cleanup_expired(&self) -> usize {
        let mut guard = self.entries.write().await;
        let before_count = guard.len();
        guard.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
        before_count - guard.len()
    }

    /// Current number of entries (including expired ones not yet cleaned).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Default TTL for atlas data.
pub const DEFAULT_ATLAS_TTL_SECS: u64 = 300;

/// Read-through cache in front of an atlas client.
pub struct AtlasCache {
    atlas: Arc<dyn AtlasPort>,
    regions: TtlCache<RegionId, Region>,
    pois: TtlCache<RegionId, Vec<Poi>>,
}

impl AtlasCache {
    pub fn new(atlas: Arc<dyn AtlasPort>, ttl: Duration) -> Self {
        Self {
            atlas,
            regions: TtlCache::new(ttl),
            pois: TtlCache::new(ttl),
        }
    }

    /// Fetch a region, serving from cache while the entry is fresh.
    pub async fn region(&self, id: RegionId) -> Result<Region, AtlasError> {
        if let Some(region) = self.regions.get(&id).await {
            return Ok(region);
        }
        let region = self.atlas.fetch_region(id).await?;
        self.regions.insert(id, region.clone()).await;
        Ok(region)
    }

    /// Fetch a region's POIs, serving from cache while the entry is fresh.
    pub async fn pois(&self, region_id: RegionId) -> Result<Vec<Poi>, AtlasError> {
        if let Some(pois) = self.pois.get(&region_id).await {
            return Ok(pois);
        }
        let pois = self.atlas.fetch_pois(region_id).await?;
        self.pois.insert(region_id, pois.clone()).await;
        Ok(pois)
    }

    /// Drop a region's cached data, forcing the next read to hit the atlas.
    pub async fn invalidate(&self, region_id: RegionId) {
        self.regions.remove(&region_id).await;
        self.pois.remove(&region_id).await;
    }

    /// Sweep expired entries from both caches.
    pub async fn cleanup_expired(&self) -> usize {
        self.regions.cleanup_expired().await + self.pois.cleanup_expired().await
    }
}
