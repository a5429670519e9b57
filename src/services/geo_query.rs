//! Cache-aside query orchestration
//!
//! Each query shape decides for itself whether the spatial cache can answer
//! it. Point lookups (id, composite geocode key, tolerance window around a
//! coordinate or geohash centre) are served from the cache when possible and
//! populate it after a store fallback. Range queries read the cache but never
//! write to it; geohash-prefix queries always go to the store and cache every
//! record they return.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::SpatialIndex;
use crate::config::defaults::DEFAULT_COORDINATE_TOLERANCE;
use crate::errors::{GeoQueryError, GeoQueryResult};
use crate::geohash::GeohashCodec;
use crate::models::{Address, BoundingBox, Coordinate, GeocodeRequest};
use crate::repositories::{AddressStore, run_cancellable};

/// Point-in-time view of the cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub fallbacks: u64,
    pub populated: u64,
    pub entries: usize,
}

#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    fallbacks: AtomicU64,
    populated: AtomicU64,
}

impl CacheCounters {
    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    fn populated(&self) {
        self.populated.fetch_add(1, Ordering::Relaxed);
    }
}

/// Geocoding front end combining the spatial cache with the durable store
pub struct GeoQueryOrchestrator {
    store: Arc<dyn AddressStore>,
    cache: Arc<SpatialIndex>,
    codec: Arc<dyn GeohashCodec>,
    tolerance: f64,
    counters: CacheCounters,
}

impl GeoQueryOrchestrator {
    pub fn new(
        store: Arc<dyn AddressStore>,
        cache: Arc<SpatialIndex>,
        codec: Arc<dyn GeohashCodec>,
    ) -> Self {
        Self {
            store,
            cache,
            codec,
            tolerance: DEFAULT_COORDINATE_TOLERANCE,
            counters: CacheCounters::default(),
        }
    }

    /// Half-width in degrees of the window probed around a coordinate
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn codec(&self) -> &Arc<dyn GeohashCodec> {
        &self.codec
    }

    pub async fn get_by_id(
        &self,
        id: i32,
        cancel: &CancellationToken,
    ) -> GeoQueryResult<Option<Address>> {
        ensure_active(cancel, "get_by_id")?;

        let key = id.to_string();
        if let Some(address) = self.cache.try_get(&key) {
            self.counters.hit();
            debug!(id, "Cache hit");
            return Ok(Some(address));
        }

        self.counters.miss();
        self.counters.fallback();
        debug!(id, "Cache miss, querying store");
        let found =
            run_cancellable("get_by_id", cancel, self.store.get_by_id(id, cancel)).await?;

        if let Some(address) = &found {
            self.populate(key, address);
        }
        Ok(found)
    }

    pub async fn geocode(
        &self,
        request: &GeocodeRequest,
        cancel: &CancellationToken,
    ) -> GeoQueryResult<Option<Address>> {
        ensure_active(cancel, "geocode")?;

        let key = request.cache_key();
        if let Some(address) = self.cache.try_get(&key) {
            self.counters.hit();
            debug!(key = %key, "Cache hit");
            return Ok(Some(address));
        }

        self.counters.miss();
        self.counters.fallback();
        debug!(key = %key, "Cache miss, querying store");
        let found =
            run_cancellable("geocode", cancel, self.store.geocode(request, cancel)).await?;

        if let Some(address) = &found {
            self.populate(key, address);
        }
        Ok(found)
    }

    pub async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
        cancel: &CancellationToken,
    ) -> GeoQueryResult<Option<Address>> {
        ensure_active(cancel, "reverse_geocode")?;

        if let Some(address) = self.probe_window(latitude, longitude) {
            self.counters.hit();
            debug!(latitude, longitude, id = address.id, "Cache hit");
            return Ok(Some(address));
        }

        self.counters.miss();
        self.counters.fallback();
        debug!(latitude, longitude, "Cache miss, querying store");
        let found = run_cancellable(
            "reverse_geocode",
            cancel,
            self.store.reverse_geocode(latitude, longitude, cancel),
        )
        .await?;

        if let Some(address) = &found {
            self.populate(address.id_key(), address);
        }
        Ok(found)
    }

    /// Cached records inside the box, or the store's answer when none are.
    ///
    /// Store results are not cached: a partially cached region would otherwise
    /// be mistaken for a complete one on the next query.
    pub async fn query_by_bounding_box(
        &self,
        bbox: &BoundingBox,
        cancel: &CancellationToken,
    ) -> GeoQueryResult<Vec<Address>> {
        ensure_active(cancel, "query_by_bounding_box")?;

        let cached = self.cache.query_box(bbox);
        if !cached.is_empty() {
            self.counters.hit();
            debug!(count = cached.len(), "Bounding box answered from cache");
            return Ok(dedup_by_id(cached));
        }

        self.counters.miss();
        self.counters.fallback();
        debug!(?bbox, "Bounding box not cached, querying store");
        Ok(run_cancellable(
            "query_by_bounding_box",
            cancel,
            self.store.query_by_bounding_box(bbox, cancel),
        )
        .await?)
    }

    pub async fn query_by_radius(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
        cancel: &CancellationToken,
    ) -> GeoQueryResult<Vec<Address>> {
        let bbox = BoundingBox::around(latitude, longitude, radius_km);
        self.query_by_bounding_box(&bbox, cancel).await
    }

    /// Reverse geocode each coordinate in order, skipping the ones with no match.
    ///
    /// Cancellation mid-batch fails the whole call; partial results are discarded.
    pub async fn batch_reverse_geocode(
        &self,
        coordinates: &[Coordinate],
        cancel: &CancellationToken,
    ) -> GeoQueryResult<Vec<Address>> {
        let mut results = Vec::with_capacity(coordinates.len());

        for coordinate in coordinates {
            ensure_active(cancel, "batch_reverse_geocode")?;
            if let Some(address) = self
                .reverse_geocode(coordinate.latitude, coordinate.longitude, cancel)
                .await?
            {
                results.push(address);
            }
        }

        Ok(results)
    }

    /// Always served by the store; every returned record is cached by id.
    pub async fn query_by_geohash_prefix(
        &self,
        prefix: &str,
        cancel: &CancellationToken,
    ) -> GeoQueryResult<Vec<Address>> {
        ensure_active(cancel, "query_by_geohash_prefix")?;

        self.counters.fallback();
        let found = run_cancellable(
            "query_by_geohash_prefix",
            cancel,
            self.store.query_by_geohash_prefix(prefix, cancel),
        )
        .await?;
        debug!(prefix, count = found.len(), "Geohash prefix query returned");

        for address in &found {
            self.populate(address.id_key(), address);
        }
        Ok(found)
    }

    pub async fn query_by_geohash(
        &self,
        geohash: &str,
        cancel: &CancellationToken,
    ) -> GeoQueryResult<Option<Address>> {
        ensure_active(cancel, "query_by_geohash")?;

        let location = self
            .codec
            .decode(geohash)
            .map_err(|e| GeoQueryError::InvalidGeohash {
                geohash: geohash.to_string(),
                message: e.to_string(),
            })?;

        if let Some(address) = self.probe_window(location.latitude, location.longitude) {
            self.counters.hit();
            debug!(geohash, id = address.id, "Cache hit");
            return Ok(Some(address));
        }

        self.counters.miss();
        self.counters.fallback();
        debug!(geohash, "Cache miss, querying store");
        let found = run_cancellable(
            "query_by_geohash",
            cancel,
            self.store.query_by_geohash(geohash, cancel),
        )
        .await?;

        if let Some(address) = &found {
            self.populate(address.id_key(), address);
        }
        Ok(found)
    }

    /// Warm the cache with the records behind each geohash.
    ///
    /// Returns how many geohashes resolved to a record.
    pub async fn preload(
        &self,
        geohashes: &[String],
        cancel: &CancellationToken,
    ) -> GeoQueryResult<usize> {
        let mut resolved = 0;

        for geohash in geohashes {
            ensure_active(cancel, "preload")?;
            if self.query_by_geohash(geohash, cancel).await?.is_some() {
                resolved += 1;
            }
        }

        info!(
            requested = geohashes.len(),
            resolved,
            entries = self.cache.len(),
            "Cache preload finished"
        );
        Ok(resolved)
    }

    /// Closest cached record by great-circle distance; never touches the store.
    pub fn nearest_cached(
        &self,
        latitude: f64,
        longitude: f64,
        cancel: &CancellationToken,
    ) -> GeoQueryResult<Option<Address>> {
        ensure_active(cancel, "nearest_cached")?;
        Ok(self.cache.nearest(latitude, longitude))
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            fallbacks: self.counters.fallbacks.load(Ordering::Relaxed),
            populated: self.counters.populated.load(Ordering::Relaxed),
            entries: self.cache.len(),
        }
    }

    fn probe_window(&self, latitude: f64, longitude: f64) -> Option<Address> {
        let window = BoundingBox::window(latitude, longitude, self.tolerance);
        self.cache.query_box(&window).into_iter().next()
    }

    /// Index a store result under `key` at the record's own coordinates
    fn populate(&self, key: String, address: &Address) {
        match self
            .cache
            .insert(address.latitude, address.longitude, key, address.clone())
        {
            Ok(()) => self.counters.populated(),
            Err(e) => warn!(id = address.id, "Skipping cache population: {}", e),
        }
    }
}

fn ensure_active(cancel: &CancellationToken, operation: &str) -> GeoQueryResult<()> {
    if cancel.is_cancelled() {
        return Err(GeoQueryError::cancelled(operation));
    }
    Ok(())
}

/// The same record can sit under both its id and a composite geocode key
fn dedup_by_id(addresses: Vec<Address>) -> Vec<Address> {
    let mut seen = HashSet::with_capacity(addresses.len());
    addresses
        .into_iter()
        .filter(|address| seen.insert(address.id))
        .collect()
}
