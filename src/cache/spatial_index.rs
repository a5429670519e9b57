//! Geometry-indexed address cache
//!
//! Two structures are kept in step under one lock:
//!
//! - `entries`: key -> record, for O(1) exact lookups
//! - `tree`: an R-tree of `(position, key)` points for range and nearest
//!   queries
//!
//! Updates are incremental: replacing a key removes its old point from the
//! R-tree before the new one is inserted, so a moved record is never returned
//! from its stale position and never appears twice. Writes cost O(log n).
//!
//! Nothing is ever evicted. Memory grows with the number of distinct keys for
//! the lifetime of the process.

use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

use crate::errors::{CacheError, CacheResult};
use crate::models::{Address, BoundingBox, is_valid_coordinate};
use crate::utils::{haversine_distance, search_windows};

/// R-tree point stored as `[longitude, latitude]` with its cache key
type IndexedPoint = GeomWithData<[f64; 2], String>;

#[derive(Debug, Clone)]
struct Entry {
    position: [f64; 2],
    address: Address,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    tree: RTree<IndexedPoint>,
}

/// Thread-safe spatial cache of addresses
#[derive(Default)]
pub struct SpatialIndex {
    inner: RwLock<Inner>,
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("len", &self.len())
            .finish()
    }
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record stored under `key`.
    ///
    /// Records without finite coordinates are rejected and leave the index
    /// untouched.
    pub fn insert(
        &self,
        latitude: f64,
        longitude: f64,
        key: impl Into<String>,
        address: Address,
    ) -> CacheResult<()> {
        let key = key.into();
        if !is_valid_coordinate(latitude, longitude) {
            return Err(CacheError::InvalidCoordinate {
                key,
                latitude,
                longitude,
            });
        }

        let position = [longitude, latitude];
        let mut inner = self.write();

        if let Some(previous) = inner.entries.get(&key) {
            let stale = IndexedPoint::new(previous.position, key.clone());
            if inner.tree.remove(&stale).is_some() {
                trace!(key = %key, "Removed stale position from spatial index");
            }
        }

        inner.tree.insert(IndexedPoint::new(position, key.clone()));
        inner.entries.insert(key, Entry { position, address });
        Ok(())
    }

    /// All records whose point lies inside the closed rectangle
    pub fn query(&self, min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Vec<Address> {
        // An inverted or NaN rectangle contains nothing
        if !BoundingBox::new(min_lat, max_lat, min_lon, max_lon).is_valid() {
            return Vec::new();
        }

        let envelope = AABB::from_corners([min_lon, min_lat], [max_lon, max_lat]);
        let inner = self.read();

        inner
            .tree
            .locate_in_envelope(&envelope)
            .filter_map(|point| inner.entries.get(&point.data))
            .map(|entry| entry.address.clone())
            .collect()
    }

    pub fn query_box(&self, bbox: &BoundingBox) -> Vec<Address> {
        self.query(bbox.min_lat, bbox.max_lat, bbox.min_lon, bbox.max_lon)
    }

    pub fn try_get(&self, key: &str) -> Option<Address> {
        self.read().entries.get(key).map(|entry| entry.address.clone())
    }

    /// The record at the smallest great-circle distance from the point.
    ///
    /// The planar nearest neighbour seeds a search radius; every point inside
    /// the cap of that radius (split at the antimeridian) is then ranked by
    /// haversine distance. Unlike the tolerance-window probes this always
    /// returns something when the index is non-empty.
    pub fn nearest(&self, latitude: f64, longitude: f64) -> Option<Address> {
        if !is_valid_coordinate(latitude, longitude) {
            return None;
        }

        let inner = self.read();
        let tree = &inner.tree;
        let seed = tree.nearest_neighbor(&[longitude, latitude])?;
        let distance_to = |point: &IndexedPoint| {
            let [lon, lat] = *point.geom();
            haversine_distance(latitude, longitude, lat, lon)
        };
        let radius = distance_to(seed);

        let best = search_windows(latitude, longitude, radius)
            .iter()
            .flat_map(|window| {
                tree.locate_in_envelope(&AABB::from_corners(
                    [window.min_lon, window.min_lat],
                    [window.max_lon, window.max_lat],
                ))
            })
            .map(|point| (distance_to(point), point))
            .chain(std::iter::once((radius, seed)))
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, point)| point)?;

        inner
            .entries
            .get(&best.data)
            .map(|entry| entry.address.clone())
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Both structures are updated together before a guard is released, so a
    // poisoned lock still guards a consistent index.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
